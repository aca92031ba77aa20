#[cfg(test)]
mod tests {
    use mnemo_core::*;

    // ── MemoryKind tests ───────────────────────────────────────

    #[test]
    fn test_kind_default_is_episodic() {
        assert_eq!(MemoryKind::default(), MemoryKind::Episodic);
    }

    #[test]
    fn test_kind_parse_and_display() {
        for kind in MemoryKind::ALL {
            let parsed: MemoryKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert_eq!(MemoryKind::Semantic.as_str(), "semantic");
    }

    #[test]
    fn test_kind_parse_unknown_is_storage_error() {
        let err = "procedural".parse::<MemoryKind>().unwrap_err();
        assert!(err.is_storage());
        assert!(err.to_string().contains("procedural"));
    }

    #[test]
    fn test_kind_serde_lowercase() {
        let json = serde_json::to_string(&MemoryKind::Working).unwrap();
        assert_eq!(json, "\"working\"");
        let restored: MemoryKind = serde_json::from_str("\"semantic\"").unwrap();
        assert_eq!(restored, MemoryKind::Semantic);
    }

    // ── Importance tests ───────────────────────────────────────

    #[test]
    fn test_clamp_importance() {
        assert_eq!(clamp_importance(1.5), 1.0);
        assert_eq!(clamp_importance(-0.3), 0.0);
        assert_eq!(clamp_importance(0.42), 0.42);
        assert_eq!(clamp_importance(f64::NAN), 0.0);
        assert_eq!(clamp_importance(f64::INFINITY), 1.0);
    }

    // ── Error tests ────────────────────────────────────────────

    #[test]
    fn test_error_display() {
        let err = MnemoError::Storage("disk I/O error".into());
        assert_eq!(err.to_string(), "storage error: disk I/O error");
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = MnemoError::ConfigValidation {
            field: "maintenance.drop_below".into(),
            reason: "must be within [0, 1]".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("maintenance.drop_below"));
        assert!(msg.contains("[0, 1]"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MnemoError = io_err.into();
        assert!(matches!(err, MnemoError::Io(_)));
        assert!(!err.is_storage());
    }

    #[test]
    fn test_storage_helper() {
        let err = MnemoError::storage("locked");
        assert!(err.is_storage());
    }
}
