use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration, maps to `mnemo.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MnemoConfig {
    pub memory: MemoryConfig,
    pub recall: RecallConfig,
    pub context: ContextConfig,
    pub maintenance: MaintenanceConfig,
    pub logging: LoggingConfig,
}

// ── Memory ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Path to the SQLite database.
    pub db_path: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("memory.db"),
        }
    }
}

// ── Recall ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    /// Results returned by `recall` when no `k` is given.
    pub default_k: usize,
    /// Results returned by `recent` when no `k` is given.
    pub recent_k: usize,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            default_k: 8,
            recent_k: 12,
        }
    }
}

// ── Context ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Maximum characters in an assembled context.
    pub budget_chars: usize,
    /// Size of the task-relevant bucket.
    pub relevant_k: usize,
    /// Size of the recent-session bucket.
    pub recent_k: usize,
    /// Size of the pinned-facts bucket.
    pub pinned_k: usize,
    /// Query used to find pinned facts.
    pub pinned_query: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            budget_chars: 2400,
            relevant_k: 6,
            recent_k: 8,
            pinned_k: 3,
            pinned_query: "tags pinned".into(),
        }
    }
}

// ── Maintenance ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Record count above which `prune` starts evicting.
    pub max_items: usize,
    /// Only memories at or below this importance are ever evicted.
    pub drop_below: f64,
    /// Passed to the decay hook.
    pub decay_min_importance: f64,
    /// Passed to the decay hook.
    pub decay_hours_threshold: f64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            max_items: 5000,
            drop_below: 0.10,
            decay_min_importance: 0.15,
            decay_hours_threshold: 72.0,
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// Smallest budget that can still hold the truncation marker with its separator.
pub const MIN_CONTEXT_BUDGET: usize = 26;

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.severity {
            WarningSeverity::Error => "❌",
            WarningSeverity::Warning => "⚠️ ",
            WarningSeverity::Info => "💡",
        };
        write!(f, "{} {}: {}", icon, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl MnemoConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Database path ───
        if self.memory.db_path.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                field: "memory.db_path".into(),
                message: "database path is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 'memory.db' or ':memory:' for a throwaway store".into()),
            });
        }

        // ── Bucket sizes ───
        let buckets = [
            ("recall.default_k", self.recall.default_k),
            ("recall.recent_k", self.recall.recent_k),
            ("context.relevant_k", self.context.relevant_k),
            ("context.recent_k", self.context.recent_k),
            ("context.pinned_k", self.context.pinned_k),
        ];
        for (field, k) in buckets {
            if k == 0 {
                warnings.push(ConfigWarning {
                    field: field.into(),
                    message: "k is 0 — this bucket will always be empty".into(),
                    severity: WarningSeverity::Error,
                    hint: Some("Use a positive count".into()),
                });
            }
        }

        // ── Context budget ───
        if self.context.budget_chars < MIN_CONTEXT_BUDGET {
            warnings.push(ConfigWarning {
                field: "context.budget_chars".into(),
                message: format!(
                    "budget {} cannot hold the truncation marker",
                    self.context.budget_chars
                ),
                severity: WarningSeverity::Error,
                hint: Some(format!("Use at least {MIN_CONTEXT_BUDGET}; 2400 is the default")),
            });
        } else if self.context.budget_chars < 400 {
            warnings.push(ConfigWarning {
                field: "context.budget_chars".into(),
                message: format!(
                    "budget {} leaves little room after the 200-character truncation headroom",
                    self.context.budget_chars
                ),
                severity: WarningSeverity::Warning,
                hint: Some("Budgets under 400 keep almost nothing once truncated".into()),
            });
        }

        if self.context.pinned_query.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "context.pinned_query".into(),
                message: "pinned query is empty — the pinned bucket will always be empty".into(),
                severity: WarningSeverity::Info,
                hint: Some("The default is 'tags pinned'".into()),
            });
        }

        // ── Maintenance ───
        if self.maintenance.max_items == 0 {
            warnings.push(ConfigWarning {
                field: "maintenance.max_items".into(),
                message: "max_items is 0 — every eligible memory would be pruned".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 5000".into()),
            });
        }
        let drop_below = self.maintenance.drop_below;
        if !(0.0..=1.0).contains(&drop_below) {
            warnings.push(ConfigWarning {
                field: "maintenance.drop_below".into(),
                message: format!("drop_below {drop_below} is out of range"),
                severity: WarningSeverity::Error,
                hint: Some("Importance is always within [0.0, 1.0]".into()),
            });
        } else if drop_below >= 0.5 {
            warnings.push(ConfigWarning {
                field: "maintenance.drop_below".into(),
                message: format!("drop_below {drop_below} makes average memories evictable"),
                severity: WarningSeverity::Warning,
                hint: Some("The default is 0.10".into()),
            });
        }

        // ── Logging ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
