use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::schema::{ConfigWarning, MnemoConfig, WarningSeverity};

/// Loads and reloads the mnemo configuration.
///
/// Loading happens before any log subscriber exists, so nothing is logged
/// from [`ConfigLoader::load`]. Findings are kept and emitted later through
/// [`ConfigLoader::log_findings`].
pub struct ConfigLoader {
    config: RwLock<MnemoConfig>,
    config_path: PathBuf,
    file_found: bool,
    warnings: Vec<ConfigWarning>,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > MNEMO_CONFIG env > ~/.mnemo/mnemo.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("MNEMO_CONFIG") {
            return PathBuf::from(p);
        }
        Self::home_dir().join("mnemo.toml")
    }

    /// `~/.mnemo`, or `./.mnemo` when no home directory is known.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mnemo")
    }

    /// Load the config from disk, falling back to defaults. Fails on any
    /// error-severity validation finding; warnings are kept for
    /// [`Self::warnings`].
    pub fn load(path: Option<&Path>) -> mnemo_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let file_found = config_path.exists();
        let config = if file_found {
            Self::read(&config_path)?
        } else {
            MnemoConfig::default()
        };

        let (config, mut warnings) = apply_overrides(config, |name| std::env::var(name).ok());

        // Validate config: keep warnings, fail on errors
        let findings = config.validate().map_err(mnemo_core::MnemoError::Config)?;
        warnings.extend(findings);

        Ok(Self {
            config: RwLock::new(config),
            config_path,
            file_found,
            warnings,
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> MnemoConfig {
        self.config.read().clone()
    }

    /// Path the config was (or would have been) loaded from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Whether [`Self::path`] existed at load time.
    pub fn file_found(&self) -> bool {
        self.file_found
    }

    /// Non-fatal findings from the initial load, env overrides included.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Emit what happened during [`Self::load`]. Call once a subscriber is
    /// installed.
    pub fn log_findings(&self) {
        if self.file_found {
            debug!(config_path = ?self.config_path, "loaded configuration");
        } else {
            warn!(config_path = ?self.config_path, "config file not found, using defaults");
        }
        for w in &self.warnings {
            match w.severity {
                WarningSeverity::Info => info!("{}", w),
                _ => warn!("{}", w),
            }
        }
    }

    fn read(path: &Path) -> mnemo_core::Result<MnemoConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<MnemoConfig>(&raw).map_err(|e| {
            mnemo_core::MnemoError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Reload the config from disk. The current config is kept if the new one
    /// fails to parse or validate.
    pub fn reload(&self) -> mnemo_core::Result<()> {
        if !self.config_path.exists() {
            return Err(mnemo_core::MnemoError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let (new_config, mut warnings) =
            apply_overrides(Self::read(&self.config_path)?, |name| std::env::var(name).ok());
        warnings.extend(new_config.validate().map_err(mnemo_core::MnemoError::Config)?);
        for w in &warnings {
            warn!("{}", w);
        }
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }
}

/// Apply `MNEMO_DB_PATH`, `MNEMO_LOG_LEVEL`, `MNEMO_CONTEXT_BUDGET` and
/// `MNEMO_MAX_ITEMS` as read through `lookup`. Non-numeric values for the
/// numeric settings are ignored and reported as warnings.
pub fn apply_overrides<F>(mut config: MnemoConfig, lookup: F) -> (MnemoConfig, Vec<ConfigWarning>)
where
    F: Fn(&str) -> Option<String>,
{
    let mut warnings = Vec::new();

    if let Some(v) = lookup("MNEMO_DB_PATH") {
        config.memory.db_path = PathBuf::from(v);
    }
    if let Some(v) = lookup("MNEMO_LOG_LEVEL") {
        config.logging.level = v;
    }
    if let Some(v) = lookup("MNEMO_CONTEXT_BUDGET") {
        match v.parse::<usize>() {
            Ok(budget) => config.context.budget_chars = budget,
            Err(_) => warnings.push(ignored_override("MNEMO_CONTEXT_BUDGET", &v)),
        }
    }
    if let Some(v) = lookup("MNEMO_MAX_ITEMS") {
        match v.parse::<usize>() {
            Ok(max) => config.maintenance.max_items = max,
            Err(_) => warnings.push(ignored_override("MNEMO_MAX_ITEMS", &v)),
        }
    }
    (config, warnings)
}

fn ignored_override(var: &str, value: &str) -> ConfigWarning {
    ConfigWarning {
        field: var.into(),
        message: format!("ignoring non-numeric value '{value}'"),
        severity: WarningSeverity::Warning,
        hint: Some("Use a whole number".into()),
    }
}
