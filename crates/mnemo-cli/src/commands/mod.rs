use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use mnemo_config::{ConfigLoader, MnemoConfig};
use mnemo_core::{MemoryId, MemoryKind, MnemoError};
use mnemo_memory::{ContextOptions, MemoryModule};

mod maintenance;
mod memory;
mod setup;

/// 🧠 mnemo — durable, ranked memory for agents
#[derive(Parser, Debug)]
#[command(name = "mnemo", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to mnemo.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a new memory and print its id
    Remember {
        /// Memory text
        text: String,
        /// Memory kind: episodic, semantic, working
        #[arg(short, long, value_parser = parse_kind, default_value = "episodic")]
        kind: MemoryKind,
        /// Tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Importance in [0, 1]; out-of-range values are clamped
        #[arg(short, long, default_value_t = 0.5, allow_negative_numbers = true)]
        importance: f64,
        /// Short summary
        #[arg(short, long)]
        summary: Option<String>,
        /// Metadata as key=value pairs (repeatable)
        #[arg(short, long, value_parser = parse_key_val)]
        meta: Vec<(String, String)>,
    },
    /// Ranked search over stored memories
    Recall {
        /// Free-form query text
        query: String,
        /// Number of results (default from recall.default_k)
        #[arg(short)]
        k: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Most recently accessed memories
    Recent {
        /// Number of results (default from recall.recent_k)
        #[arg(short)]
        k: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the bounded context digest for a task
    Context {
        /// Task description
        task: String,
        /// Character budget (default from context.budget_chars)
        #[arg(short, long)]
        budget: Option<usize>,
    },
    /// Show a single memory
    Show {
        id: MemoryId,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete memories by id
    Forget {
        #[arg(required = true)]
        ids: Vec<MemoryId>,
    },
    /// Evict low-importance memories above the capacity cap
    Prune {
        /// Capacity cap (default from maintenance.max_items)
        #[arg(long)]
        max_items: Option<usize>,
        /// Eviction threshold (default from maintenance.drop_below)
        #[arg(long)]
        drop_below: Option<f64>,
    },
    /// Run the decay maintenance hook
    Decay {
        /// Default from maintenance.decay_min_importance
        #[arg(long)]
        min_importance: Option<f64>,
        /// Default from maintenance.decay_hours_threshold
        #[arg(long)]
        hours: Option<f64>,
    },
    /// Show store statistics
    Stats,
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a config value in mnemo.toml (dot-notation key)
    Set {
        /// Config key in dot notation (e.g. context.budget_chars)
        key: String,
        /// Value to set
        value: String,
    },
    /// Audit configuration
    Doctor,
    /// Initialize a new mnemo.toml in the current or home directory
    Init {
        /// Create in current directory instead of ~/.mnemo/
        #[arg(long)]
        local: bool,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show version and build info
    Version,
}

/// Parse "key=value" CLI arguments.
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn parse_kind(s: &str) -> std::result::Result<MemoryKind, String> {
    s.parse::<MemoryKind>().map_err(|_| {
        let valid: Vec<&str> = MemoryKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown kind `{s}` (expected one of: {})", valid.join(", "))
    })
}

impl Cli {
    pub fn run(self) -> mnemo_core::Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or(config.logging.level.as_str())
        };
        init_tracing(&config.logging.format, log_level);
        config_loader.log_findings();

        match self.command {
            Commands::Remember {
                text,
                kind,
                tags,
                importance,
                summary,
                meta,
            } => memory::cmd_remember(&config, text, kind, tags, importance, summary, meta),
            Commands::Recall { query, k, json } => memory::cmd_recall(&config, &query, k, json),
            Commands::Recent { k, json } => memory::cmd_recent(&config, k, json),
            Commands::Context { task, budget } => memory::cmd_context(&config, &task, budget),
            Commands::Show { id, json } => memory::cmd_show(&config, id, json),
            Commands::Forget { ids } => memory::cmd_forget(&config, &ids),
            Commands::Prune {
                max_items,
                drop_below,
            } => maintenance::cmd_prune(&config, max_items, drop_below),
            Commands::Decay {
                min_importance,
                hours,
            } => maintenance::cmd_decay(&config, min_importance, hours),
            Commands::Stats => maintenance::cmd_stats(&config),
            Commands::Config { json } => Self::cmd_config(config, json),
            Commands::Set { key, value } => {
                Self::cmd_config_set(config_loader.path().to_path_buf(), key, value)
            }
            Commands::Doctor => Self::cmd_doctor(config),
            Commands::Init { local } => setup::cmd_init(local),
            Commands::Completions { shell } => Self::cmd_completions(shell),
            Commands::Version => Self::cmd_version(),
        }
    }

    fn cmd_config(config: MnemoConfig, json: bool) -> mnemo_core::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| MnemoError::Config(e.to_string()))?
            );
        }
        Ok(())
    }

    fn cmd_config_set(config_path: PathBuf, key: String, value: String) -> mnemo_core::Result<()> {
        if !config_path.exists() {
            return Err(MnemoError::Config(format!(
                "No config file at {}. Run 'mnemo init' first.",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            MnemoError::Config(format!("Cannot read {}: {}", config_path.display(), e))
        })?;

        let (updated, old_value) = set_value(&content, &key, &value).map_err(|e| match e {
            MnemoError::Config(msg) => {
                MnemoError::Config(format!("{} in {}", msg, config_path.display()))
            }
            other => other,
        })?;

        std::fs::write(&config_path, updated).map_err(|e| {
            MnemoError::Config(format!("Cannot write {}: {}", config_path.display(), e))
        })?;

        match old_value {
            Some(old) => println!("✅ {key} = {value} (was {old})"),
            None => println!("✅ {key} = {value} (new)"),
        }

        Ok(())
    }

    fn cmd_doctor(config: MnemoConfig) -> mnemo_core::Result<()> {
        println!("🩺 mnemo doctor — configuration audit");
        println!();

        let warnings = match config.validate() {
            Ok(w) => w,
            Err(e) => {
                println!("{e}");
                return Ok(());
            }
        };

        let mut warn_count = 0;
        let mut info_count = 0;
        for w in &warnings {
            println!("  {w}");
            match w.severity {
                mnemo_config::WarningSeverity::Warning => warn_count += 1,
                mnemo_config::WarningSeverity::Info => info_count += 1,
                _ => {}
            }
        }

        // The store must open and its index must agree with the table
        match open_memory(&config) {
            Ok(memory) => {
                let rows = memory.count()?;
                let indexed = memory.store().indexed_ids()?.len();
                if rows == indexed {
                    println!("  ✅ store: {rows} memories, index in sync");
                } else {
                    println!("  ❌ store: {rows} rows but {indexed} index entries");
                    warn_count += 1;
                }
                if rows > config.maintenance.max_items {
                    println!(
                        "  💡 store holds {rows} memories, above maintenance.max_items ({}) — run 'mnemo prune'",
                        config.maintenance.max_items
                    );
                    info_count += 1;
                }
            }
            Err(e) => {
                println!("  ❌ store: {e}");
                warn_count += 1;
            }
        }

        println!();
        println!("  ⚠️  {warn_count} warnings, 💡 {info_count} suggestions");
        Ok(())
    }

    fn cmd_version() -> mnemo_core::Result<()> {
        println!("🧠 mnemo v{}", env!("CARGO_PKG_VERSION"));
        println!("   Target: {}", std::env::consts::ARCH);
        println!("   OS: {}", std::env::consts::OS);
        #[cfg(debug_assertions)]
        println!("   Profile: debug");
        #[cfg(not(debug_assertions))]
        println!("   Profile: release");
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> mnemo_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "mnemo", &mut std::io::stdout());
        Ok(())
    }
}

/// Set a dot-notation `key` in a `mnemo.toml` document, keeping its formatting.
/// Returns the edited document and the previous value, if any. The edit is
/// rejected unless the result still deserializes and validates.
fn set_value(content: &str, key: &str, value: &str) -> mnemo_core::Result<(String, Option<String>)> {
    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| MnemoError::Config(format!("Invalid TOML: {e}")))?;

    // Parse dot-notation key into table path, e.g. "context.budget_chars" → ["context", "budget_chars"]
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf_key, table_parts)) = parts.split_last() else {
        return Err(MnemoError::Config("Empty key".into()));
    };

    let mut table: &mut toml_edit::Item = doc.as_item_mut();
    for part in table_parts {
        // Ensure intermediate tables exist
        if table.get(part).is_none() {
            table[part] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        table = &mut table[part];
    }

    // Infer the value type: bool, integer, float, or string
    let toml_value = if value == "true" {
        toml_edit::value(true)
    } else if value == "false" {
        toml_edit::value(false)
    } else if let Ok(i) = value.parse::<i64>() {
        toml_edit::value(i)
    } else if let Ok(f) = value.parse::<f64>() {
        toml_edit::value(f)
    } else {
        toml_edit::value(value)
    };

    let old_value = table.get(leaf_key).map(|item| match item.as_value() {
        Some(v) => {
            let mut bare = v.clone();
            bare.decor_mut().clear();
            bare.to_string()
        }
        None => item.to_string().trim().to_string(),
    });
    table[*leaf_key] = toml_value;

    let updated = doc.to_string();
    let parsed: MnemoConfig =
        toml::from_str(&updated).map_err(|e| MnemoError::ConfigValidation {
            field: key.to_string(),
            reason: format!("'{value}' does not fit this setting: {e}"),
        })?;
    parsed
        .validate()
        .map_err(|reason| MnemoError::ConfigValidation {
            field: key.to_string(),
            reason,
        })?;

    Ok((updated, old_value))
}

/// Output shape selected by `logging.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    /// Full human-readable lines without targets (`pretty`, the default).
    Pretty,
    /// Single-line human-readable output without targets.
    Compact,
    /// One JSON object per event, targets included.
    Json,
}

impl LogFormat {
    /// Unknown names fall back to `Pretty`; `doctor` warns about them.
    fn from_config(name: &str) -> Self {
        match name {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

fn init_tracing(format: &str, level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Logs go to stderr so command output stays pipeable
    let result = match LogFormat::from_config(format) {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .with_target(true)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .with_target(false)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}

/// Open the configured store with the configured context buckets.
pub(crate) fn open_memory(config: &MnemoConfig) -> mnemo_core::Result<MemoryModule> {
    let memory = MemoryModule::open(&config.memory.db_path)?;
    Ok(memory.with_context_options(context_options(config)))
}

pub(crate) fn context_options(config: &MnemoConfig) -> ContextOptions {
    ContextOptions {
        relevant_k: config.context.relevant_k,
        recent_k: config.context.recent_k,
        pinned_k: config.context.pinned_k,
        pinned_query: config.context.pinned_query.clone(),
    }
}

/// Truncate a string to `max` characters, appending "..." if truncated.
pub(crate) fn truncate_output(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.replace('\n', " ")
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head.replace('\n', " "))
    }
}
