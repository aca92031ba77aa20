use mnemo_config::ConfigLoader;

const TEMPLATE: &str = r#"# 🧠 mnemo configuration

[memory]
db_path = "memory.db"

[recall]
# default_k = 8
# recent_k = 12

[context]
budget_chars = 2400
# relevant_k = 6
# recent_k = 8
# pinned_k = 3
# pinned_query = "tags pinned"

[maintenance]
max_items = 5000
drop_below = 0.10
# decay_min_importance = 0.15
# decay_hours_threshold = 72.0

[logging]
level = "info"
# format = "pretty"  # pretty | json | compact
"#;

/// Write a starter `mnemo.toml` into `~/.mnemo/` or the current directory.
pub(super) fn cmd_init(local: bool) -> mnemo_core::Result<()> {
    let dir = if local {
        std::env::current_dir()?
    } else {
        ConfigLoader::home_dir()
    };

    std::fs::create_dir_all(&dir)?;
    let config_path = dir.join("mnemo.toml");

    if config_path.exists() {
        println!("⚠️  {} already exists", config_path.display());
        println!("   Use 'mnemo set <key> <value>' to change individual settings.");
        return Ok(());
    }

    std::fs::write(&config_path, TEMPLATE)?;
    println!("✅ Created {}", config_path.display());
    if local {
        println!("   Point mnemo at it with: mnemo -c {}", config_path.display());
    } else {
        println!("   Try: mnemo remember \"first memory\" --tag pinned");
    }

    Ok(())
}
