use mnemo_config::MnemoConfig;

use super::open_memory;

pub(super) fn cmd_prune(
    config: &MnemoConfig,
    max_items: Option<usize>,
    drop_below: Option<f64>,
) -> mnemo_core::Result<()> {
    let max_items = max_items.unwrap_or(config.maintenance.max_items);
    let drop_below = drop_below.unwrap_or(config.maintenance.drop_below);

    let memory = open_memory(config)?;
    let before = memory.count()?;
    let removed = memory.prune(max_items, drop_below)?;

    if removed == 0 {
        if before > max_items {
            println!(
                "⚠️  {before} memories exceed the cap of {max_items}, but none are at or below importance {drop_below:.2}"
            );
        } else {
            println!("✅ {before} memories, within the cap of {max_items}");
        }
    } else {
        println!(
            "🧹 Pruned {removed} memories ({before} → {})",
            before - removed
        );
    }
    Ok(())
}

pub(super) fn cmd_decay(
    config: &MnemoConfig,
    min_importance: Option<f64>,
    hours: Option<f64>,
) -> mnemo_core::Result<()> {
    let min_importance = min_importance.unwrap_or(config.maintenance.decay_min_importance);
    let hours = hours.unwrap_or(config.maintenance.decay_hours_threshold);
    open_memory(config)?.decay(min_importance, hours)?;
    println!("💡 No decay policy is configured; importance values were left unchanged.");
    Ok(())
}

pub(super) fn cmd_stats(config: &MnemoConfig) -> mnemo_core::Result<()> {
    let memory = open_memory(config)?;
    let count = memory.count()?;
    let indexed = memory.store().indexed_ids()?.len();

    println!("\x1b[1m🧠 mnemo stats\x1b[0m");
    println!("  Database:     {}", config.memory.db_path.display());
    println!("  Memories:     {count}");
    println!("  Index rows:   {indexed}");
    println!(
        "  Capacity:     {count}/{} ({:.0}%)",
        config.maintenance.max_items,
        count as f64 / config.maintenance.max_items.max(1) as f64 * 100.0
    );
    if count != indexed {
        println!("  ⚠️  index is out of sync with the memories table");
    }
    Ok(())
}
