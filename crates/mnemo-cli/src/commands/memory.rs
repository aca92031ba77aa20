use chrono::{DateTime, SecondsFormat, Utc};
use mnemo_config::MnemoConfig;
use mnemo_core::{MemoryId, MemoryKind, MnemoError};
use mnemo_memory::{MemoryRecord, NewMemory};

use super::{open_memory, truncate_output};

pub(super) fn cmd_remember(
    config: &MnemoConfig,
    text: String,
    kind: MemoryKind,
    tags: Vec<String>,
    importance: f64,
    summary: Option<String>,
    meta: Vec<(String, String)>,
) -> mnemo_core::Result<()> {
    let mut memory = NewMemory::new(text)
        .kind(kind)
        .tags(tags)
        .importance(importance);
    if let Some(summary) = summary {
        memory = memory.summary(summary);
    }
    for (key, value) in meta {
        memory = memory.meta(key, value);
    }

    let id = open_memory(config)?.remember(memory)?;
    println!("{id}");
    Ok(())
}

pub(super) fn cmd_recall(
    config: &MnemoConfig,
    query: &str,
    k: Option<usize>,
    json: bool,
) -> mnemo_core::Result<()> {
    let k = k.unwrap_or(config.recall.default_k);
    let results = open_memory(config)?.recall(query, k)?;
    if json {
        return print_json(&results);
    }
    if results.is_empty() {
        println!("No memories match \"{query}\".");
        return Ok(());
    }
    print_table(&results);
    Ok(())
}

pub(super) fn cmd_recent(config: &MnemoConfig, k: Option<usize>, json: bool) -> mnemo_core::Result<()> {
    let k = k.unwrap_or(config.recall.recent_k);
    let results = open_memory(config)?.recent(k)?;
    if json {
        return print_json(&results);
    }
    if results.is_empty() {
        println!("No memories stored yet.");
        return Ok(());
    }
    print_table(&results);
    Ok(())
}

pub(super) fn cmd_context(
    config: &MnemoConfig,
    task: &str,
    budget: Option<usize>,
) -> mnemo_core::Result<()> {
    let budget = budget.unwrap_or(config.context.budget_chars);
    let digest = open_memory(config)?.context(task, budget)?;
    if !digest.is_empty() {
        println!("{digest}");
    }
    Ok(())
}

pub(super) fn cmd_show(config: &MnemoConfig, id: MemoryId, json: bool) -> mnemo_core::Result<()> {
    let Some(record) = open_memory(config)?.get(id)? else {
        return Err(MnemoError::InvalidInput(format!("no memory with id {id}")));
    };
    if json {
        return print_json(&record);
    }

    println!("\x1b[1m#{}\x1b[0m  {}", record.id, record.kind);
    println!("  text:        {}", record.text);
    if let Some(ref summary) = record.summary {
        println!("  summary:     {summary}");
    }
    if !record.tags.is_empty() {
        println!("  tags:        {}", record.tags.join(", "));
    }
    println!("  importance:  {:.2}", record.importance);
    println!("  created:     {}", stamp(record.created_at));
    println!("  accessed:    {}", stamp(record.last_accessed_at));
    for (key, value) in &record.meta {
        println!("  meta.{key} = {value}");
    }
    Ok(())
}

pub(super) fn cmd_forget(config: &MnemoConfig, ids: &[MemoryId]) -> mnemo_core::Result<()> {
    let removed = open_memory(config)?.forget(ids)?;
    println!("🗑️  Forgot {removed} of {} memories", ids.len());
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> mnemo_core::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table(records: &[MemoryRecord]) {
    println!(
        "\x1b[1m{:<6} {:<9} {:<5} {:<20} {}\x1b[0m",
        "ID", "KIND", "IMP", "ACCESSED", "TEXT"
    );
    for m in records {
        let tags = if m.tags.is_empty() {
            String::new()
        } else {
            format!(" \x1b[2m[{}]\x1b[0m", m.tags.join(","))
        };
        println!(
            "{:<6} {:<9} {:<5.2} {:<20} {}{}",
            m.id,
            m.kind.as_str(),
            m.importance,
            m.last_accessed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            truncate_output(&m.text, 60),
            tags
        );
    }
}

fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
