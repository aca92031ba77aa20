use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use mnemo_core::{MemoryId, MemoryKind, MnemoError, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::query::MatchQuery;
use crate::record::{MemoryRecord, ScoreRow};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS memories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        text TEXT NOT NULL,
        summary TEXT,
        tags TEXT NOT NULL DEFAULT '[]',
        importance REAL NOT NULL,
        created_at TEXT NOT NULL,
        last_accessed_at TEXT NOT NULL,
        meta TEXT NOT NULL DEFAULT '{}'
    );

    CREATE INDEX IF NOT EXISTS idx_memories_last_access ON memories(last_accessed_at);

    -- BM25 index; rowid mirrors memories.id
    CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(text, summary, tags);

    CREATE TRIGGER IF NOT EXISTS memories_ai AFTER INSERT ON memories BEGIN
        INSERT INTO memories_fts(rowid, text, summary, tags)
        VALUES (
            new.id,
            new.text,
            coalesce(new.summary, ''),
            coalesce((SELECT group_concat(value, ' ') FROM json_each(new.tags)), '')
        );
    END;

    CREATE TRIGGER IF NOT EXISTS memories_ad AFTER DELETE ON memories BEGIN
        DELETE FROM memories_fts WHERE rowid = old.id;
    END;

    CREATE TRIGGER IF NOT EXISTS memories_au AFTER UPDATE OF text, summary, tags ON memories BEGIN
        UPDATE memories_fts SET
            text = new.text,
            summary = coalesce(new.summary, ''),
            tags = coalesce((SELECT group_concat(value, ' ') FROM json_each(new.tags)), '')
        WHERE rowid = new.id;
    END;
";

const RECORD_COLUMNS: &str =
    "m.id, m.kind, m.text, m.summary, m.tags, m.importance, m.created_at, m.last_accessed_at, m.meta";

/// SQLite-backed record table plus its FTS5 index.
///
/// Every operation takes the connection lock for its whole duration, so a
/// reader never observes a row without its index entry or the reverse. The
/// guard is released on every exit path when it goes out of scope.
#[derive(Clone)]
pub struct MemoryStore {
    db: Arc<Mutex<Connection>>,
}

impl MemoryStore {
    /// Open or create the memory database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        info!(?path, "opening memory store");

        let conn = Connection::open(path).map_err(MnemoError::storage)?;

        // Enable WAL mode for concurrent readers in other processes
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(MnemoError::storage)?;
        conn.execute_batch(SCHEMA).map_err(MnemoError::storage)?;

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        Self::open(Path::new(":memory:"))
    }

    /// Persist a record and index it. The record's own `id` is ignored; the
    /// freshly assigned one is returned.
    pub fn insert(&self, record: &MemoryRecord) -> Result<MemoryId> {
        let tags = serde_json::to_string(&record.tags).map_err(MnemoError::storage)?;
        let meta = serde_json::to_string(&record.meta).map_err(MnemoError::storage)?;

        let db = self.db.lock();
        db.execute(
            "INSERT INTO memories (kind, text, summary, tags, importance, created_at, last_accessed_at, meta)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.kind.as_str(),
                record.text,
                record.summary,
                tags,
                record.importance,
                format_ts(record.created_at),
                format_ts(record.last_accessed_at),
                meta,
            ],
        )
        .map_err(MnemoError::storage)?;
        let id = db.last_insert_rowid();
        debug!(id, kind = %record.kind, "memory inserted");
        Ok(id)
    }

    /// Fetch a single record by id.
    pub fn get(&self, id: MemoryId) -> Result<Option<MemoryRecord>> {
        let db = self.db.lock();
        let raw = db
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM memories m WHERE m.id = ?1"),
                params![id],
                RawRecord::from_row,
            )
            .optional()
            .map_err(MnemoError::storage)?;
        raw.map(RawRecord::into_record).transpose()
    }

    /// Mark records as accessed now. Unknown ids are ignored.
    pub fn update_last_access(&self, ids: &[MemoryId]) -> Result<usize> {
        self.touch(ids, stamp_now())
    }

    /// Set `last_accessed_at` to `at` for each id, never earlier than the
    /// record's `created_at`. Returns how many rows were touched.
    pub fn touch(&self, ids: &[MemoryId], at: DateTime<Utc>) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ts = format_ts(at);
        let mut db = self.db.lock();
        let tx = db.transaction().map_err(MnemoError::storage)?;
        let mut touched = 0;
        {
            let mut stmt = tx
                .prepare("UPDATE memories SET last_accessed_at = max(?1, created_at) WHERE id = ?2")
                .map_err(MnemoError::storage)?;
            for id in ids {
                touched += stmt.execute(params![ts, *id]).map_err(MnemoError::storage)?;
            }
        }
        tx.commit().map_err(MnemoError::storage)?;
        debug!(requested = ids.len(), touched, "last access updated");
        Ok(touched)
    }

    /// Delete records from both the table and the index. Returns the number of
    /// rows actually removed.
    pub fn delete(&self, ids: &[MemoryId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut db = self.db.lock();
        let tx = db.transaction().map_err(MnemoError::storage)?;
        let mut removed = 0;
        {
            let mut stmt = tx
                .prepare("DELETE FROM memories WHERE id = ?1")
                .map_err(MnemoError::storage)?;
            for id in ids {
                removed += stmt.execute(params![*id]).map_err(MnemoError::storage)?;
            }
        }
        tx.commit().map_err(MnemoError::storage)?;
        debug!(requested = ids.len(), removed, "memories deleted");
        Ok(removed)
    }

    /// Run a sanitized query against the BM25 index, best match first.
    pub fn search(&self, query: &MatchQuery, limit: usize) -> Result<Vec<MemoryRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let expr = query.to_fts5();
        debug!(query = %expr, limit, "fts search");

        let db = self.db.lock();
        let mut stmt = db
            .prepare(&format!(
                "SELECT {RECORD_COLUMNS}
                 FROM memories_fts
                 JOIN memories m ON m.id = memories_fts.rowid
                 WHERE memories_fts MATCH ?1
                 ORDER BY bm25(memories_fts) ASC, m.id ASC
                 LIMIT ?2"
            ))
            .map_err(MnemoError::storage)?;
        let rows = stmt
            .query_map(params![expr, sql_limit(limit)], RawRecord::from_row)
            .map_err(MnemoError::storage)?;
        collect_records(rows)
    }

    /// Most recently accessed records first; ties go to the newer id.
    pub fn recent(&self, limit: usize) -> Result<Vec<MemoryRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let db = self.db.lock();
        let mut stmt = db
            .prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM memories m
                 ORDER BY m.last_accessed_at DESC, m.id DESC
                 LIMIT ?1"
            ))
            .map_err(MnemoError::storage)?;
        let rows = stmt
            .query_map(params![sql_limit(limit)], RawRecord::from_row)
            .map_err(MnemoError::storage)?;
        collect_records(rows)
    }

    /// Full scan of `(id, importance, last_accessed_at)` for maintenance.
    pub fn all_ids_with_scores(&self) -> Result<Vec<ScoreRow>> {
        let db = self.db.lock();
        let mut stmt = db
            .prepare("SELECT id, importance, last_accessed_at FROM memories ORDER BY id")
            .map_err(MnemoError::storage)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(MnemoError::storage)?;

        let mut out = Vec::new();
        for row in rows {
            let (id, importance, last_accessed) = row.map_err(MnemoError::storage)?;
            out.push(ScoreRow {
                id,
                importance,
                last_accessed_at: parse_ts(&last_accessed)?,
            });
        }
        Ok(out)
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize> {
        let db = self.db.lock();
        let n: i64 = db
            .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
            .map_err(MnemoError::storage)?;
        Ok(n as usize)
    }

    /// Raw scan of the ids present in the lexical index.
    pub fn indexed_ids(&self) -> Result<Vec<MemoryId>> {
        let db = self.db.lock();
        let mut stmt = db
            .prepare("SELECT rowid FROM memories_fts ORDER BY rowid")
            .map_err(MnemoError::storage)?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))
            .map_err(MnemoError::storage)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(MnemoError::storage)?;
        Ok(ids)
    }
}

/// SQLite takes a signed limit; anything beyond `i64::MAX` means "all rows".
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Current time at the precision timestamps are persisted with.
pub(crate) fn stamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so that string order in SQL is chronological order.
pub(crate) fn format_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| MnemoError::Storage(format!("corrupt timestamp '{raw}': {e}")))
}

/// Column values as stored, before any field is interpreted.
struct RawRecord {
    id: i64,
    kind: String,
    text: String,
    summary: Option<String>,
    tags: String,
    importance: f64,
    created_at: String,
    last_accessed_at: String,
    meta: String,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            text: row.get(2)?,
            summary: row.get(3)?,
            tags: row.get(4)?,
            importance: row.get(5)?,
            created_at: row.get(6)?,
            last_accessed_at: row.get(7)?,
            meta: row.get(8)?,
        })
    }

    fn into_record(self) -> Result<MemoryRecord> {
        let kind: MemoryKind = self.kind.parse()?;
        let tags: Vec<String> = serde_json::from_str(&self.tags).map_err(|e| {
            MnemoError::Storage(format!("corrupt tags for memory {}: {e}", self.id))
        })?;
        let meta: BTreeMap<String, String> = serde_json::from_str(&self.meta).map_err(|e| {
            MnemoError::Storage(format!("corrupt meta for memory {}: {e}", self.id))
        })?;
        Ok(MemoryRecord {
            id: self.id,
            kind,
            text: self.text,
            summary: self.summary,
            tags,
            importance: self.importance,
            created_at: parse_ts(&self.created_at)?,
            last_accessed_at: parse_ts(&self.last_accessed_at)?,
            meta,
        })
    }
}

fn collect_records<I>(rows: I) -> Result<Vec<MemoryRecord>>
where
    I: Iterator<Item = rusqlite::Result<RawRecord>>,
{
    rows.map(|row| row.map_err(MnemoError::storage)?.into_record())
        .collect()
}
