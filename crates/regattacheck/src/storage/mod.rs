//! Storage layer for regattacheck.
//!
//! This module provides `SQLite`-based persistent storage for the roster,
//! the append-only check event ledger, the dolly tracker, and the metadata
//! singleton. Every mutating operation either fully applies or leaves state
//! exactly as before; multi-store mutations run inside one transaction.

pub mod migrations;
pub mod schema;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::identity::normalize_sail;
use crate::model::{
    ClassProgress, DollyEntry, DollyStatus, EventAction, EventOrigin, EventRecord, MetaRecord,
    RosterEntry, RosterUpload,
};

/// Meta table key under which the readiness singleton is stored.
const META_KEY: &str = "app";

/// Offline store backing the check workflow.
///
/// Holds the four logical tables described in the schema module. A single
/// active writer is assumed; WAL mode keeps concurrent readers consistent.
#[derive(Debug)]
pub struct Store {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Store {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // === Roster ===

    /// Replace the entire roster and update the metadata singleton.
    ///
    /// Runs as one transaction: the previous roster is cleared, all supplied
    /// rows are inserted, and the meta record (load timestamp, sorted
    /// distinct classes, row count) is overwritten. Readers see either the
    /// old roster with its meta record or the new one, never a mix.
    ///
    /// A later row with the same identity key overwrites an earlier one.
    /// Replacement is wholesale: uploading rows for one class still clears
    /// every other class.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; prior state is retained.
    pub fn replace_roster(&mut self, rows: &[RosterUpload]) -> Result<MetaRecord> {
        let loaded_at = Utc::now();
        let mut classes = BTreeSet::new();

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM roster", [])?;
        {
            let mut stmt = tx.prepare(
                r"
                INSERT OR REPLACE INTO roster
                    (id, class_name, country, sail, bow, crew, club, sail_norm)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
            )?;
            for row in rows {
                let entry = RosterEntry::from_upload(row);
                classes.insert(entry.class_name.clone());
                stmt.execute(params![
                    entry.id,
                    entry.class_name,
                    entry.country,
                    entry.sail,
                    entry.bow,
                    entry.crew,
                    entry.club,
                    entry.sail_norm,
                ])?;
            }
        }

        let meta = MetaRecord {
            loaded_at,
            classes: classes.into_iter().collect(),
            row_count: rows.len(),
        };
        tx.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![META_KEY, serde_json::to_string(&meta)?],
        )?;
        tx.commit()?;

        info!(
            "Loaded roster: {} rows across {} classes",
            meta.row_count,
            meta.classes.len()
        );
        Ok(meta)
    }

    /// Resolve a competitor by sail number.
    ///
    /// The raw sail text is normalized first. With a specific class the
    /// lookup is an exact identity-key get; with `None` the normalized-sail
    /// index is scanned and the first match in index order wins, which is
    /// ambiguous when two classes share a sail number.
    ///
    /// Returns `Ok(None)` on a miss (including empty normalized input).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_by_identity(
        &self,
        class_name: Option<&str>,
        raw_sail: &str,
    ) -> Result<Option<RosterEntry>> {
        let sail_norm = normalize_sail(raw_sail);
        if sail_norm.is_empty() {
            return Ok(None);
        }

        let result = match class_name {
            Some(class) => {
                let key = RosterEntry::identity_key(class, &sail_norm);
                self.conn
                    .query_row(
                        r"
                        SELECT id, class_name, country, sail, bow, crew, club, sail_norm
                        FROM roster WHERE id = ?1
                        ",
                        [key],
                        Self::row_to_entry,
                    )
                    .optional()?
            }
            None => self
                .conn
                .query_row(
                    r"
                    SELECT id, class_name, country, sail, bow, crew, club, sail_norm
                    FROM roster WHERE sail_norm = ?1
                    ORDER BY id LIMIT 1
                    ",
                    [sail_norm],
                    Self::row_to_entry,
                )
                .optional()?,
        };
        Ok(result)
    }

    /// Count total roster entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn roster_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM roster", [], |row| row.get(0))?;
        Ok(count)
    }

    // === Metadata ===

    /// Get the metadata singleton, if a roster has been loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the stored
    /// record cannot be decoded.
    pub fn meta(&self) -> Result<Option<MetaRecord>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = ?1", [META_KEY], |row| {
                row.get(0)
            })
            .optional()?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Whether a roster has been loaded.
    ///
    /// True iff the metadata singleton carries a load timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_ready(&self) -> Result<bool> {
        Ok(self.meta()?.is_some())
    }

    /// Class names from the most recent ingestion, sorted.
    ///
    /// Read from the stored meta record, not recomputed from current rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_classes(&self) -> Result<Vec<String>> {
        Ok(self.meta()?.map(|m| m.classes).unwrap_or_default())
    }

    // === Events ===

    /// Append a check event snapshotting the matched roster entry.
    ///
    /// Stamps the current time and a fresh collision-resistant id. There is
    /// no idempotence against duplicate submissions: two submissions yield
    /// two records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn append_event(
        &self,
        action: EventAction,
        entry: &RosterEntry,
        origin: EventOrigin,
    ) -> Result<EventRecord> {
        let record = EventRecord::capture(action, entry, origin);

        self.conn.execute(
            r"
            INSERT INTO events
                (id, ts, action, class_name, country, sail, sail_norm, bow, crew, club, origin)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ",
            params![
                record.id,
                record.ts.to_rfc3339(),
                record.action.to_string(),
                record.class_name,
                record.country,
                record.sail,
                record.sail_norm,
                record.bow,
                record.crew,
                record.club,
                record.origin.to_string(),
            ],
        )?;

        debug!(
            "Appended {} event {} for sail {}",
            record.action, record.id, record.sail_norm
        );
        Ok(record)
    }

    /// List events, newest timestamp first, optionally filtered by action.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_events(&self, action: Option<EventAction>) -> Result<Vec<EventRecord>> {
        let events = match action {
            Some(action) => {
                let mut stmt = self.conn.prepare(
                    r"
                    SELECT id, ts, action, class_name, country, sail, sail_norm,
                           bow, crew, club, origin
                    FROM events WHERE action = ?1
                    ORDER BY ts DESC, id DESC
                    ",
                )?;
                let rows = stmt
                    .query_map([action.to_string()], Self::row_to_event)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(
                    r"
                    SELECT id, ts, action, class_name, country, sail, sail_norm,
                           bow, crew, club, origin
                    FROM events
                    ORDER BY ts DESC, id DESC
                    ",
                )?;
                let rows = stmt
                    .query_map([], Self::row_to_event)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(events)
    }

    /// Count total events in the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn event_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Per-class completion counts for one action type.
    ///
    /// For each class in the stored class list: `total` is the number of
    /// roster entries in that class, `done` the number of distinct
    /// normalized sails in that class with at least one event of the given
    /// action (repeats count once). Always recomputed from full current
    /// state so it stays correct across arbitrary replace/reset sequences.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn snapshot_progress(&self, action: EventAction) -> Result<Vec<ClassProgress>> {
        let classes = self.list_classes()?;

        let mut totals: HashMap<String, i64> = HashMap::new();
        let mut stmt = self
            .conn
            .prepare("SELECT class_name, COUNT(*) FROM roster GROUP BY class_name")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            let (class, count) = row?;
            totals.insert(class, count);
        }

        let mut done: HashMap<String, i64> = HashMap::new();
        let mut stmt = self.conn.prepare(
            r"
            SELECT class_name, COUNT(DISTINCT sail_norm)
            FROM events WHERE action = ?1
            GROUP BY class_name
            ",
        )?;
        let rows = stmt.query_map([action.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (class, count) = row?;
            done.insert(class, count);
        }

        Ok(classes
            .into_iter()
            .map(|class_name| ClassProgress {
                total: totals.get(&class_name).copied().unwrap_or(0),
                done: done.get(&class_name).copied().unwrap_or(0),
                class_name,
            })
            .collect())
    }

    // === Dollies ===

    /// Create a dolly entry for every roster (class, bow) pair that lacks one.
    ///
    /// New entries get `status = ok` and a dolly number equal to the bow;
    /// existing entries are untouched, preserving operator annotations
    /// across roster re-ingestion. Idempotent and additive-only: entries
    /// whose bow disappeared from a later roster are never pruned.
    ///
    /// Returns the number of entries created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn ensure_dollies(&self) -> Result<usize> {
        let created = self.conn.execute(
            r"
            INSERT OR IGNORE INTO dollies (id, class_name, bow, dolly, status, note, updated_at)
            SELECT DISTINCT class_name || '::' || bow, class_name, bow, bow, 'ok', NULL, ?1
            FROM roster
            ",
            [Utc::now().to_rfc3339()],
        )?;

        if created > 0 {
            info!("Created {} dolly entries", created);
        }
        Ok(created)
    }

    /// Upsert the status of one dolly.
    ///
    /// An existing entry keeps its dolly number; a new one defaults it to
    /// the bow. The note is trimmed, a blank note is stored as none.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_dolly_status(
        &self,
        class_name: &str,
        bow: i64,
        status: DollyStatus,
        note: Option<&str>,
    ) -> Result<DollyEntry> {
        let id = DollyEntry::identity_key(class_name, bow);
        let note = note.map(str::trim).filter(|n| !n.is_empty());

        self.conn.execute(
            r"
            INSERT INTO dollies (id, class_name, bow, dolly, status, note, updated_at)
            VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                note = excluded.note,
                updated_at = excluded.updated_at
            ",
            params![
                id,
                class_name,
                bow,
                status.to_string(),
                note,
                Utc::now().to_rfc3339(),
            ],
        )?;

        self.conn
            .query_row(
                r"
                SELECT id, class_name, bow, dolly, status, note, updated_at
                FROM dollies WHERE id = ?1
                ",
                [&id],
                Self::row_to_dolly,
            )
            .optional()?
            .ok_or_else(|| Error::internal(format!("dolly entry {id} missing after upsert")))
    }

    /// List dolly entries, optionally filtered by class, ordered by
    /// (class name, bow ascending).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_dollies(&self, class_name: Option<&str>) -> Result<Vec<DollyEntry>> {
        let dollies = match class_name {
            Some(class) => {
                let mut stmt = self.conn.prepare(
                    r"
                    SELECT id, class_name, bow, dolly, status, note, updated_at
                    FROM dollies WHERE class_name = ?1
                    ORDER BY class_name, bow
                    ",
                )?;
                let rows = stmt
                    .query_map([class], Self::row_to_dolly)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(
                    r"
                    SELECT id, class_name, bow, dolly, status, note, updated_at
                    FROM dollies
                    ORDER BY class_name, bow
                    ",
                )?;
                let rows = stmt
                    .query_map([], Self::row_to_dolly)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(dollies)
    }

    // === Reset ===

    /// Clear the roster, event ledger, dolly tracker, and metadata singleton
    /// together in one transaction.
    ///
    /// The schema version is retained. After reset `is_ready()` is false.
    ///
    /// # Errors
    ///
    /// Returns an error if any delete fails; prior state is retained.
    pub fn reset(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM roster", [])?;
        tx.execute("DELETE FROM events", [])?;
        tx.execute("DELETE FROM dollies", [])?;
        tx.execute("DELETE FROM meta WHERE key = ?1", [META_KEY])?;
        tx.commit()?;

        info!("Cleared roster, events, dollies, and metadata");
        Ok(())
    }

    // === Row mapping ===

    /// Convert a database row to a `RosterEntry`.
    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<RosterEntry> {
        Ok(RosterEntry {
            id: row.get(0)?,
            class_name: row.get(1)?,
            country: row.get(2)?,
            sail: row.get(3)?,
            bow: row.get(4)?,
            crew: row.get(5)?,
            club: row.get(6)?,
            sail_norm: row.get(7)?,
        })
    }

    /// Convert a database row to an `EventRecord`.
    fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<EventRecord> {
        let action_str: String = row.get(2)?;
        let origin_str: String = row.get(10)?;

        let action = EventAction::parse(&action_str).unwrap_or_else(|| {
            warn!("Unknown event action: {}, defaulting to check_in", action_str);
            EventAction::CheckIn
        });
        let origin = EventOrigin::parse(&origin_str).unwrap_or_else(|| {
            warn!("Unknown event origin: {}, defaulting to manual", origin_str);
            EventOrigin::Manual
        });

        Ok(EventRecord {
            id: row.get(0)?,
            ts: parse_ts(&row.get::<_, String>(1)?),
            action,
            class_name: row.get(3)?,
            country: row.get(4)?,
            sail: row.get(5)?,
            sail_norm: row.get(6)?,
            bow: row.get(7)?,
            crew: row.get(8)?,
            club: row.get(9)?,
            origin,
        })
    }

    /// Convert a database row to a `DollyEntry`.
    fn row_to_dolly(row: &rusqlite::Row) -> rusqlite::Result<DollyEntry> {
        let status_str: String = row.get(4)?;
        let status = DollyStatus::parse(&status_str).unwrap_or_else(|| {
            warn!("Unknown dolly status: {}, defaulting to ok", status_str);
            DollyStatus::Ok
        });

        Ok(DollyEntry {
            id: row.get(0)?,
            class_name: row.get(1)?,
            bow: row.get(2)?,
            dolly: row.get(3)?,
            status,
            note: row.get(5)?,
            updated_at: parse_ts(&row.get::<_, String>(6)?),
        })
    }
}

/// Parse a stored RFC 3339 timestamp, falling back to now on corruption.
fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
