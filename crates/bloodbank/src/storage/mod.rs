//! Storage layer for bloodbank.
//!
//! Persisted state is two JSON records, the donor list and the target table,
//! kept under fixed keys in a `SQLite` key-value table. The [`Repository`]
//! trait is the load/save interface the rest of the crate is written against;
//! [`Storage`] implements it.
//!
//! Loading never fails. A missing record, unreadable database or malformed
//! JSON is logged and replaced by the empty donor list or the default target
//! table.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::donor::DonorRecord;
use crate::error::{Error, Result};
use crate::targets::TargetTable;

/// Key under which the donor list is stored.
pub const DONORS_KEY: &str = "donors";

/// Key under which the target table is stored.
pub const TARGETS_KEY: &str = "targets";

/// Load/save access to the registry's two persisted records.
pub trait Repository {
    /// Read the donor list, or an empty list if none is usable.
    fn load_donors(&self) -> Vec<DonorRecord>;

    /// Replace the stored donor list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be written.
    fn save_donors(&self, donors: &[DonorRecord]) -> Result<()>;

    /// Read the target table, or the default table if none is usable.
    fn load_targets(&self) -> TargetTable;

    /// Replace the stored target table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be written.
    fn save_targets(&self, targets: &TargetTable) -> Result<()>;

    /// Read, edit and write back the donor list as one step.
    ///
    /// `edit` returns whether it changed the list; an unchanged list is not
    /// written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be written.
    fn update_donors(&self, edit: &mut dyn FnMut(&mut Vec<DonorRecord>) -> bool) -> Result<()> {
        let mut donors = self.load_donors();
        if edit(&mut donors) {
            self.save_donors(&donors)?;
        }
        Ok(())
    }
}

impl<R: Repository + ?Sized> Repository for &R {
    fn load_donors(&self) -> Vec<DonorRecord> {
        (**self).load_donors()
    }

    fn save_donors(&self, donors: &[DonorRecord]) -> Result<()> {
        (**self).save_donors(donors)
    }

    fn load_targets(&self) -> TargetTable {
        (**self).load_targets()
    }

    fn save_targets(&self, targets: &TargetTable) -> Result<()> {
        (**self).save_targets(targets)
    }

    fn update_donors(&self, edit: &mut dyn FnMut(&mut Vec<DonorRecord>) -> bool) -> Result<()> {
        (**self).update_donors(edit)
    }
}

/// `SQLite`-backed key-value store.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
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

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
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

    /// Read the raw text stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        read_item(&self.conn, key)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        write_item(&self.conn, key, value)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let donor_count = self.load_donors().len();
        let targets_saved = self.get_item(TARGETS_KEY)?.is_some();

        let last_updated: Option<String> =
            self.conn
                .query_row("SELECT MAX(updated_at) FROM kv", [], |row| row.get(0))?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path)?.len()
        };

        Ok(StorageStats {
            donor_count,
            targets_saved,
            last_updated,
            db_size_bytes,
        })
    }
}

impl Repository for Storage {
    fn load_donors(&self) -> Vec<DonorRecord> {
        match self.get_item(DONORS_KEY) {
            Ok(text) => parse_donors(text.as_deref()),
            Err(e) => {
                warn!("Could not read donor list, treating it as empty: {}", e);
                Vec::new()
            }
        }
    }

    fn save_donors(&self, donors: &[DonorRecord]) -> Result<()> {
        let text = serde_json::to_string(donors)?;
        self.set_item(DONORS_KEY, &text)?;
        debug!("Saved {} donors", donors.len());
        Ok(())
    }

    fn load_targets(&self) -> TargetTable {
        match self.get_item(TARGETS_KEY) {
            Ok(text) => parse_targets(text.as_deref()),
            Err(e) => {
                warn!("Could not read targets, using defaults: {}", e);
                TargetTable::default()
            }
        }
    }

    fn save_targets(&self, targets: &TargetTable) -> Result<()> {
        let text = serde_json::to_string(targets)?;
        self.set_item(TARGETS_KEY, &text)?;
        debug!("Saved targets for {} groups", targets.len());
        Ok(())
    }

    fn update_donors(&self, edit: &mut dyn FnMut(&mut Vec<DonorRecord>) -> bool) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let mut donors = parse_donors(read_item(&tx, DONORS_KEY)?.as_deref());
        if edit(&mut donors) {
            write_item(&tx, DONORS_KEY, &serde_json::to_string(&donors)?)?;
            tx.commit()?;
            debug!("Saved {} donors", donors.len());
        }
        Ok(())
    }
}

fn read_item(conn: &Connection, key: &str) -> Result<Option<String>> {
    debug!("Reading '{}'", key);
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

fn write_item(conn: &Connection, key: &str, value: &str) -> Result<()> {
    debug!("Writing '{}' ({} bytes)", key, value.len());
    conn.execute(
        r"
        INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        ",
        params![key, value],
    )?;
    Ok(())
}

/// Parse a persisted donor list, keeping every record that is usable.
///
/// Text that is not a JSON array becomes an empty list. Inside an array,
/// entries that are not valid donor records are skipped one by one.
fn parse_donors(text: Option<&str>) -> Vec<DonorRecord> {
    let Some(text) = text else {
        return Vec::new();
    };
    let entries: Vec<serde_json::Value> = match serde_json::from_str(text) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Stored donor list is malformed, treating it as empty: {}", e);
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(donor) => Some(donor),
            Err(e) => {
                warn!("Skipping stored donor #{}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Parse a persisted target table; anything unusable becomes the defaults.
fn parse_targets(text: Option<&str>) -> TargetTable {
    let Some(text) = text else {
        return TargetTable::default();
    };
    TargetTable::from_json_lenient(text).unwrap_or_else(|| {
        warn!("Stored targets are malformed, using defaults");
        TargetTable::default()
    })
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    /// Number of donors in the stored list.
    pub donor_count: usize,
    /// Whether a target table has been saved (otherwise defaults apply).
    pub targets_saved: bool,
    /// Time of the most recent write, as recorded by `SQLite`.
    pub last_updated: Option<String>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
