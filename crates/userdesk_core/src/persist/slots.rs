//! Named text slots over SQLite.

use crate::db::DbResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value medium holding opaque text values under fixed names.
pub trait SlotStore {
    /// Reads one slot; `None` when it was never written.
    fn read_slot(&self, key: &str) -> DbResult<Option<String>>;

    /// Writes every entry or none of them.
    fn write_slots(&self, entries: &[(&str, &str)]) -> DbResult<()>;
}

/// `kv_slots` table accessor bound to a migrated connection.
pub struct SqliteSlotStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotStore for SqliteSlotStore<'_> {
    fn read_slot(&self, key: &str) -> DbResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_slots WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write_slots(&self, entries: &[(&str, &str)]) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT INTO kv_slots (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
