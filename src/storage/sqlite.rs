//! SQLite storage implementation

use std::path::{Path, PathBuf};
use chrono::Utc;
use rusqlite::{Connection, params, OptionalExtension};
use tracing::{debug, info};
use crate::{Result, Error};
use crate::currency::{Currency, format_euro_cents};
use crate::postage::PostageRate;
use crate::stamp::{NewStamp, Stamp};
use super::schema;

const STAMP_COLUMNS: &str = "s.id, s.name, s.value, s.currency, s.euro_cents, s.n, s.postage_rate_id, r.name, s.updated_at";
const RATE_COLUMNS: &str = "id, name, value, max_weight, updated_at";

/// SQLite-backed store for the stamp collection and postage rates.
///
/// Holds only the database path. Every operation opens its own connection,
/// runs one statement in autocommit mode and drops the connection on return.
#[derive(Debug, Clone)]
pub struct StampStore {
    path: PathBuf,
    seeded: bool,
}

impl StampStore {
    /// Open a database file, creating it and its directory if needed.
    ///
    /// Applies the schema and, when `postage_rates` is empty, loads the
    /// default rates.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        crate::config::ensure_db_dir(&path)?;

        let mut store = Self { path, seeded: false };
        store.initialize_schema()?;
        store.seeded = store.load_initial_data()?;
        debug!(path = %store.path.display(), "opened stamp store");
        Ok(store)
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if this `open` loaded the default postage rates
    pub fn initial_data_loaded(&self) -> bool {
        self.seeded
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    /// Run a script inside one transaction
    fn run_script(&self, script: &str) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute_batch(script)?;
        tx.commit()?;
        Ok(())
    }

    fn initialize_schema(&self) -> Result<()> {
        self.run_script(schema::SCHEMA)
    }

    fn load_initial_data(&self) -> Result<bool> {
        let count = self.count_rates()?;
        if count > 0 {
            debug!(count, "postage rates already present, skipping initial data");
            return Ok(false);
        }

        self.run_script(schema::INIT_DATA)?;
        info!("Initial postage rates loaded");
        Ok(true)
    }

    /// Load the example collection. Running it twice adds the stamps twice.
    pub fn load_sample_data(&self) -> Result<()> {
        self.run_script(schema::SAMPLE_DATA)?;
        info!("Sample data loaded");
        Ok(())
    }

    // ========== Stamp Operations ==========

    /// Add a stamp, computing its euro value. Returns the new row id.
    pub fn add_stamp(&self, stamp: &NewStamp) -> Result<i64> {
        stamp.validate()?;
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO stamps (name, value, currency, euro_cents, n, postage_rate_id, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                stamp.name,
                stamp.value,
                stamp.currency.as_str(),
                stamp.euro_cents(),
                stamp.quantity,
                stamp.postage_rate_id,
                Utc::now(),
            ],
        )
        .map_err(|e| rate_reference_error(e, stamp.postage_rate_id))?;

        let id = conn.last_insert_rowid();
        debug!(id, name = %stamp.name, euro_cents = stamp.euro_cents(), "added stamp");
        Ok(id)
    }

    /// Get a stamp by id, with its postage rate name
    pub fn get_stamp(&self, id: i64) -> Result<Option<Stamp>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT {STAMP_COLUMNS} FROM stamps s LEFT JOIN postage_rates r ON r.id = s.postage_rate_id WHERE s.id = ?1"
        );
        conn.query_row(&sql, [id], row_to_stamp)
            .optional()
            .map_err(Into::into)
    }

    /// All stamps ordered by name. Stamps without a rate have no rate name.
    pub fn list_stamps(&self) -> Result<Vec<Stamp>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT {STAMP_COLUMNS} FROM stamps s LEFT JOIN postage_rates r ON r.id = s.postage_rate_id ORDER BY s.name, s.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let stamps = stmt
            .query_map([], row_to_stamp)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stamps)
    }

    /// Set the number of copies owned. Returns false if no stamp has this id.
    pub fn update_stamp_quantity(&self, id: i64, quantity: u32) -> Result<bool> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE stamps SET n = ?1, updated_at = ?2 WHERE id = ?3",
            params![quantity, Utc::now(), id],
        )?;
        debug!(id, quantity, changed, "updated stamp quantity");
        Ok(changed > 0)
    }

    /// Delete a stamp by id. Returns false if no stamp has this id.
    pub fn delete_stamp(&self, id: i64) -> Result<bool> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM stamps WHERE id = ?1", [id])?;
        debug!(id, removed, "deleted stamp");
        Ok(removed > 0)
    }

    /// Remove every stamp, returning how many were removed
    pub fn clear_stamps(&self) -> Result<usize> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM stamps", [])?;
        info!(removed, "cleared stamp collection");
        Ok(removed)
    }

    /// Count stamp rows
    pub fn count_stamps(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM stamps", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Postage Rate Operations ==========

    /// Insert a rate, or replace the whole row if the name already exists.
    ///
    /// Replacing assigns a new id; stamps that pointed at the old row lose
    /// their reference (`ON DELETE SET NULL`).
    pub fn add_or_replace_rate(&self, name: &str, value: f64, max_weight: u32) -> Result<i64> {
        check_amount(value)?;
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO postage_rates (name, value, max_weight, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![name, value, max_weight, Utc::now()],
        )?;

        let id = conn.last_insert_rowid();
        debug!(id, name, value, max_weight, "stored postage rate");
        Ok(id)
    }

    /// All rates ordered by name
    pub fn list_rates(&self) -> Result<Vec<PostageRate>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {RATE_COLUMNS} FROM postage_rates ORDER BY name");
        let mut stmt = conn.prepare(&sql)?;
        let rates = stmt
            .query_map([], row_to_rate)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rates)
    }

    /// Get a rate by name
    pub fn get_rate_by_name(&self, name: &str) -> Result<Option<PostageRate>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {RATE_COLUMNS} FROM postage_rates WHERE name = ?1");
        conn.query_row(&sql, [name], row_to_rate)
            .optional()
            .map_err(Into::into)
    }

    /// Change value and max weight of an existing rate, keeping its id
    pub fn update_rate(&self, name: &str, value: f64, max_weight: u32) -> Result<bool> {
        check_amount(value)?;
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE postage_rates SET value = ?1, max_weight = ?2, updated_at = ?3 WHERE name = ?4",
            params![value, max_weight, Utc::now(), name],
        )?;
        debug!(name, changed, "updated postage rate");
        Ok(changed > 0)
    }

    /// Delete a rate by name. Stamps referencing it keep existing with no rate.
    pub fn delete_rate(&self, name: &str) -> Result<bool> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM postage_rates WHERE name = ?1", [name])?;
        debug!(name, removed, "deleted postage rate");
        Ok(removed > 0)
    }

    /// Count postage rates
    pub fn count_rates(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM postage_rates", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get collection statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.connect()?;
        let stats = conn.query_row(
            r#"
            SELECT
                (SELECT COUNT(*) FROM stamps),
                (SELECT COALESCE(SUM(n), 0) FROM stamps),
                (SELECT COUNT(*) FROM postage_rates),
                (SELECT COALESCE(SUM(euro_cents * n), 0) FROM stamps)
            "#,
            [],
            |row| {
                Ok(StoreStats {
                    stamps: row.get::<_, i64>(0)? as usize,
                    copies: row.get::<_, i64>(1)? as u64,
                    postage_rates: row.get::<_, i64>(2)? as usize,
                    total_euro_cents: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }
}

fn check_amount(value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidAmount(value));
    }
    Ok(())
}

/// Turn a foreign key failure on `postage_rate_id` into a typed error
fn rate_reference_error(err: rusqlite::Error, rate_id: Option<i64>) -> Error {
    match (&err, rate_id) {
        (rusqlite::Error::SqliteFailure(e, _), Some(id))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            Error::PostageRateNotFound(id)
        }
        _ => err.into(),
    }
}

fn row_to_stamp(row: &rusqlite::Row) -> rusqlite::Result<Stamp> {
    let currency_str: String = row.get(3)?;
    let currency: Currency = currency_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Stamp {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
        currency,
        euro_cents: row.get(4)?,
        quantity: row.get(5)?,
        postage_rate_id: row.get(6)?,
        postage_rate_name: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn row_to_rate(row: &rusqlite::Row) -> rusqlite::Result<PostageRate> {
    Ok(PostageRate {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
        max_weight: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Collection statistics
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StoreStats {
    /// Distinct stamp rows
    pub stamps: usize,
    /// Sum of quantities over all rows
    pub copies: u64,
    pub postage_rates: usize,
    /// Euro value of every copy owned, in cents
    pub total_euro_cents: i64,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Collection Statistics:")?;
        writeln!(f, "  Stamps: {}", self.stamps)?;
        writeln!(f, "  Copies: {}", self.copies)?;
        writeln!(f, "  Postage rates: {}", self.postage_rates)?;
        write!(f, "  Total value: {}", format_euro_cents(self.total_euro_cents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DEFAULT_RATES: usize = 5;

    fn open_store() -> (TempDir, StampStore) {
        let dir = TempDir::new().unwrap();
        let store = StampStore::open(dir.path().join("database").join("stamps.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_file_and_seeds_rates() {
        let (dir, store) = open_store();
        assert!(dir.path().join("database").join("stamps.db").exists());
        assert!(store.initial_data_loaded());
        assert_eq!(store.count_rates().unwrap(), DEFAULT_RATES);
        assert_eq!(store.count_stamps().unwrap(), 0);
    }

    #[test]
    fn test_reopen_does_not_reseed() {
        let (_dir, store) = open_store();
        store.add_or_replace_rate("Raccomandata", 5.4, 20).unwrap();

        let reopened = StampStore::open(store.path()).unwrap();
        assert!(!reopened.initial_data_loaded());
        assert_eq!(reopened.count_rates().unwrap(), DEFAULT_RATES + 1);
    }

    #[test]
    fn test_reopen_after_rates_deleted_reseeds() {
        let (_dir, store) = open_store();
        for rate in store.list_rates().unwrap() {
            assert!(store.delete_rate(&rate.name).unwrap());
        }
        assert_eq!(store.count_rates().unwrap(), 0);

        let reopened = StampStore::open(store.path()).unwrap();
        assert!(reopened.initial_data_loaded());
        assert_eq!(reopened.count_rates().unwrap(), DEFAULT_RATES);
    }

    #[test]
    fn test_add_eur_stamp() {
        let (_dir, store) = open_store();
        let id = store
            .add_stamp(&NewStamp::new("Europa", 0.85, Currency::Eur).with_quantity(4))
            .unwrap();

        let stamps = store.list_stamps().unwrap();
        assert_eq!(stamps.len(), 1);
        assert_eq!(stamps[0].id, id);
        assert_eq!(stamps[0].euro_cents, 85);
        assert_eq!(stamps[0].quantity, 4);
        assert_eq!(stamps[0].currency, Currency::Eur);
        assert_eq!(stamps[0].postage_rate_name, None);
    }

    #[test]
    fn test_add_itl_stamp() {
        let (_dir, store) = open_store();
        let id = store
            .add_stamp(&NewStamp::new("Lira classic", 100.0, Currency::Itl))
            .unwrap();

        let stamp = store.get_stamp(id).unwrap().unwrap();
        assert_eq!(stamp.euro_cents, 5);
        assert_eq!(stamp.quantity, 1);
        assert_eq!(stamp.value, 100.0);
    }

    #[test]
    fn test_unsupported_currency_writes_nothing() {
        let (_dir, store) = open_store();
        let result = NewStamp::from_code("Dollar", 1.0, "USD").and_then(|s| store.add_stamp(&s));
        assert!(matches!(result, Err(Error::UnsupportedCurrency(_))));
        assert_eq!(store.count_stamps().unwrap(), 0);
    }

    #[test]
    fn test_invalid_amount_writes_nothing() {
        let (_dir, store) = open_store();
        let result = store.add_stamp(&NewStamp::new("Broken", f64::NAN, Currency::Eur));
        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        assert_eq!(store.count_stamps().unwrap(), 0);
    }

    #[test]
    fn test_list_joins_rate_name_and_orders_by_name() {
        let (_dir, store) = open_store();
        let rate = store.get_rate_by_name("Posta Ordinaria 20g").unwrap().unwrap();

        store.add_stamp(&NewStamp::new("Zecchino", 1.2, Currency::Eur)).unwrap();
        store
            .add_stamp(&NewStamp::new("Aquila", 500.0, Currency::Itl).with_postage_rate(rate.id))
            .unwrap();
        store.add_stamp(&NewStamp::new("Michelangelo", 0.5, Currency::Eur)).unwrap();

        let stamps = store.list_stamps().unwrap();
        let names: Vec<_> = stamps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Aquila", "Michelangelo", "Zecchino"]);
        assert_eq!(stamps[0].postage_rate_id, Some(rate.id));
        assert_eq!(stamps[0].postage_rate_name.as_deref(), Some("Posta Ordinaria 20g"));
        assert_eq!(stamps[1].postage_rate_name, None);
    }

    #[test]
    fn test_unknown_rate_reference_is_rejected() {
        let (_dir, store) = open_store();
        let result = store.add_stamp(&NewStamp::new("Orphan", 1.0, Currency::Eur).with_postage_rate(9999));
        assert!(matches!(result, Err(Error::PostageRateNotFound(9999))));
        assert_eq!(store.count_stamps().unwrap(), 0);
    }

    #[test]
    fn test_update_quantity() {
        let (_dir, store) = open_store();
        let id = store.add_stamp(&NewStamp::new("Europa", 0.85, Currency::Eur)).unwrap();
        let before = store.get_stamp(id).unwrap().unwrap();

        assert!(store.update_stamp_quantity(id, 12).unwrap());
        let after = store.get_stamp(id).unwrap().unwrap();
        assert_eq!(after.quantity, 12);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.euro_cents, before.euro_cents);
    }

    #[test]
    fn test_update_quantity_missing_id() {
        let (_dir, store) = open_store();
        store.add_stamp(&NewStamp::new("Europa", 0.85, Currency::Eur)).unwrap();

        assert!(!store.update_stamp_quantity(424242, 3).unwrap());
        assert_eq!(store.count_stamps().unwrap(), 1);
        assert_eq!(store.list_stamps().unwrap()[0].quantity, 1);
    }

    #[test]
    fn test_delete_stamp() {
        let (_dir, store) = open_store();
        let id = store.add_stamp(&NewStamp::new("Europa", 0.85, Currency::Eur)).unwrap();

        assert!(store.delete_stamp(id).unwrap());
        assert!(!store.delete_stamp(id).unwrap());
        assert!(store.get_stamp(id).unwrap().is_none());
    }

    #[test]
    fn test_clear_stamps() {
        let (_dir, store) = open_store();
        for i in 0..3 {
            store
                .add_stamp(&NewStamp::new(format!("Stamp {i}"), 1.0, Currency::Eur))
                .unwrap();
        }
        let before = store.count_stamps().unwrap();

        assert_eq!(store.clear_stamps().unwrap(), before);
        assert!(store.list_stamps().unwrap().is_empty());
        assert_eq!(store.clear_stamps().unwrap(), 0);
    }

    #[test]
    fn test_add_or_replace_rate() {
        let (_dir, store) = open_store();
        let first = store.add_or_replace_rate("Raccomandata", 5.4, 20).unwrap();
        let second = store.add_or_replace_rate("Raccomandata", 6.1, 50).unwrap();
        assert_ne!(first, second);

        let rates = store.list_rates().unwrap();
        let matching: Vec<_> = rates.iter().filter(|r| r.name == "Raccomandata").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].id, second);
        assert_eq!(matching[0].value, 6.1);
        assert_eq!(matching[0].max_weight, 50);
    }

    #[test]
    fn test_list_rates_ordered_by_name() {
        let (_dir, store) = open_store();
        store.add_or_replace_rate("A rate", 1.0, 10).unwrap();
        let names: Vec<_> = store.list_rates().unwrap().into_iter().map(|r| r.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "A rate");
    }

    #[test]
    fn test_get_rate_by_name() {
        let (_dir, store) = open_store();
        let rate = store.get_rate_by_name("Posta Ordinaria 50g").unwrap().unwrap();
        assert_eq!(rate.value, 2.95);
        assert_eq!(rate.max_weight, 50);
        assert!(store.get_rate_by_name("Nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_update_rate() {
        let (_dir, store) = open_store();
        let before = store.get_rate_by_name("Posta Ordinaria 20g").unwrap().unwrap();

        assert!(store.update_rate("Posta Ordinaria 20g", 1.45, 25).unwrap());
        let after = store.get_rate_by_name("Posta Ordinaria 20g").unwrap().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.value, 1.45);
        assert_eq!(after.max_weight, 25);

        assert!(!store.update_rate("Nonexistent", 1.0, 10).unwrap());
    }

    #[test]
    fn test_delete_missing_rate() {
        let (_dir, store) = open_store();
        let before = store.count_rates().unwrap();
        assert!(!store.delete_rate("Never added").unwrap());
        assert_eq!(store.count_rates().unwrap(), before);
    }

    #[test]
    fn test_delete_referenced_rate_clears_reference() {
        let (_dir, store) = open_store();
        let rate_id = store.add_or_replace_rate("Raccomandata", 5.4, 20).unwrap();
        let stamp_id = store
            .add_stamp(&NewStamp::new("Europa", 0.85, Currency::Eur).with_postage_rate(rate_id))
            .unwrap();

        assert!(store.delete_rate("Raccomandata").unwrap());
        let stamp = store.get_stamp(stamp_id).unwrap().unwrap();
        assert_eq!(stamp.postage_rate_id, None);
        assert_eq!(stamp.postage_rate_name, None);
    }

    #[test]
    fn test_replace_referenced_rate_clears_reference() {
        let (_dir, store) = open_store();
        let old_id = store.add_or_replace_rate("Raccomandata", 5.4, 20).unwrap();
        let stamp_id = store
            .add_stamp(&NewStamp::new("Europa", 0.85, Currency::Eur).with_postage_rate(old_id))
            .unwrap();

        let new_id = store.add_or_replace_rate("Raccomandata", 6.1, 50).unwrap();
        assert_ne!(new_id, old_id);

        let stamp = store.get_stamp(stamp_id).unwrap().unwrap();
        assert_eq!(stamp.postage_rate_id, None);
        assert_eq!(stamp.postage_rate_name, None);
        assert_eq!(store.count_stamps().unwrap(), 1);
    }

    #[test]
    fn test_negative_counts_rejected_by_schema() {
        let (_dir, store) = open_store();
        let conn = Connection::open(store.path()).unwrap();

        let stamp = conn.execute(
            "INSERT INTO stamps (name, value, currency, euro_cents, n) VALUES ('x', 1, 'EUR', 100, -1)",
            [],
        );
        assert!(stamp.is_err());

        let rate = conn.execute(
            "INSERT INTO postage_rates (name, value, max_weight) VALUES ('x', 1.0, -20)",
            [],
        );
        assert!(rate.is_err());

        assert_eq!(store.count_stamps().unwrap(), 0);
        assert!(store.list_stamps().unwrap().is_empty());
        assert_eq!(store.list_rates().unwrap().len(), DEFAULT_RATES);
    }

    #[test]
    fn test_sample_data_and_stats() {
        let (_dir, store) = open_store();
        store.load_sample_data().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.stamps, 6);
        assert_eq!(stats.copies, 22);
        assert_eq!(stats.postage_rates, DEFAULT_RATES);
        // 62*2 + 60*5 + 41*10 + 34*3 + 77 + 280
        assert_eq!(stats.total_euro_cents, 1293);

        for stamp in store.list_stamps().unwrap() {
            assert_eq!(stamp.euro_cents, stamp.currency.to_euro_cents(stamp.value));
        }
    }

    #[test]
    fn test_stats_on_empty_collection() {
        let (_dir, store) = open_store();
        let stats = store.stats().unwrap();
        assert_eq!(stats.stamps, 0);
        assert_eq!(stats.copies, 0);
        assert_eq!(stats.total_euro_cents, 0);
        assert!(stats.to_string().contains("Total value: €0.00"));
    }
}
