//! Postgres-backed inventory store.
//!
//! SKU uniqueness and identifier identity are enforced by the schema itself:
//! `id` is the primary key and `sku` carries the `items_sku_unique`
//! constraint. The database adjudicates conflicts; this module only maps
//! them onto inventory errors.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | InventoryError | Scenario |
//! |------------|----------------------|----------------|----------|
//! | Database (unique violation on a `sku` constraint) | `23505` | `DuplicateSku` | Create/update collides with another item's SKU |
//! | Database (other) | Any other | `Storage` | Check constraint, unique violation on `id`, etc. |
//! | PoolClosed / Io / Tls / ... | N/A | `Storage` | Connection failures |
//!
//! Zero affected rows on `UPDATE`/`DELETE` map to `NotFound`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{FromRow, Row};
use tracing::{field, instrument, warn, Span};

use stockroom_core::{Clock, InventoryError, InventoryResult, ItemId, SystemClock};
use stockroom_inventory::{Item, ItemDraft};

use super::r#trait::InventoryStore;

const SKU_CONSTRAINT: &str = "items_sku_unique";

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id           VARCHAR(20) PRIMARY KEY,
        sku          VARCHAR(12) NOT NULL,
        name         TEXT NOT NULL,
        description  TEXT NOT NULL DEFAULT '',
        price_cad    DOUBLE PRECISION NULL CHECK (price_cad IS NULL OR price_cad >= 0),
        quantity     BIGINT NOT NULL DEFAULT 0 CHECK (quantity >= 0),
        date_added   TIMESTAMPTZ NOT NULL,
        last_updated TIMESTAMPTZ NOT NULL CHECK (last_updated >= date_added),
        CONSTRAINT items_sku_unique UNIQUE (sku)
    )
    "#,
    // Reserved for soft delete; nothing writes to it.
    r#"
    CREATE TABLE IF NOT EXISTS deleted_items (
        id           VARCHAR(20) PRIMARY KEY,
        sku          VARCHAR(12) NOT NULL,
        name         TEXT NOT NULL,
        description  TEXT NOT NULL DEFAULT '',
        price_cad    DOUBLE PRECISION NULL,
        quantity     BIGINT NOT NULL DEFAULT 0,
        date_added   TIMESTAMPTZ NOT NULL,
        last_updated TIMESTAMPTZ NOT NULL,
        date_deleted TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Postgres-backed inventory store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync`. Each operation is a
/// single statement except `bulk_load`, which runs in one transaction.
///
/// ## Timestamps
///
/// Timestamps are read from the store's [`Clock`] (not `now()` in SQL) and
/// truncated to microseconds, the precision of `TIMESTAMPTZ`, so the values
/// returned by `create` equal what a later `get` reads back.
#[derive(Debug)]
pub struct PostgresInventoryStore<C = SystemClock> {
    pool: Arc<PgPool>,
    clock: C,
}

impl PostgresInventoryStore {
    /// Connect and make sure the schema exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> InventoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and make sure the schema exists.
    pub async fn from_pool(pool: PgPool) -> InventoryResult<Self> {
        let store = Self {
            pool: Arc::new(pool),
            clock: SystemClock,
        };
        store.init_schema().await?;
        Ok(store)
    }
}

impl<C: Clock> PostgresInventoryStore<C> {
    /// Swap the time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> PostgresInventoryStore<C2> {
        PostgresInventoryStore {
            pool: self.pool,
            clock,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn init_schema(&self) -> InventoryResult<()> {
        for ddl in SCHEMA {
            sqlx::query(ddl)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("init_schema", e))?;
        }
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }
}

#[async_trait]
impl<C: Clock> InventoryStore for PostgresInventoryStore<C> {
    #[instrument(skip(self, draft), fields(sku = %draft.sku, id = field::Empty))]
    async fn create(&self, draft: ItemDraft) -> InventoryResult<Item> {
        let item = Item::create(ItemId::generate(), draft, self.now());

        sqlx::query(
            r#"
            INSERT INTO items (
                id,
                sku,
                name,
                description,
                price_cad,
                quantity,
                date_added,
                last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(item.id.as_str())
        .bind(&item.sku)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.quantity)
        .bind(item.date_added)
        .bind(item.last_updated)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_write_error("create_item", &item.sku, e))?;

        Span::current().record("id", item.id.as_str());
        Ok(item)
    }

    #[instrument(skip(self, id, draft), fields(id = %id, sku = %draft.sku))]
    async fn update(&self, id: &ItemId, draft: ItemDraft) -> InventoryResult<()> {
        let now = self.now();

        // GREATEST keeps last_updated >= date_added even if the clock steps back.
        let res = sqlx::query(
            r#"
            UPDATE items
            SET
                sku = $1,
                name = $2,
                description = $3,
                price_cad = $4,
                quantity = $5,
                last_updated = GREATEST($6, date_added)
            WHERE id = $7
            "#,
        )
        .bind(&draft.sku)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.quantity.unwrap_or(0))
        .bind(now)
        .bind(id.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_write_error("update_item", &draft.sku, e))?;

        if res.rows_affected() == 0 {
            return Err(InventoryError::not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self, id), fields(id = %id))]
    async fn delete(&self, id: &ItemId) -> InventoryResult<()> {
        let res = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;

        if res.rows_affected() == 0 {
            return Err(InventoryError::not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self, id), fields(id = %id))]
    async fn get(&self, id: &ItemId) -> InventoryResult<Item> {
        let row = sqlx::query(
            r#"
            SELECT
                id,
                sku,
                name,
                description,
                price_cad,
                quantity,
                date_added,
                last_updated
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_item", e))?;

        match row {
            Some(row) => decode_item(&row),
            None => Err(InventoryError::not_found(id)),
        }
    }

    #[instrument(skip(self), fields(item_count = field::Empty))]
    async fn list(&self) -> InventoryResult<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                sku,
                name,
                description,
                price_cad,
                quantity,
                date_added,
                last_updated
            FROM items
            ORDER BY date_added ASC, id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        Span::current().record("item_count", rows.len());
        rows.iter().map(decode_item).collect()
    }

    #[instrument(skip(self, items), fields(item_count = items.len()))]
    async fn bulk_load(&self, items: Vec<Item>) -> InventoryResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO items (
                    id,
                    sku,
                    name,
                    description,
                    price_cad,
                    quantity,
                    date_added,
                    last_updated
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id)
                DO UPDATE SET
                    sku = EXCLUDED.sku,
                    name = EXCLUDED.name,
                    description = EXCLUDED.description,
                    price_cad = EXCLUDED.price_cad,
                    quantity = EXCLUDED.quantity,
                    date_added = EXCLUDED.date_added,
                    last_updated = EXCLUDED.last_updated
                "#,
            )
            .bind(item.id.as_str())
            .bind(&item.sku)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.price)
            .bind(item.quantity)
            .bind(item.date_added)
            .bind(item.last_updated)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error("bulk_load", &item.sku, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

// SQLx row types

#[derive(Debug)]
struct ItemRow {
    id: String,
    sku: String,
    name: String,
    description: String,
    price_cad: Option<f64>,
    quantity: i64,
    date_added: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow {
            id: row.try_get("id")?,
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price_cad: row.try_get("price_cad")?,
            quantity: row.try_get("quantity")?,
            date_added: row.try_get("date_added")?,
            last_updated: row.try_get("last_updated")?,
        })
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = InventoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let id = ItemId::try_from(row.id)
            .map_err(|e| InventoryError::storage(format!("corrupt item row: {e}")))?;
        Ok(Item {
            id,
            sku: row.sku,
            name: row.name,
            description: row.description,
            price: row.price_cad,
            quantity: row.quantity,
            date_added: row.date_added,
            last_updated: row.last_updated,
        })
    }
}

fn decode_item(row: &PgRow) -> InventoryResult<Item> {
    ItemRow::from_row(row)
        .map_err(|e| InventoryError::storage(format!("failed to deserialize item row: {e}")))?
        .try_into()
}

/// Map errors from statements that write a SKU; SKU collisions become `DuplicateSku`.
fn map_write_error(operation: &str, sku: &str, err: sqlx::Error) -> InventoryError {
    if is_sku_violation(&err) {
        return InventoryError::duplicate_sku(sku);
    }
    map_sqlx_error(operation, err)
}

/// Map SQLx errors to InventoryError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> InventoryError {
    let err = match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            InventoryError::storage(format!(
                "database error in {operation} ({code}): {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            InventoryError::storage(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            InventoryError::storage(format!("timed out acquiring a connection in {operation}"))
        }
        other => InventoryError::storage(format!("sqlx error in {operation}: {other}")),
    };
    warn!(operation, error = %err, "postgres operation failed");
    err
}

/// Check if an error is a unique violation of the SKU constraint.
fn is_sku_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return is_sku_unique_violation(db_err.code().as_deref(), db_err.constraint());
    }
    false
}

/// Tables created elsewhere carry Postgres' default name (`items_sku_key`)
/// rather than ours, so any unique constraint naming `sku` counts.
fn is_sku_unique_violation(code: Option<&str>, constraint: Option<&str>) -> bool {
    code == Some("23505")
        && constraint.is_some_and(|name| name == SKU_CONSTRAINT || name.contains("sku"))
}

#[cfg(test)]
mod tests {
    //! These run only when `DATABASE_URL` points at a disposable database.

    use super::*;
    use crate::store::conformance;

    async fn test_store() -> Option<PostgresInventoryStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let store = PostgresInventoryStore::connect(&url, 2)
            .await
            .expect("failed to connect to test database");
        sqlx::query("DELETE FROM items")
            .execute(store.pool())
            .await
            .expect("failed to clear items");
        Some(store)
    }

    #[tokio::test]
    async fn conformance_suite_and_fixtures() {
        let Some(store) = test_store().await else {
            eprintln!("DATABASE_URL not set; skipping postgres store tests");
            return;
        };
        conformance::run_all(&store).await;

        // Fixtures keep their identifiers and timestamps.
        let at = DateTime::<Utc>::from_timestamp(1_600_000_000, 0).unwrap();
        let item = Item::create(
            ItemId::parse("00000000000000000fa1").unwrap(),
            ItemDraft::new("FIX-1", "fixture").with_price(1.0),
            at,
        );
        store.bulk_load(vec![item.clone()]).await.unwrap();
        assert_eq!(store.get(&item.id).await.unwrap(), item);

        let err = store.create(ItemDraft::new("FIX-1", "dup")).await.unwrap_err();
        assert_eq!(err, InventoryError::duplicate_sku("FIX-1"));

        store.delete(&item.id).await.unwrap();
        store.close().await;
    }

    #[test]
    fn non_database_errors_are_storage_errors() {
        let err = map_write_error("create_item", "AAAA", sqlx::Error::PoolClosed);
        assert_eq!(
            err,
            InventoryError::storage("connection pool closed in create_item")
        );
        assert!(!is_sku_violation(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn sku_violations_are_recognised_by_constraint_name() {
        assert!(is_sku_unique_violation(Some("23505"), Some("items_sku_unique")));
        assert!(is_sku_unique_violation(Some("23505"), Some("items_sku_key")));
        assert!(!is_sku_unique_violation(Some("23505"), Some("items_pkey")));
        assert!(!is_sku_unique_violation(Some("23505"), None));
        assert!(!is_sku_unique_violation(Some("23514"), Some("items_sku_unique")));
    }
}
