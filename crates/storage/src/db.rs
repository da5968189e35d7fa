use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqliteConnection};
use std::path::Path;
use wattcompare_core::{ApplianceId, ApplianceRecord, NewAppliance};

pub type DbPool = Pool<Sqlite>;

type ApplianceRow = (i64, String, Option<f64>, f64, f64, DateTime<Utc>);

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Private in-memory database. The single connection is pinned so the data
/// lives as long as the pool.
pub async fn create_memory_db() -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appliances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            energy_kwh REAL CHECK (energy_kwh IS NULL OR energy_kwh >= 0),
            price REAL NOT NULL,
            energy_rate REAL NOT NULL,
            timestamp TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Repository over the `appliances` table.
///
/// Each operation checks a connection out of the pool for its own duration;
/// the connection goes back when the operation returns, on success or error.
#[derive(Debug, Clone)]
pub struct ApplianceStore {
    pool: DbPool,
}

impl ApplianceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Waits for checked-out connections to return, then closes the pool.
    /// A file database is checkpointed on close.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn connection(&self) -> Result<sqlx::pool::PoolConnection<Sqlite>, sqlx::Error> {
        self.pool.acquire().await
    }

    pub async fn insert(&self, appliance: &NewAppliance) -> Result<ApplianceId, sqlx::Error> {
        let mut conn = self.connection().await?;
        let (id,) = sqlx::query_as::<_, (i64,)>(
            "INSERT INTO appliances (name, energy_kwh, price, energy_rate, timestamp) VALUES (?, ?, ?, ?, ?) RETURNING id"
        )
        .bind(appliance.name.as_str())
        .bind(appliance.energy_kwh)
        .bind(appliance.price)
        .bind(appliance.energy_rate)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        tracing::debug!(id, name = %appliance.name, "appliance inserted");
        Ok(ApplianceId(id))
    }

    /// All records in insertion order.
    pub async fn list(&self) -> Result<Vec<ApplianceRecord>, sqlx::Error> {
        let mut conn = self.connection().await?;
        fetch_rows(
            &mut conn,
            "SELECT id, name, energy_kwh, price, energy_rate, timestamp FROM appliances ORDER BY id",
            &[],
        )
        .await
    }

    /// Up to two records; ids that do not exist are simply missing from the result.
    pub async fn get_by_ids(
        &self,
        first: ApplianceId,
        second: ApplianceId,
    ) -> Result<Vec<ApplianceRecord>, sqlx::Error> {
        let mut conn = self.connection().await?;
        fetch_rows(
            &mut conn,
            "SELECT id, name, energy_kwh, price, energy_rate, timestamp FROM appliances WHERE id IN (?, ?) ORDER BY id",
            &[first.0, second.0],
        )
        .await
    }
}

async fn fetch_rows(
    conn: &mut SqliteConnection,
    sql: &str,
    ids: &[i64],
) -> Result<Vec<ApplianceRecord>, sqlx::Error> {
    let mut query = sqlx::query_as::<_, ApplianceRow>(sql);
    for id in ids {
        query = query.bind(*id);
    }
    let rows = query.fetch_all(conn).await?;

    Ok(rows
        .into_iter()
        .map(|r| ApplianceRecord {
            id: ApplianceId(r.0),
            name: r.1,
            energy_kwh: r.2,
            price: r.3,
            energy_rate: r.4,
            timestamp: r.5,
        })
        .collect())
}
