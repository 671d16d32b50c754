//! SQLite result store

use async_trait::async_trait;
use chorus_application::ports::result_store::{ResultStore, StorageError};
use chorus_domain::{
    Classification, ComparisonRun, DomainError, NO_MAJORITY_KEY, Outcome, ProviderId, RunId,
    RunStats, SafetyQuery, Verdict,
};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS runs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        prompt TEXT NOT NULL,
        category_hint TEXT,
        submitted_at TEXT NOT NULL,
        agreement INTEGER NOT NULL,
        majority TEXT,
        dissenters TEXT NOT NULL,
        category TEXT,
        voters INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS verdicts (
        run_id INTEGER NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
        provider TEXT NOT NULL,
        classification TEXT,
        outcome TEXT NOT NULL,
        latency_ms INTEGER NOT NULL,
        rationale TEXT NOT NULL,
        concerns TEXT NOT NULL,
        error TEXT,
        PRIMARY KEY (run_id, provider)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_runs_agreement ON runs(agreement, id)",
];

/// SQLite configuration options
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Database URL (e.g., "sqlite:chorus_results.db?mode=rwc" or "sqlite::memory:")
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Busy timeout in seconds
    pub busy_timeout_secs: u32,
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:chorus_results.db?mode=rwc".to_string(),
            max_connections: 5,
            busy_timeout_secs: 30,
        }
    }
}

impl SqliteStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create config for in-memory database (testing)
    pub fn memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            busy_timeout_secs: 5,
        }
    }

    fn is_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Result store backed by a SQLite database
///
/// One row per run in `runs` (query and consensus columns) and one row per
/// provider in `verdicts`. A run is written in a single transaction.
#[derive(Debug, Clone)]
pub struct SqliteResultStore {
    pool: SqlitePool,
}

impl SqliteResultStore {
    /// Connect and create the schema if needed
    pub async fn connect(config: SqliteStoreConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .pragma("foreign_keys", "ON")
            .pragma("busy_timeout", (config.busy_timeout_secs * 1000).to_string());

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if config.is_memory() {
            // An in-memory database lives only as long as its connection.
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(storage_error)?;
        }

        info!(url = %config.url, "Connected to SQLite result store");
        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load_verdicts(&self, run_id: i64) -> Result<Vec<Verdict>, StorageError> {
        let rows = sqlx::query(
            "SELECT provider, classification, outcome, latency_ms, rationale, concerns, error \
             FROM verdicts WHERE run_id = ? ORDER BY provider",
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter().map(verdict_from_row).collect()
    }

    async fn load_run(&self, row: &SqliteRow) -> Result<ComparisonRun, StorageError> {
        let id: i64 = row.try_get("id").map_err(storage_error)?;
        let prompt: String = row.try_get("prompt").map_err(storage_error)?;
        let hint: Option<String> = row.try_get("category_hint").map_err(storage_error)?;
        let submitted_at: DateTime<Utc> = row.try_get("submitted_at").map_err(storage_error)?;
        let category: Option<String> = row.try_get("category").map_err(storage_error)?;

        let mut query = SafetyQuery::at(prompt, submitted_at).map_err(corrupt)?;
        if let Some(hint) = hint {
            query = query.with_category_hint(hint);
        }

        let verdicts = self.load_verdicts(id).await?;
        ComparisonRun::restore(RunId(id), query, verdicts, category).map_err(corrupt)
    }

    async fn load_runs(&self, rows: Vec<SqliteRow>) -> Result<Vec<ComparisonRun>, StorageError> {
        let mut runs = Vec::with_capacity(rows.len());
        for row in &rows {
            runs.push(self.load_run(row).await?);
        }
        Ok(runs)
    }
}

#[async_trait]
impl ResultStore for SqliteResultStore {
    async fn save(&self, run: &ComparisonRun) -> Result<RunId, StorageError> {
        let query = run.query();
        let consensus = run.consensus();
        let dissenters = consensus
            .dissenters
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let run_id = sqlx::query(
            "INSERT INTO runs (prompt, category_hint, submitted_at, agreement, majority, dissenters, category, voters) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(query.prompt())
        .bind(query.category_hint())
        .bind(query.submitted_at())
        .bind(consensus.agreement)
        .bind(consensus.majority.map(|c| c.as_str()))
        .bind(dissenters)
        .bind(consensus.category.as_deref())
        .bind(consensus.voters as i64)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?
        .last_insert_rowid();

        for verdict in run.verdicts() {
            let concerns = serde_json::to_string(verdict.concerns())
                .map_err(|e| StorageError::Corrupt(e.to_string()))?;

            sqlx::query(
                "INSERT INTO verdicts (run_id, provider, classification, outcome, latency_ms, rationale, concerns, error) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(run_id)
            .bind(verdict.provider().as_str())
            .bind(verdict.classification().map(|c| c.as_str()))
            .bind(verdict.outcome().as_str())
            .bind(verdict.latency().as_millis() as i64)
            .bind(verdict.rationale())
            .bind(concerns)
            .bind(verdict.error())
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;

        debug!(run_id, verdicts = run.verdicts().len(), "Saved run");
        Ok(RunId(run_id))
    }

    async fn get(&self, id: RunId) -> Result<Option<ComparisonRun>, StorageError> {
        let row = sqlx::query("SELECT * FROM runs WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        match row {
            Some(row) => Ok(Some(self.load_run(&row).await?)),
            None => Ok(None),
        }
    }

    async fn list_disagreements(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ComparisonRun>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM runs WHERE agreement = 0 ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        self.load_runs(rows).await
    }

    async fn list_runs(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ComparisonRun>, StorageError> {
        let rows = sqlx::query("SELECT * FROM runs ORDER BY id DESC LIMIT ? OFFSET ?")
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        self.load_runs(rows).await
    }

    async fn stats(&self) -> Result<RunStats, StorageError> {
        let totals = sqlx::query(
            "SELECT COUNT(*) AS total, \
                    COALESCE(SUM(agreement), 0) AS agreeing, \
                    COALESCE(SUM(CASE WHEN voters = 0 THEN 1 ELSE 0 END), 0) AS no_data \
             FROM runs",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        let by_majority_rows =
            sqlx::query("SELECT majority, COUNT(*) AS n FROM runs GROUP BY majority")
                .fetch_all(&self.pool)
                .await
                .map_err(storage_error)?;

        let mut by_majority = std::collections::BTreeMap::new();
        for row in &by_majority_rows {
            let key: Option<String> = row.try_get("majority").map_err(storage_error)?;
            let n: i64 = row.try_get("n").map_err(storage_error)?;
            by_majority.insert(
                key.unwrap_or_else(|| NO_MAJORITY_KEY.to_string()),
                n as usize,
            );
        }

        Ok(RunStats {
            total_runs: totals.try_get::<i64, _>("total").map_err(storage_error)? as usize,
            agreeing_runs: totals.try_get::<i64, _>("agreeing").map_err(storage_error)? as usize,
            no_data_runs: totals.try_get::<i64, _>("no_data").map_err(storage_error)? as usize,
            by_majority,
        })
    }

    async fn annotate(&self, id: RunId, category: &str) -> Result<ComparisonRun, StorageError> {
        let mut run = self.get(id).await?.ok_or(StorageError::NotFound(id))?;
        run.annotate(category).map_err(|e| match e {
            DomainError::AnnotationOnAgreement => StorageError::InvalidAnnotation(id),
            other => corrupt(other),
        })?;

        sqlx::query("UPDATE runs SET category = ? WHERE id = ?")
            .bind(category)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        info!(run_id = id.0, category, "Annotated run");
        Ok(run)
    }

    async fn aggregate_agreement_rate(&self) -> Result<f64, StorageError> {
        let rate: Option<f64> = sqlx::query_scalar("SELECT AVG(agreement) FROM runs")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(rate.unwrap_or(0.0))
    }
}

fn verdict_from_row(row: &SqliteRow) -> Result<Verdict, StorageError> {
    let provider: String = row.try_get("provider").map_err(storage_error)?;
    let classification: Option<String> = row.try_get("classification").map_err(storage_error)?;
    let outcome: String = row.try_get("outcome").map_err(storage_error)?;
    let latency_ms: i64 = row.try_get("latency_ms").map_err(storage_error)?;
    let rationale: String = row.try_get("rationale").map_err(storage_error)?;
    let concerns: String = row.try_get("concerns").map_err(storage_error)?;
    let error: Option<String> = row.try_get("error").map_err(storage_error)?;

    let provider = ProviderId::from_str(&provider).map_err(corrupt)?;
    let outcome = Outcome::from_str(&outcome).map_err(corrupt)?;
    let classification = classification
        .map(|c| Classification::from_str(&c))
        .transpose()
        .map_err(corrupt)?;
    let concerns: Vec<String> =
        serde_json::from_str(&concerns).map_err(|e| StorageError::Corrupt(e.to_string()))?;

    let verdict = Verdict::from_parts(
        provider,
        outcome,
        classification,
        rationale,
        Duration::from_millis(latency_ms.max(0) as u64),
        error,
    )
    .map_err(corrupt)?;
    Ok(verdict.with_concerns(concerns))
}

fn storage_error(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StorageError::Unavailable(e.to_string())
        }
        other => StorageError::Query(other.to_string()),
    }
}

fn corrupt(e: DomainError) -> StorageError {
    StorageError::Corrupt(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteResultStore {
        SqliteResultStore::connect(SqliteStoreConfig::memory())
            .await
            .unwrap()
    }

    fn ok(provider: ProviderId, classification: Classification) -> Verdict {
        Verdict::ok(
            provider,
            classification,
            format!("{} says {}", provider, classification),
            Duration::from_millis(420),
        )
    }

    fn run(prompt: &str, classes: [Classification; 3]) -> ComparisonRun {
        let verdicts = ProviderId::ALL
            .iter()
            .zip(classes)
            .map(|(p, c)| ok(*p, c))
            .collect();
        ComparisonRun::new(SafetyQuery::new(prompt).unwrap(), verdicts).unwrap()
    }

    fn split(prompt: &str) -> ComparisonRun {
        run(
            prompt,
            [
                Classification::Safe,
                Classification::Unsafe,
                Classification::Unsafe,
            ],
        )
    }

    fn unanimous(prompt: &str) -> ComparisonRun {
        run(prompt, [Classification::Safe; 3])
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let store = store().await;
        let verdicts = vec![
            ok(ProviderId::Claude, Classification::Safe),
            Verdict::timeout(ProviderId::Gpt, Duration::from_secs(30)),
            Verdict::ok(
                ProviderId::Llama,
                Classification::Unsafe,
                "Substance abuse concern",
                Duration::from_millis(900),
            )
            .with_concerns(vec!["Substance abuse concern".to_string()]),
        ];
        let query = SafetyQuery::new("How do I extract nicotine from tobacco?")
            .unwrap()
            .with_category_hint("chemistry");
        let original = ComparisonRun::new(query, verdicts).unwrap();

        let id = store.save(&original).await.unwrap();
        let loaded = store.get(id).await.unwrap().unwrap();

        assert_eq!(loaded, original.clone().with_id(id));
        assert_eq!(loaded.verdict(ProviderId::Gpt).unwrap().outcome(), Outcome::Timeout);
        assert_eq!(loaded.consensus().category.as_deref(), Some("tie"));
    }

    #[tokio::test]
    async fn test_sub_millisecond_latency_round_trip() {
        let store = store().await;
        let verdicts = vec![
            Verdict::ok(
                ProviderId::Claude,
                Classification::Safe,
                "Harmless.",
                Duration::from_micros(1_234_567),
            ),
            Verdict::provider_error(ProviderId::Gpt, "503", Duration::from_nanos(87_654_321)),
        ];
        let original =
            ComparisonRun::new(SafetyQuery::new("Is tea safe?").unwrap(), verdicts).unwrap();

        let id = store.save(&original).await.unwrap();
        let loaded = store.get(id).await.unwrap().unwrap();

        assert_eq!(loaded, original.with_id(id));
        assert_eq!(
            loaded.verdict(ProviderId::Claude).unwrap().latency(),
            Duration::from_millis(1234)
        );
    }

    #[tokio::test]
    async fn test_get_missing_run() {
        let store = store().await;
        assert!(store.get(RunId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disagreements_most_recent_first() {
        let store = store().await;
        store.save(&split("first")).await.unwrap();
        store.save(&unanimous("agreed")).await.unwrap();
        store.save(&split("second")).await.unwrap();

        let runs = store.list_disagreements(10, 0).await.unwrap();
        let prompts: Vec<_> = runs.iter().map(|r| r.query().prompt()).collect();
        assert_eq!(prompts, vec!["second", "first"]);

        let page = store.list_disagreements(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].query().prompt(), "first");
    }

    #[tokio::test]
    async fn test_list_runs_includes_agreement() {
        let store = store().await;
        store.save(&split("a")).await.unwrap();
        store.save(&unanimous("b")).await.unwrap();

        let runs = store.list_runs(10, 0).await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].query().prompt(), "b");
    }

    #[tokio::test]
    async fn test_agreement_rate_and_stats() {
        let store = store().await;
        assert_eq!(store.aggregate_agreement_rate().await.unwrap(), 0.0);

        store.save(&unanimous("a")).await.unwrap();
        store.save(&unanimous("b")).await.unwrap();
        store.save(&unanimous("c")).await.unwrap();
        store.save(&split("d")).await.unwrap();

        assert_eq!(store.aggregate_agreement_rate().await.unwrap(), 0.75);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_runs, 4);
        assert_eq!(stats.agreeing_runs, 3);
        assert_eq!(stats.no_data_runs, 0);
        assert_eq!(stats.by_majority.get("SAFE"), Some(&3));
        assert_eq!(stats.by_majority.get("UNSAFE"), Some(&1));
    }

    #[tokio::test]
    async fn test_no_data_run_is_counted() {
        let store = store().await;
        let failed = ComparisonRun::new(
            SafetyQuery::new("x").unwrap(),
            vec![Verdict::provider_error(
                ProviderId::Claude,
                "auth",
                Duration::ZERO,
            )],
        )
        .unwrap();
        store.save(&failed).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.no_data_runs, 1);
        assert_eq!(stats.by_majority.get(NO_MAJORITY_KEY), Some(&1));
        assert_eq!(store.list_disagreements(10, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_annotate_disagreement() {
        let store = store().await;
        let id = store.save(&split("nicotine")).await.unwrap();

        let annotated = store.annotate(id, "dual-use-information").await.unwrap();
        assert_eq!(
            annotated.consensus().category.as_deref(),
            Some("dual-use-information")
        );

        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded, annotated);
    }

    #[tokio::test]
    async fn test_annotate_agreement_rejected() {
        let store = store().await;
        let id = store.save(&unanimous("hello")).await.unwrap();

        let result = store.annotate(id, "dual-use-information").await;
        assert!(matches!(result, Err(StorageError::InvalidAnnotation(r)) if r == id));

        let missing = store.annotate(RunId(404), "x").await;
        assert!(matches!(missing, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_is_unavailable() {
        let result = SqliteResultStore::connect(SqliteStoreConfig::new("not-a-url://")).await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
    }
}
