use std::sync::Arc;

use crate::config::AnalyticsConfig;
use crate::error::{GriddleError, Result};
use crate::schema::ingestion::{build_chain, IngestionChain};
use crate::store::writer::{EVENT_COMPOUND_INDEX, EVENT_INDEX_FIELDS};
use crate::store::StoreContext;

/// Flags of the `migrate-database` CLI surface.
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Apply columnar steps up to this version (ascending).
    pub upto: u32,
    /// Report whether pending steps remain, applying nothing.
    pub check: bool,
    /// List the steps that would run, applying nothing.
    pub plan: bool,
    /// With --plan or --check: include literal statement text.
    pub print_sql: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            upto: 9999,
            check: false,
            plan: false,
            print_sql: false,
        }
    }
}

/// Process exit status of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    UpToDate,
    /// `--check` found unapplied steps.
    PendingRemaining,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::UpToDate => 0,
            ExitStatus::PendingRemaining => 1,
        }
    }
}

/// One step that was pending at the time of the run.
#[derive(Debug, Clone)]
pub struct PlannedStep {
    pub backend: &'static str,
    pub version: u32,
    pub name: String,
    /// Present when `--print-sql` was requested and the step has
    /// statement text.
    pub sql: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub status: ExitStatus,
    pub planned: Vec<PlannedStep>,
}

/// Forward-only, idempotent schema migrator for both backends.
///
/// There is no applied-version ledger: each step checks its own current
/// state (table exists, index exists) before acting, so re-running is
/// always safe. The columnar backend runs first when active; document
/// migrations are unconditional.
pub struct Migrator {
    context: Arc<StoreContext>,
    chain: Option<IngestionChain>,
    collection: String,
}

impl Migrator {
    pub fn new(context: Arc<StoreContext>, config: &AnalyticsConfig) -> Self {
        let chain = config
            .mode
            .is_clustered()
            .then(|| build_chain(&context.topology, config));
        Self {
            context,
            chain,
            collection: config.document.events_collection.clone(),
        }
    }

    pub async fn migrate(&self, opts: &MigrateOptions) -> Result<MigrationReport> {
        let apply = !opts.check && !opts.plan;
        let mut planned = Vec::new();
        let mut pending_remaining = false;

        if let Some(chain) = &self.chain {
            let store = self.context.columnar()?;
            for (i, stmt) in chain.statements.iter().enumerate() {
                let version = (i + 1) as u32;
                if version > opts.upto {
                    break;
                }
                if store.table_exists(&stmt.table).await? {
                    continue;
                }
                pending_remaining = true;
                planned.push(PlannedStep {
                    backend: "columnar",
                    version,
                    name: stmt.name.to_string(),
                    sql: opts.print_sql.then(|| stmt.sql.clone()),
                });
                if apply {
                    store.execute(&stmt.sql).await.map_err(|e| {
                        GriddleError::MigrationStep {
                            step: stmt.name.to_string(),
                            message: e.to_string(),
                        }
                    })?;
                    tracing::info!(step = stmt.name, version, "applied columnar migration step");
                }
            }
        }

        if self.document_index_pending().await? {
            pending_remaining = true;
            planned.push(PlannedStep {
                backend: "document",
                version: 1,
                name: "events-collection-index".to_string(),
                sql: None,
            });
            if apply {
                let store = self.context.document()?;
                store
                    .create_index(&self.collection, EVENT_COMPOUND_INDEX, &EVENT_INDEX_FIELDS)
                    .await
                    .map_err(|e| GriddleError::MigrationStep {
                        step: "events-collection-index".to_string(),
                        message: e.to_string(),
                    })?;
                tracing::info!(
                    collection = %self.collection,
                    "applied document migration step"
                );
            }
        }

        let status = if opts.check && pending_remaining {
            ExitStatus::PendingRemaining
        } else {
            ExitStatus::UpToDate
        };
        Ok(MigrationReport { status, planned })
    }

    async fn document_index_pending(&self) -> Result<bool> {
        let store = self.context.document()?;
        let names = store.index_names(&self.collection).await?;
        Ok(!names.iter().any(|n| n == EVENT_COMPOUND_INDEX))
    }
}
