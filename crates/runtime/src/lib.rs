use codenav_core::store::StoreError;
use codenav_core::{CodeNavConfig, CodeNavService, IdentityTranslator, Operations, SqliteStore};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

/// Assembles a navigator over the SQLite store named by `config`.
///
/// The store serves both as the document store and as the upload catalogue.
/// Positions are not translated between commits. The store handle is
/// returned as well so callers can seed it.
pub fn build_service(
    config: &CodeNavConfig,
    operations: Arc<Operations>,
) -> Result<(CodeNavService, SqliteStore), StoreError> {
    let store = SqliteStore::open(config)?;
    let shared = Arc::new(store.clone());
    let service = CodeNavService::new(
        shared.clone(),
        shared,
        Arc::new(IdentityTranslator),
        config,
        operations,
    );
    tracing::info!("Code navigation ready on {}", store.db_path().display());
    Ok((service, store))
}

/// Initializes logging for a component under the configured log directory.
pub fn init_logging(config: &CodeNavConfig, component: &str, to_stderr: bool) -> Option<WorkerGuard> {
    codenav_core::logging::init_logging(config, component, to_stderr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codenav_api::{CodeNavigator, RequestContext, Upload};

    #[tokio::test]
    async fn builds_over_a_fresh_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = CodeNavConfig {
            database_path: dir.path().join("nested").join("codenav.db"),
            pool_size: 2,
            ..CodeNavConfig::default()
        };
        let (service, store) = build_service(&config, Arc::new(Operations::default())).unwrap();
        store
            .insert_upload(&Upload {
                id: 1,
                repository_id: 7,
                repository_name: "github.com/acme/repo".to_string(),
                commit: "c1".to_string(),
                root: String::new(),
                indexer: "scip-go".to_string(),
            })
            .await
            .unwrap();

        let uploads = service
            .visible_uploads_for_path(&RequestContext::new(7, "c1", "main.go"))
            .await
            .unwrap();
        assert!(uploads.is_empty());
        assert_eq!(service.operations().visible_uploads.calls(), 1);
    }
}
