use anyhow::Context;
use codenav_core::SqliteStore;
use codenav_core::store::ImportBundle;
use std::path::Path;

pub async fn run(store: &SqliteStore, path: &Path) -> anyhow::Result<String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let bundle: ImportBundle =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    tracing::info!("Importing {}", path.display());
    let summary = store.import_bundle(bundle).await?;
    Ok(serde_json::to_string_pretty(&summary)?)
}
