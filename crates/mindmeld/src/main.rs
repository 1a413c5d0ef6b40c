use std::sync::Arc;

use mindmeld_core::{catalog::ContentCatalog, config::Config};

#[tokio::main]
async fn main() -> Result<(), mindmeld_core::Error> {
    mindmeld_core::logging::init("mindmeld")?;

    let cfg = Arc::new(Config::load()?);

    // A corrupted catalog is a programming error: fail here, not mid-request.
    let catalog = Arc::new(ContentCatalog::builtin(&cfg.assets_dir)?);
    catalog.warn_missing_files();

    mindmeld_telegram::router::run_polling(cfg, catalog)
        .await
        .map_err(|e| mindmeld_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
