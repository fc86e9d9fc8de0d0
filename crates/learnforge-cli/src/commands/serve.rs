//! The `learnforge serve` command.

use std::path::PathBuf;

use anyhow::Result;

use learnforge_providers::load_config_from;

pub async fn execute(config_path: Option<PathBuf>, bind: Option<String>) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    learnforge_server::serve(&config).await
}
