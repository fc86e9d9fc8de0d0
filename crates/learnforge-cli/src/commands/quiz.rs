//! The `learnforge quiz` command.

use std::path::PathBuf;

use anyhow::Result;

use learnforge_providers::load_config_from;

use super::print_outcome;

pub async fn execute(
    topic: String,
    provider: Option<String>,
    model: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let gateway = config.gateway(provider.as_deref(), model.as_deref())?;

    eprintln!(
        "Generating a quiz on '{topic}' with {}/{}...",
        gateway.provider_name(),
        gateway.model()
    );
    let generated = gateway.generate_quiz(&topic).await?;
    eprintln!(
        "Done in {}ms ({} tokens)",
        generated.response.latency_ms, generated.response.token_usage.total_tokens
    );

    print_outcome(&generated.outcome, &format)
}
