//! The `learnforge list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use learnforge_providers::{create_provider, load_config_from};

pub fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut names: Vec<String> = config.providers.keys().cloned().collect();
    if !names.contains(&config.default_provider) {
        names.push(config.default_provider.clone());
    }
    names.sort();

    if let Some(filter) = &provider_filter {
        names.retain(|name| name == filter);
        if names.is_empty() {
            // Implicit providers can still be listed by name.
            names.push(filter.clone());
        }
    }

    for name in &names {
        let provider = create_provider(name, &config.provider_config(name)?)?;
        println!("Provider: {name}");
        for model in provider.available_models() {
            let marker = if *name == config.default_provider && model.id == config.default_model {
                " (default)"
            } else {
                ""
            };
            println!(
                "  {} - {} ({}K context){marker}",
                model.id,
                model.name,
                model.max_context / 1000,
            );
        }
        println!();
    }

    Ok(())
}
