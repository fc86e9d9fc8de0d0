//! The `learnforge init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    let path = Path::new("learnforge.toml");
    if path.exists() {
        println!("learnforge.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG).context("failed to write learnforge.toml")?;
        println!("Created learnforge.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set GEMINI_API_KEY and JWT_SECRET (or put them in .env)");
    println!("  2. Try the parser: learnforge parse --input response.txt --topic Rust");
    println!("  3. Start the API: learnforge serve");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# learnforge configuration

default_provider = "gemini"
default_model = "gemini-1.5-flash"
max_attempts = 3
retry_delay_ms = 2000

[server]
bind = "127.0.0.1:5000"
public_url = "http://localhost:5000"
client_url = "http://localhost:5173"
cors_origins = ["http://localhost:5173", "http://localhost:5174", "http://localhost:5175"]

[database]
path = "learnforge.db"

[auth]
jwt_secret = "${JWT_SECRET}"
token_ttl_secs = 3600

# [auth.oauth.google]
# client_id = "${GOOGLE_CLIENT_ID}"
# client_secret = "${GOOGLE_CLIENT_SECRET}"

# [auth.oauth.github]
# client_id = "${GITHUB_CLIENT_ID}"
# client_secret = "${GITHUB_CLIENT_SECRET}"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.mock]
type = "mock"
"#;
