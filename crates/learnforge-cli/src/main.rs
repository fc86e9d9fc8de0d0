//! learnforge CLI: serve the API, parse model output, generate quizzes.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod client;
mod commands;

#[derive(Parser)]
#[command(name = "learnforge", version, about = "AI-assisted quizzes and learning paths")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Listen address, overriding the config
        #[arg(long)]
        bind: Option<String>,
    },

    /// Create a starter learnforge.toml
    Init,

    /// Parse a saved model response into quiz questions
    Parse {
        /// File holding the raw response ("-" for stdin)
        #[arg(long)]
        input: PathBuf,

        /// Quiz topic, used to pick fallback questions
        #[arg(long)]
        topic: String,

        /// Output format: json, table
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Generate a quiz with the configured provider
    Quiz {
        /// Quiz topic
        #[arg(long)]
        topic: String,

        /// Provider name, overriding the config default
        #[arg(long)]
        provider: Option<String>,

        /// Model id, overriding the config default
        #[arg(long)]
        model: Option<String>,

        /// Output format: json, table
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Work with quizzes saved on a running server
    Quizzes {
        #[command(subcommand)]
        action: QuizzesAction,
    },

    /// Show learning paths saved on a running server
    Paths {
        /// Server base URL
        #[arg(long, env = "LEARNFORGE_SERVER", default_value = "http://localhost:5000")]
        server: String,

        /// Bearer token from /api/auth/login
        #[arg(long, env = "LEARNFORGE_TOKEN")]
        token: String,
    },
}

#[derive(Subcommand)]
enum QuizzesAction {
    /// List saved quizzes
    List {
        /// Server base URL
        #[arg(long, env = "LEARNFORGE_SERVER", default_value = "http://localhost:5000")]
        server: String,

        /// Bearer token from /api/auth/login
        #[arg(long, env = "LEARNFORGE_TOKEN")]
        token: String,
    },

    /// Parse a response file and save it as a quiz
    Push {
        /// Server base URL
        #[arg(long, env = "LEARNFORGE_SERVER", default_value = "http://localhost:5000")]
        server: String,

        /// Bearer token from /api/auth/login
        #[arg(long, env = "LEARNFORGE_TOKEN")]
        token: String,

        /// File holding the raw model response
        #[arg(long)]
        input: PathBuf,

        /// Quiz topic
        #[arg(long)]
        topic: String,

        /// Quiz title (defaults to "<topic> Quiz")
        #[arg(long)]
        title: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("learnforge=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { config, bind } => commands::serve::execute(config, bind).await,
        Commands::Init => commands::init::execute(),
        Commands::Parse {
            input,
            topic,
            format,
        } => commands::parse::execute(input, topic, format),
        Commands::Quiz {
            topic,
            provider,
            model,
            format,
            config,
        } => commands::quiz::execute(topic, provider, model, format, config).await,
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Quizzes { action } => match action {
            QuizzesAction::List { server, token } => {
                commands::quizzes::list(server, token).await
            }
            QuizzesAction::Push {
                server,
                token,
                input,
                topic,
                title,
            } => commands::quizzes::push(server, token, input, topic, title).await,
        },
        Commands::Paths { server, token } => commands::paths::execute(server, token).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
