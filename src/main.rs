//! Gmail Agent entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gmail_agent::config::{Config, Secrets};
use gmail_agent::ui;

#[derive(Parser)]
#[command(name = "gmail-agent")]
#[command(about = "📬 Gmail Agent - search and summarize Gmail with Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Listen host (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate secrets and print the Google authorization URL
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = Config::load()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            gmail_agent::server::serve(config).await?;
        }

        Commands::Check => run_check()?,
    }

    Ok(())
}

fn run_check() -> Result<()> {
    let secrets = Secrets::from_env();
    let environment = secrets.environment()?;
    ui::print_header(&environment.to_string());

    ui::print_step("Checking secrets");
    if let Err(e) = secrets.validate() {
        ui::print_error(&e.to_string());
        return Err(e.into());
    }
    ui::print_success("Secrets validation passed");

    ui::print_step("Building OAuth URL");
    let config = Config::from_secrets(&secrets)?;
    let oauth = gmail_agent::auth::GoogleOAuth::new(config.google, reqwest::Client::new());
    match oauth.build_authorization_url(None) {
        Ok(url) => {
            ui::print_success("OAuth URL generation successful");
            println!("\n{}\n", url);
        }
        Err(e) => {
            ui::print_error(&e.to_string());
            return Err(e.into());
        }
    }

    Ok(())
}
