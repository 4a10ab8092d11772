use auth::{AssertionProvider, CliProvider, SdkProvider, TokenProvider};
use auth::key::ServiceAccountKey;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod pipeline;

use config::Settings;
use pipeline::DeployError;

/// Merge a local parameter document into the hosted remote config template
/// and publish the result.
#[derive(Parser)]
#[command(name = "uplink")]
struct Cli {
    #[command(subcommand)]
    credentials: Credentials,
}

#[derive(Subcommand)]
enum Credentials {
    /// Reuse the token of an already-authenticated gcloud CLI
    Gcloud,
    /// Mint a signed assertion from a service-account key and exchange it
    ServiceAccount,
    /// Let the Google auth library mint a token from the key
    Sdk,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => {
            if let Err(error) = result {
                eprintln!("error: {error}");
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<(), DeployError> {
    let settings = Settings::load()?;

    let (provider, project_id): (Box<dyn TokenProvider>, String) = match cli.credentials {
        Credentials::Gcloud => {
            let project_id = settings
                .project_id
                .clone()
                .ok_or(DeployError::MissingProjectId)?;
            (Box::new(CliProvider::new()), project_id)
        }
        Credentials::ServiceAccount => {
            let (path, key) = ServiceAccountKey::locate(&settings.key_paths)?;
            println!("Using service account key {}", path.display());
            let project_id = settings
                .project_id
                .clone()
                .unwrap_or_else(|| key.project_id.clone());
            (Box::new(AssertionProvider::new(key)), project_id)
        }
        Credentials::Sdk => {
            let (path, key) = ServiceAccountKey::locate(&settings.key_paths)?;
            println!("Using service account key {}", path.display());
            let project_id = settings
                .project_id
                .clone()
                .unwrap_or_else(|| key.project_id.clone());
            (Box::new(SdkProvider::new(key)), project_id)
        }
    };

    println!("Deploying remote config for project {project_id}");
    pipeline::run(&settings, &project_id, provider.as_ref()).await?;
    println!("Done.");

    Ok(())
}
