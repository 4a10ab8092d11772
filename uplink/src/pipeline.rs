//! The fetch → merge → publish pipeline, parameterized over a credential
//! strategy.

use crate::config::{ConfigError, Settings};
use auth::{AuthError, TokenProvider};
use std::fs;
use std::io;
use std::path::PathBuf;
use template::document::DocumentError;
use template::{LocalDocument, merge};
use upstream::{ConfigClient, UpstreamError};

#[derive(thiserror::Error, Debug)]
pub enum DeployError {
    #[error(
        "local template not found: {0}; author the parameter document before deploying"
    )]
    MissingLocalTemplate(PathBuf),

    #[error(
        "no project id; set project_id in uplink.yaml or use a service-account strategy"
    )]
    MissingProjectId,

    #[error("settings error: {0}")]
    Config(#[from] ConfigError),

    #[error("parameter document error: {0}")]
    Document(#[from] DocumentError),

    #[error("credential error: {0}")]
    Auth(#[from] AuthError),

    #[error("remote config service error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("could not serialize merged template: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not write merged template to {path}: {source}")]
    WriteMerged { path: PathBuf, source: io::Error },
}

/// What a successful run did, for the final status report.
#[derive(Debug)]
pub struct DeploySummary {
    pub added_keys: Vec<String>,
    pub updated: usize,
    pub total: usize,
    pub version_number: Option<String>,
    pub update_time: Option<String>,
}

pub async fn run(
    settings: &Settings,
    project_id: &str,
    provider: &dyn TokenProvider,
) -> Result<DeploySummary, DeployError> {
    let local_path = &settings.local_template;
    if !local_path.exists() {
        return Err(DeployError::MissingLocalTemplate(local_path.clone()));
    }
    let local = LocalDocument::from_file(local_path)?;
    println!(
        "Read {} parameters from {}",
        local.parameters.len(),
        local_path.display()
    );

    println!("Requesting bearer token via {}", provider.name());
    let token = provider.obtain_token().await?;

    let client = match &settings.endpoint {
        Some(endpoint) => ConfigClient::with_base_url(project_id, endpoint)?,
        None => ConfigClient::new(project_id)?,
    };

    let (current, etag) = client.fetch(&token).await?;
    println!(
        "Fetched current template: {} parameters",
        current.parameters.len()
    );
    tracing::debug!(etag = %etag, "captured concurrency token");

    let outcome = merge(&current, &local);
    println!(
        "Merged: {} added, {} updated, {} total",
        outcome.added(),
        outcome.updated,
        outcome.total()
    );
    for key in &outcome.added_keys {
        println!("  new parameter: {key}");
    }

    // Side file first, so the operator can inspect exactly what would be
    // published even if the write below fails.
    if let Some(output_path) = &settings.merged_output {
        let pretty = serde_json::to_string_pretty(&outcome.template)?;
        fs::write(output_path, pretty).map_err(|source| DeployError::WriteMerged {
            path: output_path.clone(),
            source,
        })?;
        println!("Wrote merged template to {}", output_path.display());
    }

    let published = client.publish(&token, &outcome.template, &etag).await?;
    let version = published.version.unwrap_or_default();
    println!(
        "Published version {} at {}",
        version.version_number.as_deref().unwrap_or("unknown"),
        version.update_time.as_deref().unwrap_or("unknown time")
    );

    let total = outcome.total();
    Ok(DeploySummary {
        added_keys: outcome.added_keys,
        updated: outcome.updated,
        total,
        version_number: version.version_number,
        update_time: version.update_time,
    })
}
