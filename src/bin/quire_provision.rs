//! quire-provision: storage provisioning and review link issuance
//!
//! Runs migrations for the configured backend, creates the site document if
//! it does not exist, then issues review tokens.
//!
//! ## Usage
//! ```text
//! quire-provision [COUNT]
//! ```
//! Prints one new token per line on stdout. COUNT defaults to 0.
//!
//! ## Configuration
//! - QUIRE_CONFIG: YAML configuration file
//! - QUIRE__STORAGE__TYPE: memory, sqlite or postgres
//! - QUIRE_LOG: log filter (default "info")

use tracing::{error, info};

use quire::config::Config;
use quire::services::SiteService;
use quire::storage::init_storage;
use quire::utils::bootstrap::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let count: usize = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .map_err(|e| format!("invalid token count {:?}: {}", arg, e))?,
        None => 0,
    };

    let config = Config::load(None)?;
    let stores = init_storage(&config.storage).await?;
    let site = SiteService::new(stores, &config);

    if site.mutator().ensure_provisioned().await? {
        info!("Created empty site document");
    } else {
        info!("Site document already present");
    }

    for _ in 0..count {
        match site.ledger().issue().await {
            Ok(token) => println!("{}", token),
            Err(e) => {
                error!(error = %e, "Token issuance failed");
                return Err(e.into());
            }
        }
    }

    info!(issued = count, "Provisioning complete");
    Ok(())
}
