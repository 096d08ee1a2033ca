// cargo watch -x 'fmt' -x 'run'

//! Provision an Azure site-to-site VPN topology, inspect it, reset the
//! gateway and tear everything down again.

pub mod azure;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod names;
pub mod output;
pub mod sample;

use std::sync::Arc;

use azure::{ArmClient, ServicePrincipal};
use config::{Credentials, Settings};

pub use error::{Error, Result};
pub use names::SampleNames;
pub use sample::{run_sample, Cleanup, Provisioned, SampleRun};

/// Read configuration, sign in and run the sample once against Azure.
pub async fn run() -> Result<()> {
    let settings = Settings::from_env()?;
    let credentials = Credentials::from_env()?;
    log::debug!("{settings:?} {credentials:?}");

    let names = SampleNames::random();

    let principal = ServicePrincipal::new(&credentials, &settings)?;
    principal.authenticate().await?;

    let arm = ArmClient::new(
        &settings.arm_endpoint,
        &credentials.subscription_id,
        Arc::new(principal),
    )
    .with_poll_interval(settings.poll_interval);

    let run = run_sample(&arm, &settings, &names).await;
    if run.cleanup.is_failed() {
        log::warn!(
            "Resource group {} may still exist: {}",
            names.resource_group,
            run.cleanup
        );
    }
    run.into_result()?;
    log::info!("Sample finished");
    Ok(())
}
