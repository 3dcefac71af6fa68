//! # Aliven Browser
//!
//! Headless Chromium sessions for PDF export.
//!
//! Two [`SessionProvider`] strategies are available: [`HostedChromium`] for serverless
//! deployments that ship their own chromium build, and [`LocalChrome`] for developer machines.
//! [`provider_for`] picks one from the configured [`DeploymentMode`].
//!
//! Every acquired session launches its own browser process with a temporary profile directory.

mod idle;
mod launch;
mod session;

pub use idle::{wait_for_network_idle, IdleTracker, NetworkActivity};
pub use launch::{HostedChromium, LaunchPlan, LocalChrome, HOSTED_CHROMIUM_ARGS, HOSTED_VIEWPORT};
pub use session::ChromiumSession;

use aliven_core::{DeploymentMode, ExportConfig, SessionProvider};
use std::sync::Arc;

/// The session provider for `config`'s deployment mode.
pub fn provider_for(config: &ExportConfig) -> Arc<dyn SessionProvider> {
    match config.deployment_mode() {
        DeploymentMode::Hosted => Arc::new(HostedChromium::new(config)),
        DeploymentMode::Local => Arc::new(LocalChrome::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_follows_deployment_mode() {
        let hosted = provider_for(&ExportConfig::new(DeploymentMode::Hosted));
        assert_eq!(hosted.name(), "hosted-chromium");

        let local = provider_for(&ExportConfig::new(DeploymentMode::Local));
        assert_eq!(local.name(), "local-chrome");
    }
}
