//! Browser launch strategies.
//!
//! Each strategy reduces an [`ExportConfig`] to a [`LaunchPlan`]. Plans are plain data, so the
//! choice of binary, flags and viewport can be checked without starting a browser.

use crate::session::ChromiumSession;
use aliven_core::{AlivenError, AlivenResult, ExportConfig, RenderSession, SessionProvider};
use async_trait::async_trait;
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default viewport of the serverless chromium build.
pub const HOSTED_VIEWPORT: (u32, u32) = (1920, 1080);

/// Flags required to run the serverless chromium build inside a sandboxed function runtime.
pub const HOSTED_CHROMIUM_ARGS: &[&str] = &[
    "--allow-pre-commit-input",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-client-side-phishing-detection",
    "--disable-component-update",
    "--disable-default-apps",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-hang-monitor",
    "--disable-ipc-flooding-protection",
    "--disable-popup-blocking",
    "--disable-prompt-on-repost",
    "--disable-renderer-backgrounding",
    "--disable-sync",
    "--disable-setuid-sandbox",
    "--disable-site-isolation-trials",
    "--disk-cache-size=33554432",
    "--export-tagged-pdf",
    "--font-render-hinting=none",
    "--force-color-profile=srgb",
    "--hide-scrollbars",
    "--ignore-gpu-blocklist",
    "--in-process-gpu",
    "--metrics-recording-only",
    "--mute-audio",
    "--no-default-browser-check",
    "--no-first-run",
    "--no-pings",
    "--no-sandbox",
    "--no-zygote",
    "--password-store=basic",
    "--single-process",
    "--use-angle=swiftshader",
    "--use-gl=angle",
    "--use-mock-keychain",
    "--window-size=1920,1080",
];

/// How to start one browser process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// `None` lets the engine locate an installed browser.
    pub executable: Option<PathBuf>,
    pub args: Vec<String>,
    pub viewport: Option<(u32, u32)>,
    pub headless: bool,
    pub launch_timeout: Duration,
}

impl LaunchPlan {
    /// Builds the engine configuration, with `user_data_dir` as the browser profile.
    pub fn browser_config(&self, user_data_dir: &Path) -> AlivenResult<BrowserConfig> {
        let viewport = self.viewport.map(|(width, height)| Viewport {
            width,
            height,
            ..Viewport::default()
        });

        let mut builder = BrowserConfig::builder()
            .args(self.args.iter().cloned())
            .viewport(viewport)
            .launch_timeout(self.launch_timeout)
            .user_data_dir(user_data_dir);

        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        if !self.headless {
            builder = builder.with_head();
        }

        builder.build().map_err(AlivenError::BrowserLaunch)
    }
}

fn with_extra_args(mut args: Vec<String>, extra: &[String]) -> Vec<String> {
    args.extend(extra.iter().cloned());
    args
}

/// Serverless chromium bundled with a hosted deployment.
#[derive(Debug, Clone)]
pub struct HostedChromium {
    plan: LaunchPlan,
}

impl HostedChromium {
    pub fn new(config: &ExportConfig) -> Self {
        let args = HOSTED_CHROMIUM_ARGS.iter().map(|a| a.to_string()).collect();
        Self {
            plan: LaunchPlan {
                executable: Some(config.hosted_chromium_path().to_path_buf()),
                args: with_extra_args(args, config.extra_browser_args()),
                viewport: Some(HOSTED_VIEWPORT),
                headless: true,
                launch_timeout: config.launch_timeout(),
            },
        }
    }

    pub fn plan(&self) -> &LaunchPlan {
        &self.plan
    }
}

#[async_trait]
impl SessionProvider for HostedChromium {
    fn name(&self) -> &'static str {
        "hosted-chromium"
    }

    async fn acquire(&self) -> AlivenResult<Box<dyn RenderSession>> {
        Ok(Box::new(ChromiumSession::launch(&self.plan).await?))
    }
}

/// Chrome installed on a developer machine.
#[derive(Debug, Clone)]
pub struct LocalChrome {
    plan: LaunchPlan,
}

impl LocalChrome {
    pub fn new(config: &ExportConfig) -> Self {
        let configured = config.local_chrome_path();
        let executable = if configured.is_file() {
            Some(configured.to_path_buf())
        } else {
            tracing::info!(
                "no Chrome at {}, falling back to auto-detection",
                configured.display()
            );
            None
        };

        Self {
            plan: LaunchPlan {
                executable,
                args: with_extra_args(Vec::new(), config.extra_browser_args()),
                viewport: None,
                headless: true,
                launch_timeout: config.launch_timeout(),
            },
        }
    }

    pub fn plan(&self) -> &LaunchPlan {
        &self.plan
    }
}

#[async_trait]
impl SessionProvider for LocalChrome {
    fn name(&self) -> &'static str {
        "local-chrome"
    }

    async fn acquire(&self) -> AlivenResult<Box<dyn RenderSession>> {
        Ok(Box::new(ChromiumSession::launch(&self.plan).await?))
    }
}
