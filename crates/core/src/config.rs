//! Export runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the export service and
//! the browser session providers. Request handling never reads environment variables.

use crate::constants::{
    DEFAULT_HOSTED_CHROMIUM_PATH, DEFAULT_LAUNCH_TIMEOUT, DEFAULT_LOCAL_CHROME_PATH,
    DEFAULT_LOGO_PATH,
};
use crate::export::PrintOptions;
use crate::{AlivenError, AlivenResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Where the process is running, which decides how the headless browser is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    /// Developer machine: prefer a locally installed Chrome.
    #[default]
    Local,
    /// Hosted/serverless deployment: use the bundled serverless chromium build.
    Hosted,
}

impl FromStr for DeploymentMode {
    type Err = AlivenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "development" | "dev" => Ok(DeploymentMode::Local),
            "hosted" | "production" | "prod" => Ok(DeploymentMode::Hosted),
            other => Err(AlivenError::InvalidDeploymentMode(other.to_string())),
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Local => f.write_str("local"),
            DeploymentMode::Hosted => f.write_str("hosted"),
        }
    }
}

/// Export configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ExportConfig {
    deployment_mode: DeploymentMode,
    hosted_chromium_path: PathBuf,
    local_chrome_path: PathBuf,
    extra_browser_args: Vec<String>,
    logo_path: PathBuf,
    launch_timeout: Duration,
    print: PrintOptions,
}

impl ExportConfig {
    pub fn new(deployment_mode: DeploymentMode) -> Self {
        Self {
            deployment_mode,
            hosted_chromium_path: PathBuf::from(DEFAULT_HOSTED_CHROMIUM_PATH),
            local_chrome_path: PathBuf::from(DEFAULT_LOCAL_CHROME_PATH),
            extra_browser_args: Vec::new(),
            logo_path: PathBuf::from(DEFAULT_LOGO_PATH),
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
            print: PrintOptions::default(),
        }
    }

    pub fn with_hosted_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.hosted_chromium_path = path.into();
        self
    }

    pub fn with_local_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_chrome_path = path.into();
        self
    }

    pub fn with_extra_browser_args(mut self, args: Vec<String>) -> Self {
        self.extra_browser_args = args;
        self
    }

    pub fn with_logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = path.into();
        self
    }

    pub fn with_launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }

    pub fn with_print_options(mut self, print: PrintOptions) -> Self {
        self.print = print;
        self
    }

    pub fn deployment_mode(&self) -> DeploymentMode {
        self.deployment_mode
    }

    pub fn hosted_chromium_path(&self) -> &Path {
        &self.hosted_chromium_path
    }

    pub fn local_chrome_path(&self) -> &Path {
        &self.local_chrome_path
    }

    pub fn extra_browser_args(&self) -> &[String] {
        &self.extra_browser_args
    }

    pub fn logo_path(&self) -> &Path {
        &self.logo_path
    }

    pub fn launch_timeout(&self) -> Duration {
        self.launch_timeout
    }

    pub fn print(&self) -> &PrintOptions {
        &self.print
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new(DeploymentMode::default())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the deployment mode from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DeploymentMode::Local`].
pub fn deployment_mode_from_env_value(value: Option<String>) -> AlivenResult<DeploymentMode> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<DeploymentMode>())
        .transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Parse a whole number of seconds from an optional string value.
///
/// Returns `default` when the value is absent or blank. Zero is rejected.
pub fn duration_secs_from_env_value(
    value: Option<String>,
    default: Duration,
) -> AlivenResult<Duration> {
    match non_blank(value) {
        None => Ok(default),
        Some(v) => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(AlivenError::InvalidDuration(v)),
        },
    }
}

/// Split an optional whitespace-separated list of extra browser flags.
pub fn browser_args_from_env_value(value: Option<String>) -> Vec<String> {
    non_blank(value)
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Use `value` as a path if it is present and non-blank, otherwise `default`.
pub fn path_from_env_value(value: Option<String>, default: &str) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| default.to_string()))
}

pub const ENV_DEPLOYMENT_MODE: &str = "ALIVEN_DEPLOYMENT_MODE";
pub const ENV_CHROMIUM_PATH: &str = "ALIVEN_CHROMIUM_PATH";
pub const ENV_LOCAL_CHROME_PATH: &str = "ALIVEN_LOCAL_CHROME_PATH";
pub const ENV_BROWSER_ARGS: &str = "ALIVEN_BROWSER_ARGS";
pub const ENV_LOGO_PATH: &str = "ALIVEN_LOGO_PATH";
pub const ENV_LAUNCH_TIMEOUT_SECS: &str = "ALIVEN_LAUNCH_TIMEOUT_SECS";

/// Builds an [`ExportConfig`] from `ALIVEN_*` variables supplied by `lookup`.
///
/// Binaries pass `|name| std::env::var(name).ok()`; tests pass a map.
///
/// # Errors
/// Returns an error if the deployment mode or launch timeout is set but invalid.
pub fn export_config_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> AlivenResult<ExportConfig> {
    let mode = deployment_mode_from_env_value(lookup(ENV_DEPLOYMENT_MODE))?;
    let launch_timeout =
        duration_secs_from_env_value(lookup(ENV_LAUNCH_TIMEOUT_SECS), DEFAULT_LAUNCH_TIMEOUT)?;

    Ok(ExportConfig::new(mode)
        .with_hosted_chromium_path(path_from_env_value(
            lookup(ENV_CHROMIUM_PATH),
            DEFAULT_HOSTED_CHROMIUM_PATH,
        ))
        .with_local_chrome_path(path_from_env_value(
            lookup(ENV_LOCAL_CHROME_PATH),
            DEFAULT_LOCAL_CHROME_PATH,
        ))
        .with_extra_browser_args(browser_args_from_env_value(lookup(ENV_BROWSER_ARGS)))
        .with_logo_path(path_from_env_value(lookup(ENV_LOGO_PATH), DEFAULT_LOGO_PATH))
        .with_launch_timeout(launch_timeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_mode_defaults_to_local() {
        assert_eq!(
            deployment_mode_from_env_value(None).unwrap(),
            DeploymentMode::Local
        );
        assert_eq!(
            deployment_mode_from_env_value(Some("  ".into())).unwrap(),
            DeploymentMode::Local
        );
    }

    #[test]
    fn test_deployment_mode_parses_aliases() {
        assert_eq!(
            deployment_mode_from_env_value(Some("Hosted".into())).unwrap(),
            DeploymentMode::Hosted
        );
        assert_eq!(
            deployment_mode_from_env_value(Some("production".into())).unwrap(),
            DeploymentMode::Hosted
        );
        assert_eq!(
            deployment_mode_from_env_value(Some("dev".into())).unwrap(),
            DeploymentMode::Local
        );
    }

    #[test]
    fn test_deployment_mode_rejects_unknown() {
        let result = deployment_mode_from_env_value(Some("staging".into()));
        assert!(matches!(result, Err(AlivenError::InvalidDeploymentMode(m)) if m == "staging"));
    }

    #[test]
    fn test_duration_secs_parsing() {
        let default = Duration::from_secs(7);
        assert_eq!(duration_secs_from_env_value(None, default).unwrap(), default);
        assert_eq!(
            duration_secs_from_env_value(Some("12".into()), default).unwrap(),
            Duration::from_secs(12)
        );
        assert!(duration_secs_from_env_value(Some("0".into()), default).is_err());
        assert!(duration_secs_from_env_value(Some("soon".into()), default).is_err());
    }

    #[test]
    fn test_browser_args_split_on_whitespace() {
        let args = browser_args_from_env_value(Some("--no-sandbox  --disable-gpu".into()));
        assert_eq!(args, vec!["--no-sandbox", "--disable-gpu"]);
        assert!(browser_args_from_env_value(None).is_empty());
    }

    #[test]
    fn test_path_from_env_value_falls_back() {
        assert_eq!(
            path_from_env_value(Some(" ".into()), "public/logo.png"),
            PathBuf::from("public/logo.png")
        );
        assert_eq!(
            path_from_env_value(Some("/srv/logo.png".into()), "public/logo.png"),
            PathBuf::from("/srv/logo.png")
        );
    }

    #[test]
    fn test_builder_overrides_defaults() {
        let cfg = ExportConfig::new(DeploymentMode::Hosted)
            .with_hosted_chromium_path("/opt/chromium")
            .with_launch_timeout(Duration::from_secs(5));

        assert_eq!(cfg.deployment_mode(), DeploymentMode::Hosted);
        assert_eq!(cfg.hosted_chromium_path(), Path::new("/opt/chromium"));
        assert_eq!(cfg.launch_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.logo_path(), Path::new(DEFAULT_LOGO_PATH));
    }

    #[test]
    fn test_export_config_from_lookup() {
        let vars: std::collections::HashMap<&str, &str> = [
            (ENV_DEPLOYMENT_MODE, "hosted"),
            (ENV_CHROMIUM_PATH, "/var/task/chromium"),
            (ENV_BROWSER_ARGS, "--lang=en-GB"),
            (ENV_LAUNCH_TIMEOUT_SECS, "45"),
        ]
        .into_iter()
        .collect();

        let cfg = export_config_from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.deployment_mode(), DeploymentMode::Hosted);
        assert_eq!(cfg.hosted_chromium_path(), Path::new("/var/task/chromium"));
        assert_eq!(cfg.local_chrome_path(), Path::new(DEFAULT_LOCAL_CHROME_PATH));
        assert_eq!(cfg.extra_browser_args(), ["--lang=en-GB".to_string()]);
        assert_eq!(cfg.launch_timeout(), Duration::from_secs(45));
    }

    #[test]
    fn test_export_config_from_empty_lookup_is_default() {
        let cfg = export_config_from_lookup(|_| None).unwrap();
        assert_eq!(cfg.deployment_mode(), DeploymentMode::Local);
        assert_eq!(cfg.launch_timeout(), DEFAULT_LAUNCH_TIMEOUT);
        let bad_timeout = |k: &str| (k == ENV_LAUNCH_TIMEOUT_SECS).then(|| "x".to_string());
        assert!(export_config_from_lookup(bad_timeout).is_err());
    }
}
