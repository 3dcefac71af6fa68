//! Constants used throughout the Aliven core crate.
//!
//! Paths, filenames, default texts and print geometry live here so the renderer, the export
//! service and the binaries agree on them.

use std::time::Duration;

/// Default directory for client-local data (saved drafts) when none is configured.
pub const DEFAULT_DATA_DIR: &str = "aliven_data";

/// Filename of the versioned slot holding the saved draft collection inside the data directory.
pub const DRAFTS_FILENAME: &str = "pathbuilder-drafts-v1.json";

/// Default location of the optional branding image, relative to the working directory.
pub const DEFAULT_LOGO_PATH: &str = "public/aliven-logo.png";

/// Title the builder sends with its exports.
pub const BUILDER_PREVIEW_TITLE: &str = "Aliven Rhythm Preview";

/// Title used on exported documents when none is supplied.
pub const DEFAULT_EXPORT_TITLE: &str = "Aliven Personalized Path";

/// Path label used when neither a path name nor a path id is supplied.
pub const DEFAULT_PATH_LABEL: &str = "Selected Path";

/// Filename stem used when neither a filename nor a path name is supplied.
pub const DEFAULT_FILENAME_STEM: &str = "aliven-rhythm-preview";

/// Extension appended to every exported filename.
pub const PDF_EXTENSION: &str = ".pdf";

/// Maximum length of a normalized filename stem, excluding the extension.
pub const MAX_FILENAME_STEM_CHARS: usize = 80;

/// Placeholder rendered when an export carries no week entries.
pub const NO_RHYTHM_PLACEHOLDER: &str = "No rhythm data provided.";

/// Page viewport applied before loading the export document.
pub const EXPORT_VIEWPORT: (u32, u32) = (1200, 800);

/// A4 paper size in millimetres (width, height).
pub const A4_PAPER_MM: (f64, f64) = (210.0, 297.0);

/// Margin applied to all four sides of every printed page, in millimetres.
pub const PAGE_MARGIN_MM: f64 = 16.0;

/// How long the page must go without pending requests before it is considered settled.
pub const NETWORK_IDLE_WINDOW: Duration = Duration::from_millis(500);

/// Upper bound on the wait for network quiescence.
pub const NETWORK_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound on launching the headless browser.
pub const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Location of the serverless chromium build in hosted deployments.
pub const DEFAULT_HOSTED_CHROMIUM_PATH: &str = "/tmp/chromium";

/// Well-known location of a locally installed Chrome.
#[cfg(target_os = "macos")]
pub const DEFAULT_LOCAL_CHROME_PATH: &str =
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome";

/// Well-known location of a locally installed Chrome.
#[cfg(target_os = "windows")]
pub const DEFAULT_LOCAL_CHROME_PATH: &str =
    r"C:\Program Files\Google\Chrome\Application\chrome.exe";

/// Well-known location of a locally installed Chrome.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const DEFAULT_LOCAL_CHROME_PATH: &str = "/usr/bin/google-chrome";
