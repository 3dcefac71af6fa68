//! One headless browser process, used for a single export.

use crate::idle::{wait_for_network_idle, NetworkActivity};
use crate::launch::LaunchPlan;
use aliven_core::{AlivenError, AlivenResult, PrintOptions, RenderSession};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;

const MM_PER_INCH: f64 = 25.4;
const EXIT_TIMEOUT: Duration = Duration::from_secs(5);

/// A launched browser with a private profile directory.
///
/// Dropping the session stops the event loop, kills the browser process and deletes the
/// profile. [`RenderSession::close`] additionally asks the browser to exit cleanly first.
pub struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    _profile: TempDir,
}

impl ChromiumSession {
    pub async fn launch(plan: &LaunchPlan) -> AlivenResult<Self> {
        let profile = tempfile::Builder::new()
            .prefix("aliven-chromium-")
            .tempdir()
            .map_err(|e| AlivenError::BrowserLaunch(format!("failed to create profile dir: {e}")))?;

        let config = plan.browser_config(profile.path())?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AlivenError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser event loop error: {}", e);
                }
            }
        });

        tracing::debug!(profile = %profile.path().display(), "browser launched");

        Ok(Self {
            browser,
            handler,
            _profile: profile,
        })
    }
}

/// What to do with the browser process once the close request has been answered.
#[derive(Debug, PartialEq, Eq)]
enum Shutdown {
    AwaitExit,
    Kill,
}

/// A failed close request means the browser was never told to exit, so it has to be killed.
fn shutdown_after<T, E>(close: &Result<T, E>) -> Shutdown {
    match close {
        Ok(_) => Shutdown::AwaitExit,
        Err(_) => Shutdown::Kill,
    }
}

/// Waits up to `limit` for the process to exit. `false` means it is still running.
async fn bounded_exit<T, E: Display>(
    wait: impl Future<Output = Result<T, E>>,
    limit: Duration,
) -> bool {
    match tokio::time::timeout(limit, wait).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::warn!("failed waiting for browser exit: {}", e);
            true
        }
        Err(_) => false,
    }
}

async fn kill_browser(browser: &mut Browser) {
    if let Some(Err(e)) = browser.kill().await {
        tracing::warn!("failed to kill browser process: {}", e);
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Request lifecycle events for `page`. Must be subscribed before content is loaded.
async fn network_activity(page: &Page) -> AlivenResult<BoxStream<'static, NetworkActivity>> {
    let subscribe_err = |e: chromiumoxide::error::CdpError| AlivenError::PageOpen(e.to_string());

    let started = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(subscribe_err)?
        .map(|e| NetworkActivity::Started(e.request_id.inner().clone()));
    let finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(subscribe_err)?
        .map(|e| NetworkActivity::Settled(e.request_id.inner().clone()));
    let failed = page
        .event_listener::<EventLoadingFailed>()
        .await
        .map_err(subscribe_err)?
        .map(|e| NetworkActivity::Settled(e.request_id.inner().clone()));

    Ok(stream::select(started, stream::select(finished, failed)).boxed())
}

fn pdf_params(options: &PrintOptions) -> PrintToPdfParams {
    let margin = Some(options.margin_mm / MM_PER_INCH);
    PrintToPdfParams {
        print_background: Some(options.print_background),
        paper_width: Some(options.paper_width_mm / MM_PER_INCH),
        paper_height: Some(options.paper_height_mm / MM_PER_INCH),
        margin_top: margin,
        margin_bottom: margin,
        margin_left: margin,
        margin_right: margin,
        ..PrintToPdfParams::default()
    }
}

async fn print_page(page: &Page, html: &str, options: &PrintOptions) -> AlivenResult<Vec<u8>> {
    page.execute(SetDeviceMetricsOverrideParams::new(
        i64::from(options.viewport_width),
        i64::from(options.viewport_height),
        1.0,
        false,
    ))
    .await
    .map_err(|e| AlivenError::PageOpen(format!("failed to set viewport: {e}")))?;

    let activity = network_activity(page).await?;

    page.set_content(html)
        .await
        .map_err(|e| AlivenError::Navigation(e.to_string()))?;

    wait_for_network_idle(
        activity,
        options.network_idle_window,
        options.network_idle_timeout,
    )
    .await?;

    page.pdf(pdf_params(options))
        .await
        .map_err(|e| AlivenError::Print(e.to_string()))
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn render_pdf(&mut self, html: &str, options: &PrintOptions) -> AlivenResult<Vec<u8>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AlivenError::PageOpen(e.to_string()))?;

        let result = print_page(&page, html, options).await;

        if let Err(e) = page.close().await {
            tracing::debug!("failed to close export page: {}", e);
        }
        result
    }

    async fn close(mut self: Box<Self>) {
        let closed = self.browser.close().await;
        if let Err(e) = &closed {
            tracing::warn!("browser did not accept close request: {}", e);
        }

        if shutdown_after(&closed) == Shutdown::Kill {
            kill_browser(&mut self.browser).await;
        }
        if !bounded_exit(self.browser.wait(), EXIT_TIMEOUT).await {
            tracing::warn!("browser still running after {:?}, killing it", EXIT_TIMEOUT);
            kill_browser(&mut self.browser).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aliven_core::{ExportConfig, SessionProvider};

    #[test]
    fn test_pdf_params_are_a4_with_margins() {
        let params = pdf_params(&PrintOptions::default());

        let width = params.paper_width.unwrap();
        let height = params.paper_height.unwrap();
        assert!((width - 8.2677).abs() < 1e-3);
        assert!((height - 11.6929).abs() < 1e-3);
        assert_eq!(params.margin_top, params.margin_left);
        assert!((params.margin_bottom.unwrap() - 0.6299).abs() < 1e-3);
        assert_eq!(params.print_background, Some(true));
    }

    #[test]
    fn test_failed_close_request_kills_process() {
        assert_eq!(shutdown_after(&Ok::<(), &str>(())), Shutdown::AwaitExit);
        assert_eq!(
            shutdown_after(&Err::<(), _>("websocket closed")),
            Shutdown::Kill
        );
    }

    #[tokio::test]
    async fn test_exit_wait_is_bounded() {
        let hung = std::future::pending::<Result<(), String>>();
        assert!(!bounded_exit(hung, Duration::from_millis(20)).await);

        let exited = async { Ok::<_, String>(Some(0)) };
        assert!(bounded_exit(exited, Duration::from_millis(20)).await);

        let failed = async { Err::<(), _>("no child") };
        assert!(bounded_exit(failed, Duration::from_millis(20)).await);
    }

    #[tokio::test]
    #[ignore = "needs a local Chrome or Chromium installation"]
    async fn test_local_chrome_prints_pdf() {
        let provider = crate::LocalChrome::new(&ExportConfig::default());
        let mut session = provider.acquire().await.unwrap();

        let pdf = session
            .render_pdf("<h1>Week 1</h1>", &PrintOptions::default())
            .await;
        session.close().await;

        assert!(pdf.unwrap().starts_with(b"%PDF"));
    }
}
