//! PDF export service.
//!
//! An export starts from an [`ExportPayload`] whose fields are all optional. One
//! normalization step turns it into an [`ExportRequest`] in which every default has been
//! decided. The request's HTML (supplied or rendered) is then printed by a headless browser
//! session obtained from a [`SessionProvider`].
//!
//! Each export acquires exactly one session and releases it before returning, whether or not
//! rendering succeeded. Sessions are never pooled or shared between exports.

use crate::config::ExportConfig;
use crate::constants::{
    A4_PAPER_MM, BUILDER_PREVIEW_TITLE, DEFAULT_EXPORT_TITLE, DEFAULT_FILENAME_STEM,
    DEFAULT_PATH_LABEL, EXPORT_VIEWPORT, MAX_FILENAME_STEM_CHARS, NETWORK_IDLE_TIMEOUT,
    NETWORK_IDLE_WINDOW, PAGE_MARGIN_MM, PDF_EXTENSION,
};
use crate::html::{HtmlRenderer, PlanDocument};
use crate::rhythm::WeekEntry;
use crate::{AlivenError, AlivenResult};
use aliven_types::WeekNumber;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

/// One week as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PayloadWeek {
    pub week: i64,
    #[serde(default)]
    pub practices: String,
    #[serde(default)]
    pub prompt: String,
}

/// Data submitted to produce a PDF: either finished HTML or structured plan data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub path_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub path_name: Option<String>,
    /// RFC 3339 timestamp of the export.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_weeks", skip_serializing_if = "Vec::is_empty")]
    pub weeks: Vec<PayloadWeek>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Non-string values read as absent.
fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// A non-array reads as no weeks; array entries that do not decode are dropped.
fn lenient_weeks<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<PayloadWeek>, D::Error> {
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(d)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

impl ExportPayload {
    /// Decodes a request body. A body that is not a JSON object is treated as an empty
    /// payload so the export still produces a document with default content.
    pub fn from_body(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("export body is not a valid payload, using defaults: {}", e);
                Self::default()
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A fully-populated export, produced by [`ExportRequest::normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Finished HTML supplied by the client; rendered from `plan` when absent.
    pub html: Option<String>,
    pub plan: PlanDocument,
    /// Sanitized download name, including the `.pdf` extension.
    pub filename: String,
}

impl ExportRequest {
    /// Resolves every optional payload field to its final value.
    pub fn normalize(payload: ExportPayload, now: DateTime<Utc>) -> Self {
        let filename = normalize_filename(
            non_blank(payload.filename.clone())
                .or_else(|| non_blank(payload.path_name.clone()))
                .as_deref()
                .unwrap_or(DEFAULT_FILENAME_STEM),
        );

        let title = match non_blank(payload.title) {
            Some(t) if t.trim() == BUILDER_PREVIEW_TITLE => DEFAULT_EXPORT_TITLE.to_string(),
            Some(t) => t,
            None => DEFAULT_EXPORT_TITLE.to_string(),
        };

        let path_name = non_blank(payload.path_name)
            .or_else(|| non_blank(payload.path_id))
            .unwrap_or_else(|| DEFAULT_PATH_LABEL.to_string());

        let submitted = payload.weeks.len();
        let weeks: Vec<WeekEntry> = payload
            .weeks
            .into_iter()
            .filter_map(|w| {
                WeekNumber::new(w.week).ok().map(|week| WeekEntry {
                    week,
                    practices: w.practices,
                    prompt: w.prompt,
                })
            })
            .collect();
        if weeks.len() != submitted {
            tracing::warn!(
                "dropped {} export weeks with out-of-range week numbers",
                submitted - weeks.len()
            );
        }

        Self {
            html: non_blank(payload.html),
            plan: PlanDocument {
                title,
                path_name,
                created_at: display_timestamp(payload.created_at.as_deref(), now),
                weeks,
            },
            filename,
        }
    }
}

/// Formats the export timestamp for display.
///
/// RFC 3339 input is shown in UTC; anything else is shown as given. Absent input uses `now`.
pub fn display_timestamp(raw: Option<&str>, now: DateTime<Utc>) -> String {
    const FORMAT: &str = "%Y-%m-%d %H:%M UTC";
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => now.format(FORMAT).to_string(),
        Some(r) => match DateTime::parse_from_rfc3339(r) {
            Ok(parsed) => parsed.with_timezone(&Utc).format(FORMAT).to_string(),
            Err(_) => r.to_string(),
        },
    }
}

/// Sanitizes a requested download name.
///
/// A trailing `.pdf` is dropped, characters outside `[A-Za-z0-9-_ ]` are removed, spaces
/// become hyphens, the stem is cut to 80 characters, and `.pdf` is appended. Applying it to
/// its own output returns the same name.
pub fn normalize_filename(requested: &str) -> String {
    let requested = requested.trim();
    let stem = match requested.len().checked_sub(PDF_EXTENSION.len()) {
        Some(cut)
            if requested.is_char_boundary(cut)
                && requested[cut..].eq_ignore_ascii_case(PDF_EXTENSION) =>
        {
            &requested[..cut]
        }
        _ => requested,
    };

    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .map(|c| if c == ' ' { '-' } else { c })
        .take(MAX_FILENAME_STEM_CHARS)
        .collect();

    if cleaned.is_empty() {
        format!("{DEFAULT_FILENAME_STEM}{PDF_EXTENSION}")
    } else {
        format!("{cleaned}{PDF_EXTENSION}")
    }
}

/// Page and print settings applied to every export.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintOptions {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub paper_width_mm: f64,
    pub paper_height_mm: f64,
    /// Applied to all four sides.
    pub margin_mm: f64,
    pub print_background: bool,
    /// Required stretch with no pending requests before printing.
    pub network_idle_window: Duration,
    pub network_idle_timeout: Duration,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            viewport_width: EXPORT_VIEWPORT.0,
            viewport_height: EXPORT_VIEWPORT.1,
            paper_width_mm: A4_PAPER_MM.0,
            paper_height_mm: A4_PAPER_MM.1,
            margin_mm: PAGE_MARGIN_MM,
            print_background: true,
            network_idle_window: NETWORK_IDLE_WINDOW,
            network_idle_timeout: NETWORK_IDLE_TIMEOUT,
        }
    }
}

/// An exclusive headless rendering session.
///
/// Dropping a session without calling [`RenderSession::close`] must still release the
/// underlying browser, so a cancelled export cannot leak a process.
#[async_trait]
pub trait RenderSession: Send {
    /// Loads `html` into a fresh page, waits for the network to settle and prints it.
    async fn render_pdf(&mut self, html: &str, options: &PrintOptions) -> AlivenResult<Vec<u8>>;

    /// Shuts the session down. Failures are logged, not returned.
    async fn close(self: Box<Self>);
}

/// Source of rendering sessions for one deployment environment.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn acquire(&self) -> AlivenResult<Box<dyn RenderSession>>;
}

/// A rendered export ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PdfDocument {
    pub const CONTENT_TYPE: &'static str = "application/pdf";

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Turns export payloads into PDF documents.
#[derive(Clone)]
pub struct PdfExporter {
    provider: Arc<dyn SessionProvider>,
    renderer: HtmlRenderer,
    print: PrintOptions,
}

impl PdfExporter {
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        renderer: HtmlRenderer,
        print: PrintOptions,
    ) -> Self {
        Self {
            provider,
            renderer,
            print,
        }
    }

    pub fn from_config(config: &ExportConfig, provider: Arc<dyn SessionProvider>) -> Self {
        Self::new(
            provider,
            HtmlRenderer::new(config.logo_path()),
            config.print().clone(),
        )
    }

    /// The document that will be printed for `request`.
    /// The document to print. The builder's preview title is rewritten wherever it appears.
    pub fn resolve_html(&self, request: &ExportRequest) -> String {
        let html = match &request.html {
            Some(html) => html.clone(),
            None => self.renderer.render(&request.plan),
        };
        html.replace(BUILDER_PREVIEW_TITLE, DEFAULT_EXPORT_TITLE)
    }

    pub async fn export(&self, payload: ExportPayload) -> AlivenResult<PdfDocument> {
        self.export_request(ExportRequest::normalize(payload, Utc::now()))
            .await
    }

    /// Renders `request` in a session of its own.
    ///
    /// The session is closed on every path out of this function. If the returned future is
    /// dropped part-way, the session is dropped with it, which releases the browser.
    pub async fn export_request(&self, request: ExportRequest) -> AlivenResult<PdfDocument> {
        let html = self.resolve_html(&request);

        tracing::info!(
            filename = %request.filename,
            provider = self.provider.name(),
            weeks = request.plan.weeks.len(),
            "rendering PDF export"
        );

        let mut session = self.provider.acquire().await?;
        let rendered = session.render_pdf(&html, &self.print).await;
        session.close().await;

        let bytes = rendered?;
        if bytes.is_empty() {
            return Err(AlivenError::EmptyDocument);
        }

        tracing::info!(
            filename = %request.filename,
            size = bytes.len(),
            "PDF export rendered"
        );

        Ok(PdfDocument {
            filename: request.filename,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NO_RHYTHM_PLACEHOLDER;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T08:15:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Behaviour {
        Succeed,
        FailLaunch,
        FailRender,
        EmptyPdf,
        Hang,
    }

    #[derive(Default)]
    struct Counters {
        acquired: AtomicUsize,
        closed: AtomicUsize,
        released: AtomicUsize,
        html: Mutex<Vec<String>>,
    }

    struct FakeProvider {
        behaviour: Behaviour,
        counters: Arc<Counters>,
    }

    struct FakeSession {
        behaviour: Behaviour,
        counters: Arc<Counters>,
    }

    impl Drop for FakeSession {
        fn drop(&mut self) {
            self.counters.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl RenderSession for FakeSession {
        async fn render_pdf(
            &mut self,
            html: &str,
            options: &PrintOptions,
        ) -> AlivenResult<Vec<u8>> {
            assert_eq!(options.viewport_width, 1200);
            self.counters.html.lock().unwrap().push(html.to_string());
            match self.behaviour {
                Behaviour::FailRender => Err(AlivenError::Print("printer on fire".into())),
                Behaviour::EmptyPdf => Ok(Vec::new()),
                Behaviour::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                _ => Ok(b"%PDF-1.7 fake".to_vec()),
            }
        }

        async fn close(self: Box<Self>) {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl SessionProvider for FakeProvider {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn acquire(&self) -> AlivenResult<Box<dyn RenderSession>> {
            if self.behaviour == Behaviour::FailLaunch {
                return Err(AlivenError::BrowserLaunch("no chrome here".into()));
            }
            self.counters.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeSession {
                behaviour: self.behaviour,
                counters: self.counters.clone(),
            }))
        }
    }

    fn exporter(behaviour: Behaviour) -> (PdfExporter, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let provider = Arc::new(FakeProvider {
            behaviour,
            counters: counters.clone(),
        });
        (
            PdfExporter::new(provider, HtmlRenderer::without_logo(), PrintOptions::default()),
            counters,
        )
    }

    fn stillness_payload() -> ExportPayload {
        serde_json::from_str(
            r#"{
                "pathId": "stillness",
                "pathName": "Aliven Stillness & Clarity Path",
                "weeks": [{
                    "week": 1,
                    "practices": "Meditation & Pranayama + Movement Medicine",
                    "prompt": "What am I noticing when I slow down?"
                }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_fills_every_default() {
        let request = ExportRequest::normalize(ExportPayload::default(), now());

        assert!(request.html.is_none());
        assert_eq!(request.plan.title, DEFAULT_EXPORT_TITLE);
        assert_eq!(request.plan.path_name, DEFAULT_PATH_LABEL);
        assert_eq!(request.plan.created_at, "2026-03-01 08:15 UTC");
        assert!(request.plan.weeks.is_empty());
        assert_eq!(request.filename, "aliven-rhythm-preview.pdf");
    }

    #[test]
    fn test_normalize_path_name_falls_back_to_path_id() {
        let payload = ExportPayload {
            path_id: Some("strength".into()),
            path_name: Some("   ".into()),
            ..ExportPayload::default()
        };
        let request = ExportRequest::normalize(payload, now());

        assert_eq!(request.plan.path_name, "strength");
        assert_eq!(request.filename, "aliven-rhythm-preview.pdf");
    }

    #[test]
    fn test_normalize_maps_builder_title() {
        let payload = ExportPayload {
            title: Some(BUILDER_PREVIEW_TITLE.into()),
            ..ExportPayload::default()
        };
        assert_eq!(
            ExportRequest::normalize(payload, now()).plan.title,
            DEFAULT_EXPORT_TITLE
        );

        let payload = ExportPayload {
            title: Some("My Winter Plan".into()),
            ..ExportPayload::default()
        };
        assert_eq!(
            ExportRequest::normalize(payload, now()).plan.title,
            "My Winter Plan"
        );
    }

    #[test]
    fn test_normalize_drops_out_of_range_weeks() {
        let payload: ExportPayload = serde_json::from_str(
            r#"{"weeks": [{"week": 0, "practices": "a"}, {"week": 2, "prompt": "b"}, {"week": 5}]}"#,
        )
        .unwrap();
        let request = ExportRequest::normalize(payload, now());

        assert_eq!(request.plan.weeks.len(), 1);
        assert_eq!(request.plan.weeks[0].week.get(), 2);
        assert_eq!(request.plan.weeks[0].practices, "");
        assert_eq!(request.plan.weeks[0].prompt, "b");
    }

    #[test]
    fn test_normalize_formats_timestamps() {
        assert_eq!(
            display_timestamp(Some("2026-01-05T10:30:00+01:00"), now()),
            "2026-01-05 09:30 UTC"
        );
        assert_eq!(display_timestamp(Some("last Tuesday"), now()), "last Tuesday");
        assert_eq!(display_timestamp(Some(" "), now()), "2026-03-01 08:15 UTC");
    }

    #[test]
    fn test_blank_html_renders_from_plan() {
        let payload = ExportPayload {
            html: Some("  \n".into()),
            ..ExportPayload::default()
        };
        assert!(ExportRequest::normalize(payload, now()).html.is_none());
    }

    #[test]
    fn test_preview_title_is_rewritten_throughout_rendered_document() {
        let payload: ExportPayload = serde_json::from_str(
            r#"{
                "title": "Aliven Rhythm Preview v2",
                "weeks": [{"week": 1, "prompt": "Revisit the Aliven Rhythm Preview"}]
            }"#,
        )
        .unwrap();
        let request = ExportRequest::normalize(payload, now());
        let (exporter, _) = exporter(Behaviour::Succeed);

        let html = exporter.resolve_html(&request);

        assert!(!html.contains(BUILDER_PREVIEW_TITLE));
        assert!(html.contains("Aliven Personalized Path v2"));
        assert!(html.contains("Revisit the Aliven Personalized Path"));
    }

    #[test]
    fn test_payload_from_malformed_body_is_empty() {
        assert_eq!(ExportPayload::from_body(b"not json {"), ExportPayload::default());
        assert_eq!(ExportPayload::from_body(b""), ExportPayload::default());
        assert_eq!(ExportPayload::from_body(b"[1, 2]"), ExportPayload::default());
    }

    #[test]
    fn test_payload_tolerates_wrongly_typed_fields() {
        let payload = ExportPayload::from_body(
            br#"{"title": 42, "pathName": "Strength", "weeks": "four", "filename": null}"#,
        );
        assert!(payload.title.is_none());
        assert_eq!(payload.path_name.as_deref(), Some("Strength"));
        assert!(payload.weeks.is_empty());
        assert!(payload.filename.is_none());

        let payload = ExportPayload::from_body(
            br#"{"weeks": [{"week": 1, "prompt": "ok"}, "junk", {"prompt": "no week"}]}"#,
        );
        assert_eq!(payload.weeks.len(), 1);
    }

    #[test]
    fn test_normalize_filename_strips_and_hyphenates() {
        assert_eq!(
            normalize_filename("Aliven Stillness & Clarity Path"),
            "Aliven-Stillness--Clarity-Path.pdf"
        );
        assert_eq!(normalize_filename("plan/../../etc\"x"), "planetcx.pdf");
        assert_eq!(normalize_filename("my_plan-v2"), "my_plan-v2.pdf");
        assert_eq!(normalize_filename("Report.PDF"), "Report.pdf");
    }

    #[test]
    fn test_normalize_filename_is_idempotent() {
        for input in [
            "Aliven Stillness & Clarity Path",
            "already-clean.pdf",
            "weird.pdf.pdf",
            "ünïcödé name",
            "",
        ] {
            let once = normalize_filename(input);
            assert_eq!(normalize_filename(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_normalize_filename_bounds_length() {
        let name = normalize_filename(&"a b".repeat(100));
        let stem = name.strip_suffix(".pdf").unwrap();
        assert_eq!(stem.chars().count(), MAX_FILENAME_STEM_CHARS);
    }

    #[test]
    fn test_normalize_filename_empty_result_uses_default() {
        assert_eq!(normalize_filename("&&&"), "aliven-rhythm-preview.pdf");
        assert_eq!(normalize_filename(".pdf"), "aliven-rhythm-preview.pdf");
    }

    #[test]
    fn test_supplied_filename_wins() {
        let mut payload = stillness_payload();
        payload.filename = Some("my week plan".into());
        assert_eq!(
            ExportRequest::normalize(payload, now()).filename,
            "my-week-plan.pdf"
        );
    }

    #[test]
    fn test_content_disposition_header_value() {
        let doc = PdfDocument {
            filename: "plan.pdf".into(),
            bytes: vec![1],
        };
        assert_eq!(doc.content_disposition(), "attachment; filename=\"plan.pdf\"");
    }

    #[tokio::test]
    async fn test_export_renders_plan_and_closes_session() {
        let (exporter, counters) = exporter(Behaviour::Succeed);

        let doc = exporter.export(stillness_payload()).await.unwrap();

        assert_eq!(doc.filename, "Aliven-Stillness--Clarity-Path.pdf");
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);

        let html = counters.html.lock().unwrap()[0].clone();
        assert!(html.contains("Meditation &amp; Pranayama + Movement Medicine"));
        assert!(html.contains("Aliven Stillness &amp; Clarity Path"));
    }

    #[tokio::test]
    async fn test_export_uses_supplied_html() {
        let (exporter, counters) = exporter(Behaviour::Succeed);
        let payload = ExportPayload {
            html: Some("<h1>Aliven Rhythm Preview</h1>".into()),
            ..ExportPayload::default()
        };

        exporter.export(payload).await.unwrap();

        let html = counters.html.lock().unwrap()[0].clone();
        assert_eq!(html, "<h1>Aliven Personalized Path</h1>");
    }

    #[tokio::test]
    async fn test_export_of_empty_payload_uses_defaults() {
        let (exporter, counters) = exporter(Behaviour::Succeed);

        let doc = exporter.export(ExportPayload::from_body(b"{oops")).await.unwrap();

        assert_eq!(doc.filename, "aliven-rhythm-preview.pdf");
        let html = counters.html.lock().unwrap()[0].clone();
        assert!(html.contains(NO_RHYTHM_PLACEHOLDER));
        assert!(html.contains(DEFAULT_PATH_LABEL));
    }

    #[tokio::test]
    async fn test_render_failure_still_closes_session() {
        let (exporter, counters) = exporter(Behaviour::FailRender);

        let err = exporter.export(stillness_payload()).await.unwrap_err();

        assert!(matches!(err, AlivenError::Print(_)));
        assert!(err.is_render_failure());
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_launch_failure_is_reported() {
        let (exporter, counters) = exporter(Behaviour::FailLaunch);

        let err = exporter.export(stillness_payload()).await.unwrap_err();

        assert!(matches!(err, AlivenError::BrowserLaunch(_)));
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 0);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_pdf_is_an_error() {
        let (exporter, counters) = exporter(Behaviour::EmptyPdf);

        let err = exporter.export(stillness_payload()).await.unwrap_err();

        assert!(matches!(err, AlivenError::EmptyDocument));
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_export_releases_session() {
        let (exporter, counters) = exporter(Behaviour::Hang);

        let result = tokio::time::timeout(
            Duration::from_millis(50),
            exporter.export(stillness_payload()),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 0);
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_exports_use_separate_sessions() {
        let (exporter, counters) = exporter(Behaviour::Succeed);

        let (a, b) = tokio::join!(
            exporter.export(stillness_payload()),
            exporter.export(ExportPayload::default())
        );

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 2);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 2);
    }
}
