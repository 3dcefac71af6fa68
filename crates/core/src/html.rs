//! Self-contained HTML for exported plans.
//!
//! The document carries its own print geometry (`@page` size and margins) so the headless
//! engine paginates the same way regardless of viewport. Every piece of text that reaches the
//! document goes through [`escape_html`] first; that is the only injection defence.

use crate::constants::NO_RHYTHM_PLACEHOLDER;
use crate::rhythm::WeekEntry;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Plan content ready to be laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDocument {
    pub title: String,
    pub path_name: String,
    /// Human-readable export timestamp.
    pub created_at: String,
    pub weeks: Vec<WeekEntry>,
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Reads the branding image at `path` as a `data:` URI.
///
/// Returns `None` when the file is missing or unreadable; the document is then rendered
/// without a logo.
pub fn logo_data_uri(path: &Path) -> Option<String> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        Ok(_) => return None,
        Err(e) => {
            tracing::debug!("no branding logo at {}: {}", path.display(), e);
            return None;
        }
    };
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "image/png",
    };
    Some(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// Renders plans, embedding the branding logo when one is available.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    logo_path: Option<PathBuf>,
}

impl HtmlRenderer {
    pub fn new(logo_path: impl Into<PathBuf>) -> Self {
        Self {
            logo_path: Some(logo_path.into()),
        }
    }

    pub fn without_logo() -> Self {
        Self { logo_path: None }
    }

    /// Renders `plan`. The logo file is read on every call so a logo deployed after startup
    /// is picked up.
    pub fn render(&self, plan: &PlanDocument) -> String {
        let logo = self.logo_path.as_deref().and_then(logo_data_uri);
        render_document(plan, logo.as_deref())
    }
}

fn render_weeks(weeks: &[WeekEntry]) -> String {
    if weeks.is_empty() {
        return format!("<p class=\"muted\">{}</p>", escape_html(NO_RHYTHM_PLACEHOLDER));
    }

    let mut out = String::new();
    for w in weeks {
        let _ = write!(
            out,
            r#"
<section class="week">
  <div class="week-badge">Week {week}</div>

  <div class="block">
    <div class="label">Practices</div>
    <div class="value">{practices}</div>
  </div>

  <div class="block">
    <div class="label">Journal prompt</div>
    <div class="prompt">{prompt}</div>
  </div>
</section>"#,
            week = w.week,
            practices = escape_html(&w.practices),
            prompt = escape_html(&w.prompt),
        );
    }
    out
}

const STYLES: &str = r#"
@page { size: A4; margin: 16mm; }

* {
  -webkit-print-color-adjust: exact;
  print-color-adjust: exact;
}

body {
  font-family: ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial;
  background: #efe9e1;
  margin: 0;
  color: #111;
}

.page { padding: 28px; }

.card {
  max-width: 760px;
  margin: 0 auto;
  background: #ffffff;
  border-radius: 22px;
  padding: 28px;
  border: 1px solid #e2ddd6;
  box-shadow: 0 10px 28px rgba(0,0,0,.06);
}

.header {
  display: flex;
  justify-content: space-between;
  align-items: center;
  margin-bottom: 18px;
}

.brand {
  font-size: 11px;
  letter-spacing: .18em;
  text-transform: uppercase;
  color: #4b4b4b;
}

.logo { height: 34px; }

h1 { margin: 0 0 6px; font-size: 22px; }

.meta { font-size: 12px; color: #4b4b4b; margin-bottom: 18px; }

.muted { font-size: 13px; color: #777; }

.week {
  margin-top: 14px;
  border: 1px solid #e2ddd6;
  border-radius: 18px;
  padding: 14px;
  break-inside: avoid;
}

.week-badge {
  font-size: 11px;
  font-weight: 700;
  padding: 6px 10px;
  border-radius: 999px;
  background: #a4756f1a;
  border: 1px solid #a4756f33;
  display: inline-block;
  margin-bottom: 10px;
}

.label { font-size: 11px; color: #4b4b4b; margin-bottom: 4px; }

.value { font-size: 13px; font-weight: 700; }

.prompt { font-size: 13px; font-style: italic; white-space: pre-wrap; }

.footer {
  margin-top: 20px;
  font-size: 10px;
  color: #777;
  display: flex;
  justify-content: space-between;
}

.footer .mark { color: #a4756f; font-weight: 700; letter-spacing: .08em; }
"#;

/// Lays out `plan` as a complete HTML document, with `logo` as the image source if given.
pub fn render_document(plan: &PlanDocument, logo: Option<&str>) -> String {
    let title = escape_html(&plan.title);
    let logo_html = logo
        .map(|src| format!(r#"<img src="{}" class="logo" alt="Aliven" />"#, escape_html(src)))
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
<style>{styles}</style>
</head>

<body>
<div class="page">
  <div class="card">
    <div class="header">
      <div class="brand">Aliven Method</div>
      {logo_html}
    </div>

    <h1>{title}</h1>
    <div class="meta">
      Path: <strong>{path_name}</strong> &middot;
      Exported: <strong>{created_at}</strong>
    </div>

    {weeks}

    <div class="footer">
      <div class="mark">aliven</div>
      <div>Consistency beats intensity</div>
    </div>
  </div>
</div>
</body>
</html>"#,
        title = title,
        styles = STYLES,
        logo_html = logo_html,
        path_name = escape_html(&plan.path_name),
        created_at = escape_html(&plan.created_at),
        weeks = render_weeks(&plan.weeks),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use aliven_types::WeekNumber;
    use tempfile::TempDir;

    const HOSTILE: &str = r#"<script>alert("x") & 'y'</script>"#;

    fn plan(weeks: Vec<WeekEntry>) -> PlanDocument {
        PlanDocument {
            title: "Aliven Personalized Path".into(),
            path_name: "Aliven Stillness & Clarity Path".into(),
            created_at: "2026-01-05 09:30 UTC".into(),
            weeks,
        }
    }

    fn entry(n: i64, practices: &str, prompt: &str) -> WeekEntry {
        WeekEntry {
            week: WeekNumber::new(n).unwrap(),
            practices: practices.into(),
            prompt: prompt.into(),
        }
    }

    #[test]
    fn test_escape_html_replaces_all_five_characters() {
        assert_eq!(
            escape_html(r#"& < > " '"#),
            "&amp; &lt; &gt; &quot; &#039;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_escaping_is_not_reversed_by_double_application() {
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_user_fields_are_escaped_everywhere() {
        let doc = render_document(
            &PlanDocument {
                title: HOSTILE.into(),
                path_name: HOSTILE.into(),
                created_at: HOSTILE.into(),
                weeks: vec![entry(1, HOSTILE, HOSTILE)],
            },
            None,
        );

        assert!(!doc.contains("<script>"));
        assert!(!doc.contains(r#"alert("x")"#));
        assert!(!doc.contains("'y'"));
        assert_eq!(
            doc.matches("&lt;script&gt;alert(&quot;x&quot;) &amp; &#039;y&#039;&lt;/script&gt;")
                .count(),
            6
        );
    }

    #[test]
    fn test_empty_weeks_render_placeholder_only() {
        let doc = render_document(&plan(Vec::new()), None);

        assert!(doc.contains(NO_RHYTHM_PLACEHOLDER));
        assert!(!doc.contains(r#"<section class="week">"#));
        assert!(!doc.contains("week-badge\">"));
    }

    #[test]
    fn test_weeks_render_in_order() {
        let doc = render_document(
            &plan(vec![
                entry(1, "Meditation & Pranayama + Movement Medicine", "First?"),
                entry(2, "Meditation & Pranayama + Yin Yoga", "Second?"),
            ]),
            None,
        );

        assert_eq!(doc.matches(r#"<section class="week">"#).count(), 2);
        let first = doc.find("Week 1").unwrap();
        let second = doc.find("Week 2").unwrap();
        assert!(first < second);
        assert!(doc.contains("Meditation &amp; Pranayama + Movement Medicine"));
        assert!(!doc.contains(NO_RHYTHM_PLACEHOLDER));
    }

    #[test]
    fn test_document_declares_print_geometry() {
        let doc = render_document(&plan(Vec::new()), None);
        assert!(doc.starts_with("<!doctype html>"));
        assert!(doc.contains("@page { size: A4; margin: 16mm; }"));
        assert!(doc.contains("<title>Aliven Personalized Path</title>"));
    }

    #[test]
    fn test_logo_embedded_when_present() {
        let temp = TempDir::new().unwrap();
        let logo = temp.path().join("aliven-logo.png");
        std::fs::write(&logo, [0x89, b'P', b'N', b'G']).unwrap();

        let doc = HtmlRenderer::new(&logo).render(&plan(Vec::new()));

        assert!(doc.contains(r#"<img src="data:image/png;base64,iVBORw==" class="logo""#));
    }

    #[test]
    fn test_missing_logo_degrades_gracefully() {
        let temp = TempDir::new().unwrap();
        let doc = HtmlRenderer::new(temp.path().join("absent.png")).render(&plan(Vec::new()));

        assert!(!doc.contains("<img"));
        assert!(doc.contains("Aliven Method"));
        assert_eq!(doc, HtmlRenderer::without_logo().render(&plan(Vec::new())));
    }

    #[test]
    fn test_logo_mime_follows_extension() {
        let temp = TempDir::new().unwrap();
        let logo = temp.path().join("logo.SVG");
        std::fs::write(&logo, "<svg/>").unwrap();

        let uri = logo_data_uri(&logo).unwrap();
        assert!(uri.starts_with("data:image/svg+xml;base64,"));
    }
}
