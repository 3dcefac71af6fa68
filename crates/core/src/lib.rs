//! # Aliven Core
//!
//! Core logic for the Aliven path builder and its PDF export pipeline.
//!
//! This crate contains:
//! - The practice path catalog and prompt packs
//! - Four-week rhythm derivation with per-week overrides
//! - Saved drafts, persisted as one JSON collection in a storage slot
//! - Draft handoff through builder URL query parameters
//! - Export payload normalization and HTML document rendering
//! - The [`PdfExporter`] service, which drives a headless browser through [`SessionProvider`]
//!
//! **No transport concerns**: HTTP routing lives in `api-rest`, and the browser strategies that
//! implement [`SessionProvider`] live in `aliven-browser`.

pub mod config;
pub mod constants;
pub mod content;
pub mod drafts;
mod error;
pub mod export;
pub mod handoff;
pub mod html;
pub mod prompts;
pub mod rhythm;

pub use aliven_types::{DraftName, TypeError, WeekNumber};
pub use config::{DeploymentMode, ExportConfig};
pub use content::{PracticePath, PromptPack};
pub use drafts::{DraftStore, FileSlot, MemorySlot, SavedDraft, SlotDraftStore, StorageSlot};
pub use error::{AlivenError, AlivenResult};
pub use export::{
    ExportPayload, ExportRequest, PayloadWeek, PdfDocument, PdfExporter, PrintOptions,
    RenderSession, SessionProvider,
};
pub use handoff::DraftHandoff;
pub use html::{HtmlRenderer, PlanDocument};
pub use rhythm::{WeekEntry, WeekOverrides};
