//! Four-week rhythm derivation.
//!
//! A rhythm is the list of [`WeekEntry`] values the builder previews and exports. Defaults come
//! from the path's pillars and the prompt pack. Per-week overrides entered by the user replace
//! them.

use crate::constants::BUILDER_PREVIEW_TITLE;
use crate::content::{PracticePath, PromptPack};
use crate::export::{ExportPayload, PayloadWeek};
use crate::prompts::{clamped, resolve_prompt};
use aliven_types::WeekNumber;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One week of a rhythm as shown to the user and written into exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekEntry {
    pub week: WeekNumber,
    pub practices: String,
    pub prompt: String,
}

/// Per-week text the user has explicitly edited.
///
/// Only edited weeks have keys. A missing key means "use the computed default"; a present but
/// empty value is a deliberate blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekOverrides {
    pub prompts: BTreeMap<WeekNumber, String>,
    pub practices: BTreeMap<WeekNumber, String>,
}

impl WeekOverrides {
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty() && self.practices.is_empty()
    }

    pub fn set_prompt(&mut self, week: WeekNumber, text: impl Into<String>) {
        self.prompts.insert(week, text.into());
    }

    pub fn set_practices(&mut self, week: WeekNumber, text: impl Into<String>) {
        self.practices.insert(week, text.into());
    }

    /// Drops every override, returning the rhythm to pack defaults.
    pub fn reset(&mut self) {
        self.prompts.clear();
        self.practices.clear();
    }
}

/// Supporting pillar practised alongside the main pillar in `week`.
///
/// Paths with a single support use it every week; paths with two alternate between them.
pub fn support_for_week(path: &PracticePath, week: WeekNumber) -> &'static str {
    match path.supports {
        [] => "",
        [only] => *only,
        supports => supports[week.index() % 2],
    }
}

/// Practices text used for `week` when the user has not edited it.
pub fn default_practices(path: &PracticePath, week: WeekNumber) -> String {
    let support = support_for_week(path, week);
    if support.is_empty() {
        path.main_pillar.to_string()
    } else {
        format!("{} + {}", path.main_pillar, support)
    }
}

/// Prompt used for `week` when the user has not edited it.
///
/// The pack wins; the path's own weekly prompts fill in when the pack has nothing.
pub fn default_prompt(path: &PracticePath, pack: &PromptPack, week: WeekNumber) -> &'static str {
    let from_pack = resolve_prompt(pack, path.id, week.index() as i64);
    if from_pack.is_empty() {
        clamped(path.weekly_prompts, week.index() as i64)
    } else {
        from_pack
    }
}

/// Builds the four weeks of `path` with `overrides` applied.
pub fn build_rhythm(
    path: &PracticePath,
    pack: &PromptPack,
    overrides: &WeekOverrides,
) -> Vec<WeekEntry> {
    WeekNumber::ALL
        .iter()
        .map(|&week| WeekEntry {
            week,
            practices: overrides
                .practices
                .get(&week)
                .cloned()
                .unwrap_or_else(|| default_practices(path, week)),
            prompt: overrides
                .prompts
                .get(&week)
                .cloned()
                .unwrap_or_else(|| default_prompt(path, pack, week).to_string()),
        })
        .collect()
}

/// The export payload the builder submits for a previewed rhythm.
pub fn preview_payload(
    path: &PracticePath,
    weeks: &[WeekEntry],
    now: DateTime<Utc>,
) -> ExportPayload {
    ExportPayload {
        title: Some(BUILDER_PREVIEW_TITLE.to_string()),
        path_id: Some(path.id.to_string()),
        path_name: Some(path.name.to_string()),
        created_at: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        weeks: weeks
            .iter()
            .map(|w| PayloadWeek {
                week: i64::from(w.week.get()),
                practices: w.practices.clone(),
                prompt: w.prompt.clone(),
            })
            .collect(),
        ..ExportPayload::default()
    }
}
