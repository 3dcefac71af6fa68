//! Draft handoff through URL query parameters.
//!
//! A saved draft is reopened in the builder through a link carrying `draftPathId` plus the
//! JSON-encoded `draftPrompts` and `draftPractices` maps. Decoding is tolerant: anything
//! unreadable is ignored rather than rejected, so a damaged link still opens the builder.

use crate::drafts::SavedDraft;
use crate::rhythm::WeekOverrides;
use aliven_types::WeekNumber;
use std::collections::BTreeMap;
use url::{form_urlencoded, Url};

pub const PARAM_PATH_ID: &str = "draftPathId";
pub const PARAM_PROMPTS: &str = "draftPrompts";
pub const PARAM_PRACTICES: &str = "draftPractices";

/// The in-progress draft state carried by a builder link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftHandoff {
    pub path_id: Option<String>,
    pub overrides: WeekOverrides,
}

impl DraftHandoff {
    pub fn from_draft(draft: &SavedDraft) -> Self {
        Self {
            path_id: Some(draft.path_id.clone()),
            overrides: draft.overrides(),
        }
    }

    /// Encodes the handoff as a query string (without the leading `?`).
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(path_id) = &self.path_id {
            query.append_pair(PARAM_PATH_ID, path_id);
        }
        query.append_pair(PARAM_PROMPTS, &encode_week_map(&self.overrides.prompts));
        query.append_pair(PARAM_PRACTICES, &encode_week_map(&self.overrides.practices));
        query.finish()
    }

    /// `base` with its query replaced by this handoff.
    pub fn link(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_query(Some(&self.to_query()));
        url
    }

    /// Decodes a query string (with or without the leading `?`).
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut handoff = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                PARAM_PATH_ID => {
                    let value = value.trim();
                    if !value.is_empty() {
                        handoff.path_id = Some(value.to_string());
                    }
                }
                PARAM_PROMPTS => handoff.overrides.prompts = decode_week_map(&value),
                PARAM_PRACTICES => handoff.overrides.practices = decode_week_map(&value),
                _ => {}
            }
        }

        handoff
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }
}

fn encode_week_map(map: &BTreeMap<WeekNumber, String>) -> String {
    // Maps of strings keyed by integers always serialize.
    serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string())
}

/// Reads a `{"<week>": "<text>"}` object, keeping only entries with a valid week and a
/// string value.
fn decode_week_map(raw: &str) -> BTreeMap<WeekNumber, String> {
    let Ok(serde_json::Value::Object(entries)) = serde_json::from_str(raw) else {
        tracing::debug!("ignoring unreadable handoff map");
        return BTreeMap::new();
    };

    entries
        .into_iter()
        .filter_map(|(key, value)| {
            let week = key.trim().parse::<i64>().ok().and_then(|n| WeekNumber::new(n).ok())?;
            match value {
                serde_json::Value::String(text) => Some((week, text)),
                _ => None,
            }
        })
        .collect()
}
