//! Week-indexed prompt lookup.

use crate::content::PromptPack;

/// Returns the prompt `pack` holds for `path_id` at zero-based `week_index`.
///
/// Out-of-range indices clamp: negative indices give the first prompt and indices past the
/// end give the last one, so a pack with fewer prompts than weeks repeats its final prompt.
/// A path the pack has nothing for yields `""`.
pub fn resolve_prompt(pack: &PromptPack, path_id: &str, week_index: i64) -> &'static str {
    match pack.prompts_for(path_id) {
        Some(prompts) => clamped(prompts, week_index),
        None => "",
    }
}

/// Clamped lookup into a week-indexed slice of prompts.
pub(crate) fn clamped(prompts: &'static [&'static str], week_index: i64) -> &'static str {
    let Some(last) = prompts.len().checked_sub(1) else {
        return "";
    };
    let idx = if week_index < 0 {
        0
    } else {
        usize::try_from(week_index).map_or(last, |i| i.min(last))
    };
    prompts[idx]
}
