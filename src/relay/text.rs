//! Outbound text helpers: sanitizing, previews, prompt layout

use crate::relay::event::{CallbackAction, LabelChoice};
use crate::types::{Choice, SubmissionKind};
use std::borrow::Cow;
use std::fmt::Write;

/// Sent instead of a message that sanitizes down to nothing
pub const SANITIZED_PLACEHOLDER: &str = "(content removed)";

/// Label buttons per prompt row
const LABELS_PER_ROW: usize = 3;

/// Longest button payload Telegram accepts (`callback_data`)
const MAX_PAYLOAD_BYTES: usize = 64;

/// Usage text for `/start`, `/help` and unknown commands
pub const USAGE: &str = "\
How to use:
1. Send a photo or video, then pick a label
2. Send text, then pick a label to publish it
3. /tags lists the available labels
4. /label <name> sets your default label
5. /refresh reloads the label list
6. /edit lists recent records, /edit <number> edits one
7. /delete lists recent records, /delete <number> deletes one
8. /cancel leaves edit mode
9. /publish [text] publishes the pending media now

Tips:
- After picking a label you can keep sending text to update the caption
- Media publishes itself 5 minutes after a label is picked";

/// Strip invalid and control characters from outbound text
///
/// Replacement characters (what invalid UTF-8 decodes to) and control
/// characters other than newline, carriage return and tab are removed. A
/// string left empty by this is replaced with [`SANITIZED_PLACEHOLDER`].
pub fn sanitize_outbound(text: &str) -> Cow<'_, str> {
    let keep = |c: char| {
        c != char::REPLACEMENT_CHARACTER && (!c.is_control() || matches!(c, '\n' | '\r' | '\t'))
    };

    let cleaned: Cow<'_, str> = if text.chars().all(keep) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| keep(*c)).collect())
    };

    if cleaned.trim().is_empty() {
        Cow::Borrowed(SANITIZED_PLACEHOLDER)
    } else {
        cleaned
    }
}

/// Length in characters, the unit of the content ceiling
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `max_chars` characters, with an ellipsis when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if char_len(&flat) <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

/// Numbered label list, one per line
pub fn numbered_labels(labels: &[String]) -> String {
    let mut out = String::new();
    for (i, label) in labels.iter().enumerate() {
        let _ = writeln!(out, "{}. {label}", i + 1);
    }
    out
}

/// One button per label, skipping labels whose payload would be rejected
fn label_rows(labels: &[String], action: impl Fn(String) -> CallbackAction) -> Vec<Vec<Choice>> {
    let choices: Vec<Choice> = labels
        .iter()
        .filter_map(|label| {
            let payload = action(label.clone()).payload();
            if payload.len() > MAX_PAYLOAD_BYTES {
                tracing::debug!(%label, "label too long for a button, skipped");
                return None;
            }
            Some(Choice::new(label.clone(), payload))
        })
        .collect();

    choices.chunks(LABELS_PER_ROW).map(<[Choice]>::to_vec).collect()
}

/// Label prompt: three labels per row, then refresh/cancel
pub fn label_keyboard(labels: &[String]) -> Vec<Vec<Choice>> {
    let mut rows = label_rows(labels, |label| CallbackAction::Label(LabelChoice::Label(label)));
    rows.push(vec![
        Choice::new("🔄 Refresh", CallbackAction::Label(LabelChoice::Refresh).payload()),
        Choice::new("❌ Cancel", CallbackAction::Label(LabelChoice::Cancel).payload()),
    ]);
    rows
}

/// Default-label picker, three per row
pub fn default_label_keyboard(labels: &[String]) -> Vec<Vec<Choice>> {
    label_rows(labels, CallbackAction::SetDefault)
}

/// Confirm/cancel prompt bound to one record
pub fn delete_keyboard(number: u64) -> Vec<Vec<Choice>> {
    vec![vec![
        Choice::new("✅ Confirm delete", CallbackAction::DeleteConfirm(number).payload()),
        Choice::new("❌ Cancel", CallbackAction::DeleteCancel.payload()),
    ]]
}

/// Body used for media published without any text
pub const fn media_placeholder(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Photo => "📷 Shared a photo",
        SubmissionKind::Video => "🎥 Shared a video",
        SubmissionKind::Text => "",
    }
}

/// Record body followed by a markdown image reference per uploaded file
pub fn compose_body(text: &str, media_urls: &[String]) -> String {
    let mut body = text.to_string();
    for url in media_urls {
        let _ = write!(body, "\n![{url}]({url})");
    }
    body
}
