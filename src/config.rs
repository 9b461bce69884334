//! Relay settings
//!
//! Every tunable of the core lives here. The binary fills these from CLI
//! flags / environment; tests use [`Settings::new`] and override fields.

use crate::types::UserId;
use std::time::Duration;

/// Wait before a labelled media submission publishes itself
pub const DEFAULT_AUTO_PUBLISH_DELAY: Duration = Duration::from_secs(5 * 60);

/// Freshness window of the label cache
pub const DEFAULT_LABEL_TTL: Duration = Duration::from_secs(30 * 60);

/// Character ceiling for record bodies
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 5000;

/// Byte ceiling for downloaded media
pub const DEFAULT_MAX_MEDIA_BYTES: u64 = 50 * 1024 * 1024;

/// How many records `/edit` and `/delete` list
pub const DEFAULT_RECENT_LIMIT: u8 = 10;

/// Label used when nothing else was selected
pub const DEFAULT_FALLBACK_LABEL: &str = "moment";

/// Labels offered when the remote list was never fetched
pub const DEFAULT_LABELS: [&str; 3] = ["moment", "daily", "other"];

/// Runtime settings of the relay core
#[derive(Debug, Clone)]
pub struct Settings {
    /// The single identity allowed to talk to the relay
    pub owner_id: UserId,
    /// Delay between label pick and auto-publish of media
    pub auto_publish_delay: Duration,
    /// Label cache freshness window
    pub label_ttl: Duration,
    /// Maximum record body length in characters
    pub max_content_chars: usize,
    /// Maximum media size in bytes
    pub max_media_bytes: u64,
    /// Number of records shown in edit/delete listings
    pub recent_limit: u8,
    /// Labels used before any successful remote fetch
    pub default_labels: Vec<String>,
    /// Label attached when a publish or commit has none
    pub fallback_label: String,
    /// Upper bound on cached published records, `None` for unbounded
    pub record_cache_capacity: Option<usize>,
}

impl Settings {
    /// Default settings for the given owner
    pub fn new(owner_id: UserId) -> Self {
        Self {
            owner_id,
            auto_publish_delay: DEFAULT_AUTO_PUBLISH_DELAY,
            label_ttl: DEFAULT_LABEL_TTL,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
            max_media_bytes: DEFAULT_MAX_MEDIA_BYTES,
            recent_limit: DEFAULT_RECENT_LIMIT,
            default_labels: DEFAULT_LABELS.iter().map(ToString::to_string).collect(),
            fallback_label: DEFAULT_FALLBACK_LABEL.to_string(),
            record_cache_capacity: None,
        }
    }

    /// The label set a record gets when none was chosen
    pub fn fallback_labels(&self) -> Vec<String> {
        vec![self.fallback_label.clone()]
    }
}
