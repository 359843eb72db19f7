//! Events emitted by a fetch run
//!
//! The worker running [`crate::fetcher::FetchPipeline`] never touches the
//! front end directly. It sends these events over a channel in a fixed order:
//! `Started`, then per URL `Progress` and `Outcome` (plus an occasional
//! `Preview`), and finally one `Finished`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::fetcher::Digest;

/// URLs longer than this are shortened in status lines
const STATUS_URL_WIDTH: usize = 50;

/// A successfully retrieved image, alive only while the pipeline decides what
/// to do with it
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub url: String,
    pub content: Vec<u8>,
    pub content_type: String,
    pub hash: Digest,
}

/// Terminal classification of one URL within a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchOutcome {
    Saved { filename: String },
    SkippedDuplicate,
    InvalidUrl,
    NotAnImage,
    CorruptImage,
    NetworkError { detail: String },
    OtherError { detail: String },
}

impl FetchOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, FetchOutcome::Saved { .. })
    }

    /// Symbol-prefixed, human-readable line for the activity log
    pub fn log_line(&self, url: &str) -> String {
        match self {
            FetchOutcome::Saved { filename } => format!("✓ Successfully fetched: {}", filename),
            FetchOutcome::SkippedDuplicate => format!("⏭ Skipped duplicate image: {}", url),
            FetchOutcome::InvalidUrl => format!("✗ Invalid URL: {}", url),
            FetchOutcome::NotAnImage => format!("✗ URL does not point to an image: {}", url),
            FetchOutcome::CorruptImage => format!("✗ Invalid image file: {}", url),
            FetchOutcome::NetworkError { detail } => format!("✗ Network error for {}: {}", url, detail),
            FetchOutcome::OtherError { detail } => format!("✗ Error processing {}: {}", url, detail),
        }
    }
}

impl std::fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchOutcome::Saved { .. } => write!(f, "saved"),
            FetchOutcome::SkippedDuplicate => write!(f, "skipped_duplicate"),
            FetchOutcome::InvalidUrl => write!(f, "invalid_url"),
            FetchOutcome::NotAnImage => write!(f, "not_an_image"),
            FetchOutcome::CorruptImage => write!(f, "corrupt_image"),
            FetchOutcome::NetworkError { .. } => write!(f, "network_error"),
            FetchOutcome::OtherError { .. } => write!(f, "other_error"),
        }
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub successful: usize,
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Closing message shown to the user
    pub fn message(&self) -> String {
        if self.successful > 0 {
            format!(
                "✓ Connection strengthened. Community enriched with {} new image(s).",
                self.successful
            )
        } else {
            "No new images were fetched. The community remains as is.".to_string()
        }
    }

    pub fn status_line(&self) -> String {
        format!(
            "Download completed: {} of {} images fetched",
            self.successful, self.total
        )
    }
}

/// Message sent from the fetch worker to the front end
#[derive(Debug, Clone)]
pub enum FetchEvent {
    Started {
        run_id: Uuid,
        total: usize,
    },
    /// Sent before a URL is processed. `index` is zero-based.
    Progress {
        index: usize,
        total: usize,
        url: String,
    },
    Outcome {
        index: usize,
        url: String,
        outcome: FetchOutcome,
        line: String,
    },
    /// Raw bytes of the image to show in the preview pane
    Preview {
        filename: String,
        bytes: Vec<u8>,
    },
    Finished(RunSummary),
}

impl FetchEvent {
    /// Status text for a `Progress` event
    pub fn status_line(&self) -> Option<String> {
        match self {
            FetchEvent::Progress { index, total, url } => Some(format!(
                "Fetching image {} of {}: {}",
                index + 1,
                total,
                shorten(url, STATUS_URL_WIDTH)
            )),
            _ => None,
        }
    }
}

fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
