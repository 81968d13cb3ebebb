use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

/// Identifier of an upload, unique for the lifetime of an uploader.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UploadId(pub u32);

impl Display for UploadId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UploadId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(UploadId)
    }
}

/// Lifecycle of a discovered file.
///
/// `Pending` is only used when uploads are held for review. `Complete`,
/// `Failed` and `Skipped` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UploadState {
    Pending,
    Queued,
    Complete,
    Failed,
    Skipped,
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadState::Complete | UploadState::Failed | UploadState::Skipped
        )
    }
}

impl Display for UploadState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadState::Pending => write!(f, "Pending"),
            UploadState::Queued => write!(f, "Queued"),
            UploadState::Complete => write!(f, "Complete"),
            UploadState::Failed => write!(f, "Failed"),
            UploadState::Skipped => write!(f, "Skipped"),
        }
    }
}

impl FromStr for UploadState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(UploadState::Pending),
            "Queued" => Ok(UploadState::Queued),
            "Complete" => Ok(UploadState::Complete),
            "Failed" => Ok(UploadState::Failed),
            "Skipped" => Ok(UploadState::Skipped),
            _ => Err(anyhow::anyhow!("Invalid upload state: {}", s)),
        }
    }
}

/// Why an upload ended in `Failed`.
///
/// `TooLarge` and `ExhaustedRetries` come from the network; `InvalidImage` and
/// `Oversized` mean the asset itself is the problem and retrying cannot help.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    TooLarge,
    ExhaustedRetries,
    InvalidImage(String),
    Oversized(String),
}

impl FailureReason {
    /// True when the remote end or the asset ruled out any further attempt.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FailureReason::ExhaustedRetries)
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FailureReason::TooLarge => write!(f, "file too large"),
            FailureReason::ExhaustedRetries => write!(f, "exhausted retries"),
            FailureReason::InvalidImage(msg) => write!(f, "invalid image: {}", msg),
            FailureReason::Oversized(msg) => write!(f, "could not fit size limit: {}", msg),
        }
    }
}

/// Serializable snapshot of an upload, used for status listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub id: UploadId,
    pub original_file: PathBuf,
    pub edited: bool,
    pub state: UploadState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub width: u32,
    pub height: u32,
    pub discovered_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trips_through_str() {
        for state in [
            UploadState::Pending,
            UploadState::Queued,
            UploadState::Complete,
            UploadState::Failed,
            UploadState::Skipped,
        ] {
            assert_eq!(state.to_string().parse::<UploadState>().unwrap(), state);
        }
        assert!("Uploading".parse::<UploadState>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!UploadState::Pending.is_terminal());
        assert!(!UploadState::Queued.is_terminal());
        assert!(UploadState::Complete.is_terminal());
        assert!(UploadState::Failed.is_terminal());
        assert!(UploadState::Skipped.is_terminal());
    }

    #[test]
    fn test_failure_reason_messages() {
        assert_eq!(FailureReason::TooLarge.to_string(), "file too large");
        assert_eq!(
            FailureReason::ExhaustedRetries.to_string(),
            "exhausted retries"
        );
        assert!(FailureReason::TooLarge.is_fatal());
        assert!(!FailureReason::ExhaustedRetries.is_fatal());
    }

    #[test]
    fn test_failure_reason_serialization() {
        let json = serde_json::to_value(FailureReason::Oversized("too big".into())).unwrap();
        assert_eq!(json["kind"], "oversized");
        assert_eq!(json["detail"], "too big");
    }
}
