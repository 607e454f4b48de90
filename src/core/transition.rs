//! Transition labels returned by state handlers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbolic tag identifying which outgoing edge of a state to follow.
///
/// The lifecycle labels every action machine uses are closed variants;
/// anything else a definition declares is carried as [`TransitionLabel::Custom`].
/// Labels are written in snake_case in definition sources.
///
/// # Example
///
/// ```rust
/// use ftsm::core::TransitionLabel;
///
/// assert_eq!(TransitionLabel::from("done_configuring"), TransitionLabel::DoneConfiguring);
/// assert_eq!(TransitionLabel::from("retry_grasp").as_str(), "retry_grasp");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransitionLabel {
    Initialised,
    DoneConfiguring,
    Run,
    Wait,
    Done,
    DoneRecovering,
    Recover,
    Failed,
    /// A label outside the standard lifecycle vocabulary.
    Custom(String),
}

impl TransitionLabel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Initialised => "initialised",
            Self::DoneConfiguring => "done_configuring",
            Self::Run => "run",
            Self::Wait => "wait",
            Self::Done => "done",
            Self::DoneRecovering => "done_recovering",
            Self::Recover => "recover",
            Self::Failed => "failed",
            Self::Custom(label) => label,
        }
    }

    /// Whether this label belongs to the standard lifecycle vocabulary.
    pub fn is_standard(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl From<&str> for TransitionLabel {
    fn from(label: &str) -> Self {
        match label {
            "initialised" => Self::Initialised,
            "done_configuring" => Self::DoneConfiguring,
            "run" => Self::Run,
            "wait" => Self::Wait,
            "done" => Self::Done,
            "done_recovering" => Self::DoneRecovering,
            "recover" => Self::Recover,
            "failed" => Self::Failed,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for TransitionLabel {
    fn from(label: String) -> Self {
        match Self::from(label.as_str()) {
            Self::Custom(_) => Self::Custom(label),
            standard => standard,
        }
    }
}

impl From<TransitionLabel> for String {
    fn from(label: TransitionLabel) -> Self {
        match label {
            TransitionLabel::Custom(label) => label,
            standard => standard.as_str().to_string(),
        }
    }
}

impl fmt::Display for TransitionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
