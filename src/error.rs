//! Error types for the lesson core.

use std::fmt;

/// Failures raised by [`crate::session::LessonSession`] operations.
#[derive(Debug)]
pub enum LessonError {
    /// Requested step index is outside the page. Callers treat this as a
    /// page-navigation signal, never as a learner-facing error.
    OutOfRange { index: usize, len: usize },
    /// `submit_answer` arrived while no interaction was armed.
    InvalidAnswerSubmission,
    /// `advance` on a practice step that has not been answered yet.
    StepIncomplete { step: String },
    Content(ContentError),
}

impl fmt::Display for LessonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, len } => {
                write!(f, "step index {index} out of range (page has {len} steps)")
            }
            Self::InvalidAnswerSubmission => write!(f, "answer submitted with no armed interaction"),
            Self::StepIncomplete { step } => write!(f, "step '{step}' has not been completed"),
            Self::Content(e) => write!(f, "lesson content: {e}"),
        }
    }
}

impl std::error::Error for LessonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Content(e) = self {
            return Some(e);
        }
        None
    }
}

impl From<ContentError> for LessonError {
    fn from(e: ContentError) -> Self {
        Self::Content(e)
    }
}

/// Problems found while loading the embedded lesson file.
#[derive(Debug)]
pub enum ContentError {
    Parse(serde_json::Error),
    Invalid {
        page: String,
        step: Option<String>,
        reason: String,
    },
}

impl ContentError {
    pub(crate) fn invalid(page: impl Into<String>, step: Option<&str>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            page: page.into(),
            step: step.map(str::to_owned),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "malformed lesson file: {e}"),
            Self::Invalid { page, step: Some(step), reason } => {
                write!(f, "page '{page}', step '{step}': {reason}")
            }
            Self::Invalid { page, step: None, reason } => write!(f, "page '{page}': {reason}"),
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Parse(e) = self {
            return Some(e);
        }
        None
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Audio playback failure reported by the platform output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The browser refused to start audio without a user gesture.
    AutoplayBlocked,
    Media(String),
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutoplayBlocked => write!(f, "autoplay blocked until the learner interacts"),
            Self::Media(msg) => write!(f, "media error: {msg}"),
        }
    }
}

impl std::error::Error for PlaybackError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_bounds() {
        let e = LessonError::OutOfRange { index: 7, len: 5 };
        assert_eq!(e.to_string(), "step index 7 out of range (page has 5 steps)");
    }

    #[test]
    fn content_error_is_source_of_lesson_error() {
        let e: LessonError = ContentError::invalid("warm-up", Some("wu-1"), "no checks").into();
        let source = std::error::Error::source(&e).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("page 'warm-up', step 'wu-1': no checks"));
    }
}
