//! Rule text and the typed edit operations derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw newline-delimited instructions returned by the rule generator.
///
/// Untrusted: only ever pattern-matched line by line, never executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleText(String);

impl RuleText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for RuleText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for RuleText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl fmt::Display for RuleText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single video transform. Operations apply in sequence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    /// Playback speed multiplier (0.5 = half speed).
    SlowMotion { factor: f64 },

    /// Centered text drawn over the whole clip.
    OverlayText { content: String },

    /// Per-channel color multiplier.
    BrightnessAdjust { factor: f64 },

    /// Fade from black at the start and to black at the end.
    FadeInOut {
        fade_in_secs: f64,
        fade_out_secs: f64,
    },
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOperation::SlowMotion { factor } => write!(f, "SlowMotion({factor})"),
            EditOperation::OverlayText { content } => write!(f, "OverlayText({content:?})"),
            EditOperation::BrightnessAdjust { factor } => write!(f, "BrightnessAdjust({factor})"),
            EditOperation::FadeInOut {
                fade_in_secs,
                fade_out_secs,
            } => write!(f, "FadeInOut({fade_in_secs}, {fade_out_secs})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_serialization_is_tagged() {
        let op = EditOperation::OverlayText {
            content: "Hi".to_string(),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "overlay_text");
        assert_eq!(json["content"], "Hi");

        let back: EditOperation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_display() {
        let op = EditOperation::FadeInOut {
            fade_in_secs: 1.0,
            fade_out_secs: 1.0,
        };
        assert_eq!(op.to_string(), "FadeInOut(1, 1)");
        assert_eq!(
            EditOperation::SlowMotion { factor: 0.5 }.to_string(),
            "SlowMotion(0.5)"
        );
    }

    #[test]
    fn test_rule_text_blank() {
        assert!(RuleText::new(" \n\t\n").is_blank());
        assert!(!RuleText::from("fade").is_blank());
    }
}
