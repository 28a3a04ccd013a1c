//! Line-oriented rule interpretation.

use clipsmith_edit_model::edit::{EditOperation, RuleText};

use crate::keywords::Keyword;

/// Parse generated rule text into an ordered list of edit operations.
///
/// Each line yields at most one operation, chosen by the first keyword in
/// [`Keyword::PRECEDENCE`] that matches. Lines matching nothing are dropped.
pub fn parse(rules: &RuleText) -> Vec<EditOperation> {
    parse_str(rules.as_str())
}

/// [`parse`] over a plain string.
pub fn parse_str(text: &str) -> Vec<EditOperation> {
    let mut operations = Vec::new();
    let mut dropped = 0usize;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match classify_line(line) {
            Some(op) => operations.push(op),
            None => dropped += 1,
        }
    }

    tracing::debug!(
        operations = operations.len(),
        dropped_lines = dropped,
        "Parsed rule text"
    );

    operations
}

/// Classify a single instruction line.
pub fn classify_line(line: &str) -> Option<EditOperation> {
    let lowered = line.to_ascii_lowercase();
    Keyword::PRECEDENCE
        .iter()
        .find_map(|keyword| keyword.match_line(line, &lowered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_yields_nothing() {
        assert!(parse_str("").is_empty());
        assert!(parse_str("  \n\n\t ").is_empty());
    }

    #[test]
    fn test_slow_motion_beats_overlay_text() {
        assert_eq!(
            parse_str("slow motion with text: Hello"),
            vec![EditOperation::SlowMotion { factor: 0.5 }]
        );
    }

    #[test]
    fn test_overlay_text_strips_prefix() {
        assert_eq!(
            parse_str("text: Delicious Food ASMR"),
            vec![EditOperation::OverlayText {
                content: "Delicious Food ASMR".to_string()
            }]
        );
    }

    #[test]
    fn test_overlay_text_keeps_original_case() {
        assert_eq!(
            classify_line("Add TEXT: Crunchy Bites"),
            Some(EditOperation::OverlayText {
                content: "Crunchy Bites".to_string()
            })
        );
    }

    #[test]
    fn test_empty_overlay_falls_through() {
        assert_eq!(
            classify_line("text:   then fade"),
            Some(EditOperation::OverlayText {
                content: "then fade".to_string()
            })
        );
        assert_eq!(
            classify_line("fade out, no text:"),
            Some(EditOperation::FadeInOut {
                fade_in_secs: 1.0,
                fade_out_secs: 1.0
            })
        );
    }

    #[test]
    fn test_brightness_and_fade() {
        assert_eq!(
            parse_str("brightness boost"),
            vec![EditOperation::BrightnessAdjust { factor: 1.2 }]
        );
        assert_eq!(
            parse_str("fade to black"),
            vec![EditOperation::FadeInOut {
                fade_in_secs: 1.0,
                fade_out_secs: 1.0
            }]
        );
    }

    #[test]
    fn test_brightness_wins_over_fade() {
        assert_eq!(
            classify_line("raise brightness then fade"),
            Some(EditOperation::BrightnessAdjust { factor: 1.2 })
        );
    }

    #[test]
    fn test_unknown_lines_are_dropped() {
        assert!(parse_str("add sparkles").is_empty());
        assert_eq!(classify_line("add sparkles"), None);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(
            classify_line("Use SLOW MOTION on the pour"),
            Some(EditOperation::SlowMotion { factor: 0.5 })
        );
        assert_eq!(
            classify_line("FADE in and out"),
            Some(EditOperation::FadeInOut {
                fade_in_secs: 1.0,
                fade_out_secs: 1.0
            })
        );
    }

    #[test]
    fn test_order_follows_source_lines() {
        let text = "1. fade in\n2. add sparkles\n3. text: Crunch\n4. slow motion\n5. text: Crunch";
        assert_eq!(
            parse_str(text),
            vec![
                EditOperation::FadeInOut {
                    fade_in_secs: 1.0,
                    fade_out_secs: 1.0
                },
                EditOperation::OverlayText {
                    content: "Crunch".to_string()
                },
                EditOperation::SlowMotion { factor: 0.5 },
                EditOperation::OverlayText {
                    content: "Crunch".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_non_ascii_content_survives() {
        assert_eq!(
            classify_line("Text: Crème brûlée ✨"),
            Some(EditOperation::OverlayText {
                content: "Crème brûlée ✨".to_string()
            })
        );
    }
}
