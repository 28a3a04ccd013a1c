//! The keyword table and its precedence order.

use clipsmith_edit_model::edit::EditOperation;

/// Playback speed applied by a "slow motion" instruction.
pub const SLOW_MOTION_FACTOR: f64 = 0.5;

/// Color multiplier applied by a "brightness" instruction.
pub const BRIGHTNESS_FACTOR: f64 = 1.2;

/// Fade-in and fade-out length applied by a "fade" instruction.
pub const FADE_SECS: f64 = 1.0;

/// Marker introducing overlay text content.
pub const TEXT_MARKER: &str = "text:";

/// Recognized instruction families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    SlowMotion,
    OverlayText,
    Brightness,
    Fade,
}

impl Keyword {
    /// Keywords in the order they are tried. The first match wins.
    pub const PRECEDENCE: [Keyword; 4] = [
        Keyword::SlowMotion,
        Keyword::OverlayText,
        Keyword::Brightness,
        Keyword::Fade,
    ];

    /// Try to match this keyword against one line.
    ///
    /// `lowered` must be the ASCII-lowercased form of `line`, so byte
    /// offsets found in one are valid in the other.
    pub fn match_line(self, line: &str, lowered: &str) -> Option<EditOperation> {
        match self {
            Keyword::SlowMotion => lowered
                .contains("slow motion")
                .then_some(EditOperation::SlowMotion {
                    factor: SLOW_MOTION_FACTOR,
                }),
            Keyword::OverlayText => {
                let start = lowered.find(TEXT_MARKER)? + TEXT_MARKER.len();
                let content = line[start..].trim();
                (!content.is_empty()).then(|| EditOperation::OverlayText {
                    content: content.to_string(),
                })
            }
            Keyword::Brightness => {
                lowered
                    .contains("brightness")
                    .then_some(EditOperation::BrightnessAdjust {
                        factor: BRIGHTNESS_FACTOR,
                    })
            }
            Keyword::Fade => lowered.contains("fade").then_some(EditOperation::FadeInOut {
                fade_in_secs: FADE_SECS,
                fade_out_secs: FADE_SECS,
            }),
        }
    }
}
