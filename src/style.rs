use serde::{Deserialize, Serialize};

/// How the caret position is decorated when the prompt is drawn.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CaretStyle {
    None,
    #[default]
    Underline,
    Block,
    Outline,
}

/// Display preferences consulted by rendering only. Nothing in here feeds
/// back into session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleProfile {
    pub font_family: String,
    pub font_size: u16,
    pub font_weight: u16,
    pub letter_spacing: u16,
    pub word_spacing: u16,
    pub line_height: u16,
    /// Hex (`#rrggbb`) or a named terminal color.
    pub text_color: String,
    pub caret: CaretStyle,
}

pub const MIN_FONT_WEIGHT: u16 = 100;
pub const MAX_FONT_WEIGHT: u16 = 900;
pub const BOLD_FONT_WEIGHT: u16 = 600;

impl Default for StyleProfile {
    fn default() -> Self {
        Self {
            font_family: "monospace".to_string(),
            font_size: 24,
            font_weight: 400,
            letter_spacing: 2,
            word_spacing: 2,
            line_height: 20,
            text_color: "white".to_string(),
            caret: CaretStyle::default(),
        }
    }
}

impl StyleProfile {
    pub fn is_bold(&self) -> bool {
        self.font_weight.clamp(MIN_FONT_WEIGHT, MAX_FONT_WEIGHT) >= BOLD_FONT_WEIGHT
    }

    pub fn with_caret(mut self, caret: CaretStyle) -> Self {
        self.caret = caret;
        self
    }
}
