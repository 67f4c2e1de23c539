use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};

/// A 24-bit terminal colour, written as `[r, g, b]` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Wraps `text` in a truecolor foreground escape sequence.
    pub fn paint(&self, text: &str) -> String {
        let Rgb(r, g, b) = *self;
        text.truecolor(r, g, b).to_string()
    }
}

/// Colours used when rendering previews.
///
/// Has no effect on transformation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Colour for matched (to-be-removed) spans.
    pub matched: Rgb,
    /// Colour for replacement spans.
    pub replacement: Rgb,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            matched: Rgb(255, 0, 0),
            replacement: Rgb(0, 255, 0),
        }
    }
}

impl HighlightConfig {
    pub fn matched(&self, text: &str) -> String {
        self.matched.paint(text)
    }

    pub fn replacement(&self, text: &str) -> String {
        self.replacement.paint(text)
    }
}
