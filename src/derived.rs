//! Built-in transformations expressed as fixed pattern-engine calls.

use crate::errors::Result;
use crate::patterns::{Pattern, PatternEngine, ReplacementSpec};
use crate::target::{TargetCollection, TransformOutcome};

/// A bracketed label (optionally wrapped in one more pair of brackets)
/// followed immediately by a parenthesised http(s) URL.
pub const MARKDOWN_LINK: &str = r"\[(\[?[^\[\]]+\]?)\]\((https?://[^)]+)\)";

/// Leading and trailing whitespace of the whole text.
pub const OUTER_WHITESPACE: &str = r"\A\s+|\s+\z";

/// Runs of spaces.
pub const SPACE_RUN: &str = r"[ ]+";

/// A single space right before a comma, period or closing parenthesis.
pub const SPACE_BEFORE_PUNCTUATION: &str = r"[ ]([,.)])";

fn markdown_link() -> Result<(Pattern, ReplacementSpec)> {
    Ok((Pattern::new(MARKDOWN_LINK)?, ReplacementSpec::Group(1)))
}

fn whitespace_passes() -> Result<Vec<(Pattern, ReplacementSpec)>> {
    Ok(vec![
        (Pattern::new(OUTER_WHITESPACE)?, ReplacementSpec::Literal(String::new())),
        (Pattern::new(SPACE_RUN)?, ReplacementSpec::Literal(" ".into())),
        (Pattern::new(SPACE_BEFORE_PUNCTUATION)?, ReplacementSpec::Literal("${1}".into())),
    ])
}

/// Replaces each markdown link with its label.
pub fn strip_markdown_links(engine: &PatternEngine, text: &str) -> Result<String> {
    let (pattern, spec) = markdown_link()?;
    engine.replace(&pattern, text, &spec)
}

/// Trims the text, collapses space runs and drops spaces before `,` `.` `)`.
pub fn remove_extra_whitespaces(engine: &PatternEngine, text: &str) -> Result<String> {
    let mut text = text.to_string();
    for (pattern, spec) in whitespace_passes()? {
        text = engine.replace(&pattern, &text, &spec)?;
    }
    Ok(text)
}

impl TargetCollection {
    /// Replaces each markdown link in every working value with its label.
    pub fn strip_markdown_links(&mut self, verbose: bool) -> Result<TransformOutcome> {
        let (pattern, spec) = markdown_link()?;
        self.search_and_replace(&pattern, &spec, verbose)
    }

    /// Normalizes whitespace in every working value.
    pub fn remove_extra_whitespaces(&mut self, verbose: bool) -> Result<TransformOutcome> {
        let before = self.working.clone();
        let mut previews = Vec::new();
        for (pattern, spec) in whitespace_passes()? {
            previews.extend(self.search_and_replace(&pattern, &spec, verbose)?.previews);
        }
        let changed = before
            .iter()
            .zip(&self.working)
            .filter(|(before, after)| before != after)
            .count();
        Ok(TransformOutcome {
            values: self.working_values(),
            changed,
            previews,
        })
    }
}
