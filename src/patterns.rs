use crate::errors::{Error, Result};
use crate::highlight::HighlightConfig;
use regex::{Captures, Regex};

/// A compiled regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles `pattern` with standard leftmost-first semantics.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Number of capture groups, including the implicit group 0.
    pub fn group_count(&self) -> usize {
        self.regex.captures_len()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// How each match is rewritten by a replace operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementSpec {
    /// Replace with a literal string. `$1`, `${name}` etc. are expanded.
    Literal(String),
    /// Replace each match with its own captured group.
    Group(usize),
}

impl ReplacementSpec {
    /// Builds a spec from the two optional inputs a caller may supply.
    ///
    /// Exactly one of `literal` and `group` must be present.
    pub fn from_parts(literal: Option<String>, group: Option<usize>) -> Result<Self> {
        match (literal, group) {
            (Some(literal), None) => Ok(ReplacementSpec::Literal(literal)),
            (None, Some(group)) => Ok(ReplacementSpec::Group(group)),
            (Some(_), Some(_)) => Err(Error::Config(
                "a replacement takes either a literal string or a group index, not both".into(),
            )),
            (None, None) => Err(Error::Config(
                "a replacement needs a literal string or a group index".into(),
            )),
        }
    }

    /// The spec that leaves every match as it is.
    pub fn identity() -> Self {
        ReplacementSpec::Group(0)
    }

    /// Checks that the spec can be applied to `pattern`.
    pub fn validate(&self, pattern: &Pattern) -> Result<()> {
        if let ReplacementSpec::Group(index) = self {
            if *index >= pattern.group_count() {
                return Err(Error::Config(format!(
                    "group {} requested but pattern '{}' has {} capture group(s)",
                    index,
                    pattern.as_str(),
                    pattern.group_count() - 1
                )));
            }
        }
        Ok(())
    }

    fn render(&self, caps: &Captures<'_>) -> String {
        match self {
            ReplacementSpec::Literal(literal) => {
                let mut dst = String::new();
                caps.expand(literal, &mut dst);
                dst
            }
            ReplacementSpec::Group(index) => caps
                .get(*index)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Two highlighted renderings of the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    /// The original text with matched spans highlighted.
    pub matched: String,
    /// The transformed text with replacement spans highlighted.
    pub replaced: String,
}

/// Stateless regex operations over strings.
///
/// The engine only holds the highlight colours used for previews; it never
/// prints anything itself.
#[derive(Debug, Clone, Default)]
pub struct PatternEngine {
    highlight: HighlightConfig,
}

impl PatternEngine {
    pub fn new(highlight: HighlightConfig) -> Self {
        Self { highlight }
    }

    pub fn highlight(&self) -> &HighlightConfig {
        &self.highlight
    }

    /// Counts non-overlapping matches of `pattern` in `text`.
    pub fn count(&self, pattern: &Pattern, text: &str) -> usize {
        pattern.regex.find_iter(text).count()
    }

    /// Deletes every match of `pattern` from `text`.
    pub fn remove(&self, pattern: &Pattern, text: &str) -> String {
        self.substitute(pattern, text, &ReplacementSpec::Literal(String::new()), None)
    }

    /// Rewrites every match of `pattern` in `text` according to `spec`.
    pub fn replace(&self, pattern: &Pattern, text: &str, spec: &ReplacementSpec) -> Result<String> {
        spec.validate(pattern)?;
        Ok(self.substitute(pattern, text, spec, None))
    }

    /// Renders what `replace` would do to `text` without returning the result.
    pub fn preview(&self, pattern: &Pattern, text: &str, spec: &ReplacementSpec) -> Result<Preview> {
        spec.validate(pattern)?;
        Ok(self.apply(pattern, text, spec, true).1.unwrap_or_default())
    }

    /// Applies `spec` and, when `with_preview` is set, renders the preview in
    /// the same pass. The spec must already be validated against `pattern`.
    pub(crate) fn apply(
        &self,
        pattern: &Pattern,
        text: &str,
        spec: &ReplacementSpec,
        with_preview: bool,
    ) -> (String, Option<Preview>) {
        if with_preview {
            let mut preview = Preview::default();
            let result = self.substitute(pattern, text, spec, Some(&mut preview));
            (result, Some(preview))
        } else {
            (self.substitute(pattern, text, spec, None), None)
        }
    }

    fn substitute(
        &self,
        pattern: &Pattern,
        text: &str,
        spec: &ReplacementSpec,
        mut preview: Option<&mut Preview>,
    ) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in pattern.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let gap = &text[last..whole.start()];
            let replacement = spec.render(&caps);

            out.push_str(gap);
            out.push_str(&replacement);

            if let Some(preview) = preview.as_deref_mut() {
                preview.matched.push_str(gap);
                preview.matched.push_str(&self.highlight.matched(whole.as_str()));
                preview.replaced.push_str(gap);
                preview
                    .replaced
                    .push_str(&self.highlight.replacement(&replacement));
            }
            last = whole.end();
        }

        let tail = &text[last..];
        out.push_str(tail);
        if let Some(preview) = preview {
            preview.matched.push_str(tail);
            preview.replaced.push_str(tail);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(s: &str) -> String {
        String::from_utf8(strip_ansi_escapes::strip(s)).unwrap()
    }

    #[test]
    fn test_count_non_overlapping() {
        let engine = PatternEngine::default();
        let pattern = Pattern::new("aa").unwrap();
        assert_eq!(engine.count(&pattern, "aaaaa"), 2);
    }

    #[test]
    fn test_empty_pattern_matches_every_position() {
        let engine = PatternEngine::default();
        let pattern = Pattern::new("").unwrap();
        assert_eq!(engine.count(&pattern, "abc"), 4);
    }

    #[test]
    fn test_remove_then_count_is_zero() {
        let engine = PatternEngine::default();
        let cases = [
            (r"\[\[[0-9]*\]\] ", "surrounding [[24]] text", "surrounding text"),
            (r"\d+", "a1b22c333", "abc"),
            (r"\s", "héllo wörld ✓", "héllowörld✓"),
            ("é", "café résumé", "caf rsum"),
            ("x", "", ""),
        ];
        for (pattern, text, expected) in cases {
            let pattern = Pattern::new(pattern).unwrap();
            let result = engine.remove(&pattern, text);
            assert_eq!(result, expected);
            assert_eq!(engine.count(&pattern, &result), 0, "pattern {:?}", pattern.as_str());
        }
    }

    #[test]
    fn test_literal_replacement_expands_groups() {
        let engine = PatternEngine::default();
        let pattern = Pattern::new(r"(\w+)@(\w+)").unwrap();
        let spec = ReplacementSpec::Literal("$2 at $1".into());
        assert_eq!(
            engine.replace(&pattern, "mail bob@home now", &spec).unwrap(),
            "mail home at bob now"
        );
    }

    #[test]
    fn test_group_replacement_extracts_capture() {
        let engine = PatternEngine::default();
        let pattern = Pattern::new(r"<(\w+)>").unwrap();
        let spec = ReplacementSpec::Group(1);
        assert_eq!(engine.replace(&pattern, "<a> and <b>", &spec).unwrap(), "a and b");
    }

    #[test]
    fn test_unmatched_optional_group_becomes_empty() {
        let engine = PatternEngine::default();
        let pattern = Pattern::new(r"x(y)?").unwrap();
        let spec = ReplacementSpec::Group(1);
        assert_eq!(engine.replace(&pattern, "xy x", &spec).unwrap(), "y ");
    }

    #[test]
    fn test_group_zero_is_identity() {
        let engine = PatternEngine::default();
        let pattern = Pattern::new(r"\d+").unwrap();
        let text = "a1 b22 c333";
        assert_eq!(
            engine.replace(&pattern, text, &ReplacementSpec::identity()).unwrap(),
            text
        );
    }

    #[test]
    fn test_group_index_out_of_range_is_config_error() {
        let engine = PatternEngine::default();
        let pattern = Pattern::new("abc").unwrap();
        let err = engine
            .replace(&pattern, "abc", &ReplacementSpec::Group(1))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_spec_requires_exactly_one_part() {
        assert!(matches!(
            ReplacementSpec::from_parts(Some("x".into()), Some(1)),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ReplacementSpec::from_parts(None, None),
            Err(Error::Config(_))
        ));
        assert_eq!(
            ReplacementSpec::from_parts(None, Some(2)).unwrap(),
            ReplacementSpec::Group(2)
        );
    }

    #[test]
    fn test_no_match_leaves_text_unchanged() {
        let engine = PatternEngine::default();
        let cases = [
            ("zzz", "nothing to see here"),
            (r"\d", "no digits, only words"),
            ("ß", "Grüsse ohne Eszett, naïve café"),
            (r"(\w+)@(\w+)", "日本語のテキスト"),
            ("a", ""),
        ];
        for (pattern, text) in cases {
            let pattern = Pattern::new(pattern).unwrap();
            assert_eq!(engine.count(&pattern, text), 0, "pattern {:?}", pattern.as_str());
            assert_eq!(engine.remove(&pattern, text), text);
            let spec = ReplacementSpec::Literal("!!".into());
            assert_eq!(engine.replace(&pattern, text, &spec).unwrap(), text);
            assert_eq!(
                engine.replace(&pattern, text, &ReplacementSpec::identity()).unwrap(),
                text
            );
        }
    }

    #[test]
    fn test_preview_renders_both_sides() {
        let engine = PatternEngine::default();
        let pattern = Pattern::new("-").unwrap();
        let spec = ReplacementSpec::Literal("_".into());
        let preview = engine.preview(&pattern, "file-name", &spec).unwrap();

        assert!(preview.matched.contains("\x1b[38;2;255;0;0m"));
        assert!(preview.replaced.contains("\x1b[38;2;0;255;0m"));
        assert_eq!(strip(&preview.matched), "file-name");
        assert_eq!(strip(&preview.replaced), "file_name");
    }
}
