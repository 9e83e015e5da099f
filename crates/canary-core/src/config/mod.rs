//! Line model of a load balancer configuration body.
//!
//! A body is split on `\n` into lines; joining them back with `\n` gives the
//! exact same text, so a trailing newline shows up as a final empty line.
mod weighted;
pub use weighted::{Tag, WeightedServerLine, find_weighted_server_lines};

use std::fmt;

/// Marker that comments out a config line.
pub const COMMENT_MARKER: char = '#';

const LINE_BREAK: char = '\n';

/// Whether canary routing lines are currently commented out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentState {
    /// No line carries the comment marker.
    Enabled,
    /// Every content line starts with the comment marker.
    Disabled,
    /// Some lines are commented, some are not.
    Mixed,
    /// Body has no content.
    Empty,
}

impl CommentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentState::Enabled => "enabled",
            CommentState::Disabled => "disabled",
            CommentState::Mixed => "mixed",
            CommentState::Empty => "empty",
        }
    }
}

impl fmt::Display for CommentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load balancer config body as an ordered list of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigText {
    lines: Vec<String>,
}

impl ConfigText {
    /// Split a body into lines.
    pub fn parse(body: &str) -> Self {
        Self {
            lines: body.split(LINE_BREAK).map(str::to_owned).collect(),
        }
    }

    /// Join lines back into a body.
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True when the body was the empty string.
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// Number of lines that carry content.
    ///
    /// The empty segment produced by a trailing newline is not counted.
    pub fn content_len(&self) -> usize {
        match self.lines.last() {
            Some(last) if last.is_empty() => self.lines.len() - 1,
            _ => self.lines.len(),
        }
    }

    /// Prefix every content line that is not already commented.
    pub fn comment_all(&mut self) {
        let len = self.content_len();
        for line in self.lines.iter_mut().take(len) {
            if !line.starts_with(COMMENT_MARKER) {
                line.insert(0, COMMENT_MARKER);
            }
        }
    }

    /// Replace the character range `span` of line `index` with `value`.
    pub(crate) fn splice(&mut self, index: usize, span: std::ops::Range<usize>, value: &str) {
        if let Some(line) = self.lines.get_mut(index) {
            line.replace_range(span, value);
        }
    }

    pub fn comment_state(&self) -> CommentState {
        let content = &self.lines[..self.content_len()];
        if content.is_empty() || (content.len() == 1 && content[0].is_empty()) {
            return CommentState::Empty;
        }
        if content.iter().all(|l| l.starts_with(COMMENT_MARKER)) {
            return CommentState::Disabled;
        }
        if content.iter().any(|l| l.contains(COMMENT_MARKER)) {
            return CommentState::Mixed;
        }
        CommentState::Enabled
    }

    /// Weighted server lines tagged `new` or `old`, in line order.
    pub fn weighted_lines(&self) -> Vec<WeightedServerLine> {
        find_weighted_server_lines(&self.lines)
    }
}

impl fmt::Display for ConfigText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body())
    }
}

impl From<&str> for ConfigText {
    fn from(body: &str) -> Self {
        Self::parse(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_join_are_inverse() {
        for body in ["", "a", "a\nb", "a\nb\n", "\n\n", "x\n\ny"] {
            assert_eq!(ConfigText::parse(body).body(), body);
        }
    }

    #[test]
    fn trailing_newline_is_an_empty_last_line() {
        let text = ConfigText::parse("a\nb\n");
        assert_eq!(text.lines().len(), 3);
        assert_eq!(text.content_len(), 2);
        assert!(!text.is_empty());
        assert!(ConfigText::parse("").is_empty());
    }

    #[test]
    fn comment_all_skips_trailing_segment_and_commented_lines() {
        let mut text = ConfigText::parse("a\n#b\n");
        text.comment_all();
        assert_eq!(text.body(), "#a\n#b\n");
    }

    #[test]
    fn comment_state_classification() {
        assert_eq!(ConfigText::parse("a\nb\n").comment_state(), CommentState::Enabled);
        assert_eq!(ConfigText::parse("#a\n#b\n").comment_state(), CommentState::Disabled);
        assert_eq!(ConfigText::parse("#a\nb").comment_state(), CommentState::Mixed);
        assert_eq!(ConfigText::parse("a # note").comment_state(), CommentState::Mixed);
        assert_eq!(ConfigText::parse("").comment_state(), CommentState::Empty);
        assert_eq!(ConfigText::parse("\n").comment_state(), CommentState::Empty);
    }
}
