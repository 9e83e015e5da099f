use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

static WEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bweight\s+(\d+)\b").expect("valid weight pattern"));
static NEW_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnew\b").expect("valid tag pattern"));
static OLD_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bold\b").expect("valid tag pattern"));

const SERVER_KEYWORD: &str = "server";

/// Canary side a weighted server line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    New,
    Old,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::New => "new",
            Tag::Old => "old",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `server` line carrying a `weight <n>` token and a `new`/`old` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedServerLine {
    index: usize,
    tag: Tag,
    weight: u32,
    weight_span: Range<usize>,
    ambiguous: bool,
}

impl WeightedServerLine {
    /// Position of the line in the config body.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Byte range of the weight digits within the line.
    pub fn weight_span(&self) -> Range<usize> {
        self.weight_span.clone()
    }

    /// Line mentioned both `new` and `old`; classified as `new`.
    pub fn is_ambiguous(&self) -> bool {
        self.ambiguous
    }

    fn detect(index: usize, line: &str) -> Option<Self> {
        if line.split_whitespace().next() != Some(SERVER_KEYWORD) {
            return None;
        }
        let digits = WEIGHT.captures(line)?.get(1)?;
        let weight = digits.as_str().parse::<u32>().ok()?;

        let (tag, ambiguous) = match (NEW_TAG.is_match(line), OLD_TAG.is_match(line)) {
            (true, true) => {
                warn!(line = index, "server line tagged both new and old, treating as new");
                (Tag::New, true)
            }
            (true, false) => (Tag::New, false),
            (false, true) => (Tag::Old, false),
            (false, false) => return None,
        };

        Some(Self {
            index,
            tag,
            weight,
            weight_span: digits.range(),
            ambiguous,
        })
    }
}

/// Scan lines for weighted server lines.
///
/// Commented lines never match because `#server` is not the `server` keyword.
pub fn find_weighted_server_lines<S: AsRef<str>>(lines: &[S]) -> Vec<WeightedServerLine> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(i, l)| WeightedServerLine::detect(i, l.as_ref()))
        .collect()
}
