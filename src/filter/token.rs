use std::fmt::Display;
use std::sync::LazyLock;

use regex::Regex;

/// The lexical category of one fragment of a scan filter string
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenCategory {
    /// A scan mass range, `100.00-2000.00`
    Range,
    /// Anything not otherwise recognized, e.g. analyzer or ionization keywords
    #[default]
    Generic,
    /// `p` or `c`
    DataFormat,
    /// `+` or `-`
    Polarity,
    /// `ms`, `ms2`, `ms3`, ...
    MsOrder,
    /// A precursor mass, optionally with its activation, `524.2648@hcd28.00`
    ParentMass,
    /// `d`
    DataDependent,
}

impl Display for TokenCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

static MS_ORDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ms([1-9][0-9]?)?$").unwrap());

static PARENT_MASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9]+(?:\.[0-9]*)?(?:@[a-z]+[0-9]+(?:\.[0-9]*)?)*$").unwrap()
});

static MASS_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[?\s*[0-9]+(?:\.[0-9]*)?\s*-\s*[0-9]+(?:\.[0-9]*)?\s*\]?$").unwrap()
});

/// Assign a [`TokenCategory`] to a single filter fragment.
///
/// Rules are tried in a fixed order and the first match wins, since `-` is both a
/// polarity symbol and the range separator. Anything unrecognized, including the
/// empty string, is [`TokenCategory::Generic`].
pub fn classify(token: &str) -> TokenCategory {
    let token = token.trim();
    match token {
        "+" | "-" => return TokenCategory::Polarity,
        "p" | "c" | "P" | "C" => return TokenCategory::DataFormat,
        "d" | "D" => return TokenCategory::DataDependent,
        "" => return TokenCategory::Generic,
        _ => {}
    }
    if MS_ORDER.is_match(token) {
        TokenCategory::MsOrder
    } else if MASS_RANGE.is_match(token) {
        TokenCategory::Range
    } else if PARENT_MASS.is_match(token) {
        TokenCategory::ParentMass
    } else {
        TokenCategory::Generic
    }
}

/// A classified fragment of a scan filter string
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanFilterToken {
    pub text: String,
    pub category: TokenCategory,
}

impl ScanFilterToken {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let category = classify(&text);
        Self { text, category }
    }
}

impl Display for ScanFilterToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.category, self.text)
    }
}

/// Split a filter string into classified tokens.
///
/// Fragments are delimited by whitespace, and each comma separated entry inside a
/// `[...]` group becomes its own fragment with the brackets removed, so
/// `[100.00-200.00, 300.00-400.00]` yields two [`TokenCategory::Range`] tokens.
pub fn tokenize(filter: &str) -> Vec<ScanFilterToken> {
    let mut tokens = Vec::new();
    let mut rest = filter;
    while let Some(open) = rest.find('[') {
        push_words(&rest[..open], &mut tokens);
        let after = &rest[open + 1..];
        let close = after.find(']').unwrap_or(after.len());
        for part in after[..close].split(',') {
            let part = part.trim();
            if !part.is_empty() {
                tokens.push(ScanFilterToken::new(part));
            }
        }
        rest = after.get(close + 1..).unwrap_or_default();
    }
    push_words(rest, &mut tokens);
    tokens
}

fn push_words(text: &str, tokens: &mut Vec<ScanFilterToken>) {
    tokens.extend(text.split_whitespace().map(ScanFilterToken::new));
}
