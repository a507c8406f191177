//! Lexical front-end: tokenization and part-of-speech tagging.
//!
//! Tags are produced for interface compatibility with downstream consumers;
//! the current grammar does not read them. The tagger lexicon is parsed once
//! per process behind a `OnceLock`; if that parse ever fails the front-end
//! degrades to whitespace tokenization with identity (noun) tagging and the
//! failure is never surfaced to callers.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::warn;

/// Coarse part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Preposition,
    Conjunction,
    Determiner,
    Number,
}

impl FromStr for Tag {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "noun" => Ok(Tag::Noun),
            "verb" => Ok(Tag::Verb),
            "adjective" => Ok(Tag::Adjective),
            "adverb" => Ok(Tag::Adverb),
            "preposition" => Ok(Tag::Preposition),
            "conjunction" => Ok(Tag::Conjunction),
            "determiner" => Ok(Tag::Determiner),
            "number" => Ok(Tag::Number),
            other => Err(LexiconError::UnknownTag(other.to_string())),
        }
    }
}

/// Lexicon acquisition error. Recovered locally via the fallback path.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("malformed lexicon line {line}")]
    MalformedLine { line: usize },
    #[error("unknown tag '{0}' in lexicon")]
    UnknownTag(String),
}

/// Embedded tagger lexicon: one `word<TAB>tag` entry per line.
const TAGGER_LEXICON: &str = "\
the\tdeterminer
a\tdeterminer
an\tdeterminer
by\tpreposition
in\tpreposition
of\tpreposition
per\tpreposition
for\tpreposition
from\tpreposition
to\tpreposition
between\tpreposition
during\tpreposition
and\tconjunction
or\tconjunction
show\tverb
give\tverb
list\tverb
get\tverb
compare\tverb
where\tadverb
total\tadjective
top\tadjective
best\tadjective
distinct\tadjective
unique\tadjective
average\tadjective
maximum\tadjective
minimum\tadjective
monthly\tadjective
quarterly\tadjective
yearly\tadjective
daily\tadjective
each\tadjective
first\tadjective
second\tadjective
third\tadjective
fourth\tadjective
sales\tnoun
revenue\tnoun
sum\tnoun
avg\tnoun
count\tnoun
number\tnoun
max\tnoun
min\tnoun
order\tnoun
orders\tnoun
volume\tnoun
customer\tnoun
customers\tnoun
product\tnoun
products\tnoun
category\tnoun
categories\tnoun
day\tnoun
days\tnoun
month\tnoun
months\tnoun
quarter\tnoun
quarters\tnoun
year\tnoun
years\tnoun
qtr\tnoun
date\tnoun
january\tnoun
jan\tnoun
february\tnoun
feb\tnoun
march\tnoun
mar\tnoun
april\tnoun
apr\tnoun
may\tnoun
june\tnoun
jun\tnoun
july\tnoun
jul\tnoun
august\tnoun
aug\tnoun
september\tnoun
sep\tnoun
sept\tnoun
october\tnoun
oct\tnoun
november\tnoun
nov\tnoun
december\tnoun
dec\tnoun
";

/// The tagging resource: a word-to-tag table.
#[derive(Debug)]
pub struct Lexicon {
    entries: HashMap<String, Tag>,
}

impl Lexicon {
    fn from_embedded() -> Result<Self, LexiconError> {
        Self::parse(TAGGER_LEXICON)
    }

    fn parse(source: &str) -> Result<Self, LexiconError> {
        let mut entries = HashMap::new();
        for (i, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (word, tag) = line
                .split_once('\t')
                .ok_or(LexiconError::MalformedLine { line: i + 1 })?;
            entries.insert(word.to_string(), tag.parse()?);
        }
        Ok(Self { entries })
    }

    /// Tag a single lowercase token. Unknown words default to noun,
    /// all-digit words to number.
    pub fn tag(&self, token: &str) -> Tag {
        if let Some(tag) = self.entries.get(token) {
            *tag
        } else if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
            Tag::Number
        } else {
            Tag::Noun
        }
    }
}

// Init-once, read-many. Concurrent first callers race only on who runs the
// parse; none observes partial state. `None` records a failed acquisition.
static LEXICON: OnceLock<Option<Lexicon>> = OnceLock::new();

fn lexicon() -> Option<&'static Lexicon> {
    LEXICON
        .get_or_init(|| match Lexicon::from_embedded() {
            Ok(lexicon) => Some(lexicon),
            Err(err) => {
                warn!(%err, "tagger lexicon unavailable, using whitespace fallback");
                None
            }
        })
        .as_ref()
}

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9]+(?:['.-][a-z0-9]+)*").expect("valid word pattern"));

/// Split lowercased text into word tokens, keeping date-like tokens
/// ("2025-10-20") whole.
pub fn word_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Tokenize and tag a question. Never fails: if the tagging resource is
/// unavailable this degrades to [`fallback_tokenize`].
pub fn tokenize_and_tag(text: &str) -> (Vec<String>, Vec<(String, Tag)>) {
    match lexicon() {
        Some(lexicon) => {
            let tokens = word_tokens(text);
            let tagged = tokens
                .iter()
                .map(|t| (t.clone(), lexicon.tag(t)))
                .collect();
            (tokens, tagged)
        }
        None => fallback_tokenize(text),
    }
}

/// Degraded path: naive whitespace splitting with identity (noun) tagging.
pub fn fallback_tokenize(text: &str) -> (Vec<String>, Vec<(String, Tag)>) {
    let tokens: Vec<String> = text
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect();
    let tagged = tokens.iter().map(|t| (t.clone(), Tag::Noun)).collect();
    (tokens, tagged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_tokens_lowercase_and_split() {
        assert_eq!(
            word_tokens("Total Sales by Month in 2023"),
            vec!["total", "sales", "by", "month", "in", "2023"]
        );
    }

    #[test]
    fn test_word_tokens_keep_dates_whole() {
        assert_eq!(
            word_tokens("where date between 2025-10-20 and 2025-10-25"),
            vec!["where", "date", "between", "2025-10-20", "and", "2025-10-25"]
        );
    }

    #[test]
    fn test_tagging() {
        let (_, tagged) = tokenize_and_tag("total sales in 2023");
        assert_eq!(
            tagged,
            vec![
                ("total".to_string(), Tag::Adjective),
                ("sales".to_string(), Tag::Noun),
                ("in".to_string(), Tag::Preposition),
                ("2023".to_string(), Tag::Number),
            ]
        );
    }

    #[test]
    fn test_unknown_word_defaults_to_noun() {
        let lexicon = Lexicon::from_embedded().unwrap();
        assert_eq!(lexicon.tag("espresso"), Tag::Noun);
        assert_eq!(lexicon.tag("42"), Tag::Number);
    }

    #[test]
    fn test_fallback_matches_primary_for_plain_questions() {
        // Tags are not load-bearing: for whitespace-separable questions the
        // fallback must produce the same token set as the word tokenizer.
        let q = "total sales by month in 2023";
        let (primary, _) = tokenize_and_tag(q);
        let (fallback, tagged) = fallback_tokenize(q);
        assert_eq!(primary, fallback);
        assert!(tagged.iter().all(|(_, tag)| *tag == Tag::Noun));
    }

    #[test]
    fn test_malformed_lexicon_is_an_error() {
        assert!(Lexicon::parse("sales noun").is_err());
        assert!(Lexicon::parse("sales\tnomen").is_err());
    }
}
