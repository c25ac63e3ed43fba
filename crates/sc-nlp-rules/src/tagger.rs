//! Part-of-speech tagging seam and the built-in lexicon tagger.
//!
//! The classifier only needs "does this message contain a noun?" and the
//! extractor needs numeric tokens plus noun chunks. Anything implementing
//! [`Tagger`] can supply those; [`LexiconTagger`] is a small English tagger
//! built from fixed word lists.

use std::sync::LazyLock;

use regex::Regex;

use crate::units::is_unit_token;

// Numbers, words (with inner apostrophes), or single non-space symbols.
// Digit/letter boundaries split, so "2kg" yields "2" and "kg".
static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]+(?:\.[0-9]+)?|\p{L}[\p{L}\p{M}]*(?:['’][\p{L}\p{M}]+)*|[^\s\p{L}\p{M}0-9]")
        .unwrap()
});

/// Coarse word class assigned by a tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Digits or a spelled-out number.
    Number,
    /// Unit surface form ("kg", "litre", "pack").
    Unit,
    /// Content word that can name a product.
    Noun,
    Verb,
    /// Pronouns, determiners, prepositions, conjunctions, auxiliaries.
    Function,
    Punct,
}

/// A token with its byte span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn like_num(&self) -> bool {
        self.kind == TokenKind::Number
    }

    pub fn is_noun(&self) -> bool {
        self.kind == TokenKind::Noun
    }

    /// Numeric value for number tokens.
    pub fn number_value(&self) -> Option<f64> {
        if !self.like_num() {
            return None;
        }
        self.text
            .parse::<f64>()
            .ok()
            .or_else(|| spelled_number(&self.text.to_lowercase()))
    }
}

/// A noun phrase: one or more adjacent noun tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Source slice, original casing preserved.
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Linguistic tagger used by classification and extraction.
pub trait Tagger: Send + Sync {
    /// Tokenize and tag `text`, left to right.
    fn tag(&self, text: &str) -> Vec<Token>;

    /// Noun chunks in left-to-right order.
    fn noun_chunks(&self, text: &str) -> Vec<Chunk> {
        chunk_nouns(text, &self.tag(text))
    }

    /// Name of this tagger (for logging and health output).
    fn name(&self) -> &str;
}

/// Group maximal runs of adjacent noun tokens into chunks.
pub fn chunk_nouns(text: &str, tokens: &[Token]) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut span: Option<(usize, usize)> = None;

    for token in tokens {
        if token.is_noun() {
            span = Some(match span {
                Some((start, _)) => (start, token.end),
                None => (token.start, token.end),
            });
        } else if let Some((start, end)) = span.take() {
            chunks.push(slice_chunk(text, start, end));
        }
    }
    if let Some((start, end)) = span {
        chunks.push(slice_chunk(text, start, end));
    }
    chunks
}

fn slice_chunk(text: &str, start: usize, end: usize) -> Chunk {
    Chunk {
        text: text[start..end].to_string(),
        start,
        end,
    }
}

const FUNCTION_WORDS: &[&str] = &[
    "i", "i'm", "i'd", "i'll", "me", "my", "mine", "we", "us", "our", "you", "your", "it",
    "it's", "its", "he", "she", "they", "them", "their", "this", "that", "these", "those", "a",
    "an", "the", "some", "any", "all", "each", "every", "and", "or", "but", "nor", "of", "for",
    "to", "in", "on", "at", "with", "without", "from", "by", "into", "onto", "about", "up",
    "out", "off", "over", "is", "am", "are", "was", "were", "be", "been", "being", "do", "does",
    "did", "can", "could", "would", "should", "will", "shall", "may", "might", "must", "have",
    "has", "had", "what", "what's", "where", "where's", "when", "how", "which", "who", "why",
    "there", "here", "not", "no", "yes", "please", "pls", "also", "too", "just", "only", "more",
    "less", "much", "many", "very", "so", "then", "now", "today", "tomorrow", "tonight", "hi",
    "hello", "hey", "thanks", "thank", "good", "morning", "evening", "ok", "okay", "let",
    "let's", "like", "else", "again", "as", "if",
];

const VERBS: &[&str] = &[
    "need", "needs", "want", "wants", "buy", "get", "add", "order", "ordered", "show", "find",
    "search", "remove", "delete", "cancel", "track", "pay", "checkout", "complete", "finish",
    "confirm", "help", "give", "send", "bring", "put", "take", "looking", "look", "see", "know",
    "tell", "make", "deliver", "view", "check", "place", "keep", "use", "go", "come", "got",
    "getting", "ordering", "buying", "adding", "list",
];

const SPELLED_NUMBERS: &[(&str, f64)] = &[
    ("half", 0.5),
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("eleven", 11.0),
    ("twelve", 12.0),
];

fn spelled_number(lowered: &str) -> Option<f64> {
    SPELLED_NUMBERS
        .iter()
        .find(|(word, _)| *word == lowered)
        .map(|(_, value)| *value)
}

/// English tagger driven by fixed lexicons.
///
/// Words that are not numbers, units, function words, verbs or punctuation
/// are tagged as nouns, which is what product names look like in practice.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconTagger;

impl LexiconTagger {
    pub fn new() -> Self {
        Self
    }

    fn classify(word: &str) -> TokenKind {
        let first = word.chars().next().unwrap_or(' ');
        if first.is_ascii_digit() {
            return TokenKind::Number;
        }
        if !first.is_alphabetic() {
            return TokenKind::Punct;
        }

        let lowered = word.to_lowercase().replace('’', "'");
        if spelled_number(&lowered).is_some() {
            TokenKind::Number
        } else if is_unit_token(&lowered) {
            TokenKind::Unit
        } else if FUNCTION_WORDS.contains(&lowered.as_str()) {
            TokenKind::Function
        } else if VERBS.contains(&lowered.as_str()) {
            TokenKind::Verb
        } else {
            TokenKind::Noun
        }
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, text: &str) -> Vec<Token> {
        RE_TOKEN
            .find_iter(text)
            .map(|m| Token {
                text: m.as_str().to_string(),
                kind: Self::classify(m.as_str()),
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
