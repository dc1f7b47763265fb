//! Text normalization for display and speech.
//!
//! Three concerns live here, in the order they run on a raw page:
//! boilerplate removal (publisher/legal/metadata sentences), TTS-oriented
//! cleanup (an ordered list of rewrite rules that avoid unnatural pauses and
//! mispronunciations), and sentence segmentation. The cleaned sentence is the
//! unit the playback engine tracks, so segmentation always runs cleanup per
//! sentence, never on the whole page, to keep boundaries stable.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use unicode_normalization::UnicodeNormalization;

/// Catalog of publisher/legal/metadata phrasings. A single incidental match
/// (a date, a stray "in print") is common in legitimate prose; the
/// co-occurrence threshold in `NormalizerConfig` decides how many of these
/// must fire before a sentence is dropped.
const BOILERPLATE_PATTERNS: &[&str] = &[
    r"(?i)copyright",
    r"(?i)(©|\(c\))\s*\d{4}",
    r"(?i)all rights",
    r"(?i)rights reserved",
    r"(?i)ISBN[\s:-]*[\d-]+",
    r"(?i)published by",
    r"(?i)no part of this (book|publication)",
    r"(?i)may (not )?be (used|reproduced|distributed)",
    r"(?i)without (the )?(written )?permission",
    r"(?i)graphic,?\s*electronic,?\s*or\s*mechanical",
    r"(?i)photocopying,?\s*recording",
    r"(?i)information storage",
    r"(?i)retrieval system",
    r"(?i)brief quotations embodied",
    r"(?i)critical articles and reviews",
    r"(?i)dynamic nature of the Internet",
    r"(?i)web addresses or links",
    r"(?i)may have changed since publication",
    r"(?i)may no longer be valid",
    r"(?i)views expressed in this work",
    r"(?i)solely those of the author",
    r"(?i)do not necessarily reflect",
    r"(?i)publisher hereby disclaims",
    r"(?i)does not dispense medical advice",
    r"(?i)prescribe the use of any technique",
    r"(?i)form of treatment",
    r"(?i)physical,?\s*emotional,?\s*or\s*medical",
    r"(?i)advice of a physician",
    r"(?i)intent of the author",
    r"(?i)information of a general nature",
    r"(?i)quest for emotional and spiritual",
    r"(?i)constitutional right",
    r"(?i)assume no responsibility",
    r"(?i)OceanofPDF\.com",
    r"(?i)ePub format",
    r"(?i)Mobipocket format",
    r"(?i)in print",
    r"(?i)This edition:",
    r"(?i)previously published",
];

static RE_SHORT_METADATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s:\-]+$").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_HEADING_WORD_NUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([A-Z][A-Z\s]{2,}?)\s+(\d+)\s*[:.]").unwrap());
static RE_LEADING_NUM_COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})\s*[:.]\s+").unwrap());
static RE_ROMAN_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([IVX]+)\s*[:.]\s+").unwrap());
static RE_PAGE_METADATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(Page|P\.|p\.)\s+\d+(\s+of\s+\d+)?").unwrap());
static RE_CAPS_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([A-Z]{3,})\b").unwrap());
static RE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://[^\s]+").unwrap());
static RE_EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\s]+@[^\s]+").unwrap());
static RE_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+[.,]\d+\b").unwrap());
static RE_ABBREV_PERIOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z]+)\.\s+([a-z])").unwrap());
static RE_ELLIPSIS_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3,}").unwrap());
static RE_BANG_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"!{2,}").unwrap());
static RE_QUESTION_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?{2,}").unwrap());
static RE_PAREN_METADATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([A-Z0-9\s]{1,10}\)\s*[.:]").unwrap());
static RE_BRACKET_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());
static RE_PUNCT_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.,!?;:])\s*([.,!?;:])").unwrap());
static RE_SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.,!?;:])").unwrap());

const SMALL_NUMBER_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen",
];

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    config: NormalizerConfig,
    boilerplate: Vec<Regex>,
    abbreviations: BTreeSet<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
struct NormalizerFile {
    normalization: NormalizerConfig,
}

/// Empirically tuned knobs. The defaults are not known to be optimal; they
/// are kept here (rather than hard-coded) so they can be calibrated against
/// a real corpus.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
struct NormalizerConfig {
    /// How many catalog patterns must co-occur before a sentence is dropped.
    min_pattern_matches: usize,
    /// Sentences shorter than this made of digits/spaces/colons/dashes are
    /// treated as page furniture.
    short_metadata_max_chars: usize,
    /// ALL-CAPS runs at or below this length are assumed to be acronyms and
    /// preserved verbatim.
    acronym_max_len: usize,
    extra_boilerplate_patterns: Vec<String>,
    /// Words whose trailing period must not be read as a sentence break.
    abbreviations: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_pattern_matches: 2,
            short_metadata_max_chars: 20,
            acronym_max_len: 5,
            extra_boilerplate_patterns: Vec::new(),
            abbreviations: default_abbreviations(),
        }
    }
}

impl TextNormalizer {
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<NormalizerFile>(&contents) {
                Ok(file) => {
                    info!(path = %path.display(), "Loaded text normalizer config");
                    Self::from_config(file.normalization)
                }
                Err(err) => {
                    warn!(path = %path.display(), "Invalid normalizer config TOML: {err}");
                    Self::default()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), "Falling back to default normalizer config: {err}");
                Self::default()
            }
        }
    }

    fn from_config(config: NormalizerConfig) -> Self {
        let mut boilerplate: Vec<Regex> = BOILERPLATE_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern).unwrap())
            .collect();
        for pattern in &config.extra_boilerplate_patterns {
            match Regex::new(pattern) {
                Ok(re) => boilerplate.push(re),
                Err(err) => warn!(pattern, "Skipping invalid boilerplate pattern: {err}"),
            }
        }
        let abbreviations = config
            .abbreviations
            .iter()
            .map(|word| word.to_lowercase())
            .collect();
        Self {
            config,
            boilerplate,
            abbreviations,
        }
    }

    /// Produce the cleaned sentence list for one page of raw extracted text.
    pub fn sentences_for_page(&self, raw: &str) -> Vec<String> {
        self.segment(&self.strip_boilerplate(raw))
    }

    /// A sentence is boilerplate when enough catalog patterns co-occur, or
    /// when it is short page furniture (digits, spaces, colons, dashes).
    pub fn is_boilerplate(&self, sentence: &str) -> bool {
        let matches = self
            .boilerplate
            .iter()
            .filter(|pattern| pattern.is_match(sentence))
            .count();
        if matches >= self.config.min_pattern_matches.max(1) {
            return true;
        }

        sentence.chars().count() < self.config.short_metadata_max_chars
            && !sentence.is_empty()
            && RE_SHORT_METADATA.is_match(sentence)
    }

    /// Drop boilerplate sentences from a page, rejoining the rest with
    /// single spaces.
    pub fn strip_boilerplate(&self, text: &str) -> String {
        split_on_terminals(text)
            .into_iter()
            .filter(|sentence| !self.is_boilerplate(sentence))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Ordered, deterministic rewrite pipeline preparing one sentence for
    /// synthesis. Running it twice yields the same output.
    pub fn clean_for_speech(&self, text: &str) -> String {
        let text: String = text.nfc().collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let mut cleaned = RE_WS.replace_all(trimmed, " ").to_string();

        // "REGRET 1:" / "CHAPTER 5." style headings read awkwardly; title-case
        // the words and spell small numbers out.
        cleaned = RE_HEADING_WORD_NUM
            .replace_all(&cleaned, |caps: &regex::Captures| {
                let title = title_case_words(caps[1].trim());
                format!("{} {}", title, spell_small_number(&caps[2], 15))
            })
            .to_string();

        cleaned = RE_LEADING_NUM_COLON
            .replace_all(&cleaned, |caps: &regex::Captures| {
                format!("number {} ", spell_small_number(&caps[1], 10))
            })
            .to_string();

        // Roman-numeral headings stay as-is minus the trailing colon/period.
        cleaned = RE_ROMAN_HEADING.replace_all(&cleaned, "$1 ").to_string();

        cleaned = RE_PAGE_METADATA.replace_all(&cleaned, "").to_string();

        let acronym_max_len = self.config.acronym_max_len;
        cleaned = RE_CAPS_RUN
            .replace_all(&cleaned, |caps: &regex::Captures| {
                let run = &caps[1];
                if run.len() <= acronym_max_len {
                    run.to_string()
                } else {
                    // The run is ASCII by construction.
                    format!("{}{}", &run[..1], run[1..].to_lowercase())
                }
            })
            .to_string();

        cleaned = RE_URL.replace_all(&cleaned, "").to_string();
        cleaned = RE_EMAIL.replace_all(&cleaned, "").to_string();

        // "3,14" is a decimal in most of the world; read the separator out.
        cleaned = RE_DECIMAL
            .replace_all(&cleaned, |caps: &regex::Captures| {
                caps[0].replace(',', " point ")
            })
            .to_string();

        cleaned = RE_ABBREV_PERIOD
            .replace_all(&cleaned, |caps: &regex::Captures| {
                if self.abbreviations.contains(&caps[1].to_lowercase()) {
                    format!("{} {}", &caps[1], &caps[2])
                } else {
                    caps[0].to_string()
                }
            })
            .to_string();

        cleaned = RE_ELLIPSIS_RUN.replace_all(&cleaned, "...").to_string();
        cleaned = RE_BANG_RUN.replace_all(&cleaned, "!").to_string();
        cleaned = RE_QUESTION_RUN.replace_all(&cleaned, "?").to_string();

        // Short uppercase/digit parentheticals right before punctuation are
        // metadata; longer or mixed-case parentheticals are narrative.
        cleaned = RE_PAREN_METADATA.replace_all(&cleaned, "").to_string();
        cleaned = RE_BRACKET_REF.replace_all(&cleaned, "").to_string();

        // Punctuation spacing. Duplicate-punctuation collapse runs before the
        // space removal so the pass reaches a fixpoint in one application;
        // period pairs are exempt to keep ellipses intact.
        cleaned = RE_PUNCT_PAIR
            .replace_all(&cleaned, |caps: &regex::Captures| {
                if &caps[1] == "." && &caps[2] == "." {
                    caps[0].to_string()
                } else {
                    format!("{} ", &caps[1])
                }
            })
            .to_string();
        cleaned = RE_SPACE_BEFORE_PUNCT.replace_all(&cleaned, "$1").to_string();

        RE_WS.replace_all(&cleaned, " ").trim().to_string()
    }

    /// Split a page into sentences, then clean each one individually so a
    /// boundary lost by one sentence's cleanup cannot absorb its neighbor.
    pub fn segment(&self, text: &str) -> Vec<String> {
        split_on_terminals(text)
            .into_iter()
            .map(|sentence| self.clean_for_speech(&sentence))
            .filter(|sentence| !sentence.is_empty())
            .collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::from_config(NormalizerConfig::default())
    }
}

/// Split on `.?!` followed by whitespace, keeping the terminal punctuation
/// with its sentence. Trailing text without a terminal still counts.
fn split_on_terminals(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if matches!(ch, '.' | '?' | '!')
            && chars.peek().map(|next| next.is_whitespace()).unwrap_or(true)
        {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

fn title_case_words(words: &str) -> String {
    words
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str().to_lowercase()),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn spell_small_number(digits: &str, limit: usize) -> String {
    match digits.parse::<usize>() {
        Ok(value) if (1..=limit.min(SMALL_NUMBER_WORDS.len())).contains(&value) => {
            SMALL_NUMBER_WORDS[value - 1].to_string()
        }
        _ => digits.to_string(),
    }
}

fn default_abbreviations() -> Vec<String> {
    [
        "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "vs", "etc", "e.g", "i.e", "a.m", "p.m",
        "am", "pm", "inc", "ltd", "corp", "dept", "govt", "est", "approx", "min", "max", "vol",
        "no", "pp", "ed", "eds", "cf", "ibid", "op", "cit", "et", "al", "ca", "st", "ave",
        "blvd", "rd", "ct", "ln", "pl", "pkwy", "apt", "bldg", "fl", "jan", "feb", "mar", "apr",
        "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "mon", "tue", "wed", "thu",
        "fri", "sat", "sun",
    ]
    .iter()
    .map(|word| word.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copyright_page_is_dropped_and_prose_kept() {
        let normalizer = TextNormalizer::default();
        assert!(normalizer.is_boilerplate("Copyright © 2021 Foo."));
        assert!(normalizer.is_boilerplate("All rights reserved."));
        assert!(!normalizer.is_boilerplate("The forest was quiet."));

        let page = "Copyright © 2021 Foo. All rights reserved. The forest was quiet.";
        assert_eq!(normalizer.strip_boilerplate(page), "The forest was quiet.");
    }

    #[test]
    fn single_incidental_match_survives() {
        let normalizer = TextNormalizer::default();
        // A date alone matches one pattern at most and must be kept.
        assert!(!normalizer.is_boilerplate("She was born in 1984 and loved winters."));
    }

    #[test]
    fn short_numeric_metadata_is_dropped() {
        let normalizer = TextNormalizer::default();
        assert!(normalizer.is_boilerplate("12: 34 - 5"));
        assert!(!normalizer.is_boilerplate("12 angry men stood up and argued loudly"));
    }

    #[test]
    fn heading_with_number_reads_naturally() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.clean_for_speech("REGRET 1:"), "Regret one");
        assert_eq!(
            normalizer.clean_for_speech("CHAPTER 12: The Storm"),
            "Chapter twelve The Storm"
        );
    }

    #[test]
    fn cleanup_rules_in_isolation() {
        let normalizer = TextNormalizer::default();
        let cases = [
            ("Hello   world\n\nagain", "Hello world again"),
            ("3:  the return", "number three the return"),
            ("II: The Sequel", "II The Sequel"),
            ("See Page 5 of 10 for details.", "See for details."),
            ("The WARNING label and the NASA probe", "The Warning label and the NASA probe"),
            ("Visit https://example.com/x now", "Visit now"),
            ("Mail me@example.com today", "Mail today"),
            ("It weighed 3,14 kilograms", "It weighed 3 point 14 kilograms"),
            ("On Dec. the rains came", "On Dec the rains came"),
            ("Wait......", "Wait..."),
            ("Really!!!", "Really!"),
            ("What????", "What?"),
            ("(ISBN 42). The story begins", "The story begins"),
            ("As shown [12] earlier", "As shown earlier"),
            ("A pause , then silence", "A pause, then silence"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalizer.clean_for_speech(input), expected, "input: {input}");
        }
    }

    #[test]
    fn long_parentheticals_are_narrative() {
        let normalizer = TextNormalizer::default();
        let text = "She paused (for a long moment) before speaking.";
        assert_eq!(normalizer.clean_for_speech(text), text);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let normalizer = TextNormalizer::default();
        let corpus = [
            "CHAPTER 3: The LIGHTHOUSE keeper waited... and waited!!",
            "Mr. Hale wrote to me@example.com about Page 9 of 12 , twice.",
            "It cost 1,50 at the st. market (IV). Nothing more.",
            "REGRET 1: I never learned to swim?? Really.",
        ];
        for text in corpus {
            let once = normalizer.clean_for_speech(text);
            let twice = normalizer.clean_for_speech(&once);
            assert_eq!(once, twice, "pipeline not idempotent for: {text}");
        }
    }

    #[test]
    fn segmentation_cleans_per_sentence() {
        let normalizer = TextNormalizer::default();
        let page = "The rain stopped. REGRET 1: I stayed inside! Was it worth it?";
        assert_eq!(
            normalizer.segment(page),
            vec![
                "The rain stopped.".to_string(),
                "Regret one I stayed inside!".to_string(),
                "Was it worth it?".to_string(),
            ]
        );
    }

    #[test]
    fn decimals_do_not_split_sentences() {
        let sentences = split_on_terminals("Pi is 3.14 roughly. Euler liked 2.71 too.");
        assert_eq!(
            sentences,
            vec![
                "Pi is 3.14 roughly.".to_string(),
                "Euler liked 2.71 too.".to_string()
            ]
        );
    }

    #[test]
    fn narrative_content_survives_segmentation() {
        let normalizer = TextNormalizer::default();
        let page = "Copyright © 2021 Foo. All rights reserved. The forest was quiet. Snow fell.";
        let rejoined = normalizer.sentences_for_page(page).join(" ");
        assert_eq!(rejoined, "The forest was quiet. Snow fell.");
    }
}
