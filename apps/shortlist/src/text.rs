//! Text Normalizer: the shared lowercase/strip/collapse pass every scorer runs first.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Anything outside `[a-z0-9&+-]` and whitespace becomes a space.
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9&+\-\s]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
/// Maximal runs of ASCII word characters; anything else, accented letters
/// included, separates words.
static WORD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9_]+").unwrap());

/// Lowercases, replaces characters outside the whitelist with spaces, collapses
/// whitespace runs and trims.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = DISALLOWED.replace_all(&lower, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Unique whitespace-delimited tokens of the normalized text.
pub fn token_set(text: &str) -> HashSet<String> {
    normalize(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unique alphabetic words of length ≥ 3, in first-occurrence order.
///
/// The input is lowercased first. Word boundaries are ASCII-only, so accented
/// letters split words.
pub fn alpha_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut seen = HashSet::new();
    WORD_RUN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| t.len() >= 3 && t.bytes().all(|b| b.is_ascii_lowercase()))
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

/// Rounds the exact binary value of `value` to `places` decimals, ties away
/// from zero.
///
/// Scaling first (`(v * 100).round() / 100`) rounds the already-rounded
/// product instead, which moves e.g. 7/40 from 0.17 to 0.18.
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // Far more digits than an f64 can carry, so the digit after `places`
    // is the true one and a trailing 5 means an exact tie.
    let exact = format!("{:.*}", places + EXTRA_DIGITS, value.abs());
    let cut = exact.len() - EXTRA_DIGITS;
    let (kept, rest) = exact.split_at(cut);

    let mut rounded: f64 = kept.trim_end_matches('.').parse().unwrap_or(0.0);
    if rest.as_bytes().first().is_some_and(|d| *d >= b'5') {
        rounded += 10f64.powi(-(places as i32));
        rounded = format!("{rounded:.places$}").parse().unwrap_or(rounded);
    }
    rounded.copysign(value)
}

const EXTRA_DIGITS: usize = 30;
