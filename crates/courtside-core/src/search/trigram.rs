//! Trigram similarity compatible with the `pg_trgm` extension.

use std::collections::HashSet;

/// Trigram set of `text` as `pg_trgm` builds it: lower-cased, split into
/// alphanumeric words, each word padded with two leading and one trailing
/// blank.
fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let mut set = HashSet::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars().flat_map(char::to_lowercase))
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }
    set
}

/// Shared trigrams over the union of both sets, in `[0, 1]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let common = left.intersection(&right).count();
    let union = left.len() + right.len() - common;
    common as f64 / union as f64
}
