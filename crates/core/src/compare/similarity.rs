//! Whole-text similarity and edit distance.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use regex::Regex;
use similar::{Algorithm, DiffOp, TextDiff};

/// Texts are cut to this many characters before computing edit distance.
pub const LEVENSHTEIN_CHAR_LIMIT: usize = 10_000;

/// Pairs whose combined length stays within this many characters are aligned
/// character by character. Longer pairs are aligned on words.
pub const CHAR_ALIGNMENT_LIMIT: usize = 10_000;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+|\S+").expect("valid token regex"));

/// Case-insensitive similarity ratio `2·M / T` in `[0, 1]`.
///
/// `M` is the number of characters in matching blocks and `T` the combined
/// length of both texts. Either text being empty yields `0.0`.
///
/// Short pairs use a minimal character diff. Longer pairs match whole words
/// and the whitespace between them, anchored on words that occur exactly once
/// in each text.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    text_similarity_with_deadline(a, b, None)
}

/// Same as [`text_similarity`], with a time bound for long pairs.
///
/// Anchor words are always matched. The deadline only limits aligning the
/// gaps between anchors: a gap reached after it passes keeps just its common
/// prefix and suffix.
pub fn text_similarity_with_deadline(a: &str, b: &str, deadline: Option<Duration>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let total = a.chars().count() + b.chars().count();

    let matches = if total <= CHAR_ALIGNMENT_LIMIT {
        char_matches(&a, &b)
    } else {
        word_matches(&a, &b, deadline.map(|d| Instant::now() + d))
    };

    (2 * matches) as f64 / total as f64
}

fn char_matches(a: &str, b: &str) -> usize {
    let diff = TextDiff::configure().algorithm(Algorithm::Myers).diff_chars(a, b);
    diff.ops()
        .iter()
        .map(|op| match *op {
            DiffOp::Equal { len, .. } => len,
            _ => 0,
        })
        .sum()
}

fn word_matches(a: &str, b: &str, deadline: Option<Instant>) -> usize {
    let old: Vec<&str> = TOKEN.find_iter(a).map(|m| m.as_str()).collect();
    let new: Vec<&str> = TOKEN.find_iter(b).map(|m| m.as_str()).collect();

    let mut matches = 0;
    let (mut i, mut j) = (0, 0);
    for (x, y) in anchors(&old, &new) {
        matches += gap_matches(&old[i..x], &new[j..y], deadline);
        matches += old[x].chars().count();
        i = x + 1;
        j = y + 1;
    }
    matches + gap_matches(&old[i..], &new[j..], deadline)
}

/// Longest run of tokens that occur exactly once on each side and appear in
/// the same order on both, as `(old, new)` index pairs.
fn anchors(old: &[&str], new: &[&str]) -> Vec<(usize, usize)> {
    // token -> (count in old, index in old, count in new, index in new)
    let mut seen: HashMap<&str, (usize, usize, usize, usize)> = HashMap::new();
    for (i, token) in old.iter().enumerate() {
        let entry = seen.entry(*token).or_default();
        entry.0 += 1;
        entry.1 = i;
    }
    for (j, token) in new.iter().enumerate() {
        if let Some(entry) = seen.get_mut(token) {
            entry.2 += 1;
            entry.3 = j;
        }
    }

    let mut pairs: Vec<(usize, usize)> =
        seen.into_values().filter(|e| e.0 == 1 && e.2 == 1).map(|e| (e.1, e.3)).collect();
    pairs.sort_unstable();

    // Patience sort over the new-side indices: tails[k] ends the best run of length k + 1.
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; pairs.len()];
    for (p, &(_, y)) in pairs.iter().enumerate() {
        let k = tails.partition_point(|&t| pairs[t].1 < y);
        if k > 0 {
            prev[p] = Some(tails[k - 1]);
        }
        if k == tails.len() {
            tails.push(p);
        } else {
            tails[k] = p;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(p) = cursor {
        run.push(pairs[p]);
        cursor = prev[p];
    }
    run.reverse();
    run
}

fn gap_matches(old: &[&str], new: &[&str], deadline: Option<Instant>) -> usize {
    if old.is_empty() || new.is_empty() {
        return 0;
    }
    similar::capture_diff_slices_deadline(Algorithm::Myers, old, new, deadline)
        .iter()
        .map(|op| match *op {
            DiffOp::Equal { old_index, len, .. } => {
                old[old_index..old_index + len].iter().map(|t| t.chars().count()).sum::<usize>()
            }
            _ => 0,
        })
        .sum()
}

/// Character-level Levenshtein distance over the first
/// [`LEVENSHTEIN_CHAR_LIMIT`] characters of each text.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().take(LEVENSHTEIN_CHAR_LIMIT).collect();
    let b: Vec<char> = b.chars().take(LEVENSHTEIN_CHAR_LIMIT).collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rows are enough: row i only reads row i - 1.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
