//! Word-level diff segmentation with semantic cleanup.
//!
//! The raw word diff is regrouped into alternating runs of shared text and
//! changed text. A shared run that is no longer than the changes on both of
//! its sides gets folded into them. This drops single-space or single-word
//! "matches" sitting between two rewritten passages, so each rewritten passage
//! becomes one delete/insert pair instead of a long alternation of fragments.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};

use crate::text::truncate_chars;

/// At most this many segments are kept, in document order.
pub const MAX_DIFF_SEGMENTS: usize = 100;

/// Segment text is cut to this many characters per side.
pub const MAX_SEGMENT_CHARS: usize = 500;

/// Which side(s) of the page pair a segment's text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Text present in both pages.
    Equal,
    /// Text present only in page A.
    Insert,
    /// Text present only in page B.
    Delete,
}

impl std::fmt::Display for DiffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DiffKind::Equal => "equal",
            DiffKind::Insert => "insert",
            DiffKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One run of the diff between page A and page B.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    #[serde(rename = "type")]
    pub kind: DiffKind,
    /// Text on the A side (empty for `delete`), at most [`MAX_SEGMENT_CHARS`].
    pub text_a: String,
    /// Text on the B side (empty for `insert`), at most [`MAX_SEGMENT_CHARS`].
    pub text_b: String,
    /// Characters covered by all preceding segments.
    pub position: usize,
}

#[derive(Debug)]
enum Block {
    Equal(String),
    Change { only_b: String, only_a: String },
}

/// Diff `a` against `b` and return the first [`MAX_DIFF_SEGMENTS`] segments.
pub fn diff_segments(a: &str, b: &str, deadline: Option<Duration>) -> Vec<DiffSegment> {
    let mut config = TextDiff::configure();
    config.algorithm(Algorithm::Myers);
    if let Some(deadline) = deadline {
        config.timeout(deadline);
    }
    // B is the "old" side so that insertions are exactly the A-only text.
    let diff = config.diff_words(b, a);

    let mut blocks = Vec::new();
    for change in diff.iter_all_changes() {
        push_change(&mut blocks, change.tag(), change.value());
    }

    to_segments(&cleanup_semantic(blocks))
}

fn push_change(blocks: &mut Vec<Block>, tag: ChangeTag, value: &str) {
    match (tag, blocks.last_mut()) {
        (ChangeTag::Equal, Some(Block::Equal(text))) => text.push_str(value),
        (ChangeTag::Equal, _) => blocks.push(Block::Equal(value.to_string())),
        (ChangeTag::Delete, Some(Block::Change { only_b, .. })) => only_b.push_str(value),
        (ChangeTag::Insert, Some(Block::Change { only_a, .. })) => only_a.push_str(value),
        (ChangeTag::Delete, _) => blocks.push(Block::Change { only_b: value.to_string(), only_a: String::new() }),
        (ChangeTag::Insert, _) => blocks.push(Block::Change { only_b: String::new(), only_a: value.to_string() }),
    }
}

/// Fold short equalities into the changes surrounding them.
///
/// Blocks alternate between `Equal` and `Change`, so an interior equality
/// always has a change on each side. Folding appends onto the left change, and
/// the grown change is checked again against the equality before it.
fn cleanup_semantic(blocks: Vec<Block>) -> Vec<Block> {
    let mut out: Vec<Block> = Vec::with_capacity(blocks.len());

    for block in blocks {
        let (mut only_b, mut only_a) = match block {
            Block::Change { only_b, only_a } => (only_b, only_a),
            equal => {
                out.push(equal);
                continue;
            }
        };

        while let [.., Block::Change { only_b: b1, only_a: a1 }, Block::Equal(eq)] = out.as_mut_slice() {
            let eq_len = eq.chars().count();
            if eq_len > longest_side(b1, a1) || eq_len > longest_side(&only_b, &only_a) {
                break;
            }

            b1.push_str(eq.as_str());
            b1.push_str(&only_b);
            a1.push_str(eq.as_str());
            a1.push_str(&only_a);
            only_b = std::mem::take(b1);
            only_a = std::mem::take(a1);
            out.truncate(out.len() - 2);
        }

        out.push(Block::Change { only_b, only_a });
    }

    out
}

fn longest_side(only_b: &str, only_a: &str) -> usize {
    only_b.chars().count().max(only_a.chars().count())
}

fn to_segments(blocks: &[Block]) -> Vec<DiffSegment> {
    let mut segments = Vec::new();
    let mut position = 0usize;

    let mut emit = |kind: DiffKind, text: &str, segments: &mut Vec<DiffSegment>| {
        let truncated = truncate_chars(text, MAX_SEGMENT_CHARS).to_string();
        let (text_a, text_b) = match kind {
            DiffKind::Equal => (truncated.clone(), truncated),
            DiffKind::Insert => (truncated, String::new()),
            DiffKind::Delete => (String::new(), truncated),
        };
        segments.push(DiffSegment { kind, text_a, text_b, position });
        position += text.chars().count();
    };

    for block in blocks {
        match block {
            Block::Equal(text) => emit(DiffKind::Equal, text, &mut segments),
            Block::Change { only_b, only_a } => {
                if !only_b.is_empty() {
                    emit(DiffKind::Delete, only_b, &mut segments);
                }
                if !only_a.is_empty() {
                    emit(DiffKind::Insert, only_a, &mut segments);
                }
            }
        }
    }

    segments.truncate(MAX_DIFF_SEGMENTS);
    segments
}
