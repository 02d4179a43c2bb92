//! Character-level similarity
//!
//! Greedy longest-matching-block alignment: find the longest common run of
//! characters, recurse on what lies left and right of it, and sum the matched
//! lengths. The ratio is `2 * matched / (len(a) + len(b))`.
//!
//! Tie-break: among equally long runs the one starting earliest in the first
//! sequence wins, then the one starting earliest in the second. The pair is
//! always compared with the lexicographically smaller string first, which makes
//! the score exactly symmetric.

use std::collections::HashMap;

use super::normalizer::Normalizer;

/// A run of `size` characters equal in both sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    /// Start in the first sequence
    pub a: usize,
    /// Start in the second sequence
    pub b: usize,
    pub size: usize,
}

/// Similarity of two raw strings after normalization
pub fn score(normalizer: &Normalizer, a: &str, b: &str) -> f64 {
    ratio(&normalizer.normalize(a), &normalizer.normalize(b))
}

/// Similarity of two already normalized strings, in `[0, 1]`.
///
/// Two empty strings are identical and score `1.0`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let x: Vec<char> = first.chars().collect();
    let y: Vec<char> = second.chars().collect();

    let total = x.len() + y.len();
    if total == 0 {
        return 1.0;
    }

    let matched: usize = matching_blocks(&x, &y).iter().map(|m| m.size).sum();
    (2.0 * matched as f64 / total as f64).clamp(0.0, 1.0)
}

/// Matching blocks of `x` against `y`, ordered by position
pub fn matching_blocks(x: &[char], y: &[char]) -> Vec<MatchBlock> {
    // Positions of every character in `y`, ascending
    let mut index: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in y.iter().enumerate() {
        index.entry(*c).or_default().push(j);
    }

    let mut blocks = Vec::new();
    let mut pending = vec![(0, x.len(), 0, y.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let found = longest_match(x, &index, alo, ahi, blo, bhi);
        if found.size == 0 {
            continue;
        }
        if alo < found.a && blo < found.b {
            pending.push((alo, found.a, blo, found.b));
        }
        if found.a + found.size < ahi && found.b + found.size < bhi {
            pending.push((found.a + found.size, ahi, found.b + found.size, bhi));
        }
        blocks.push(found);
    }

    blocks.sort_by_key(|m| (m.a, m.b));
    blocks
}

/// Longest common run of `x[alo..ahi]` and `y[blo..bhi]`.
///
/// Dynamic programming over run lengths ending at each `j`, one row per `i`.
/// A strictly longer run replaces the best so far, so the earliest `i` wins a
/// tie, and within one `i` the earliest `j`.
fn longest_match(
    x: &[char],
    index: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> MatchBlock {
    let mut best = MatchBlock { a: alo, b: blo, size: 0 };
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for i in alo..ahi {
        let mut next_runs = HashMap::new();
        if let Some(positions) = index.get(&x[i]) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending_at.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, k);
                if k > best.size {
                    best = MatchBlock { a: i + 1 - k, b: j + 1 - k, size: k };
                }
            }
        }
        run_ending_at = next_runs;
    }

    best
}
