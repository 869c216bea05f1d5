//! Text normalization and similarity ratios used for duplicate detection.

use std::collections::HashMap;

/// Normalize whitespace in a string (trim and collapse multiple spaces).
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase, strip punctuation and collapse whitespace.
///
/// Word characters (alphanumerics and `_`) and whitespace survive; everything
/// else is removed before the whitespace is collapsed.
pub fn normalize_text(s: &str) -> String {
    let stripped: String = s
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    normalize_whitespace(&stripped)
}

/// Similarity ratio (0.0 to 1.0) based on matching blocks.
///
/// Computes `2 * M / T` where `T` is the total number of characters in both
/// strings and `M` the number of characters covered by the recursively found
/// longest common blocks. Two empty strings are identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 1.0;
    }

    let matches = matching_characters(&a_chars, &b_chars);
    2.0 * matches as f64 / total as f64
}

/// Count characters covered by matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b_positions.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &b_positions, (a_lo, a_hi), (b_lo, b_hi));
        if size == 0 {
            continue;
        }

        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }

    matched
}

/// Find the longest block `a[i..i+size] == b[j..j+size]` inside the given ranges.
///
/// Ties resolve to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b_positions: &HashMap<char, Vec<usize>>,
    (a_lo, a_hi): (usize, usize),
    (b_lo, b_hi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);

    // Length of the match ending at (previous i, j), keyed by j.
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for i in a_lo..a_hi {
        let mut next_runs = HashMap::new();

        if let Some(positions) = b_positions.get(&a[i]) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }

                let previous = j
                    .checked_sub(1)
                    .and_then(|p| run_lengths.get(&p))
                    .copied()
                    .unwrap_or(0);
                let size = previous + 1;
                next_runs.insert(j, size);

                if size > best_size {
                    best_i = i + 1 - size;
                    best_j = j + 1 - size;
                    best_size = size;
                }
            }
        }

        run_lengths = next_runs;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_normalization() {
        assert_eq!(normalize_whitespace("  hello   world  "), "hello world");
        assert_eq!(normalize_whitespace("\tone\ntwo "), "one two");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_normalize_text_strips_punctuation() {
        assert_eq!(normalize_text("Grande, enorme!"), "grande enorme");
        assert_eq!(normalize_text("  Olá  (mundo)  "), "olá mundo");
        assert_eq!(normalize_text("snake_case"), "snake_case");
    }

    #[test]
    fn test_identical_strings() {
        assert_eq!(similarity_ratio("algorithm", "algorithm"), 1.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
    }

    #[test]
    fn test_disjoint_strings() {
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // "bcd" is shared: 2 * 3 / 8
        assert_eq!(similarity_ratio("abcd", "bcde"), 0.75);
        // "itt" + "n": 2 * 4 / 13
        let ratio = similarity_ratio("kitten", "sitting");
        assert!((ratio - 8.0 / 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_is_symmetric_for_simple_words() {
        let forward = similarity_ratio("house", "mouse");
        let backward = similarity_ratio("mouse", "house");
        assert!((forward - 0.8).abs() < 1e-9);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_counts_unicode_scalars() {
        // "ção" shares "ão" with "mão": 2 * 2 / 6
        let ratio = similarity_ratio("ção", "mão");
        assert!((ratio - 4.0 / 6.0).abs() < 1e-9);
    }
}
