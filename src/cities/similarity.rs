//! Normalized string similarity on a 0-100 scale.

/// Indel similarity ratio: `100 * 2 * LCS / (len(a) + len(b))`.
///
/// Two empty strings are identical and score 100.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    100.0 * (2 * longest_common_subsequence(&a, &b)) as f64 / total as f64
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    // Single-row dynamic programming over the shorter string.
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut row = vec![0usize; inner.len() + 1];

    for &x in outer {
        let mut diagonal = 0;
        for (j, &y) in inner.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if x == y {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }

    row[inner.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(ratio("TK", "TK"), 100.0);
        assert_eq!(ratio("", ""), 100.0);
    }

    #[test]
    fn test_disjoint_strings() {
        assert_eq!(ratio("ABC", "XYZ"), 0.0);
        assert_eq!(ratio("ABC", ""), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // LCS("LNTN", "LNT") = 3 -> 6 / 7
        assert!((ratio("LNTN", "LNT") - 600.0 / 7.0).abs() < 1e-9);
        // LCS("PRS", "PRK") = 2 -> 4 / 6
        assert!((ratio("PRS", "PRK") - 400.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric() {
        for (a, b) in [("KLKT", "KLKTA"), ("SN", "NS"), ("MMB", "MB")] {
            assert_eq!(ratio(a, b), ratio(b, a));
        }
    }

    #[test]
    fn test_lcs_not_substring() {
        // "ACE" is a subsequence of "ABCDE"
        assert!((ratio("ABCDE", "ACE") - 75.0).abs() < 1e-9);
    }
}
