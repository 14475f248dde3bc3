//! Levenshtein distance on characters.

/// Number of single-character insertions, deletions and substitutions turning `a` into `b`.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Edit distance divided by the longer string's length, in [0, 1].
///
/// Returns `None` when both strings are empty.
pub fn normalized_edit_distance(a: &str, b: &str) -> Option<f64> {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return None;
    }
    Some(levenshtein(a, b) as f64 / longest as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_known_pairs() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("café", "cafe"), 1);
    }

    #[test]
    fn test_normalized_bounds() {
        assert_eq!(normalized_edit_distance("", ""), None);
        assert_eq!(normalized_edit_distance("abc", ""), Some(1.0));
        assert_eq!(normalized_edit_distance("abcd", "abcd"), Some(0.0));
        assert_eq!(normalized_edit_distance("abcd", "abce"), Some(0.25));
    }
}
