//! Levenshtein distance over bytes.

/// Edit distance between `a` and `b`: the fewest single-byte insertions,
/// deletions and substitutions turning one into the other.
///
/// Uses two rolling rows, so memory is `O(min(|a|, |b|))`.
pub fn edit_distance(a: &[u8], b: &[u8]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0; short.len() + 1];

    for (i, &x) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &y) in short.iter().enumerate() {
            let substitution = prev[j] + usize::from(x != y);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}

/// True if `edit_distance(a, b) <= max`.
///
/// Shared leading and trailing bytes are skipped, and only cells within
/// `max` of the diagonal are filled, so long keys cost `O(len * max)`.
/// Gives up as soon as every cell of a row exceeds `max`.
pub fn within_distance(a: &[u8], b: &[u8], max: usize) -> bool {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let (a, b) = (&a[prefix..], &b[prefix..]);
    let suffix = a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count();
    let (a, b) = (&a[..a.len() - suffix], &b[..b.len() - suffix]);

    if a.len().abs_diff(b.len()) > max {
        return false;
    }
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len() <= max;
    }

    // Every cell is capped at `max + 1`; cells off the band stay there.
    let cap = max + 1;
    let mut prev: Vec<usize> = (0..=short.len()).map(|j| j.min(cap)).collect();
    let mut curr = vec![cap; short.len() + 1];

    for (i, &x) in long.iter().enumerate() {
        let row = i + 1;
        let lo = row.saturating_sub(max).max(1);
        let hi = (row + max).min(short.len());

        curr[0] = row.min(cap);
        curr[lo - 1] = if lo == 1 { curr[0] } else { cap };
        let mut row_min = curr[lo - 1];

        for j in lo..=hi {
            let substitution = prev[j - 1] + usize::from(x != short[j - 1]);
            curr[j] = substitution.min(prev[j] + 1).min(curr[j - 1] + 1).min(cap);
            row_min = row_min.min(curr[j]);
        }
        if hi < short.len() {
            curr[hi + 1] = cap;
        }

        if row_min > max {
            return false;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()] <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance_basics() {
        assert_eq!(edit_distance(b"", b""), 0);
        assert_eq!(edit_distance(b"abc", b""), 3);
        assert_eq!(edit_distance(b"", b"abc"), 3);
        assert_eq!(edit_distance(b"cat", b"cat"), 0);
        assert_eq!(edit_distance(b"cat", b"car"), 1);
        assert_eq!(edit_distance(b"cat", b"cart"), 1);
        assert_eq!(edit_distance(b"cart", b"cat"), 1);
        assert_eq!(edit_distance(b"kitten", b"sitting"), 3);
        assert_eq!(edit_distance(b"flaw", b"lawn"), 2);
    }

    #[test]
    fn test_edit_distance_is_case_sensitive() {
        assert_eq!(edit_distance(b"Cat", b"cat"), 1);
    }

    #[test]
    fn test_within_distance_agrees() {
        let words: [&[u8]; 8] = [b"", b"a", b"cat", b"car", b"cart", b"scatter", b"kitten", b"sitting"];
        for a in words {
            for b in words {
                let d = edit_distance(a, b);
                for max in 0..5 {
                    assert_eq!(within_distance(a, b, max), d <= max, "{:?} {:?} {}", a, b, max);
                }
            }
        }
    }

    #[test]
    fn test_within_distance_banded_agrees() {
        let words: [&[u8]; 8] = [
            b"abcdefgh", b"abdcefgh", b"xbcdefgy", b"bcdefgh", b"abcdefghij", b"hgfedcba", b"aXcdeYgh", b"abcd",
        ];
        for a in words {
            for b in words {
                let d = edit_distance(a, b);
                for max in 0..6 {
                    assert_eq!(within_distance(a, b, max), d <= max, "{:?} {:?} {}", a, b, max);
                }
            }
        }
    }

    #[test]
    fn test_within_distance_long_keys() {
        let a = vec![b'p'; 50_000];

        let mut b = a.clone();
        b[25_000] = b'q';
        b.push(b'r');
        assert!(within_distance(&a, &b, 2));
        assert!(!within_distance(&a, &b, 1));

        // Edits at both ends are kept by the trimming
        let mut c = a.clone();
        c[0] = b'x';
        c[49_999] = b'y';
        assert!(within_distance(&a, &c, 2));
        assert!(!within_distance(&a, &c, 1));
    }
}
