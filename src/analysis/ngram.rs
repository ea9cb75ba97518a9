//! Word n-gram extraction.

/// Extract word n-grams from normalized text for every size in the
/// inclusive range `min_n..=max_n`.
///
/// The input is expected to be output of
/// [`normalize`](crate::analysis::normalize), so tokens are separated by
/// single spaces. Multi-word grams are joined with a single space. A text
/// with fewer than `n` words produces no grams of size `n`.
///
/// # Examples
///
/// ```
/// use spamsift::analysis::ngrams;
///
/// let grams = ngrams("win cash now", 1, 2);
/// assert_eq!(
///     grams,
///     vec!["win", "cash", "now", "win cash", "cash now"]
/// );
/// ```
pub fn ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut grams = Vec::new();

    for n in min_n..=max_n {
        if n == 0 || words.len() < n {
            continue;
        }
        for window in words.windows(n) {
            grams.push(window.join(" "));
        }
    }

    grams
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unigrams_only() {
        assert_eq!(ngrams("a b c", 1, 1), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unigrams_and_bigrams() {
        assert_eq!(
            ngrams("free cash offer", 1, 2),
            vec!["free", "cash", "offer", "free cash", "cash offer"]
        );
    }

    #[test]
    fn test_short_text_skips_large_grams() {
        assert_eq!(ngrams("hello", 1, 2), vec!["hello"]);
        assert!(ngrams("", 1, 2).is_empty());
    }

    #[test]
    fn test_trigram_range() {
        assert_eq!(
            ngrams("a b c", 2, 3),
            vec!["a b", "b c", "a b c"]
        );
    }
}
