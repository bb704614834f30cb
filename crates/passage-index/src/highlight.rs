//! Query-anchored snippet extraction with highlight spans.
//!
//! The snippet is a character window around the first occurrence of any
//! query token; highlight offsets are byte offsets into the snippet itself,
//! always on character boundaries.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

static QUERY_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\w\-]{3,}").unwrap_or_else(|e| unreachable!("invalid token regex: {e}"))
});

/// Query words shorter than three characters are never extracted; these
/// frequent English and Russian words are dropped on top of that.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "have", "this", "that", "your", "from", "может", "когда", "если",
    "тогда", "так", "как",
];

const MAX_HIGHLIGHTS: usize = 5;

/// A bounded excerpt of a matched passage with spans to emphasize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    /// `(start, end)` byte offsets into `text`, at most five.
    pub highlights: Vec<(usize, usize)>,
}

fn query_tokens(query: &str) -> Vec<String> {
    QUERY_TOKEN_RE
        .find_iter(&query.to_lowercase())
        .map(|m| m.as_str().to_owned())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

fn case_insensitive(token: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(token))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Byte offset of the `char_idx`-th character, clamped to the end.
fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Extract a snippet of up to `2 * window` characters around the best query
/// match, plus up to five highlight spans within it.
///
/// Tokens are tried in query order; the first one found anywhere in the
/// passage anchors the window. With no match at all the snippet degrades to
/// the passage head and no highlights.
#[must_use]
pub fn extract_snippet(text: &str, query: &str, window: usize) -> Snippet {
    let tokens = query_tokens(query);

    let mut anchor = None;
    for token in &tokens {
        let Some(re) = case_insensitive(token) else {
            continue;
        };
        if let Some(m) = re.find(text) {
            anchor = Some(m.start());
            break;
        }
    }

    let Some(anchor) = anchor else {
        let head = char_to_byte(text, 2 * window);
        return Snippet {
            text: text[..head].to_owned(),
            highlights: Vec::new(),
        };
    };

    let anchor_char = text[..anchor].chars().count();
    let start = char_to_byte(text, anchor_char.saturating_sub(window));
    let end = char_to_byte(text, anchor_char + window);
    let snippet = &text[start..end];

    let mut highlights = Vec::new();
    'outer: for token in &tokens {
        let Some(re) = case_insensitive(token) else {
            continue;
        };
        for m in re.find_iter(snippet) {
            highlights.push((m.start(), m.end()));
            if highlights.len() >= MAX_HIGHLIGHTS {
                break 'outer;
            }
        }
    }

    Snippet {
        text: snippet.to_owned(),
        highlights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_tokens_folded_and_filtered() {
        let tokens = query_tokens("The Quick-Brown fox AND концепция");
        assert_eq!(tokens, vec!["quick-brown", "fox", "концепция"]);
    }

    #[test]
    fn short_words_dropped() {
        assert!(query_tokens("a an of").is_empty());
    }

    #[test]
    fn anchored_snippet_with_highlight() {
        let passage = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
                       Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";
        let snippet = extract_snippet(passage, "eiusmod tempor", 20);

        assert!(!snippet.text.is_empty());
        assert!(snippet.text.len() <= 41);
        let found = snippet.highlights.iter().any(|&(start, end)| {
            snippet.text[start..end].eq_ignore_ascii_case("tempor")
                || snippet.text[start..end].eq_ignore_ascii_case("eiusmod")
        });
        assert!(found, "expected a span over a query token");
    }

    #[test]
    fn spans_within_snippet_bounds() {
        let passage = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let snippet = extract_snippet(passage, "gamma theta", 15);
        for &(start, end) in &snippet.highlights {
            assert!(start < end);
            assert!(end <= snippet.text.len());
            assert!(snippet.text.is_char_boundary(start));
            assert!(snippet.text.is_char_boundary(end));
        }
    }

    #[test]
    fn no_match_degrades_to_passage_head() {
        let passage = "x".repeat(1000);
        let snippet = extract_snippet(&passage, "nomatchtoken", 100);
        assert_eq!(snippet.text.len(), 200);
        assert!(snippet.highlights.is_empty());
    }

    #[test]
    fn empty_query_degrades_gracefully() {
        let snippet = extract_snippet("some passage text", "", 50);
        assert_eq!(snippet.text, "some passage text");
        assert!(snippet.highlights.is_empty());
    }

    #[test]
    fn highlight_cap_at_five() {
        let passage = "word word word word word word word word";
        let snippet = extract_snippet(passage, "word", 200);
        assert_eq!(snippet.highlights.len(), 5);
    }

    #[test]
    fn first_token_in_query_order_anchors() {
        // "delta" appears later in the passage than "alpha", but "delta" is
        // the first query token that matches, so it anchors the window.
        let passage = format!("{}delta tail", "alpha ".repeat(100));
        let snippet = extract_snippet(&passage, "delta alpha", 10);
        assert!(snippet.text.contains("delta"));
    }

    #[test]
    fn case_insensitive_match() {
        let snippet = extract_snippet("The TEMPOR marker", "tempor", 50);
        assert_eq!(snippet.highlights.len(), 1);
        let (start, end) = snippet.highlights[0];
        assert_eq!(&snippet.text[start..end], "TEMPOR");
    }

    #[test]
    fn multibyte_passage_keeps_char_boundaries() {
        let passage = "документы и поиск по ним это важная задача для команды";
        let snippet = extract_snippet(passage, "поиск задача", 10);
        for &(start, end) in &snippet.highlights {
            assert!(snippet.text.is_char_boundary(start));
            assert!(snippet.text.is_char_boundary(end));
        }
        assert!(!snippet.text.is_empty());
    }

    mod proptest_highlight {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn spans_always_in_bounds(
                passage in "\\PC{0,400}",
                query in "\\PC{0,50}",
                window in 1usize..300,
            ) {
                let snippet = extract_snippet(&passage, &query, window);
                for (start, end) in snippet.highlights {
                    prop_assert!(start < end);
                    prop_assert!(end <= snippet.text.len());
                    prop_assert!(snippet.text.is_char_boundary(start));
                    prop_assert!(snippet.text.is_char_boundary(end));
                }
            }
        }
    }
}
