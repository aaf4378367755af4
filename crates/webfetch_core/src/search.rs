use std::borrow::Cow;
use serde::Serialize;

/// One term occurrence inside extracted content.
///
/// Offsets are byte positions within the extracted content, never the raw
/// HTML. The context window is sliced from the original content, so source
/// casing survives case-insensitive searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub term: String,
    pub position: usize,
    pub context: String,
    pub context_start: usize,
    pub context_end: usize,
}

/// Find every occurrence of every term in `content`.
///
/// Terms are processed in caller order; within a term, matches are in
/// increasing offset order. The scan advances one position past each hit, so
/// overlapping occurrences of the same term are all reported. An empty term
/// list yields an empty result. In case-insensitive mode both content and
/// terms are lowercased for scanning, and the reported term is the lowercased
/// one.
pub fn search_content(
    content: &str,
    terms: &[String],
    case_sensitive: bool,
    context_chars: usize,
) -> Vec<SearchMatch> {
    let haystack: Cow<'_, str> = if case_sensitive {
        Cow::Borrowed(content)
    } else {
        Cow::Owned(content.to_lowercase())
    };

    let mut matches = Vec::new();
    for raw_term in terms {
        let term: Cow<'_, str> = if case_sensitive {
            Cow::Borrowed(raw_term.as_str())
        } else {
            Cow::Owned(raw_term.to_lowercase())
        };
        if term.is_empty() {
            continue;
        }

        let mut start = 0;
        while let Some(found) = haystack[start..].find(term.as_ref()) {
            let position = start + found;
            let match_end = position + term.len();

            let context_start =
                floor_char_boundary(content, position.saturating_sub(context_chars / 2));
            let context_end =
                floor_char_boundary(content, (match_end + context_chars / 2).min(content.len()));
            let context = content[context_start..context_end].to_string();

            matches.push(SearchMatch {
                term: term.clone().into_owned(),
                position,
                context,
                context_start,
                context_end,
            });

            start = ceil_char_boundary(&haystack, position + 1);
        }
    }
    matches
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index += 1;
    }
    index
}
