//! Rewrites `[n]` / `[n, m]` citation markers into source URLs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static RE_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([0-9]+(?:\s*,\s*[0-9]+)*)\]").expect("valid citation regex"));

/// Replace each citation marker with `(url1, url2, ...)`.
///
/// Only ASCII digits form a marker; `[٣]` and other non-ASCII numerals are
/// plain text.
///
/// Numbers are resolved in marker order; numbers that fail to parse or are not
/// in `index_to_url` are skipped. A marker with no resolvable number is left
/// untouched.
pub fn rewrite_citations(text: &str, index_to_url: &BTreeMap<usize, String>) -> String {
    RE_CITATION
        .replace_all(text, |caps: &Captures| {
            let urls: Vec<&str> = caps[1]
                .split(',')
                .filter_map(|token| token.trim().parse::<usize>().ok())
                .filter_map(|n| index_to_url.get(&n).map(String::as_str))
                .collect();

            if urls.is_empty() {
                caps[0].to_string()
            } else {
                format!("({})", urls.join(", "))
            }
        })
        .into_owned()
}
