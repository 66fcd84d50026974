//! Query filtering over rendered log lines.
//!
//! Three query shapes: empty (no filtering), a leading fuzzy sentinel
//! (subsequence match, results ranked best first), or a regular expression
//! (case-insensitive, optionally inverted with a leading `!`). Filtering
//! scans the rendered lines, so `show_time` and the modifier affect what a
//! query can match.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use regex::bytes::Regex;

use crate::item::LogItems;

/// Query prefix selecting fuzzy subsequence matching.
pub const FUZZY_SELECTOR: &str = "-f";

/// Query prefix (regex mode) selecting match inversion.
pub const INVERSE_SELECTOR: char = '!';

/// Whether a query requests fuzzy matching.
pub fn is_fuzzy_selector(query: &str) -> bool {
    query.starts_with(FUZZY_SELECTOR)
}

/// Whether a regex query requests inversion.
pub fn is_inverse_selector(query: &str) -> bool {
    query.starts_with(INVERSE_SELECTOR)
}

/// Matched collection indices paired with per-line highlight positions.
pub type FilterMatches = (Vec<usize>, Vec<Vec<usize>>);

impl LogItems {
    /// Filter the collection against a query.
    ///
    /// An empty query means "no filtering, nothing to highlight" and returns
    /// empty sets. Only regex compilation can fail; the caller surfaces that
    /// and keeps its previous filter state.
    pub fn filter(
        &self,
        query: &str,
        show_time: bool,
        modifier: &str,
    ) -> Result<FilterMatches, regex::Error> {
        if query.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        if is_fuzzy_selector(query) {
            let pattern = query[FUZZY_SELECTOR.len()..].trim();
            return Ok(self.fuzzy_filter(pattern, show_time, modifier));
        }
        self.filter_logs(query, show_time, modifier)
            .inspect_err(|err| tracing::error!(%err, "log filter failed"))
    }

    /// Fuzzy subsequence match over rendered lines, ranked best first.
    fn fuzzy_filter(&self, pattern: &str, show_time: bool, modifier: &str) -> FilterMatches {
        if pattern.is_empty() {
            return (Vec::new(), Vec::new());
        }
        let matcher = SkimMatcherV2::default();
        let mut hits: Vec<(usize, i64, Vec<usize>)> = Vec::new();
        for (i, line) in self.str_lines(show_time, modifier).iter().enumerate() {
            if let Some((score, positions)) = matcher.fuzzy_indices(line, pattern) {
                hits.push((i, score, positions));
            }
        }
        // best score first, ties keep collection order
        hits.sort_by(|a, b| b.1.cmp(&a.1));

        let mut matches = Vec::with_capacity(hits.len());
        let mut indices = Vec::with_capacity(hits.len());
        for (i, _, positions) in hits {
            matches.push(i);
            indices.push(positions);
        }
        (matches, indices)
    }

    /// Case-insensitive regex match over rendered lines, in collection order.
    fn filter_logs(
        &self,
        query: &str,
        show_time: bool,
        modifier: &str,
    ) -> Result<FilterMatches, regex::Error> {
        let (invert, pattern) = if is_inverse_selector(query) {
            (true, &query[INVERSE_SELECTOR.len_utf8()..])
        } else {
            (false, query)
        };
        let rx = Regex::new(&format!("(?i){pattern}"))?;

        let mut matches = Vec::new();
        let mut indices = Vec::new();
        for (i, line) in self.lines(show_time, modifier).iter().enumerate() {
            let matched = rx.is_match(line);
            if matched == invert {
                continue;
            }
            matches.push(i);
            if invert {
                // inversion carries no meaningful match span
                indices.push(Vec::new());
            } else {
                indices.push(rx.find_iter(line).flat_map(|m| m.range()).collect());
            }
        }
        Ok((matches, indices))
    }
}
