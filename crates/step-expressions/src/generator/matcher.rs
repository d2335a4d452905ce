//! Whole-word pattern search used by the expression generator.

use std::cmp::Ordering;
use std::sync::Arc;

use regex::Regex;

use crate::parameter::ParameterType;

/// Finds occurrences of one parameter-type pattern in a sample text.
#[derive(Debug, Clone)]
pub(crate) struct ParameterTypeMatcher<'t> {
    parameter_type: Arc<ParameterType>,
    regex: Regex,
    text: &'t str,
    found: Option<(usize, usize)>,
}

impl<'t> ParameterTypeMatcher<'t> {
    /// Search `text` from byte offset `position`.
    pub(crate) fn new(
        parameter_type: Arc<ParameterType>,
        regex: Regex,
        text: &'t str,
        position: usize,
    ) -> Self {
        let found = text.get(position..).and_then(|rest| {
            regex
                .find(rest)
                .map(|m| (position + m.start(), position + m.end()))
        });
        Self {
            parameter_type,
            regex,
            text,
            found,
        }
    }

    /// The first non-empty whole-word match starting the search at or after
    /// `position`, or a matcher that found nothing.
    pub(crate) fn advance_to(&self, position: usize) -> Self {
        let starts = self
            .text
            .char_indices()
            .map(|(at, _)| at)
            .filter(|at| *at >= position);
        for at in starts {
            let candidate = self.search_from(at);
            if candidate.find() && candidate.full_word() {
                return candidate;
            }
        }
        self.search_from(self.text.len())
    }

    fn search_from(&self, position: usize) -> Self {
        Self::new(
            Arc::clone(&self.parameter_type),
            self.regex.clone(),
            self.text,
            position,
        )
    }

    /// Whether a non-empty match was found.
    pub(crate) fn find(&self) -> bool {
        self.found.is_some_and(|(start, end)| end > start)
    }

    fn full_word(&self) -> bool {
        self.match_start_word() && self.match_end_word()
    }

    fn match_start_word(&self) -> bool {
        let start = self.start();
        self.text
            .get(..start)
            .and_then(|before| before.chars().next_back())
            .is_none_or(|ch| !ch.is_alphanumeric())
    }

    fn match_end_word(&self) -> bool {
        let end = self.end();
        self.text
            .get(end..)
            .and_then(|after| after.chars().next())
            .is_none_or(|ch| !ch.is_alphanumeric())
    }

    pub(crate) fn start(&self) -> usize {
        self.found.map_or(self.text.len(), |(start, _)| start)
    }

    pub(crate) fn end(&self) -> usize {
        self.found.map_or(self.text.len(), |(_, end)| end)
    }

    fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub(crate) const fn parameter_type(&self) -> &Arc<ParameterType> {
        &self.parameter_type
    }

    /// Earliest start first, then longest match.
    pub(crate) fn compare(a: &Self, b: &Self) -> Ordering {
        a.start()
            .cmp(&b.start())
            .then_with(|| b.len().cmp(&a.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{ParameterType, first_as_string};

    fn matcher<'t>(pattern: &str, text: &'t str) -> ParameterTypeMatcher<'t> {
        let parameter_type = Arc::new(ParameterType::unchecked(
            "x",
            [pattern],
            "String",
            first_as_string,
        ));
        let regex = Regex::new(&format!("({pattern})"))
            .unwrap_or_else(|err| panic!("{pattern:?} should compile: {err}"));
        ParameterTypeMatcher::new(parameter_type, regex, text, 0)
    }

    #[test]
    fn skips_matches_inside_words() {
        let found = matcher(r"\d+", "i18n").advance_to(0);
        assert!(!found.find());
    }

    #[test]
    fn accepts_matches_bounded_by_punctuation() {
        let found = matcher(r"\d+", "$5000.00").advance_to(0);
        assert!(found.find());
        assert_eq!((found.start(), found.end()), (1, 5));
    }

    #[test]
    fn treats_non_alphanumeric_symbols_as_boundaries() {
        let found = matcher(r"\d+", "at 42° Celsius").advance_to(0);
        assert_eq!((found.start(), found.end()), (3, 5));
    }

    #[test]
    fn advances_past_position() {
        let found = matcher(r"\d+", "1 and 2").advance_to(1);
        assert_eq!((found.start(), found.end()), (6, 7));
    }

    #[test]
    fn later_start_in_run_can_be_whole_word() {
        let found = matcher(r"[a-z]1", "xab1 c1").advance_to(0);
        assert_eq!((found.start(), found.end()), (5, 7));
    }

    #[test]
    fn orders_by_start_then_length() {
        let short = matcher("a", "ab");
        let long = matcher("ab", "ab");
        assert_eq!(ParameterTypeMatcher::compare(&long, &short), Ordering::Less);
        let later = matcher("b", "ab");
        assert_eq!(ParameterTypeMatcher::compare(&short, &later), Ordering::Less);
    }
}
