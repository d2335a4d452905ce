//! Capture-group structure recovered from regular-expression source.
//!
//! A compiled [`Regex`] reports captures as a flat list. Scanning the pattern
//! source once recovers how those captures nest, so a match can be returned
//! as a [`Group`] tree. Non-capturing groups are transparent: their captures
//! belong to the enclosing group.

use std::ops::Range;

use regex::{Captures, Regex};

use crate::capture::Group;
use crate::config::compile_regex;
use crate::errors::ExpressionError;

#[derive(Debug, Clone)]
struct BuilderNode {
    source: Option<String>,
    children: Vec<usize>,
}

/// An open group during the scan.
struct Frame {
    open: usize,
    capturing: bool,
    children: Vec<usize>,
}

impl Frame {
    const fn new(open: usize, capturing: bool) -> Self {
        Self {
            open,
            capturing,
            children: Vec::new(),
        }
    }
}

/// Whether the group opened at `open` is non-capturing: `(?:`, flags and
/// lookaround are; `(?P<name>` and `(?<name>` are not.
fn is_non_capturing(bytes: &[u8], open: usize) -> bool {
    if bytes.get(open + 1) != Some(&b'?') {
        return false;
    }
    match bytes.get(open + 2) {
        Some(b'P') => bytes.get(open + 3) != Some(&b'<'),
        Some(b'<') => matches!(bytes.get(open + 3), Some(b'=' | b'!')),
        _ => true,
    }
}

/// `]` directly after `[` or `[^` is a literal member of the class.
fn closes_class(bytes: &[u8], class_open: usize, at: usize) -> bool {
    at != class_open + 1 && !(at == class_open + 2 && bytes.get(class_open + 1) == Some(&b'^'))
}

/// Build the arena of capturing groups; returns it with the root index.
fn scan(pattern: &str) -> (Vec<BuilderNode>, usize) {
    let bytes = pattern.as_bytes();
    let mut builders = Vec::new();
    let mut stack = vec![Frame::new(0, true)];
    let mut escaping = false;
    // Open positions of enclosing character classes, innermost last.
    let mut classes: Vec<usize> = Vec::new();

    for (at, &byte) in bytes.iter().enumerate() {
        match byte {
            b'[' if !escaping => classes.push(at),
            b']' if !escaping
                && classes
                    .last()
                    .is_some_and(|&open| closes_class(bytes, open, at)) =>
            {
                classes.pop();
            }
            b'(' if !escaping && classes.is_empty() => {
                stack.push(Frame::new(at, !is_non_capturing(bytes, at)));
            }
            b')' if !escaping && classes.is_empty() && stack.len() > 1 => {
                if let Some(frame) = stack.pop() {
                    let source = pattern.get(frame.open + 1..at).map(str::to_owned);
                    close(&mut builders, &mut stack, frame, source);
                }
            }
            _ => {}
        }
        escaping = byte == b'\\' && !escaping;
    }

    // Unbalanced input never compiles; fold leftovers into their parents.
    while stack.len() > 1 {
        if let Some(mut frame) = stack.pop() {
            frame.capturing = false;
            close(&mut builders, &mut stack, frame, None);
        }
    }
    let root_children = stack.pop().map(|root| root.children).unwrap_or_default();
    builders.push(BuilderNode {
        source: None,
        children: root_children,
    });
    let root = builders.len() - 1;
    (builders, root)
}

fn close(builders: &mut Vec<BuilderNode>, stack: &mut [Frame], frame: Frame, source: Option<String>) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if frame.capturing {
        builders.push(BuilderNode {
            source,
            children: frame.children,
        });
        parent.children.push(builders.len() - 1);
    } else {
        parent.children.extend(frame.children);
    }
}

/// A compiled regex together with the nesting of its capturing groups.
///
/// # Examples
/// ```
/// use step_expressions::TreeRegex;
///
/// let tree = TreeRegex::new("(a(?:b)?)(c)").expect("valid regex");
/// let group = tree.match_text("ac").expect("text matches");
/// assert_eq!(group.children.len(), 2);
/// assert_eq!(group.children[0].value.as_deref(), Some("a"));
/// ```
#[derive(Debug, Clone)]
pub struct TreeRegex {
    regex: Regex,
    builders: Vec<BuilderNode>,
    root: usize,
}

impl TreeRegex {
    /// Compile `pattern` with the configured size limit and scan it.
    ///
    /// # Errors
    /// Returns [`ExpressionError::Regex`] when the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, ExpressionError> {
        Ok(Self::from_regex(compile_regex(pattern)?))
    }

    /// Scan an already compiled regex.
    #[must_use]
    pub fn from_regex(regex: Regex) -> Self {
        let (builders, root) = scan(regex.as_str());
        Self {
            regex,
            builders,
            root,
        }
    }

    /// The compiled regex.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The implicit root group spanning the whole pattern.
    #[must_use]
    pub fn group_builder(&self) -> GroupBuilder<'_> {
        GroupBuilder {
            builders: &self.builders,
            index: self.root,
        }
    }

    /// Match `text`, returning the group tree rooted at the whole match.
    #[must_use]
    pub fn match_text(&self, text: &str) -> Option<Group> {
        let captures = self.regex.captures(text)?;
        let names: Vec<Option<&str>> = self.regex.capture_names().collect();
        let mut indices = 0..captures.len();
        Some(self.build(self.root, &captures, &mut indices, &names))
    }

    fn build(
        &self,
        index: usize,
        captures: &Captures<'_>,
        indices: &mut Range<usize>,
        names: &[Option<&str>],
    ) -> Group {
        let group_index = indices.next();
        let matched = group_index.and_then(|i| captures.get(i));
        let name = group_index
            .and_then(|i| names.get(i).copied().flatten())
            .map(str::to_owned);
        let children = self.builders.get(index).map_or_else(Vec::new, |node| {
            node.children
                .iter()
                .map(|child| self.build(*child, captures, indices, names))
                .collect()
        });
        Group {
            value: matched.map(|m| m.as_str().to_owned()),
            name,
            start: matched.map(|m| m.start()),
            end: matched.map(|m| m.end()),
            children,
        }
    }
}

/// Read-only view of one capturing group in a [`TreeRegex`].
#[derive(Debug, Clone, Copy)]
pub struct GroupBuilder<'a> {
    builders: &'a [BuilderNode],
    index: usize,
}

impl<'a> GroupBuilder<'a> {
    /// Pattern text strictly between the group's parentheses; `None` for
    /// the root.
    #[must_use]
    pub fn source(&self) -> Option<&'a str> {
        self.builders
            .get(self.index)
            .and_then(|node| node.source.as_deref())
    }

    /// Capturing groups nested directly inside this one.
    pub fn children(&self) -> impl Iterator<Item = GroupBuilder<'a>> + 'a {
        let builders = self.builders;
        builders
            .get(self.index)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |index| GroupBuilder {
                builders,
                index: *index,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tree(pattern: &str) -> TreeRegex {
        TreeRegex::new(pattern).unwrap_or_else(|err| panic!("{pattern:?} should compile: {err}"))
    }

    fn matched(pattern: &str, text: &str) -> Group {
        tree(pattern)
            .match_text(text)
            .unwrap_or_else(|| panic!("{pattern:?} should match {text:?}"))
    }

    fn child_sources(pattern: &str) -> Vec<String> {
        let tree = tree(pattern);
        tree.group_builder()
            .children()
            .filter_map(|child| child.source().map(str::to_owned))
            .collect()
    }

    #[test]
    fn non_capturing_groups_are_transparent() {
        let group = matched("(a(?:b)?)(c)", "ac");
        assert_eq!(group.children.len(), 2);
        let first = group.children.first().cloned();
        assert_eq!(first.and_then(|g| g.value), Some("a".to_owned()));
        assert_eq!(group.value.as_deref(), Some("ac"));
    }

    #[test]
    fn nested_captures_become_children() {
        let group = matched(r"^((\d+)-(\d+)) (x)$", "12-7 x");
        let sources = child_sources(r"^((\d+)-(\d+)) (x)$");
        assert_eq!(sources, [r"(\d+)-(\d+)", "x"]);
        let range = group.children.first().cloned();
        assert_eq!(range.map(|g| g.children.len()), Some(2));
    }

    #[test]
    fn captures_inside_non_capturing_are_lifted() {
        let sources = child_sources("(?:(a)|(b))c");
        assert_eq!(sources, ["a", "b"]);
        let group = matched("(?:(a)|(b))c", "bc");
        let values: Vec<_> = group.children.iter().map(|g| g.value.clone()).collect();
        assert_eq!(values, [None, Some("b".to_owned())]);
    }

    #[test]
    fn records_offsets_and_missing_groups() {
        let group = matched("^a(b)?(c)$", "ac");
        let starts: Vec<_> = group.children.iter().map(|g| (g.start, g.end)).collect();
        assert_eq!(starts, [(None, None), (Some(1), Some(2))]);
    }

    #[rstest]
    #[case(r"\((a)\)", &["a"])]
    #[case("[(](b)[)]", &["b"])]
    #[case("([]()]+)", &["[]()]+"])]
    #[case("([[:alpha:]()]+)", &["[[:alpha:]()]+"])]
    #[case(r"[\]](x)", &["x"])]
    #[case(r"\\(y)", &["y"])]
    #[case("(?i)(z)", &["z"])]
    fn ignores_escaped_and_class_parentheses(#[case] pattern: &str, #[case] expected: &[&str]) {
        assert_eq!(child_sources(pattern), expected);
    }

    #[test]
    fn named_groups_are_capturing_and_named() {
        let group = matched("(?P<first>a)(?<second>b)", "ab");
        let names: Vec<_> = group.children.iter().map(|g| g.name.clone()).collect();
        assert_eq!(names, [Some("first".to_owned()), Some("second".to_owned())]);
        assert_eq!(
            child_sources("(?P<first>a)(?<second>b)"),
            ["?P<first>a", "?<second>b"]
        );
    }

    #[rstest]
    #[case("(a)", false)]
    #[case("(?:a)", true)]
    #[case("(?i:a)", true)]
    #[case("(?<=a)", true)]
    #[case("(?<!a)", true)]
    #[case("(?=a)", true)]
    #[case("(?<n>a)", false)]
    #[case("(?P<n>a)", false)]
    fn classifies_group_openers(#[case] pattern: &str, #[case] non_capturing: bool) {
        assert_eq!(is_non_capturing(pattern.as_bytes(), 0), non_capturing);
    }

    #[test]
    fn parentheses_stay_literal_until_the_outer_class_closes() {
        let (builders, root) = scan(r"[[a]()][b[(]](x)");
        let children = builders.get(root).map(|node| node.children.clone()).unwrap_or_default();
        let sources: Vec<_> = children
            .iter()
            .filter_map(|index| builders.get(*index))
            .map(|node| node.source.as_deref())
            .collect();
        assert_eq!(sources, [Some("x")]);
    }

    #[test]
    fn scan_tolerates_unbalanced_source() {
        let (builders, root) = scan("((a)");
        let root_children = builders.get(root).map(|node| node.children.len());
        assert_eq!(root_children, Some(1));
    }
}
