//! Integration tests for `tree_regex`.
#![expect(clippy::expect_used, reason = "tests unwrap compiled patterns and matches")]

use rstest::rstest;
use serial_test::serial;

use step_expressions::{ExpressionError, Group, TreeRegex, config};

fn tree(pattern: &str) -> TreeRegex {
    TreeRegex::new(pattern).expect("pattern should compile")
}

fn child_values(group: &Group) -> Vec<Option<&str>> {
    group.children.iter().map(|c| c.value.as_deref()).collect()
}

#[test]
fn optional_inner_group_nests_under_its_parent() {
    let root = tree("(a(b)?)(c)").match_text("ac").expect("text should match");
    assert_eq!(root.value.as_deref(), Some("ac"));
    assert_eq!(child_values(&root), [Some("a"), Some("c")]);
    let first = root.children.first().expect("first group");
    assert_eq!(child_values(first), [None]);
    let inner = first.children.first().expect("inner group");
    assert_eq!((inner.start, inner.end), (None, None));
}

#[rstest]
#[case(r"(?:a)(b)", 1)]
#[case(r"(?i:a)(b)", 1)]
#[case(r"(?P<x>a)(b)", 2)]
#[case(r"(?<x>a)(b)", 2)]
#[case(r"\((a)\)", 1)]
#[case(r"[(](a)[)]", 1)]
#[case(r"[\]()](a)", 1)]
#[case(r"[]()](a)", 1)]
#[case(r"[[:alpha:]()](a)", 1)]
#[case(r"[a[(]](b)", 1)]
#[case(r"[^[)]x](c)", 1)]
#[case(r"[[^]]()](d)", 1)]
fn counts_only_capturing_groups(#[case] pattern: &str, #[case] groups: usize) {
    assert_eq!(tree(pattern).group_builder().children().count(), groups);
}

#[test]
fn builder_sources_exclude_parentheses() {
    let tree = tree(r"^(\d+) and (?P<rest>.*)$");
    let sources: Vec<_> = tree
        .group_builder()
        .children()
        .map(|child| child.source().map(str::to_owned))
        .collect();
    assert_eq!(
        sources,
        [Some(r"\d+".to_owned()), Some("?P<rest>.*".to_owned())]
    );
}

#[test]
fn offsets_are_bytes() {
    let root = tree("^°(\\d+)$").match_text("°42").expect("text should match");
    let child = root.children.first().expect("one group");
    assert_eq!((child.start, child.end), (Some(2), Some(4)));
    assert_eq!(child.name, None);
}

#[test]
fn named_groups_carry_names() {
    let root = tree(r"(?P<count>\d+)").match_text("7").expect("text should match");
    let child = root.children.first().expect("one group");
    assert_eq!(child.name.as_deref(), Some("count"));
}

#[test]
#[serial]
fn size_limit_override_rejects_huge_patterns() {
    let pattern = r"(\w+)".repeat(5000);
    config::set_regex_size_limit(1024 * 1024);
    let result = TreeRegex::new(&pattern);
    config::clear_regex_size_limit_override();
    assert!(matches!(result, Err(ExpressionError::Regex(_))));
}
