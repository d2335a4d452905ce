//! Match-time capture groups arranged as a tree.

/// One capture group of a successful match, nested the way the pattern
/// nests its capturing groups.
///
/// The root group is the whole match. A group whose pattern did not take
/// part in the match has no value and no offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Matched text; `None` when the group did not participate.
    pub value: Option<String>,
    /// Name of a named capture group.
    pub name: Option<String>,
    /// Byte offset where the match starts.
    pub start: Option<usize>,
    /// Byte offset where the match ends.
    pub end: Option<usize>,
    /// Capturing groups nested directly inside this one.
    pub children: Vec<Group>,
}

impl Group {
    /// Values handed to a transformer: each child's value when the group has
    /// children, otherwise the group's own value.
    ///
    /// # Examples
    /// ```
    /// use step_expressions::TreeRegex;
    ///
    /// let tree = TreeRegex::new(r"^((\d+)-(\d+))$").expect("valid regex");
    /// let root = tree.match_text("12-7").expect("text matches");
    /// let range = root.children.first().expect("one group");
    /// assert_eq!(range.values(), [Some("12"), Some("7")]);
    /// ```
    #[must_use]
    pub fn values(&self) -> Vec<Option<&str>> {
        if self.children.is_empty() {
            vec![self.value.as_deref()]
        } else {
            self.children
                .iter()
                .map(|child| child.value.as_deref())
                .collect()
        }
    }
}
