//! Path-addressed edits of an expression tree.
//!
//! A path is the list of child indices from the root group down to a node;
//! the empty path is the root. Every edit returns a new tree and leaves the
//! input untouched, so callers can compare snapshots structurally. An edit
//! whose path does not resolve returns an unchanged copy.

use std::collections::HashSet;

use crate::filter::expression::{
    Combinator, ExpressionNode, FilterOperator, GroupNode, Lenient, PropertyFilterNode,
    SearchMode, SearchPart, SearchScope, TextSearchNode,
};
use crate::filter::fields::Field;

/// Highlight palette. A new search takes the first color no other search
/// in the tree holds.
pub const SEARCH_COLORS: [&str; 20] = [
    "#f9e2af", "#f38ba8", "#a6e3a1", "#89b4fa", "#cba6f7", "#fab387", "#94e2d5", "#74c7ec",
    "#eba0ac", "#a6adc8", "#f5c2e7", "#b4befe", "#f2cdcd", "#bac2de", "#9399b2", "#e6c384",
    "#7aa2f7", "#bb9af7", "#7dcfff", "#ff9e64",
];

pub fn node_at<'a>(node: &'a ExpressionNode, path: &[usize]) -> Option<&'a ExpressionNode> {
    let Some((first, rest)) = path.split_first() else {
        return Some(node);
    };
    node.children().get(*first).and_then(|c| node_at(c, rest))
}

fn node_at_mut<'a>(node: &'a mut ExpressionNode, path: &[usize]) -> Option<&'a mut ExpressionNode> {
    let Some((first, rest)) = path.split_first() else {
        return Some(node);
    };
    match node {
        ExpressionNode::Group(group) => group
            .children
            .get_mut(*first)
            .and_then(|c| node_at_mut(c, rest)),
        _ => None,
    }
}

fn group_at_mut<'a>(node: &'a mut ExpressionNode, path: &[usize]) -> Option<&'a mut GroupNode> {
    match node_at_mut(node, path)? {
        ExpressionNode::Group(group) => Some(group),
        _ => None,
    }
}

/// Apply `update` to the node at `path`.
pub fn update_node_at<F>(tree: &ExpressionNode, path: &[usize], update: F) -> ExpressionNode
where
    F: FnOnce(&mut ExpressionNode),
{
    let mut out = tree.clone();
    if let Some(node) = node_at_mut(&mut out, path) {
        update(node);
    }
    out
}

/// Insert `child` as the first child of the group at `path`.
pub fn add_child_at(tree: &ExpressionNode, path: &[usize], child: ExpressionNode) -> ExpressionNode {
    let mut out = tree.clone();
    if let Some(group) = group_at_mut(&mut out, path) {
        group.children.insert(0, child);
    }
    out
}

pub fn remove_child_at(tree: &ExpressionNode, path: &[usize], index: usize) -> ExpressionNode {
    let mut out = tree.clone();
    if let Some(group) = group_at_mut(&mut out, path) {
        if index < group.children.len() {
            group.children.remove(index);
        }
    }
    out
}

/// Move the child at `from` so it ends up at index `to` of the same group.
pub fn reorder_children_at(
    tree: &ExpressionNode,
    path: &[usize],
    from: usize,
    to: usize,
) -> ExpressionNode {
    let mut out = tree.clone();
    if let Some(group) = group_at_mut(&mut out, path) {
        let len = group.children.len();
        if from < len && to < len && from != to {
            let moved = group.children.remove(from);
            group.children.insert(to, moved);
        }
    }
    out
}

/// Give the text search at `path` a palette color. A search already holding
/// that color takes over the edited search's previous color, so no two
/// searches ever share one.
pub fn set_search_color(tree: &ExpressionNode, path: &[usize], color: &str) -> ExpressionNode {
    let previous = match node_at(tree, path) {
        Some(ExpressionNode::TextSearch(search)) => search.color.clone(),
        _ => return tree.clone(),
    };
    if previous.as_deref() == Some(color) {
        return tree.clone();
    }

    let mut out = tree.clone();
    swap_color(&mut out, color, previous.as_deref());
    if let Some(ExpressionNode::TextSearch(search)) = node_at_mut(&mut out, path) {
        search.color = Some(color.to_string());
    }
    out
}

fn swap_color(node: &mut ExpressionNode, taken: &str, replacement: Option<&str>) {
    match node {
        ExpressionNode::Group(group) => {
            for child in &mut group.children {
                swap_color(child, taken, replacement);
            }
        }
        ExpressionNode::TextSearch(search) if search.color.as_deref() == Some(taken) => {
            search.color = replacement.map(str::to_string);
        }
        _ => {}
    }
}

pub fn used_colors(tree: &ExpressionNode) -> HashSet<String> {
    let mut used = HashSet::new();
    collect_colors(tree, &mut used);
    used
}

fn collect_colors(node: &ExpressionNode, used: &mut HashSet<String>) {
    match node {
        ExpressionNode::Group(group) => {
            for child in &group.children {
                collect_colors(child, used);
            }
        }
        ExpressionNode::TextSearch(search) => {
            if let Some(color) = &search.color {
                used.insert(color.clone());
            }
        }
        ExpressionNode::PropertyFilter(_) => {}
    }
}

/// First palette color not used by any search in `tree`. Once the palette
/// is exhausted the first color is reused.
pub fn next_color(tree: &ExpressionNode) -> &'static str {
    let used = used_colors(tree);
    SEARCH_COLORS
        .iter()
        .copied()
        .find(|c| !used.contains(*c))
        .unwrap_or(SEARCH_COLORS[0])
}

/// A fresh highlight-only search with the next free color.
pub fn new_text_search(tree: &ExpressionNode, operator: Combinator) -> ExpressionNode {
    ExpressionNode::TextSearch(TextSearchNode {
        operator,
        text: String::new(),
        scope: Lenient::Known(SearchScope::All),
        part: Lenient::Known(SearchPart::All),
        mode: Lenient::Known(SearchMode::Text),
        highlight_only: true,
        color: Some(next_color(tree).to_string()),
        enabled: true,
    })
}

/// A fresh URL-contains exclusion with an empty value (inert until filled).
pub fn new_property_filter(operator: Combinator) -> ExpressionNode {
    ExpressionNode::PropertyFilter(PropertyFilterNode {
        operator,
        field: Lenient::Known(Field::Url),
        filter_operator: Lenient::Known(FilterOperator::Contains),
        value: String::new(),
        exclude: true,
        enabled: true,
    })
}

pub fn new_group(operator: Combinator) -> ExpressionNode {
    ExpressionNode::Group(GroupNode {
        operator,
        children: Vec::new(),
        enabled: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> ExpressionNode {
        ExpressionNode::default()
    }

    fn color_of(tree: &ExpressionNode, path: &[usize]) -> Option<String> {
        match node_at(tree, path) {
            Some(ExpressionNode::TextSearch(s)) => s.color.clone(),
            _ => None,
        }
    }

    #[test]
    fn add_prepends_and_leaves_input_untouched() {
        let tree = root();
        let one = add_child_at(&tree, &[], new_property_filter(Combinator::And));
        let two = add_child_at(&one, &[], new_group(Combinator::Or));

        assert!(tree.children().is_empty());
        assert_eq!(one.children().len(), 1);
        assert_eq!(two.children().len(), 2);
        assert!(matches!(two.children()[0], ExpressionNode::Group(_)));
        assert!(matches!(two.children()[1], ExpressionNode::PropertyFilter(_)));
    }

    #[test]
    fn nested_paths_resolve() {
        let tree = add_child_at(&root(), &[], new_group(Combinator::And));
        let tree = add_child_at(&tree, &[0], new_text_search(&tree, Combinator::And));
        assert!(matches!(node_at(&tree, &[0, 0]), Some(ExpressionNode::TextSearch(_))));

        let edited = update_node_at(&tree, &[0, 0], |n| n.set_enabled(false));
        assert!(!node_at(&edited, &[0, 0]).unwrap().enabled());
        assert!(node_at(&tree, &[0, 0]).unwrap().enabled());
    }

    #[test]
    fn invalid_paths_are_ignored() {
        let tree = add_child_at(&root(), &[], new_property_filter(Combinator::And));
        assert_eq!(add_child_at(&tree, &[0], new_group(Combinator::And)), tree);
        assert_eq!(remove_child_at(&tree, &[], 5), tree);
        assert_eq!(reorder_children_at(&tree, &[], 0, 3), tree);
        assert_eq!(update_node_at(&tree, &[2, 1], |n| n.set_enabled(false)), tree);
    }

    #[test]
    fn remove_and_reorder() {
        let mut tree = root();
        for _ in 0..3 {
            let child = new_text_search(&tree, Combinator::And);
            tree = add_child_at(&tree, &[], child);
        }
        // Newest first: colors are [2], [1], [0] of the palette.
        assert_eq!(color_of(&tree, &[0]).as_deref(), Some(SEARCH_COLORS[2]));

        let moved = reorder_children_at(&tree, &[], 0, 2);
        assert_eq!(color_of(&moved, &[2]).as_deref(), Some(SEARCH_COLORS[2]));
        assert_eq!(color_of(&moved, &[0]).as_deref(), Some(SEARCH_COLORS[1]));

        let removed = remove_child_at(&moved, &[], 1);
        assert_eq!(removed.children().len(), 2);
        assert_eq!(next_color(&removed), SEARCH_COLORS[0]);
    }

    #[test]
    fn colors_stay_unique() {
        let mut tree = root();
        for _ in 0..2 {
            let child = new_text_search(&tree, Combinator::And);
            tree = add_child_at(&tree, &[], child);
        }
        let taken = color_of(&tree, &[1]).unwrap();
        let own = color_of(&tree, &[0]).unwrap();

        let recolored = set_search_color(&tree, &[0], &taken);
        assert_eq!(color_of(&recolored, &[0]), Some(taken));
        assert_eq!(color_of(&recolored, &[1]), Some(own));
        assert_eq!(used_colors(&recolored).len(), 2);
    }

    #[test]
    fn palette_exhaustion_reuses_first_color() {
        let mut tree = root();
        for _ in 0..SEARCH_COLORS.len() {
            let child = new_text_search(&tree, Combinator::And);
            tree = add_child_at(&tree, &[], child);
        }
        assert_eq!(used_colors(&tree).len(), SEARCH_COLORS.len());
        assert_eq!(next_color(&tree), SEARCH_COLORS[0]);
    }
}
