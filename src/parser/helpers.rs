//! Tree accessors shared by the extractors: direct-child and ancestor lookup,
//! child-combinator paths (`a > b > c`) over a subtree, and text/attribute
//! reading.

use crate::model::Param;
use roxmltree::Node;

/// Element children of `node`.
pub fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|c| c.is_element())
}

/// First direct child element named `tag`.
pub fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    child_elements(node).find(|c| c.has_tag_name(tag))
}

/// Nearest ancestor element named `tag`, stopping (without matching) at the
/// first ancestor named `boundary`.
pub fn nearest_ancestor<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    boundary: &str,
) -> Option<Node<'a, 'input>> {
    for anc in node.ancestors().skip(1).filter(|a| a.is_element()) {
        if anc.has_tag_name(boundary) {
            return None;
        }
        if anc.has_tag_name(tag) {
            return Some(anc);
        }
    }
    None
}

/// Strict element descendants of `node`, in document order.
pub fn descendant_elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants().skip(1).filter(|d| d.is_element())
}

/// Strict descendants matching the child-combinator chain `path`.
///
/// `select_all(n, &["rpcExpand", "expand", "value"])` yields every `value`
/// below `n` whose parent is an `expand` whose parent is an `rpcExpand`.
/// Ancestors in the chain may lie outside the subtree, as in a scoped CSS
/// query.
pub fn select_all<'a, 'input, 'p>(
    node: Node<'a, 'input>,
    path: &'p [&'p str],
) -> impl Iterator<Item = Node<'a, 'input>> {
    descendant_elements(node).filter(move |d| matches_path(*d, path))
}

/// First match of [`select_all`].
pub fn select<'a, 'input>(node: Node<'a, 'input>, path: &[&str]) -> Option<Node<'a, 'input>> {
    descendant_elements(node).find(|d| matches_path(*d, path))
}

fn matches_path(node: Node, path: &[&str]) -> bool {
    let Some((last, parents)) = path.split_last() else {
        return false;
    };
    if !node.has_tag_name(*last) {
        return false;
    }
    let mut current = node;
    for tag in parents.iter().rev() {
        match current.parent_element() {
            Some(p) if p.has_tag_name(*tag) => current = p,
            _ => return false,
        }
    }
    true
}

/// First strict descendant `<tag attr="value">`.
pub fn select_with_attr<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    attr: &str,
    value: &str,
) -> Option<Node<'a, 'input>> {
    descendant_elements(node).find(|d| d.has_tag_name(tag) && d.attribute(attr) == Some(value))
}

/// Text of the first `<param name="…">` below `node`, trimmed.
pub fn param_text(node: Node, name: &str) -> Option<String> {
    select_with_attr(node, "param", "name", name).map(text_trimmed)
}

/// `name`/`alias` pairs of the first `paramsList` below `node`.
pub fn params_list(node: Node) -> Vec<Param> {
    select(node, &["paramsList"])
        .map(|list| {
            descendant_elements(list)
                .filter(|p| p.has_tag_name("param"))
                .map(|p| Param {
                    name: attr(p, "name"),
                    alias: attr(p, "alias"),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Owned attribute value.
pub fn attr(node: Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

/// Concatenated text of all descendant text nodes (CDATA included).
pub fn text_content(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

pub fn text_trimmed(node: Node) -> String {
    text_content(node).trim().to_string()
}

/// Split a comma separated `actionRef` value, trimming each entry and
/// dropping entries that are empty after trimming.
pub fn split_action_refs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
