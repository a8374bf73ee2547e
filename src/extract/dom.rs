//! Small DOM helpers over scraper's tree
//!
//! Lookups return descendants in document order and never include the
//! node they start from.

use ego_tree::NodeId;
use scraper::{ElementRef, Html};

/// Descendant elements whose tag is one of `tags`
pub fn elements_by_tag<'a>(root: ElementRef<'a>, tags: &[&str]) -> Vec<ElementRef<'a>> {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|element| tags.contains(&element.value().name()))
        .collect()
}

/// Descendant `tag` elements carrying `class` among their classes
pub fn elements_by_tag_and_class<'a>(
    root: ElementRef<'a>,
    tag: &str,
    class: &str,
) -> Vec<ElementRef<'a>> {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|element| {
            element.value().name() == tag && element.value().classes().any(|c| c == class)
        })
        .collect()
}

/// Detaches every `tag` element below `root`, with its subtree
///
/// Returns the number of elements removed.
pub fn remove_by_tag(document: &mut Html, root: NodeId, tag: &str) -> usize {
    let targets: Vec<NodeId> = match document.tree.get(root).and_then(ElementRef::wrap) {
        Some(root) => elements_by_tag(root, &[tag])
            .into_iter()
            .map(|element| element.id())
            .collect(),
        None => return 0,
    };

    for id in &targets {
        if let Some(mut node) = document.tree.get_mut(*id) {
            node.detach();
        }
    }

    targets.len()
}

/// Resolves a node id back to an element
pub fn element_at(document: &Html, id: NodeId) -> Option<ElementRef<'_>> {
    document.tree.get(id).and_then(ElementRef::wrap)
}
