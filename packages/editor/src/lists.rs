//! # List Nesting
//!
//! Indent/outdent over the two-level item tree of a single list block.
//!
//! Invariants kept by every function here:
//! - an item inside `children` never has children of its own (depth <= 2)
//! - an empty child list is `None`, never `Some(vec![])`
//! - a list keeps at least one top-level item
//!
//! Every function returns `true` when it changed `items` and `false` when
//! the request was a no-op (out of range, first item, last item).

use crate::content::ListItem;
use tracing::debug;

/// Make `items[index]` the last child of `items[index - 1]`.
///
/// The moved item keeps only its body; any children it had are dropped.
pub fn indent(items: &mut Vec<ListItem>, index: usize) -> bool {
    if index == 0 || index >= items.len() {
        return false;
    }

    let moved = items.remove(index);
    if moved.has_children() {
        debug!(
            index,
            dropped = moved.child_count(),
            "Indent drops children of moved item"
        );
    }

    items[index - 1]
        .children
        .get_or_insert_with(Vec::new)
        .push(ListItem::new(moved.body));
    true
}

/// Move `items[parent_index].children[child_index]` back to the top level,
/// directly after its former parent.
pub fn outdent(items: &mut Vec<ListItem>, parent_index: usize, child_index: usize) -> bool {
    let Some(parent) = items.get_mut(parent_index) else {
        return false;
    };
    let Some(children) = parent.children.as_mut() else {
        return false;
    };
    if child_index >= children.len() {
        return false;
    }

    let child = children.remove(child_index);
    if children.is_empty() {
        parent.children = None;
    }

    items.insert(parent_index + 1, ListItem::new(child.body));
    true
}

/// Append a child to `items[parent_index]`
pub fn add_child(items: &mut [ListItem], parent_index: usize, new_item: ListItem) -> bool {
    let Some(parent) = items.get_mut(parent_index) else {
        return false;
    };
    parent
        .children
        .get_or_insert_with(Vec::new)
        .push(ListItem::new(new_item.body));
    true
}

/// Insert a top-level item at `index` (clamped to the end)
pub fn insert_item(items: &mut Vec<ListItem>, index: usize, new_item: ListItem) -> bool {
    let index = index.min(items.len());
    let mut new_item = new_item;
    flatten_children(&mut new_item);
    items.insert(index, new_item);
    true
}

/// Remove a top-level item; refused when it is the only one
pub fn remove_item(items: &mut Vec<ListItem>, index: usize) -> bool {
    if items.len() <= 1 || index >= items.len() {
        return false;
    }
    items.remove(index);
    true
}

/// Remove a child item; a parent left without children gets `None`
pub fn remove_child(items: &mut [ListItem], parent_index: usize, child_index: usize) -> bool {
    let Some(parent) = items.get_mut(parent_index) else {
        return false;
    };
    let Some(children) = parent.children.as_mut() else {
        return false;
    };
    if child_index >= children.len() {
        return false;
    }
    children.remove(child_index);
    if children.is_empty() {
        parent.children = None;
    }
    true
}

/// Bring loaded items back within the invariants: empty child lists become
/// `None`, grandchildren are dropped, and an empty list gets one blank item.
pub fn normalize(items: &mut Vec<ListItem>) {
    for item in items.iter_mut() {
        flatten_children(item);
    }
    if items.is_empty() {
        items.push(ListItem::new(""));
    }
}

fn flatten_children(item: &mut ListItem) {
    if let Some(children) = item.children.as_mut() {
        for child in children.iter_mut() {
            child.children = None;
        }
        if children.is_empty() {
            item.children = None;
        }
    }
}

/// True when no child carries children and no child list is empty
pub fn is_well_formed(items: &[ListItem]) -> bool {
    !items.is_empty()
        && items.iter().all(|item| match &item.children {
            None => true,
            Some(children) => {
                !children.is_empty() && children.iter().all(|c| c.children.is_none())
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bodies(items: &[ListItem]) -> Vec<&str> {
        items.iter().map(|i| i.body.as_str()).collect()
    }

    fn list(names: &[&str]) -> Vec<ListItem> {
        names.iter().map(|n| ListItem::new(*n)).collect()
    }

    #[test]
    fn test_indent_first_item_is_noop() {
        let mut items = list(&["a", "b"]);
        assert!(!indent(&mut items, 0));
        assert_eq!(bodies(&items), vec!["a", "b"]);
    }

    #[test]
    fn test_indent_appends_to_previous_sibling() {
        let mut items = list(&["a", "b", "c"]);
        assert!(indent(&mut items, 1));
        assert!(indent(&mut items, 1));

        assert_eq!(bodies(&items), vec!["a"]);
        let children = items[0].children.as_ref().unwrap();
        assert_eq!(bodies(children), vec!["b", "c"]);
        assert!(is_well_formed(&items));
    }

    #[test]
    fn test_indent_drops_own_children() {
        let mut items = vec![
            ListItem::new("a"),
            ListItem::with_children("b", vec![ListItem::new("b1")]),
        ];
        assert!(indent(&mut items, 1));
        let children = items[0].children.as_ref().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].children, None);
        assert!(is_well_formed(&items));
    }

    #[test]
    fn test_outdent_inserts_after_parent() {
        let mut items = vec![
            ListItem::with_children("a", vec![ListItem::new("a1"), ListItem::new("a2")]),
            ListItem::new("b"),
        ];
        assert!(outdent(&mut items, 0, 0));
        assert_eq!(bodies(&items), vec!["a", "a1", "b"]);
        assert_eq!(items[0].child_count(), 1);
    }

    #[test]
    fn test_outdent_last_child_clears_children() {
        let mut items = vec![ListItem::with_children("a", vec![ListItem::new("a1")])];
        assert!(outdent(&mut items, 0, 0));
        assert_eq!(items[0].children, None);
        assert_eq!(bodies(&items), vec!["a", "a1"]);
    }

    #[test]
    fn test_indent_then_outdent_restores_position() {
        let mut items = list(&["a", "b", "c"]);
        indent(&mut items, 1);
        let child_index = items[0].child_count() - 1;
        outdent(&mut items, 0, child_index);

        assert_eq!(bodies(&items), vec!["a", "b", "c"]);
        assert!(items.iter().all(|i| i.children.is_none()));
    }

    #[test]
    fn test_outdent_out_of_range_is_noop() {
        let mut items = list(&["a"]);
        assert!(!outdent(&mut items, 0, 0));
        assert!(!outdent(&mut items, 5, 0));
    }

    #[test]
    fn test_remove_item_keeps_one() {
        let mut items = list(&["a", "b"]);
        assert!(remove_item(&mut items, 0));
        assert!(!remove_item(&mut items, 0));
        assert_eq!(bodies(&items), vec!["b"]);
    }

    #[test]
    fn test_remove_child_has_no_floor() {
        let mut items = vec![ListItem::with_children("a", vec![ListItem::new("a1")])];
        assert!(remove_child(&mut items, 0, 0));
        assert_eq!(items[0].children, None);
        assert!(!remove_child(&mut items, 0, 0));
    }

    #[test]
    fn test_add_child_creates_array_and_strips_depth() {
        let mut items = list(&["a"]);
        let nested = ListItem::with_children("x", vec![ListItem::new("deep")]);
        assert!(add_child(&mut items, 0, nested));
        let children = items[0].children.as_ref().unwrap();
        assert_eq!(children[0].children, None);
        assert!(!add_child(&mut items, 3, ListItem::new("y")));
    }

    #[test]
    fn test_normalize_repairs_loaded_items() {
        let mut items = vec![
            ListItem {
                body: "a".to_string(),
                children: Some(vec![]),
            },
            ListItem {
                body: "b".to_string(),
                children: Some(vec![ListItem::with_children("b1", vec![ListItem::new("b1x")])]),
            },
        ];
        assert!(!is_well_formed(&items));
        normalize(&mut items);
        assert!(is_well_formed(&items));

        let mut empty = Vec::new();
        normalize(&mut empty);
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn test_depth_invariant_over_operation_sequence() {
        let mut items = list(&["a", "b", "c", "d", "e"]);
        let ops: [(u8, usize, usize); 10] = [
            (0, 1, 0),
            (0, 1, 0),
            (0, 2, 0),
            (1, 0, 1),
            (0, 1, 0),
            (0, 2, 0),
            (1, 0, 0),
            (0, 3, 0),
            (1, 1, 0),
            (0, 1, 0),
        ];
        for (op, a, b) in ops {
            match op {
                0 => {
                    indent(&mut items, a);
                }
                _ => {
                    outdent(&mut items, a, b);
                }
            }
            assert!(is_well_formed(&items), "depth invariant broken: {:?}", items);
        }
    }
}
