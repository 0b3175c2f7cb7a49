//! Arena-backed syntax tree for a single function.
//!
//! Elements are addressed by [`ElementId`] handles. Two handles are equal only
//! when they name the same slot, so structurally identical subtrees at
//! different positions never compare equal.

use serde::Serialize;

use super::error::ExtractError;

/// Handle to an element stored in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A tree element: either an inner node or a terminal leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Node {
        node_type: String,
        children: Vec<ElementId>,
    },
    Leaf {
        node_type: String,
        value: String,
    },
}

impl Element {
    pub fn node(node_type: impl Into<String>) -> Self {
        Element::Node {
            node_type: node_type.into(),
            children: Vec::new(),
        }
    }

    pub fn leaf(node_type: impl Into<String>, value: impl Into<String>) -> Self {
        Element::Leaf {
            node_type: node_type.into(),
            value: value.into(),
        }
    }

    pub fn node_type(&self) -> &str {
        match self {
            Element::Node { node_type, .. } | Element::Leaf { node_type, .. } => node_type,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Element::Leaf { .. })
    }

    /// Token carried by a leaf. Nodes have none.
    pub fn value(&self) -> Option<&str> {
        match self {
            Element::Leaf { value, .. } => Some(value),
            Element::Node { .. } => None,
        }
    }
}

/// Owner of every element of one function's tree.
#[derive(Debug, Default, Clone)]
pub struct Arena {
    elements: Vec<Element>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, element: Element) -> ElementId {
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    pub fn get(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Every element in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (ElementId(index), element))
    }

    /// Append `child` to the children of `parent`.
    ///
    /// Fails with [`ExtractError::LeafOnStack`] when `parent` is a leaf.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), ExtractError> {
        match &mut self.elements[parent.0] {
            Element::Node { children, .. } => {
                children.push(child);
                Ok(())
            }
            Element::Leaf { .. } => Err(ExtractError::LeafOnStack),
        }
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        match self.get(id) {
            Element::Node { children, .. } => children,
            Element::Leaf { .. } => &[],
        }
    }

    /// Position of `child` among the children of `parent`, by identity.
    pub fn child_index(&self, parent: ElementId, child: ElementId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Serializable view of the subtree rooted at `root`.
    pub fn to_dto(&self, root: ElementId) -> TreeDto {
        match self.get(root) {
            Element::Node { node_type, children } => TreeDto::Node {
                node_type: node_type.clone(),
                children: children.iter().map(|&c| self.to_dto(c)).collect(),
            },
            Element::Leaf { node_type, value } => TreeDto::Leaf {
                node_type: node_type.clone(),
                value: value.clone(),
            },
        }
    }
}

/// JSON shape of a tree: `{"node_type", "children"}` or `{"node_type", "value"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TreeDto {
    Node {
        node_type: String,
        children: Vec<TreeDto>,
    },
    Leaf {
        node_type: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_elements_have_distinct_ids() {
        let mut arena = Arena::new();
        let a = arena.alloc(Element::leaf("Name", "x"));
        let b = arena.alloc(Element::leaf("Name", "x"));
        assert_ne!(a, b);
        assert_eq!(arena.get(a), arena.get(b));
    }

    #[test]
    fn test_child_index_uses_identity() {
        let mut arena = Arena::new();
        let root = arena.alloc(Element::node("Tuple"));
        let first = arena.alloc(Element::leaf("Name", "x"));
        let second = arena.alloc(Element::leaf("Name", "x"));
        arena.append_child(root, first).unwrap();
        arena.append_child(root, second).unwrap();

        assert_eq!(arena.child_index(root, first), Some(0));
        assert_eq!(arena.child_index(root, second), Some(1));
    }

    #[test]
    fn test_append_to_leaf_fails() {
        let mut arena = Arena::new();
        let leaf = arena.alloc(Element::leaf("Name", "x"));
        let other = arena.alloc(Element::leaf("Name", "y"));
        assert!(matches!(
            arena.append_child(leaf, other),
            Err(ExtractError::LeafOnStack)
        ));
    }

    #[test]
    fn test_dto_json_shape() {
        let mut arena = Arena::new();
        let root = arena.alloc(Element::node("Return"));
        let leaf = arena.alloc(Element::leaf("Name", "x"));
        arena.append_child(root, leaf).unwrap();

        let json = serde_json::to_value(arena.to_dto(root)).unwrap();
        assert_eq!(json["node_type"], "Return");
        assert_eq!(json["children"][0]["node_type"], "Name");
        assert_eq!(json["children"][0]["value"], "x");
    }
}
