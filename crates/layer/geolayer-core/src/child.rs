//! Child descriptors handed over by the host composition framework.
//!
//! The host's tree is modelled as a tagged union so the flattening contract
//! (any depth, left-to-right order) does not depend on a particular framework:
//!
//! ```text
//!   [a, [b, c], [[d]]]  ──leaves()──►  a, b, c, d
//! ```
//!
//! JSON form, as found in host documents and fixtures:
//!   - an array is a `Sequence`
//!   - `{ "props": { ... } }` is a leaf carrying that property bag
//!   - anything else (other objects, text, numbers, booleans, `null`) is a
//!     non-geographic leaf (no bag)

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Open key/value map attached to a child. Its shape is unconstrained.
pub type PropertyBag = Map<String, JsonValue>;

/// A single descriptor from the host tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildDescriptor {
    /// `None` for nodes that carry nothing usable (e.g. plain markup children).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<PropertyBag>,
}

impl ChildDescriptor {
    pub fn new(props: PropertyBag) -> Self {
        Self { props: Some(props) }
    }

    /// A node without a property bag.
    pub fn non_geographic() -> Self {
        Self { props: None }
    }

    /// Build a descriptor from a JSON object. Non-object values yield a node without a bag.
    pub fn from_json(props: JsonValue) -> Self {
        match props {
            JsonValue::Object(map) => Self::new(map),
            _ => Self::non_geographic(),
        }
    }

    pub fn props(&self) -> Option<&PropertyBag> {
        self.props.as_ref()
    }

    /// True when the descriptor has a non-empty bag.
    pub fn is_geographic(&self) -> bool {
        self.props.as_ref().is_some_and(|bag| !bag.is_empty())
    }
}

/// A node of the host tree: either a descriptor or a nested sequence of nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChildNode {
    Sequence(Vec<ChildNode>),
    Leaf(ChildDescriptor),
}

impl Default for ChildNode {
    fn default() -> Self {
        ChildNode::Sequence(Vec::new())
    }
}

impl ChildNode {
    pub fn leaf(props: PropertyBag) -> Self {
        ChildNode::Leaf(ChildDescriptor::new(props))
    }

    pub fn sequence(nodes: impl IntoIterator<Item = ChildNode>) -> Self {
        ChildNode::Sequence(nodes.into_iter().collect())
    }

    /// Read a node from its JSON form. Never fails: values that are neither an
    /// array nor a `{ "props": { ... } }` object become non-geographic leaves.
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Array(items) => items.into_iter().map(ChildNode::from_json).collect(),
            JsonValue::Object(mut node) => match node.remove("props") {
                Some(props) => ChildNode::Leaf(ChildDescriptor::from_json(props)),
                None => ChildNode::Leaf(ChildDescriptor::non_geographic()),
            },
            _ => ChildNode::Leaf(ChildDescriptor::non_geographic()),
        }
    }

    /// Iterate over the leaf descriptors in left-to-right order, at any depth.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![std::slice::from_ref(self).iter()] }
    }

    /// Number of leaf descriptors after full flattening.
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Number of leaves without a non-empty property bag.
    pub fn non_geographic_count(&self) -> usize {
        self.leaves().filter(|desc| !desc.is_geographic()).count()
    }
}

impl<'de> Deserialize<'de> for ChildNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(ChildNode::from_json)
    }
}

impl From<ChildDescriptor> for ChildNode {
    fn from(desc: ChildDescriptor) -> Self {
        ChildNode::Leaf(desc)
    }
}

impl From<Vec<ChildNode>> for ChildNode {
    fn from(nodes: Vec<ChildNode>) -> Self {
        ChildNode::Sequence(nodes)
    }
}

impl FromIterator<ChildNode> for ChildNode {
    fn from_iter<I: IntoIterator<Item = ChildNode>>(iter: I) -> Self {
        ChildNode::sequence(iter)
    }
}

/// Depth-first, order-preserving iterator over leaf descriptors.
///
/// Uses an explicit stack of slice iterators, so deeply nested input does not
/// grow the call stack.
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    stack: Vec<std::slice::Iter<'a, ChildNode>>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a ChildDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(ChildNode::Leaf(desc)) => return Some(desc),
                Some(ChildNode::Sequence(nodes)) => self.stack.push(nodes.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(name: &str) -> ChildNode {
        ChildNode::leaf(json!({ "name": name }).as_object().unwrap().clone())
    }

    fn names(node: &ChildNode) -> Vec<String> {
        node.leaves()
            .map(|d| d.props().unwrap()["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn flattens_in_order_at_any_depth() {
        let tree = ChildNode::sequence([
            named("a"),
            ChildNode::sequence([named("b"), ChildNode::sequence([named("c")])]),
            ChildNode::sequence([]),
            named("d"),
        ]);
        assert_eq!(names(&tree), vec!["a", "b", "c", "d"]);
        assert_eq!(tree.leaf_count(), 4);
    }

    #[test]
    fn single_leaf_is_its_own_flattening() {
        let node = named("solo");
        assert_eq!(names(&node), vec!["solo"]);
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let mut node = named("deep");
        for _ in 0..50_000 {
            node = ChildNode::Sequence(vec![node]);
        }
        assert_eq!(node.leaf_count(), 1);
        // Dropping a 50k-deep tree recursively would overflow; unwind it by hand.
        let mut current = node;
        while let ChildNode::Sequence(mut inner) = current {
            current = match inner.pop() {
                Some(next) => next,
                None => break,
            };
        }
    }

    #[test]
    fn json_arrays_and_props_objects() {
        let node: ChildNode = serde_json::from_value(json!([
            { "props": { "coordinates": [1, 2] } },
            [{ "type": "div" }, { "props": {} }]
        ]))
        .unwrap();
        let leaves: Vec<&ChildDescriptor> = node.leaves().collect();
        assert_eq!(leaves.len(), 3);
        assert!(leaves[0].is_geographic());
        assert_eq!(leaves[1].props(), None);
        assert_eq!(leaves[2].props(), Some(&PropertyBag::new()));
        assert!(!leaves[2].is_geographic());
    }

    #[test]
    fn primitive_children_become_non_geographic_leaves() {
        let node: ChildNode = serde_json::from_value(json!([
            "Test",
            false,
            42,
            null,
            { "props": { "coordinates": [1, 2] } }
        ]))
        .unwrap();
        let leaves: Vec<&ChildDescriptor> = node.leaves().collect();
        assert_eq!(leaves.len(), 5);
        assert!(leaves[..4].iter().all(|d| d.props().is_none()));
        assert!(leaves[4].is_geographic());
    }

    #[test]
    fn non_geographic_count_ignores_bags_with_content() {
        let node: ChildNode = serde_json::from_value(json!([
            { "props": { "type": "Polygon" } },
            { "props": {} },
            "text"
        ]))
        .unwrap();
        assert_eq!(node.non_geographic_count(), 2);
    }

    #[test]
    fn non_object_props_are_ignored() {
        let node: ChildNode = serde_json::from_value(json!({ "props": "marker" })).unwrap();
        assert_eq!(node, ChildNode::Leaf(ChildDescriptor::non_geographic()));
    }
}
