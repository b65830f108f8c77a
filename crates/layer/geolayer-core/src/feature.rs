//! GeoJSON features extracted from child descriptors.
//!
//! Serialized shapes:
//!   Feature:           { "type": "Feature", "geometry": { ...bag, "type": "Point" }, "properties": { "id": 0 } }
//!   FeatureCollection: { "type": "FeatureCollection", "features": [ ... ] }
//!
//! Merge precedence for the geometry is explicit: the child's property bag is
//! copied first, then the structural `type` member is written over it. The bag
//! is not copied into `properties`, which only holds the positional id.

use log::{log_enabled, trace, Level};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::child::{ChildDescriptor, ChildNode, PropertyBag};

/// Geometry type written on every extracted feature.
pub const POINT: &str = "Point";

/// Point geometry: the full property bag of a child plus `type: "Point"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Geometry(Map<String, JsonValue>);

impl Geometry {
    /// Merge a property bag into a point geometry. A missing bag gives `{ "type": "Point" }`.
    pub fn from_bag(bag: Option<&PropertyBag>) -> Self {
        let mut members = bag.cloned().unwrap_or_default();
        members.insert("type".to_string(), JsonValue::String(POINT.to_string()));
        Geometry(members)
    }

    /// Point geometry at `[lng, lat]`.
    pub fn point(lng: f64, lat: f64) -> Self {
        let mut bag = PropertyBag::new();
        bag.insert("coordinates".to_string(), serde_json::json!([lng, lat]));
        Self::from_bag(Some(&bag))
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(JsonValue::as_str)
    }

    /// Raw member lookup, including any custom geometry extension fields.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }
}

/// Feature properties. Only the positional id is carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub id: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

impl Feature {
    /// Build the feature for the descriptor at position `index` of the flattened children.
    pub fn from_descriptor(index: usize, desc: &ChildDescriptor) -> Self {
        Self {
            geometry: Geometry::from_bag(desc.props()),
            properties: FeatureProperties { id: index },
        }
    }

    pub fn id(&self) -> usize {
        self.properties.id
    }

    /// `[lng, lat]` when the geometry holds a numeric coordinate pair.
    pub fn coordinates(&self) -> Option<[f64; 2]> {
        match self.geometry.get("coordinates")?.as_array()?.as_slice() {
            [lng, lat] => Some([lng.as_f64()?, lat.as_f64()?]),
            _ => None,
        }
    }
}

/// Flatten `children` and convert every descriptor into a [`Feature`].
///
/// Never fails: absent children give an empty vector and descriptors without a
/// usable bag give a degenerate point with no coordinates.
pub fn extract_features(children: Option<&ChildNode>) -> Vec<Feature> {
    let Some(children) = children else {
        return Vec::new();
    };
    let features: Vec<Feature> = children
        .leaves()
        .enumerate()
        .map(|(index, desc)| Feature::from_descriptor(index, desc))
        .collect();

    if log_enabled!(Level::Trace) {
        let degenerate = children.non_geographic_count();
        if degenerate > 0 {
            trace!(
                "extract_features: {} of {} children carried no properties",
                degenerate,
                features.len()
            );
        }
    }
    features
}

/// Ordered set of features. `features` is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Recompute the collection from the current children.
    pub fn from_children(children: Option<&ChildNode>) -> Self {
        Self::new(extract_features(children))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(props: JsonValue) -> ChildNode {
        ChildNode::Leaf(ChildDescriptor::from_json(props))
    }

    #[test]
    fn single_child_becomes_point_feature() {
        let children = ChildNode::sequence([leaf(json!({ "coordinates": [-123, 45] }))]);
        let fc = FeatureCollection::from_children(Some(&children));
        assert_eq!(
            serde_json::to_value(&fc).unwrap(),
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": { "coordinates": [-123, 45], "type": "Point" },
                    "properties": { "id": 0 }
                }]
            })
        );
        assert_eq!(fc.features[0].coordinates(), Some([-123.0, 45.0]));
    }

    #[test]
    fn absent_children_give_empty_collection() {
        let fc = FeatureCollection::from_children(None);
        assert!(fc.is_empty());
        assert_eq!(
            serde_json::to_value(&fc).unwrap(),
            json!({ "type": "FeatureCollection", "features": [] })
        );
    }

    #[test]
    fn nested_children_count_every_leaf() {
        let children = ChildNode::sequence([
            leaf(json!({ "children": "Test" })),
            ChildNode::sequence([leaf(json!({ "children": "Test" })), leaf(json!({}))]),
        ]);
        let features = extract_features(Some(&children));
        assert_eq!(features.len(), 3);
        let ids: Vec<usize> = features.iter().map(Feature::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn empty_or_missing_bag_degenerates_to_bare_point() {
        let children = ChildNode::sequence([
            leaf(json!({})),
            ChildNode::Leaf(ChildDescriptor::non_geographic()),
        ]);
        for feature in extract_features(Some(&children)) {
            assert_eq!(serde_json::to_value(&feature.geometry).unwrap(), json!({ "type": "Point" }));
            assert_eq!(feature.coordinates(), None);
        }
    }

    #[test]
    fn structural_fields_win_over_bag() {
        let children = ChildNode::sequence([
            leaf(json!({ "coordinates": [0, 0] })),
            leaf(json!({ "type": "Polygon", "id": 99, "coordinates": [1, 2], "radius": 4 })),
        ]);
        let features = extract_features(Some(&children));
        let second = &features[1];
        assert_eq!(second.geometry.kind(), Some("Point"));
        assert_eq!(second.geometry.get("id"), Some(&json!(99)));
        assert_eq!(second.geometry.get("radius"), Some(&json!(4)));
        assert_eq!(second.id(), 1);
        assert_eq!(serde_json::to_value(second.properties).unwrap(), json!({ "id": 1 }));
    }

    #[test]
    fn extraction_is_idempotent() {
        let children = ChildNode::sequence([
            leaf(json!({ "coordinates": [3, 4] })),
            ChildNode::sequence([leaf(json!({ "coordinates": [5, 6] }))]),
        ]);
        let first = FeatureCollection::from_children(Some(&children));
        let second = FeatureCollection::from_children(Some(&children));
        assert_eq!(first, second);
    }

    #[test]
    fn feature_collection_parses_back() {
        let parsed: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [1.5, 2.5] },
                "properties": { "id": 7 }
            }]
        }))
        .unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.features[0].id(), 7);
        assert_eq!(parsed.features[0].geometry, Geometry::point(1.5, 2.5));
    }
}
