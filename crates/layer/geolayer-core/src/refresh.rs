//! Strategies for recomputing a layer's data on update.
//!
//! The controller asks its strategy for the collection to push on every pass and
//! always replaces the source's data with it. [`FullReplace`] recomputes from
//! scratch (O(total features) per update); an incremental strategy can be swapped
//! in through [`LayerController::with_refresh`] without changing the controller.
//!
//! [`LayerController::with_refresh`]: crate::controller::LayerController::with_refresh

use crate::child::ChildNode;
use crate::feature::FeatureCollection;

pub trait DataRefresh {
    /// Collection to push for the current children.
    fn refresh(&mut self, children: Option<&ChildNode>) -> FeatureCollection;
}

/// Recompute the whole collection from the current children on every pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullReplace;

impl DataRefresh for FullReplace {
    fn refresh(&mut self, children: Option<&ChildNode>) -> FeatureCollection {
        FeatureCollection::from_children(children)
    }
}

impl<F> DataRefresh for F
where
    F: FnMut(Option<&ChildNode>) -> FeatureCollection,
{
    fn refresh(&mut self, children: Option<&ChildNode>) -> FeatureCollection {
        self(children)
    }
}
