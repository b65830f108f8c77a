//! Engine contract for map integrations.
//!
//! The mapping engine is an externally owned, stateful runtime. The controller
//! only needs a small capability set from it:
//!
//! - **add source** with a GeoJSON [`SourceSpec`]
//! - **add layer** with a [`LayerSpec`] and an optional insert-before id
//! - **add image**, once per image
//! - **get source**, then replace its data through [`GeoJsonSource::set_data`]
//! - **on**, to subscribe a handler to an engine event
//!
//! Implementations are handed to [`LayerController::new`] as a handle; a handle is
//! typically a cheap clone of a shared map object (a JS map reference, or an
//! `Rc<RefCell<_>>` in test doubles). Image and handler types are left to the
//! engine, so the controller never has to interpret them.
//!
//! [`LayerController::new`]: crate::controller::LayerController::new

use crate::error::EngineError;
use crate::feature::FeatureCollection;
use crate::spec::{LayerSpec, SourceSpec};

/// A GeoJSON source that already exists in the engine.
pub trait GeoJsonSource {
    /// Replace the entire data of the source.
    fn set_data(&mut self, data: &FeatureCollection) -> Result<(), EngineError>;
}

pub trait MapEngine {
    /// Image descriptor accepted by [`MapEngine::add_image`].
    type Image;
    /// Event handler accepted by [`MapEngine::on`].
    type Handler;
    /// Source handle returned by [`MapEngine::get_source`].
    type Source<'a>: GeoJsonSource
    where
        Self: 'a;

    fn add_source(&mut self, id: Option<&str>, spec: &SourceSpec) -> Result<(), EngineError>;

    fn add_layer(&mut self, spec: &LayerSpec, before: Option<&str>) -> Result<(), EngineError>;

    fn add_image(&mut self, image: &Self::Image) -> Result<(), EngineError>;

    /// Look up a source by id. `Ok(None)` when the engine has no such source.
    fn get_source(&mut self, id: Option<&str>) -> Result<Option<Self::Source<'_>>, EngineError>;

    fn on(&mut self, event: &str, handler: Self::Handler) -> Result<(), EngineError>;
}
