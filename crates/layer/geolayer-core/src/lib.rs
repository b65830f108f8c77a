//! geolayer-core: declarative GeoJSON layers kept in sync with an imperative map engine.
//!
//! A caller describes a layer as data (a [`LayerConfig`], a tree of [`ChildNode`]s,
//! images and event handlers). A [`LayerController`] turns that description into the
//! engine's imperative vocabulary on mount (source, layer, images, subscriptions, data)
//! and replaces the source data on every later update.
//!
//! ```text
//!   ChildNode tree ──► extract_features() ──► FeatureCollection
//!                                                  │
//!   LayerConfig ──► build_layer_spec() ──┐         ▼
//!                                        ├──► LayerController ──► MapEngine
//!   GeoJsonSourceOptions ──► build_source_spec()
//! ```
//!
//! The engine is any [`MapEngine`] implementation handed to the controller; nothing is
//! resolved from global state.

pub mod child;
pub mod controller;
pub mod engine;
pub mod error;
pub mod feature;
pub mod image;
pub mod refresh;
pub mod spec;

pub use child::{ChildDescriptor, ChildNode, PropertyBag};
pub use controller::{LayerController, LayerState};
pub use engine::{GeoJsonSource, MapEngine};
pub use error::{EngineError, LayerError};
pub use feature::{extract_features, Feature, FeatureCollection, FeatureProperties, Geometry};
pub use image::ImageDescriptor;
pub use refresh::{DataRefresh, FullReplace};
pub use spec::{
    build_layer_spec, build_source_spec, GeoJsonSourceOptions, LayerConfig, LayerSpec,
    LayerType, SourceSpec,
};
