//! Plain-data image descriptors for engines that accept images as data.
//!
//! Images are opaque to the controller: it forwards whatever [`MapEngine::Image`]
//! values it was given, once each, in order. Engines without a richer native type
//! can use [`ImageDescriptor`].
//!
//! JSON forms (untagged):
//!   "marker-15"                                                  -> Named
//!   { "id": "dot", "width": 2, "height": 1, "data": [..8 bytes..] } -> Bitmap
//!   anything else                                                -> Definition
//!
//! [`MapEngine::Image`]: crate::engine::MapEngine::Image

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageDescriptor {
    /// Identifier of an image the engine already knows how to resolve.
    Named(String),
    /// Raw RGBA pixels.
    Bitmap {
        id: String,
        width: u32,
        height: u32,
        data: Vec<u8>,
    },
    /// Engine-specific definition passed through unchanged.
    Definition(JsonValue),
}

impl ImageDescriptor {
    pub fn named(id: impl Into<String>) -> Self {
        ImageDescriptor::Named(id.into())
    }

    /// Identifier when the descriptor carries one.
    pub fn id(&self) -> Option<&str> {
        match self {
            ImageDescriptor::Named(id) => Some(id),
            ImageDescriptor::Bitmap { id, .. } => Some(id),
            ImageDescriptor::Definition(def) => def.get("id").and_then(JsonValue::as_str),
        }
    }

    /// True when a bitmap's buffer holds exactly `width * height` RGBA pixels.
    pub fn is_well_formed(&self) -> bool {
        match self {
            ImageDescriptor::Bitmap {
                width,
                height,
                data,
                ..
            } => (*width as usize) * (*height as usize) * 4 == data.len(),
            _ => true,
        }
    }
}
