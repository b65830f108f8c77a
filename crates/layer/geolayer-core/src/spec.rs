//! Layer and source specs in the engine's option vocabulary.
//!
//! Callers describe a layer with style-facing names ([`LayerConfig`]); the engine
//! expects its own names ([`LayerSpec`]):
//!
//! | caller field  | engine field   |
//! |---------------|----------------|
//! | `minZoom`     | `minzoom`      |
//! | `maxZoom`     | `maxzoom`      |
//! | `sourceLayer` | `source-layer` |
//! | `sourceId`    | `source`       |
//! | `layerRef`    | `ref`          |
//!
//! Every other field is forwarded verbatim, except `before` (second argument of
//! add-layer) and `geoJSONSourceOptions` (spread into the [`SourceSpec`]).

use log::warn;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::LayerError;
use crate::feature::FeatureCollection;

/// Caller-supplied GeoJSON source options (maxzoom, buffer, tolerance, cluster, ...),
/// forwarded verbatim.
pub type GeoJsonSourceOptions = Map<String, JsonValue>;

/// Host keys that configure the controller itself and are never forwarded to the engine.
const CONSUMED_KEYS: &[&str] = &["children", "images"];

/// Highest zoom level the engine accepts.
pub const MAX_ZOOM_LEVEL: f64 = 24.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerType {
    Background,
    Fill,
    Line,
    #[default]
    Symbol,
    Circle,
    Heatmap,
    FillExtrusion,
    Raster,
    Hillshade,
    Sky,
}

/// Declarative layer configuration, using the caller's field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub layer_type: LayerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub paint: Map<String, JsonValue>,
    #[serde(default)]
    pub layout: Map<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    /// Overrides `source` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_ref: Option<String>,
    /// Id of the layer to insert before. Never part of the layer options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(
        rename = "geoJSONSourceOptions",
        alias = "geoJsonSourceOptions",
        default,
        skip_serializing_if = "Map::is_empty"
    )]
    pub geojson_source_options: GeoJsonSourceOptions,
    /// Unrecognised fields, forwarded verbatim to the engine.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl LayerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a host configuration document.
    pub fn from_json_str(s: &str) -> Result<Self, LayerError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_value(value: JsonValue) -> Result<Self, LayerError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, layer_type: LayerType) -> Self {
        self.layer_type = layer_type;
        self
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_before(mut self, before: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self
    }

    pub fn with_paint(mut self, paint: Map<String, JsonValue>) -> Self {
        self.paint = paint;
        self
    }

    pub fn with_layout(mut self, layout: Map<String, JsonValue>) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_filter(mut self, filter: JsonValue) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_zoom_range(mut self, min: impl Into<Number>, max: impl Into<Number>) -> Self {
        self.min_zoom = Some(min.into());
        self.max_zoom = Some(max.into());
        self
    }

    pub fn with_geojson_source_options(mut self, options: GeoJsonSourceOptions) -> Self {
        self.geojson_source_options = options;
        self
    }

    /// Keys in the config that are not forwarded to the engine. Images and
    /// children travel through the controller, not through the config.
    pub fn ignored_keys(&self) -> Vec<&str> {
        self.extra
            .keys()
            .map(String::as_str)
            .filter(|key| CONSUMED_KEYS.contains(key))
            .collect()
    }

    /// Check the config before any engine call is made.
    pub fn validate(&self) -> Result<(), LayerError> {
        let min = zoom_level("minZoom", self.min_zoom.as_ref())?;
        let max = zoom_level("maxZoom", self.max_zoom.as_ref())?;
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(LayerError::Config(format!(
                    "minZoom ({min}) must not exceed maxZoom ({max})"
                )));
            }
        }

        for (name, value) in [
            ("id", &self.id),
            ("sourceId", &self.source_id),
            ("before", &self.before),
        ] {
            if value.as_deref() == Some("") {
                return Err(LayerError::Config(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

fn zoom_level(name: &str, value: Option<&Number>) -> Result<Option<f64>, LayerError> {
    let Some(number) = value else {
        return Ok(None);
    };
    match number.as_f64() {
        Some(z) if z.is_finite() && (0.0..=MAX_ZOOM_LEVEL).contains(&z) => Ok(Some(z)),
        _ => Err(LayerError::Config(format!(
            "{name} must be within 0..={MAX_ZOOM_LEVEL}, got {number}"
        ))),
    }
}

/// Layer options in the engine's vocabulary.
///
/// `id` and `source` are always emitted (as `null` when unset); the remaining
/// optional fields are omitted when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    pub layout: Map<String, JsonValue>,
    pub paint: Map<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<Number>,
    #[serde(rename = "source-layer", default, skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub layer_ref: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Translate a layer config into engine options plus the insert-before id.
pub fn build_layer_spec(config: &LayerConfig) -> (LayerSpec, Option<String>) {
    for key in config.ignored_keys() {
        warn!("layer config key {key:?} is ignored; pass it to the controller instead");
    }
    let extra = config
        .extra
        .iter()
        .filter(|(key, _)| !CONSUMED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let spec = LayerSpec {
        id: config.id.clone(),
        source: config.source_id.clone().or_else(|| config.source.clone()),
        layer_type: config.layer_type,
        layout: config.layout.clone(),
        paint: config.paint.clone(),
        metadata: config.metadata.clone(),
        interactive: config.interactive,
        filter: config.filter.clone(),
        minzoom: config.min_zoom.clone(),
        maxzoom: config.max_zoom.clone(),
        source_layer: config.source_layer.clone(),
        layer_ref: config.layer_ref.clone(),
        extra,
    };
    (spec, config.before.clone())
}

/// GeoJSON source payload for add-source.
///
/// Serializes as `{ "type": "geojson", ...options, "data": <collection> }`.
/// Caller options never replace `type` or `data`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSpec {
    pub options: GeoJsonSourceOptions,
    pub data: FeatureCollection,
}

impl SourceSpec {
    pub const SOURCE_TYPE: &'static str = "geojson";
}

pub fn build_source_spec(data: FeatureCollection, options: &GeoJsonSourceOptions) -> SourceSpec {
    SourceSpec {
        options: options.clone(),
        data,
    }
}

impl Serialize for SourceSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let forwarded = self
            .options
            .iter()
            .filter(|(key, _)| key.as_str() != "type" && key.as_str() != "data");

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", Self::SOURCE_TYPE)?;
        for (key, value) in forwarded {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("data", &self.data)?;
        map.end()
    }
}
