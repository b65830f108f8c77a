use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use geolayer_core::{ChildNode, ImageDescriptor, LayerConfig};

pub mod recording;

pub use recording::{EngineCall, RecordingEngine, RecordingHandler, RecordingSource};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    layers: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// A recorded host session for one layer: config, initial children, images,
/// the children of every later update, and the engine payloads expected for it.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerScenario {
    #[serde(default)]
    pub config: JsonValue,
    #[serde(default)]
    pub children: Option<ChildNode>,
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,
    #[serde(default)]
    pub updates: Vec<Option<ChildNode>>,
    #[serde(default)]
    pub expected: ExpectedCalls,
}

/// Payloads the engine should receive. Missing entries are not checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpectedCalls {
    #[serde(default)]
    pub add_source: Option<JsonValue>,
    #[serde(default)]
    pub add_layer: Option<JsonValue>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub set_data: Vec<JsonValue>,
}

impl LayerScenario {
    pub fn layer_config(&self) -> Result<LayerConfig> {
        LayerConfig::from_json_value(self.config.clone())
            .map_err(|e| anyhow!("scenario config rejected: {e}"))
    }
}

pub mod layers {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.layers.keys().cloned().collect()
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.layers, "layer", name)?;
        super::load_json(rel)
    }

    pub fn scenario(name: &str) -> Result<LayerScenario> {
        load(name)
    }
}
