//! geolayer-wasm: drive a JavaScript map object (mapbox-gl style API) from geolayer-core.
//!
//! The map is looked up dynamically: `addSource`, `addLayer`, `addImage`, `getSource`
//! and `on` are read off the object with `Reflect` and called with the map as `this`.
//! Payloads cross the boundary as JSON.
//!
//! ```js
//! const layer = new GeoLayer(map, { id: "stops", layout: { "icon-image": "bus" } });
//! layer.add_image(["bus", busImage]);
//! layer.on("click", (ev) => console.log(ev));
//! layer.mount([{ props: { coordinates: [-123, 45] } }]);
//! layer.update(undefined); // pushes an empty collection
//! ```

mod engine;

use js_sys::{Function, JSON};
use wasm_bindgen::prelude::*;

use geolayer_core::{ChildNode, LayerConfig, LayerController};

pub use engine::{JsMapEngine, JsSource};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn stringify(value: &JsValue, what: &str) -> Result<String, JsError> {
    JSON::stringify(value)
        .map_err(|e| JsError::new(&format!("{what} stringify error: {:?}", e)))?
        .as_string()
        .ok_or_else(|| JsError::new(&format!("{what}: stringify produced non-string")))
}

fn children_from_js(children: &JsValue) -> Result<Option<ChildNode>, JsError> {
    if jsvalue_is_undefined_or_null(children) {
        return Ok(None);
    }
    let s = stringify(children, "children")?;
    serde_json::from_str(&s)
        .map(Some)
        .map_err(|e| JsError::new(&format!("children parse error: {e}")))
}

#[wasm_bindgen]
pub struct GeoLayer {
    core: LayerController<JsMapEngine>,
}

#[wasm_bindgen]
impl GeoLayer {
    /// Wrap `map` with a layer described by `config` (undefined/null for defaults).
    ///
    /// `images` and `children` keys in `config` are ignored: register images
    /// with `add_image` and pass children to `mount`/`update`.
    #[wasm_bindgen(constructor)]
    pub fn new(map: JsValue, config: JsValue) -> Result<GeoLayer, JsError> {
        #[cfg(feature = "console_error")]
        console_error_panic_hook::set_once();

        if jsvalue_is_undefined_or_null(&map) {
            return Err(JsError::new("GeoLayer: map is null/undefined"));
        }
        let cfg = if jsvalue_is_undefined_or_null(&config) {
            LayerConfig::default()
        } else {
            let s = stringify(&config, "config")?;
            LayerConfig::from_json_str(&s).map_err(|e| JsError::new(&e.to_string()))?
        };

        Ok(GeoLayer {
            core: LayerController::new(JsMapEngine::new(map), cfg),
        })
    }

    /// Queue an image for mount. An array is spread into `addImage`'s arguments.
    #[wasm_bindgen(js_name = add_image)]
    pub fn add_image(&mut self, image: JsValue) {
        self.core.add_image(image);
    }

    /// Queue an event subscription for mount.
    #[wasm_bindgen]
    pub fn on(&mut self, event: String, handler: Function) {
        self.core.subscribe(event, handler);
    }

    #[wasm_bindgen]
    pub fn mount(&mut self, children: JsValue) -> Result<(), JsError> {
        let children = children_from_js(&children)?;
        self.core
            .mount(children.as_ref())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn update(&mut self, children: JsValue) -> Result<(), JsError> {
        let children = children_from_js(&children)?;
        self.core
            .update(children.as_ref())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen(getter, js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.core.is_mounted()
    }

    /// Number of features in the last collection pushed to the map.
    #[wasm_bindgen(getter, js_name = featureCount)]
    pub fn feature_count(&self) -> usize {
        self.core.last_pushed().map_or(0, |fc| fc.len())
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
