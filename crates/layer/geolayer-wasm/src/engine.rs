use js_sys::{Array, Function, Reflect, JSON};
use log::trace;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};

use geolayer_core::{
    EngineError, FeatureCollection, GeoJsonSource, LayerSpec, MapEngine, SourceSpec,
};

fn js_err(err: JsValue) -> EngineError {
    EngineError::new(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn opt_str(value: Option<&str>) -> JsValue {
    value.map_or(JsValue::UNDEFINED, JsValue::from_str)
}

/// Serialize through JSON so maps arrive as plain JS objects.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, EngineError> {
    let text = serde_json::to_string(value).map_err(|e| EngineError::new(e.to_string()))?;
    JSON::parse(&text).map_err(js_err)
}

fn method(target: &JsValue, name: &str) -> Result<Function, EngineError> {
    Reflect::get(target, &JsValue::from_str(name))
        .map_err(js_err)?
        .dyn_into::<Function>()
        .map_err(|_| EngineError::new(format!("{name} is not a function")))
}

/// [`MapEngine`] over a JavaScript map object. Cloning shares the same map.
#[derive(Debug, Clone)]
pub struct JsMapEngine {
    map: JsValue,
}

impl JsMapEngine {
    pub fn new(map: JsValue) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &JsValue {
        &self.map
    }

    fn call(&self, name: &str, args: &Array) -> Result<JsValue, EngineError> {
        trace!("map.{name}({} args)", args.length());
        method(&self.map, name)?
            .apply(&self.map, args)
            .map_err(js_err)
    }
}

/// Source object returned by `map.getSource(id)`.
#[derive(Debug, Clone)]
pub struct JsSource {
    source: JsValue,
}

impl GeoJsonSource for JsSource {
    fn set_data(&mut self, data: &FeatureCollection) -> Result<(), EngineError> {
        let data = to_js(data)?;
        method(&self.source, "setData")?
            .call1(&self.source, &data)
            .map_err(js_err)?;
        Ok(())
    }
}

impl MapEngine for JsMapEngine {
    type Image = JsValue;
    type Handler = Function;
    type Source<'a>
        = JsSource
    where
        Self: 'a;

    fn add_source(&mut self, id: Option<&str>, spec: &SourceSpec) -> Result<(), EngineError> {
        let args = Array::of2(&opt_str(id), &to_js(spec)?);
        self.call("addSource", &args).map(drop)
    }

    fn add_layer(&mut self, spec: &LayerSpec, before: Option<&str>) -> Result<(), EngineError> {
        let options = to_js(spec)?;
        // Unset ids travel as `undefined`, not `null`.
        if spec.id.is_none() {
            Reflect::set(&options, &"id".into(), &JsValue::UNDEFINED).map_err(js_err)?;
        }
        if spec.source.is_none() {
            Reflect::set(&options, &"source".into(), &JsValue::UNDEFINED).map_err(js_err)?;
        }
        let args = Array::of2(&options, &opt_str(before));
        self.call("addLayer", &args).map(drop)
    }

    fn add_image(&mut self, image: &JsValue) -> Result<(), EngineError> {
        let args = match image.dyn_ref::<Array>() {
            Some(spread) => spread.clone(),
            None => Array::of1(image),
        };
        self.call("addImage", &args).map(drop)
    }

    fn get_source(&mut self, id: Option<&str>) -> Result<Option<JsSource>, EngineError> {
        let source = self.call("getSource", &Array::of1(&opt_str(id)))?;
        if source.is_undefined() || source.is_null() {
            return Ok(None);
        }
        Ok(Some(JsSource { source }))
    }

    fn on(&mut self, event: &str, handler: Function) -> Result<(), EngineError> {
        let args = Array::of2(&JsValue::from_str(event), &handler);
        self.call("on", &args).map(drop)
    }
}
