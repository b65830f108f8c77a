//! In-memory [`MapEngine`] that records every call for assertions.
//!
//! The engine is a cheap handle over shared state: tests keep one clone and hand
//! another to the controller, the same way a host shares its map object.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value as JsonValue;

use geolayer_core::{
    EngineError, FeatureCollection, GeoJsonSource, ImageDescriptor, LayerSpec, MapEngine,
    SourceSpec,
};

/// Handler type accepted by [`RecordingEngine::on`]. Receives the emitted payload.
pub type RecordingHandler = Box<dyn FnMut(&JsonValue)>;

/// One engine call, with payloads captured as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    AddSource {
        id: Option<String>,
        spec: JsonValue,
    },
    AddLayer {
        spec: JsonValue,
        before: Option<String>,
    },
    AddImage(ImageDescriptor),
    GetSource(Option<String>),
    SetData {
        source: Option<String>,
        data: JsonValue,
    },
    On(String),
}

impl EngineCall {
    pub fn name(&self) -> &'static str {
        match self {
            EngineCall::AddSource { .. } => "add_source",
            EngineCall::AddLayer { .. } => "add_layer",
            EngineCall::AddImage(_) => "add_image",
            EngineCall::GetSource(_) => "get_source",
            EngineCall::SetData { .. } => "set_data",
            EngineCall::On(_) => "on",
        }
    }
}

#[derive(Default)]
struct EngineLog {
    calls: Vec<EngineCall>,
    sources: Vec<Option<String>>,
    handlers: Vec<(String, RecordingHandler)>,
    fail_on: Option<&'static str>,
}

impl EngineLog {
    fn record(&mut self, call: EngineCall) -> Result<(), EngineError> {
        let name = call.name();
        self.calls.push(call);
        match self.fail_on {
            Some(failing) if failing == name => Err(EngineError::new(format!("{name} rejected"))),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Default)]
pub struct RecordingEngine {
    log: Rc<RefCell<EngineLog>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future call named `call` (e.g. `"add_layer"`) fail after being recorded.
    pub fn fail_on(&self, call: &'static str) {
        self.log.borrow_mut().fail_on = Some(call);
    }

    /// Stop failing calls.
    pub fn clear_failure(&self) {
        self.log.borrow_mut().fail_on = None;
    }

    /// Forget a source, as if it had been removed behind the controller's back.
    pub fn remove_source(&self, id: Option<&str>) {
        self.log
            .borrow_mut()
            .sources
            .retain(|s| s.as_deref() != id);
    }

    /// Invoke every handler subscribed to `event`. Returns how many ran.
    pub fn emit(&self, event: &str, payload: &JsonValue) -> usize {
        let mut log = self.log.borrow_mut();
        let mut ran = 0;
        for (name, handler) in log.handlers.iter_mut() {
            if name.as_str() == event {
                handler(payload);
                ran += 1;
            }
        }
        ran
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.log.borrow().calls.clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.log.borrow().calls.iter().map(EngineCall::name).collect()
    }

    pub fn add_source_calls(&self) -> Vec<(Option<String>, JsonValue)> {
        self.log
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::AddSource { id, spec } => Some((id.clone(), spec.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn add_layer_calls(&self) -> Vec<(JsonValue, Option<String>)> {
        self.log
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::AddLayer { spec, before } => Some((spec.clone(), before.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn add_image_calls(&self) -> Vec<ImageDescriptor> {
        self.log
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::AddImage(image) => Some(image.clone()),
                _ => None,
            })
            .collect()
    }

    /// Data payloads passed to `set_data`, in call order.
    pub fn set_data_calls(&self) -> Vec<JsonValue> {
        self.log
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::SetData { data, .. } => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.log
            .borrow()
            .handlers
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl std::fmt::Debug for RecordingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let log = self.log.borrow();
        f.debug_struct("RecordingEngine")
            .field("calls", &log.calls)
            .field("sources", &log.sources)
            .field("handlers", &log.handlers.len())
            .finish()
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<JsonValue, EngineError> {
    serde_json::to_value(value).map_err(|e| EngineError::new(e.to_string()))
}

/// Handle to a source recorded by [`RecordingEngine`].
pub struct RecordingSource {
    id: Option<String>,
    log: Rc<RefCell<EngineLog>>,
}

impl GeoJsonSource for RecordingSource {
    fn set_data(&mut self, data: &FeatureCollection) -> Result<(), EngineError> {
        let data = to_json(data)?;
        self.log.borrow_mut().record(EngineCall::SetData {
            source: self.id.clone(),
            data,
        })
    }
}

impl MapEngine for RecordingEngine {
    type Image = ImageDescriptor;
    type Handler = RecordingHandler;
    type Source<'a>
        = RecordingSource
    where
        Self: 'a;

    fn add_source(&mut self, id: Option<&str>, spec: &SourceSpec) -> Result<(), EngineError> {
        let spec = to_json(spec)?;
        let mut log = self.log.borrow_mut();
        log.sources.push(id.map(str::to_string));
        log.record(EngineCall::AddSource {
            id: id.map(str::to_string),
            spec,
        })
    }

    fn add_layer(&mut self, spec: &LayerSpec, before: Option<&str>) -> Result<(), EngineError> {
        let spec = to_json(spec)?;
        self.log.borrow_mut().record(EngineCall::AddLayer {
            spec,
            before: before.map(str::to_string),
        })
    }

    fn add_image(&mut self, image: &ImageDescriptor) -> Result<(), EngineError> {
        self.log
            .borrow_mut()
            .record(EngineCall::AddImage(image.clone()))
    }

    fn get_source(&mut self, id: Option<&str>) -> Result<Option<RecordingSource>, EngineError> {
        let mut log = self.log.borrow_mut();
        log.record(EngineCall::GetSource(id.map(str::to_string)))?;
        if !log.sources.iter().any(|s| s.as_deref() == id) {
            return Ok(None);
        }
        Ok(Some(RecordingSource {
            id: id.map(str::to_string),
            log: Rc::clone(&self.log),
        }))
    }

    fn on(&mut self, event: &str, handler: RecordingHandler) -> Result<(), EngineError> {
        let mut log = self.log.borrow_mut();
        log.record(EngineCall::On(event.to_string()))?;
        log.handlers.push((event.to_string(), handler));
        Ok(())
    }
}
