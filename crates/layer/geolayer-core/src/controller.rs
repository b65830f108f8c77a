//! Synchronization controller: keeps one engine layer in step with its declarative description.
//!
//! Lifecycle:
//!
//! ```text
//!   Unmounted ──mount(children)──► Mounted ──update(children)──► Mounted
//! ```
//!
//! Mount issues, in order:
//!   1. add_source(id, { type: "geojson", ...geoJSONSourceOptions, data: <empty> })
//!   2. add_layer(layer spec, before)
//!   3. add_image(image) for each image, in order
//!   4. on(event, handler) for each subscription, in declaration order
//!   5. get_source(id).set_data(<collection from children>)
//!
//! The controller counts as mounted once steps 1 and 2 succeed. A failure there
//! leaves it unmounted with its images and subscriptions untouched. A failure in steps 3 to 5 is returned with the controller
//! mounted: `update` re-pushes data, and subscriptions after a rejected one stay
//! queued (see [`LayerController::pending_subscriptions`]).
//!
//! Update recomputes the collection through the [`DataRefresh`] strategy and
//! replaces the source's data in full. Layer options and images are not
//! re-synchronized after mount.

use log::{debug, trace, warn};

use crate::child::ChildNode;
use crate::engine::{GeoJsonSource, MapEngine};
use crate::error::LayerError;
use crate::feature::FeatureCollection;
use crate::refresh::{DataRefresh, FullReplace};
use crate::spec::{build_layer_spec, build_source_spec, LayerConfig};

/// Identifiers the controller created in the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerState {
    Unmounted,
    Mounted {
        source_id: Option<String>,
        layer_id: Option<String>,
    },
}

pub struct LayerController<E: MapEngine, R = FullReplace> {
    engine: E,
    config: LayerConfig,
    images: Vec<E::Image>,
    events: Vec<(String, E::Handler)>,
    refresh: R,
    state: LayerState,
    last_pushed: Option<FeatureCollection>,
}

impl<E: MapEngine> LayerController<E, FullReplace> {
    /// Create an unmounted controller driving `engine`.
    pub fn new(engine: E, config: LayerConfig) -> Self {
        Self {
            engine,
            config,
            images: Vec::new(),
            events: Vec::new(),
            refresh: FullReplace,
            state: LayerState::Unmounted,
            last_pushed: None,
        }
    }
}

impl<E: MapEngine, R: DataRefresh> LayerController<E, R> {
    /// Images registered on mount, in order.
    pub fn with_images(mut self, images: impl IntoIterator<Item = E::Image>) -> Self {
        self.images.extend(images);
        self
    }

    /// Declare an event subscription, registered on mount.
    pub fn with_event(mut self, event: impl Into<String>, handler: E::Handler) -> Self {
        self.subscribe(event, handler);
        self
    }

    /// Queue an image for registration on mount. Images queued after mount are
    /// kept but never sent to the engine.
    pub fn add_image(&mut self, image: E::Image) {
        if self.is_mounted() {
            debug!("add_image after mount: image list is not re-synchronized");
        }
        self.images.push(image);
    }

    /// Queue an event subscription for registration on mount.
    pub fn subscribe(&mut self, event: impl Into<String>, handler: E::Handler) {
        let event = event.into();
        if self.is_mounted() {
            debug!("subscribe({event:?}) after mount: subscription is not registered");
        }
        self.events.push((event, handler));
    }

    /// Swap the data refresh strategy.
    pub fn with_refresh<R2: DataRefresh>(self, refresh: R2) -> LayerController<E, R2> {
        LayerController {
            engine: self.engine,
            config: self.config,
            images: self.images,
            events: self.events,
            refresh,
            state: self.state,
            last_pushed: self.last_pushed,
        }
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn state(&self) -> &LayerState {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.state, LayerState::Mounted { .. })
    }

    /// Subscriptions not handed to the engine yet.
    pub fn pending_subscriptions(&self) -> usize {
        self.events.len()
    }

    /// The collection most recently handed to the engine.
    pub fn last_pushed(&self) -> Option<&FeatureCollection> {
        self.last_pushed.as_ref()
    }

    /// Create the source, layer, images and subscriptions, then push the initial data.
    pub fn mount(&mut self, children: Option<&ChildNode>) -> Result<(), LayerError> {
        if self.is_mounted() {
            return Err(LayerError::AlreadyMounted);
        }
        self.config.validate()?;

        let source_id = self.config.id.clone();
        let source_spec = build_source_spec(
            FeatureCollection::empty(),
            &self.config.geojson_source_options,
        );
        let (layer_spec, before) = build_layer_spec(&self.config);
        debug!(
            "mount: layer {:?} ({:?}) on source {:?}",
            layer_spec.id, layer_spec.layer_type, source_id
        );

        self.engine
            .add_source(source_id.as_deref(), &source_spec)
            .map_err(LayerError::engine("add_source"))
            .inspect_err(log_failure)?;
        self.engine
            .add_layer(&layer_spec, before.as_deref())
            .map_err(LayerError::engine("add_layer"))
            .inspect_err(log_failure)?;

        self.state = LayerState::Mounted {
            source_id,
            layer_id: layer_spec.id,
        };

        for (index, image) in self.images.iter().enumerate() {
            trace!("mount: add_image #{index}");
            self.engine
                .add_image(image)
                .map_err(LayerError::engine("add_image"))
                .inspect_err(log_failure)?;
        }
        self.register_subscriptions()?;
        self.push(children)
    }

    /// Recompute the collection from the current children and replace the source's data.
    pub fn update(&mut self, children: Option<&ChildNode>) -> Result<(), LayerError> {
        if !self.is_mounted() {
            return Err(LayerError::NotMounted);
        }
        self.push(children)
    }

    /// Hand queued subscriptions to the engine. On failure the subscriptions
    /// after the rejected one stay queued.
    fn register_subscriptions(&mut self) -> Result<(), LayerError> {
        let mut pending = std::mem::take(&mut self.events).into_iter();
        while let Some((event, handler)) = pending.next() {
            trace!("mount: subscribe to {event:?}");
            if let Err(err) = self.engine.on(&event, handler) {
                self.events.extend(pending);
                let err = LayerError::engine("on")(err);
                log_failure(&err);
                return Err(err);
            }
        }
        Ok(())
    }

    fn push(&mut self, children: Option<&ChildNode>) -> Result<(), LayerError> {
        let LayerState::Mounted { source_id, .. } = &self.state else {
            return Err(LayerError::NotMounted);
        };
        let collection = self.refresh.refresh(children);
        debug!(
            "push: {} features to source {:?}",
            collection.len(),
            source_id
        );

        let mut source = self
            .engine
            .get_source(source_id.as_deref())
            .map_err(LayerError::engine("get_source"))
            .inspect_err(log_failure)?
            .ok_or_else(|| LayerError::MissingSource(source_id.clone().unwrap_or_default()))
            .inspect_err(log_failure)?;
        source
            .set_data(&collection)
            .map_err(LayerError::engine("set_data"))
            .inspect_err(log_failure)?;
        drop(source);

        self.last_pushed = Some(collection);
        Ok(())
    }
}

fn log_failure(err: &LayerError) {
    warn!("layer sync failed: {err}");
}

impl<E, R> std::fmt::Debug for LayerController<E, R>
where
    E: MapEngine,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerController")
            .field("config", &self.config)
            .field("images", &self.images.len())
            .field("pending_events", &self.events.len())
            .field("state", &self.state)
            .field("last_pushed", &self.last_pushed.as_ref().map(FeatureCollection::len))
            .finish()
    }
}
