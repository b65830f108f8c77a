use geolayer_core::LayerController;
use geolayer_test_fixtures::{layers, LayerScenario, RecordingEngine};

fn replay(name: &str) -> (LayerScenario, RecordingEngine) {
    let scenario = layers::scenario(name).expect("scenario loads");
    let engine = RecordingEngine::new();
    let config = scenario.layer_config().expect("config parses");
    let mut layer = LayerController::new(engine.clone(), config)
        .with_images(scenario.images.iter().cloned());

    layer.mount(scenario.children.as_ref()).expect("mount ok");
    for children in &scenario.updates {
        layer.update(children.as_ref()).expect("update ok");
    }
    (scenario, engine)
}

fn check_expected(scenario: &LayerScenario, engine: &RecordingEngine, name: &str) {
    let expected = &scenario.expected;
    if let Some(source) = &expected.add_source {
        let calls = engine.add_source_calls();
        assert_eq!(calls.len(), 1, "{name}: add_source once");
        assert_eq!(&calls[0].1, source, "{name}: add_source payload");
    }
    if let Some(layer) = &expected.add_layer {
        let calls = engine.add_layer_calls();
        assert_eq!(calls.len(), 1, "{name}: add_layer once");
        assert_eq!(&calls[0].0, layer, "{name}: add_layer payload");
        assert_eq!(calls[0].1, expected.before, "{name}: before");
    }
    if !expected.set_data.is_empty() {
        assert_eq!(engine.set_data_calls(), expected.set_data, "{name}: set_data payloads");
    }
}

#[test]
fn every_fixture_replays_cleanly() {
    let mut names = layers::keys();
    names.sort();
    assert!(!names.is_empty(), "manifest lists layer fixtures");
    for name in names {
        let (scenario, engine) = replay(&name);
        check_expected(&scenario, &engine, &name);
        assert_eq!(
            engine.set_data_calls().len(),
            1 + scenario.updates.len(),
            "{name}: one push on mount plus one per update"
        );
    }
}

#[test]
fn nested_fixture_counts_every_leaf() {
    let (_, engine) = replay("nested-children");
    let counts: Vec<usize> = engine
        .set_data_calls()
        .iter()
        .map(|d| d["features"].as_array().map_or(0, Vec::len))
        .collect();
    assert_eq!(counts, vec![3, 2]);
}

#[test]
fn image_fixture_registers_images_in_order() {
    let (scenario, engine) = replay("images");
    assert_eq!(engine.add_image_calls(), scenario.images);
    assert_eq!(scenario.images.len(), 3);
}

#[test]
fn mixed_fixture_keeps_primitive_children_as_bare_points() {
    let (_, engine) = replay("mixed-children");
    let pushed = engine.set_data_calls();
    let features = pushed[0]["features"].as_array().expect("features array");
    assert_eq!(features.len(), 6);
    let with_coordinates: Vec<usize> = features
        .iter()
        .enumerate()
        .filter(|(_, f)| f["geometry"].get("coordinates").is_some())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(with_coordinates, vec![3]);
}
