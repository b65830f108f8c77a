use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geolayer_core::{ChildNode, FeatureCollection, PropertyBag};
use serde_json::json;

fn point(i: usize) -> ChildNode {
    let mut bag = PropertyBag::new();
    bag.insert("coordinates".into(), json!([i as f64 * 0.01, 45.0]));
    bag.insert("icon".into(), json!("marker"));
    ChildNode::leaf(bag)
}

fn wide(n: usize) -> ChildNode {
    ChildNode::sequence((0..n).map(point))
}

fn grouped(groups: usize, per_group: usize) -> ChildNode {
    ChildNode::sequence((0..groups).map(|g| {
        ChildNode::sequence((0..per_group).map(|i| ChildNode::sequence([point(g * per_group + i)])))
    }))
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_features");
    for &n in &[100usize, 1_000, 10_000] {
        let flat = wide(n);
        group.bench_with_input(BenchmarkId::new("flat", n), &flat, |b, tree| {
            b.iter(|| FeatureCollection::from_children(black_box(Some(tree))))
        });
        let nested = grouped(n / 10, 10);
        group.bench_with_input(BenchmarkId::new("nested", n), &nested, |b, tree| {
            b.iter(|| FeatureCollection::from_children(black_box(Some(tree))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
