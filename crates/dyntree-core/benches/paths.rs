use criterion::{criterion_group, criterion_main, Criterion};
use dyntree_core::path::{resolve, Path, PathConfig, Picker, ResolveCache};
use dyntree_core::{NodeId, Tree};
use std::hint::black_box;

/// `{"groups":[{"name":..,"items":[{"id":..,"value":..}, ...]}, ...]}`
fn build(tree: &mut Tree, groups: usize, items: usize) -> NodeId {
    let root = tree.create();
    let list = tree.set_field(root, "groups", None).unwrap();
    tree.set_array(list).unwrap();
    for g in 0..groups {
        let group = tree.append(list, None).unwrap();
        tree.set_field_string(group, "name", format!("group-{g}")).unwrap();
        let entries = tree.set_field(group, "items", None).unwrap();
        tree.set_array(entries).unwrap();
        for i in 0..items {
            let item = tree.append(entries, None).unwrap();
            tree.set_field_number(item, "id", (g * items + i) as f64).unwrap();
            tree.set_field_number(item, "value", i as f64 * 0.5).unwrap();
        }
    }
    root
}

fn bench_paths(c: &mut Criterion) {
    let mut tree = Tree::new();
    let root = build(&mut tree, 50, 40);
    let config = PathConfig::default();
    let exact: Vec<Path> = (0..40)
        .map(|i| Path::parse(&format!("groups/49/items/{i}/value"), &config))
        .collect();

    c.bench_function("resolve_exact", |b| {
        b.iter(|| {
            for path in &exact {
                black_box(resolve(&tree, root, path));
            }
        })
    });

    c.bench_function("resolve_cached", |b| {
        let mut cache = ResolveCache::new();
        b.iter(|| {
            for path in &exact {
                black_box(cache.resolve(&tree, root, path));
            }
        })
    });

    let pattern = Path::parse("groups/*/items/*/value", &config);
    c.bench_function("pick_wildcard", |b| {
        b.iter(|| black_box(Picker::new(&tree, root, pattern.clone()).count()))
    });
}

criterion_group!(benches, bench_paths);
criterion_main!(benches);
