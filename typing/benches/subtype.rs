//! Benchmarks for symbol lookup, sub-type derivation and traversal.

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use nomos_test_helpers::Fixture;
use nomos_typing::{Constant, NamespaceWalker, Registry, Symbol, SymbolId, SymbolKind, Tag, Value};

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    group.throughput(Throughput::Elements(1));

    for size in [16, 256, 4096].iter() {
        let Fixture {
            mut registry,
            string,
            ..
        } = Fixture::new().expect("fixture");
        for i in 0..*size {
            let id =
                SymbolId::try_new(&format!("c{i}"), SymbolKind::Constant).expect("valid name");
            let constant = Constant::new(string, Value::Int(i64::from(i)));
            registry
                .add_symbol(string, id, Symbol::Constant(constant))
                .expect("registers");
        }
        let middle = SymbolId::try_new(&format!("c{}", size / 2), SymbolKind::Constant)
            .expect("valid name");
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(registry.lookup(string, black_box(&middle))));
        });
    }

    group.finish();
}

fn bench_sub_type(c: &mut Criterion) {
    let mut group = c.benchmark_group("sub_type");

    for tag_count in [1, 4, 16].iter() {
        let Fixture {
            mut registry,
            string,
            ..
        } = Fixture::new().expect("fixture");
        let root = registry.root();
        for i in 0..32 {
            let id = SymbolId::try_new(&format!("c{i}"), SymbolKind::Constant).expect("valid name");
            registry
                .add_symbol(string, id, Symbol::Constant(Constant::new(string, Value::Int(i))))
                .expect("registers");
        }
        let tags: Vec<_> = (0..*tag_count)
            .map(|i| {
                registry
                    .add_tag(root, Tag::new(&format!("t{i}")).expect("valid name"))
                    .expect("registers")
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("tags", tag_count), tag_count, |b, _| {
            b.iter_batched(
                || registry.clone(),
                |mut registry| black_box(registry.sub_type(string, &tags).expect("derives")),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");

    for width in [4, 16].iter() {
        let mut registry = Registry::new();
        let root = registry.root();
        let top = registry.create_namespace(root, "top").expect("registers");
        let mut count = 1;
        for i in 0..*width {
            let branch = registry.create_namespace(top, &format!("b{i}")).expect("registers");
            count += 1;
            for j in 0..*width {
                registry.create_namespace(branch, &format!("l{j}")).expect("registers");
                count += 1;
            }
        }
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::from_parameter(width), width, |b, _| {
            b.iter(|| black_box(NamespaceWalker::new(&registry, top).keys()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lookup, bench_sub_type, bench_walk);
criterion_main!(benches);
