use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use taskgraph_core::Graph;
use taskgraph_core::analysis::analyze;
use taskgraph_core::config::AnalysisConfig;
use taskgraph_core::generate::{GraphShape, generate};
use taskgraph_core::graph::{paths, scc, topo};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

fn build(vertices: usize, shape: GraphShape) -> Graph {
    let mut rng = StdRng::seed_from_u64(0x7A5C_u64 + vertices as u64);
    generate(vertices, shape, &mut rng)
        .to_graph()
        .unwrap_or_else(|e| panic!("generated graph is valid: {e}"))
}

fn bench_scc(c: &mut Criterion) {
    let mut group = c.benchmark_group("engines.scc");

    for vertices in SIZES {
        let graph = build(vertices, GraphShape::MultipleSccs);
        group.throughput(Throughput::Elements(graph.edge_count() as u64));

        group.bench_with_input(BenchmarkId::new("find_components", vertices), &graph, |b, g| {
            b.iter(|| black_box(scc::find_components(g)));
        });

        let sccs = scc::find_components(&graph);
        group.bench_with_input(
            BenchmarkId::new("build_condensation", vertices),
            &graph,
            |b, g| b.iter(|| black_box(scc::build_condensation(g, &sccs))),
        );
    }

    group.finish();
}

fn bench_dag(c: &mut Criterion) {
    let mut group = c.benchmark_group("engines.dag");

    for vertices in SIZES {
        let graph = build(vertices, GraphShape::PureDag);
        group.throughput(Throughput::Elements(graph.edge_count() as u64));

        group.bench_with_input(BenchmarkId::new("topological_order", vertices), &graph, |b, g| {
            b.iter(|| black_box(topo::topological_order(g)));
        });

        group.bench_with_input(BenchmarkId::new("shortest_paths", vertices), &graph, |b, g| {
            b.iter(|| black_box(paths::shortest_paths_from(g, 0)));
        });

        group.bench_with_input(BenchmarkId::new("critical_path", vertices), &graph, |b, g| {
            b.iter(|| black_box(paths::critical_path(g)));
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("engines.pipeline");
    let config = AnalysisConfig::default();

    for vertices in SIZES {
        let graph = build(vertices, GraphShape::ComplexMixed);
        group.bench_with_input(BenchmarkId::new("analyze", vertices), &graph, |b, g| {
            b.iter(|| black_box(analyze(g, &config)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scc, bench_dag, bench_pipeline);
criterion_main!(benches);
