use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rayon::prelude::*;

use genewalk::stats::go_enrichment;
use genewalk::{Bucket, GeneWalk, Graph, Node, NodeVectors, NullDistributions};

const DIM: usize = 16;

/// Deterministic pseudo-random vector components
fn vector(seed: usize) -> Vec<f32> {
    (0..DIM)
        .map(|i| (((seed * 7919 + i * 104_729) % 1000) as f32) / 500.0 - 1.0)
        .collect()
}

fn genewalk(genes: usize, terms: usize) -> GeneWalk {
    let mut graph = Graph::default();
    let mut vectors = NodeVectors::new(DIM);
    let go: Vec<_> = (0..terms)
        .map(|t| {
            let label = format!("GO:{t:07}");
            vectors.insert(&label, &vector(t)).unwrap();
            graph
                .add_node(Node::go_term(&label, &format!("term {t}")))
                .unwrap()
        })
        .collect();

    let mut hgnc = Vec::with_capacity(genes);
    for g in 0..genes {
        let symbol = format!("GENE{g}");
        let id = graph
            .add_node(Node::gene(&symbol, &format!("HGNC:{g}")))
            .unwrap();
        vectors.insert(&symbol, &vector(terms + g)).unwrap();
        for t in (0..20).map(|k| (g * 31 + k * 17) % terms) {
            graph.add_edge(id, go[t]).unwrap();
        }
        hgnc.push(format!("HGNC:{g}"));
    }

    let mut nulls = NullDistributions::default();
    for exponent in 0..16 {
        let values = (0..2_000).map(|i| f64::from(i) / 1_000.0 - 1.0).collect();
        nulls.insert(Bucket::from(exponent), values).unwrap();
    }
    GeneWalk::new(graph, vectors, nulls, hgnc)
}

fn parallel(genewalk: &GeneWalk) -> usize {
    let graph = genewalk.graph();
    graph
        .iter()
        .filter(|(_, node)| node.hgnc().is_some())
        .par_bridge()
        .map(|(id, _)| {
            let connectivity = graph.connectivity(id).unwrap();
            go_enrichment(
                graph,
                genewalk.similarities(),
                genewalk.nulls(),
                id,
                connectivity,
                0.05,
            )
            .unwrap()
            .len()
        })
        .sum()
}

fn report_benchmark(c: &mut Criterion) {
    let genewalk = genewalk(1_000, 500);

    c.bench_function("report 1000 genes", |b| {
        b.iter(|| black_box(&genewalk).generate(0.05).unwrap().len())
    });

    c.bench_function("enrichment-parallel 1000 genes", |b| {
        b.iter(|| parallel(black_box(&genewalk)))
    });
}

criterion_group!(report, report_benchmark);
criterion_main!(report);
