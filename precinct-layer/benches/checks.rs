//! Benchmarks des contrôles structurels

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use precinct_layer::{check, parse_layer, CheckRules};
use serde_json::json;

/// Grille de précincts carrés, chacun découpé en `vertices` sommets
fn synthetic_layer(count: usize, vertices: usize) -> Vec<u8> {
    let side = (count as f64).sqrt().ceil() as usize;
    let features: Vec<_> = (0..count)
        .map(|i| {
            let (x0, y0) = ((i % side) as f64 * 0.01 - 97.0, (i / side) as f64 * 0.01 + 43.5);
            let mut ring: Vec<[f64; 2]> = (0..vertices)
                .map(|v| {
                    let t = v as f64 / vertices as f64 * std::f64::consts::TAU;
                    [x0 + 0.004 * t.cos(), y0 + 0.004 * t.sin()]
                })
                .collect();
            ring.push(ring[0]);
            json!({
                "type": "Feature",
                "properties": {
                    "precinct_id": format!("27-{:05}", i),
                    "precinct_name": "Bench",
                    "county": "Hennepin",
                    "congressional_district": "5",
                    "state_house_district": "61A",
                    "state_senate_district": "61",
                    "county_commissioner_district": "3"
                },
                "geometry": {"type": "Polygon", "coordinates": [ring]}
            })
        })
        .collect();

    serde_json::to_vec(&json!({
        "type": "FeatureCollection",
        "crs": {"type": "name", "properties": {"name": "EPSG:4326"}},
        "features": features
    }))
    .unwrap()
}

fn bench_run_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_checks");
    let rules = CheckRules::default();

    for vertices in [16usize, 256, 2048] {
        let bytes = synthetic_layer(500, vertices);
        let layer = parse_layer(&bytes, "bench").unwrap();
        group.throughput(Throughput::Elements((500 * vertices) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(vertices), &layer, |b, layer| {
            b.iter(|| black_box(check::run_checks(black_box(layer), &rules)))
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let bytes = synthetic_layer(2000, 64);
    let mut group = c.benchmark_group("parse_layer");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("2000x64", |b| {
        b.iter(|| black_box(parse_layer(black_box(&bytes), "bench").unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_run_checks, bench_parse);
criterion_main!(benches);
