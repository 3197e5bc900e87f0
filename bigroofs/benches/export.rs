//! Benchmarks pour l'export

use bigroofs::export::csv::write_csv;
use bigroofs::export::geojson::write_geojson;
use bigroofs::export::ExportMeta;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use geo::Coord;
use roofgeo::pipeline::run;
use roofgeo::{Building, BuildingId, Projection, RankParams, ScoredBuilding};

fn ranked_buildings(count: usize) -> Vec<ScoredBuilding> {
    let buildings: Vec<Building> = (0..count)
        .map(|i| {
            let lon = 9.60 + (i % 100) as f64 * 0.0008;
            let lat = 47.40 + (i / 100) as f64 * 0.0006;
            let d = 0.0002 + (i % 9) as f64 * 0.00003;
            Building::new(
                BuildingId::way(i as u64),
                vec![
                    Coord { x: lon, y: lat },
                    Coord { x: lon + d, y: lat },
                    Coord { x: lon + d, y: lat + d },
                    Coord { x: lon, y: lat + d },
                ],
            )
            .with_tag(if i % 3 == 0 { "industrial" } else { "yes" })
        })
        .collect();

    let params = RankParams {
        min_area_m2: 0.0,
        limit: count,
        ..Default::default()
    };
    run(&buildings, &Projection::Lv95, &params).0.ranked
}

fn bench_export(c: &mut Criterion) {
    let ranked = ranked_buildings(5_000);
    let meta = ExportMeta::untitled("bench");

    let mut group = c.benchmark_group("export_5000");
    group.throughput(Throughput::Elements(ranked.len() as u64));

    group.bench_function("csv", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(1 << 20);
            write_csv(&mut out, black_box(&ranked)).unwrap();
            out
        })
    });

    group.bench_function("geojson", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(1 << 21);
            write_geojson(&mut out, black_box(&ranked), &meta).unwrap();
            out
        })
    });

    group.finish();
}

criterion_group!(benches, bench_export);
criterion_main!(benches);
