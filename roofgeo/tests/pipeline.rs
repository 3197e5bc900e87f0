//! Tests d'intégration du classement

use geo::Coord;
use roofgeo::pipeline::{measure_all, rank, run};
use roofgeo::{
    AreaScale, Building, BuildingId, GeometryError, MeasuredBuilding, Projection, RankParams,
};

const AU_LON: f64 = 9.6397;
const AU_LAT: f64 = 47.4319;

fn measured(id: u64, area_m2: f64, compactness: f64) -> MeasuredBuilding {
    MeasuredBuilding {
        building: Building::new(BuildingId::way(id), vec![]).with_tag("yes"),
        area_m2,
        perimeter_m: 0.0,
        compactness,
        centroid: Coord {
            x: AU_LON,
            y: AU_LAT,
        },
    }
}

/// Rectangle en degrés à partir d'un coin
fn rect(id: u64, lon: f64, lat: f64, dlon: f64, dlat: f64) -> Building {
    Building::new(
        BuildingId::way(id),
        vec![
            Coord { x: lon, y: lat },
            Coord { x: lon + dlon, y: lat },
            Coord {
                x: lon + dlon,
                y: lat + dlat,
            },
            Coord { x: lon, y: lat + dlat },
        ],
    )
}

fn sample_buildings() -> Vec<Building> {
    vec![
        rect(10, AU_LON, AU_LAT, 0.0003, 0.0003).with_tag("industrial"),
        rect(11, AU_LON + 0.001, AU_LAT, 0.0002, 0.0002).with_tag("house"),
        rect(12, AU_LON + 0.002, AU_LAT, 0.0010, 0.00005).with_tag("warehouse"),
        rect(13, AU_LON + 0.003, AU_LAT, 0.0002, 0.0002).with_tag("house"),
        rect(14, AU_LON + 0.004, AU_LAT, 0.00005, 0.00005).with_name("Shed"),
        // Ligne: deux sommets seulement
        Building::new(
            BuildingId::way(15),
            vec![
                Coord { x: AU_LON, y: AU_LAT },
                Coord {
                    x: AU_LON + 0.0001,
                    y: AU_LAT,
                },
            ],
        ),
    ]
}

#[test]
fn test_end_to_end_scenario_scores_and_order() {
    let params = RankParams {
        min_area_m2: 100.0,
        ..Default::default()
    };
    let input = vec![
        measured(1, 50.0, 0.9),
        measured(2, 150.0, 0.5),
        measured(3, 500.0, 0.3),
    ];

    let ranking = rank(input, &params);

    // Référence batch-max: 500 m²
    assert_eq!(ranking.reference_area_m2, 500.0);
    assert_eq!(ranking.below_min_area, 1);
    assert_eq!(ranking.ranked.len(), 2);

    let ids: Vec<u64> = ranking.ranked.iter().map(|b| b.id().id).collect();
    assert_eq!(ids, vec![3, 2]);

    // 0.7 * 500/500 + 0.3 * 0.3
    assert!((ranking.ranked[0].score() - 0.79).abs() < 1e-12);
    // 0.7 * 150/500 + 0.3 * 0.5
    assert!((ranking.ranked[1].score() - 0.36).abs() < 1e-12);
}

#[test]
fn test_pipeline_is_idempotent() {
    let buildings = sample_buildings();
    let params = RankParams {
        min_area_m2: 10.0,
        ..Default::default()
    };

    let (first, skipped_first) = run(&buildings, &Projection::Lv95, &params);
    let (second, skipped_second) = run(&buildings, &Projection::Lv95, &params);

    assert_eq!(first.ranked, second.ranked);
    assert_eq!(skipped_first, skipped_second);
    assert!(!first.ranked.is_empty());
}

#[test]
fn test_input_order_does_not_change_ranking() {
    let buildings = sample_buildings();
    let mut reversed = buildings.clone();
    reversed.reverse();
    let params = RankParams {
        min_area_m2: 0.0,
        ..Default::default()
    };

    let (a, _) = run(&buildings, &Projection::Lv95, &params);
    let (b, _) = run(&reversed, &Projection::Lv95, &params);

    let ids_a: Vec<BuildingId> = a.ranked.iter().map(|s| s.id()).collect();
    let ids_b: Vec<BuildingId> = b.ranked.iter().map(|s| s.id()).collect();
    assert_eq!(ids_a, ids_b);
}

#[test]
fn test_degenerate_polygon_is_skipped_and_run_succeeds() {
    let buildings = sample_buildings();
    let params = RankParams {
        min_area_m2: 0.0,
        ..Default::default()
    };

    let (ranking, skipped) = run(&buildings, &Projection::Lv95, &params);

    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].id, BuildingId::way(15));
    assert!(matches!(
        skipped[0].error,
        GeometryError::DegeneratePolygon { .. }
    ));
    assert_eq!(ranking.ranked.len(), 5);
    assert!(ranking.ranked.iter().all(|b| b.id() != BuildingId::way(15)));
}

#[test]
fn test_invalid_coordinate_is_skipped() {
    let bad = rect(20, 9.0, 95.0, 0.001, 0.001);
    let good = rect(21, AU_LON, AU_LAT, 0.0003, 0.0003);

    let m = measure_all(&[bad, good], &Projection::Lv95);
    assert_eq!(m.measured.len(), 1);
    assert_eq!(m.skipped.len(), 1);
    assert!(matches!(
        m.skipped[0].error,
        GeometryError::InvalidCoordinate { .. }
    ));
}

#[test]
fn test_projected_area_of_small_square() {
    // 0.0001° x 0.0001° à Au SG ≈ 11.118 m x 7.543 m
    let m = measure_all(&[rect(1, AU_LON, AU_LAT, 0.0001, 0.0001)], &Projection::Lv95);
    let area = m.measured[0].area_m2;
    assert!((area - 83.88).abs() < 0.1, "area={}", area);

    // UTM 32N: écart d'échelle entre les deux projections inférieur à 0.2 %
    let utm = Projection::from_epsg(32632).unwrap();
    let m_utm = measure_all(&[rect(1, AU_LON, AU_LAT, 0.0001, 0.0001)], &utm);
    let area_utm = m_utm.measured[0].area_m2;
    assert!((area_utm - area).abs() / area < 2e-3, "utm={}", area_utm);
}

#[test]
fn test_min_area_and_type_filters_combined() {
    let buildings = sample_buildings();
    let params = RankParams {
        min_area_m2: 100.0,
        building_types: Some(vec!["industrial".to_string(), "warehouse".to_string()]),
        limit: 10,
        ..Default::default()
    };

    let (ranking, _) = run(&buildings, &Projection::Lv95, &params);
    let ids: Vec<u64> = ranking.ranked.iter().map(|b| b.id().id).collect();

    assert!(ids.contains(&10));
    assert!(ids.contains(&12));
    assert_eq!(ids.len(), 2);
    // Le grand carré compact passe devant l'entrepôt allongé
    assert_eq!(ids[0], 10);
}

#[test]
fn test_fixed_scale_is_independent_of_batch() {
    let params = RankParams {
        min_area_m2: 0.0,
        area_scale: AreaScale::Fixed {
            reference_m2: 1000.0,
        },
        ..Default::default()
    };
    let alone = rank(vec![measured(1, 400.0, 0.5)], &params);
    let with_big = rank(
        vec![measured(1, 400.0, 0.5), measured(2, 5000.0, 0.5)],
        &params,
    );

    let score_alone = alone.ranked[0].score();
    let score_in_batch = with_big
        .ranked
        .iter()
        .find(|b| b.id().id == 1)
        .map(|b| b.score())
        .unwrap();
    assert_eq!(score_alone, score_in_batch);
}
