use jigsaw_core::partition::TRIANGLE_LAYOUTS;
use jigsaw_core::{partition, ConfigurationError, PartitionSpec, PieceShape, Point, Polygon};
use rand::rngs::StdRng;
use rand::SeedableRng;

const WIDTH: f32 = 640.0;
const HEIGHT: f32 = 480.0;

fn cut(spec: PartitionSpec, seed: u64) -> Vec<Polygon> {
    let mut rng = StdRng::seed_from_u64(seed);
    partition(WIDTH, HEIGHT, &spec, &mut rng).unwrap()
}

fn specs() -> Vec<PartitionSpec> {
    vec![
        PartitionSpec::Rectangular { rows: 3, cols: 4 },
        PartitionSpec::Tabbed { rows: 4, cols: 5 },
        PartitionSpec::Triangular { pieces: 18 },
        PartitionSpec::Triangular { pieces: 64 },
        PartitionSpec::Irregular { pieces: 24 },
        PartitionSpec::Irregular { pieces: 150 },
    ]
}

fn assert_covers_exactly(polygons: &[Polygon]) {
    let steps = 48;
    for iy in 0..steps {
        for ix in 0..steps {
            let point = Point::new(
                (ix as f32 + 0.37) / steps as f32 * WIDTH,
                (iy as f32 + 0.61) / steps as f32 * HEIGHT,
            );
            if polygons
                .iter()
                .any(|polygon| polygon.distance_to_boundary(point) < 0.01)
            {
                continue;
            }
            let hits = polygons
                .iter()
                .filter(|polygon| polygon.contains(point))
                .count();
            assert_eq!(hits, 1, "point {point:?} covered {hits} times");
        }
    }
}

#[test]
fn every_layout_tiles_the_image() {
    for spec in specs() {
        let polygons = cut(spec, 11);
        assert_eq!(polygons.len() as u32, spec.piece_count().unwrap());
        let total: f32 = polygons.iter().map(Polygon::area).sum();
        let expected = WIDTH * HEIGHT;
        assert!(
            (total - expected).abs() / expected < 1e-3,
            "{spec:?}: area {total} vs {expected}"
        );
        assert_covers_exactly(&polygons);
    }
}

#[test]
fn every_polygon_winds_clockwise_inside_the_image() {
    let image = jigsaw_core::Rect::from_size(WIDTH, HEIGHT).expand(1e-3);
    for spec in specs() {
        for polygon in cut(spec, 5) {
            assert!(polygon.len() >= 3);
            assert!(polygon.signed_area() > 0.0, "{spec:?} has a counter-clockwise piece");
            assert!(polygon.points().iter().all(|point| image.contains(*point)));
        }
    }
}

#[test]
fn tabbed_neighbors_share_curve_vertices_exactly() {
    let polygons = cut(PartitionSpec::Tabbed { rows: 2, cols: 2 }, 1);
    let shared = polygons[0]
        .points()
        .iter()
        .filter(|point| polygons[1].points().contains(point))
        .count();
    // Straight corners plus every sample of the tab curve.
    assert!(shared > 10, "only {shared} shared vertices");
}

#[test]
fn tabbed_interior_edges_bulge_into_one_side() {
    let polygons = cut(PartitionSpec::Tabbed { rows: 1, cols: 2 }, 1);
    let cell_width = WIDTH / 2.0;
    let depth = cell_width.min(HEIGHT) * jigsaw_core::partition::TAB_DEPTH_RATIO;
    let left = polygons[0].bounds();
    let right = polygons[1].bounds();
    // Cell (0, 0) has even parity and carries the tab.
    assert!((left.max.x - cell_width - depth).abs() < 0.5, "apex at {}", left.max.x);
    assert!(right.min.x > cell_width - depth * 0.5);
}

#[test]
fn same_seed_same_irregular_layout() {
    let spec = PartitionSpec::Irregular { pieces: 40 };
    assert_eq!(cut(spec, 99), cut(spec, 99));
    assert_ne!(cut(spec, 99), cut(spec, 100));
}

#[test]
fn unsupported_triangle_count_lists_valid_counts() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = partition(WIDTH, HEIGHT, &PartitionSpec::Triangular { pieces: 20 }, &mut rng)
        .unwrap_err();
    match err {
        ConfigurationError::UnsupportedPieceCount {
            shape,
            requested,
            valid,
        } => {
            assert_eq!(shape, PieceShape::Triangular);
            assert_eq!(requested, 20);
            let expected: Vec<u32> = TRIANGLE_LAYOUTS.iter().map(|layout| layout.pieces).collect();
            assert_eq!(valid, expected);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn rejects_out_of_range_counts_and_bad_images() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        partition(WIDTH, HEIGHT, &PartitionSpec::Irregular { pieces: 151 }, &mut rng),
        Err(ConfigurationError::PieceCountOutOfRange { max: 150, .. })
    ));
    assert!(matches!(
        partition(WIDTH, HEIGHT, &PartitionSpec::Rectangular { rows: 1, cols: 1 }, &mut rng),
        Err(ConfigurationError::PieceCountOutOfRange { min: 2, .. })
    ));
    assert!(matches!(
        partition(WIDTH, HEIGHT, &PartitionSpec::Tabbed { rows: 0, cols: 4 }, &mut rng),
        Err(ConfigurationError::EmptyGrid { .. })
    ));
    assert!(matches!(
        partition(0.0, HEIGHT, &PartitionSpec::Rectangular { rows: 2, cols: 2 }, &mut rng),
        Err(ConfigurationError::InvalidImageSize { .. })
    ));
}

#[test]
fn for_target_picks_nearby_layouts() {
    let spec = PartitionSpec::for_target(PieceShape::Tabbed, 800, 800, 16).unwrap();
    assert_eq!(spec, PartitionSpec::Tabbed { rows: 4, cols: 4 });
    let spec = PartitionSpec::for_target(PieceShape::Triangular, 800, 600, 30).unwrap();
    assert_eq!(spec, PartitionSpec::Triangular { pieces: 32 });
    let spec = PartitionSpec::for_target(PieceShape::Irregular, 800, 600, 500).unwrap();
    assert_eq!(spec, PartitionSpec::Irregular { pieces: 150 });
}
