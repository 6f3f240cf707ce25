use geozones::{Coordinate, GridConfig, GridError, ZoneGrid};

fn default_grid() -> ZoneGrid {
    ZoneGrid::new(GridConfig::default()).expect("default grid is valid")
}

#[test]
fn every_coordinate_resolves_to_a_containing_zone() {
    let grid = default_grid();
    let mut lon = -180.0;
    while lon < 180.0 {
        let mut lat = -90.0;
        while lat < 90.0 {
            let coordinate = Coordinate::new(lon, lat);
            let zone = grid
                .find_zone_containing(coordinate)
                .unwrap_or_else(|err| panic!("{coordinate} failed: {err}"));
            assert!(zone.contains(coordinate), "{coordinate}");
            lat += 0.75;
        }
        lon += 0.75;
    }
}

#[test]
fn exactly_one_zone_contains_each_sample() {
    let grid = ZoneGrid::new(GridConfig::default().with_cell_size(15.0, 15.0)).unwrap();
    let samples = [
        Coordinate::new(-180.0, -90.0),
        Coordinate::new(0.0, 0.0),
        Coordinate::new(15.0, 30.0),
        Coordinate::new(-0.001, 44.999),
        Coordinate::new(179.999, 89.999),
    ];
    for coordinate in samples {
        let owners = grid
            .zones()
            .iter()
            .filter(|zone| zone.contains(coordinate))
            .count();
        assert_eq!(owners, 1, "{coordinate}");
    }
}

#[test]
fn zones_partition_the_range() {
    let grid = ZoneGrid::new(GridConfig::default().with_cell_size(10.0, 10.0)).unwrap();
    let zones = grid.zones();

    for (i, a) in zones.iter().enumerate() {
        for b in &zones[i + 1..] {
            assert!(!a.bounds().overlaps(&b.bounds()));
        }
    }

    let covered: f64 = zones
        .iter()
        .map(|zone| {
            let b = zone.bounds();
            (b.max_longitude - b.min_longitude) * (b.max_latitude - b.min_latitude)
        })
        .sum();
    assert_eq!(covered, 360.0 * 180.0);

    let min_lon = zones.iter().map(|z| z.bounds().min_longitude).fold(f64::MAX, f64::min);
    let max_lon = zones.iter().map(|z| z.bounds().max_longitude).fold(f64::MIN, f64::max);
    let min_lat = zones.iter().map(|z| z.bounds().min_latitude).fold(f64::MAX, f64::min);
    let max_lat = zones.iter().map(|z| z.bounds().max_latitude).fold(f64::MIN, f64::max);
    assert_eq!((min_lon, max_lon, min_lat, max_lat), (-180.0, 180.0, -90.0, 90.0));
}

#[test]
fn neighbouring_zones_share_edges() {
    let grid = default_grid();
    let zones = grid.zones();
    let columns = grid.longitude_bins();

    for row in 0..grid.latitude_bins() {
        for column in 0..columns {
            let bounds = zones[row * columns + column].bounds();
            if column + 1 < columns {
                let east = zones[row * columns + column + 1].bounds();
                assert_eq!(bounds.max_longitude, east.min_longitude);
            }
            if row + 1 < grid.latitude_bins() {
                let north = zones[(row + 1) * columns + column].bounds();
                assert_eq!(bounds.max_latitude, north.min_latitude);
            }
        }
    }
}

#[test]
fn upper_boundary_belongs_to_next_band() {
    let grid = default_grid();

    let zone = grid.find_zone_containing(Coordinate::new(10.5, 1.0)).unwrap();
    assert_eq!(zone.bounds().min_latitude, 1.0);
    assert_eq!(zone.bounds().max_latitude, 2.0);

    let zone = grid.find_zone_containing(Coordinate::new(11.0, 1.5)).unwrap();
    assert_eq!(zone.bounds().min_longitude, 11.0);
    assert_eq!(zone.bounds().max_longitude, 12.0);
}

#[test]
fn lazy_init_builds_once() {
    let grid = default_grid();
    assert!(!grid.is_built());

    grid.find_zone_containing(Coordinate::new(0.0, 0.0)).unwrap();
    let first = grid.zones().as_ptr();
    assert_eq!(grid.zones().len(), 360 * 180);

    grid.find_zone_containing(Coordinate::new(-45.0, 12.0)).unwrap();
    assert_eq!(grid.zones().as_ptr(), first);
    assert_eq!(grid.zones().len(), 64_800);
}

#[test]
fn out_of_range_lookup_is_a_typed_error() {
    let grid = default_grid();
    let err = grid
        .find_zone_containing(Coordinate::new(181.0, 0.0))
        .unwrap_err();

    assert!(matches!(err, GridError::OutOfRange { .. }));
    assert!(err.to_string().contains("lon 181"), "{err}");
}

#[test]
fn regional_grid_uses_its_own_bounds() {
    let config = GridConfig::default()
        .with_bounds(-10.0, 30.0, 35.0, 70.0)
        .with_cell_size(0.5, 0.5);
    let grid = ZoneGrid::new(config).unwrap();

    assert_eq!(grid.zone_count(), 80 * 70);
    let zone = grid.find_zone_containing(Coordinate::new(2.35, 48.85)).unwrap();
    assert_eq!(
        zone.corners(),
        (Coordinate::new(2.0, 48.5), Coordinate::new(2.5, 49.0))
    );
    assert!(matches!(
        grid.find_zone_containing(Coordinate::new(-74.0, 40.7)),
        Err(GridError::OutOfRange { .. })
    ));
}
