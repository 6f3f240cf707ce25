use std::sync::Arc;

use geozones::{
    agent::{AGREEABLENESS, INCOME},
    aggregate::{ingest, GraphKind, GraphSeries},
    population::PopulationGenerator,
    Agent, Coordinate, GridConfig, GridError, Zone, ZoneGrid,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[test]
fn paris_zone_collects_its_inhabitants() {
    let mut grid = ZoneGrid::new(GridConfig::default()).unwrap();
    let position = Coordinate::new(2.5, 48.9);

    let zone = grid.find_zone_containing(position).unwrap();
    assert_eq!(
        zone.corners(),
        (Coordinate::new(2.0, 48.0), Coordinate::new(3.0, 49.0))
    );

    for agreeableness in [0.2, 0.4, 0.6] {
        let agent = Agent::new(2.5, 48.9).with_attribute(AGREEABLENESS, agreeableness);
        grid.find_zone_containing_mut(position)
            .unwrap()
            .add_inhabitant(Arc::new(agent));
    }

    let zone = grid.find_zone_containing(position).unwrap();
    assert_eq!(zone.population(), 3);
    assert!(close(zone.average_agreeableness().unwrap(), 0.4));
}

#[test]
fn average_is_plain_mean_and_zero_when_empty() {
    let mut zone = Zone::new(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0));
    assert_eq!(zone.average(INCOME).unwrap(), 0.0);

    let incomes = [12_000.0, 18_500.0, 40_250.0, 7_000.0];
    for income in incomes {
        zone.add_inhabitant(Arc::new(Agent::new(0.5, 0.5).with_attribute(INCOME, income)));
    }
    let expected = incomes.iter().sum::<f64>() / incomes.len() as f64;
    assert_eq!(zone.average(INCOME).unwrap(), expected);
}

#[test]
fn zero_area_density_is_unavailable_not_zero() {
    let mut zone = Zone::new(Coordinate::new(4.0, 4.0), Coordinate::new(4.0, 4.0));
    assert!(matches!(
        zone.population_density(),
        Err(GridError::DegenerateZone { .. })
    ));

    zone.add_inhabitant(Arc::new(Agent::new(4.0, 4.0).with_attribute(INCOME, 5.0)));
    let series = GraphSeries::from_zones(GraphKind::Income, [&zone]).unwrap();
    assert_eq!(series.x, vec![None]);
    assert_eq!(series.y, vec![5.0]);
    assert_eq!(series.points().count(), 0);
}

#[test]
fn hundred_thousand_agents_are_all_placed() {
    let config = GridConfig::default();
    let mut grid = ZoneGrid::new(config.clone()).unwrap();
    let agents = PopulationGenerator::new(42).generate(&config, 100_000);

    let placed = ingest(&mut grid, agents).unwrap();
    assert_eq!(placed, 100_000);
    assert_eq!(grid.zones().len(), 64_800);

    let total: usize = grid.zones().iter().map(Zone::population).sum();
    assert_eq!(total, 100_000);

    for zone in grid.zones() {
        for agent in zone.inhabitants() {
            assert!(zone.contains(agent.position()));
        }
    }

    let series = GraphSeries::from_zones(GraphKind::Agreeableness, grid.zones()).unwrap();
    assert_eq!(series.len(), 64_800);
    assert_eq!(series.unavailable_count(), 0);
    assert!(series.y.iter().all(|y| (0.0..=1.0).contains(y)));
}

#[test]
fn ingestion_keeps_input_order_within_a_zone() {
    let mut grid = ZoneGrid::new(GridConfig::default()).unwrap();
    let agents: Vec<Arc<Agent>> = (0..5)
        .map(|i| Arc::new(Agent::new(-3.5, 10.5).with_attribute(INCOME, i as f64)))
        .collect();

    ingest(&mut grid, agents.iter().cloned()).unwrap();

    let zone = grid.find_zone_containing(Coordinate::new(-3.5, 10.5)).unwrap();
    for (stored, original) in zone.inhabitants().iter().zip(&agents) {
        assert!(Arc::ptr_eq(stored, original));
    }
}
