use glam::DVec2;
use planet_sim::config::{AU, G, SECONDS_PER_DAY};
use planet_sim::{
    Body, BodyRegistry, GravityIntegrator, Projection, Scenario, ScenarioConfig, SimConfig,
    SimError, UpdateOrder,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SUN_MASS: f64 = 1.98892e30;
const EARTH_MASS: f64 = 5.9742e24;

/// Sun at the origin, Earth at 1 AU with its mean orbital speed
fn sun_and_earth() -> BodyRegistry {
    let mut registry = BodyRegistry::with_trail_capacity(10_000);
    registry.create(DVec2::ZERO, DVec2::ZERO, SUN_MASS, true).unwrap();
    registry
        .create(DVec2::new(AU, 0.0), DVec2::new(0.0, 29.783e3), EARTH_MASS, false)
        .unwrap();
    registry
}

fn daily() -> GravityIntegrator {
    GravityIntegrator::new(G, SECONDS_PER_DAY)
}

/// Everything a failed step must leave untouched
fn snapshot(registry: &BodyRegistry) -> Vec<(DVec2, DVec2, usize, f64)> {
    registry
        .all()
        .iter()
        .map(|b| (b.position(), b.velocity(), b.trajectory().len(), b.distance_to_anchor()))
        .collect()
}

// ==================================================================================
// Force law
// ==================================================================================

#[test]
fn newton_third_law_holds_for_random_pairs() {
    let integrator = daily();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let a = Body::new(
            DVec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0)) * AU,
            DVec2::ZERO,
            rng.gen_range(1.0e22..1.0e31),
        )
        .unwrap();
        let b = Body::new(
            DVec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0)) * AU,
            DVec2::ZERO,
            rng.gen_range(1.0e22..1.0e31),
        )
        .unwrap();

        let on_a = integrator.attraction(&a, &b).unwrap();
        let on_b = integrator.attraction(&b, &a).unwrap();

        let residual = (on_a + on_b).length();
        assert!(
            residual <= 1e-12 * on_a.length(),
            "forces not opposite: {on_a:?} vs {on_b:?}"
        );
    }
}

#[test]
fn net_forces_sum_to_zero_for_closed_system() {
    let scenario = Scenario::build(&ScenarioConfig::inner_solar_system()).unwrap();
    let forces = scenario.integrator.net_forces(scenario.registry.all()).unwrap();

    let total: DVec2 = forces.iter().copied().sum();
    let largest = forces.iter().map(|f| f.length()).fold(0.0, f64::max);
    assert!(total.length() < 1e-12 * largest, "net force {total:?}");
}

// ==================================================================================
// Stepping
// ==================================================================================

#[test]
fn earth_returns_near_start_after_one_year() {
    let mut registry = sun_and_earth();
    let integrator = daily();

    for _ in 0..365 {
        integrator.step(&mut registry).unwrap();
    }

    let earth = &registry.all()[1];
    let miss = earth.position().distance(DVec2::new(AU, 0.0));
    assert!(miss < 0.02 * AU, "missed start by {} AU", miss / AU);
}

#[test]
fn earth_is_on_far_side_after_half_a_year() {
    let mut registry = sun_and_earth();
    let integrator = daily();

    for _ in 0..183 {
        integrator.step(&mut registry).unwrap();
    }

    let earth = &registry.all()[1];
    assert!(earth.position().x < -0.95 * AU, "earth at {:?}", earth.position() / AU);
    assert!((earth.distance_to_anchor() / AU - 1.0).abs() < 0.05);
}

#[test]
fn lone_body_never_moves() {
    let mut registry = BodyRegistry::new();
    let start = DVec2::new(0.5 * AU, -0.25 * AU);
    registry.create(start, DVec2::ZERO, SUN_MASS, true).unwrap();

    let integrator = daily();
    assert_eq!(integrator.net_forces(registry.all()).unwrap(), vec![DVec2::ZERO]);

    for _ in 0..50 {
        integrator.step(&mut registry).unwrap();
    }

    let body = &registry.all()[0];
    assert_eq!(body.position(), start);
    assert_eq!(body.velocity(), DVec2::ZERO);
}

#[test]
fn trajectory_grows_one_point_per_step() {
    let mut registry = sun_and_earth();
    let integrator = daily();

    for _ in 0..40 {
        integrator.step(&mut registry).unwrap();
    }

    assert_eq!(registry.steps_taken(), 40);
    for body in registry.all() {
        assert_eq!(body.trajectory().len(), 40);
        assert_eq!(body.trajectory().latest(), Some(body.position()));
    }
}

#[test]
fn trajectory_is_capped_at_configured_capacity() {
    let mut registry = BodyRegistry::with_trail_capacity(25);
    registry.create(DVec2::ZERO, DVec2::ZERO, SUN_MASS, true).unwrap();
    registry
        .create(DVec2::new(AU, 0.0), DVec2::new(0.0, 29.783e3), EARTH_MASS, false)
        .unwrap();

    let integrator = daily();
    for _ in 0..100 {
        integrator.step(&mut registry).unwrap();
    }

    let earth = &registry.all()[1];
    assert_eq!(earth.trajectory().len(), 25);
    assert_eq!(earth.trajectory().latest(), Some(earth.position()));
}

#[test]
fn synchronized_steps_conserve_momentum() {
    let mut registry = sun_and_earth();
    let before = registry.total_momentum();

    let integrator = daily();
    for _ in 0..100 {
        integrator.step(&mut registry).unwrap();
    }

    let drift = (registry.total_momentum() - before).length();
    assert!(drift < 1e-9 * before.length(), "momentum drifted by {drift}");
}

#[test]
fn anchor_distance_tracks_non_anchor_bodies() {
    let mut registry = sun_and_earth();
    daily().step(&mut registry).unwrap();

    let sun = &registry.all()[0];
    let earth = &registry.all()[1];
    assert_eq!(sun.distance_to_anchor(), 0.0);
    assert_eq!(earth.distance_to_anchor(), earth.position().distance(sun.position()));
}

#[test]
fn synchronized_step_ignores_insertion_order() {
    let initial = [
        (DVec2::new(0.003 * AU, 0.0), DVec2::ZERO, SUN_MASS),
        (DVec2::new(-AU, 0.0), DVec2::new(0.0, 29.783e3), EARTH_MASS),
        (DVec2::new(0.723 * AU, 0.0), DVec2::new(0.0, -35.02e3), 4.8685e24),
    ];

    let mut forward = BodyRegistry::new();
    let mut reversed = BodyRegistry::new();
    for (p, v, m) in initial {
        forward.create(p, v, m, false).unwrap();
    }
    for (p, v, m) in initial.iter().rev() {
        reversed.create(*p, *v, *m, false).unwrap();
    }

    let integrator = daily();
    for _ in 0..30 {
        integrator.step(&mut forward).unwrap();
        integrator.step(&mut reversed).unwrap();
    }

    for (a, b) in forward.all().iter().zip(reversed.all().iter().rev()) {
        let gap = a.position().distance(b.position());
        assert!(gap < 1e-9 * AU, "order changed the result by {gap} m");
    }
}

#[test]
fn sequential_order_lets_later_bodies_see_moved_ones() {
    let mut synchronized = BodyRegistry::new();
    synchronized.create(DVec2::ZERO, DVec2::ZERO, SUN_MASS, false).unwrap();
    synchronized.create(DVec2::new(AU, 0.0), DVec2::ZERO, SUN_MASS, false).unwrap();
    let mut sequential = synchronized.clone();

    daily().step(&mut synchronized).unwrap();
    daily()
        .with_update_order(UpdateOrder::Sequential)
        .step(&mut sequential)
        .unwrap();

    // the first body has no predecessor, so both orders agree on it
    assert_eq!(synchronized.all()[0].position(), sequential.all()[0].position());
    // the second body is pulled from a closer, already-moved first body
    assert!(sequential.all()[1].velocity().length() > synchronized.all()[1].velocity().length());
}

// ==================================================================================
// Failure atomicity
// ==================================================================================

#[test]
fn coincident_bodies_fail_first_step_without_mutation() {
    let mut registry = BodyRegistry::new();
    registry.create(DVec2::new(AU, AU), DVec2::new(1.0, 0.0), SUN_MASS, true).unwrap();
    registry.create(DVec2::new(-AU, 0.0), DVec2::ZERO, EARTH_MASS, false).unwrap();
    registry.create(DVec2::new(AU, AU), DVec2::ZERO, EARTH_MASS, false).unwrap();

    let before = snapshot(&registry);
    let err = daily().step(&mut registry).unwrap_err();

    assert_eq!(err, SimError::DegenerateGeometry { first: 0, second: 2 });
    assert_eq!(snapshot(&registry), before);
    assert_eq!(registry.steps_taken(), 0);
}

#[test]
fn sequential_failure_midway_leaves_registry_untouched() {
    // Body 0 starts apart but lands exactly on body 1 after one step,
    // so the failure is only discovered while handling body 1.
    let mut registry = BodyRegistry::new();
    registry.create(DVec2::ZERO, DVec2::new(1.0, 0.0), 1.0, false).unwrap();
    registry.create(DVec2::new(1.0, 0.0), DVec2::ZERO, 1.0, false).unwrap();

    let before = snapshot(&registry);
    let integrator = GravityIntegrator::new(0.0, 1.0).with_update_order(UpdateOrder::Sequential);
    let err = integrator.step(&mut registry).unwrap_err();

    assert_eq!(err, SimError::DegenerateGeometry { first: 0, second: 1 });
    assert_eq!(snapshot(&registry), before);
}

#[test]
fn non_finite_initial_state_is_rejected() {
    let mut registry = BodyRegistry::new();
    registry.create(DVec2::new(AU, 0.0), DVec2::ZERO, EARTH_MASS, false).unwrap();

    let err = registry
        .create(DVec2::new(f64::NAN, 0.0), DVec2::ZERO, SUN_MASS, true)
        .unwrap_err();
    assert!(matches!(err, SimError::NonFiniteState { .. }), "got {err:?}");

    let err = registry
        .create(DVec2::ZERO, DVec2::new(f64::INFINITY, 0.0), SUN_MASS, true)
        .unwrap_err();
    assert!(matches!(err, SimError::NonFiniteState { .. }), "got {err:?}");

    assert_eq!(registry.len(), 1);
    assert!(registry.anchor().is_none());
}

#[test]
fn overflowing_force_fails_without_mutation() {
    let mut registry = BodyRegistry::new();
    registry.create(DVec2::ZERO, DVec2::ZERO, 1.0e300, false).unwrap();
    registry.create(DVec2::new(1.0, 0.0), DVec2::ZERO, 1.0e300, false).unwrap();

    let before = snapshot(&registry);
    let err = daily().step(&mut registry).unwrap_err();

    assert_eq!(err, SimError::Overflow { body: 0 });
    assert_eq!(snapshot(&registry), before);
    assert_eq!(registry.steps_taken(), 0);
}

#[test]
fn distinct_bodies_at_subnormal_separation_are_not_coincident() {
    let mut registry = BodyRegistry::new();
    registry.create(DVec2::ZERO, DVec2::ZERO, 1.0, false).unwrap();
    registry.create(DVec2::new(1.0e-200, 0.0), DVec2::ZERO, 1.0, false).unwrap();

    let before = snapshot(&registry);
    let err = daily().step(&mut registry).unwrap_err();

    assert!(matches!(err, SimError::Overflow { .. }), "got {err:?}");
    assert_eq!(snapshot(&registry), before);
}

#[test]
fn non_positive_mass_is_rejected_before_stepping() {
    let mut registry = BodyRegistry::new();
    assert_eq!(
        registry.create(DVec2::ZERO, DVec2::ZERO, 0.0, false),
        Err(SimError::InvalidMass { mass: 0.0 })
    );
    assert_eq!(
        registry.create(DVec2::ZERO, DVec2::ZERO, -1.0e24, false),
        Err(SimError::InvalidMass { mass: -1.0e24 })
    );
    assert!(registry.is_empty());
}

// ==================================================================================
// Display scale
// ==================================================================================

#[test]
fn display_scale_never_touches_physical_state() {
    let mut zoomed_in = ScenarioConfig::inner_solar_system();
    zoomed_in.sim.pixels_per_au = 400.0;
    let mut a = Scenario::build(&ScenarioConfig::inner_solar_system()).unwrap();
    let mut b = Scenario::build(&zoomed_in).unwrap();

    let mut projection = Projection::from_config(&b.sim, &b.display);
    for _ in 0..20 {
        a.integrator.step(&mut a.registry).unwrap();
        b.integrator.step(&mut b.registry).unwrap();
        for body in b.registry.all() {
            projection.to_screen(body.position());
        }
        projection.zoom(1.1);
    }

    for (x, y) in a.registry.all().iter().zip(b.registry.all()) {
        assert_eq!(x.position(), y.position());
        assert_eq!(x.velocity(), y.velocity());
    }
}

#[test]
fn scale_changes_only_projected_coordinates() {
    let sim = SimConfig::default();
    let registry = sun_and_earth();
    let earth = &registry.all()[1];

    let near = Projection::new(sim.scale(), 600, 600).to_screen(earth.position());
    let far = Projection::new(sim.scale() * 2.0, 600, 600).to_screen(earth.position());

    assert!((near.x - 450.0).abs() < 1e-3);
    assert!((far.x - 600.0).abs() < 1e-3);
    assert_eq!(earth.position(), DVec2::new(AU, 0.0));
}
