//! Integration tests for the full tick pipeline.
//!
//! These tests drive a [`Simulation`] end-to-end through the command
//! operations and `step`, testing:
//! - Thrust and gravity integration
//! - Every autopilot mode and its transitions
//! - Sensor contacts and the event log

use glam::DVec3;

use crate::config::SimConfig;
use crate::entity::{Euler, GravityBody, ShipId};
use crate::error::SimError;
use crate::output::EventKind;
use crate::plugins::autopilot::{AutopilotMode, AutopilotParams, ALLOWED_MODES};
use crate::plugins::sensor::SensorMode;
use crate::simulation::Simulation;

use super::helpers::{
    assert_vec_close, event_types, narrow_observer, run, ship, ship_at, ship_at_bearing, sim_with,
    test_ship,
};

// =============================================================================
// Physics
// =============================================================================

#[test]
fn constant_thrust_ten_ticks() {
    let mut sim = sim_with(vec![test_ship("alpha")]);
    sim.world_mut()
        .set_helm_input(&ShipId::from("alpha"), DVec3::Z, Euler::ZERO, None)
        .unwrap();

    run(&mut sim, 10, 1.0);

    let alpha = ship(&sim, "alpha");
    assert_vec_close(alpha.kinematics.velocity, DVec3::new(0.0, 0.0, 10.0), 1e-9);
    assert_vec_close(alpha.kinematics.position, DVec3::new(0.0, 0.0, 55.0), 1e-9);
    assert_eq!(alpha.mass_kg(), 1.0e6);
}

#[test]
fn stationary_ship_falls_toward_body() {
    let mut sim = sim_with(vec![test_ship("alpha")]);
    let body = GravityBody::new("planet", 5.972e24, DVec3::new(1000.0, 0.0, 0.0)).unwrap();
    sim.world_mut().add_gravity_body(body).unwrap();

    let mut last_distance = 1000.0;
    for _ in 0..5 {
        sim.step(1.0);
        let position = ship(&sim, "alpha").kinematics.position;
        let distance = (DVec3::new(1000.0, 0.0, 0.0) - position).length();
        assert!(distance < last_distance);
        assert!(position.y.abs() < 1e-12 && position.z.abs() < 1e-12);
        last_distance = distance;
    }
}

#[test]
fn disabled_gravity_body_exerts_nothing() {
    let mut sim = sim_with(vec![test_ship("alpha")]);
    let body = GravityBody::new("planet", 5.972e24, DVec3::new(1000.0, 0.0, 0.0))
        .unwrap()
        .with_gravity_enabled(false);
    sim.world_mut().add_gravity_body(body).unwrap();
    run(&mut sim, 5, 1.0);
    assert_eq!(ship(&sim, "alpha").kinematics.position, DVec3::ZERO);
}

#[test]
fn manual_rotation_respects_caps() {
    let mut sim = sim_with(vec![test_ship("alpha")]);
    sim.world_mut()
        .set_helm_input(
            &ShipId::from("alpha"),
            DVec3::ZERO,
            Euler::new(45.0, -45.0, 5.0),
            Some("manual".into()),
        )
        .unwrap();

    run(&mut sim, 3, 1.0);

    let o = ship(&sim, "alpha").kinematics.orientation;
    assert!((o.yaw - 30.0).abs() < 1e-9);
    assert!((o.pitch + 30.0).abs() < 1e-9);
    assert!((o.roll - 15.0).abs() < 1e-9);
}

// =============================================================================
// Autopilot
// =============================================================================

#[test]
fn coast_keeps_speed_and_ignores_helm() {
    let mut sim = sim_with(vec![test_ship("alpha").with_velocity(DVec3::new(0.2, -0.1, 0.4))]);
    let id = ShipId::from("alpha");
    let world = sim.world_mut();
    world
        .set_helm_input(&id, DVec3::Z, Euler::new(5.0, 0.0, 0.0), None)
        .unwrap();
    world
        .set_autopilot_mode(&id, true, "coast", &AutopilotParams::new())
        .unwrap();

    let speed = ship(&sim, "alpha").speed();
    for _ in 0..20 {
        sim.step(0.5);
        let alpha = ship(&sim, "alpha");
        assert!((alpha.speed() - speed).abs() < 1e-12);
        assert_eq!(alpha.kinematics.orientation, Euler::ZERO);
    }
}

#[test]
fn kill_vel_stops_and_disengages() {
    let mut sim = sim_with(vec![test_ship("alpha").with_velocity(DVec3::new(0.3, -0.2, 0.5))]);
    let id = ShipId::from("alpha");
    sim.world_mut()
        .set_helm_input(&id, DVec3::new(0.0, 0.0, 0.8), Euler::ZERO, None)
        .unwrap();
    let state = sim
        .world_mut()
        .set_autopilot_mode(&id, true, "kill_vel", &AutopilotParams::new())
        .unwrap();
    assert!(state.enabled);

    let stop = SimConfig::default().autopilot.stop_speed_km_s;
    let mut speed = ship(&sim, "alpha").speed();
    let mut burned = false;
    let mut disengaged_at = None;

    for tick in 0..50 {
        sim.step(1.0);
        let alpha = ship(&sim, "alpha");
        let now = alpha.speed();
        assert!(now <= speed + 1e-12, "speed rose on tick {tick}: {speed} -> {now}");
        if alpha.controls.thrust_vector.z > 0.0 {
            burned = true;
            assert!(now < speed, "thrusting tick {tick} did not slow the ship");
        }
        speed = now;
        if !alpha.autopilot.enabled {
            disengaged_at = Some(tick);
            break;
        }
    }

    assert!(burned);
    assert!(disengaged_at.is_some(), "kill_vel never disengaged");
    let alpha = ship(&sim, "alpha");
    assert!(alpha.speed() < stop);
    assert_eq!(alpha.autopilot.mode, AutopilotMode::Manual);
    assert!(alpha.helm.is_idle(), "helm burn must not resume");

    // Manual with zeroed helm stays put
    let before = alpha.kinematics.velocity;
    run(&mut sim, 5, 1.0);
    assert_eq!(ship(&sim, "alpha").kinematics.velocity, before);
}

#[test]
fn invalid_mode_keeps_state_and_lists_modes() {
    let mut sim = sim_with(vec![test_ship("alpha")]);
    let id = ShipId::from("alpha");
    sim.world_mut()
        .set_autopilot_mode(&id, true, "coast", &AutopilotParams::new())
        .unwrap();
    let before = ship(&sim, "alpha").autopilot.clone();

    let err = sim
        .world_mut()
        .set_autopilot_mode(&id, false, "evasive", &AutopilotParams::new())
        .unwrap_err();

    match err {
        SimError::InvalidMode { mode, allowed } => {
            assert_eq!(mode, "evasive");
            assert_eq!(allowed, ALLOWED_MODES);
            assert_eq!(allowed, ["manual", "coast", "kill_vel", "chase_target"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(ship(&sim, "alpha").autopilot, before);
}

#[test]
fn chase_closes_on_target() {
    let mut sim = sim_with(vec![
        test_ship("hunter"),
        ship_at("prey", DVec3::new(30.0, 0.0, 30.0)),
    ]);
    let hunter = ShipId::from("hunter");
    let mut params = AutopilotParams::new();
    params.insert("desired_range_m".into(), 10_000.0);
    params.insert("min_range_m".into(), 2_000.0);
    sim.world_mut()
        .set_autopilot_mode(&hunter, true, "chase_target", &params)
        .unwrap();
    sim.world_mut()
        .set_target(&hunter, Some(ShipId::from("prey")))
        .unwrap();

    let initial = DVec3::new(30.0, 0.0, 30.0).length();

    // Yaw 45 degrees at 10 deg/s: no thrust until the turn completes
    run(&mut sim, 4, 1.0);
    let h = ship(&sim, "hunter");
    assert_eq!(h.kinematics.velocity, DVec3::ZERO);

    run(&mut sim, 4, 1.0);
    let h = ship(&sim, "hunter");
    assert!((h.kinematics.orientation.yaw - 45.0).abs() < 1e-6);
    assert!(h.controls.thrust_vector.z > 0.0);
    let range = (DVec3::new(30.0, 0.0, 30.0) - h.kinematics.position).length();
    assert!(range < initial);
}

#[test]
fn chase_with_unknown_target_coasts() {
    let mut sim = sim_with(vec![test_ship("hunter").with_velocity(DVec3::X)]);
    let hunter = ShipId::from("hunter");
    sim.world_mut()
        .set_autopilot_mode(&hunter, true, "chase_target", &AutopilotParams::new())
        .unwrap();
    sim.world_mut()
        .set_target(&hunter, Some(ShipId::from("nobody")))
        .unwrap();

    let report = sim.step(1.0);

    assert!(report.is_clean());
    let h = ship(&sim, "hunter");
    assert_eq!(h.kinematics.velocity, DVec3::X);
    assert!(h.controls.is_idle());
}

#[test]
fn chase_target_removed_mid_run_coasts() {
    let mut sim = sim_with(vec![
        test_ship("hunter"),
        ship_at("prey", DVec3::new(0.0, 0.0, 50.0)),
    ]);
    let hunter = ShipId::from("hunter");
    sim.world_mut()
        .set_autopilot_mode(&hunter, true, "chase_target", &AutopilotParams::new())
        .unwrap();
    sim.world_mut()
        .set_target(&hunter, Some(ShipId::from("prey")))
        .unwrap();
    sim.step(1.0);
    assert!(ship(&sim, "hunter").controls.thrust_vector.z > 0.0);

    sim.world_mut().remove_ship(&ShipId::from("prey"));
    let velocity = ship(&sim, "hunter").kinematics.velocity;
    sim.step(1.0);
    assert_eq!(ship(&sim, "hunter").kinematics.velocity, velocity);
}

// =============================================================================
// Sensors
// =============================================================================

#[test]
fn target_inside_field_of_view_is_reported() {
    let mut sim = sim_with(vec![
        narrow_observer("alpha"),
        ship_at_bearing("bravo", 45.0, 15.0),
    ]);
    sim.step(1.0e-3);

    let contacts = sim.world().contacts(&ShipId::from("alpha"));
    assert_eq!(contacts.len(), 1);
    assert!((contacts[0].bearing_deg - 45.0).abs() < 1e-6);
    assert!((contacts[0].range_m - 15_000.0).abs() < 1e-3);

    let alpha_events: Vec<_> = sim
        .world()
        .drain_events(0.0)
        .into_iter()
        .filter(|e| e.sensor_ship_id.as_str() == "alpha")
        .collect();
    assert_eq!(alpha_events.len(), 1);
    assert_eq!(alpha_events[0].target_entity_id, Some(ShipId::from("bravo")));
    assert!(matches!(
        alpha_events[0].kind,
        EventKind::SensorContactNew { detection: SensorMode::Passive, .. }
    ));
}

#[test]
fn target_outside_field_of_view_is_silent() {
    let mut bravo = ship_at_bearing("bravo", 120.0, 15.0);
    bravo.sensors.passive.range_m = 0.0;
    let mut sim = sim_with(vec![narrow_observer("alpha"), bravo]);

    sim.step(1.0e-3);

    assert!(sim.world().contacts(&ShipId::from("alpha")).is_empty());
    assert!(sim.world().events().is_empty());
}

#[test]
fn contact_lost_when_target_leaves_range() {
    let mut bravo =
        ship_at("bravo", DVec3::new(0.0, 0.0, 13.0)).with_velocity(DVec3::new(0.0, 0.0, 2.0));
    bravo.sensors.passive.range_m = 0.0;
    let mut sim = sim_with(vec![narrow_observer("alpha"), bravo]);

    // 15 km
    sim.step(1.0);
    assert_eq!(event_types(&sim), ["sensor_contact_new"]);

    // 17 km, 19 km: still in range
    run(&mut sim, 2, 1.0);
    assert_eq!(event_types(&sim), ["sensor_contact_new"]);

    // 21 km: gone
    sim.step(1.0);
    assert_eq!(event_types(&sim), ["sensor_contact_new", "sensor_contact_lost"]);
    let lost = sim.world().events().iter().last().unwrap();
    assert!((lost.time - 4.0).abs() < 1e-12);
    match lost.kind {
        EventKind::SensorContactLost { last_range_m, .. } => {
            assert!((last_range_m - 19_000.0).abs() < 1e-6);
        }
        ref other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn active_ping_between_ticks_respects_cooldown() {
    let mut sim = sim_with(vec![
        narrow_observer("alpha"),
        ship_at_bearing("bravo", 180.0, 3.0),
    ]);
    let alpha = ShipId::from("alpha");

    let contacts = sim.world_mut().scan(&alpha, "active").unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].detection, SensorMode::Active);

    run(&mut sim, 2, 1.0);
    sim.world_mut().scan(&alpha, "active").unwrap();
    run(&mut sim, 3, 1.0);
    sim.world_mut().scan(&alpha, "active").unwrap();

    let pings: Vec<(f64, bool)> = sim
        .world()
        .events()
        .iter()
        .filter_map(|e| match e.kind {
            EventKind::SensorPing { performed, .. } => Some((e.time, performed)),
            _ => None,
        })
        .collect();
    assert_eq!(pings, vec![(0.0, true), (2.0, false), (5.0, true)]);
}

#[test]
fn passive_scan_after_ping_reports_loss_of_unseen_target() {
    let mut sim = sim_with(vec![
        narrow_observer("alpha"),
        ship_at_bearing("bravo", 180.0, 3.0),
    ]);
    let alpha = ShipId::from("alpha");
    sim.world_mut().scan(&alpha, "active").unwrap();

    // Behind the observer: the passive cone cannot hold the contact
    sim.step(1.0);

    let alpha_types: Vec<_> = sim
        .world()
        .events()
        .iter()
        .filter(|e| e.sensor_ship_id == alpha)
        .map(|e| e.event_type())
        .collect();
    assert_eq!(
        alpha_types,
        ["sensor_ping", "sensor_contact_new", "sensor_contact_lost"]
    );
}

#[test]
fn drain_events_orders_by_time_then_id() {
    let mut sim = sim_with(vec![
        test_ship("alpha"),
        ship_at("bravo", DVec3::new(0.0, 0.0, 10.0)),
        ship_at("charlie", DVec3::new(0.0, 10.0, 0.0)),
    ]);
    sim.step(1.0);
    sim.world_mut().scan(&ShipId::from("charlie"), "active").unwrap();
    sim.step(1.0);

    let events = sim.world().drain_events(0.0);
    assert!(!events.is_empty());
    for pair in events.windows(2) {
        assert!(
            pair[0].time < pair[1].time
                || (pair[0].time == pair[1].time && pair[0].id < pair[1].id)
        );
    }
    assert!(sim.world().drain_events(2.0).is_empty());
    assert_eq!(sim.world().drain_events(0.0), events);
}

#[test]
fn simulation_from_scenario_runs() {
    let scenario: crate::scenario::Scenario = serde_json::from_str(
        r#"{ "ships": [
            { "id": "alpha", "mass_kg": 1.0e6, "helm": { "thrust_vector": [0.0, 0.0, 1.0] } },
            { "id": "bravo", "mass_kg": 1.0e6, "position": [0.0, 0.0, 5.0] }
        ] }"#,
    )
    .unwrap();
    let mut sim: Simulation = scenario.build_simulation().unwrap();
    run(&mut sim, 2, 1.0);
    assert_vec_close(ship(&sim, "alpha").kinematics.velocity, DVec3::new(0.0, 0.0, 2.0), 1e-12);
}
