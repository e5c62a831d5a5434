use hifitime::Duration;

use crate::{
    callsign::Callsign,
    cfg::{Mode, Setup},
    change::ModelHints,
    interpolation::Interpolator,
    provider::{
        MemoryElevationSource, MemorySetupSource, MemorySituationSource, SituationSource,
    },
    situation::{AircraftVelocity, GroundDetails, GroundState},
    tests::{grounded_situation, init_logger, test_epoch, test_history, test_situation},
};

fn providers() -> (MemorySituationSource, MemoryElevationSource, MemorySetupSource) {
    (
        MemorySituationSource::new(),
        MemoryElevationSource::new(),
        MemorySetupSource::new(Setup::default()),
    )
}

#[test]
fn linear_sweep_is_interpolated_and_monotonic() {
    init_logger();

    let cs = Callsign::new("DLH123");
    let (situations, elevations, setups) = providers();

    let ts = test_epoch();
    let delta = Duration::from_milliseconds(5000.0);
    let offset = Duration::from_milliseconds(5000.0);
    for situation in test_history(&cs, 10, ts, delta, offset) {
        situations.insert(situation).unwrap();
    }

    let mut interpolator = Interpolator::new(cs.clone(), &situations, &elevations, &setups);

    let from = ts - Duration::from_milliseconds(10_000.0) + offset;
    let to = ts;
    let step = Duration::from_milliseconds(250.0);

    let mut current = from;
    let mut last_lat = f64::MAX;
    let mut last_lon = f64::MAX;
    while current < to {
        let result = interpolator.interpolate(current);
        assert!(
            result.status.is_interpolated(),
            "value was not interpolated at {}",
            current
        );
        let situation = result.situation.expect("interpolated situation");
        assert_eq!(situation.callsign, cs);

        // sample latitudes/longitudes decrease towards the latest sample
        let lat = situation.position.latitude_deg();
        let lon = situation.position.longitude_deg();
        assert!(lat < last_lat && lon < last_lon, "values shall decrease");
        assert!(lat >= 0.0 && lat <= 10.0, "latitude out of range: {}", lat);
        last_lat = lat;
        last_lon = lon;

        current = current + step;
    }
}

#[test]
fn empty_history_reports_not_interpolated() {
    let cs = Callsign::new("NOBODY");
    let (situations, elevations, setups) = providers();
    let mut interpolator = Interpolator::new(cs, &situations, &elevations, &setups);

    let result = interpolator.interpolate(test_epoch());
    assert!(!result.status.is_interpolated());
    assert!(result.situation.is_none());
    assert_eq!(result.status.situations_count(), 0);
    assert!(result.status.extra_info().is_some());
}

#[test]
fn single_sample_holds_position() {
    let cs = Callsign::new("DLH123");
    let (situations, elevations, setups) = providers();

    let sample = test_situation(&cs, 0, test_epoch(), Duration::ZERO, Duration::ZERO);
    situations.insert(sample.clone()).unwrap();

    let mut interpolator = Interpolator::new(cs, &situations, &elevations, &setups);
    let result = interpolator.interpolate(test_epoch() + Duration::from_milliseconds(1000.0));

    assert!(!result.status.is_interpolated());
    let situation = result.situation.expect("held situation");
    assert!(
        (situation.position.latitude_deg() - sample.position.latitude_deg()).abs() < 1E-9
    );
}

#[test]
fn diagnostic_log_produced_when_enabled() {
    let cs = Callsign::new("DLH123");
    let (situations, elevations, _) = providers();
    let setups = MemorySetupSource::new(Setup::default().with_logging(true));

    let ts = test_epoch();
    let delta = Duration::from_milliseconds(5000.0);
    for situation in test_history(&cs, 5, ts, delta, Duration::ZERO) {
        situations.insert(situation).unwrap();
    }

    let mut interpolator = Interpolator::new(cs, &situations, &elevations, &setups);
    let result = interpolator.interpolate(ts - Duration::from_milliseconds(7500.0));

    let log = result.log.expect("log record");
    assert_eq!(log.interpolator, 'l');
    assert!(log.recalculated);
    assert!(log.time_fraction > 0.0 && log.time_fraction < 1.0);
    assert_eq!(log.interpolation_situations.len(), 2);
    assert_eq!(log.situations_count, 5);

    // without logging no record is produced
    let setups = MemorySetupSource::new(Setup::default());
    let (situations2, elevations2, _) = providers();
    for situation in test_history(&Callsign::new("DLH123"), 5, ts, delta, Duration::ZERO) {
        situations2.insert(situation).unwrap();
    }
    let mut quiet =
        Interpolator::new(Callsign::new("DLH123"), &situations2, &elevations2, &setups);
    assert!(quiet.interpolate(ts - Duration::from_milliseconds(7500.0)).log.is_none());
}

#[test]
fn velocity_mode_extrapolates_ahead() {
    init_logger();

    let cs = Callsign::new("DLH123");
    let (situations, elevations, _) = providers();
    let setups = MemorySetupSource::new(Setup::default().with_mode(Mode::Velocity));

    let ts = test_epoch();
    let mut sample = test_situation(&cs, 0, ts, Duration::ZERO, Duration::ZERO);
    sample.ground_speed_m_s = 100.0;
    sample = sample.with_velocity(AircraftVelocity::new(0.0, 0.0, 100.0, 0.0, 0.0, 0.0));
    situations.insert(sample.clone()).unwrap();

    let mut interpolator = Interpolator::new(cs, &situations, &elevations, &setups);

    // 2s past the only sample: the linear engine would hold, the
    // velocity engine keeps moving north
    let result = interpolator.interpolate(ts + Duration::from_milliseconds(2000.0));
    assert!(result.status.is_interpolated());
    let situation = result.situation.expect("extrapolated situation");
    let moved_m = situation
        .position
        .great_circle_distance_m(&sample.position);
    assert!((moved_m - 200.0).abs() < 2.0, "moved {}m", moved_m);
}

#[test]
fn mode_switch_rebuilds_engine() {
    let cs = Callsign::new("DLH123");
    let (situations, elevations, _) = providers();
    let setups = MemorySetupSource::new(Setup::default());

    let ts = test_epoch();
    let delta = Duration::from_milliseconds(5000.0);
    for situation in test_history(&cs, 5, ts, delta, Duration::ZERO) {
        situations.insert(situation).unwrap();
    }

    let mut interpolator = Interpolator::new(cs.clone(), &situations, &elevations, &setups);
    assert!(interpolator
        .interpolate(ts - Duration::from_milliseconds(7500.0))
        .status
        .is_interpolated());

    // switch to velocity mid flight
    setups.set_override(cs, Setup::default().with_mode(Mode::Velocity));
    let result = interpolator.interpolate(ts - Duration::from_milliseconds(7000.0));
    assert!(result.situation.is_some());
}

#[test]
fn ground_flag_blends_with_hysteresis() {
    let cs = Callsign::new("DLH123");
    let (situations, elevations, setups) = providers();

    let ts = test_epoch();
    let delta = Duration::from_milliseconds(5000.0);
    // airborne throughout, reported by the network
    for mut situation in test_history(&cs, 5, ts, delta, Duration::ZERO) {
        situation.ground_state = GroundState::Airborne;
        situation.ground_details = GroundDetails::Reported;
        situations.insert(situation).unwrap();
    }

    let mut interpolator = Interpolator::new(cs, &situations, &elevations, &setups);
    let result = interpolator.interpolate(ts - Duration::from_milliseconds(7500.0));
    let situation = result.situation.expect("situation");
    assert!(!situation.ground_state.is_on_ground());
    assert_eq!(situation.ground_details, GroundDetails::Interpolated);
}

#[test]
fn scenery_offset_fix_shifts_altitudes() {
    init_logger();

    let cs = Callsign::new("DLH123");
    let (situations, elevations, _) = providers();
    let setups = MemorySetupSource::new(Setup::default().with_scenery_offset_fix(true));

    let ts = test_epoch();
    // parked on the apron: constant position, constant AGL of 2m above
    // elevation+CG, reported on ground
    for i in 0..6 {
        let mut situation = grounded_situation(
            &cs,
            ts - Duration::from_milliseconds(5000.0 * i as f64),
            447.0,
        );
        situation.add_altitude_offset_m(3.0); // remote scenery sits too high
        situations.insert(situation).unwrap();
    }

    let hints = ModelHints {
        cg_m: Some(2.0),
        ..ModelHints::default()
    };
    let mut interpolator =
        Interpolator::new(cs.clone(), &situations, &elevations, &setups).with_model_hints(hints);

    let result = interpolator.interpolate(ts - Duration::from_milliseconds(2500.0));
    assert!(result.situation.is_some());

    // deviation: altitude 449+3 vs elevation 447 => AGL 5m, minus CG 2m => 3m
    let deviation = interpolator.scenery_offset_m().expect("guessed deviation");
    assert!((deviation - 3.0).abs() < 1E-6, "deviation {}", deviation);
}

#[test]
fn eviction_keeps_interpolation_alive() {
    let cs = Callsign::new("DLH123");
    let (situations, elevations, setups) = providers();

    let ts = test_epoch();
    let delta = Duration::from_milliseconds(1000.0);
    // overfill far beyond the cap
    for number in (0..120).rev() {
        situations
            .insert(test_situation(&cs, number, ts, delta, Duration::ZERO))
            .unwrap();
    }
    assert_eq!(
        situations.situations(&cs).len(),
        crate::constants::MAX_SITUATIONS_PER_CALLSIGN
    );

    let mut interpolator = Interpolator::new(cs, &situations, &elevations, &setups);
    let result = interpolator.interpolate(ts - Duration::from_milliseconds(1500.0));
    assert!(result.status.is_interpolated());
}
