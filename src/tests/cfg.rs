use rstest::rstest;
use std::str::FromStr;

use crate::cfg::Mode;

#[cfg(feature = "serde")]
use crate::cfg::Setup;

#[rstest]
#[case("linear", Mode::Linear)]
#[case("LINEAR", Mode::Linear)]
#[case("velocity", Mode::Velocity)]
#[case(" Velocity ", Mode::Velocity)]
#[case("spline", Mode::Velocity)]
fn mode_parsing(#[case] input: &str, #[case] expected: Mode) {
    assert_eq!(Mode::from_str(input).unwrap(), expected);
}

#[rstest]
#[case("")]
#[case("cubic")]
#[case("lin ear")]
fn mode_parsing_rejects(#[case] input: &str) {
    assert!(Mode::from_str(input).is_err());
}

#[cfg(feature = "serde")]
#[test]
fn setup_json_round_trip() {
    let setup = Setup::default()
        .with_mode(Mode::Velocity)
        .with_logging(true)
        .with_scenery_offset_fix(true);

    let json = serde_json::to_string(&setup).unwrap();
    let parsed: Setup = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, setup);
}

#[cfg(feature = "serde")]
#[test]
fn setup_json_defaults_apply() {
    let parsed: Setup = serde_json::from_str(r#"{"mode": "spline"}"#).unwrap();
    assert_eq!(parsed.mode, Mode::Velocity);
    assert!(parsed.aircraft_parts);
    assert!(parsed.send_ground_flag);
    assert!(!parsed.log_interpolation);
}
