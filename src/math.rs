/// Mean of the values, 0.0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation and mean in one pass over the values.
pub(crate) fn standard_deviation_and_mean(values: &[f64]) -> (f64, f64) {
    let m = mean(values);
    if values.len() < 2 {
        return (0.0, m);
    }
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    (var.sqrt(), m)
}

/// Equality within the given margin.
pub(crate) fn epsilon_equal(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Normalizes an angular delta to the shortest signed path in (-pi, pi].
pub(crate) fn shortest_turn_rad(delta_rad: f64) -> f64 {
    use std::f64::consts::PI;
    if delta_rad > PI {
        -(2.0 * PI - delta_rad)
    } else if delta_rad < -PI {
        2.0 * PI - delta_rad.abs()
    } else {
        delta_rad
    }
}

#[cfg(test)]
mod test {
    use super::{epsilon_equal, mean, shortest_turn_rad, standard_deviation_and_mean};
    use std::f64::consts::PI;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 0.5]), 0.75);
    }

    #[test]
    fn test_std_dev_and_mean() {
        let (dev, m) = standard_deviation_and_mean(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(m, 5.0);
        assert!((dev - 2.0).abs() < 1E-9);
    }

    #[test]
    fn test_shortest_turn() {
        assert!((shortest_turn_rad(1.5 * PI) - (-0.5 * PI)).abs() < 1E-12);
        assert!((shortest_turn_rad(-1.5 * PI) - 0.5 * PI).abs() < 1E-12);
        assert_eq!(shortest_turn_rad(0.25), 0.25);
        assert!(epsilon_equal(shortest_turn_rad(PI), PI, 1E-12));
    }
}
