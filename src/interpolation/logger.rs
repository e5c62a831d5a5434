use std::collections::VecDeque;

use hifitime::{Duration, Epoch};

use crate::situation::{AircraftSituation, AltitudeCorrection};

/// Diagnostic record of one interpolation step, produced when logging is
/// enabled for the callsign.
#[derive(Debug, Clone, PartialEq)]
pub struct SituationLog {
    /// Engine that produced the step, 'l' linear / 'v' velocity
    pub interpolator: char,
    /// Requested render timestamp
    pub current_time: Option<Epoch>,
    /// Timestamp of the produced situation
    pub interpolated_time: Option<Epoch>,
    /// Adjusted time between the bracketing samples
    pub sample_delta: Duration,
    /// Computed time fraction (clamped for display)
    pub time_fraction: f64,
    /// Unclamped fraction, > 1 signals extrapolation
    pub raw_time_fraction: f64,
    /// Bracketing pair changed on this step
    pub recalculated: bool,
    /// Ground factor of the produced situation
    pub ground_factor: Option<f64>,
    /// Altitude correction applied after evaluation
    pub altitude_correction: AltitudeCorrection,
    /// Bracketing situations used, oldest first
    pub interpolation_situations: Vec<AircraftSituation>,
    /// The produced situation
    pub situation: Option<AircraftSituation>,
    /// Network situations available for the step
    pub situations_count: usize,
}

impl Default for SituationLog {
    fn default() -> Self {
        Self {
            interpolator: '?',
            current_time: None,
            interpolated_time: None,
            sample_delta: Duration::ZERO,
            time_fraction: 0.0,
            raw_time_fraction: 0.0,
            recalculated: false,
            ground_factor: None,
            altitude_correction: AltitudeCorrection::default(),
            interpolation_situations: Vec::new(),
            situation: None,
            situations_count: 0,
        }
    }
}

impl std::fmt::Display for SituationLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] fraction={:.3} (raw {:.3}) delta={} recalc={} corr={} n={}",
            self.interpolator,
            self.time_fraction,
            self.raw_time_fraction,
            self.sample_delta,
            self.recalculated,
            self.altitude_correction,
            self.situations_count,
        )
    }
}

/// Bounded in-memory collector for [SituationLog] records. The consumer
/// (a debug UI, a file writer) drains it at its own pace.
#[derive(Debug, Default)]
pub struct InterpolationLogger {
    capacity: usize,
    logs: VecDeque<SituationLog>,
}

impl InterpolationLogger {
    const DEFAULT_CAPACITY: usize = 500;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            logs: VecDeque::new(),
        }
    }

    /// Stores a record, evicting the oldest past the capacity.
    pub fn log_interpolation(&mut self, log: SituationLog) {
        if self.logs.len() == self.capacity {
            self.logs.pop_front();
        }
        self.logs.push_back(log);
    }

    /// All retained records, oldest first.
    pub fn situation_logs(&self) -> impl Iterator<Item = &SituationLog> {
        self.logs.iter()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn clear(&mut self) {
        self.logs.clear();
    }
}

#[cfg(test)]
mod test {
    use super::{InterpolationLogger, SituationLog};

    #[test]
    fn test_bounded_logger() {
        let mut logger = InterpolationLogger::with_capacity(3);
        for i in 0..5 {
            let log = SituationLog {
                time_fraction: i as f64 / 10.0,
                ..SituationLog::default()
            };
            logger.log_interpolation(log);
        }
        assert_eq!(logger.len(), 3);
        let first = logger.situation_logs().next().unwrap();
        assert_eq!(first.time_fraction, 0.2);
    }
}
