//! Voltage-Controlled Oscillator
//!
//! [`Vfo`] accumulates a phase angle each tick and emits its sine. Input A is
//! an exponential frequency control: every `1 / sensitivity` volts on A moves
//! the pitch by one octave around `base`.

use crate::config::SimConfig;
use crate::device::{Device, Knobs};
use core::f64::consts::{PI, TAU};
use libm::Libm;
use tracing::debug;

/// Bring a phase angle back into `(-PI, PI]`.
///
/// The common case is a single subtraction of a full turn, which keeps the
/// arithmetic identical to a plain accumulator. Larger excursions (a phase
/// increment of more than a turn per tick) fall back to a Euclidean
/// remainder. A non-finite phase restarts at zero.
pub fn wrap_phase(theta: f64) -> f64 {
    if !theta.is_finite() {
        return 0.0;
    }

    let mut t = theta;
    if t > PI {
        t -= TAU;
    } else if t <= -PI {
        t += TAU;
    }

    if t > PI || t <= -PI {
        t = PI - (PI - t).rem_euclid(TAU);
        if t <= -PI {
            t += TAU;
        }
    }
    t
}

/// Phase-accumulating sine oscillator
///
/// Z = bias + gain * sin(theta), where theta grows by
/// `base * 2^(A * sensitivity) / sample_rate` each tick. The increment is
/// applied to theta directly as radians; one full cycle therefore takes
/// `2 * PI * sample_rate / freq` ticks.
#[derive(Debug, Clone)]
pub struct Vfo {
    knobs: Knobs,
    theta: f64,
    freq: f64,
    sample_rate: f64,
    verbose: bool,
}

impl Vfo {
    pub fn new(knobs: Knobs) -> Self {
        let config = SimConfig::default();
        Self {
            knobs,
            theta: 0.0,
            freq: 0.0,
            sample_rate: config.sample_rate(),
            verbose: config.verbose(),
        }
    }

    /// Current phase angle in `(-PI, PI]`
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Frequency used by the most recent step
    pub fn last_frequency(&self) -> f64 {
        self.freq
    }

    /// Frequency the current A input asks for
    pub fn frequency(&self) -> f64 {
        let k = &self.knobs;
        k.base * Libm::<f64>::pow(2.0, k.a() * k.sensitivity)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl Default for Vfo {
    fn default() -> Self {
        Self::new(Knobs::new("vfo").with_gain(1.0))
    }
}

impl Device for Vfo {
    fn knobs(&self) -> &Knobs {
        &self.knobs
    }

    fn knobs_mut(&mut self) -> &mut Knobs {
        &mut self.knobs
    }

    fn step(&mut self) {
        let freq = self.frequency();
        let delta_time = 1.0 / self.sample_rate;
        let delta_phase = delta_time * freq;

        self.freq = freq;
        self.theta = wrap_phase(self.theta + delta_phase);

        let z = self.knobs.bias + self.knobs.gain * Libm::<f64>::sin(self.theta);
        self.knobs.store_z(z);

        if self.verbose {
            debug!(
                device = %self.knobs.name,
                a = self.knobs.a(),
                freq,
                delta_time,
                delta_phase,
                theta = self.theta,
                z,
                "vfo step"
            );
        }
    }

    fn configure(&mut self, config: &SimConfig) {
        self.sample_rate = config.sample_rate();
        self.verbose = config.verbose();
    }

    fn reset(&mut self) {
        self.knobs.clear_signals();
        self.theta = 0.0;
        self.freq = 0.0;
    }

    fn type_id(&self) -> &'static str {
        "vfo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voltage::{MAX, MIN};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn vfo(base: f64, sensitivity: f64, rate: f64) -> Vfo {
        let mut v = Vfo::new(
            Knobs::new("v")
                .with_gain(1.0)
                .with_base(base)
                .with_sensitivity(sensitivity),
        );
        v.configure(&SimConfig::new(rate).unwrap());
        v
    }

    #[test]
    fn test_wrap_phase_single_turn() {
        assert_eq!(wrap_phase(1.0), 1.0);
        assert_eq!(wrap_phase(PI), PI);
        assert_eq!(wrap_phase(PI + 0.5), PI + 0.5 - TAU);
        assert_eq!(wrap_phase(-PI), PI);
    }

    #[test]
    fn test_wrap_phase_many_turns() {
        for theta in [10.0 * TAU + 0.3, -7.0 * TAU - 0.3, 1e6, -1e6] {
            let t = wrap_phase(theta);
            assert!(t > -PI && t <= PI, "{} wrapped to {}", theta, t);
            assert_abs_diff_eq!(t.sin(), theta.sin(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_wrap_phase_non_finite() {
        assert_eq!(wrap_phase(f64::NAN), 0.0);
        assert_eq!(wrap_phase(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_phase_advances_by_freq_over_rate() {
        let mut v = vfo(100.0, 1.0, 8000.0);
        let delta = 100.0 / 8000.0;
        for i in 1..=50 {
            v.step();
            assert_relative_eq!(v.theta(), delta * i as f64, max_relative = 1e-12);
            assert_relative_eq!(v.get_z(), v.theta().sin(), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_wraps_within_one_turn_of_ticks() {
        let (base, rate) = (440.0, 8000.0);
        let mut v = vfo(base, 0.0, rate);
        let n = (TAU * rate / base).ceil() as usize;

        let mut wrapped = false;
        let mut prev = v.theta();
        for _ in 0..n {
            v.step();
            let t = v.theta();
            assert!(t > -PI && t <= PI);
            if t < prev {
                wrapped = true;
            }
            prev = t;
        }
        assert!(wrapped);
    }

    #[test]
    fn test_doubling_sensitivity_doubles_octave_shift() {
        let (base, rate, ticks) = (1.0, 1000.0, 10);
        let mut single = vfo(base, 1.0, rate);
        let mut double = vfo(base, 2.0, rate);
        single.set_a(1.0);
        double.set_a(1.0);

        assert_relative_eq!(single.frequency(), 2.0);
        assert_relative_eq!(double.frequency(), 4.0);

        for _ in 0..ticks {
            single.step();
            double.step();
        }
        assert_relative_eq!(single.theta(), ticks as f64 * 2.0 / rate, max_relative = 1e-12);
        assert_relative_eq!(double.theta(), 2.0 * single.theta(), max_relative = 1e-12);
    }

    #[test]
    fn test_negative_a_lowers_pitch() {
        let mut v = vfo(200.0, 1.0, 8000.0);
        v.set_a(-1.0);
        assert_relative_eq!(v.frequency(), 100.0);
        v.step();
        assert_relative_eq!(v.last_frequency(), 100.0);
    }

    #[test]
    fn test_output_is_clamped_for_large_gain() {
        let mut v = Vfo::new(Knobs::new("loud").with_gain(100.0).with_base(2000.0));
        v.configure(&SimConfig::new(8000.0).unwrap());
        for _ in 0..200 {
            v.step();
            let z = v.get_z();
            assert!((MIN..=MAX).contains(&z));
        }
    }

    #[test]
    fn test_bias_offsets_output() {
        let mut v = Vfo::new(Knobs::new("dc").with_bias(1.5).with_gain(0.0).with_base(50.0));
        v.step();
        assert_eq!(v.get_z(), 1.5);
    }

    #[test]
    fn test_huge_increment_stays_wrapped() {
        // several full turns per tick
        let mut v = vfo(30000.0 * TAU, 0.0, 8000.0);
        for _ in 0..100 {
            v.step();
            assert!(v.theta() > -PI && v.theta() <= PI);
        }
    }

    #[test]
    fn test_reset_restarts_phase() {
        let mut v = vfo(440.0, 1.0, 8000.0);
        v.set_a(1.0);
        for _ in 0..10 {
            v.step();
        }
        v.reset();
        assert_eq!(v.theta(), 0.0);
        assert_eq!(v.knobs().a(), 0.0);
        assert_eq!(v.get_z(), 0.0);
        assert_eq!(v.knobs().base, 440.0);
    }

    #[test]
    fn test_default_rate_before_configure() {
        let v = Vfo::default();
        assert_eq!(v.sample_rate(), crate::config::DEFAULT_SAMPLE_RATE);
        assert_eq!(v.type_id(), "vfo");
    }
}
