//! Control-Voltage Range
//!
//! Every signal observed on a device port (inputs A and B, output Z) lives
//! inside a symmetric window of simulated volts. Values outside the window
//! are never rejected, they are pinned to the nearest bound.

/// Lowest observable control voltage
pub const MIN: f64 = -2.5;

/// Highest observable control voltage
pub const MAX: f64 = 2.5;

/// Ground reference. A NaN voltage reads as ground.
pub const GND: f64 = 0.0;

/// Pin a voltage into `[MIN, MAX]`.
///
/// Total over `f64`: `+inf` reads as `MAX`, `-inf` as `MIN`, and NaN as
/// [`GND`], so a poisoned computation upstream shows up as silence rather
/// than propagating through every patched device.
#[inline]
pub fn clamp(v: f64) -> f64 {
    if v.is_nan() {
        GND
    } else if v < MIN {
        MIN
    } else if v > MAX {
        MAX
    } else {
        v
    }
}
