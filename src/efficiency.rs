// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Temperature to machine-efficiency transform.
//!
//! The efficiency score follows a fixed piecewise-linear curve: flat at
//! 75% below the working band, rising linearly to 100% across 24-28 °C,
//! and saturated above it.

/// Lower bound of the linear band (°C).
pub const BAND_LOW: f64 = 24.0;

/// Upper bound of the linear band (°C).
pub const BAND_HIGH: f64 = 28.0;

/// Efficiency below the band (%).
pub const EFFICIENCY_FLOOR: f64 = 75.0;

/// Efficiency above the band (%).
pub const EFFICIENCY_CEIL: f64 = 100.0;

/// Compute the efficiency score for a temperature sample.
///
/// Total function with no failure path; the result is rounded to two
/// decimal places so stored and displayed values agree.
pub fn compute(temperature: f64) -> f64 {
    let raw = if temperature < BAND_LOW {
        EFFICIENCY_FLOOR
    } else if temperature > BAND_HIGH {
        EFFICIENCY_CEIL
    } else {
        EFFICIENCY_FLOOR
            + (temperature - BAND_LOW) * (EFFICIENCY_CEIL - EFFICIENCY_FLOOR)
                / (BAND_HIGH - BAND_LOW)
    };
    round2(raw)
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
