//! Exponential half-life decay.
//!
//! Formula: remaining = amount * 0.5^(elapsed / half_life)

use crate::types::minutes_between;
use chrono::NaiveDateTime;

/// Caffeine half-life in minutes
pub const HALF_LIFE_MINUTES: f64 = 360.0;

/// Decay `amount` over `elapsed_minutes` for the given half-life.
///
/// Negative amounts decay toward zero the same way positive ones do.
/// A negative elapsed time grows the amount; callers that model future
/// doses defer them instead of calling this.
pub fn decay(amount: f64, elapsed_minutes: f64, half_life_minutes: f64) -> f64 {
    amount * 0.5_f64.powf(elapsed_minutes / half_life_minutes)
}

/// Decay `amount` held at `from` forward to `to` with the caffeine half-life
pub fn decay_between(amount: f64, from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    decay(amount, minutes_between(from, to), HALF_LIFE_MINUTES)
}
