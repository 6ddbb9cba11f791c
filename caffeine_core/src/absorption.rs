//! Absorption scheduling for consumed beverages.
//!
//! A drink is not absorbed all at once. Each beverage splits its dose
//! into sub-doses with their own absorption offsets:
//! - Coffee: four equal quarters at +0, +15, +30, +45 minutes
//! - Soda: 65% / 25% / 10% at +0, +20, +40 minutes
//! - Chocolate: the whole dose at +0 minutes

use crate::{Beverage, Consumption, Error, PendingEvent, Result};
use chrono::{Duration, NaiveDateTime};

/// (fraction of dose, minutes after entry)
const COFFEE_PROFILE: [(f64, i64); 4] = [(0.25, 0), (0.25, 15), (0.25, 30), (0.25, 45)];
const SODA_PROFILE: [(f64, i64); 3] = [(0.65, 0), (0.25, 20), (0.10, 40)];
const CHOCOLATE_PROFILE: [(f64, i64); 1] = [(1.0, 0)];

/// Absorption profile for a beverage
pub fn profile(beverage: Beverage) -> &'static [(f64, i64)] {
    match beverage {
        Beverage::Coffee => &COFFEE_PROFILE,
        Beverage::Soda => &SODA_PROFILE,
        Beverage::Chocolate => &CHOCOLATE_PROFILE,
    }
}

/// Split `total_mg` of `beverage`, entered at `entered_at`, into pending events
///
/// Events are returned in absorption order. Nothing is merged here; the
/// caller feeds the events through the processor.
pub fn schedule(
    beverage: Beverage,
    total_mg: f64,
    entered_at: NaiveDateTime,
) -> Result<Vec<PendingEvent>> {
    let events = profile(beverage)
        .iter()
        .map(|&(fraction, offset)| {
            let when_to_process = entered_at
                .checked_add_signed(Duration::minutes(offset))
                .ok_or_else(|| {
                    Error::Other(format!(
                        "Absorption time {} + {} mins is out of range",
                        entered_at, offset
                    ))
                })?;
            Ok(PendingEvent {
                when_to_process,
                time_entered: entered_at,
                level: total_mg * fraction,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        "Scheduled {} mg of {} entered at {} as {} sub-doses",
        total_mg,
        beverage,
        entered_at,
        events.len()
    );

    Ok(events)
}

/// Schedule a command-line consumption relative to `now`
pub fn schedule_consumption(consumption: &Consumption, now: NaiveDateTime) -> Result<Vec<PendingEvent>> {
    schedule(
        consumption.beverage,
        consumption.mg as f64,
        consumption.entered_at(now)?,
    )
}
