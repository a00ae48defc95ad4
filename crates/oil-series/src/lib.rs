#![deny(warnings)]

//! Stochastic yearly series generators.
//!
//! Five parametric models turn a base value and a [`YearRange`] into one
//! [`YearlySeries`]:
//! - Trend growth with multiplicative noise and fixed-year event shocks
//! - Quality improvement capped at 100
//! - Usage growth capped at 100
//! - Piecewise research adoption (no base)
//! - Environmental impact decay floored at 10
//!
//! Every generator draws exactly one normal sample per year, in year order,
//! from the random source it is given.

use oil_core::{ValidationError, YearRange};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Default noise deviation of the trend model.
pub const DEFAULT_VOLATILITY: f64 = 0.1;
/// Noise deviation of the quality model.
pub const QUALITY_NOISE: f64 = 0.05;
/// Noise deviation of the usage model.
pub const USAGE_NOISE: f64 = 0.08;
/// Noise deviation of the research model.
pub const RESEARCH_NOISE: f64 = 0.2;
/// Noise deviation of the impact model.
pub const IMPACT_NOISE: f64 = 0.08;
/// Upper bound of percentage-like scores.
pub const SCORE_CAP: f64 = 100.0;
/// Irreducible environmental impact.
pub const IMPACT_FLOOR: f64 = 10.0;
/// Default improvement rate of the quality model.
pub const DEFAULT_IMPROVEMENT: f64 = 0.01;
/// Default growth rate of the usage model.
pub const DEFAULT_USAGE_GROWTH: f64 = 0.015;

/// Reference year for year-anchored models.
const ANCHOR_YEAR: i32 = 2000;

/// One point of a yearly series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// Values for consecutive years, ascending, without gaps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearlySeries {
    points: Vec<YearValue>,
}

impl YearlySeries {
    /// Build a series by evaluating `f(index, year)` for every year of `range`.
    pub fn from_fn(range: &YearRange, mut f: impl FnMut(usize, i32) -> f64) -> Self {
        let points = range
            .years()
            .enumerate()
            .map(|(i, year)| YearValue {
                year,
                value: f(i, year),
            })
            .collect();
        Self { points }
    }

    /// Pair precomputed values with the years of `range`.
    /// Returns `None` when the lengths differ.
    pub fn from_values(range: &YearRange, values: Vec<f64>) -> Option<Self> {
        if values.len() != range.len() {
            return None;
        }
        let points = range
            .years()
            .zip(values)
            .map(|(year, value)| YearValue { year, value })
            .collect();
        Some(Self { points })
    }

    pub fn points(&self) -> &[YearValue] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Values in year order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Value for `year`, if covered.
    pub fn get(&self, year: i32) -> Option<f64> {
        let first = self.points.first()?.year;
        let idx = usize::try_from(year.checked_sub(first)?).ok()?;
        self.points.get(idx).map(|p| p.value)
    }

    pub fn first(&self) -> Option<f64> {
        self.points.first().map(|p| p.value)
    }

    pub fn last(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }

    /// Largest value, ignoring NaN.
    pub fn max(&self) -> Option<f64> {
        self.values().filter(|v| !v.is_nan()).reduce(f64::max)
    }

    /// Every value divided by the series maximum.
    /// Returns `None` when the maximum is not strictly positive.
    pub fn normalized(&self) -> Option<Self> {
        let max = self.max().filter(|m| *m > 0.0 && m.is_finite())?;
        let points = self
            .points
            .iter()
            .map(|p| YearValue {
                year: p.year,
                value: p.value / max,
            })
            .collect();
        Some(Self { points })
    }
}

/// Multiplicative shock applied to the trend noise in event years:
/// 2008 recession (0.9) and 2020 demand spike (1.2).
pub fn event_shock(year: i32) -> f64 {
    match year {
        2008 => 0.9,
        2020 => 1.2,
        _ => 1.0,
    }
}

/// Draw one factor from N(1, deviation).
fn noise_factor<R: Rng + ?Sized>(rng: &mut R, deviation: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    1.0 + deviation * z
}

/// Linear growth in the year index with noise and event shocks.
///
/// value_i = base * (1 + trend_rate * i) * N(1, volatility) * shock(year).
/// No clamp is applied. `volatility` must be finite and non-negative.
///
/// Example:
/// let r = YearRange::new(2000, 2025).unwrap();
/// let s = trend(&mut rng, 150.0, &r, 0.08, DEFAULT_VOLATILITY).unwrap();
/// assert_eq!(s.len(), 26);
pub fn trend<R: Rng + ?Sized>(
    rng: &mut R,
    base: f64,
    range: &YearRange,
    trend_rate: f64,
    volatility: f64,
) -> Result<YearlySeries, ValidationError> {
    if !(volatility.is_finite() && volatility >= 0.0) {
        return Err(ValidationError::InvalidDeviation(volatility));
    }
    Ok(YearlySeries::from_fn(range, |i, year| {
        let growth = 1.0 + trend_rate * i as f64;
        let noise = noise_factor(&mut *rng, volatility) * event_shock(year);
        base * growth * noise
    }))
}

/// Slowly improving score, capped at 100.
///
/// value_i = min(100, base * (1 + improvement_rate * i) * N(1, 0.05)).
pub fn quality<R: Rng + ?Sized>(
    rng: &mut R,
    base: f64,
    range: &YearRange,
    improvement_rate: f64,
) -> YearlySeries {
    YearlySeries::from_fn(range, |i, _| {
        let improvement = 1.0 + improvement_rate * i as f64;
        (base * improvement * noise_factor(&mut *rng, QUALITY_NOISE)).min(SCORE_CAP)
    })
}

/// Usage score growing with the calendar year, capped at 100.
///
/// value = min(100, base * (1 + growth_rate * (year - 2000)) * N(1, 0.08)).
pub fn usage<R: Rng + ?Sized>(
    rng: &mut R,
    base: f64,
    range: &YearRange,
    growth_rate: f64,
) -> YearlySeries {
    YearlySeries::from_fn(range, |_, year| {
        let growth = 1.0 + growth_rate * f64::from(year - ANCHOR_YEAR);
        (base * growth * noise_factor(&mut *rng, USAGE_NOISE)).min(SCORE_CAP)
    })
}

/// Noise-free study count of the research model.
///
/// Three linear phases: slow up to 2005, accelerating up to 2015, mature
/// afterwards. 2000 -> 5, 2005 -> 15, 2006 -> 20, 2015 -> 65, 2016 -> 73.
pub fn research_baseline(year: i32) -> f64 {
    let y = f64::from(year);
    if year <= 2005 {
        5.0 + (y - 2000.0) * 2.0
    } else if year <= 2015 {
        15.0 + (y - 2005.0) * 5.0
    } else {
        65.0 + (y - 2015.0) * 8.0
    }
}

/// Cumulative scientific studies: piecewise baseline times N(1, 0.2).
/// Not clamped; counts may exceed 100.
pub fn research<R: Rng + ?Sized>(rng: &mut R, range: &YearRange) -> YearlySeries {
    YearlySeries::from_fn(range, |_, year| {
        research_baseline(year) * noise_factor(&mut *rng, RESEARCH_NOISE)
    })
}

/// Environmental impact decaying 1% of base per year since 2000, floored at 10.
///
/// value = max(10, base * (1 - 0.01 * (year - 2000)) * N(1, 0.08)).
/// Past 2100 the decay factor turns negative and the floor takes over.
pub fn impact<R: Rng + ?Sized>(rng: &mut R, base: f64, range: &YearRange) -> YearlySeries {
    YearlySeries::from_fn(range, |_, year| {
        let decay = 1.0 - 0.01 * f64::from(year - ANCHOR_YEAR);
        (base * decay * noise_factor(&mut *rng, IMPACT_NOISE)).max(IMPACT_FLOOR)
    })
}
