#![deny(warnings)]

//! Core domain models and invariants for the essential-oil market atlas.
//!
//! This crate defines the item catalog, the year range used to drive every
//! generator, the run configuration, and the error taxonomy shared by the
//! rest of the workspace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod catalog;

pub use catalog::Catalog;

/// First calendar year accepted by [`YearRange`].
pub const MIN_YEAR: i32 = 1900;
/// Last calendar year accepted by [`YearRange`].
pub const MAX_YEAR: i32 = 2200;

/// Default first year of a generated dataset.
pub const DEFAULT_START_YEAR: i32 = 2000;
/// Default last year of a generated dataset.
pub const DEFAULT_END_YEAR: i32 = 2025;

/// Therapeutic family of an oil. Used for grouping and coloring only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Relaxing,
    Tonic,
    Antiseptic,
    Respiratory,
    Immune,
    Cosmetic,
    Aphrodisiac,
    Detoxifying,
    Balancing,
    Calming,
    Hormonal,
    Digestive,
    Grounding,
    Spiritual,
}

/// Qualitative trend tag shown next to an oil ("+", "++", "+++").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendTag {
    #[serde(rename = "+")]
    Low,
    #[default]
    #[serde(rename = "++")]
    Moderate,
    #[serde(rename = "+++")]
    Strong,
}

/// Static description of one catalog item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemProfile {
    /// Unique, case-sensitive key, e.g. "Lavender".
    pub identifier: String,
    /// World production in tonnes for year 2000 (> 0).
    pub base_production: f64,
    /// Average price in EUR/kg for year 2000 (> 0).
    pub base_price: f64,
    /// Therapeutic family.
    pub category: Category,
    /// Main therapeutic properties.
    pub properties: Vec<String>,
    /// Main producing regions.
    pub source_regions: Vec<String>,
    /// Distillation yield in (0, 1].
    pub yield_ratio: f64,
    /// Main aromatic molecules.
    pub primary_molecules: Vec<String>,
    /// Known contraindications.
    pub contraindications: Vec<String>,
    /// Long-run price direction.
    pub price_trend: TrendTag,
    /// Long-run demand direction.
    pub demand_trend: TrendTag,
    /// Display color as a hex string, e.g. "#6A0572".
    pub display_color: String,
}

/// Inclusive range of calendar years with a yearly step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Build a validated range. `start` must not exceed `end` and both must
    /// lie within [`MIN_YEAR`, `MAX_YEAR`]. The window keeps `year - 2000`
    /// arithmetic free of overflow and caps every series at 301 points.
    pub fn new(start: i32, end: i32) -> Result<Self, ValidationError> {
        for year in [start, end] {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(ValidationError::YearOutOfRange(year));
            }
        }
        if start > end {
            return Err(ValidationError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    /// First year of the range.
    pub fn start(&self) -> i32 {
        self.start
    }

    /// Last year of the range (inclusive).
    pub fn end(&self) -> i32 {
        self.end
    }

    /// Number of years covered. Never zero.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// Ranges are never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + Clone {
        self.start..=self.end
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_YEAR,
            end: DEFAULT_END_YEAR,
        }
    }
}

/// Run parameters, usually read from a YAML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seed for the deterministic noise source.
    pub rng_seed: u64,
    /// First generated year.
    pub start_year: i32,
    /// Last generated year (inclusive).
    pub end_year: i32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
        }
    }
}

impl RunConfig {
    /// Parse a run configuration from YAML. Missing keys take defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The validated year range described by this configuration.
    pub fn year_range(&self) -> Result<YearRange, ValidationError> {
        YearRange::new(self.start_year, self.end_year)
    }
}

/// Validation errors for request parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Range start lies after its end.
    #[error("start year {start} is after end year {end}")]
    StartAfterEnd { start: i32, end: i32 },
    /// Year outside the supported window.
    #[error("year {0} is out of supported range [1900, 2200]")]
    YearOutOfRange(i32),
    /// A comparison needs at least two items.
    #[error("at least 2 items are required, got {0}")]
    TooFewItems(usize),
    /// Noise deviation must be finite and non-negative.
    #[error("invalid noise deviation: {0}")]
    InvalidDeviation(f64),
}

/// Errors raised while building or loading a catalog.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A required base value is absent from a catalog entry.
    #[error("item {item}: missing required field `{field}`")]
    MissingField { item: String, field: &'static str },
    /// Base production or price is zero, negative or non-finite.
    #[error("item {item}: `{field}` must be a positive finite number")]
    NonPositiveBase { item: String, field: &'static str },
    /// Yield ratio outside (0, 1].
    #[error("item {item}: yield ratio {value} must be within (0, 1]")]
    InvalidYield { item: String, value: f64 },
    /// Two entries share an identifier.
    #[error("duplicate item identifier: {0}")]
    DuplicateItem(String),
    /// An entry has a blank identifier.
    #[error("item identifier must not be empty")]
    EmptyIdentifier,
    /// The catalog has no entries.
    #[error("catalog is empty")]
    EmptyCatalog,
    /// The configuration text could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Top-level error returned by catalog lookups and dataset assembly.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OilError {
    /// Unknown item identifier.
    #[error("unknown item: {0}")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Validate a single profile's base values.
pub fn validate_profile(p: &ItemProfile) -> Result<(), ConfigError> {
    if p.identifier.trim().is_empty() {
        return Err(ConfigError::EmptyIdentifier);
    }
    for (field, value) in [
        ("base_production", p.base_production),
        ("base_price", p.base_price),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::NonPositiveBase {
                item: p.identifier.clone(),
                field,
            });
        }
    }
    if !(p.yield_ratio.is_finite() && p.yield_ratio > 0.0 && p.yield_ratio <= 1.0) {
        return Err(ConfigError::InvalidYield {
            item: p.identifier.clone(),
            value: p.yield_ratio,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) fn profile(id: &str) -> ItemProfile {
        ItemProfile {
            identifier: id.to_string(),
            base_production: 100.0,
            base_price: 50.0,
            category: Category::Tonic,
            properties: vec!["tonic".to_string()],
            source_regions: vec!["France".to_string()],
            yield_ratio: 0.01,
            primary_molecules: vec![],
            contraindications: vec![],
            price_trend: TrendTag::Moderate,
            demand_trend: TrendTag::Strong,
            display_color: "#228B22".to_string(),
        }
    }

    #[test]
    fn default_range_covers_26_years() {
        let r = YearRange::default();
        assert_eq!(r.len(), 26);
        assert_eq!(r.years().next(), Some(2000));
        assert_eq!(r.years().last(), Some(2025));
    }

    #[test]
    fn range_rejects_start_after_end() {
        assert_eq!(
            YearRange::new(2010, 2005),
            Err(ValidationError::StartAfterEnd {
                start: 2010,
                end: 2005
            })
        );
    }

    #[test]
    fn range_rejects_years_outside_window() {
        assert_eq!(
            YearRange::new(1800, 2000),
            Err(ValidationError::YearOutOfRange(1800))
        );
        assert_eq!(
            YearRange::new(2000, 2300),
            Err(ValidationError::YearOutOfRange(2300))
        );
    }

    #[test]
    fn single_year_range() {
        let r = YearRange::new(2000, 2000).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r.years().collect::<Vec<_>>(), vec![2000]);
    }

    #[test]
    fn run_config_defaults_fill_missing_keys() {
        let cfg = RunConfig::from_yaml_str("rng_seed: 7\n").unwrap();
        assert_eq!(cfg.rng_seed, 7);
        assert_eq!(cfg.start_year, 2000);
        assert_eq!(cfg.end_year, 2025);
        assert_eq!(cfg.year_range().unwrap().len(), 26);
    }

    #[test]
    fn run_config_rejects_garbage() {
        assert!(matches!(
            RunConfig::from_yaml_str("rng_seed: [oops"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn profile_validation() {
        assert!(validate_profile(&profile("Basil")).is_ok());

        let mut p = profile("Basil");
        p.base_price = 0.0;
        assert_eq!(
            validate_profile(&p),
            Err(ConfigError::NonPositiveBase {
                item: "Basil".to_string(),
                field: "base_price"
            })
        );

        let mut p = profile("Basil");
        p.yield_ratio = 1.5;
        assert!(matches!(
            validate_profile(&p),
            Err(ConfigError::InvalidYield { .. })
        ));

        let mut p = profile("  ");
        p.base_production = f64::NAN;
        assert_eq!(validate_profile(&p), Err(ConfigError::EmptyIdentifier));
    }

    #[test]
    fn trend_tags_serialize_as_plus_signs() {
        let s = serde_json::to_string(&[TrendTag::Low, TrendTag::Moderate, TrendTag::Strong])
            .unwrap();
        assert_eq!(s, r#"["+","++","+++"]"#);
    }

    proptest! {
        #[test]
        fn range_len_matches_span(start in MIN_YEAR..=MAX_YEAR, span in 0i32..100) {
            let end = (start + span).min(MAX_YEAR);
            let r = YearRange::new(start, end).unwrap();
            prop_assert_eq!(r.len(), (end - start + 1) as usize);
            prop_assert_eq!(r.years().count(), r.len());
        }

        #[test]
        fn yield_within_unit_interval_is_valid(y in 0.0001f64..=1.0) {
            let mut p = profile("Vetiver");
            p.yield_ratio = y;
            prop_assert!(validate_profile(&p).is_ok());
        }
    }
}
