#![deny(warnings)]

//! Dataset assembly: runs every series generator for one catalog item and
//! zips the results into a year-keyed table of 14 metrics.

use oil_core::{Catalog, ItemProfile, OilError, RunConfig, ValidationError, YearRange};
use oil_series::{
    impact, quality, research, trend, usage, YearlySeries, DEFAULT_VOLATILITY,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod analytics;

/// The 14 generated metrics, in generation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    WorldProduction,
    AveragePrice,
    WorldDemand,
    MarketValue,
    TherapeuticEfficacy,
    ScientificStudies,
    OrganicQuality,
    AromatherapyUsage,
    CosmeticUsage,
    PharmaceuticalUsage,
    EnvironmentalImpact,
    ProductionSustainability,
    Exports,
    CultivatedArea,
}

/// Parameters of the model behind one metric.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Model {
    Trend { base: f64, rate: f64 },
    Quality { base: f64, rate: f64 },
    Usage { base: f64, rate: f64 },
    Research,
    Impact { base: f64 },
}

impl Metric {
    pub const ALL: [Metric; 14] = [
        Metric::WorldProduction,
        Metric::AveragePrice,
        Metric::WorldDemand,
        Metric::MarketValue,
        Metric::TherapeuticEfficacy,
        Metric::ScientificStudies,
        Metric::OrganicQuality,
        Metric::AromatherapyUsage,
        Metric::CosmeticUsage,
        Metric::PharmaceuticalUsage,
        Metric::EnvironmentalImpact,
        Metric::ProductionSustainability,
        Metric::Exports,
        Metric::CultivatedArea,
    ];

    /// Column name used by the presentation layer.
    pub fn name(self) -> &'static str {
        match self {
            Metric::WorldProduction => "world_production",
            Metric::AveragePrice => "average_price",
            Metric::WorldDemand => "world_demand",
            Metric::MarketValue => "market_value",
            Metric::TherapeuticEfficacy => "therapeutic_efficacy",
            Metric::ScientificStudies => "scientific_studies",
            Metric::OrganicQuality => "organic_quality",
            Metric::AromatherapyUsage => "aromatherapy_usage",
            Metric::CosmeticUsage => "cosmetic_usage",
            Metric::PharmaceuticalUsage => "pharmaceutical_usage",
            Metric::EnvironmentalImpact => "environmental_impact",
            Metric::ProductionSustainability => "production_sustainability",
            Metric::Exports => "exports",
            Metric::CultivatedArea => "cultivated_area",
        }
    }

    /// Parse a column name.
    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Whether values are percentage scores capped at 100.
    pub fn is_capped_score(self) -> bool {
        matches!(
            self,
            Metric::TherapeuticEfficacy
                | Metric::OrganicQuality
                | Metric::AromatherapyUsage
                | Metric::CosmeticUsage
                | Metric::PharmaceuticalUsage
                | Metric::ProductionSustainability
        )
    }

    fn model(self, p: &ItemProfile) -> Model {
        let prod = p.base_production;
        match self {
            Metric::WorldProduction => Model::Trend { base: prod, rate: 0.08 },
            Metric::AveragePrice => Model::Trend { base: p.base_price, rate: 0.06 },
            Metric::WorldDemand => Model::Trend { base: prod * 0.9, rate: 0.12 },
            Metric::MarketValue => Model::Trend {
                base: prod * p.base_price / 1000.0,
                rate: 0.15,
            },
            Metric::TherapeuticEfficacy => Model::Quality { base: 75.0, rate: 0.012 },
            Metric::ScientificStudies => Model::Research,
            Metric::OrganicQuality => Model::Quality { base: 60.0, rate: 0.025 },
            Metric::AromatherapyUsage => Model::Usage { base: 70.0, rate: 0.015 },
            Metric::CosmeticUsage => Model::Usage { base: 65.0, rate: 0.020 },
            Metric::PharmaceuticalUsage => Model::Usage { base: 40.0, rate: 0.025 },
            Metric::EnvironmentalImpact => Model::Impact { base: 45.0 },
            Metric::ProductionSustainability => Model::Quality { base: 65.0, rate: 0.015 },
            Metric::Exports => Model::Trend { base: prod * 0.7, rate: 0.10 },
            Metric::CultivatedArea => Model::Trend {
                base: prod / p.yield_ratio * 10.0,
                rate: 0.09,
            },
        }
    }

    fn generate<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        profile: &ItemProfile,
        range: &YearRange,
    ) -> Result<YearlySeries, ValidationError> {
        Ok(match self.model(profile) {
            Model::Trend { base, rate } => trend(rng, base, range, rate, DEFAULT_VOLATILITY)?,
            Model::Quality { base, rate } => quality(rng, base, range, rate),
            Model::Usage { base, rate } => usage(rng, base, range, rate),
            Model::Research => research(rng, range),
            Model::Impact { base } => impact(rng, base, range),
        })
    }
}

/// One year of an [`ItemDataset`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub year: i32,
    pub world_production: f64,
    pub average_price: f64,
    pub world_demand: f64,
    pub market_value: f64,
    pub therapeutic_efficacy: f64,
    pub scientific_studies: f64,
    pub organic_quality: f64,
    pub aromatherapy_usage: f64,
    pub cosmetic_usage: f64,
    pub pharmaceutical_usage: f64,
    pub environmental_impact: f64,
    pub production_sustainability: f64,
    pub exports: f64,
    pub cultivated_area: f64,
}

impl DatasetRow {
    fn build(year: i32, value: impl Fn(Metric) -> f64) -> Self {
        Self {
            year,
            world_production: value(Metric::WorldProduction),
            average_price: value(Metric::AveragePrice),
            world_demand: value(Metric::WorldDemand),
            market_value: value(Metric::MarketValue),
            therapeutic_efficacy: value(Metric::TherapeuticEfficacy),
            scientific_studies: value(Metric::ScientificStudies),
            organic_quality: value(Metric::OrganicQuality),
            aromatherapy_usage: value(Metric::AromatherapyUsage),
            cosmetic_usage: value(Metric::CosmeticUsage),
            pharmaceutical_usage: value(Metric::PharmaceuticalUsage),
            environmental_impact: value(Metric::EnvironmentalImpact),
            production_sustainability: value(Metric::ProductionSustainability),
            exports: value(Metric::Exports),
            cultivated_area: value(Metric::CultivatedArea),
        }
    }

    /// Value of `metric` in this row.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::WorldProduction => self.world_production,
            Metric::AveragePrice => self.average_price,
            Metric::WorldDemand => self.world_demand,
            Metric::MarketValue => self.market_value,
            Metric::TherapeuticEfficacy => self.therapeutic_efficacy,
            Metric::ScientificStudies => self.scientific_studies,
            Metric::OrganicQuality => self.organic_quality,
            Metric::AromatherapyUsage => self.aromatherapy_usage,
            Metric::CosmeticUsage => self.cosmetic_usage,
            Metric::PharmaceuticalUsage => self.pharmaceutical_usage,
            Metric::EnvironmentalImpact => self.environmental_impact,
            Metric::ProductionSustainability => self.production_sustainability,
            Metric::Exports => self.exports,
            Metric::CultivatedArea => self.cultivated_area,
        }
    }
}

/// Generated table for one item: one row per year, ascending, never empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemDataset {
    item: String,
    range: YearRange,
    rows: Vec<DatasetRow>,
}

impl ItemDataset {
    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row of the first year.
    pub fn first(&self) -> &DatasetRow {
        &self.rows[0]
    }

    /// Row of the last year.
    pub fn last(&self) -> &DatasetRow {
        &self.rows[self.rows.len() - 1]
    }

    /// Row for `year`, if covered.
    pub fn row(&self, year: i32) -> Option<&DatasetRow> {
        let idx = usize::try_from(year.checked_sub(self.range.start())?).ok()?;
        self.rows.get(idx)
    }

    /// One metric as a standalone series.
    pub fn column(&self, metric: Metric) -> YearlySeries {
        YearlySeries::from_fn(&self.range, |i, _| self.rows[i].get(metric))
    }
}

/// Builds [`ItemDataset`]s from a shared, read-only catalog.
#[derive(Clone, Copy, Debug)]
pub struct Assembler<'a> {
    catalog: &'a Catalog,
}

impl<'a> Assembler<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Generate the dataset of `identifier` over `[start_year, end_year]`.
    ///
    /// The range is validated before the catalog lookup.
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        identifier: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<ItemDataset, OilError> {
        let range = YearRange::new(start_year, end_year)?;
        self.assemble_range(rng, identifier, &range)
    }

    /// Same as [`Assembler::assemble`] with an already validated range.
    pub fn assemble_range<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        identifier: &str,
        range: &YearRange,
    ) -> Result<ItemDataset, OilError> {
        let profile = self.catalog.get_profile(identifier)?;
        let mut columns = Vec::with_capacity(Metric::ALL.len());
        for metric in Metric::ALL {
            columns.push(metric.generate(rng, profile, range)?);
        }
        let rows = range
            .years()
            .enumerate()
            .map(|(i, year)| DatasetRow::build(year, |m| columns[m as usize].points()[i].value))
            .collect::<Vec<_>>();
        debug!(
            item = identifier,
            start = range.start(),
            end = range.end(),
            rows = rows.len(),
            "dataset assembled"
        );
        Ok(ItemDataset {
            item: profile.identifier.clone(),
            range: *range,
            rows,
        })
    }

    /// Generate with a fresh `ChaCha8Rng` seeded from `seed`.
    pub fn assemble_seeded(
        &self,
        seed: u64,
        identifier: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<ItemDataset, OilError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.assemble(&mut rng, identifier, start_year, end_year)
    }

    /// Generate using the seed and years of a [`RunConfig`].
    pub fn assemble_config(
        &self,
        cfg: &RunConfig,
        identifier: &str,
    ) -> Result<ItemDataset, OilError> {
        self.assemble_seeded(cfg.rng_seed, identifier, cfg.start_year, cfg.end_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oil_series::{IMPACT_FLOOR, SCORE_CAP};
    use proptest::prelude::*;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn default_range_has_26_rows_in_order() {
        let c = catalog();
        let ds = Assembler::new(&c)
            .assemble_seeded(42, "Lavender", 2000, 2025)
            .unwrap();
        assert_eq!(ds.len(), 26);
        assert_eq!(ds.item(), "Lavender");
        assert_eq!(ds.first().year, 2000);
        assert_eq!(ds.last().year, 2025);
        assert!(ds.rows().windows(2).all(|w| w[0].year + 1 == w[1].year));
        for row in ds.rows() {
            for m in Metric::ALL {
                assert!(row.get(m).is_finite(), "{} in {}", m.name(), row.year);
            }
        }
    }

    #[test]
    fn single_year_stays_near_bases() {
        let c = catalog();
        let asm = Assembler::new(&c);
        for seed in 0..50 {
            let ds = asm.assemble_seeded(seed, "Lavender", 2000, 2000).unwrap();
            assert_eq!(ds.len(), 1);
            let row = ds.first();
            // 6 sigma of a N(1, 0.1) factor
            assert!((row.world_production - 150.0).abs() < 150.0 * 0.6);
            assert!((row.average_price - 45.0).abs() < 45.0 * 0.6);
            assert!(row.world_production > 0.0 && row.average_price > 0.0);
        }
    }

    #[test]
    fn unknown_item_is_not_found() {
        let c = catalog();
        let err = Assembler::new(&c)
            .assemble_seeded(1, "unknown-item", 2000, 2010)
            .unwrap_err();
        assert_eq!(err, OilError::NotFound("unknown-item".to_string()));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let c = catalog();
        let err = Assembler::new(&c)
            .assemble_seeded(1, "Lavender", 2010, 2005)
            .unwrap_err();
        assert_eq!(
            err,
            OilError::Validation(ValidationError::StartAfterEnd {
                start: 2010,
                end: 2005
            })
        );
    }

    #[test]
    fn seeded_assembly_is_deterministic() {
        let c = catalog();
        let asm = Assembler::new(&c);
        let a = asm.assemble_seeded(99, "Myrrh", 2000, 2025).unwrap();
        let b = asm.assemble_seeded(99, "Myrrh", 2000, 2025).unwrap();
        assert_eq!(a, b);
        let c2 = asm.assemble_seeded(100, "Myrrh", 2000, 2025).unwrap();
        assert_ne!(a, c2);
    }

    #[test]
    fn config_drives_seed_and_years() {
        let c = catalog();
        let asm = Assembler::new(&c);
        let cfg = RunConfig {
            rng_seed: 5,
            start_year: 2010,
            end_year: 2015,
        };
        let ds = asm.assemble_config(&cfg, "Sage").unwrap();
        assert_eq!(ds.len(), 6);
        assert_eq!(ds, asm.assemble_seeded(5, "Sage", 2010, 2015).unwrap());
    }

    #[test]
    fn column_and_row_lookup_agree() {
        let c = catalog();
        let ds = Assembler::new(&c)
            .assemble_seeded(3, "Basil", 2005, 2012)
            .unwrap();
        let col = ds.column(Metric::Exports);
        assert_eq!(col.len(), 8);
        assert_eq!(col.get(2008), ds.row(2008).map(|r| r.exports));
        assert!(ds.row(2004).is_none());
        assert!(ds.row(2013).is_none());
    }

    #[test]
    fn serialized_rows_use_metric_names() {
        let c = catalog();
        let ds = Assembler::new(&c)
            .assemble_seeded(3, "Clove", 2000, 2001)
            .unwrap();
        let v = serde_json::to_value(ds.first()).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 15);
        assert!(obj.contains_key("year"));
        for m in Metric::ALL {
            assert!(obj.contains_key(m.name()), "missing {}", m.name());
            assert_eq!(Metric::from_name(m.name()), Some(m));
        }
    }

    #[test]
    fn far_future_impact_saturates_at_floor() {
        let c = catalog();
        let ds = Assembler::new(&c)
            .assemble_seeded(8, "Vetiver", 2150, 2160)
            .unwrap();
        assert!(ds
            .rows()
            .iter()
            .all(|r| r.environmental_impact == IMPACT_FLOOR));
    }

    #[test]
    fn every_builtin_item_assembles() {
        let c = catalog();
        let asm = Assembler::new(&c);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for id in c.list_identifiers() {
            let ds = asm.assemble(&mut rng, id, 2000, 2025).unwrap();
            assert_eq!(ds.len(), 26, "{id}");
        }
    }

    proptest! {
        #[test]
        fn assembled_rows_respect_invariants(seed in any::<u64>(),
                                             item in 0usize..20,
                                             start in 1990i32..2060,
                                             span in 0i32..30) {
            let c = catalog();
            let id = c.list_identifiers()[item];
            let ds = Assembler::new(&c).assemble_seeded(seed, id, start, start + span).unwrap();
            prop_assert_eq!(ds.len(), (span + 1) as usize);
            for (row, year) in ds.rows().iter().zip(start..=start + span) {
                prop_assert_eq!(row.year, year);
                for m in Metric::ALL {
                    if m.is_capped_score() {
                        prop_assert!(row.get(m) <= SCORE_CAP);
                    }
                }
                prop_assert!(row.environmental_impact >= IMPACT_FLOOR);
            }
        }
    }
}
