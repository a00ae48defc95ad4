//! Derived figures shown next to the charts: KPIs, sustainability radar,
//! recommendations, cross-item comparison and the market overview.

use crate::{Assembler, ItemDataset, Metric};
use oil_core::{Category, ItemProfile, OilError, ValidationError, YearRange};
use oil_series::YearlySeries;
use rand::Rng;
use serde::Serialize;

/// Latest impact above which the item is flagged.
pub const IMPACT_ALERT: f64 = 40.0;
/// Latest sustainability below which improvement is suggested.
pub const SUSTAINABILITY_TARGET: f64 = 70.0;

/// `(last / first - 1) * 100`, or `None` when `first` is zero or the result
/// is not finite.
pub fn percent_change(first: f64, last: f64) -> Option<f64> {
    if first == 0.0 {
        return None;
    }
    let pct = (last / first - 1.0) * 100.0;
    pct.is_finite().then_some(pct)
}

/// `value / max * 100`, or 0 when `max` is not positive.
fn share_of_max(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max * 100.0
    } else {
        0.0
    }
}

/// Latest value with its change over the whole range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Trended {
    pub latest: f64,
    pub change_pct: Option<f64>,
}

impl Trended {
    fn of(ds: &ItemDataset, metric: Metric) -> Self {
        let first = ds.first().get(metric);
        let latest = ds.last().get(metric);
        Self {
            latest,
            change_pct: percent_change(first, latest),
        }
    }
}

/// Headline figures of one dataset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Kpis {
    pub production: Trended,
    pub price: Trended,
    pub market_value: Trended,
    pub efficacy: f64,
    /// Absolute change in efficacy points since the first year.
    pub efficacy_change: f64,
    pub studies: f64,
    pub pharmaceutical_growth_pct: Option<f64>,
}

pub fn kpis(ds: &ItemDataset) -> Kpis {
    let (first, last) = (ds.first(), ds.last());
    Kpis {
        production: Trended::of(ds, Metric::WorldProduction),
        price: Trended::of(ds, Metric::AveragePrice),
        market_value: Trended::of(ds, Metric::MarketValue),
        efficacy: last.therapeutic_efficacy,
        efficacy_change: last.therapeutic_efficacy - first.therapeutic_efficacy,
        studies: last.scientific_studies,
        pharmaceutical_growth_pct: percent_change(
            first.pharmaceutical_usage,
            last.pharmaceutical_usage,
        ),
    }
}

/// `metric` scaled so its maximum is 1.
pub fn normalized(ds: &ItemDataset, metric: Metric) -> Option<YearlySeries> {
    ds.column(metric).normalized()
}

/// Current sustainability radar, every axis on a 0..=100 scale where higher
/// is better.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SustainabilityIndicators {
    /// Latest production relative to the range maximum.
    pub production: f64,
    pub organic_quality: f64,
    pub sustainability: f64,
    /// 100 minus the latest environmental impact.
    pub environmental_performance: f64,
}

pub fn sustainability(ds: &ItemDataset) -> SustainabilityIndicators {
    let last = ds.last();
    let max_production = ds
        .column(Metric::WorldProduction)
        .max()
        .unwrap_or(0.0);
    SustainabilityIndicators {
        production: share_of_max(last.world_production, max_production),
        organic_quality: last.organic_quality,
        sustainability: last.production_sustainability,
        environmental_performance: 100.0 - last.environmental_impact,
    }
}

/// Advice attached to the sustainability view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Latest impact above [`IMPACT_ALERT`]: optimize distillation, move to
    /// regenerative farming, cut water use.
    HighEnvironmentalImpact,
    /// Impact at or below [`IMPACT_ALERT`].
    ImpactUnderControl,
    /// Latest sustainability below [`SUSTAINABILITY_TARGET`]: invest in
    /// sustainable practice, certification and supply chain.
    ModerateSustainability,
}

pub fn recommendations(ds: &ItemDataset) -> Vec<Recommendation> {
    let last = ds.last();
    let mut out = Vec::with_capacity(2);
    if last.environmental_impact > IMPACT_ALERT {
        out.push(Recommendation::HighEnvironmentalImpact);
    } else {
        out.push(Recommendation::ImpactUnderControl);
    }
    if last.production_sustainability < SUSTAINABILITY_TARGET {
        out.push(Recommendation::ModerateSustainability);
    }
    out
}

/// Latest figures of one item, tagged with its catalog attributes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemSnapshot {
    pub identifier: String,
    pub category: Category,
    pub display_color: String,
    /// Yield ratio as a percentage.
    pub yield_pct: f64,
    pub production: f64,
    pub price: f64,
    pub market_value: f64,
    pub efficacy: f64,
    pub studies: f64,
    pub sustainability: f64,
}

impl ItemSnapshot {
    pub fn new(profile: &ItemProfile, ds: &ItemDataset) -> Self {
        let last = ds.last();
        Self {
            identifier: profile.identifier.clone(),
            category: profile.category,
            display_color: profile.display_color.clone(),
            yield_pct: profile.yield_ratio * 100.0,
            production: last.world_production,
            price: last.average_price,
            market_value: last.market_value,
            efficacy: last.therapeutic_efficacy,
            studies: last.scientific_studies,
            sustainability: last.production_sustainability,
        }
    }
}

/// Multi-criteria scores of one item within a comparison group.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RadarScores {
    pub identifier: String,
    /// Production as a share of the group maximum.
    pub production: f64,
    /// Price as a share of the group maximum.
    pub price: f64,
    pub efficacy: f64,
    /// Studies as a share of the group maximum.
    pub research: f64,
    pub sustainability: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Comparison {
    pub snapshots: Vec<ItemSnapshot>,
    pub radar: Vec<RadarScores>,
}

fn snapshot<R: Rng + ?Sized>(
    assembler: &Assembler<'_>,
    rng: &mut R,
    identifier: &str,
    range: &YearRange,
) -> Result<ItemSnapshot, OilError> {
    let profile = assembler.catalog().get_profile(identifier)?;
    let ds = assembler.assemble_range(rng, identifier, range)?;
    Ok(ItemSnapshot::new(profile, &ds))
}

/// Compare the latest figures of at least two items.
pub fn compare<R: Rng + ?Sized>(
    assembler: &Assembler<'_>,
    rng: &mut R,
    identifiers: &[&str],
    range: &YearRange,
) -> Result<Comparison, OilError> {
    if identifiers.len() < 2 {
        return Err(ValidationError::TooFewItems(identifiers.len()).into());
    }
    let snapshots = identifiers
        .iter()
        .map(|id| snapshot(assembler, &mut *rng, id, range))
        .collect::<Result<Vec<_>, _>>()?;
    let max_of = |f: fn(&ItemSnapshot) -> f64| snapshots.iter().map(f).fold(0.0, f64::max);
    let max_production = max_of(|s| s.production);
    let max_price = max_of(|s| s.price);
    let max_studies = max_of(|s| s.studies);
    let radar = snapshots
        .iter()
        .map(|s| RadarScores {
            identifier: s.identifier.clone(),
            production: share_of_max(s.production, max_production),
            price: share_of_max(s.price, max_price),
            efficacy: s.efficacy,
            research: share_of_max(s.studies, max_studies),
            sustainability: s.sustainability,
        })
        .collect();
    Ok(Comparison { snapshots, radar })
}

/// Whole-catalog view of the latest year.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarketOverview {
    /// Every catalog item, in declaration order.
    pub snapshots: Vec<ItemSnapshot>,
    /// Largest market values first.
    pub top_by_market_value: Vec<ItemSnapshot>,
    /// Items per category, most common first.
    pub categories: Vec<(Category, usize)>,
}

pub fn market_overview<R: Rng + ?Sized>(
    assembler: &Assembler<'_>,
    rng: &mut R,
    range: &YearRange,
    top_n: usize,
) -> Result<MarketOverview, OilError> {
    let snapshots = assembler
        .catalog()
        .list_identifiers()
        .into_iter()
        .map(|id| snapshot(assembler, &mut *rng, id, range))
        .collect::<Result<Vec<_>, _>>()?;

    let mut top = snapshots.clone();
    top.sort_by(|a, b| b.market_value.total_cmp(&a.market_value));
    top.truncate(top_n);

    let mut categories: Vec<(Category, usize)> = Vec::new();
    for s in &snapshots {
        match categories.iter_mut().find(|(c, _)| *c == s.category) {
            Some((_, n)) => *n += 1,
            None => categories.push((s.category, 1)),
        }
    }
    // stable: ties keep first-seen order
    categories.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(MarketOverview {
        snapshots,
        top_by_market_value: top,
        categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use oil_core::Catalog;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn dataset(seed: u64, id: &str) -> ItemDataset {
        let c = Catalog::builtin().unwrap();
        Assembler::new(&c)
            .assemble_seeded(seed, id, 2000, 2025)
            .unwrap()
    }

    #[test]
    fn percent_change_math() {
        assert_eq!(percent_change(50.0, 75.0), Some(50.0));
        assert_eq!(percent_change(80.0, 40.0), Some(-50.0));
        assert_eq!(percent_change(0.0, 10.0), None);
    }

    #[test]
    fn kpis_read_first_and_last_rows() {
        let ds = dataset(1, "Lavender");
        let k = kpis(&ds);
        assert_eq!(k.production.latest, ds.last().world_production);
        assert_eq!(
            k.price.change_pct,
            percent_change(ds.first().average_price, ds.last().average_price)
        );
        assert_eq!(
            k.efficacy_change,
            ds.last().therapeutic_efficacy - ds.first().therapeutic_efficacy
        );
        assert_eq!(k.studies, ds.last().scientific_studies);
        // 26 years of 8% linear growth dwarfs the noise
        assert!(k.production.change_pct.unwrap() > 0.0);
    }

    #[test]
    fn normalized_peaks_at_one() {
        let ds = dataset(2, "Peppermint");
        let n = normalized(&ds, Metric::AveragePrice).unwrap();
        assert_eq!(n.len(), 26);
        assert_eq!(n.max(), Some(1.0));
    }

    #[test]
    fn sustainability_axes() {
        let ds = dataset(3, "Clove");
        let s = sustainability(&ds);
        assert!(s.production > 0.0 && s.production <= 100.0);
        assert_eq!(s.organic_quality, ds.last().organic_quality);
        assert_eq!(
            s.environmental_performance,
            100.0 - ds.last().environmental_impact
        );
    }

    #[test]
    fn recommendations_follow_thresholds() {
        let ds = dataset(4, "Lemon");
        let recs = recommendations(&ds);
        let last = ds.last();
        assert_eq!(
            recs.contains(&Recommendation::HighEnvironmentalImpact),
            last.environmental_impact > IMPACT_ALERT
        );
        assert_eq!(
            recs.contains(&Recommendation::ImpactUnderControl),
            last.environmental_impact <= IMPACT_ALERT
        );
        assert_eq!(
            recs.contains(&Recommendation::ModerateSustainability),
            last.production_sustainability < SUSTAINABILITY_TARGET
        );
    }

    #[test]
    fn compare_needs_two_items() {
        let c = Catalog::builtin().unwrap();
        let asm = Assembler::new(&c);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let r = YearRange::default();
        assert_eq!(
            compare(&asm, &mut rng, &["Lavender"], &r).unwrap_err(),
            OilError::Validation(ValidationError::TooFewItems(1))
        );
        assert!(matches!(
            compare(&asm, &mut rng, &["Lavender", "Nope"], &r),
            Err(OilError::NotFound(_))
        ));
    }

    #[test]
    fn compare_scores_relative_to_group() {
        let c = Catalog::builtin().unwrap();
        let asm = Assembler::new(&c);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let ids = ["Lavender", "Peppermint", "Tea Tree"];
        let cmp = compare(&asm, &mut rng, &ids, &YearRange::default()).unwrap();
        assert_eq!(cmp.snapshots.len(), 3);
        assert_eq!(cmp.radar.len(), 3);
        assert!(cmp.radar.iter().any(|r| r.production == 100.0));
        assert!(cmp.radar.iter().any(|r| r.price == 100.0));
        assert!(cmp.radar.iter().all(|r| r.research <= 100.0));
        assert!((cmp.snapshots[0].yield_pct - 1.5).abs() < 1e-9);
    }

    #[test]
    fn market_overview_ranks_by_value() {
        let c = Catalog::builtin().unwrap();
        let asm = Assembler::new(&c);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let m = market_overview(&asm, &mut rng, &YearRange::default(), 10).unwrap();
        assert_eq!(m.snapshots.len(), 20);
        assert_eq!(m.top_by_market_value.len(), 10);
        assert!(m
            .top_by_market_value
            .windows(2)
            .all(|w| w[0].market_value >= w[1].market_value));
        assert_eq!(m.categories.iter().map(|(_, n)| n).sum::<usize>(), 20);
        assert_eq!(m.categories[0], (Category::Antiseptic, 3));
    }
}
