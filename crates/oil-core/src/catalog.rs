//! Item catalog: the built-in 20-oil table and YAML-loaded catalogs.

use crate::{validate_profile, Category, ConfigError, ItemProfile, OilError, TrendTag};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Immutable, validated set of item profiles in declaration order.
#[derive(Clone, Debug)]
pub struct Catalog {
    profiles: Vec<ItemProfile>,
    index: BTreeMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, validating every profile and rejecting duplicates.
    pub fn new(profiles: Vec<ItemProfile>) -> Result<Self, ConfigError> {
        if profiles.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let mut index = BTreeMap::new();
        for (i, p) in profiles.iter().enumerate() {
            validate_profile(p)?;
            if index.insert(p.identifier.clone(), i).is_some() {
                return Err(ConfigError::DuplicateItem(p.identifier.clone()));
            }
        }
        debug!(items = profiles.len(), "catalog built");
        Ok(Self { profiles, index })
    }

    /// The built-in catalog of 20 essential oils.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(BUILTIN.iter().map(Entry::to_profile).collect())
    }

    /// Load a catalog from YAML of the form `items: [ { identifier, ... } ]`.
    ///
    /// `base_production`, `base_price`, `yield_ratio` and `category` are
    /// required; presentation fields default to empty.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let profiles = file
            .items
            .into_iter()
            .map(RawProfile::into_profile)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(profiles)
    }

    /// Look up a profile by its exact identifier.
    pub fn get_profile(&self, identifier: &str) -> Result<&ItemProfile, OilError> {
        self.index
            .get(identifier)
            .map(|&i| &self.profiles[i])
            .ok_or_else(|| OilError::NotFound(identifier.to_string()))
    }

    /// Identifiers in declaration order.
    pub fn list_identifiers(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.identifier.as_str()).collect()
    }

    /// Profiles in declaration order.
    pub fn profiles(&self) -> impl Iterator<Item = &ItemProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    items: Vec<RawProfile>,
}

#[derive(Deserialize)]
struct RawProfile {
    identifier: String,
    base_production: Option<f64>,
    base_price: Option<f64>,
    yield_ratio: Option<f64>,
    category: Option<Category>,
    #[serde(default)]
    properties: Vec<String>,
    #[serde(default)]
    source_regions: Vec<String>,
    #[serde(default)]
    primary_molecules: Vec<String>,
    #[serde(default)]
    contraindications: Vec<String>,
    #[serde(default)]
    price_trend: TrendTag,
    #[serde(default)]
    demand_trend: TrendTag,
    #[serde(default)]
    display_color: String,
}

impl RawProfile {
    fn into_profile(self) -> Result<ItemProfile, ConfigError> {
        let missing = |field: &'static str| ConfigError::MissingField {
            item: self.identifier.clone(),
            field,
        };
        let base_production = self.base_production.ok_or_else(|| missing("base_production"))?;
        let base_price = self.base_price.ok_or_else(|| missing("base_price"))?;
        let yield_ratio = self.yield_ratio.ok_or_else(|| missing("yield_ratio"))?;
        let category = self.category.ok_or_else(|| missing("category"))?;
        Ok(ItemProfile {
            identifier: self.identifier,
            base_production,
            base_price,
            category,
            properties: self.properties,
            source_regions: self.source_regions,
            yield_ratio,
            primary_molecules: self.primary_molecules,
            contraindications: self.contraindications,
            price_trend: self.price_trend,
            demand_trend: self.demand_trend,
            display_color: self.display_color,
        })
    }
}

struct Entry {
    id: &'static str,
    production: f64,
    price: f64,
    category: Category,
    properties: &'static [&'static str],
    regions: &'static [&'static str],
    yield_ratio: f64,
    molecules: &'static [&'static str],
    contraindications: &'static [&'static str],
    price_trend: TrendTag,
    demand_trend: TrendTag,
    color: &'static str,
}

impl Entry {
    fn to_profile(&self) -> ItemProfile {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        ItemProfile {
            identifier: self.id.to_string(),
            base_production: self.production,
            base_price: self.price,
            category: self.category,
            properties: owned(self.properties),
            source_regions: owned(self.regions),
            yield_ratio: self.yield_ratio,
            primary_molecules: owned(self.molecules),
            contraindications: owned(self.contraindications),
            price_trend: self.price_trend,
            demand_trend: self.demand_trend,
            display_color: self.color.to_string(),
        }
    }
}

use crate::Category::*;
use crate::TrendTag::{Low, Moderate, Strong};

const BUILTIN: [Entry; 20] = [
    Entry {
        id: "Lavender",
        production: 150.0,
        price: 45.0,
        category: Relaxing,
        properties: &["calming", "healing", "antiseptic", "analgesic"],
        regions: &["France", "Bulgaria", "China"],
        yield_ratio: 0.015,
        molecules: &["Linalool", "Linalyl acetate", "Cineole"],
        contraindications: &["Pregnancy", "Children under 6"],
        price_trend: Moderate,
        demand_trend: Strong,
        color: "#6A0572",
    },
    Entry {
        id: "Peppermint",
        production: 80.0,
        price: 60.0,
        category: Tonic,
        properties: &["digestive", "refreshing", "pain relief", "decongestant"],
        regions: &["USA", "France", "India"],
        yield_ratio: 0.012,
        molecules: &["Menthol", "Menthone", "Menthyl acetate"],
        contraindications: &["Epilepsy", "Biliary disorders"],
        price_trend: Moderate,
        demand_trend: Moderate,
        color: "#228B22",
    },
    Entry {
        id: "Tea Tree",
        production: 120.0,
        price: 35.0,
        category: Antiseptic,
        properties: &["antibacterial", "antifungal", "antiviral", "immunostimulant"],
        regions: &["Australia", "China", "South Africa"],
        yield_ratio: 0.020,
        molecules: &["Terpinen-4-ol", "gamma-Terpinene", "alpha-Terpinene"],
        contraindications: &["Sensitive skin"],
        price_trend: Low,
        demand_trend: Strong,
        color: "#2A9D8F",
    },
    Entry {
        id: "Eucalyptus",
        production: 200.0,
        price: 25.0,
        category: Respiratory,
        properties: &["expectorant", "decongestant", "antiseptic", "febrifuge"],
        regions: &["Australia", "China", "Portugal"],
        yield_ratio: 0.018,
        molecules: &["Eucalyptol", "alpha-Pinene", "Limonene"],
        contraindications: &["Severe asthma"],
        price_trend: Low,
        demand_trend: Moderate,
        color: "#45B7D1",
    },
    Entry {
        id: "Ravintsara",
        production: 40.0,
        price: 55.0,
        category: Immune,
        properties: &["antiviral", "immunostimulant", "expectorant", "neurotonic"],
        regions: &["Madagascar", "Comoros"],
        yield_ratio: 0.008,
        molecules: &["Cineole", "Sabinene", "alpha-Terpineol"],
        contraindications: &["None known"],
        price_trend: Strong,
        demand_trend: Strong,
        color: "#4ECDC4",
    },
    Entry {
        id: "Palmarosa",
        production: 25.0,
        price: 70.0,
        category: Cosmetic,
        properties: &["regenerating", "moisturizing", "antibacterial", "balancing"],
        regions: &["India", "Nepal", "Indonesia"],
        yield_ratio: 0.006,
        molecules: &["Geraniol", "Linalool", "Geranyl acetate"],
        contraindications: &["None known"],
        price_trend: Moderate,
        demand_trend: Moderate,
        color: "#FFD700",
    },
    Entry {
        id: "Ylang-Ylang",
        production: 30.0,
        price: 85.0,
        category: Aphrodisiac,
        properties: &["aphrodisiac", "sedative", "hypotensive", "regulating"],
        regions: &["Madagascar", "Comoros", "Mayotte"],
        yield_ratio: 0.005,
        molecules: &["Linalool", "Geraniol", "para-Cresyl methyl ether"],
        contraindications: &["Hypotension"],
        price_trend: Strong,
        demand_trend: Moderate,
        color: "#8A2BE2",
    },
    Entry {
        id: "Clove",
        production: 60.0,
        price: 40.0,
        category: Antiseptic,
        properties: &["antiseptic", "pain relief", "antiparasitic", "stimulant"],
        regions: &["Madagascar", "Indonesia", "Sri Lanka"],
        yield_ratio: 0.015,
        molecules: &["Eugenol", "Eugenyl acetate", "Caryophyllene"],
        contraindications: &["Gastric ulcers"],
        price_trend: Low,
        demand_trend: Moderate,
        color: "#8B4513",
    },
    Entry {
        id: "Lemon",
        production: 180.0,
        price: 20.0,
        category: Detoxifying,
        properties: &["antibacterial", "detoxifying", "tonic", "digestive"],
        regions: &["Italy", "Spain", "USA", "Argentina"],
        yield_ratio: 0.003,
        molecules: &["Limonene", "beta-Pinene", "gamma-Terpinene"],
        contraindications: &["Photosensitizing"],
        price_trend: Low,
        demand_trend: Strong,
        color: "#FFD700",
    },
    Entry {
        id: "Rosemary",
        production: 90.0,
        price: 38.0,
        category: Tonic,
        properties: &["tonic", "hepatic", "neurotonic", "antioxidant"],
        regions: &["France", "Spain", "Morocco", "Tunisia"],
        yield_ratio: 0.010,
        molecules: &["Cineole", "Camphor", "alpha-Pinene"],
        contraindications: &["Hypertension", "Epilepsy"],
        price_trend: Moderate,
        demand_trend: Moderate,
        color: "#228B22",
    },
    Entry {
        id: "Australian Tea Tree",
        production: 110.0,
        price: 32.0,
        category: Antiseptic,
        properties: &["antibacterial", "antifungal", "antiviral", "immunostimulant"],
        regions: &["Australia", "China"],
        yield_ratio: 0.019,
        molecules: &["Terpinen-4-ol", "gamma-Terpinene", "alpha-Terpinene"],
        contraindications: &["Sensitive skin"],
        price_trend: Low,
        demand_trend: Strong,
        color: "#2A9D8F",
    },
    Entry {
        id: "Geranium",
        production: 45.0,
        price: 75.0,
        category: Balancing,
        properties: &["balancing", "hemostatic", "healing", "antiseptic"],
        regions: &["Egypt", "Morocco", "Reunion"],
        yield_ratio: 0.007,
        molecules: &["Citronellol", "Geraniol", "Linalool"],
        contraindications: &["None known"],
        price_trend: Moderate,
        demand_trend: Moderate,
        color: "#FF6B6B",
    },
    Entry {
        id: "Chamomile",
        production: 35.0,
        price: 95.0,
        category: Calming,
        properties: &["calming", "anti-inflammatory", "antispasmodic", "analgesic"],
        regions: &["France", "Egypt", "Germany"],
        yield_ratio: 0.004,
        molecules: &["Chamazulene", "Bisabolol", "Farnesene"],
        contraindications: &["Asteraceae allergy"],
        price_trend: Strong,
        demand_trend: Moderate,
        color: "#FFD700",
    },
    Entry {
        id: "Sage",
        production: 28.0,
        price: 88.0,
        category: Hormonal,
        properties: &["hormonal balancing", "antiseptic", "digestive", "neurotonic"],
        regions: &["France", "Spain", "Croatia"],
        yield_ratio: 0.005,
        molecules: &["Thujone", "Cineole", "Camphor"],
        contraindications: &["Pregnancy", "Epilepsy"],
        price_trend: Strong,
        demand_trend: Low,
        color: "#6A0572",
    },
    Entry {
        id: "Niaouli",
        production: 55.0,
        price: 42.0,
        category: Immune,
        properties: &["immunostimulant", "antiviral", "expectorant", "decongestant"],
        regions: &["Madagascar", "New Caledonia"],
        yield_ratio: 0.014,
        molecules: &["Cineole", "alpha-Pinene", "Limonene"],
        contraindications: &["None known"],
        price_trend: Moderate,
        demand_trend: Moderate,
        color: "#45B7D1",
    },
    Entry {
        id: "Basil",
        production: 65.0,
        price: 48.0,
        category: Digestive,
        properties: &["digestive", "antispasmodic", "neurotonic", "antibacterial"],
        regions: &["France", "Egypt", "Comoros"],
        yield_ratio: 0.009,
        molecules: &["Estragole", "Linalool", "Eugenol"],
        contraindications: &["Pregnancy"],
        price_trend: Moderate,
        demand_trend: Moderate,
        color: "#228B22",
    },
    Entry {
        id: "Cedarwood",
        production: 40.0,
        price: 65.0,
        category: Grounding,
        properties: &["grounding", "lymphotonic", "antiseptic", "repellent"],
        regions: &["Morocco", "USA", "Himalaya"],
        yield_ratio: 0.008,
        molecules: &["Cedrol", "alpha-Cedrene", "Thujopsene"],
        contraindications: &["Pregnancy"],
        price_trend: Moderate,
        demand_trend: Low,
        color: "#8B4513",
    },
    Entry {
        id: "Frankincense",
        production: 22.0,
        price: 120.0,
        category: Spiritual,
        properties: &["meditative", "anti-inflammatory", "healing", "immunostimulant"],
        regions: &["Oman", "Somalia", "Ethiopia"],
        yield_ratio: 0.003,
        molecules: &["alpha-Pinene", "Limonene", "Incensole"],
        contraindications: &["None known"],
        price_trend: Strong,
        demand_trend: Moderate,
        color: "#F9A602",
    },
    Entry {
        id: "Myrrh",
        production: 18.0,
        price: 110.0,
        category: Spiritual,
        properties: &["anti-inflammatory", "healing", "antiseptic", "expectorant"],
        regions: &["Somalia", "Ethiopia", "Yemen"],
        yield_ratio: 0.002,
        molecules: &["Furanoeudesma-1,3-diene", "Curzerene", "Lindestrene"],
        contraindications: &["Pregnancy"],
        price_trend: Strong,
        demand_trend: Low,
        color: "#8B4513",
    },
    Entry {
        id: "Vetiver",
        production: 32.0,
        price: 78.0,
        category: Grounding,
        properties: &["grounding", "nerve tonic", "repellent", "healing"],
        regions: &["Haiti", "Reunion", "Indonesia"],
        yield_ratio: 0.006,
        molecules: &["Vetivone", "beta-Vetivene", "Khusimol"],
        contraindications: &["None known"],
        price_trend: Moderate,
        demand_trend: Moderate,
        color: "#8B4513",
    },
];
