#![deny(warnings)]

//! Headless CLI: generates an item dataset (or a comparison / market
//! overview) and prints it as JSON.

use anyhow::{bail, Context, Result};
use oil_core::{Catalog, ItemProfile, RunConfig};
use oil_dataset::analytics::{self, Kpis, Recommendation, SustainabilityIndicators};
use oil_dataset::{Assembler, ItemDataset};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

const DEFAULT_ITEM: &str = "Lavender";
const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Default, PartialEq)]
struct Args {
    item: Option<String>,
    start: Option<i32>,
    end: Option<i32>,
    seed: Option<u64>,
    config: Option<String>,
    catalog: Option<String>,
    compare: Option<Vec<String>>,
    overview: Option<usize>,
    list: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter().peekable();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--item" => out.item = Some(required(&arg, it.next())?),
            "--start" => out.start = Some(value(&arg, it.next())?),
            "--end" => out.end = Some(value(&arg, it.next())?),
            "--seed" => out.seed = Some(value(&arg, it.next())?),
            "--config" => out.config = Some(required(&arg, it.next())?),
            "--catalog" => out.catalog = Some(required(&arg, it.next())?),
            "--compare" => {
                let list = it.next().unwrap_or_default();
                out.compare = Some(
                    list.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                );
            }
            "--overview" => {
                let n = match it.peek().and_then(|s| s.parse::<usize>().ok()) {
                    Some(n) => {
                        it.next();
                        n
                    }
                    None => DEFAULT_TOP_N,
                };
                out.overview = Some(n);
            }
            "--list" => out.list = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(out)
}

fn required(flag: &str, raw: Option<String>) -> Result<String> {
    raw.with_context(|| format!("{flag} expects a value"))
}

fn value<T: std::str::FromStr>(flag: &str, raw: Option<String>) -> Result<T> {
    let raw = required(flag, raw)?;
    raw.parse()
        .map_err(|_| anyhow::anyhow!("{flag}: invalid value {raw:?}"))
}

fn load_catalog(path: Option<&str>) -> Result<Catalog> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading {p}"))?;
            Ok(Catalog::from_yaml_str(&text)?)
        }
        None => Ok(Catalog::builtin()?),
    }
}

fn run_config(args: &Args) -> Result<RunConfig> {
    let mut cfg = match &args.config {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading {p}"))?;
            RunConfig::from_yaml_str(&text)?
        }
        None => RunConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.rng_seed = seed;
    }
    if let Some(start) = args.start {
        cfg.start_year = start;
    }
    if let Some(end) = args.end {
        cfg.end_year = end;
    }
    Ok(cfg)
}

#[derive(Serialize)]
struct ItemReport<'a> {
    profile: &'a ItemProfile,
    kpis: Kpis,
    sustainability: SustainabilityIndicators,
    recommendations: Vec<Recommendation>,
    dataset: &'a ItemDataset,
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let cfg = run_config(&args)?;
    info!(?args, ?cfg, "starting CLI");

    let catalog = load_catalog(args.catalog.as_deref())?;
    let asm = Assembler::new(&catalog);

    let json = if args.list {
        serde_json::to_string_pretty(&catalog.list_identifiers())?
    } else if let Some(ids) = &args.compare {
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(cfg.rng_seed);
        let cmp = analytics::compare(&asm, &mut rng, &ids, &cfg.year_range()?)?;
        serde_json::to_string_pretty(&cmp)?
    } else if let Some(top_n) = args.overview {
        let mut rng = ChaCha8Rng::seed_from_u64(cfg.rng_seed);
        let overview = analytics::market_overview(&asm, &mut rng, &cfg.year_range()?, top_n)?;
        serde_json::to_string_pretty(&overview)?
    } else {
        let item = args.item.as_deref().unwrap_or(DEFAULT_ITEM);
        let profile = catalog.get_profile(item)?;
        let ds = asm.assemble_config(&cfg, item)?;
        let report = ItemReport {
            profile,
            kpis: analytics::kpis(&ds),
            sustainability: analytics::sustainability(&ds),
            recommendations: analytics::recommendations(&ds),
            dataset: &ds,
        };
        info!(item, rows = ds.len(), "dataset ready");
        serde_json::to_string_pretty(&report)?
    };
    println!("{json}");
    Ok(())
}
