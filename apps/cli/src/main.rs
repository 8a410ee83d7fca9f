#![deny(warnings)]

//! Headless CLI running the outlet calculators and printing JSON results.
//!
//! ```text
//! outlet-cli <command> [options]
//!
//! commands:  staffing | revenue | pnl | peak | optimize | what-if | compare | forecast | list
//! options:   --config <engine.yaml>     seed, reference date, salary table
//!            --scenarios <file.json>    scenario store (default ./saves/scenarios.json)
//!            --params <file.json>       calculator parameters
//!            --id <scenario>            stored scenario for staffing/optimize/what-if/forecast
//!            --ids <a,b,...>            stored scenarios for compare
//!            --target <labor_cost|efficiency|revenue>
//!            --model <ratio>            consult a staffing model when optimizing
//!            --constraints <file.yaml>  staffing model constraints
//!            --set <key=value>          what-if override, repeatable
//!            --coefficients <file.yaml> demand model weights for forecast
//! ```

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use outlet_ai::{LinearDemandModel, RatioStaffingModel};
use outlet_core::{DemandFeatures, EngineConfig, SalaryTable, StaffingConstraints};
use outlet_econ::{
    analyze_peak_hours, calculate_profit_loss, calculate_staffing, project_revenue,
    OptimizationTarget, PeakHourParams, PlParams, RevenueParams, ScenarioEngine, StaffingParams,
};
use persistence::{default_scenario_path, InMemoryRepository};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct Args {
    command: Option<String>,
    config: Option<String>,
    scenarios: Option<String>,
    params: Option<String>,
    id: Option<String>,
    ids: Vec<String>,
    target: Option<String>,
    model: Option<String>,
    constraints: Option<String>,
    coefficients: Option<String>,
    set: Vec<String>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Args {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => out.config = it.next(),
            "--scenarios" => out.scenarios = it.next(),
            "--params" => out.params = it.next(),
            "--id" => out.id = it.next(),
            "--ids" => {
                out.ids = it
                    .next()
                    .map(|s| s.split(',').map(|id| id.trim().to_string()).collect())
                    .unwrap_or_default()
            }
            "--target" => out.target = it.next(),
            "--model" => out.model = it.next(),
            "--constraints" => out.constraints = it.next(),
            "--coefficients" => out.coefficients = it.next(),
            "--set" => out.set.extend(it.next()),
            _ if out.command.is_none() && !arg.starts_with("--") => out.command = Some(arg),
            _ => {}
        }
    }
    out
}

/// `key=value` pairs into a what-if override map.
fn parse_overrides(pairs: &[String]) -> Result<BTreeMap<String, f64>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("override {pair:?} is not key=value"))?;
            let value: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("override {key} is not a number"))?;
            Ok((key.trim().to_string(), value))
        })
        .collect()
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(p) => {
            let src = fs::read_to_string(p).with_context(|| format!("reading config {p}"))?;
            serde_yaml::from_str(&src).with_context(|| format!("parsing config {p}"))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn read_json(path: Option<&str>) -> Result<Value> {
    let p = path.context("--params <file.json> is required for this command")?;
    let src = fs::read_to_string(p).with_context(|| format!("reading params {p}"))?;
    serde_json::from_str(&src).with_context(|| format!("parsing params {p}"))
}

/// Parameters from JSON, with `date_key` defaulted to the reference date.
fn params_with_date<T: DeserializeOwned>(
    mut v: Value,
    date_key: &str,
    date: NaiveDate,
) -> Result<T> {
    if let Value::Object(map) = &mut v {
        map.entry(date_key)
            .or_insert_with(|| Value::String(date.to_string()));
    }
    serde_json::from_value(v).context("invalid calculator parameters")
}

/// Linear demand model from a YAML coefficients file. Without one the model
/// is untrained and every forecast falls back to planned covers.
fn demand_model(path: Option<&str>) -> Result<LinearDemandModel> {
    match path {
        Some(p) => {
            let src = fs::read_to_string(p).with_context(|| format!("reading coefficients {p}"))?;
            LinearDemandModel::from_yaml(&src).with_context(|| format!("parsing coefficients {p}"))
        }
        None => Ok(LinearDemandModel::untrained()),
    }
}

fn reference_date(cfg: &EngineConfig) -> NaiveDate {
    cfg.reference_date
        .unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn engine(args: &Args, cfg: EngineConfig) -> Result<ScenarioEngine<InMemoryRepository>> {
    let path = args.scenarios.as_deref().unwrap_or(default_scenario_path());
    let repo =
        InMemoryRepository::load(path).with_context(|| format!("loading scenarios from {path}"))?;
    Ok(ScenarioEngine::new(repo, cfg))
}

fn require_id(args: &Args) -> Result<&str> {
    args.id.as_deref().context("--id <scenario> is required")
}

fn run(args: &Args) -> Result<Value> {
    let cfg = load_config(args.config.as_deref())?;
    let command = args.command.as_deref().unwrap_or("list");
    info!(command, seed = cfg.rng_seed, "running");

    let out = match command {
        "staffing" => match &args.id {
            Some(id) => serde_json::to_value(engine(args, cfg)?.staffing(id)?)?,
            None => {
                let mut p: StaffingParams =
                    serde_json::from_value(read_json(args.params.as_deref())?)
                        .context("invalid staffing parameters")?;
                if p.salaries == SalaryTable::default() {
                    p.salaries = cfg.salaries;
                }
                serde_json::to_value(calculate_staffing(&p)?)?
            }
        },
        "revenue" => {
            let p: RevenueParams =
                params_with_date(read_json(args.params.as_deref())?, "start", reference_date(&cfg))?;
            serde_json::to_value(project_revenue(&p)?)?
        }
        "pnl" => {
            let p: PlParams =
                params_with_date(read_json(args.params.as_deref())?, "as_of", reference_date(&cfg))?;
            let mut rng = outlet_econ::seeded_rng(cfg.rng_seed);
            serde_json::to_value(calculate_profit_loss(&p, &mut rng)?)?
        }
        "peak" => {
            let p: PeakHourParams = serde_json::from_value(read_json(args.params.as_deref())?)
                .context("invalid peak-hour parameters")?;
            let mut rng = outlet_econ::seeded_rng(cfg.rng_seed);
            serde_json::to_value(analyze_peak_hours(&p, &mut rng)?)?
        }
        "optimize" => {
            let id = require_id(args)?;
            let target = match args.target.as_deref() {
                Some(t) => OptimizationTarget::parse(t)
                    .ok_or_else(|| anyhow!("unknown optimization target {t:?}"))?,
                None => OptimizationTarget::LaborCost,
            };
            let salaries = cfg.salaries.clone();
            let engine = engine(args, cfg)?;
            let result = match args.model.as_deref() {
                None => engine.optimize(id, target)?,
                Some("ratio") => {
                    let constraints: StaffingConstraints = match args.constraints.as_deref() {
                        Some(p) => serde_yaml::from_str(
                            &fs::read_to_string(p)
                                .with_context(|| format!("reading constraints {p}"))?,
                        )
                        .with_context(|| format!("parsing constraints {p}"))?,
                        None => StaffingConstraints::default(),
                    };
                    let model = RatioStaffingModel::with_salaries(salaries);
                    engine.optimize_with_model(id, target, &constraints, &model)?
                }
                Some(other) => bail!("unknown staffing model {other:?}"),
            };
            serde_json::to_value(result)?
        }
        "what-if" => {
            let id = require_id(args)?;
            let overrides = parse_overrides(&args.set)?;
            serde_json::to_value(engine(args, cfg)?.what_if(id, &overrides)?)?
        }
        "compare" => {
            let ids: Vec<&str> = args.ids.iter().map(String::as_str).collect();
            serde_json::to_value(engine(args, cfg)?.compare(&ids)?)?
        }
        "forecast" => {
            let id = require_id(args)?;
            let features: DemandFeatures = match args.params.as_deref() {
                Some(_) => serde_json::from_value(read_json(args.params.as_deref())?)
                    .context("invalid demand features")?,
                None => DemandFeatures::default(),
            };
            let model = demand_model(args.coefficients.as_deref())?;
            serde_json::to_value(engine(args, cfg)?.forecast(id, &features, &model)?)?
        }
        "list" => {
            let path = args.scenarios.as_deref().unwrap_or(default_scenario_path());
            let repo = InMemoryRepository::load(path)
                .with_context(|| format!("loading scenarios from {path}"))?;
            serde_json::to_value(repo.ids())?
        }
        other => bail!("unknown command {other:?}"),
    };
    Ok(out)
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1));
    let out = run(&args)?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
