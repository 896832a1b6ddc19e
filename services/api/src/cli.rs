use crate::infra::{horizon, parse_year, read_json, years_until};
use crate::report::{render_calibration, render_comparison, render_estimate};
use crate::server;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use house_price::config::AppConfig;
use house_price::error::AppError;
use house_price::telemetry;
use house_price::valuation::{
    calibrate, DatasetCleaner, MarketProfile, PriceEstimator, ProfileError, ProfileStore,
    PropertyFeatures, RenovationPlan, RenovationScenario,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "house-price",
    about = "Estimate residential property values, renovation effects and market calibration",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Estimate the value of a property described by a JSON feature file
    Estimate(EstimateArgs),
    /// Estimate the value before and after a renovation
    Renovate(RenovateArgs),
    /// Compare the current property with a renovation plan
    Compare(CompareArgs),
    /// Fit a market profile from a raw sales export
    Calibrate(CalibrateArgs),
    /// Inspect or manage the stored market profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Print the active market profile as JSON
    Show(ProfileArgs),
    /// Write the built-in profile and its reset snapshot if they do not exist yet
    Init(ProfileArgs),
    /// Restore the active profile from the reset snapshot
    Reset(ProfileArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Market profile to serve (defaults to HOUSE_PRICE_PROFILE)
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ProfileArgs {
    /// Market profile document (defaults to HOUSE_PRICE_PROFILE)
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct HorizonArgs {
    /// Number of years to project forward
    #[arg(long, conflicts_with = "target_year")]
    pub(crate) years_forward: Option<u32>,
    /// Calendar year to project to, relative to the profile's current year
    #[arg(long, value_parser = parse_year)]
    pub(crate) target_year: Option<i32>,
}

impl HorizonArgs {
    fn years(&self, profile: &MarketProfile) -> i32 {
        match (self.years_forward, self.target_year) {
            (Some(years), _) => horizon(years),
            (None, Some(year)) => years_until(profile, year),
            (None, None) => 0,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// JSON file with the property features
    #[arg(long)]
    pub(crate) features: PathBuf,
    #[command(flatten)]
    pub(crate) horizon: HorizonArgs,
    #[command(flatten)]
    pub(crate) profile: ProfileArgs,
    /// Print the result as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RenovateArgs {
    /// JSON file with the property features
    #[arg(long)]
    pub(crate) features: PathBuf,
    /// Renovation budget in euro
    #[arg(long, default_value_t = 0.0)]
    pub(crate) budget: f64,
    /// Energy label before the renovation (defaults to the feature file's label)
    #[arg(long)]
    pub(crate) label_before: Option<String>,
    /// Energy label after the renovation
    #[arg(long)]
    pub(crate) label_after: Option<String>,
    #[command(flatten)]
    pub(crate) horizon: HorizonArgs,
    #[command(flatten)]
    pub(crate) profile: ProfileArgs,
    /// Print the result as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    /// JSON file with the property features
    #[arg(long)]
    pub(crate) features: PathBuf,
    /// JSON file with the renovation plan
    #[arg(long)]
    pub(crate) plan: PathBuf,
    #[command(flatten)]
    pub(crate) profile: ProfileArgs,
    /// Print the result as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CalibrateArgs {
    /// Raw sales CSV (defaults to HOUSE_PRICE_DATASET)
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
    /// Where to write the calibrated profile (defaults to HOUSE_PRICE_PROFILE)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Minimum group size for a city or category to be kept
    #[arg(long)]
    pub(crate) min_count: Option<usize>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Estimate(args) => run_estimate(&config, args),
        Command::Renovate(args) => run_renovate(&config, args),
        Command::Compare(args) => run_compare(&config, args),
        Command::Calibrate(args) => run_calibrate(&config, args),
        Command::Profile { command } => run_profile(&config, command),
    }
}

fn store_for(config: &AppConfig, args: &ProfileArgs) -> ProfileStore {
    let path = args
        .profile
        .clone()
        .unwrap_or_else(|| config.valuation.profile_path.clone());
    ProfileStore::new(path, config.valuation.default_profile_path.clone())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", json_document(value)?);
    Ok(())
}

fn json_document<T: Serialize>(value: &T) -> Result<String, AppError> {
    let document = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    Ok(document)
}

fn run_estimate(config: &AppConfig, args: EstimateArgs) -> Result<(), AppError> {
    let profile = store_for(config, &args.profile).load_or_default()?;
    let features: PropertyFeatures = read_json(&args.features)?;
    let years = args.horizon.years(&profile);

    let result = PriceEstimator::new(&profile).estimate(&features, years)?;
    if args.json {
        return print_json(&result);
    }
    render_estimate(
        &result,
        Local::now().date_naive(),
        profile.current_year.saturating_add(years),
    );
    Ok(())
}

fn run_renovate(config: &AppConfig, args: RenovateArgs) -> Result<(), AppError> {
    let profile = store_for(config, &args.profile).load_or_default()?;
    let features: PropertyFeatures = read_json(&args.features)?;
    let years = args.horizon.years(&profile);
    let scenario = RenovationScenario::new(args.budget, args.label_before, args.label_after);

    let result = PriceEstimator::new(&profile).estimate_with_renovation(&features, &scenario, years)?;
    if args.json {
        return print_json(&result);
    }
    render_estimate(
        &result,
        Local::now().date_naive(),
        profile.current_year.saturating_add(years),
    );
    Ok(())
}

fn run_compare(config: &AppConfig, args: CompareArgs) -> Result<(), AppError> {
    let profile = store_for(config, &args.profile).load_or_default()?;
    let features: PropertyFeatures = read_json(&args.features)?;
    let plan: RenovationPlan = read_json(&args.plan)?;

    let comparison = PriceEstimator::new(&profile).compare(&features, &plan)?;
    if args.json {
        return print_json(&comparison);
    }
    render_comparison(&comparison, Local::now().date_naive());
    Ok(())
}

fn run_calibrate(config: &AppConfig, args: CalibrateArgs) -> Result<(), AppError> {
    let data = args
        .data
        .unwrap_or_else(|| config.valuation.dataset_path.clone());
    let output = args
        .output
        .unwrap_or_else(|| config.valuation.profile_path.clone());
    let min_count = args.min_count.unwrap_or(config.valuation.min_count);

    let dataset = DatasetCleaner::from_path(&data)?;
    let outcome = calibrate(&dataset, min_count)?;
    outcome.profile.save(&output)?;
    info!(data = %data.display(), output = %output.display(), "calibration finished");

    render_calibration(&outcome.report, &output.display().to_string());
    Ok(())
}

fn run_profile(config: &AppConfig, command: ProfileCommand) -> Result<(), AppError> {
    match command {
        ProfileCommand::Show(args) => {
            let profile = store_for(config, &args).load_or_default()?;
            let document = profile.to_json_string().map_err(ProfileError::from)?;
            print!("{document}");
        }
        ProfileCommand::Init(args) => {
            let store = store_for(config, &args);
            if store.path().exists() {
                println!("Market profile already present at {}", store.path().display());
            } else {
                store.save(&MarketProfile::default())?;
                println!("Wrote default market profile to {}", store.path().display());
            }
            if store.ensure_default_snapshot()? {
                println!("Wrote reset snapshot to {}", store.default_path().display());
            }
        }
        ProfileCommand::Reset(args) => {
            let store = store_for(config, &args);
            store.reset_to_default()?;
            println!(
                "Restored {} from {}",
                store.path().display(),
                store.default_path().display()
            );
        }
    }
    Ok(())
}
