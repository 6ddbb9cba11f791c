use caffeine_core::*;
use chrono::{Local, NaiveDateTime, NaiveTime, SubsecRound};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caff")]
#[command(about = "Estimate the quantity of caffeine (in mg) in your body", long_about = None)]
struct Cli {
    /// Amount of caffeine added, in mg (may be 0, or negative to correct an entry)
    #[arg(allow_negative_numbers = true, default_value_t = 0)]
    mg: i64,

    /// Minutes ago the caffeine was consumed (negative means in the future)
    #[arg(allow_negative_numbers = true, conflicts_with = "walltime")]
    mins: Option<i64>,

    /// Wall-clock time the caffeine was consumed, HH:MM. More than two hours
    /// in the future means the previous day.
    #[arg(short, long, value_parser = parse_walltime_arg)]
    walltime: Option<NaiveTime>,

    /// Beverage (defaults to the configured beverage, normally coffee)
    #[arg(short, long, value_parser = ["coffee", "soda", "chocolate"])]
    bev: Option<String>,

    /// Use the development environment
    #[arg(short, long, conflicts_with = "testing")]
    devel: bool,

    /// Use the testing environment
    #[arg(short = 'q', long)]
    testing: bool,

    /// Override data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Evaluate at this instant instead of now ("YYYY-MM-DD HH:MM:SS")
    #[arg(long, hide = true, value_parser = parse_instant_arg)]
    at: Option<NaiveDateTime>,
}

fn parse_walltime_arg(s: &str) -> std::result::Result<NaiveTime, String> {
    parse_walltime(s).map_err(|e| e.to_string())
}

fn parse_instant_arg(s: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_time(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    let env = resolve_environment(&cli)?;
    let paths = match cli.data_dir {
        Some(ref dir) => StorePaths::in_dir(dir.join(env.as_str())),
        None => config.store_paths(env),
    };

    let now = cli
        .at
        .unwrap_or_else(|| Local::now().naive_local().trunc_subsecs(0));

    let first_run = prepare_stores(&paths, now)?;
    caffeine_core::logging::init_with_journal("warn", ActivityLog::open(&paths.log)?);
    tracing::debug!("Using {} environment, stores at {:?}", env, paths);

    let mins_ago = match cli.walltime {
        Some(walltime) => walltime_to_minutes_ago(walltime, now),
        None => cli.mins.unwrap_or(0),
    };

    let beverage = match cli.bev {
        Some(ref bev) => bev.parse()?,
        None => config.defaults.beverage,
    };

    let consumption = Consumption {
        mg: cli.mg,
        mins_ago,
        beverage,
    };

    let mut monitor = CaffeineMonitor::new(
        JsonStateFile::new(&paths.state),
        JsonFutureFile::new(&paths.future),
    );
    let report = monitor.run(&consumption, now, first_run)?;

    println!("{}", report);
    Ok(())
}

/// The environment flags must agree with `CAFF_ENV`
fn resolve_environment(cli: &Cli) -> Result<Environment> {
    let running = Environment::from_env()?;

    let requested = if cli.devel {
        Some(Environment::Devel)
    } else if cli.testing {
        Some(Environment::Testing)
    } else {
        None
    };

    match requested {
        Some(requested) => Environment::check_requested(running, requested),
        None => Ok(running),
    }
}
