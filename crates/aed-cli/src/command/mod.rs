use std::env;

use clap::{Parser, Subcommand};

use self::{
    attributes::AttributesArg, breakdown::BreakdownArg, dashboard::DashboardArg, join::JoinArg,
    summary::SummaryArg,
};

mod attributes;
mod breakdown;
mod dashboard;
mod join;
mod summary;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print the statistics or boxplot of one numeric attribute as JSON
    Summary(#[clap(flatten)] SummaryArg),
    /// Print a population-weighted category breakdown as JSON
    Breakdown(#[clap(flatten)] BreakdownArg),
    /// Join a CSV file to GeoJSON features and print the map view as JSON
    Join(#[clap(flatten)] JoinArg),
    /// List the attributes of CSV files and how each one is analyzed
    Attributes(#[clap(flatten)] AttributesArg),
    /// Explore CSV files in an interactive terminal dashboard
    Dashboard(#[clap(flatten)] DashboardArg),
}

impl Mode {
    /// Log filter used when `RUST_LOG` is unset.
    fn default_log_filter(&self) -> &'static str {
        match self {
            // log lines would corrupt the alternate screen
            Mode::Dashboard(_) => "off",
            _ => "info",
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();

    let filters = env::var("RUST_LOG").unwrap_or_else(|_| args.mode.default_log_filter().to_owned());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();

    match args.mode {
        Mode::Summary(arg) => summary::run(&arg)?,
        Mode::Breakdown(arg) => breakdown::run(&arg)?,
        Mode::Join(arg) => join::run(&arg)?,
        Mode::Attributes(arg) => attributes::run(&arg)?,
        Mode::Dashboard(arg) => dashboard::run(&arg)?,
    }
    Ok(())
}
