use std::path::PathBuf;

use aed_dashboard::session::DashboardSession;

use crate::{tui::Tui, util};

use self::{app::DashboardApp, loader::GeometryLoader};

mod app;
mod loader;
mod screens;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DashboardArg {
    /// CSV files with a header row; earlier files win on duplicate columns
    #[arg(required = true)]
    csv: Vec<PathBuf>,
    /// GeoJSON file drawn by map panels, loaded in the background
    #[arg(long)]
    geometry: Option<PathBuf>,
    /// Dashboard configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn run(arg: &DashboardArg) -> anyhow::Result<()> {
    let DashboardArg {
        csv,
        geometry,
        config,
    } = arg;

    let config = util::load_config(config.as_deref())?;
    let datasets = csv
        .iter()
        .map(util::read_csv_dataset)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let loader = GeometryLoader::spawn(geometry.clone());
    let session = DashboardSession::new(config, datasets);
    let mut app = DashboardApp::new(session, loader);
    Tui::new().run(&mut app)?;

    Ok(())
}
