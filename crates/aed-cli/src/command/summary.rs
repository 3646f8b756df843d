use std::path::PathBuf;

use aed_dashboard::{render::ViewMode, session::DashboardSession};
use anyhow::{Context, bail};

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ViewModeArg {
    #[default]
    Stats,
    Boxplot,
}

impl From<ViewModeArg> for ViewMode {
    fn from(arg: ViewModeArg) -> Self {
        match arg {
            ViewModeArg::Stats => ViewMode::Stats,
            ViewModeArg::Boxplot => ViewMode::Boxplot,
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SummaryArg {
    /// CSV file with a header row
    csv: PathBuf,
    /// Attribute (column) to summarize
    attribute: String,
    /// Which view to render
    #[arg(long, value_enum, default_value_t)]
    mode: ViewModeArg,
    /// Dashboard configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub fn run(arg: &SummaryArg) -> anyhow::Result<()> {
    let SummaryArg {
        csv,
        attribute,
        mode,
        config,
        output,
    } = arg;

    let config = util::load_config(config.as_deref())?;
    let dataset = util::read_csv_dataset(csv)?;
    if !dataset.has_column(attribute) {
        bail!("{} has no column named {attribute:?}", csv.display());
    }

    let mut session = DashboardSession::<()>::new(config, vec![dataset]);
    if session.classify(attribute).is_special_categorical() {
        bail!("{attribute:?} is drawn as a map; use the join command with a GeoJSON file");
    }

    let handle = session.open_panel(attribute);
    if *mode != ViewModeArg::Stats {
        session.set_view_mode(handle, (*mode).into())?;
    }
    let rendered = session
        .registry()
        .panel(handle)
        .and_then(|panel| panel.rendered())
        .with_context(|| format!("{attribute:?} was not rendered"))?;

    Output::save_json(rendered, output.as_deref())?;
    Ok(())
}
