use std::path::PathBuf;

use aed_dashboard::session::DashboardSession;
use aed_data::attribute::AttributeKind;
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AttributesArg {
    /// CSV files with a header row; earlier files win on duplicate columns
    #[arg(required = true)]
    csv: Vec<PathBuf>,
    /// Dashboard configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct AttributeEntry<'a> {
    name: &'a str,
    dataset: &'a str,
    kind: AttributeKind,
    /// Button title of map attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
}

pub fn run(arg: &AttributesArg) -> anyhow::Result<()> {
    let AttributesArg {
        csv,
        config,
        output,
    } = arg;

    let config = util::load_config(config.as_deref())?;
    let datasets = csv
        .iter()
        .map(util::read_csv_dataset)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let session = DashboardSession::<()>::new(config, datasets);

    let entries = session
        .attributes()
        .iter()
        .map(|source| AttributeEntry {
            name: &source.name,
            dataset: session.datasets()[source.dataset].name(),
            kind: session.classify(&source.name),
            title: session
                .config()
                .catalog
                .special(&source.name)
                .map(|special| special.title.as_str()),
        })
        .collect::<Vec<_>>();

    Output::save_json(&entries, output.as_deref())?;
    Ok(())
}
