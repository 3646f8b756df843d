use std::path::PathBuf;

use aed_dashboard::breakdown::{
    BreakdownCategory, BreakdownChart, BreakdownPreset, BreakdownView, DrillDown,
};
use aed_stats::weighted::BreakdownScale;
use anyhow::{Context, bail};
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct BreakdownArg {
    /// CSV file with a header row
    csv: PathBuf,
    /// Id of a configured breakdown (e.g. race, income, `income_inflow`, activity)
    #[arg(long, conflicts_with_all = ["weight", "categories", "percent", "region_field"])]
    preset: Option<String>,
    /// Weight column of an ad-hoc breakdown
    #[arg(long, requires = "categories")]
    weight: Option<String>,
    /// Category column of an ad-hoc breakdown; repeat for each category
    #[arg(long = "category")]
    categories: Vec<String>,
    /// Category values are fractions of the weight; report percentages
    #[arg(long)]
    percent: bool,
    /// Column naming the region of each row, used in drill-down previews
    #[arg(long)]
    region_field: Option<String>,
    /// Also print the drill-down of this category
    #[arg(long)]
    drill_down: Option<String>,
    /// Dashboard configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BreakdownOutput<'a> {
    breakdown: &'a BreakdownView,
    #[serde(skip_serializing_if = "Option::is_none")]
    drill_down: Option<DrillDown>,
}

pub fn run(arg: &BreakdownArg) -> anyhow::Result<()> {
    let config = util::load_config(arg.config.as_deref())?;
    let dataset = util::read_csv_dataset(&arg.csv)?;

    let preset = match (&arg.preset, &arg.weight) {
        (Some(id), _) => config.breakdown(id).cloned().with_context(|| {
            let ids = config
                .breakdowns
                .iter()
                .map(|preset| preset.id.as_str())
                .collect::<Vec<_>>();
            format!("unknown breakdown {id:?}; configured: {}", ids.join(", "))
        })?,
        (None, Some(weight)) => BreakdownPreset {
            id: "custom".to_owned(),
            title: format!("Weighted by {weight}"),
            weight_field: weight.clone(),
            scale: if arg.percent {
                BreakdownScale::Fraction
            } else {
                BreakdownScale::Identity
            },
            region_field: arg.region_field.clone(),
            categories: arg
                .categories
                .iter()
                .map(|field| BreakdownCategory::new(field, field))
                .collect(),
        },
        (None, None) => bail!("either --preset or --weight is required"),
    };

    if !dataset.has_column(&preset.weight_field) {
        bail!(
            "{} has no weight column {:?}",
            arg.csv.display(),
            preset.weight_field
        );
    }
    for category in &preset.categories {
        if !dataset.has_column(&category.field) {
            log::warn!("no column {:?}; it counts as zero", category.field);
        }
    }

    let mut chart = BreakdownChart::new(preset, &dataset);
    log::info!(
        "{}: {} rows weighted, {} skipped",
        chart.view().title,
        chart.view().rows,
        chart.view().skipped_rows
    );

    let drill_down = match &arg.drill_down {
        Some(category) => {
            chart.click(category);
            let drill_down = chart
                .drill_down(&dataset)
                .with_context(|| format!("{category:?} is not a category of this breakdown"))?;
            Some(drill_down)
        }
        None => None,
    };

    let output = BreakdownOutput {
        breakdown: chart.view(),
        drill_down,
    };
    Output::save_json(&output, arg.output.as_deref())?;
    Ok(())
}
