//! Render instructions produced for every panel.
//!
//! Views are pure projections of the dataset, the attribute catalog and the
//! geometry load state; rendering the same inputs twice yields equal views.

use aed_data::{
    attribute::{AttributeCatalog, AttributeKind},
    dataset::Dataset,
    geo_join::{GeoFeature, JoinIndex, JoinResult},
    load::LoadState,
};
use aed_stats::{boxplot::Boxplot, summary::NumericSummary};
use serde::{Deserialize, Serialize};

/// View mode of a numeric panel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    #[display("stats")]
    Stats,
    #[display("boxplot")]
    Boxplot,
}

impl ViewMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Stats => Self::Boxplot,
            Self::Boxplot => Self::Stats,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    pub summary: NumericSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxplotView {
    pub summary: NumericSummary,
    pub boxplot: Boxplot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub title: String,
    pub value_field: String,
    /// One entry per map feature, in geometry order.
    #[serde(flatten)]
    pub join: JoinResult,
    /// Numeric range of the joined values, for color scales.
    pub value_range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelView {
    Stats(StatsView),
    Boxplot(BoxplotView),
    Map(MapView),
    Unavailable { reason: String },
    LoadFailed { error: String },
    Pending,
}

/// Render output tagged with the revision it was produced for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendered {
    pub attribute: String,
    pub revision: u64,
    pub view: PanelView,
}

/// Everything a panel needs to render.
#[derive(Debug)]
pub struct AnalysisContext<'a, G> {
    pub catalog: &'a AttributeCatalog,
    /// Datasets in priority order; an attribute is read from the first
    /// dataset that has it.
    pub datasets: &'a [Dataset],
    pub geometry: &'a LoadState<Vec<GeoFeature<G>>>,
}

impl<'a, G> AnalysisContext<'a, G> {
    #[must_use]
    pub fn new(
        catalog: &'a AttributeCatalog,
        datasets: &'a [Dataset],
        geometry: &'a LoadState<Vec<GeoFeature<G>>>,
    ) -> Self {
        Self {
            catalog,
            datasets,
            geometry,
        }
    }

    #[must_use]
    pub fn dataset_for(&self, attribute: &str) -> Option<&'a Dataset> {
        self.datasets.iter().find(|d| d.has_column(attribute))
    }

    #[must_use]
    pub fn classify(&self, attribute: &str) -> AttributeKind {
        match self.dataset_for(attribute) {
            Some(dataset) => self.catalog.classify(attribute, dataset),
            None if self.catalog.special(attribute).is_some() => AttributeKind::SpecialCategorical,
            None => AttributeKind::Unanalyzable,
        }
    }

    /// Renders a numeric attribute, recomputing the summary from the data.
    #[must_use]
    pub fn render_numeric(&self, attribute: &str, mode: ViewMode) -> PanelView {
        let Some(dataset) = self.dataset_for(attribute) else {
            return PanelView::Unavailable {
                reason: format!("no dataset provides '{attribute}'"),
            };
        };
        let summary = dataset.summarize(attribute);
        match mode {
            ViewMode::Stats => PanelView::Stats(StatsView { summary }),
            ViewMode::Boxplot => {
                let boxplot = Boxplot::new(&summary, dataset.numbers(attribute).flatten());
                PanelView::Boxplot(BoxplotView { summary, boxplot })
            }
        }
    }

    /// Renders a special attribute as a map.
    ///
    /// Returns [`PanelView::Pending`] while the geometry is loading.
    #[must_use]
    pub fn render_map(&self, attribute: &str) -> PanelView {
        let features = match self.geometry {
            LoadState::Pending => return PanelView::Pending,
            LoadState::Failed(error) => {
                return PanelView::LoadFailed {
                    error: error.to_string(),
                };
            }
            LoadState::Loaded(features) => features,
        };
        let (Some(special), Some(dataset)) =
            (self.catalog.special(attribute), self.dataset_for(attribute))
        else {
            return PanelView::Unavailable {
                reason: format!("no dataset provides '{attribute}'"),
            };
        };

        let index = match JoinIndex::build(
            dataset,
            &self.catalog.join_key_field,
            self.catalog.duplicate_keys,
        ) {
            Ok(index) => index,
            Err(e) => {
                return PanelView::Unavailable {
                    reason: e.to_string(),
                };
            }
        };
        let join = index.join(
            features,
            &self.catalog.feature_key,
            special.value_field(),
            special.name_field.as_deref(),
        );
        if join.summary.unmatched > 0 {
            log::info!(
                "{attribute}: {} of {} map features have no matching row",
                join.summary.unmatched,
                features.len()
            );
        }
        PanelView::Map(MapView {
            title: special.title.clone(),
            value_field: special.value_field().to_owned(),
            value_range: join.value_range(),
            join,
        })
    }
}
