use aed_data::{
    attribute::{AttributeKind, AttributeSource, merge_attributes},
    dataset::Dataset,
    geo_join::GeoFeature,
    load::LoadState,
};

use crate::{
    breakdown::BreakdownChart,
    config::DashboardConfig,
    panel::PanelHandle,
    registry::{PanelError, PanelRegistry},
    render::{AnalysisContext, Rendered, ViewMode},
};

/// A breakdown chart together with the dataset it was computed from.
#[derive(Debug, Clone)]
pub struct BreakdownEntry {
    pub chart: BreakdownChart,
    /// Index into [`DashboardSession::datasets`].
    pub dataset: usize,
}

/// One dashboard session: loaded data, its panels and its charts.
///
/// Geometry arrives separately through [`set_geometry`](Self::set_geometry)
/// since it is loaded independently of the tabular data.
#[derive(Debug)]
pub struct DashboardSession<G> {
    config: DashboardConfig,
    datasets: Vec<Dataset>,
    attributes: Vec<AttributeSource>,
    geometry: LoadState<Vec<GeoFeature<G>>>,
    registry: PanelRegistry,
    breakdowns: Vec<BreakdownEntry>,
}

impl<G> DashboardSession<G> {
    #[must_use]
    pub fn new(config: DashboardConfig, datasets: Vec<Dataset>) -> Self {
        let attributes = merge_attributes(&datasets);
        let breakdowns = build_breakdowns(&config, &datasets);
        log::info!(
            "session with {} datasets, {} attributes, {} breakdown charts",
            datasets.len(),
            attributes.len(),
            breakdowns.len()
        );
        Self {
            config,
            datasets,
            attributes,
            geometry: LoadState::Pending,
            registry: PanelRegistry::new(),
            breakdowns,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    /// Attributes of all datasets, in first-seen order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeSource] {
        &self.attributes
    }

    #[must_use]
    pub fn geometry(&self) -> &LoadState<Vec<GeoFeature<G>>> {
        &self.geometry
    }

    #[must_use]
    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    #[must_use]
    pub fn context(&self) -> AnalysisContext<'_, G> {
        AnalysisContext::new(&self.config.catalog, &self.datasets, &self.geometry)
    }

    #[must_use]
    pub fn classify(&self, attribute: &str) -> AttributeKind {
        self.context().classify(attribute)
    }

    /// Resolves the geometry load and renders map panels waiting for it.
    pub fn set_geometry(&mut self, geometry: LoadState<Vec<GeoFeature<G>>>) -> Vec<PanelHandle> {
        self.geometry = geometry;
        let ctx = AnalysisContext::new(&self.config.catalog, &self.datasets, &self.geometry);
        self.registry.refresh_pending(&ctx)
    }

    /// Opens the panel of an attribute.
    pub fn open_panel(&mut self, attribute: &str) -> PanelHandle {
        let ctx = AnalysisContext::new(&self.config.catalog, &self.datasets, &self.geometry);
        self.registry.ensure_panel(attribute, &ctx)
    }

    pub fn set_view_mode(&mut self, handle: PanelHandle, mode: ViewMode) -> Result<&Rendered, PanelError> {
        let ctx = AnalysisContext::new(&self.config.catalog, &self.datasets, &self.geometry);
        self.registry.set_view_mode(handle, mode, &ctx)
    }

    /// Switches a numeric panel to its other view mode.
    pub fn toggle_view_mode(&mut self, handle: PanelHandle) -> Result<&Rendered, PanelError> {
        let panel = self
            .registry
            .panel(handle)
            .ok_or(PanelError::UnknownPanel { handle })?;
        let Some(mode) = panel.state().view_mode() else {
            return Err(PanelError::ModeNotSupported {
                attribute: panel.attribute().to_owned(),
            });
        };
        self.set_view_mode(handle, mode.toggled())
    }

    #[must_use]
    pub fn breakdowns(&self) -> &[BreakdownEntry] {
        &self.breakdowns
    }

    /// A chart and the dataset it reads from.
    #[must_use]
    pub fn breakdown(&self, index: usize) -> Option<(&BreakdownChart, &Dataset)> {
        let entry = self.breakdowns.get(index)?;
        Some((&entry.chart, self.datasets.get(entry.dataset)?))
    }

    pub fn breakdown_mut(&mut self, index: usize) -> Option<(&mut BreakdownChart, &Dataset)> {
        let entry = self.breakdowns.get_mut(index)?;
        Some((&mut entry.chart, self.datasets.get(entry.dataset)?))
    }

    /// Destroys every panel and clears chart selections.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.breakdowns = build_breakdowns(&self.config, &self.datasets);
    }
}

/// Builds a chart for every preset whose weight column exists in a dataset.
fn build_breakdowns(config: &DashboardConfig, datasets: &[Dataset]) -> Vec<BreakdownEntry> {
    config
        .breakdowns
        .iter()
        .filter_map(|preset| {
            let Some(dataset) = datasets
                .iter()
                .position(|d| d.has_column(&preset.weight_field))
            else {
                log::debug!(
                    "skipping breakdown {}: no dataset has {}",
                    preset.id,
                    preset.weight_field
                );
                return None;
            };
            Some(BreakdownEntry {
                chart: BreakdownChart::new(preset.clone(), &datasets[dataset]),
                dataset,
            })
        })
        .collect()
}
