use aed_data::attribute::AttributeKind;

use crate::{
    panel::{Panel, PanelHandle, PanelPosition, PanelState},
    render::{AnalysisContext, PanelView, Rendered, ViewMode},
};

/// Maximum number of panels in one layout row.
pub const PANELS_PER_ROW: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PanelError {
    #[display("unknown panel {handle}")]
    UnknownPanel { handle: PanelHandle },
    #[display("panel for '{attribute}' has no view modes")]
    ModeNotSupported { attribute: String },
}

/// One layout row, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow<'a> {
    pub index: usize,
    pub panels: Vec<&'a Panel>,
}

/// Panels of the dashboard, one per requested attribute.
///
/// Panels are appended to the last row until it holds
/// [`PANELS_PER_ROW`] panels; rows are never rebalanced. Every render bumps
/// a registry-wide revision so that outdated render output can be detected
/// with [`is_current`](Self::is_current).
///
/// # Examples
///
/// ```
/// use aed_dashboard::{
///     registry::PanelRegistry,
///     render::{AnalysisContext, ViewMode},
/// };
/// use aed_data::{
///     attribute::AttributeCatalog,
///     dataset::{Dataset, Record},
///     load::LoadState,
/// };
///
/// let catalog = AttributeCatalog::default();
/// let datasets = [Dataset::from_records("covid", vec![Record::from_iter([("Deaths", "3")])])];
/// let geometry = LoadState::<Vec<aed_data::geo_join::GeoFeature<()>>>::Pending;
/// let ctx = AnalysisContext::new(&catalog, &datasets, &geometry);
///
/// let mut registry = PanelRegistry::new();
/// let handle = registry.ensure_panel("Deaths", &ctx);
/// assert_eq!(registry.ensure_panel("Deaths", &ctx), handle);
///
/// let revision = registry.set_view_mode(handle, ViewMode::Boxplot, &ctx).unwrap().revision;
/// assert!(registry.is_current(handle, revision));
/// ```
#[derive(Debug, Default)]
pub struct PanelRegistry {
    panels: Vec<Panel>,
    rows: Vec<Vec<PanelHandle>>,
    last_revision: u64,
}

impl PanelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    #[must_use]
    pub fn find(&self, attribute: &str) -> Option<PanelHandle> {
        self.panels
            .iter()
            .find(|panel| panel.attribute == attribute)
            .map(|panel| panel.handle)
    }

    #[must_use]
    pub fn panel(&self, handle: PanelHandle) -> Option<&Panel> {
        self.panels.get(handle.0)
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter()
    }

    /// Returns the panel for `attribute`, creating and rendering it on first
    /// request.
    ///
    /// Requesting an existing attribute leaves the layout untouched.
    pub fn ensure_panel<G>(&mut self, attribute: &str, ctx: &AnalysisContext<'_, G>) -> PanelHandle {
        if let Some(handle) = self.find(attribute) {
            return handle;
        }

        let handle = PanelHandle(self.panels.len());
        if self.rows.last().is_none_or(|row| row.len() >= PANELS_PER_ROW) {
            self.rows.push(vec![]);
        }
        let row = self.rows.len() - 1;
        let position = PanelPosition {
            row,
            slot: self.rows[row].len(),
        };
        self.rows[row].push(handle);

        let kind = ctx.classify(attribute);
        log::debug!(
            "created {handle} for '{attribute}' ({kind:?}) at row {}, slot {}",
            position.row,
            position.slot
        );
        self.panels.push(Panel {
            handle,
            attribute: attribute.to_owned(),
            kind,
            state: PanelState::Created,
            position,
            revision: 0,
            rendered: None,
        });

        self.render(handle, None, ctx);
        handle
    }

    /// Switches a numeric panel between statistics and boxplot.
    ///
    /// The summary is recomputed from the current data on every switch.
    pub fn set_view_mode<G>(
        &mut self,
        handle: PanelHandle,
        mode: ViewMode,
        ctx: &AnalysisContext<'_, G>,
    ) -> Result<&Rendered, PanelError> {
        let panel = self
            .panel(handle)
            .ok_or(PanelError::UnknownPanel { handle })?;
        if !panel.kind.is_numeric() {
            return Err(PanelError::ModeNotSupported {
                attribute: panel.attribute.clone(),
            });
        }
        self.render(handle, Some(mode), ctx)
            .ok_or(PanelError::UnknownPanel { handle })
    }

    /// Renders map panels that were waiting for their geometry.
    ///
    /// Returns the panels that left the pending state.
    pub fn refresh_pending<G>(&mut self, ctx: &AnalysisContext<'_, G>) -> Vec<PanelHandle> {
        let pending = self
            .panels
            .iter()
            .filter(|panel| panel.kind.is_special_categorical() && panel.state.is_created())
            .map(|panel| panel.handle)
            .collect::<Vec<_>>();
        pending
            .into_iter()
            .filter(|handle| {
                self.render(*handle, None, ctx);
                self.panel(*handle).is_some_and(|panel| !panel.state.is_created())
            })
            .collect()
    }

    /// Returns `true` if `revision` is the latest render of the panel.
    #[must_use]
    pub fn is_current(&self, handle: PanelHandle, revision: u64) -> bool {
        self.panel(handle).is_some_and(|panel| panel.revision == revision)
    }

    /// The layout, row by row.
    #[must_use]
    pub fn list_panels(&self) -> Vec<PanelRow<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| PanelRow {
                index,
                panels: row.iter().filter_map(|handle| self.panel(*handle)).collect(),
            })
            .collect()
    }

    /// Removes every panel.
    ///
    /// Revisions keep increasing across resets, so output rendered before
    /// the reset is never current again.
    pub fn reset(&mut self) {
        log::debug!("reset {} panels", self.panels.len());
        self.panels.clear();
        self.rows.clear();
    }

    fn render<G>(
        &mut self,
        handle: PanelHandle,
        mode: Option<ViewMode>,
        ctx: &AnalysisContext<'_, G>,
    ) -> Option<&Rendered> {
        let panel = self.panels.get_mut(handle.0)?;
        let (state, view) = match panel.kind {
            AttributeKind::Numeric => {
                let mode = mode
                    .or(panel.state.view_mode())
                    .unwrap_or_default();
                (
                    PanelState::Rendering(mode),
                    ctx.render_numeric(&panel.attribute, mode),
                )
            }
            AttributeKind::SpecialCategorical => {
                let view = ctx.render_map(&panel.attribute);
                let state = match &view {
                    PanelView::Pending => PanelState::Created,
                    PanelView::Map(_) => PanelState::MapRendered,
                    PanelView::LoadFailed { .. } => PanelState::LoadFailed,
                    _ => PanelState::Unavailable,
                };
                (state, view)
            }
            AttributeKind::Unanalyzable => (
                PanelState::Unavailable,
                PanelView::Unavailable {
                    reason: format!("'{}' has no numeric values", panel.attribute),
                },
            ),
        };

        self.last_revision += 1;
        panel.state = state;
        panel.revision = self.last_revision;
        let rendered: &Rendered = panel.rendered.insert(Rendered {
            attribute: panel.attribute.clone(),
            revision: self.last_revision,
            view,
        });
        Some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use aed_data::{
        attribute::AttributeCatalog,
        dataset::{Dataset, Record},
        geo_join::GeoFeature,
        load::{LoadError, LoadState},
    };

    use super::*;

    fn datasets() -> Vec<Dataset> {
        let records = (0..8)
            .map(|i| {
                Record::from_iter([
                    ("FIPS".to_owned(), format!("{:02}", i + 1)),
                    ("Province_State".to_owned(), format!("State {i}")),
                    ("Confirmed".to_owned(), format!("{}", i * 10)),
                    ("Deaths".to_owned(), format!("{i}")),
                    ("Combined_Key".to_owned(), "n/a".to_owned()),
                ])
            })
            .collect();
        vec![Dataset::from_records("covid", records)]
    }

    fn loaded() -> LoadState<Vec<GeoFeature<()>>> {
        LoadState::Loaded(vec![GeoFeature::new(()).with_id("01")])
    }

    #[test]
    fn test_ensure_panel_is_idempotent() {
        let catalog = AttributeCatalog::default();
        let datasets = datasets();
        let geometry = loaded();
        let ctx = AnalysisContext::new(&catalog, &datasets, &geometry);
        let mut registry = PanelRegistry::new();

        let first = registry.ensure_panel("Confirmed", &ctx);
        let revision = registry.panel(first).unwrap().revision();
        let again = registry.ensure_panel("Confirmed", &ctx);

        assert_eq!(first, again);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list_panels().len(), 1);
        assert_eq!(registry.panel(first).unwrap().revision(), revision);
    }

    #[test]
    fn test_rows_hold_three_panels() {
        let catalog = AttributeCatalog::default();
        let datasets = datasets();
        let geometry = loaded();
        let ctx = AnalysisContext::new(&catalog, &datasets, &geometry);
        let mut registry = PanelRegistry::new();

        let attributes = ["Confirmed", "Deaths", "FIPS", "Province_State", "Combined_Key", "Other", "X"];
        for (n, attribute) in attributes.iter().enumerate() {
            registry.ensure_panel(attribute, &ctx);
            let rows = registry.list_panels();
            assert_eq!(rows.len(), (n + 1).div_ceil(PANELS_PER_ROW));
            assert!(rows.iter().all(|row| row.panels.len() <= PANELS_PER_ROW));
        }

        let rows = registry.list_panels();
        let names = rows
            .iter()
            .map(|row| row.panels.iter().map(|p| p.attribute()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                vec!["Confirmed", "Deaths", "FIPS"],
                vec!["Province_State", "Combined_Key", "Other"],
                vec!["X"],
            ]
        );
        let position = registry.panel(registry.find("Combined_Key").unwrap()).unwrap().position();
        assert_eq!(position, PanelPosition { row: 1, slot: 1 });
    }

    #[test]
    fn test_initial_states_by_kind() {
        let catalog = AttributeCatalog::default();
        let datasets = datasets();
        let geometry = loaded();
        let ctx = AnalysisContext::new(&catalog, &datasets, &geometry);
        let mut registry = PanelRegistry::new();

        let numeric = registry.ensure_panel("Deaths", &ctx);
        let map = registry.ensure_panel("FIPS", &ctx);
        let text = registry.ensure_panel("Combined_Key", &ctx);

        assert_eq!(
            registry.panel(numeric).unwrap().state(),
            PanelState::Rendering(ViewMode::Stats)
        );
        assert_eq!(registry.panel(map).unwrap().state(), PanelState::MapRendered);
        assert_eq!(registry.panel(text).unwrap().state(), PanelState::Unavailable);
        assert!(matches!(
            registry.panel(text).unwrap().rendered().unwrap().view,
            PanelView::Unavailable { .. }
        ));
    }

    #[test]
    fn test_mode_switch_and_last_write_wins() {
        let catalog = AttributeCatalog::default();
        let datasets = datasets();
        let geometry = loaded();
        let ctx = AnalysisContext::new(&catalog, &datasets, &geometry);
        let mut registry = PanelRegistry::new();
        let handle = registry.ensure_panel("Confirmed", &ctx);

        let boxplot = registry
            .set_view_mode(handle, ViewMode::Boxplot, &ctx)
            .unwrap()
            .revision;
        let stats = registry
            .set_view_mode(handle, ViewMode::Stats, &ctx)
            .unwrap()
            .revision;

        assert!(stats > boxplot);
        assert!(!registry.is_current(handle, boxplot));
        assert!(registry.is_current(handle, stats));
        let panel = registry.panel(handle).unwrap();
        assert_eq!(panel.state(), PanelState::Rendering(ViewMode::Stats));
        assert!(matches!(panel.rendered().unwrap().view, PanelView::Stats(_)));
    }

    #[test]
    fn test_mode_switch_recomputes_from_data() {
        let catalog = AttributeCatalog::default();
        let geometry = loaded();
        let mut registry = PanelRegistry::new();

        let before = datasets();
        let handle = registry.ensure_panel("Deaths", &AnalysisContext::new(&catalog, &before, &geometry));

        let after = vec![Dataset::from_records(
            "covid",
            vec![Record::from_iter([("Deaths", "1000")])],
        )];
        let ctx = AnalysisContext::new(&catalog, &after, &geometry);
        let rendered = registry.set_view_mode(handle, ViewMode::Boxplot, &ctx).unwrap();
        let PanelView::Boxplot(view) = &rendered.view else {
            panic!("expected boxplot");
        };
        assert_eq!(view.summary.count, 1);
        assert_eq!(view.summary.max, 1000.0);
    }

    #[test]
    fn test_mode_errors() {
        let catalog = AttributeCatalog::default();
        let datasets = datasets();
        let geometry = loaded();
        let ctx = AnalysisContext::new(&catalog, &datasets, &geometry);
        let mut registry = PanelRegistry::new();
        let map = registry.ensure_panel("Province_State", &ctx);

        assert_eq!(
            registry.set_view_mode(map, ViewMode::Boxplot, &ctx),
            Err(PanelError::ModeNotSupported {
                attribute: "Province_State".to_owned()
            })
        );
        let unknown = PanelHandle(42);
        assert_eq!(
            registry.set_view_mode(unknown, ViewMode::Stats, &ctx),
            Err(PanelError::UnknownPanel { handle: unknown })
        );
        assert!(!registry.is_current(unknown, 1));
    }

    #[test]
    fn test_pending_geometry_then_refresh() {
        let catalog = AttributeCatalog::default();
        let datasets = datasets();
        let mut registry = PanelRegistry::new();

        let pending = LoadState::Pending;
        let handle = registry.ensure_panel("FIPS", &AnalysisContext::<()>::new(&catalog, &datasets, &pending));
        assert_eq!(registry.panel(handle).unwrap().state(), PanelState::Created);
        assert_eq!(
            registry.panel(handle).unwrap().rendered().unwrap().view,
            PanelView::Pending
        );

        let geometry = loaded();
        let refreshed = registry.refresh_pending(&AnalysisContext::new(&catalog, &datasets, &geometry));
        assert_eq!(refreshed, [handle]);
        assert_eq!(registry.panel(handle).unwrap().state(), PanelState::MapRendered);
    }

    #[test]
    fn test_failed_geometry_is_visible() {
        let catalog = AttributeCatalog::default();
        let datasets = datasets();
        let failed = LoadState::Failed(LoadError::new("counties.json", "404"));
        let ctx = AnalysisContext::<()>::new(&catalog, &datasets, &failed);
        let mut registry = PanelRegistry::new();

        let handle = registry.ensure_panel("FIPS", &ctx);
        assert_eq!(registry.panel(handle).unwrap().state(), PanelState::LoadFailed);
        assert!(registry.refresh_pending(&ctx).is_empty());
    }

    #[test]
    fn test_reset_invalidates_old_revisions() {
        let catalog = AttributeCatalog::default();
        let datasets = datasets();
        let geometry = loaded();
        let ctx = AnalysisContext::new(&catalog, &datasets, &geometry);
        let mut registry = PanelRegistry::new();

        let old = registry.ensure_panel("Deaths", &ctx);
        let old_revision = registry.panel(old).unwrap().revision();
        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.list_panels().is_empty());

        let new = registry.ensure_panel("Confirmed", &ctx);
        assert_eq!(new, old);
        assert!(!registry.is_current(new, old_revision));
        assert_eq!(registry.panel(new).unwrap().position(), PanelPosition { row: 0, slot: 0 });
    }
}
