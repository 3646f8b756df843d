use std::collections::HashMap;

use aed_dashboard::{
    interaction::InteractionState,
    panel::{Panel, PanelHandle, PanelState},
    registry::PANELS_PER_ROW,
    render::{MapView, PanelView},
    session::DashboardSession,
};
use aed_data::attribute::AttributeKind;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Text,
    widgets::{Block, List, ListItem, ListState, Paragraph},
};

use super::{
    Transition, next_index, prev_index,
    widgets::{self, PanelWidget},
};
use crate::geometry::{self, Bounds, MapShape};

/// Layout rows drawn at once; the grid scrolls to keep the focused panel visible.
const VISIBLE_ROWS: usize = 2;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Focus {
    #[default]
    Attributes,
    Panels,
}

/// Attribute list on the left, panel grid on the right.
#[derive(Debug, Default)]
pub(in crate::command::dashboard) struct PanelsScreen {
    selected_attribute: usize,
    focus: Focus,
    focused_panel: Option<PanelHandle>,
    /// Hovered and selected feature of each map panel.
    maps: HashMap<PanelHandle, InteractionState<usize>>,
    map_bounds: Option<Bounds>,
    status: Option<String>,
}

impl PanelsScreen {
    pub(in crate::command::dashboard) fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Called once the geometry load has finished.
    pub(in crate::command::dashboard) fn geometry_changed(
        &mut self,
        session: &DashboardSession<MapShape>,
        refreshed: &[PanelHandle],
    ) {
        self.map_bounds = session.geometry().loaded().and_then(geometry::bounds_of);
        for handle in refreshed {
            self.maps.remove(handle);
        }
        match session.geometry().error() {
            Some(error) => self.set_status(error.to_string()),
            None => self.set_status(format!(
                "Geometry loaded; {} map panels updated",
                refreshed.len()
            )),
        }
    }

    pub(in crate::command::dashboard) fn handle_key(
        &mut self,
        session: &mut DashboardSession<MapShape>,
        key: KeyEvent,
    ) -> Transition {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Transition::Quit,
            KeyCode::Char('b') => return Transition::ShowBreakdowns,
            KeyCode::Char('r') => {
                session.reset();
                self.maps.clear();
                self.focused_panel = None;
                self.focus = Focus::Attributes;
                self.set_status("All panels closed");
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Attributes if self.focused_panel.is_some() => Focus::Panels,
                    _ => Focus::Attributes,
                };
            }
            _ => match self.focus {
                Focus::Attributes => self.handle_attribute_key(session, key),
                Focus::Panels => self.handle_panel_key(session, key),
            },
        }
        Transition::Stay
    }

    fn handle_attribute_key(&mut self, session: &mut DashboardSession<MapShape>, key: KeyEvent) {
        let len = session.attributes().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(i) = prev_index(Some(self.selected_attribute), len) {
                    self.selected_attribute = i;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(i) = next_index(Some(self.selected_attribute), len) {
                    self.selected_attribute = i;
                }
            }
            KeyCode::Enter => self.open_selected(session),
            _ => {}
        }
    }

    fn open_selected(&mut self, session: &mut DashboardSession<MapShape>) {
        let Some(source) = session.attributes().get(self.selected_attribute) else {
            return;
        };
        let attribute = source.name.clone();
        let handle = session.open_panel(&attribute);
        self.focused_panel = Some(handle);
        self.focus = Focus::Panels;

        let state = session.registry().panel(handle).map(Panel::state);
        self.status = match state {
            Some(PanelState::Created) => Some(format!("{attribute}: waiting for geometry")),
            Some(PanelState::Unavailable) => Some(format!("{attribute} cannot be analyzed")),
            Some(PanelState::LoadFailed) => Some(format!("{attribute}: map data failed to load")),
            _ => None,
        };
    }

    fn handle_panel_key(&mut self, session: &mut DashboardSession<MapShape>, key: KeyEvent) {
        let Some(handle) = self.focused_panel else {
            return;
        };
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_focus(session, |i, n| (i + n - 1) % n),
            KeyCode::Right | KeyCode::Char('l') => self.move_focus(session, |i, n| (i + 1) % n),
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_focus(session, |i, _| i.saturating_sub(PANELS_PER_ROW));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_focus(session, |i, n| (i + PANELS_PER_ROW).min(n - 1));
            }
            KeyCode::Char('m') => {
                self.status = Some(match session.toggle_view_mode(handle) {
                    Ok(rendered) => format!("{}: revision {}", rendered.attribute, rendered.revision),
                    Err(e) => e.to_string(),
                });
            }
            KeyCode::Char(']') => self.hover_feature(session, handle, next_index),
            KeyCode::Char('[') => self.hover_feature(session, handle, prev_index),
            KeyCode::Char(' ') | KeyCode::Enter => self.select_hovered(session, handle),
            KeyCode::Char('c') => {
                if let Some(state) = self.maps.get_mut(&handle) {
                    state.hover_exit();
                    state.clear();
                    self.set_status("Selection cleared");
                }
            }
            _ => {}
        }
    }

    fn move_focus<F>(&mut self, session: &DashboardSession<MapShape>, step: F)
    where
        F: FnOnce(usize, usize) -> usize,
    {
        let handles = session
            .registry()
            .panels()
            .map(Panel::handle)
            .collect::<Vec<_>>();
        let Some(current) = self
            .focused_panel
            .and_then(|focused| handles.iter().position(|h| *h == focused))
        else {
            return;
        };
        self.focused_panel = handles.get(step(current, handles.len())).copied();
    }

    fn hover_feature(
        &mut self,
        session: &DashboardSession<MapShape>,
        handle: PanelHandle,
        step: fn(Option<usize>, usize) -> Option<usize>,
    ) {
        let Some(view) = map_view(session, handle) else {
            self.set_status("Only map panels have features to hover");
            return;
        };
        let state = self.maps.entry(handle).or_default();
        // joined features are in geometry order
        if let Some(index) = step(state.hovered().copied(), view.join.features.len()) {
            state.hover(index);
            self.status = Some(widgets::describe_feature(&view.join.features[index]));
        }
    }

    fn select_hovered(&mut self, session: &DashboardSession<MapShape>, handle: PanelHandle) {
        let Some(view) = map_view(session, handle) else {
            return;
        };
        let Some(index) = self
            .maps
            .get(&handle)
            .and_then(|state| state.hovered().copied())
        else {
            self.set_status("Hover a feature with [ or ] first");
            return;
        };
        let change = self.maps.entry(handle).or_default().click(index);
        self.status = Some(match change.current {
            Some(index) => format!(
                "Selected {}",
                widgets::describe_feature(&view.join.features[index])
            ),
            None => "Selection cleared".to_owned(),
        });
    }

    pub(in crate::command::dashboard) fn draw(
        &self,
        frame: &mut Frame,
        session: &DashboardSession<MapShape>,
    ) {
        let [main_area, status_area, help_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        let [list_area, grid_area] =
            Layout::horizontal([Constraint::Length(32), Constraint::Fill(1)]).areas(main_area);

        self.draw_attributes(frame, session, list_area);
        self.draw_grid(frame, session, grid_area);

        if let Some(status) = &self.status {
            frame.render_widget(Text::from(status.as_str()), status_area);
        }
        let help = match self.focus {
            Focus::Attributes => "↑/↓: Select | Enter: Open panel | Tab: Panels | b: Breakdowns | r: Reset | q/Esc: Quit",
            Focus::Panels => "←/→/↑/↓: Focus | m: Stats/Boxplot | [/]: Hover | Space: Select | c: Clear | Tab: Attributes | q/Esc: Quit",
        };
        let help_text = Text::from(help)
            .style(Style::default().fg(Color::DarkGray))
            .centered();
        frame.render_widget(help_text, help_area);
    }

    fn draw_attributes(&self, frame: &mut Frame, session: &DashboardSession<MapShape>, area: Rect) {
        let items = session
            .attributes()
            .iter()
            .map(|source| {
                let marker = match session.classify(&source.name) {
                    AttributeKind::Numeric => "#",
                    AttributeKind::SpecialCategorical => "◆",
                    AttributeKind::Unanalyzable => "·",
                };
                let label = session
                    .config()
                    .catalog
                    .special(&source.name)
                    .map_or(source.name.as_str(), |special| special.title.as_str());
                let style = if session.registry().find(&source.name).is_some() {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format!("{marker} {label}")).style(style)
            })
            .collect::<Vec<_>>();

        let list = List::new(items)
            .block(
                Block::bordered()
                    .title("Attributes")
                    .border_style(widgets::focus_style(self.focus == Focus::Attributes)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.selected_attribute));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_grid(&self, frame: &mut Frame, session: &DashboardSession<MapShape>, area: Rect) {
        let rows = session.registry().list_panels();
        if rows.is_empty() {
            let hint = Paragraph::new("Select an attribute and press Enter to open a panel")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::bordered().title("Panels"));
            frame.render_widget(hint, area);
            return;
        }

        let focused_row = self
            .focused_panel
            .and_then(|handle| session.registry().panel(handle))
            .map_or(0, |panel| panel.position().row);
        let first_row = (focused_row + 1).saturating_sub(VISIBLE_ROWS);
        let visible = &rows[first_row..rows.len().min(first_row + VISIBLE_ROWS)];

        let row_areas =
            Layout::vertical(vec![Constraint::Fill(1); visible.len()]).split(area);
        let geometry = session.geometry().loaded().map(Vec::as_slice);
        for (row, row_area) in visible.iter().zip(row_areas.iter()) {
            let slots = Layout::horizontal([Constraint::Ratio(1, 3); PANELS_PER_ROW]).split(*row_area);
            for (panel, slot_area) in row.panels.iter().zip(slots.iter()) {
                let widget = PanelWidget {
                    panel,
                    focused: self.focus == Focus::Panels
                        && self.focused_panel == Some(panel.handle()),
                    geometry,
                    bounds: self.map_bounds,
                    interaction: self.maps.get(&panel.handle()),
                };
                frame.render_widget(widget, *slot_area);
            }
        }
    }
}

fn map_view(session: &DashboardSession<MapShape>, handle: PanelHandle) -> Option<&MapView> {
    match &session.registry().panel(handle)?.rendered()?.view {
        PanelView::Map(view) => Some(view),
        _ => None,
    }
}
