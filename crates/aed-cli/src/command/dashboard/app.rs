use aed_dashboard::session::DashboardSession;
use crossterm::event::Event;
use ratatui::Frame;

use crate::{
    command::dashboard::{
        loader::GeometryLoader,
        screens::{BreakdownsScreen, PanelsScreen, Transition},
    },
    geometry::MapShape,
    tui::{App, Tui},
};

/// Ticks per second; the geometry load is polled on every tick.
const TICK_RATE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Panels,
    Breakdowns,
}

#[derive(Debug)]
pub(super) struct DashboardApp {
    session: DashboardSession<MapShape>,
    loader: GeometryLoader,
    screen: Screen,
    panels: PanelsScreen,
    breakdowns: BreakdownsScreen,
    should_exit: bool,
}

impl DashboardApp {
    pub(super) fn new(session: DashboardSession<MapShape>, loader: GeometryLoader) -> Self {
        Self {
            session,
            loader,
            screen: Screen::Panels,
            panels: PanelsScreen::default(),
            breakdowns: BreakdownsScreen::default(),
            should_exit: false,
        }
    }

    /// Applies a finished geometry load; returns `true` if one arrived.
    fn poll_geometry(&mut self) -> bool {
        let Some(state) = self.loader.poll() else {
            return false;
        };
        let refreshed = self.session.set_geometry(state);
        self.panels.geometry_changed(&self.session, &refreshed);
        true
    }
}

impl App for DashboardApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(Some(TICK_RATE));
        self.panels
            .set_status(format!("{} attributes loaded", self.session.attributes().len()));
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        let transition = match self.screen {
            Screen::Panels => self.panels.handle_key(&mut self.session, key),
            Screen::Breakdowns => self.breakdowns.handle_key(&mut self.session, key),
        };
        match transition {
            Transition::Stay => {}
            Transition::ShowPanels => self.screen = Screen::Panels,
            Transition::ShowBreakdowns => self.screen = Screen::Breakdowns,
            Transition::Quit => self.should_exit = true,
        }
    }

    fn draw(&self, frame: &mut Frame) {
        match self.screen {
            Screen::Panels => self.panels.draw(frame, &self.session),
            Screen::Breakdowns => self.breakdowns.draw(frame, &self.session),
        }
    }

    fn update(&mut self, tui: &mut Tui) {
        if self.poll_geometry() {
            tui.request_render();
        }
    }
}

#[cfg(test)]
mod tests {
    use aed_dashboard::{config::DashboardConfig, panel::PanelState, render::ViewMode};
    use aed_data::dataset::{Dataset, Record};
    use crossterm::event::{KeyCode, KeyEvent};
    use ratatui::{Terminal, backend::TestBackend, buffer::Cell};

    use super::*;

    fn covid() -> Dataset {
        let records = [("01001", "Alabama", "10"), ("01003", "Alabama", "30")]
            .into_iter()
            .map(|(fips, state, deaths)| {
                Record::from_iter([("FIPS", fips), ("Province_State", state), ("Deaths", deaths)])
            })
            .collect();
        Dataset::new(
            "covid",
            vec!["FIPS".into(), "Province_State".into(), "Deaths".into()],
            records,
        )
    }

    fn census() -> Dataset {
        let records = [("01001", "100", "0.5", "0.5"), ("01003", "300", "0.1", "0.9")]
            .into_iter()
            .map(|(geoid, population, white, black)| {
                Record::from_iter([
                    ("GEOID", geoid),
                    ("total_population", population),
                    ("white", white),
                    ("black", black),
                ])
            })
            .collect();
        Dataset::from_records("census", records)
    }

    fn app() -> DashboardApp {
        let session = DashboardSession::new(DashboardConfig::default(), vec![covid(), census()]);
        DashboardApp::new(session, GeometryLoader::spawn(None))
    }

    fn press(app: &mut DashboardApp, tui: &mut Tui, code: KeyCode) {
        app.handle_event(tui, Event::Key(KeyEvent::from(code)));
    }

    fn screen_text(app: &DashboardApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(Cell::symbol)
            .collect()
    }

    #[test]
    fn test_open_and_toggle_panel() {
        let mut app = app();
        let mut tui = Tui::new();
        app.init(&mut tui);
        assert!(screen_text(&app).contains("Select an attribute"));

        // FIPS, Province_State, Deaths: the third attribute is numeric
        press(&mut app, &mut tui, KeyCode::Down);
        press(&mut app, &mut tui, KeyCode::Down);
        press(&mut app, &mut tui, KeyCode::Enter);
        let handle = app.session.registry().find("Deaths").unwrap();
        assert_eq!(
            app.session.registry().panel(handle).unwrap().state(),
            PanelState::Rendering(ViewMode::Stats)
        );
        assert!(screen_text(&app).contains("Median"));

        press(&mut app, &mut tui, KeyCode::Char('m'));
        assert_eq!(
            app.session.registry().panel(handle).unwrap().state(),
            PanelState::Rendering(ViewMode::Boxplot)
        );
        assert!(screen_text(&app).contains("Fences"));

        press(&mut app, &mut tui, KeyCode::Char('r'));
        assert!(app.session.registry().is_empty());
    }

    #[test]
    fn test_map_panel_after_failed_geometry() {
        let mut app = app();
        let mut tui = Tui::new();
        press(&mut app, &mut tui, KeyCode::Enter);
        let handle = app.session.registry().find("FIPS").unwrap();
        assert_eq!(
            app.session.registry().panel(handle).unwrap().state(),
            PanelState::Created
        );

        app.update(&mut tui);
        assert_eq!(
            app.session.registry().panel(handle).unwrap().state(),
            PanelState::LoadFailed
        );
        assert!(screen_text(&app).contains("Map unavailable"));
    }

    #[test]
    fn test_breakdown_drill_down() {
        let mut app = app();
        let mut tui = Tui::new();
        press(&mut app, &mut tui, KeyCode::Char('b'));
        assert_eq!(app.screen, Screen::Breakdowns);

        press(&mut app, &mut tui, KeyCode::Down);
        press(&mut app, &mut tui, KeyCode::Enter);
        let (chart, _) = app.session.breakdown(0).unwrap();
        assert_eq!(chart.interaction().selected().map(String::as_str), Some("white"));
        let text = screen_text(&app);
        assert!(text.contains("Weighted mean"));
        assert!(text.contains("01001"));

        press(&mut app, &mut tui, KeyCode::Char('g'));
        let (chart, _) = app.session.breakdown(0).unwrap();
        assert_eq!(chart.selected_region(), Some("01001"));

        press(&mut app, &mut tui, KeyCode::Char('p'));
        assert_eq!(app.screen, Screen::Panels);
        press(&mut app, &mut tui, KeyCode::Char('q'));
        assert!(app.should_exit());
    }
}
