use aed_dashboard::{breakdown::BreakdownChart, interaction::Highlight, session::DashboardSession};
use aed_data::dataset::Dataset;
use aed_stats::weighted::BreakdownScale;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Bar, BarChart, Block, Paragraph, Tabs},
};

use super::{Transition, next_index, prev_index, widgets};
use crate::geometry::MapShape;

/// Weighted breakdown charts, one tab per chart.
#[derive(Debug, Default)]
pub(in crate::command::dashboard) struct BreakdownsScreen {
    selected_chart: usize,
}

impl BreakdownsScreen {
    pub(in crate::command::dashboard) fn handle_key(
        &mut self,
        session: &mut DashboardSession<MapShape>,
        key: KeyEvent,
    ) -> Transition {
        let len = session.breakdowns().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Transition::Quit,
            KeyCode::Char('p' | 'b') => return Transition::ShowPanels,
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => {
                self.switch_chart(session, next_index(Some(self.selected_chart), len));
            }
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => {
                self.switch_chart(session, prev_index(Some(self.selected_chart), len));
            }
            _ => {
                if let Some((chart, dataset)) = session.breakdown_mut(self.selected_chart) {
                    handle_chart_key(chart, dataset, key);
                }
            }
        }
        Transition::Stay
    }

    fn switch_chart(&mut self, session: &mut DashboardSession<MapShape>, next: Option<usize>) {
        let Some(next) = next else {
            return;
        };
        if let Some((chart, _)) = session.breakdown_mut(self.selected_chart) {
            chart.hover_exit();
        }
        self.selected_chart = next;
    }

    pub(in crate::command::dashboard) fn draw(
        &self,
        frame: &mut Frame,
        session: &DashboardSession<MapShape>,
    ) {
        let [tabs_area, chart_area, detail_area, help_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(14),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let help_text = Text::from(
            "←/→: Chart | ↑/↓: Hover | Enter: Drill down | c: Clear | g/G: Region | p: Panels | q/Esc: Quit",
        )
        .style(Style::default().fg(Color::DarkGray))
        .centered();
        frame.render_widget(help_text, help_area);

        let Some((chart, dataset)) = session.breakdown(self.selected_chart) else {
            let hint = Paragraph::new(
                "No breakdown applies: no dataset has the weight column of a configured breakdown",
            )
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::bordered().title("Breakdowns"));
            frame.render_widget(hint, chart_area);
            return;
        };

        let titles = session
            .breakdowns()
            .iter()
            .map(|entry| entry.chart.view().title.clone())
            .collect::<Vec<_>>();
        let tabs = Tabs::new(titles)
            .select(self.selected_chart)
            .highlight_style(Style::default().fg(Color::Yellow))
            .block(Block::bordered().title("Breakdowns"));
        frame.render_widget(tabs, tabs_area);

        draw_chart(frame, chart, chart_area);

        let [drill_area, region_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(detail_area);
        draw_drill_down(frame, chart, dataset, drill_area);
        draw_region_profile(frame, chart, dataset, region_area);
    }
}

fn handle_chart_key(chart: &mut BreakdownChart, dataset: &Dataset, key: KeyEvent) {
    let fields = chart
        .preset()
        .categories
        .iter()
        .map(|category| category.field.clone())
        .collect::<Vec<_>>();
    let hovered = chart
        .interaction()
        .hovered()
        .and_then(|hovered| fields.iter().position(|field| field == hovered));

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if let Some(i) = next_index(hovered, fields.len()) {
                chart.hover(&fields[i]);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if let Some(i) = prev_index(hovered, fields.len()) {
                chart.hover(&fields[i]);
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(i) = hovered {
                chart.click(&fields[i]);
            }
        }
        KeyCode::Char('c') => {
            chart.clear();
        }
        KeyCode::Char('g') => {
            let regions = chart.regions(dataset);
            let current = chart
                .selected_region()
                .and_then(|selected| regions.iter().position(|r| r == selected));
            let next = next_index(current, regions.len()).map(|i| regions[i].clone());
            chart.select_region(next);
        }
        KeyCode::Char('G') => chart.select_region(None),
        _ => {}
    }
}

/// Bar heights are integers; keep one decimal of the value.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar_height(value: f64) -> u64 {
    (value.max(0.0) * 10.0).round() as u64
}

fn format_value(value: f64, scale: BreakdownScale) -> String {
    match scale {
        BreakdownScale::Fraction => format!("{value:.1}%"),
        BreakdownScale::Identity => format!("{value:.1}"),
    }
}

fn draw_chart(frame: &mut Frame, chart: &BreakdownChart, area: Rect) {
    let view = chart.view();
    let bars = view
        .categories
        .iter()
        .map(|value| {
            let highlight = chart.interaction().highlight(&value.category);
            Bar::with_label(value.label.clone(), bar_height(value.value))
                .text_value(format_value(value.value, view.scale))
                .style(widgets::highlight_style(highlight))
        })
        .collect::<Vec<_>>();

    let count = u16::try_from(bars.len()).unwrap_or(u16::MAX).max(1);
    let bar_width = (area.width.saturating_sub(2) / count).saturating_sub(1).max(3);
    let title = format!(
        "{} | {} rows, total weight {:.0}, {} skipped",
        view.title, view.rows, view.total_weight, view.skipped_rows
    );
    let bar_chart = BarChart::new(bars)
        .block(Block::bordered().title(title))
        .bar_width(bar_width)
        .bar_gap(1);
    frame.render_widget(bar_chart, area);
}

fn draw_drill_down(frame: &mut Frame, chart: &BreakdownChart, dataset: &Dataset, area: Rect) {
    let block = Block::bordered().title("Drill-down");
    let Some(drill_down) = chart.drill_down(dataset) else {
        let hint = Paragraph::new("Hover a category with ↑/↓ and press Enter")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let summary = &drill_down.summary;
    let mut lines = vec![
        Line::styled(
            drill_down.label.clone(),
            widgets::highlight_style(Highlight::Selected),
        ),
        Line::raw(format!(
            "Weighted mean: {:.3}",
            drill_down.weighted_mean
        )),
        Line::raw(format!(
            "Rows: {} present, {} missing",
            drill_down.present, drill_down.missing
        )),
        Line::raw(format!(
            "Min {:.3} | Median {:.3} | Max {:.3}",
            summary.min, summary.median, summary.max
        )),
    ];
    lines.extend(
        drill_down
            .preview
            .iter()
            .map(|row| Line::raw(format!("  {}: {}", row.region, row.value))),
    );
    if drill_down.remaining > 0 {
        lines.push(Line::styled(
            format!("  ... {} more", drill_down.remaining),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_region_profile(frame: &mut Frame, chart: &BreakdownChart, dataset: &Dataset, area: Rect) {
    let Some(profile) = chart.region_profile(dataset) else {
        let text = if chart.preset().region_field.is_some() {
            "Press g to step through regions"
        } else {
            "This breakdown has no region column"
        };
        let hint = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::bordered().title("Region"));
        frame.render_widget(hint, area);
        return;
    };

    let lines = profile
        .values
        .iter()
        .map(|value| {
            let shown = value
                .value
                .map_or_else(|| "no data".to_owned(), |v| format!("{v:.3}"));
            Line::raw(format!("{:<24} {shown:>12}", value.label))
        })
        .collect::<Vec<_>>();
    let block = Block::bordered().title(format!("Region {}", profile.region));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
