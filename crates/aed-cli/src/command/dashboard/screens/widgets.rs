use aed_dashboard::{
    interaction::{Highlight, InteractionState},
    panel::Panel,
    render::{BoxplotView, MapView, PanelView, StatsView},
};
use aed_data::geo_join::{GeoFeature, JoinedFeature};
use aed_stats::{boxplot::Boxplot, summary::NumericSummary};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    prelude::Direction,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        Bar, BarChart, Block, Paragraph, Widget, Wrap,
        canvas::{Canvas, Line as CanvasLine, Points},
    },
};

use crate::geometry::{Bounds, MapShape};

const CATEGORY_PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Green,
    Color::Magenta,
    Color::Blue,
    Color::LightRed,
    Color::LightGreen,
];

pub(super) fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

pub(super) fn highlight_style(highlight: Highlight) -> Style {
    match highlight {
        Highlight::Selected => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        Highlight::Hovered => Style::default().fg(Color::White),
        Highlight::Normal => Style::default().fg(Color::Cyan),
    }
}

/// One line describing a joined feature: its name and value.
pub(super) fn describe_feature(feature: &JoinedFeature) -> String {
    let name = feature
        .display_name
        .clone()
        .or_else(|| feature.key.clone())
        .unwrap_or_else(|| format!("feature #{}", feature.feature_index));
    match feature.value.as_ref().filter(|value| !value.is_missing()) {
        Some(value) => format!("{name}: {value}"),
        None => format!("{name}: no data"),
    }
}

/// A dashboard panel drawn from its latest render output.
pub(super) struct PanelWidget<'a> {
    pub panel: &'a Panel,
    pub focused: bool,
    pub geometry: Option<&'a [GeoFeature<MapShape>]>,
    pub bounds: Option<Bounds>,
    pub interaction: Option<&'a InteractionState<usize>>,
}

impl Widget for PanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let mut block = Block::bordered()
            .title(format!(" {} ", self.panel.attribute()))
            .border_style(focus_style(self.focused));
        if let Some(mode) = self.panel.state().view_mode() {
            block = block.title_bottom(Line::from(format!(" {mode} ")).right_aligned());
        }
        let inner = block.inner(area);
        Widget::render(block, area, buf);

        match self.panel.rendered().map(|rendered| &rendered.view) {
            Some(PanelView::Stats(view)) => StatsWidget { view }.render(inner, buf),
            Some(PanelView::Boxplot(view)) => BoxplotWidget { view }.render(inner, buf),
            Some(PanelView::Map(view)) => MapWidget {
                view,
                geometry: self.geometry.unwrap_or_default(),
                bounds: self.bounds,
                interaction: self.interaction,
            }
            .render(inner, buf),
            Some(PanelView::Unavailable { reason }) => {
                message(reason, Color::DarkGray).render(inner, buf);
            }
            Some(PanelView::LoadFailed { error }) => {
                message(&format!("Map unavailable: {error}"), Color::Red).render(inner, buf);
            }
            Some(PanelView::Pending) | None => {
                message("Loading geometry...", Color::DarkGray).render(inner, buf);
            }
        }
    }
}

fn message(text: &str, color: Color) -> Paragraph<'static> {
    Paragraph::new(text.to_owned())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
}

fn summary_lines(summary: &NumericSummary) -> Vec<Line<'static>> {
    vec![
        Line::raw(format!("Count:    {:>12}", summary.count)),
        Line::raw(format!("Missing:  {:>12}", summary.missing)),
        Line::raw(format!("Distinct: {:>12}", summary.distinct)),
        Line::raw(format!("Min:      {:>12.2}", summary.min)),
        Line::raw(format!("Median:   {:>12.2}", summary.median)),
        Line::raw(format!("Mean:     {:>12.2}", summary.mean)),
        Line::raw(format!("Max:      {:>12.2}", summary.max)),
        Line::raw(format!("IQR:      {:>12.2}", summary.iqr)),
    ]
}

struct StatsWidget<'a> {
    view: &'a StatsView,
}

impl Widget for StatsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let summary = &self.view.summary;
        if summary.is_empty() {
            message(
                &format!("No numeric values ({} missing)", summary.missing),
                Color::DarkGray,
            )
            .render(area, buf);
            return;
        }

        let lines = summary_lines(summary);
        #[expect(clippy::cast_possible_truncation)]
        let [stats_area, chart_area] =
            Layout::vertical([Constraint::Length(lines.len() as u16), Constraint::Fill(1)])
                .areas(area);

        let chart = BarChart::new(
            summary
                .histogram
                .bins
                .iter()
                .map(|bin| {
                    Bar::with_label(format!("{:>9.1}", bin.start), bin.count)
                        .text_value(bin.count.to_string())
                })
                .collect::<Vec<_>>(),
        )
        .direction(Direction::Horizontal)
        .bar_gap(0);

        Paragraph::new(lines).render(stats_area, buf);
        chart.render(chart_area, buf);
    }
}

struct BoxplotWidget<'a> {
    view: &'a BoxplotView,
}

impl Widget for BoxplotWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let BoxplotView { summary, boxplot } = self.view;
        if summary.is_empty() {
            message("No numeric values", Color::DarkGray).render(area, buf);
            return;
        }

        let mut lines = vec![
            Line::styled(
                boxplot_strip(boxplot, usize::from(area.width)),
                Style::default().fg(Color::Cyan),
            ),
            Line::raw(""),
            Line::raw(format!("Min:      {:>12.2}", boxplot.whisker_low)),
            Line::raw(format!("Q1:       {:>12.2}", boxplot.q1)),
            Line::raw(format!("Median:   {:>12.2}", boxplot.median)),
            Line::raw(format!("Q3:       {:>12.2}", boxplot.q3)),
            Line::raw(format!("Max:      {:>12.2}", boxplot.whisker_high)),
            Line::raw(format!(
                "Fences:   {:.2} .. {:.2}",
                boxplot.fences.lower, boxplot.fences.upper
            )),
            Line::raw(format!("Outliers: {:>12}", boxplot.outlier_count())),
        ];
        if !boxplot.outliers.is_empty() {
            let shown = boxplot
                .outliers
                .iter()
                .take(5)
                .map(|v| format!("{v:.2}"))
                .collect::<Vec<_>>()
                .join(", ");
            let more = boxplot.outliers.len().saturating_sub(5);
            let suffix = if more > 0 {
                format!(" (+{more})")
            } else {
                String::new()
            };
            lines.push(Line::styled(
                format!("  {shown}{suffix}"),
                Style::default().fg(Color::LightRed),
            ));
        }
        Paragraph::new(lines).render(area, buf);
    }
}

/// Draws a horizontal boxplot `width` cells wide.
///
/// `│` marks the whiskers, `█` the box, `┃` the median and `•` outliers.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn boxplot_strip(boxplot: &Boxplot, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let (lo, hi) = (boxplot.whisker_low, boxplot.whisker_high);
    let column = |value: f64| -> usize {
        if hi > lo {
            (((value - lo) / (hi - lo)) * (width - 1) as f64)
                .round()
                .clamp(0.0, (width - 1) as f64) as usize
        } else {
            (width - 1) / 2
        }
    };

    let mut cells = vec![' '; width];
    let (low, high) = (column(lo), column(hi));
    for cell in &mut cells[low..=high] {
        *cell = '─';
    }
    for cell in &mut cells[column(boxplot.q1)..=column(boxplot.q3)] {
        *cell = '█';
    }
    cells[low] = '│';
    cells[high] = '│';
    cells[column(boxplot.median)] = '┃';
    for &outlier in &boxplot.outliers {
        cells[column(outlier)] = '•';
    }
    cells.into_iter().collect()
}

struct MapWidget<'a> {
    view: &'a MapView,
    geometry: &'a [GeoFeature<MapShape>],
    bounds: Option<Bounds>,
    interaction: Option<&'a InteractionState<usize>>,
}

impl MapWidget<'_> {
    fn feature_color(&self, feature: &JoinedFeature) -> Color {
        let highlight = self
            .interaction
            .map_or(Highlight::Normal, |state| state.highlight(&feature.feature_index));
        match highlight {
            Highlight::Selected => return Color::Yellow,
            Highlight::Hovered => return Color::White,
            Highlight::Normal => {}
        }
        let Some(value) = feature.value.as_ref().filter(|value| !value.is_missing()) else {
            return Color::DarkGray;
        };
        match (value.as_number(), self.view.value_range) {
            (Some(number), Some((min, max))) => gradient(number, min, max),
            _ => {
                let row = feature.row.unwrap_or_default();
                CATEGORY_PALETTE[row % CATEGORY_PALETTE.len()]
            }
        }
    }
}

/// Blue for `min` through red for `max`.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn gradient(value: f64, min: f64, max: f64) -> Color {
    let t = if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let lerp = |from: f64, to: f64| (from + (to - from) * t).round() as u8;
    Color::Rgb(lerp(49.0, 239.0), lerp(130.0, 59.0), lerp(189.0, 44.0))
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let [map_area, info_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(2)]).areas(area);

        let summary = &self.view.join.summary;
        let focus = self
            .interaction
            .and_then(|state| state.hovered().or(state.selected()))
            .and_then(|&index| self.view.join.features.get(index));
        let info = vec![
            Line::raw(focus.map_or_else(|| self.view.title.clone(), describe_feature)),
            Line::styled(
                format!(
                    "{} matched | {} without data | {} rows unmapped",
                    summary.matched,
                    summary.unmatched,
                    summary.unmatched_row_keys.len()
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        Paragraph::new(info).render(info_area, buf);

        let Some(bounds) = self.bounds else {
            message("Geometry has no coordinates", Color::DarkGray).render(map_area, buf);
            return;
        };
        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([bounds.min_x, bounds.max_x])
            .y_bounds([bounds.min_y, bounds.max_y])
            .paint(|ctx| {
                for (feature, shape) in self.view.join.paired(self.geometry) {
                    let color = self.feature_color(feature);
                    for path in &shape.geometry.paths {
                        if let [point] = path.as_slice() {
                            ctx.draw(&Points {
                                coords: &[*point],
                                color,
                            });
                        }
                        for pair in path.windows(2) {
                            let [(x1, y1), (x2, y2)] = [pair[0], pair[1]];
                            ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
                        }
                    }
                }
            });
        canvas.render(map_area, buf);
    }
}
