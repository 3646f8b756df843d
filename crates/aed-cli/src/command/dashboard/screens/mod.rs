pub(super) use self::{breakdowns::BreakdownsScreen, panels::PanelsScreen};

mod breakdowns;
mod panels;
mod widgets;

/// What the app should do after a screen handled a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Transition {
    Stay,
    ShowPanels,
    ShowBreakdowns,
    Quit,
}

/// Index after `current` in a list of `len` items, wrapping around.
fn next_index(current: Option<usize>, len: usize) -> Option<usize> {
    (len > 0).then(|| current.map_or(0, |i| (i + 1) % len))
}

/// Index before `current` in a list of `len` items, wrapping around.
fn prev_index(current: Option<usize>, len: usize) -> Option<usize> {
    (len > 0).then(|| current.map_or(len - 1, |i| (i + len - 1) % len))
}
