//! Hover and selection state for interactive charts.
//!
//! Hover is transient and independent of the selection. At most one entity
//! is selected at a time: clicking the selected entity clears the selection
//! and clicking any other entity replaces it in a single step.

use serde::Serialize;

/// How an entity should be emphasized when drawn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    #[default]
    Normal,
    /// Under the pointer (transient).
    Hovered,
    /// Selected (persistent, takes precedence over hover).
    Selected,
}

/// Change of the hovered entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverEvent<K> {
    pub previous: Option<K>,
    pub current: Option<K>,
}

impl<K: PartialEq> HoverEvent<K> {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Change of the selected entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionChanged<K> {
    pub previous: Option<K>,
    pub current: Option<K>,
}

impl<K: PartialEq> SelectionChanged<K> {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }

    /// Returns `true` if the change left nothing selected.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.previous.is_some() && self.current.is_none()
    }
}

/// Hover and selection state over entities keyed by `K`.
///
/// # Examples
///
/// ```
/// use aed_dashboard::interaction::{Highlight, InteractionState};
///
/// let mut state = InteractionState::new();
/// state.click("White");
/// state.hover("Black");
/// assert_eq!(state.highlight(&"White"), Highlight::Selected);
/// assert_eq!(state.highlight(&"Black"), Highlight::Hovered);
///
/// let change = state.click("White");
/// assert!(change.is_cleared());
/// assert_eq!(state.selected(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionState<K> {
    hovered: Option<K>,
    selected: Option<K>,
}

impl<K> Default for InteractionState<K> {
    fn default() -> Self {
        Self {
            hovered: None,
            selected: None,
        }
    }
}

impl<K> InteractionState<K>
where
    K: Clone + PartialEq,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&K> {
        self.hovered.as_ref()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&K> {
        self.selected.as_ref()
    }

    pub fn hover(&mut self, key: K) -> HoverEvent<K> {
        let previous = self.hovered.replace(key);
        HoverEvent {
            previous,
            current: self.hovered.clone(),
        }
    }

    pub fn hover_exit(&mut self) -> HoverEvent<K> {
        HoverEvent {
            previous: self.hovered.take(),
            current: None,
        }
    }

    /// Toggles or replaces the selection.
    pub fn click(&mut self, key: K) -> SelectionChanged<K> {
        let previous = self.selected.take();
        if previous.as_ref() != Some(&key) {
            self.selected = Some(key);
        }
        SelectionChanged {
            previous,
            current: self.selected.clone(),
        }
    }

    pub fn clear(&mut self) -> SelectionChanged<K> {
        SelectionChanged {
            previous: self.selected.take(),
            current: None,
        }
    }

    #[must_use]
    pub fn highlight(&self, key: &K) -> Highlight {
        if self.selected.as_ref() == Some(key) {
            Highlight::Selected
        } else if self.hovered.as_ref() == Some(key) {
            Highlight::Hovered
        } else {
            Highlight::Normal
        }
    }
}
