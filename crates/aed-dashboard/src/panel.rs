use aed_data::attribute::AttributeKind;
use serde::Serialize;

use crate::render::{Rendered, ViewMode};

/// Stable identifier of a panel within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, derive_more::Display)]
#[display("panel#{_0}")]
pub struct PanelHandle(pub(crate) usize);

/// Lifecycle state of a panel.
///
/// ```text
/// Created ──→ Rendering(Stats) ⇄ Rendering(Boxplot)   numeric
///    │
///    ├──→ MapRendered                                 special, geometry loaded
///    ├──→ LoadFailed                                  special, geometry failed
///    └──→ Unavailable                                 unanalyzable
/// ```
///
/// A map panel stays `Created` while its geometry is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    Created,
    Rendering(ViewMode),
    MapRendered,
    Unavailable,
    LoadFailed,
}

impl PanelState {
    /// The view mode of a numeric panel.
    #[must_use]
    pub fn view_mode(self) -> Option<ViewMode> {
        match self {
            Self::Rendering(mode) => Some(mode),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelPosition {
    pub row: usize,
    pub slot: usize,
}

/// A dashboard panel owned by one attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub(crate) handle: PanelHandle,
    pub(crate) attribute: String,
    pub(crate) kind: AttributeKind,
    pub(crate) state: PanelState,
    pub(crate) position: PanelPosition,
    pub(crate) revision: u64,
    pub(crate) rendered: Option<Rendered>,
}

impl Panel {
    #[must_use]
    pub fn handle(&self) -> PanelHandle {
        self.handle
    }

    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    #[must_use]
    pub fn state(&self) -> PanelState {
        self.state
    }

    #[must_use]
    pub fn position(&self) -> PanelPosition {
        self.position
    }

    /// Revision of the latest render.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The latest render output.
    #[must_use]
    pub fn rendered(&self) -> Option<&Rendered> {
        self.rendered.as_ref()
    }
}
