//! Dashboard state: panels, breakdown charts and user interaction.
//!
//! Nothing in this crate draws. Every user action is a state transition on
//! a [`registry::PanelRegistry`] or an [`interaction::InteractionState`],
//! and renderers consume the resulting [`render::Rendered`] instructions.
//!
//! # Modules
//!
//! - [`session`]: One dashboard session tying datasets, geometry, panels and charts together
//! - [`registry`]: Panel lifecycle and row layout
//! - [`panel`]: Panel handles, states and positions
//! - [`render`]: Render instructions for statistics, boxplot and map panels
//! - [`interaction`]: Hover and selection state
//! - [`breakdown`]: Weighted breakdown charts with drill-down
//! - [`config`]: Configuration file format and built-in defaults
//!
//! # Examples
//!
//! ```
//! use aed_dashboard::{config::DashboardConfig, session::DashboardSession};
//! use aed_data::dataset::{Dataset, Record};
//!
//! let covid = Dataset::from_records(
//!     "covid",
//!     vec![Record::from_iter([("FIPS", "01001"), ("Deaths", "12")])],
//! );
//! let mut session = DashboardSession::<()>::new(DashboardConfig::default(), vec![covid]);
//!
//! let deaths = session.open_panel("Deaths");
//! let fips = session.open_panel("FIPS");
//! assert_eq!(session.registry().list_panels()[0].panels.len(), 2);
//! assert!(session.toggle_view_mode(deaths).is_ok());
//! assert!(session.toggle_view_mode(fips).is_err());
//! ```

pub mod breakdown;
pub mod config;
pub mod interaction;
pub mod panel;
pub mod registry;
pub mod render;
pub mod session;
