//! Data model shared by the dashboard: datasets, attributes and map joins.
//!
//! # Modules
//!
//! - [`value`]: Raw cells and their numeric / key interpretation
//! - [`dataset`]: Records and datasets as delivered by loaders
//! - [`attribute`]: Attribute classification and dataset merging
//! - [`load`]: Pending / loaded / failed state of external loads
//! - [`geo_join`]: Key-based join between rows and map features
//!
//! The crate performs no I/O; loaders build [`dataset::Dataset`] values and
//! [`geo_join::GeoFeature`] lists and hand them over.

pub mod attribute;
pub mod dataset;
pub mod geo_join;
pub mod load;
pub mod value;
