//! HAAP server: JSON HTTP adapter and runtime configuration over `haap-core`.

pub mod api;
pub mod config;
