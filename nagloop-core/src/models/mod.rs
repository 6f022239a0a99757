//! Data models for nagloop

pub mod configuration;
pub mod notice;

pub use configuration::*;
pub use notice::*;
