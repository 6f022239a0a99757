//! Service layer for nagloop

pub mod logging;
