//! # Nagloop Core Library
//!
//! Producer scheduling and chat-room dispatch: producers are polled on their own
//! cadence and every notice they emit is posted to a chat sink.

pub mod dispatch;
pub mod models;
pub mod producers;
pub mod services;
pub mod sinks;
