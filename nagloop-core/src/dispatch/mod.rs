//! Producer scheduling and notice delivery
//!
//! A [`Dispatcher`] owns the registered producers and the shared sink. Running it
//! spawns one execution unit per producer; each unit repeats
//! poll → drain → sleep on its own cadence until cancelled.

mod delivery;
mod dispatcher;
mod producer;
mod unit;

pub use delivery::{deliver, DeliveryError};
pub use dispatcher::{DispatchSettings, Dispatcher, RunSummary};
pub use producer::{NoticeStream, PollOutcome, Producer};
