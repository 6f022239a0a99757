//! Chat sinks: outbound delivery of single-recipient posts
//!
//! Every sink is shared as `Arc<dyn ChatSink>` by all execution units, so
//! implementations must tolerate concurrent `post` calls.

mod hipchat;
mod log;
mod sink;
mod telegram;

pub use hipchat::{HipChatSink, HIPCHAT_API_BASE};
pub use log::LogSink;
pub use sink::{ChatSink, SinkError};
pub use telegram::{TelegramSink, TELEGRAM_API_BASE};
