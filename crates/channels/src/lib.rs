//! Delivery channels for Mindgate.
//!
//! Currently a single channel: the Telegram Bot API, driven in webhook
//! mode. `TelegramApi` is the thin HTTP client; `NotificationPipeline`
//! is the decoupled ack-then-deliver flow the webhook handler hands
//! updates to.

mod pipeline;
mod telegram;

pub use pipeline::NotificationPipeline;
pub use telegram::{TelegramApi, TelegramUpdate};
