//! Async commands for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Dialogs return commands, and the App spawns them and tells the open modal
//! when one finishes.

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMessage;

/// Async command that performs side effects.
///
/// Commands typically send their result back to the dialog that created them
/// via a channel, and use `action_tx` for app-wide feedback such as toasts.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logging.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()>;
}
