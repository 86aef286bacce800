//! Account dialogs shown by the app.
//!
//! Each dialog owns a message channel. The commands it returns from
//! `on_submit` report back over that channel, and the dialog drains it in
//! `update`, in the same way a screen processes its own queue.

mod login;
mod logout;
mod signup;

use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

pub use login::LoginDialog;
pub use logout::LogoutDialog;
pub use signup::SignupDialog;

use crate::api::{ApiError, ForumClient};
use crate::app::AppMessage;
use crate::ui::{Modal, ModalBase, ModalContext, ModalEnv, ToastType};

/// Dialogs that can be opened from the home screen or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialogKind {
    Login,
    Signup,
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::Signup => write!(f, "signup"),
        }
    }
}

impl DialogKind {
    /// Wrap the dialog in a modal.
    pub fn open(self, client: Arc<dyn ForumClient>, env: ModalEnv) -> Box<dyn Modal> {
        match self {
            Self::Login => Box::new(ModalBase::new(LoginDialog::new(client), env)),
            Self::Signup => Box::new(ModalBase::new(SignupDialog::new(client), env)),
        }
    }
}

/// What a finished request means for the dialog that sent it.
#[derive(Debug)]
enum Outcome {
    Done,
    Failed(ApiError),
}

/// Forward the result of a request to its dialog.
///
/// Successful sessions and transport failures are also announced app-wide.
fn report<T>(
    result: Result<T, ApiError>,
    tx: &UnboundedSender<Outcome>,
    action_tx: &UnboundedSender<AppMessage>,
    on_success: impl FnOnce(T) -> AppMessage,
) {
    let outcome = match result {
        Ok(value) => {
            let _ = action_tx.send(on_success(value));
            Outcome::Done
        }
        Err(error) => {
            if let ApiError::Transport(reason) = &error {
                warn!(%reason, "Forum request failed");
                let _ = action_tx.send(AppMessage::ShowToast {
                    message: format!("Could not reach the forum: {reason}"),
                    toast_type: ToastType::Error,
                });
            }
            Outcome::Failed(error)
        }
    };
    let _ = tx.send(outcome);
}

/// Apply a finished request to the modal.
fn apply(modal: &mut ModalContext<'_>, outcome: Outcome) {
    match outcome {
        Outcome::Done => modal.hide(),
        Outcome::Failed(error) => {
            modal.set_loading(false);
            // The toast explains a transport failure; an older validation alert would not.
            if matches!(error, ApiError::Transport(_)) {
                modal.set_alert(None);
            }
            modal.handle_errors(error.error_response().as_ref());
        }
    }
}
