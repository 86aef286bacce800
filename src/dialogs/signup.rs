use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use ratatui::text::Line;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{Outcome, apply, report};
use crate::api::{ForumClient, Registration};
use crate::app::AppMessage;
use crate::commands::Command;
use crate::ui::{Dialog, ModalContext, TextField};

/// Register a new account. A successful registration also signs the user in.
pub struct SignupDialog {
    client: Arc<dyn ForumClient>,
    msg_tx: UnboundedSender<Outcome>,
    msg_rx: UnboundedReceiver<Outcome>,
}

impl SignupDialog {
    pub fn new(client: Arc<dyn ForumClient>) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            client,
            msg_tx,
            msg_rx,
        }
    }
}

impl Dialog for SignupDialog {
    fn class_name(&self) -> &'static str {
        "SignUpModal"
    }

    fn title(&self) -> Line<'static> {
        Line::from("Sign Up")
    }

    fn fields(&self) -> Vec<TextField> {
        vec![
            TextField::new("username", "Username"),
            TextField::new("email", "Email").with_placeholder("you@example.com"),
            TextField::new("password", "Password").masked(),
        ]
    }

    fn loading_label(&self) -> Option<&'static str> {
        Some("Creating account...")
    }

    fn on_submit(&mut self, modal: &mut ModalContext<'_>) -> Result<Option<Box<dyn Command>>> {
        let form = modal.form();
        let registration = Registration {
            username: form.value("username").trim().to_string(),
            email: form.value("email").trim().to_string(),
            password: form.value("password").to_string(),
        };
        modal.set_loading(true);
        Ok(Some(Box::new(SignUpCmd {
            client: Arc::clone(&self.client),
            registration,
            tx: self.msg_tx.clone(),
        })))
    }

    fn update(&mut self, modal: &mut ModalContext<'_>) -> Result<()> {
        while let Ok(outcome) = self.msg_rx.try_recv() {
            apply(modal, outcome);
        }
        Ok(())
    }
}

struct SignUpCmd {
    client: Arc<dyn ForumClient>,
    registration: Registration,
    tx: UnboundedSender<Outcome>,
}

#[async_trait]
impl Command for SignUpCmd {
    fn name(&self) -> String {
        format!("Signing up {}", self.registration.username)
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let Self {
            client,
            registration,
            tx,
        } = *self;
        let result = client.sign_up(registration).await;
        report(result, &tx, &action_tx, AppMessage::SignedIn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::Theme;
    use crate::api::InMemoryForum;
    use crate::ui::modal::tests::{Recorder, env};
    use crate::ui::{Component, EventResult, Modal, ModalBase, ModalOutput};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(modal: &mut ModalBase<SignupDialog>, text: &str) {
        for c in text.chars() {
            modal.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[tokio::test]
    async fn test_signup_errors_are_listed_in_order() {
        let recorder = Arc::new(Recorder::default());
        let forum = Arc::new(InMemoryForum::seeded(Duration::ZERO));
        let mut modal = ModalBase::new(SignupDialog::new(forum), env(&recorder));

        // First render focuses the username field.
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| {
                let area = frame.area();
                modal.render(frame, area, &theme);
            })
            .unwrap();

        type_text(&mut modal, "toby");
        modal.handle_key(key(KeyCode::Tab)).unwrap();
        type_text(&mut modal, "nope");
        modal.handle_key(key(KeyCode::Tab)).unwrap();
        type_text(&mut modal, "short");

        let EventResult::Event(ModalOutput::Run(command)) = modal.handle_key(key(KeyCode::Enter)).unwrap() else {
            panic!("submit did not produce a command");
        };
        let (action_tx, _action_rx) = mpsc::unbounded_channel();
        command.execute(action_tx).await.unwrap();
        modal.update().unwrap();

        assert_eq!(
            modal.alert().unwrap().plain_message(),
            [
                "The username has already been taken.",
                "The email must be a valid email address.",
                "The password must be at least 8 characters.",
            ]
            .join("\n")
        );
        assert_eq!(modal.form().focused_name(), Some("username"));
        assert!(modal.form().focused().unwrap().is_selected());
        assert_eq!(recorder.closes.get(), 0);
    }

    #[tokio::test]
    async fn test_signup_success_signs_in() {
        let recorder = Arc::new(Recorder::default());
        let forum = Arc::new(InMemoryForum::seeded(Duration::ZERO));
        let mut modal = ModalBase::new(SignupDialog::new(forum), env(&recorder));
        {
            let mut context = modal.context();
            let form = context.form_mut();
            form.field_mut("username").unwrap().set_value("newbie");
            form.field_mut("email").unwrap().set_value("newbie@example.com");
            form.field_mut("password").unwrap().set_value("long enough");
        }

        let command = modal.submit().unwrap().unwrap();
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();
        command.execute(action_tx).await.unwrap();
        modal.update().unwrap();

        assert_eq!(recorder.closes.get(), 1);
        assert!(matches!(action_rx.try_recv(), Ok(AppMessage::SignedIn(session)) if session.username == "newbie"));
    }
}
