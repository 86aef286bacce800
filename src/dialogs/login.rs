use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use ratatui::text::Line;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{Outcome, apply, report};
use crate::api::{Credentials, ForumClient};
use crate::app::AppMessage;
use crate::commands::Command;
use crate::ui::{Dialog, ModalContext, TextField};

/// Log in with a username or email address and a password.
pub struct LoginDialog {
    client: Arc<dyn ForumClient>,
    msg_tx: UnboundedSender<Outcome>,
    msg_rx: UnboundedReceiver<Outcome>,
}

impl LoginDialog {
    pub fn new(client: Arc<dyn ForumClient>) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            client,
            msg_tx,
            msg_rx,
        }
    }
}

impl Dialog for LoginDialog {
    fn class_name(&self) -> &'static str {
        "LogInModal"
    }

    fn title(&self) -> Line<'static> {
        Line::from("Log In")
    }

    fn fields(&self) -> Vec<TextField> {
        vec![
            TextField::new("identification", "Username or Email"),
            TextField::new("password", "Password").masked(),
        ]
    }

    fn loading_label(&self) -> Option<&'static str> {
        Some("Logging in...")
    }

    fn on_submit(&mut self, modal: &mut ModalContext<'_>) -> Result<Option<Box<dyn Command>>> {
        let credentials = Credentials {
            identification: modal.form().value("identification").trim().to_string(),
            password: modal.form().value("password").to_string(),
        };
        modal.set_loading(true);
        Ok(Some(Box::new(LogInCmd {
            client: Arc::clone(&self.client),
            credentials,
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

struct LogInCmd {
    client: Arc<dyn ForumClient>,
    credentials: Credentials,
    tx: UnboundedSender<Outcome>,
}

#[async_trait]
impl Command for LogInCmd {
    fn name(&self) -> String {
        format!("Logging in as {}", self.credentials.identification)
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let Self { client, credentials, tx } = *self;
        let result = client.log_in(credentials).await;
        report(result, &tx, &action_tx, AppMessage::SignedIn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::InMemoryForum;
    use crate::ui::modal::tests::{Recorder, env};
    use crate::ui::{Component, EventResult, Modal, ModalBase, ModalOutput, ModalPhase, Severity};

    fn open(forum: InMemoryForum) -> (ModalBase<LoginDialog>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let modal = ModalBase::new(LoginDialog::new(Arc::new(forum)), env(&recorder));
        (modal, recorder)
    }

    fn fill(modal: &mut ModalBase<LoginDialog>, name: &str, value: &str) {
        modal
            .context()
            .form_mut()
            .field_mut(name)
            .unwrap()
            .set_value(value);
    }

    async fn submit(modal: &mut ModalBase<LoginDialog>) -> mpsc::UnboundedReceiver<AppMessage> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let result = modal
            .handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        let EventResult::Event(ModalOutput::Run(command)) = result else {
            panic!("submit did not produce a command");
        };
        assert!(modal.loading());
        command.execute(action_tx).await.unwrap();
        modal.update().unwrap();
        action_rx
    }

    #[tokio::test]
    async fn test_successful_login_closes_modal() {
        let (mut modal, recorder) = open(InMemoryForum::seeded(Duration::ZERO));
        fill(&mut modal, "identification", "toby");
        fill(&mut modal, "password", "hunter2hunter2");

        let mut action_rx = submit(&mut modal).await;

        assert_eq!(recorder.closes.get(), 1);
        let Ok(AppMessage::SignedIn(session)) = action_rx.try_recv() else {
            panic!("expected a session");
        };
        assert_eq!(session.username, "toby");
    }

    #[tokio::test]
    async fn test_rejected_login_shows_errors() {
        let (mut modal, recorder) = open(InMemoryForum::seeded(Duration::ZERO));
        fill(&mut modal, "identification", "toby");
        fill(&mut modal, "password", "wrong");

        submit(&mut modal).await;

        assert_eq!(recorder.closes.get(), 0);
        assert!(!modal.loading());
        assert_eq!(modal.phase(), ModalPhase::Error);
        let alert = modal.alert().unwrap();
        assert_eq!(alert.severity(), Severity::Warning);
        assert_eq!(alert.plain_message(), "Your login details were incorrect.");
        assert_eq!(modal.form().focused_name(), Some("password"));
        assert!(modal.form().focused().unwrap().is_selected());
    }

    #[tokio::test]
    async fn test_empty_form_focuses_first_missing_field() {
        let (mut modal, _) = open(InMemoryForum::seeded(Duration::ZERO));
        fill(&mut modal, "password", "something");

        submit(&mut modal).await;

        assert_eq!(
            modal.alert().unwrap().plain_message(),
            "The identification field is required."
        );
        assert_eq!(modal.form().focused_name(), Some("identification"));
    }

    #[tokio::test]
    async fn test_transport_failure_focuses_first_field_and_toasts() {
        let forum = InMemoryForum::seeded(Duration::ZERO);
        forum.set_offline(true);
        let (mut modal, _) = open(forum);
        fill(&mut modal, "identification", "toby");
        fill(&mut modal, "password", "hunter2hunter2");

        let mut action_rx = submit(&mut modal).await;

        assert!(!modal.loading());
        assert_eq!(modal.alert(), None);
        assert_eq!(modal.form().focused_name(), Some("identification"));
        assert!(matches!(
            action_rx.try_recv(),
            Ok(AppMessage::ShowToast { toast_type: crate::ui::ToastType::Error, .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_clears_stale_alert() {
        let forum = Arc::new(InMemoryForum::seeded(Duration::ZERO));
        let recorder = Arc::new(Recorder::default());
        let mut modal = ModalBase::new(LoginDialog::new(Arc::clone(&forum) as Arc<dyn ForumClient>), env(&recorder));
        fill(&mut modal, "identification", "toby");
        fill(&mut modal, "password", "wrong");
        submit(&mut modal).await;
        assert!(modal.alert().is_some());

        forum.set_offline(true);
        fill(&mut modal, "password", "hunter2hunter2");
        submit(&mut modal).await;

        assert_eq!(modal.alert(), None);
        assert_eq!(modal.phase(), ModalPhase::Error);
        assert!(!modal.loading());
    }
}
