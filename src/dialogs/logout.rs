use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{Outcome, apply, report};
use crate::Theme;
use crate::api::{ForumClient, Session};
use crate::app::AppMessage;
use crate::commands::Command;
use crate::config::{ConfirmAction, KeyResolver};
use crate::ui::{Dialog, EventResult, Form, FormEvent, ModalContext};

/// Confirmation before ending the current session.
pub struct LogoutDialog {
    client: Arc<dyn ForumClient>,
    session: Session,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<Outcome>,
    msg_rx: UnboundedReceiver<Outcome>,
}

impl LogoutDialog {
    pub fn new(client: Arc<dyn ForumClient>, session: Session, resolver: Arc<KeyResolver>) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            client,
            session,
            resolver,
            msg_tx,
            msg_rx,
        }
    }
}

impl Dialog for LogoutDialog {
    fn class_name(&self) -> &'static str {
        "LogOutModal"
    }

    fn title(&self) -> Line<'static> {
        Line::from("Log Out")
    }

    fn content_height(&self, _form: &Form) -> u16 {
        3
    }

    fn render_content(&mut self, frame: &mut Frame, area: Rect, _form: &Form, theme: &Theme) {
        let key_style = Style::default().fg(theme.peach()).add_modifier(Modifier::BOLD);
        let text_style = Style::default().fg(theme.text());
        let lines = vec![
            Line::from(vec![
                Span::styled("Log out of ", text_style),
                Span::styled(
                    self.session.username.clone(),
                    Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
                ),
                Span::styled("?", text_style),
            ]),
            Line::default(),
            Line::from(vec![
                Span::styled(format!("[{}]", self.resolver.display_confirm(ConfirmAction::Confirm)), key_style),
                Span::styled(" yes   ", text_style),
                Span::styled(format!("[{}]", self.resolver.display_confirm(ConfirmAction::Cancel)), key_style),
                Span::styled(" no", text_style),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }

    fn loading_label(&self) -> Option<&'static str> {
        Some("Logging out...")
    }

    fn handle_key(&mut self, key: KeyEvent, modal: &mut ModalContext<'_>) -> EventResult<FormEvent> {
        if self.resolver.matches_confirm(&key, ConfirmAction::Confirm) {
            return FormEvent::Submit.into();
        }
        if self.resolver.matches_confirm(&key, ConfirmAction::Cancel) {
            modal.hide();
            return EventResult::Consumed;
        }
        EventResult::Ignored
    }

    fn on_submit(&mut self, modal: &mut ModalContext<'_>) -> Result<Option<Box<dyn Command>>> {
        modal.set_loading(true);
        Ok(Some(Box::new(LogOutCmd {
            client: Arc::clone(&self.client),
            session: self.session.clone(),
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

struct LogOutCmd {
    client: Arc<dyn ForumClient>,
    session: Session,
    tx: UnboundedSender<Outcome>,
}

#[async_trait]
impl Command for LogOutCmd {
    fn name(&self) -> String {
        format!("Logging out {}", self.session.username)
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let result = self.client.log_out(&self.session).await;
        if matches!(&result, Err(error) if error.is_unauthorized()) {
            let _ = action_tx.send(AppMessage::SessionExpired);
        }
        report(result, &self.tx, &action_tx, |()| AppMessage::SignedOut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::api::{Credentials, InMemoryForum};
    use crate::ui::modal::tests::{Recorder, env};
    use crate::ui::{Component, Modal, ModalBase, ModalOutput};

    async fn signed_in(forum: &InMemoryForum) -> Session {
        forum
            .log_in(Credentials {
                identification: "admin".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap()
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_cancel_hides_without_request() {
        let forum = Arc::new(InMemoryForum::seeded(Duration::ZERO));
        let session = signed_in(&forum).await;
        let recorder = Arc::new(Recorder::default());
        let mut modal = ModalBase::new(
            LogoutDialog::new(forum, session, Arc::new(KeyResolver::default())),
            env(&recorder),
        );

        let result = modal.handle_key(key('n')).unwrap();
        assert!(matches!(result, EventResult::Consumed));
        assert_eq!(recorder.closes.get(), 1);
        assert!(!modal.loading());
    }

    #[tokio::test]
    async fn test_confirm_logs_out() {
        let forum = Arc::new(InMemoryForum::seeded(Duration::ZERO));
        let session = signed_in(&forum).await;
        let recorder = Arc::new(Recorder::default());
        let mut modal = ModalBase::new(
            LogoutDialog::new(forum, session, Arc::new(KeyResolver::default())),
            env(&recorder),
        );

        let Ok(EventResult::Event(ModalOutput::Run(command))) = modal.handle_key(key('y')) else {
            panic!("confirm did not produce a command");
        };
        assert!(modal.loading());

        let (action_tx, mut action_rx) = mpsc::unbounded_channel();
        command.execute(action_tx).await.unwrap();
        modal.update().unwrap();

        assert_eq!(recorder.closes.get(), 1);
        assert!(matches!(action_rx.try_recv(), Ok(AppMessage::SignedOut)));
    }

    #[tokio::test]
    async fn test_expired_session_shows_alert() {
        let forum = Arc::new(InMemoryForum::seeded(Duration::ZERO));
        let session = signed_in(&forum).await;
        forum.log_out(&session).await.unwrap();

        let recorder = Arc::new(Recorder::default());
        let mut modal = ModalBase::new(
            LogoutDialog::new(forum, session, Arc::new(KeyResolver::default())),
            env(&recorder),
        );
        let command = modal.submit().unwrap().unwrap();
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();
        command.execute(action_tx).await.unwrap();
        modal.update().unwrap();

        assert!(matches!(action_rx.try_recv(), Ok(AppMessage::SessionExpired)));
        assert_eq!(recorder.closes.get(), 0);
        assert_eq!(modal.alert().unwrap().plain_message(), "Your session has expired.");
        assert_eq!(modal.form().focused_name(), None);
    }
}
