//! Application shell.
//!
//! The [`App`] owns the event loop, the home screen, the toast stack and the
//! single modal slot. Everything outside the UI task talks to it through
//! [`AppMessage`]s.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::api::{ForumClient, Session};
use crate::cli::Args;
use crate::commands::Command;
use crate::config::{AppConfig, GlobalAction, KeyResolver, ModalLayoutConfig};
use crate::dialogs::{DialogKind, LogoutDialog};
use crate::tui::{Event, Tui};
use crate::ui::{
    AlertBox, AlertEvent, Component, EventResult, Modal, ModalBase, ModalEnv, ModalHost, ModalOutput, RedrawScheduler, Result, Toast,
    ToastManager, ToastType,
};

/// Ticks per second; drives spinners and toast expiry.
const TICK_RATE: f64 = 8.0;

/// Application-level messages.
#[derive(Debug, Clone)]
pub enum AppMessage {
    // === Lifecycle ===
    /// Redraw on the next loop iteration
    Render,

    // === Modals ===
    /// Open a dialog
    OpenDialog(DialogKind),
    /// Close the modal opened as `id`
    CloseModal { id: u64 },

    // === Session ===
    SignedIn(Session),
    SignedOut,
    /// The forum no longer accepts the current session
    SessionExpired,

    // === Feedback ===
    /// Show a toast notification
    ShowToast { message: String, toast_type: ToastType },
    /// A spawned command finished
    CommandCompleted { name: String, success: bool },
}

/// Cheap handle modals use to reach the app.
///
/// Close requests carry the id of the modal the handle was made for, so a
/// late request cannot close a modal that replaced it.
#[derive(Debug, Clone)]
pub struct AppHandle {
    tx: UnboundedSender<AppMessage>,
    modal_id: u64,
}

impl AppHandle {
    #[must_use]
    pub const fn new(tx: UnboundedSender<AppMessage>) -> Self {
        Self { tx, modal_id: 0 }
    }

    #[must_use]
    pub const fn for_modal(mut self, id: u64) -> Self {
        self.modal_id = id;
        self
    }

    fn send(&self, message: AppMessage) {
        if self.tx.send(message).is_err() {
            warn!("App message channel closed");
        }
    }
}

impl ModalHost for AppHandle {
    fn close(&self) {
        self.send(AppMessage::CloseModal { id: self.modal_id });
    }
}

impl RedrawScheduler for AppHandle {
    fn request_redraw(&self) {
        self.send(AppMessage::Render);
    }
}

/// One wake-up of the event loop.
enum Step {
    Event(Option<Event>),
    Message(Option<AppMessage>),
}

pub struct App {
    theme: Theme,
    resolver: Arc<KeyResolver>,
    layout: Arc<ModalLayoutConfig>,
    client: Arc<dyn ForumClient>,
    session: Option<Session>,
    modal: Option<Box<dyn Modal>>,
    modal_id: u64,
    /// Dismissible alert on the home screen.
    notice: Option<AlertBox>,
    toasts: ToastManager,
    dirty: bool,
    should_quit: bool,
    should_suspend: bool,
    action_tx: UnboundedSender<AppMessage>,
    action_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(config: &AppConfig, resolver: Arc<KeyResolver>, theme: Theme, client: Arc<dyn ForumClient>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            theme,
            resolver,
            layout: Arc::new(config.modal.clone()),
            client,
            session: None,
            modal: None,
            modal_id: 0,
            notice: None,
            toasts: ToastManager::new(),
            dirty: true,
            should_quit: false,
            should_suspend: false,
            action_tx,
            action_rx,
        }
    }

    /// Apply startup options from the command line.
    pub fn apply_cli_args(&self, args: &Args) {
        if let Some(kind) = args.dialog {
            info!(dialog = %kind, "Opening dialog from command line");
            self.send(AppMessage::OpenDialog(kind));
        }
    }

    /// Run the event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be driven.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(TICK_RATE)?;
        tui.enter()?;

        loop {
            let step = tokio::select! {
                event = tui.next_event() => Step::Event(event),
                message = self.action_rx.recv() => Step::Message(message),
            };
            match step {
                Step::Event(Some(event)) => self.handle_event(event),
                Step::Message(Some(message)) => self.handle_message(message),
                Step::Event(None) | Step::Message(None) => self.should_quit = true,
            }
            self.drain_messages();
            self.update_modal();

            if self.should_suspend {
                self.should_suspend = false;
                tui.suspend()?;
                tui.resume()?;
                self.dirty = true;
            }
            if self.should_quit {
                break;
            }
            if self.dirty {
                self.dirty = false;
                tui.draw(|frame| self.render(frame))?;
            }
        }

        tui.exit()?;
        Ok(())
    }

    fn handle(&self) -> AppHandle {
        AppHandle::new(self.action_tx.clone())
    }

    fn send(&self, message: AppMessage) {
        self.handle().send(message);
    }

    /// Environment for the next modal to open.
    fn next_modal_env(&mut self) -> ModalEnv {
        self.modal_id += 1;
        let handle = Arc::new(self.handle().for_modal(self.modal_id));
        ModalEnv {
            host: Arc::clone(&handle) as Arc<dyn ModalHost>,
            redraw: handle,
            resolver: Arc::clone(&self.resolver),
            layout: Arc::clone(&self.layout),
        }
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.action_rx.try_recv() {
            self.handle_message(message);
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Init | Event::FocusGained | Event::Resize(..) => self.dirty = true,
            Event::FocusLost => {}
            Event::Quit => self.should_quit = true,
            Event::Suspend => self.should_suspend = true,
            Event::Tick => self.handle_tick(),
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.handle_paste(&text);
                    self.dirty = true;
                }
            }
            Event::Error(e) => {
                error!(error = %e, "Terminal event error");
                self.toasts.show(Toast::error(e));
                self.dirty = true;
            }
        }
    }

    fn handle_tick(&mut self) {
        let toasts = self.toasts.len();
        self.toasts.handle_tick();
        if toasts != self.toasts.len() {
            self.dirty = true;
        }
        if let Some(modal) = self.modal.as_mut() {
            modal.handle_tick();
            if modal.is_animating() {
                self.dirty = true;
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.dirty = true;

        // An open modal captures all input.
        if let Some(modal) = self.modal.as_mut() {
            match modal.handle_key(key) {
                Ok(EventResult::Event(ModalOutput::Run(command))) => self.spawn(command),
                Ok(_) => {}
                Err(e) => self.report_error("Dialog failed to handle key", &e),
            }
            return;
        }

        if let Some(notice) = self.notice.as_mut() {
            match notice.handle_key(key) {
                Ok(EventResult::Event(AlertEvent::Dismissed)) => {
                    self.notice = None;
                    return;
                }
                Ok(_) => {}
                Err(e) => self.report_error("Notice failed to handle key", &e),
            }
        }

        let resolver = Arc::clone(&self.resolver);
        if resolver.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
        } else if resolver.matches_global(&key, GlobalAction::LogIn) {
            self.open_account_dialog(DialogKind::Login);
        } else if resolver.matches_global(&key, GlobalAction::SignUp) {
            self.open_account_dialog(DialogKind::Signup);
        } else if resolver.matches_global(&key, GlobalAction::LogOut) {
            match self.session.clone() {
                Some(session) => {
                    let dialog = LogoutDialog::new(Arc::clone(&self.client), session, Arc::clone(&self.resolver));
                    let env = self.next_modal_env();
                    self.open_modal(Box::new(ModalBase::new(dialog, env)));
                }
                None => self.toasts.show(Toast::info("You are not logged in")),
            }
        }
    }

    fn open_account_dialog(&mut self, kind: DialogKind) {
        if let Some(session) = &self.session {
            self.toasts
                .show(Toast::info(format!("Already logged in as {}", session.username)));
            return;
        }
        let env = self.next_modal_env();
        let modal = kind.open(Arc::clone(&self.client), env);
        self.open_modal(modal);
    }

    fn open_modal(&mut self, modal: Box<dyn Modal>) {
        if let Some(previous) = self.modal.replace(modal) {
            debug!(modal = previous.class_name(), "Replacing open modal");
        }
        self.dirty = true;
    }

    fn handle_message(&mut self, message: AppMessage) {
        if !matches!(message, AppMessage::Render) {
            debug!(?message, "Handling message");
        }

        match message {
            AppMessage::Render => self.dirty = true,
            AppMessage::OpenDialog(kind) => self.open_account_dialog(kind),
            AppMessage::CloseModal { id } => {
                if id != self.modal_id {
                    debug!(id, current = self.modal_id, "Ignoring close for a replaced modal");
                } else if let Some(modal) = self.modal.take() {
                    debug!(modal = modal.class_name(), "Closed modal");
                    self.dirty = true;
                }
            }
            AppMessage::SignedIn(session) => {
                self.toasts
                    .show(Toast::success(format!("Logged in as {}", session.username)));
                self.session = Some(session);
                self.notice = None;
                self.dirty = true;
            }
            AppMessage::SignedOut => {
                self.session = None;
                self.toasts.show(Toast::info("Logged out"));
                self.dirty = true;
            }
            AppMessage::SessionExpired => {
                if let Some(session) = self.session.take() {
                    info!(user = %session.username, "Session expired");
                }
                self.notice = Some(AlertBox::warning(
                    "Your session has expired. Log in again to continue.",
                ));
                self.dirty = true;
            }
            AppMessage::ShowToast { message, toast_type } => {
                self.toasts.show(Toast::new(message, toast_type));
                self.dirty = true;
            }
            AppMessage::CommandCompleted { name, success } => {
                debug!(command = %name, success, "Command completed");
            }
        }
    }

    fn update_modal(&mut self) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        if let Err(e) = modal.update() {
            self.report_error("Dialog failed to process a response", &e);
        }
    }

    fn report_error(&mut self, context: &str, e: &color_eyre::Report) {
        error!(error = ?e, "{context}");
        self.toasts.show(Toast::error(format!("{context}: {e}")));
        self.dirty = true;
    }

    fn spawn(&self, command: Box<dyn Command>) {
        let name = command.name();
        let action_tx = self.action_tx.clone();
        debug!(command = %name, "Spawning command");
        tokio::spawn(async move {
            let result = command.execute(action_tx.clone()).await;
            if let Err(e) = &result {
                error!(command = %name, error = ?e, "Command failed");
                let _ = action_tx.send(AppMessage::ShowToast {
                    message: format!("{name} failed: {e}"),
                    toast_type: ToastType::Error,
                });
            }
            let _ = action_tx.send(AppMessage::CommandCompleted {
                name,
                success: result.is_ok(),
            });
        });
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(self.theme.base())), area);

        let card = home_card(area);
        self.render_home(frame, card);
        if let Some(notice) = self.notice.as_mut() {
            let below = Rect {
                y: card.bottom(),
                height: notice.height(card.width),
                ..card
            };
            notice.render(frame, below.intersection(area), &self.theme);
        }

        if let Some(modal) = self.modal.as_mut() {
            modal.render(frame, area, &self.theme);
        }
        self.toasts.render(frame, area, &self.theme);
    }

    fn render_home(&self, frame: &mut Frame, card: Rect) {
        let theme = &self.theme;
        let key_style = Style::default().fg(theme.peach()).add_modifier(Modifier::BOLD);
        let text_style = Style::default().fg(theme.subtext1());

        let status = match &self.session {
            Some(session) => Line::from(vec![
                Span::styled("Logged in as ", text_style),
                Span::styled(
                    session.username.clone(),
                    Style::default().fg(theme.green()).add_modifier(Modifier::BOLD),
                ),
            ]),
            None => Line::styled("Not logged in", Style::default().fg(theme.overlay1())),
        };

        let hint = |action: GlobalAction, text: &'static str| {
            [
                Span::styled(format!("[{}]", self.resolver.display_global(action)), key_style),
                Span::styled(format!(" {text}  "), text_style),
            ]
        };
        let actions: &[(GlobalAction, &'static str)] = if self.session.is_some() {
            &[(GlobalAction::LogOut, "log out"), (GlobalAction::Quit, "quit")]
        } else {
            &[
                (GlobalAction::LogIn, "log in"),
                (GlobalAction::SignUp, "sign up"),
                (GlobalAction::Quit, "quit"),
            ]
        };
        let hints: Line = actions
            .iter()
            .flat_map(|(action, text)| hint(*action, text))
            .collect();

        let block = Block::default()
            .title(Line::styled(
                " lazyforum ",
                Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(theme.border_type())
            .border_style(Style::default().fg(theme.overlay0()));

        frame.render_widget(
            Paragraph::new(vec![Line::default(), status, Line::default(), hints])
                .alignment(Alignment::Center)
                .block(block),
            card,
        );
    }
}

/// The home screen card, centered in the terminal.
fn home_card(area: Rect) -> Rect {
    area.centered(Constraint::Length(48.min(area.width)), Constraint::Length(6.min(area.height)))
}
