//! Modal dialog base.
//!
//! Every dialog in the app is a [`Dialog`] wrapped in a [`ModalBase`]. The
//! base owns the chrome (header, close control, alert row, loading overlay),
//! the loading/alert state, the mounted [`Form`], and the protocol for turning
//! API validation errors into an alert plus field focus.
//!
//! The app talks to an open modal through the object-safe [`Modal`] trait and
//! hears back through the injected [`ModalHost`] and [`RedrawScheduler`].

mod phase;
mod view;

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use throbber_widgets_tui::ThrobberState;
use tracing::debug;

use crate::Theme;
use crate::api::ErrorResponse;
use crate::commands::Command;
use crate::config::{KeyResolver, ModalAction, ModalLayoutConfig};
use crate::ui::{AlertBox, Component, EventResult, Form, LoadingOverlay, Result, Severity, TextField};

pub use phase::ModalPhase;
pub use view::ModalView;

/// Owner of the currently open modal.
pub trait ModalHost {
    /// Close the modal this host is showing.
    fn close(&self);
}

/// Something that can schedule a new frame.
pub trait RedrawScheduler {
    fn request_redraw(&self);
}

/// Collaborators handed to every modal when it is opened.
#[derive(Clone)]
pub struct ModalEnv {
    pub host: Arc<dyn ModalHost>,
    pub redraw: Arc<dyn RedrawScheduler>,
    pub resolver: Arc<KeyResolver>,
    pub layout: Arc<ModalLayoutConfig>,
}

/// Event a dialog can raise from its own key handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Submit,
}

/// Output of a modal towards the app.
pub enum ModalOutput {
    /// Spawn this command.
    Run(Box<dyn Command>),
}

/// A concrete dialog shown inside a [`ModalBase`].
pub trait Dialog {
    /// Variant identifier of the outer wrapper.
    fn class_name(&self) -> &'static str;

    /// Header content.
    fn title(&self) -> Line<'static>;

    /// Fields the modal mounts into its [`Form`] when opened.
    fn fields(&self) -> Vec<TextField> {
        Vec::new()
    }

    /// Rows the body needs.
    fn content_height(&self, form: &Form) -> u16 {
        form.height()
    }

    /// Draw the body. The default stacks the form fields.
    fn render_content(&mut self, frame: &mut Frame, area: Rect, form: &Form, theme: &Theme) {
        form.render(frame, area, theme);
    }

    /// Label shown next to the loading spinner.
    fn loading_label(&self) -> Option<&'static str> {
        None
    }

    /// Dialog-specific keys, consulted before field navigation and editing.
    fn handle_key(&mut self, key: KeyEvent, modal: &mut ModalContext<'_>) -> EventResult<FormEvent> {
        _ = (key, modal);
        EventResult::Ignored
    }

    /// Called when the form is submitted.
    ///
    /// Dialogs that talk to the API mark the modal loading here and return
    /// the command that performs the request.
    ///
    /// # Errors
    /// Returns an error if the submission could not be started.
    fn on_submit(&mut self, modal: &mut ModalContext<'_>) -> Result<Option<Box<dyn Command>>> {
        _ = modal;
        Ok(None)
    }

    /// Called once, after the modal has been rendered for the first time.
    fn on_ready(&mut self, modal: &mut ModalContext<'_>) {
        modal.focus_first_field();
    }

    /// Process completions of requests started in [`Dialog::on_submit`].
    ///
    /// # Errors
    /// Returns an error if processing a completion failed.
    fn update(&mut self, modal: &mut ModalContext<'_>) -> Result<()> {
        _ = modal;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ModalState {
    loading: bool,
    alert: Option<AlertBox>,
    phase: ModalPhase,
    form: Form,
    close_requested: bool,
}

/// Mutable view of a modal's state handed to [`Dialog`] hooks.
pub struct ModalContext<'a> {
    state: &'a mut ModalState,
    host: &'a dyn ModalHost,
    redraw: &'a dyn RedrawScheduler,
    class_name: &'static str,
}

impl ModalContext<'_> {
    #[must_use]
    pub const fn loading(&self) -> bool {
        self.state.loading
    }

    /// Mark a request as in flight (or finished). Starting one moves the
    /// modal into [`ModalPhase::Submitting`].
    pub fn set_loading(&mut self, loading: bool) {
        if self.state.loading == loading {
            return;
        }
        self.state.loading = loading;
        if loading {
            self.state.phase = self.state.phase.submit();
        }
        self.redraw.request_redraw();
    }

    #[must_use]
    pub const fn phase(&self) -> ModalPhase {
        self.state.phase
    }

    #[must_use]
    pub const fn alert(&self) -> Option<&AlertBox> {
        self.state.alert.as_ref()
    }

    /// Replace the current alert.
    pub fn set_alert(&mut self, alert: Option<AlertBox>) {
        self.state.alert = alert;
        self.redraw.request_redraw();
    }

    #[must_use]
    pub const fn form(&self) -> &Form {
        &self.state.form
    }

    pub const fn form_mut(&mut self) -> &mut Form {
        &mut self.state.form
    }

    /// Focus and select the first focusable field.
    pub fn focus_first_field(&mut self) -> bool {
        self.state.form.focus_first()
    }

    pub fn request_redraw(&self) {
        self.redraw.request_redraw();
    }

    #[must_use]
    pub const fn is_closing(&self) -> bool {
        self.state.close_requested
    }

    /// Ask the host to close this modal. Only the first call reaches the host.
    pub fn hide(&mut self) {
        if self.state.close_requested {
            debug!(modal = self.class_name, "Close already requested");
            return;
        }
        self.state.close_requested = true;
        debug!(modal = self.class_name, "Requesting close");
        self.host.close();
    }

    /// Show the errors of a failed request and focus the relevant field.
    ///
    /// With a non-empty error list the details become a single warning alert,
    /// one line each, replacing any previous alert, and the field named by the
    /// first error's path is selected. Without errors no alert is set and the
    /// first field is selected.
    pub fn handle_errors(&mut self, response: Option<&ErrorResponse>) {
        let errors = response
            .map(|response| response.errors.as_slice())
            .filter(|errors| !errors.is_empty());

        if let Some(errors) = errors {
            debug!(modal = self.class_name, count = errors.len(), "Showing validation errors");
            self.state.alert = Some(AlertBox::from_lines(
                Severity::Warning,
                errors.iter().map(|error| error.detail.as_str()),
            ));
        }
        self.state.phase = self.state.phase.fail(errors.is_some());

        self.redraw.request_redraw();

        let target = errors.and_then(<[_]>::first).map(|error| error.path.as_str());
        match target {
            Some(path) if self.state.form.focus_named(path) => {}
            Some(path) => {
                debug!(modal = self.class_name, path, "No field for error path, focusing first field");
                self.state.form.focus_first();
            }
            None => {
                self.state.form.focus_first();
            }
        }
    }
}

/// The shared modal chrome and state around a [`Dialog`].
pub struct ModalBase<D: Dialog> {
    dialog: D,
    state: ModalState,
    env: ModalEnv,
    throbber: ThrobberState,
    ready: bool,
}

impl<D: Dialog> ModalBase<D> {
    pub fn new(dialog: D, env: ModalEnv) -> Self {
        debug!(modal = dialog.class_name(), "Opening modal");
        let state = ModalState {
            form: Form::new(dialog.fields()),
            ..ModalState::default()
        };
        Self {
            dialog,
            state,
            env,
            throbber: ThrobberState::default(),
            ready: false,
        }
    }

    fn parts(&mut self) -> (&mut D, ModalContext<'_>) {
        let class_name = self.dialog.class_name();
        let context = ModalContext {
            state: &mut self.state,
            host: self.env.host.as_ref(),
            redraw: self.env.redraw.as_ref(),
            class_name,
        };
        (&mut self.dialog, context)
    }

    pub fn context(&mut self) -> ModalContext<'_> {
        self.parts().1
    }

    #[must_use]
    pub const fn dialog(&self) -> &D {
        &self.dialog
    }

    #[must_use]
    pub const fn loading(&self) -> bool {
        self.state.loading
    }

    #[must_use]
    pub const fn alert(&self) -> Option<&AlertBox> {
        self.state.alert.as_ref()
    }

    #[must_use]
    pub const fn phase(&self) -> ModalPhase {
        self.state.phase
    }

    #[must_use]
    pub const fn form(&self) -> &Form {
        &self.state.form
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.context().set_loading(loading);
    }

    pub fn hide(&mut self) {
        self.context().hide();
    }

    pub fn handle_errors(&mut self, response: Option<&ErrorResponse>) {
        self.context().handle_errors(response);
    }

    /// Submit the form. Ignored while a request is already in flight.
    ///
    /// # Errors
    /// Returns an error if the dialog failed to start the submission.
    pub fn submit(&mut self) -> Result<Option<Box<dyn Command>>> {
        if self.state.loading {
            debug!(modal = self.dialog.class_name(), "Submission already in flight");
            return Ok(None);
        }
        let (dialog, mut context) = self.parts();
        debug!(modal = context.class_name, "Submitting");
        dialog.on_submit(&mut context)
    }

    #[must_use]
    pub fn view(&self) -> ModalView {
        let mut loading = LoadingOverlay::new(self.state.loading);
        if let Some(label) = self.dialog.loading_label() {
            loading = loading.with_label(label);
        }
        ModalView {
            class_name: self.dialog.class_name(),
            title: self.dialog.title(),
            close_hint: self.env.resolver.display_modal(ModalAction::Close),
            alert: self
                .state
                .alert
                .clone()
                .map(|alert| alert.with_dismissible(false)),
            loading,
        }
    }

    fn footer(&self, theme: &Theme) -> Line<'static> {
        let key_style = Style::default().fg(theme.peach()).add_modifier(Modifier::BOLD);
        let text_style = Style::default().fg(theme.overlay1());
        let mut spans = Vec::new();
        let mut hint = |key: String, text: &'static str| {
            if !spans.is_empty() {
                spans.push(Span::styled("  ", text_style));
            }
            spans.push(Span::styled(format!("[{key}]"), key_style));
            spans.push(Span::styled(format!(" {text}"), text_style));
        };
        let resolver = &self.env.resolver;
        if !self.state.form.is_empty() {
            hint(resolver.display_modal(ModalAction::Submit), "submit");
            hint(resolver.display_modal(ModalAction::NextField), "next field");
        }
        hint(resolver.display_modal(ModalAction::Close), "close");
        Line::from(spans)
    }
}

/// Object-safe interface the app uses to drive the open modal.
pub trait Modal: Component<Output = ModalOutput> {
    fn class_name(&self) -> &'static str;

    /// Insert pasted text into the focused field.
    fn handle_paste(&mut self, text: &str);

    /// Let the dialog process finished requests.
    ///
    /// # Errors
    /// Returns an error if the dialog failed to process a completion.
    fn update(&mut self) -> Result<()>;

    /// Whether the modal is showing an animation that needs ticks.
    fn is_animating(&self) -> bool;
}

impl<D: Dialog> Component for ModalBase<D> {
    type Output = ModalOutput;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let resolver = Arc::clone(&self.env.resolver);

        if resolver.matches_modal(&key, ModalAction::Close) {
            self.hide();
            return Ok(EventResult::Consumed);
        }

        // Everything else waits for the request in flight.
        if self.state.loading || self.state.close_requested {
            return Ok(EventResult::Consumed);
        }

        let (dialog, mut context) = self.parts();
        let submit = match dialog.handle_key(key, &mut context) {
            EventResult::Event(FormEvent::Submit) => true,
            EventResult::Consumed => return Ok(EventResult::Consumed),
            EventResult::Ignored => resolver.matches_modal(&key, ModalAction::Submit),
        };

        if submit {
            return Ok(self
                .submit()?
                .map_or(EventResult::Consumed, |command| ModalOutput::Run(command).into()));
        }

        if resolver.matches_modal(&key, ModalAction::NextField) {
            self.state.form.focus_next();
        } else if resolver.matches_modal(&key, ModalAction::PrevField) {
            self.state.form.focus_prev();
        } else {
            self.state.form.handle_key(key);
        }

        // Modals capture all input.
        Ok(EventResult::Consumed)
    }

    fn handle_tick(&mut self) {
        if self.state.loading {
            self.throbber.calc_next();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let view = self.view();

        let width_percent = u32::from(self.env.layout.width_for(view.class_name));
        let popup_width = u16::try_from(u32::from(area.width) * width_percent / 100).unwrap_or(area.width);
        // Borders and horizontal padding.
        let body_width = popup_width.saturating_sub(4);

        let alert_height = view.alert.as_ref().map_or(0, |alert| alert.height(body_width) + 1);
        let content_height = self.dialog.content_height(&self.state.form);
        let height = (2 + alert_height + content_height + 2).min(area.height);

        let popup_area = area.centered(Constraint::Length(popup_width), Constraint::Length(height));
        frame.render_widget(Clear, popup_area);

        let title_style = Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD);
        let mut title = vec![Span::raw(" ")];
        title.extend(view.title.spans.iter().cloned());
        title.push(Span::raw(" "));

        let block = Block::default()
            .title(Line::from(title).style(title_style))
            .title_top(
                Line::from(Span::styled(
                    format!(" [{}] ✕ ", view.close_hint),
                    Style::default().fg(theme.overlay1()),
                ))
                .right_aligned(),
            )
            .borders(Borders::ALL)
            .border_type(theme.border_type())
            .border_style(Style::default().fg(theme.lavender()))
            .padding(Padding::horizontal(1))
            .style(Style::default().bg(theme.base()));

        let body = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let [alert_area, content_area, footer_area] = Layout::vertical([
            Constraint::Length(alert_height),
            Constraint::Fill(1),
            Constraint::Length(2),
        ])
        .areas(body);

        if let Some(mut alert) = view.alert {
            let row = Rect {
                height: alert_area.height.saturating_sub(1),
                ..alert_area
            };
            alert.render(frame, row, theme);
        }

        self.dialog
            .render_content(frame, content_area, &self.state.form, theme);

        let hint_area = Rect {
            y: footer_area.bottom().saturating_sub(1),
            height: footer_area.height.min(1),
            ..footer_area
        };
        frame.render_widget(Paragraph::new(self.footer(theme)), hint_area);

        frame.render_stateful_widget(view.loading.with_theme(*theme), body, &mut self.throbber);

        if !self.ready {
            self.ready = true;
            let (dialog, mut context) = self.parts();
            dialog.on_ready(&mut context);
            context.request_redraw();
        }
    }
}

impl<D: Dialog> Modal for ModalBase<D> {
    fn class_name(&self) -> &'static str {
        self.dialog.class_name()
    }

    fn handle_paste(&mut self, text: &str) {
        if !self.state.loading {
            self.state.form.paste(text);
        }
    }

    fn update(&mut self) -> Result<()> {
        let (dialog, mut context) = self.parts();
        dialog.update(&mut context)
    }

    fn is_animating(&self) -> bool {
        self.state.loading
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;

    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    use super::*;
    use crate::api::ErrorDetail;

    /// Host and scheduler that count what they were asked to do.
    #[derive(Default)]
    pub struct Recorder {
        pub closes: Cell<usize>,
        pub redraws: Cell<usize>,
    }

    impl ModalHost for Recorder {
        fn close(&self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    impl RedrawScheduler for Recorder {
        fn request_redraw(&self) {
            self.redraws.set(self.redraws.get() + 1);
        }
    }

    pub fn env(recorder: &Arc<Recorder>) -> ModalEnv {
        ModalEnv {
            host: Arc::clone(recorder) as Arc<dyn ModalHost>,
            redraw: Arc::clone(recorder) as Arc<dyn RedrawScheduler>,
            resolver: Arc::new(KeyResolver::default()),
            layout: Arc::new(ModalLayoutConfig::default()),
        }
    }

    #[derive(Default)]
    struct ProfileDialog {
        submits: usize,
    }

    impl Dialog for ProfileDialog {
        fn class_name(&self) -> &'static str {
            "ProfileModal"
        }

        fn title(&self) -> Line<'static> {
            Line::from("Edit Profile")
        }

        fn fields(&self) -> Vec<TextField> {
            vec![
                TextField::new("username", "Username").with_value("toby"),
                TextField::new("email", "Email"),
                TextField::new("bio", "Bio"),
            ]
        }

        fn on_submit(&mut self, modal: &mut ModalContext<'_>) -> Result<Option<Box<dyn Command>>> {
            self.submits += 1;
            modal.set_loading(true);
            Ok(None)
        }
    }

    /// Dialog relying on every default hook.
    struct NoticeDialog;

    impl Dialog for NoticeDialog {
        fn class_name(&self) -> &'static str {
            "NoticeModal"
        }

        fn title(&self) -> Line<'static> {
            Line::from("Notice")
        }
    }

    fn modal() -> (ModalBase<ProfileDialog>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        (ModalBase::new(ProfileDialog::default(), env(&recorder)), recorder)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn errors(list: &[(&str, &str)]) -> ErrorResponse {
        ErrorResponse::new(
            list.iter()
                .map(|(detail, path)| ErrorDetail::new(*detail, *path))
                .collect(),
        )
    }

    fn draw<M: Modal>(modal: &mut M) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| {
                let area = frame.area();
                modal.render(frame, area, &theme);
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn screen(buffer: &Buffer) -> String {
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_single_error_sets_alert_and_focuses_path() {
        let (mut modal, _) = modal();
        modal.handle_errors(Some(&errors(&[("required", "email")])));

        let alert = modal.alert().unwrap();
        assert_eq!(alert.severity(), Severity::Warning);
        assert!(alert.plain_message().contains("required"));
        assert_eq!(modal.form().focused_name(), Some("email"));
    }

    #[test]
    fn test_multiple_errors_keep_order_and_focus_first_path() {
        let (mut modal, _) = modal();
        modal.handle_errors(Some(&errors(&[("a", "bio"), ("b", "email")])));

        assert_eq!(modal.alert().unwrap().plain_message(), "a\nb");
        assert_eq!(modal.form().focused_name(), Some("bio"));
    }

    #[test]
    fn test_missing_or_empty_errors_focus_first_field() {
        for response in [None, Some(ErrorResponse::default())] {
            let (mut modal, recorder) = modal();
            modal.handle_errors(response.as_ref());

            assert_eq!(modal.alert(), None);
            assert_eq!(modal.form().focused_name(), Some("username"));
            assert!(modal.form().focused().unwrap().is_selected());
            assert_eq!(recorder.redraws.get(), 1);
        }
    }

    #[test]
    fn test_malformed_body_degrades_to_no_errors() {
        let (mut modal, _) = modal();
        let body = serde_json::json!({"errors": "not a list"});
        modal.handle_errors(ErrorResponse::from_value(&body).as_ref());

        assert_eq!(modal.alert(), None);
        assert_eq!(modal.form().focused_name(), Some("username"));
    }

    #[test]
    fn test_unknown_path_falls_back_to_first_field() {
        let (mut modal, _) = modal();
        modal.handle_errors(Some(&errors(&[("taken", "avatar")])));

        assert!(modal.alert().is_some());
        assert_eq!(modal.form().focused_name(), Some("username"));
    }

    #[test]
    fn test_new_errors_replace_previous_alert() {
        let (mut modal, _) = modal();
        modal.handle_errors(Some(&errors(&[("first", "email")])));
        modal.handle_errors(Some(&errors(&[("second", "bio")])));

        assert_eq!(modal.alert().unwrap().plain_message(), "second");

        let screen = screen(&draw(&mut modal));
        assert!(screen.contains("second"));
        assert!(!screen.contains("first"));
    }

    #[test]
    fn test_no_errors_keeps_existing_alert() {
        let (mut modal, _) = modal();
        modal.handle_errors(Some(&errors(&[("required", "email")])));
        modal.handle_errors(None);

        assert_eq!(modal.alert().unwrap().plain_message(), "required");
    }

    #[test]
    fn test_handle_errors_requests_redraw() {
        let (mut modal, recorder) = modal();
        modal.handle_errors(Some(&errors(&[("required", "email")])));
        assert_eq!(recorder.redraws.get(), 1);
    }

    #[test]
    fn test_alert_row_is_never_dismissible() {
        let (mut modal, _) = modal();
        modal
            .context()
            .set_alert(Some(AlertBox::error("session expired").with_dismissible(true)));

        assert!(modal.alert().unwrap().is_dismissible());
        let view = modal.view();
        assert!(view.has_alert_row());
        assert!(!view.alert.unwrap().is_dismissible());

        let screen = screen(&draw(&mut modal));
        assert!(screen.contains("session expired"));
        assert!(!screen.contains("[x]"));
    }

    #[test]
    fn test_alert_row_only_with_alert() {
        let (mut modal, _) = modal();
        assert!(!modal.view().has_alert_row());
        modal.handle_errors(None);
        assert!(!modal.view().has_alert_row());
    }

    #[test]
    fn test_loading_twice_renders_like_once() {
        let (mut once, _) = modal();
        once.set_loading(true);

        let (mut twice, recorder) = modal();
        twice.set_loading(true);
        twice.set_loading(true);

        assert_eq!(once.view(), twice.view());
        assert!(twice.view().loading.is_visible());
        assert_eq!(recorder.redraws.get(), 1);
        assert_eq!(draw(&mut once), draw(&mut twice));
    }

    #[test]
    fn test_hide_closes_exactly_once() {
        let (mut modal, recorder) = modal();
        modal.hide();
        modal.hide();
        modal.handle_key(key(KeyCode::Esc)).unwrap();

        assert_eq!(recorder.closes.get(), 1);
        assert!(modal.context().is_closing());
    }

    #[test]
    fn test_close_key_works_while_loading() {
        let (mut modal, recorder) = modal();
        modal.set_loading(true);
        modal.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(recorder.closes.get(), 1);
    }

    #[test]
    fn test_submit_cycle() {
        let (mut modal, _) = modal();
        assert_eq!(modal.phase(), ModalPhase::Idle);

        let result = modal.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(result.is_consumed());
        assert_eq!(modal.dialog().submits, 1);
        assert_eq!(modal.phase(), ModalPhase::Submitting);
        assert!(modal.loading());

        // Ignored while the request is in flight.
        modal.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(modal.dialog().submits, 1);

        modal.set_loading(false);
        modal.handle_errors(Some(&errors(&[("required", "email")])));
        assert_eq!(modal.phase(), ModalPhase::Error);

        modal.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(modal.dialog().submits, 2);
        assert_eq!(modal.phase(), ModalPhase::Submitting);
    }

    #[test]
    fn test_default_submit_is_a_consumed_no_op() {
        let recorder = Arc::new(Recorder::default());
        let mut modal = ModalBase::new(NoticeDialog, env(&recorder));

        let result = modal.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(result, EventResult::Consumed));
        assert_eq!(modal.phase(), ModalPhase::Idle);
        assert!(!modal.loading());
    }

    #[test]
    fn test_on_ready_runs_once_after_first_render() {
        let (mut modal, recorder) = modal();
        assert!(!modal.is_ready());
        assert_eq!(modal.form().focused_name(), None);

        draw(&mut modal);
        assert!(modal.is_ready());
        assert_eq!(modal.form().focused_name(), Some("username"));
        assert!(modal.form().focused().unwrap().is_selected());
        assert_eq!(recorder.redraws.get(), 1);

        modal.handle_key(key(KeyCode::Tab)).unwrap();
        draw(&mut modal);
        assert_eq!(modal.form().focused_name(), Some("email"));
        assert_eq!(recorder.redraws.get(), 1);
    }

    #[test]
    fn test_keys_edit_and_navigate_fields() {
        let (mut modal, _) = modal();
        draw(&mut modal);

        // The selected value is replaced by typing.
        for c in "ann".chars() {
            modal.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        modal.handle_key(key(KeyCode::Tab)).unwrap();
        modal.handle_key(key(KeyCode::Char('a'))).unwrap();
        modal
            .handle_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT))
            .unwrap();

        assert_eq!(modal.form().value("username"), "ann");
        assert_eq!(modal.form().value("email"), "a");
        assert_eq!(modal.form().focused_name(), Some("username"));
    }

    #[test]
    fn test_fields_are_locked_while_loading() {
        let (mut modal, _) = modal();
        draw(&mut modal);
        modal.set_loading(true);
        modal.handle_key(key(KeyCode::Char('z'))).unwrap();
        modal.handle_paste("zzz");
        assert_eq!(modal.form().value("username"), "toby");
    }

    #[test]
    fn test_render_shows_chrome() {
        let (mut modal, _) = modal();
        modal.handle_errors(Some(&errors(&[("Email is required", "email")])));
        let screen = screen(&draw(&mut modal));

        assert!(screen.contains("Edit Profile"));
        assert!(screen.contains("[Esc] ✕"));
        assert!(screen.contains("Email is required"));
        assert!(screen.contains("Username"));
        assert!(screen.contains("[Enter] submit"));

        let title_row = screen.lines().position(|l| l.contains("Edit Profile")).unwrap();
        let alert_row = screen.lines().position(|l| l.contains("Email is required")).unwrap();
        let field_row = screen.lines().position(|l| l.contains("Username")).unwrap();
        assert!(title_row < alert_row && alert_row < field_row);
    }
}
