use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl Severity {
    const fn color(self, theme: &Theme) -> Color {
        match self {
            Self::Info => theme.blue,
            Self::Warning => theme.yellow,
            Self::Error => theme.red,
        }
    }

    const fn icon(self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Warning => "!",
            Self::Error => "✗",
        }
    }
}

/// Output of a dismissible [`AlertBox`].
pub enum AlertEvent {
    Dismissed,
}

/// A status message box.
///
/// The message keeps its lines in order, so a list of fragments renders as
/// one fragment per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertBox {
    severity: Severity,
    message: Text<'static>,
    dismissible: bool,
}

impl AlertBox {
    pub fn new(severity: Severity, message: impl Into<Text<'static>>) -> Self {
        Self {
            severity,
            message: message.into(),
            dismissible: true,
        }
    }

    pub fn warning(message: impl Into<Text<'static>>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<Text<'static>>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Build an alert with one line per fragment, in order.
    pub fn from_lines<I, S>(severity: Severity, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<Line<'static>> = fragments
            .into_iter()
            .map(|fragment| Line::from(fragment.into()))
            .collect();
        Self::new(severity, Text::from(lines))
    }

    #[must_use]
    pub const fn with_dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = dismissible;
        self
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub const fn message(&self) -> &Text<'static> {
        &self.message
    }

    #[must_use]
    pub const fn is_dismissible(&self) -> bool {
        self.dismissible
    }

    /// The message as plain text, lines joined with `\n`.
    #[must_use]
    pub fn plain_message(&self) -> String {
        self.message
            .lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rows needed to show the whole message at the given width.
    #[must_use]
    pub fn height(&self, width: u16) -> u16 {
        // Left border and icon column take three cells.
        let usable = usize::from(width.saturating_sub(3)).max(1);
        let rows: usize = self
            .message
            .lines
            .iter()
            .map(|line| line.width().max(1).div_ceil(usable))
            .sum();
        u16::try_from(rows.max(1)).unwrap_or(u16::MAX)
    }
}

impl Component for AlertBox {
    type Output = AlertEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.dismissible && key.code == KeyCode::Char('x') {
            return Ok(AlertEvent::Dismissed.into());
        }
        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let accent = self.severity.color(theme);

        let icon = Span::styled(
            self.severity.icon(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        );

        let block = Block::default()
            .borders(Borders::LEFT)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(theme.surface0()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [icon_area, text_area] = Layout::horizontal([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);

        frame.render_widget(Paragraph::new(Line::from(icon)), icon_area);
        frame.render_widget(
            Paragraph::new(self.message.clone())
                .style(Style::default().fg(theme.text()))
                .wrap(Wrap { trim: false }),
            text_area,
        );

        if self.dismissible {
            let hint_area = Rect { height: 1.min(text_area.height), ..text_area };
            frame.render_widget(
                Paragraph::new("[x]")
                    .style(Style::default().fg(theme.overlay1()))
                    .alignment(Alignment::Right),
                hint_area,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_alerts_are_dismissible_by_default() {
        assert!(AlertBox::warning("hello").is_dismissible());
        assert!(!AlertBox::warning("hello").with_dismissible(false).is_dismissible());
    }

    #[test]
    fn test_fragments_keep_order() {
        let alert = AlertBox::from_lines(Severity::Warning, ["first", "second", "third"]);
        assert_eq!(alert.plain_message(), "first\nsecond\nthird");
        assert_eq!(alert.message().lines.len(), 3);
    }

    #[test]
    fn test_dismiss_key_only_when_dismissible() {
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);

        let mut dismissible = AlertBox::error("boom");
        assert!(matches!(
            dismissible.handle_key(key).unwrap(),
            EventResult::Event(AlertEvent::Dismissed)
        ));

        let mut fixed = AlertBox::error("boom").with_dismissible(false);
        assert!(matches!(fixed.handle_key(key).unwrap(), EventResult::Ignored));
    }

    #[test]
    fn test_height_wraps_long_lines() {
        let alert = AlertBox::from_lines(Severity::Info, ["abcdefghij", "k"]);
        // 13 wide leaves 10 cells for text.
        assert_eq!(alert.height(13), 2);
        assert_eq!(alert.height(8), 3);
    }
}
