use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Clear, StatefulWidget, Widget};
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState};

use crate::Theme;

/// Spinner covering an area while a request is in flight.
///
/// Visibility is a pure function of the `active` flag it is built from. The
/// animation frame lives in a [`ThrobberState`] owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingOverlay {
    active: bool,
    label: Option<&'static str>,
    theme: Option<Theme>,
}

impl LoadingOverlay {
    #[must_use]
    pub const fn new(active: bool) -> Self {
        Self {
            active,
            label: None,
            theme: None,
        }
    }

    #[must_use]
    pub const fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    #[must_use]
    pub const fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.active
    }
}

impl StatefulWidget for LoadingOverlay {
    type State = ThrobberState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if !self.active || area.is_empty() {
            return;
        }

        let theme = self.theme.unwrap_or_default();

        Clear.render(area, buf);
        Block::default()
            .style(Style::default().bg(theme.base()))
            .render(area, buf);

        let mut throbber = Throbber::default()
            .throbber_set(BRAILLE_SIX)
            .use_type(Spin)
            .throbber_style(Style::default().fg(theme.lavender()))
            .style(Style::default().fg(theme.subtext1()));

        // The throbber itself uses 1-character width
        let mut width = 1u16;

        if let Some(label) = self.label {
            throbber = throbber.label(label);
            width += u16::try_from(label.chars().count()).unwrap_or(u16::MAX).saturating_add(1);
        }

        let spinner_area = area.centered(Constraint::Length(width.min(area.width)), Constraint::Length(1));
        StatefulWidget::render(throbber, spinner_area, buf, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(overlay: LoadingOverlay) -> Buffer {
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::filled(area, ratatui::buffer::Cell::new("#"));
        let mut state = ThrobberState::default();
        StatefulWidget::render(overlay, area, &mut buf, &mut state);
        buf
    }

    #[test]
    fn test_inactive_overlay_draws_nothing() {
        let buf = render(LoadingOverlay::new(false).with_label("Working"));
        assert!(buf.content().iter().all(|cell| cell.symbol() == "#"));
    }

    #[test]
    fn test_active_overlay_covers_area() {
        let buf = render(LoadingOverlay::new(true).with_label("Working"));
        assert!(buf.content().iter().all(|cell| cell.symbol() != "#"));
        let middle: String = (0..20).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(middle.contains("Working"));
    }
}
