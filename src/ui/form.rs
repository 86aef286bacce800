//! Mounted form fields and focus handling.
//!
//! A [`Form`] is the handle modals use to find "the first focusable field"
//! and "the field named `path`" and to move focus there.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Theme;

/// Rows one field occupies: top border with label, value, bottom border.
const FIELD_HEIGHT: u16 = 3;

/// A single-line named text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    name: String,
    label: String,
    value: String,
    /// Cursor position in characters.
    cursor: usize,
    placeholder: Option<String>,
    masked: bool,
    disabled: bool,
    /// The whole value is selected; the next edit replaces it.
    selected: bool,
}

impl TextField {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            masked: false,
            disabled: false,
            selected: false,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub const fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
        self.selected = false;
    }

    #[must_use]
    pub const fn is_focusable(&self) -> bool {
        !self.disabled
    }

    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Select the whole value and put the cursor at the end.
    pub fn select(&mut self) {
        self.cursor = self.value.chars().count();
        self.selected = !self.value.is_empty();
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn take_selection(&mut self) -> bool {
        if self.selected {
            self.selected = false;
            self.value.clear();
            self.cursor = 0;
            return true;
        }
        false
    }

    fn insert_char(&mut self, c: char) {
        self.take_selection();
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
        }
    }

    fn delete_char_before_cursor(&mut self) {
        if self.take_selection() || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    fn delete_char_at_cursor(&mut self) {
        if self.take_selection() || self.cursor >= self.value.chars().count() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    fn delete_word_before_cursor(&mut self) {
        if self.take_selection() {
            return;
        }
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        let (start, end) = (self.byte_index(pos), self.byte_index(self.cursor));
        self.value.drain(start..end);
        self.cursor = pos;
    }

    /// Apply an editing key. Returns true if the key changed or moved anything.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.disabled {
            return false;
        }

        let len = self.value.chars().count();
        match (key.code, key.modifiers) {
            (KeyCode::Backspace, KeyModifiers::ALT) => self.delete_word_before_cursor(),
            (KeyCode::Backspace, _) => self.delete_char_before_cursor(),
            (KeyCode::Delete, _) => self.delete_char_at_cursor(),
            (KeyCode::Left, _) => {
                self.selected = false;
                self.cursor = self.cursor.saturating_sub(1);
            }
            (KeyCode::Right, _) => {
                self.selected = false;
                self.cursor = (self.cursor + 1).min(len);
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.selected = false;
                self.cursor = 0;
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.selected = false;
                self.cursor = len;
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.value.clear();
                self.cursor = 0;
                self.selected = false;
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => self.insert_char(c),
            _ => return false,
        }
        true
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let border_color = if focused { theme.lavender() } else { theme.overlay0() };
        let label_style = if focused {
            Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.subtext1())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", self.label), label_style))
            .borders(Borders::ALL)
            .border_type(theme.border_type())
            .border_style(Style::default().fg(border_color));

        let display: Vec<char> = if self.masked {
            std::iter::repeat_n('*', self.value.chars().count()).collect()
        } else {
            self.value.chars().collect()
        };

        let input_style = if self.disabled {
            Style::default().fg(theme.overlay0())
        } else if self.selected {
            Style::default().fg(theme.base()).bg(theme.overlay1())
        } else {
            Style::default().fg(theme.text())
        };
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);

        let line = match (&self.placeholder, display.is_empty(), focused) {
            (Some(placeholder), true, _) => Line::from(vec![
                Span::styled(if focused { " " } else { "" }, cursor_style),
                Span::styled(placeholder.clone(), Style::default().fg(theme.overlay0())),
            ]),
            (_, _, true) => {
                let before: String = display[..self.cursor.min(display.len())].iter().collect();
                let at = display.get(self.cursor).copied().unwrap_or(' ');
                let after: String = display.iter().skip(self.cursor + 1).collect();
                Line::from(vec![
                    Span::styled(before, input_style),
                    Span::styled(at.to_string(), cursor_style),
                    Span::styled(after, input_style),
                ])
            }
            (_, _, false) => Line::from(Span::styled(display.iter().collect::<String>(), input_style)),
        };

        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}

/// An ordered set of fields with at most one focused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<TextField>,
    focused: Option<usize>,
}

impl Form {
    #[must_use]
    pub const fn new(fields: Vec<TextField>) -> Self {
        Self {
            fields,
            focused: None,
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[TextField] {
        &self.fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&TextField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut TextField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Value of the named field, or an empty string if there is none.
    #[must_use]
    pub fn value(&self, name: &str) -> &str {
        self.field(name).map_or("", TextField::value)
    }

    #[must_use]
    pub fn first_focusable(&self) -> Option<usize> {
        self.fields.iter().position(TextField::is_focusable)
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name == name && f.is_focusable())
    }

    #[must_use]
    pub fn focused(&self) -> Option<&TextField> {
        self.focused.and_then(|i| self.fields.get(i))
    }

    #[must_use]
    pub fn focused_name(&self) -> Option<&str> {
        self.focused().map(TextField::name)
    }

    fn focus_index(&mut self, index: usize) {
        if let Some(previous) = self.focused.and_then(|i| self.fields.get_mut(i)) {
            previous.selected = false;
        }
        self.focused = Some(index);
        self.fields[index].select();
    }

    /// Focus and select the first focusable field. Returns false if there is none.
    pub fn focus_first(&mut self) -> bool {
        self.first_focusable()
            .map(|index| self.focus_index(index))
            .is_some()
    }

    /// Focus and select the field with the given name. Returns false if there is none.
    pub fn focus_named(&mut self, name: &str) -> bool {
        self.position(name)
            .map(|index| self.focus_index(index))
            .is_some()
    }

    pub fn focus_next(&mut self) {
        self.cycle(true);
    }

    pub fn focus_prev(&mut self) {
        self.cycle(false);
    }

    fn cycle(&mut self, forward: bool) {
        let count = self.fields.len();
        if count == 0 {
            return;
        }
        let start = self.focused.unwrap_or(if forward { count - 1 } else { 0 });
        let next = (1..=count)
            .map(|step| {
                if forward {
                    (start + step) % count
                } else {
                    (start + count - step % count) % count
                }
            })
            .find(|&i| self.fields[i].is_focusable());
        if let Some(index) = next {
            self.focus_index(index);
        }
    }

    /// Forward an editing key to the focused field.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.focused
            .and_then(|i| self.fields.get_mut(i))
            .is_some_and(|field| field.handle_key(key))
    }

    /// Insert pasted text into the focused field.
    pub fn paste(&mut self, text: &str) {
        if let Some(field) = self
            .focused
            .and_then(|i| self.fields.get_mut(i))
            .filter(|f| f.is_focusable())
        {
            field.insert_str(text);
        }
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        u16::try_from(self.fields.len()).unwrap_or(u16::MAX).saturating_mul(FIELD_HEIGHT)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let rows = Layout::vertical(self.fields.iter().map(|_| Constraint::Length(FIELD_HEIGHT)))
            .split(area);
        for (index, (field, row)) in self.fields.iter().zip(rows.iter()).enumerate() {
            field.render(frame, *row, self.focused == Some(index), theme);
        }
    }
}
