use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub log_in: KeyBinding,
    pub sign_up: KeyBinding,
    pub log_out: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalKeybindings {
    pub submit: KeyBinding,
    pub close: KeyBinding,
    pub next_field: KeyBinding,
    pub prev_field: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmKeybindings {
    pub confirm: KeyBinding,
    pub cancel: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub modal: ModalKeybindings,
    pub confirm: ConfirmKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            log_in: Key::new(KeyCode::Char('l')).into(),
            sign_up: Key::new(KeyCode::Char('s')).into(),
            log_out: Key::new(KeyCode::Char('o')).into(),
        }
    }
}

impl Default for ModalKeybindings {
    fn default() -> Self {
        Self {
            submit: Key::new(KeyCode::Enter).into(),
            close: Key::new(KeyCode::Esc).into(),
            next_field: KeyBinding::multiple(vec![Key::new(KeyCode::Tab), Key::new(KeyCode::Down)]),
            prev_field: KeyBinding::multiple(vec![Key::new(KeyCode::BackTab), Key::new(KeyCode::Up)]),
        }
    }
}

impl Default for ConfirmKeybindings {
    fn default() -> Self {
        Self {
            confirm: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('y')),
                Key::new(KeyCode::Char('Y')),
            ]),
            cancel: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('n')),
                Key::new(KeyCode::Char('N')),
            ]),
        }
    }
}
