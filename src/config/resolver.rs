use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{ConfirmAction, GlobalAction, ModalAction};
use crate::config::key::KeyBinding;
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to configured actions.
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

impl KeyResolver {
    #[must_use]
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    fn global_binding(&self, action: GlobalAction) -> &KeyBinding {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => &kb.quit,
            GlobalAction::LogIn => &kb.log_in,
            GlobalAction::SignUp => &kb.sign_up,
            GlobalAction::LogOut => &kb.log_out,
        }
    }

    fn modal_binding(&self, action: ModalAction) -> &KeyBinding {
        let kb = &self.keybindings.modal;
        match action {
            ModalAction::Submit => &kb.submit,
            ModalAction::Close => &kb.close,
            ModalAction::NextField => &kb.next_field,
            ModalAction::PrevField => &kb.prev_field,
        }
    }

    fn confirm_binding(&self, action: ConfirmAction) -> &KeyBinding {
        let kb = &self.keybindings.confirm;
        match action {
            ConfirmAction::Confirm => &kb.confirm,
            ConfirmAction::Cancel => &kb.cancel,
        }
    }

    #[must_use]
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        self.global_binding(action).matches(event)
    }

    #[must_use]
    pub fn display_global(&self, action: GlobalAction) -> String {
        self.global_binding(action).hint()
    }

    #[must_use]
    pub fn matches_modal(&self, event: &KeyEvent, action: ModalAction) -> bool {
        self.modal_binding(action).matches(event)
    }

    #[must_use]
    pub fn display_modal(&self, action: ModalAction) -> String {
        self.modal_binding(action).hint()
    }

    #[must_use]
    pub fn matches_confirm(&self, event: &KeyEvent, action: ConfirmAction) -> bool {
        self.confirm_binding(action).matches(event)
    }

    #[must_use]
    pub fn display_confirm(&self, action: ConfirmAction) -> String {
        self.confirm_binding(action).hint()
    }
}
