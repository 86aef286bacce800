use ratatui::text::Line;

use crate::ui::{AlertBox, LoadingOverlay};

/// Everything the modal chrome shows for the current state.
///
/// Built fresh by [`ModalBase::view`](super::ModalBase::view) on every render.
/// The dialog content is drawn separately and does not depend on any of this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    /// Variant identifier of the outer wrapper.
    pub class_name: &'static str,
    pub title: Line<'static>,
    /// Key hint of the close control.
    pub close_hint: String,
    /// Alert row between header and content; never dismissible.
    pub alert: Option<AlertBox>,
    pub loading: LoadingOverlay,
}

impl ModalView {
    #[must_use]
    pub const fn has_alert_row(&self) -> bool {
        self.alert.is_some()
    }
}
