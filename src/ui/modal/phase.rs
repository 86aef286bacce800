/// Submission state of a modal.
///
/// ```text
/// Idle ──submit──▶ Submitting ──failure──▶ Error
///                      ▲                     │
///                      └──────submit─────────┘
/// ```
///
/// Success leaves the machine entirely: the dialog hides and the modal is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalPhase {
    #[default]
    Idle,
    Submitting,
    Error,
}

impl ModalPhase {
    /// Phase once a request goes out.
    #[must_use]
    pub const fn submit(self) -> Self {
        Self::Submitting
    }

    /// Phase after a failure was reported.
    ///
    /// An idle modal only enters `Error` if there is something to show.
    #[must_use]
    pub const fn fail(self, has_errors: bool) -> Self {
        match self {
            Self::Submitting | Self::Error => Self::Error,
            Self::Idle if has_errors => Self::Error,
            Self::Idle => Self::Idle,
        }
    }
}
