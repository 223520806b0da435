/// The lifecycle state of a transport handle.
/// Created -> Opened -> Sending -> Completed -> Disposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// The handle exists but `open()` has not been called.
    #[default]
    Created,

    /// `open()` has been called; headers may be set.
    Opened,

    /// `send()` has been called and the call is outstanding.
    Sending,

    /// The completion hook has fired (success or error).
    Completed,

    /// The handle has released its resources.
    Disposed,
}

impl LoadState {
    /// Whether `abort()` has any effect in this state.
    pub fn is_abortable(self) -> bool {
        matches!(self, LoadState::Opened | LoadState::Sending)
    }
}
