use core::fmt;

/// Severity of a diagnostic message raised by mutation logic.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    Fatal = 4,
}

impl Severity {
    pub fn from_raw(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Debug,
            1 => Self::Info,
            2 => Self::Warning,
            3 => Self::Error,
            4 => Self::Fatal,
            _ => return None,
        })
    }
}

/// Handle to a message created through a [`DiagnosticSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Returned when no sink is installed.
    pub const NONE: MessageId = MessageId(0);
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg#{}", self.0)
    }
}

/// Receiver of driver errors and diagnostic messages.
///
/// Implementations must be cheap and non-blocking; they are called from inside the mutation pass.
pub trait DiagnosticSink: Send + Sync {
    /// A GL error code reported by the recorded driver.
    fn on_error(&self, code: u32);

    fn new_message(&self, severity: Severity, message: &str) -> MessageId;

    fn add_tag(&self, id: MessageId, tag: &str);
}
