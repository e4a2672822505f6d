use core::fmt;

use glreplay_extras::ExtrasBag;

/// Position of a command in the recorded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CommandIndex(pub u64);

impl fmt::Display for CommandIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed argument of a recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    U32(u32),
    I32(i32),
    U64(u64),
    F32(f32),
    Bool(bool),
    Str(String),
    /// Address in the recorded application's memory.
    Pointer(u64),
}

/// One recorded API call. Built by the stream decoder; read-only to this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    args: Vec<ArgValue>,
    extras: ExtrasBag,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            extras: ExtrasBag::new(),
        }
    }

    pub fn with_arg(mut self, arg: ArgValue) -> Self {
        self.args.push(arg);
        self
    }

    pub fn with_extras(mut self, extras: ExtrasBag) -> Self {
        self.extras = extras;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[ArgValue] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&ArgValue> {
        self.args.get(index)
    }

    pub fn extras(&self) -> &ExtrasBag {
        &self.extras
    }
}
