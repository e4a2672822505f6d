//! Replay-time semantic layer for recorded GL ES command streams.
//!
//! The external mutator walks a recorded [`Command`] sequence and applies each command to a
//! [`StateModel`]. This crate provides the machinery that every per-command rule relies on:
//!
//! - [`Externs`]: the only side-effecting surface available to mutation logic (memory map
//!   bookkeeping, index-range analysis, diagnostics, extras lookups).
//! - [`ReadbackResolver`]: pulls texture contents back from a live replay session by emitting a
//!   short sequence of synthetic device commands; results are content-addressed, cached and
//!   deduplicated across concurrent callers.
//! - [`synthesize_stub_shaders`]: minimal GLSL ES stand-ins for programs whose source was not
//!   captured, keeping every active uniform alive.
//! - [`label_for_command`]: command graph labels.
//!
//! Extension metadata attached to commands lives in the [`extras`] crate.

mod config;
mod error;
mod index_range;

pub mod command;
pub mod content;
pub mod diagnostics;
pub mod emitter;
pub mod externs;
pub mod label;
pub mod readback;
pub mod state;
pub mod stub_shader;

pub use glreplay_extras as extras;

pub use command::{ArgValue, Command, CommandIndex};
pub use config::ReadbackConfig;
pub use content::{ContentResolver, ContentStore, ResolveError};
pub use diagnostics::{DiagnosticSink, MessageId, Severity};
pub use emitter::{DeviceCmd, DeviceEmitter, EmitError, MemoryRange, ReplaySession};
pub use error::ErrorKind;
pub use externs::{ExternError, Externs};
pub use index_range::{index_range, IndexRange, IndexSize};
pub use label::{label_for_command, GraphLabel};
pub use readback::{ReadbackError, ReadbackKey, ReadbackResolver, ResolvedTexture};
pub use state::{CaptureId, DeviceId, ReplayTarget, StateModel, StateTimeline, TextureId};
pub use stub_shader::{synthesize_stub_shaders, StubError, StubShaders};
