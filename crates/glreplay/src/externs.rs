//! Side-effecting operations available to per-command mutation logic.

use glreplay_extras::gl::{PixelFormat, PixelType};
use glreplay_extras::{
    DynamicContextState, ErrorState, ImageSnapshot, PlatformBufferDescriptor,
    ProgramIntrospection, ResourceId, StaticContextState,
};
use thiserror::Error;
use tracing::{debug, error};

use crate::command::{Command, CommandIndex};
use crate::content::{ContentResolver, ResolveError};
use crate::diagnostics::{MessageId, Severity};
use crate::emitter::{DeviceEmitter, MemoryRange};
use crate::error::ErrorKind;
use crate::index_range::{index_range, IndexRange, IndexSize};
use crate::readback::ReadbackKey;
use crate::state::{ReplayTarget, StateModel, TextureId};

/// Commands whose results are backed by mapped device memory.
const MAP_BUFFER_COMMANDS: &[&str] = &[
    "glMapBufferRange",
    "glMapBufferRangeEXT",
    "glMapBufferOES",
    "glMapBuffer",
];

/// Errors that abort the current mutation pass.
#[derive(Debug, Error)]
pub enum ExternError {
    #[error("failed to resolve index data {id}: {source}")]
    IndexData {
        id: ResourceId,
        #[source]
        source: ResolveError,
    },
    #[error("unsupported index element size {0} (expected 1, 2 or 4)")]
    UnsupportedIndexSize(u32),
    #[error("unrecognized message severity {0}")]
    UnknownSeverity(u32),
}

impl ExternError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IndexData { source, .. } => source.kind(),
            Self::UnsupportedIndexSize(_) => ErrorKind::Unsupported,
            Self::UnknownSeverity(_) => ErrorKind::Internal,
        }
    }
}

/// Extern surface for one command's mutation pass.
///
/// Pure mutation passes are built without an emitter; replay passes attach one with
/// [`Externs::with_emitter`].
pub struct Externs<'a> {
    target: ReplayTarget,
    cmd: &'a Command,
    index: CommandIndex,
    state: &'a StateModel,
    content: &'a dyn ContentResolver,
    emitter: Option<&'a mut dyn DeviceEmitter>,
}

impl<'a> Externs<'a> {
    pub fn new(
        target: ReplayTarget,
        cmd: &'a Command,
        index: CommandIndex,
        state: &'a StateModel,
        content: &'a dyn ContentResolver,
    ) -> Self {
        Self {
            target,
            cmd,
            index,
            state,
            content,
            emitter: None,
        }
    }

    pub fn with_emitter(mut self, emitter: &'a mut dyn DeviceEmitter) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn command(&self) -> &Command {
        self.cmd
    }

    pub fn index(&self) -> CommandIndex {
        self.index
    }

    pub fn map_memory(&mut self, range: MemoryRange) {
        let Some(emitter) = self.emitter.as_deref_mut() else {
            return;
        };
        let name = self.cmd.name();
        if !MAP_BUFFER_COMMANDS.iter().any(|map| *map == name) {
            error!(
                command = name,
                index = %self.index,
                range = %range,
                "memory map requested by a command outside the map-buffer family; ignoring"
            );
            return;
        }
        emitter.mark_mapped(range);
    }

    pub fn unmap_memory(&mut self, range: MemoryRange) {
        if let Some(emitter) = self.emitter.as_deref_mut() {
            emitter.mark_unmapped(range);
        }
    }

    /// Minimum index and index count of the buffer stored under `data`.
    ///
    /// A cancelled resolution yields the zero range; any other resolution failure is fatal.
    pub fn compute_index_range(
        &self,
        data: ResourceId,
        index_size: u32,
    ) -> Result<IndexRange, ExternError> {
        let size =
            IndexSize::from_bytes(index_size).ok_or(ExternError::UnsupportedIndexSize(index_size))?;
        let bytes = match self.content.resolve(&data) {
            Ok(bytes) => bytes,
            Err(ResolveError::Cancelled) => {
                debug!(index = %self.index, id = ?data, "index data resolution cancelled");
                return Ok(IndexRange::default());
            }
            Err(source) => {
                error!(
                    command = self.cmd.name(),
                    index = %self.index,
                    id = ?data,
                    error = %source,
                    "index data resolution failed"
                );
                return Err(ExternError::IndexData { id: data, source });
            }
        };
        Ok(index_range(&bytes, size, self.state.memory_layout.endian))
    }

    pub fn lookup_error_state(&self) -> Option<ErrorState> {
        self.cmd.extras().find()
    }

    pub fn lookup_image_snapshot(&self) -> Option<ImageSnapshot> {
        self.cmd.extras().find()
    }

    pub fn lookup_program_introspection(&self) -> Option<ProgramIntrospection> {
        self.cmd.extras().find()
    }

    pub fn lookup_static_context_state(&self) -> Option<StaticContextState> {
        self.cmd.extras().find()
    }

    pub fn lookup_dynamic_context_state(&self) -> Option<DynamicContextState> {
        self.cmd.extras().find()
    }

    pub fn lookup_platform_buffer_descriptor(&self) -> Option<PlatformBufferDescriptor> {
        self.cmd.extras().find()
    }

    pub fn dispatch_error(&self, code: u32) {
        if let Some(sink) = &self.state.diagnostics {
            sink.on_error(code);
        }
    }

    /// Forwards a message to the diagnostic sink.
    ///
    /// The severity is validated even when no sink is installed.
    pub fn dispatch_message(&self, severity: u32, message: &str) -> Result<MessageId, ExternError> {
        let severity = Severity::from_raw(severity).ok_or(ExternError::UnknownSeverity(severity))?;
        Ok(match &self.state.diagnostics {
            Some(sink) => sink.new_message(severity, message),
            None => MessageId::NONE,
        })
    }

    pub fn tag_message(&self, id: MessageId, tag: &str) {
        if let Some(sink) = &self.state.diagnostics {
            sink.add_tag(id, tag);
        }
    }

    /// Key under which the readback resolver produces the contents of `texture` as of this
    /// command.
    pub fn read_gpu_texture_data(
        &self,
        texture: TextureId,
        level: u32,
        layer: u32,
        format: PixelFormat,
        ty: PixelType,
    ) -> ReadbackKey {
        ReadbackKey {
            target: self.target,
            position: self.index,
            texture,
            level,
            layer,
            format,
            ty,
        }
    }
}
