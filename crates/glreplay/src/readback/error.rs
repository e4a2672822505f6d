use glreplay_extras::gl::{PixelFormat, PixelType};
use thiserror::Error;

use crate::command::CommandIndex;
use crate::emitter::EmitError;
use crate::error::ErrorKind;
use crate::state::{ReplayTarget, TextureId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadbackError {
    #[error("texture {texture} does not exist at command {position}")]
    TextureNotFound {
        texture: TextureId,
        position: CommandIndex,
    },
    #[error("texture {texture} has no level {level}")]
    LevelNotFound { texture: TextureId, level: u32 },
    #[error("texture {texture} level {level} has no layer {layer}")]
    LayerNotFound {
        texture: TextureId,
        level: u32,
        layer: u32,
    },
    #[error("no replay session for {0}")]
    SessionNotFound(ReplayTarget),
    #[error("pixel format {0:?} cannot be read back through a color or depth attachment")]
    UnsupportedAttachment(PixelFormat),
    #[error("invalid pixel format/type combination {format:?}/{ty:?}")]
    UnsupportedFormat { format: PixelFormat, ty: PixelType },
    #[error("readback of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("device error during {step}: {source}")]
    Device {
        step: &'static str,
        #[source]
        source: EmitError,
    },
    #[error("readback cancelled")]
    Cancelled,
    #[error("readback task failed: {0}")]
    Internal(String),
}

impl ReadbackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TextureNotFound { .. }
            | Self::LevelNotFound { .. }
            | Self::LayerNotFound { .. }
            | Self::SessionNotFound(_) => ErrorKind::NotFound,
            Self::UnsupportedAttachment(_)
            | Self::UnsupportedFormat { .. }
            | Self::TooLarge { .. } => ErrorKind::Unsupported,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Device { .. } | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn device(step: &'static str) -> impl FnOnce(EmitError) -> Self {
        move |source| Self::Device { step, source }
    }
}
