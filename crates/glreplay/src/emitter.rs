//! Device-side command emission.
//!
//! [`DeviceEmitter`] is what mutation logic sees during replay; [`ReplaySession`] extends it with
//! the handful of operations the readback resolver needs to stage a texture copy.

use core::fmt;

use glreplay_extras::gl::{PixelFormat, PixelType};
use thiserror::Error;

use crate::command::CommandIndex;
use crate::state::TextureId;

/// Range of the recorded application's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryRange {
    pub base: u64,
    pub size: u64,
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}, +{:#x})", self.base, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("device rejected {command}: {reason}")]
    Rejected {
        command: &'static str,
        reason: String,
    },
    #[error("scratch allocation of {size} bytes failed")]
    OutOfScratch { size: u64 },
    #[error("scratch fetch returned {actual} bytes, expected {expected}")]
    ShortFetch { expected: u64, actual: u64 },
    #[error("device lost: {0}")]
    DeviceLost(String),
}

/// Receives memory-observation bookkeeping from mutation logic.
pub trait DeviceEmitter {
    fn mark_mapped(&mut self, range: MemoryRange);
    fn mark_unmapped(&mut self, range: MemoryRange);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub u32);

impl FramebufferId {
    /// The default (window-system) framebuffer.
    pub const DEFAULT: FramebufferId = FramebufferId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    Draw,
    Read,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    Color0,
    Depth,
}

/// Texture image target of a non-layered framebuffer attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    Texture2d,
    /// Face index 0..6 in GL order, starting at `TEXTURE_CUBE_MAP_POSITIVE_X`.
    CubeMapFace(u32),
    External,
}

/// Device-side buffer that receives pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scratch {
    pub id: u32,
    pub size: u64,
}

/// Synthetic commands emitted into a replay session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCmd {
    BindFramebuffer {
        target: FramebufferTarget,
        framebuffer: FramebufferId,
    },
    FramebufferTexture2d {
        target: FramebufferTarget,
        attachment: Attachment,
        image_target: ImageTarget,
        texture: TextureId,
        level: u32,
    },
    FramebufferTextureLayer {
        target: FramebufferTarget,
        attachment: Attachment,
        texture: TextureId,
        level: u32,
        layer: u32,
    },
    ReadPixels {
        width: u32,
        height: u32,
        format: PixelFormat,
        ty: PixelType,
        dst: Scratch,
    },
    DeleteFramebuffer(FramebufferId),
}

impl DeviceCmd {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BindFramebuffer { .. } => "glBindFramebuffer",
            Self::FramebufferTexture2d { .. } => "glFramebufferTexture2D",
            Self::FramebufferTextureLayer { .. } => "glFramebufferTextureLayer",
            Self::ReadPixels { .. } => "glReadPixels",
            Self::DeleteFramebuffer(_) => "glDeleteFramebuffers",
        }
    }
}

/// A live replay of one capture on one device.
///
/// Sessions are driven by one caller at a time; the resolver serializes access.
pub trait ReplaySession: DeviceEmitter + Send {
    /// Replays recorded commands up to and including `position`.
    fn replay_until(&mut self, position: CommandIndex) -> Result<(), EmitError>;

    fn framebuffer_binding(&self, target: FramebufferTarget) -> FramebufferId;

    fn gen_framebuffer(&mut self) -> Result<FramebufferId, EmitError>;

    fn emit(&mut self, cmd: DeviceCmd) -> Result<(), EmitError>;

    fn allocate_scratch(&mut self, size: u64) -> Result<Scratch, EmitError>;

    /// Copies the scratch contents back to the host.
    fn fetch_scratch(&mut self, scratch: Scratch) -> Result<Vec<u8>, EmitError>;

    fn release_scratch(&mut self, scratch: Scratch);
}
