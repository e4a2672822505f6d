use std::sync::Arc;

use glreplay_extras::gl::{PixelFormat, PixelType};
use glreplay_extras::ResourceId;

use crate::command::CommandIndex;
use crate::state::{ReplayTarget, TextureId};

/// Identifies one readback result. Equal keys always resolve to the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadbackKey {
    pub target: ReplayTarget,
    pub position: CommandIndex,
    pub texture: TextureId,
    pub level: u32,
    pub layer: u32,
    pub format: PixelFormat,
    pub ty: PixelType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTexture {
    /// Content-store identifier of `bytes`.
    pub id: ResourceId,
    pub width: u32,
    pub height: u32,
    pub bytes: Arc<[u8]>,
}
