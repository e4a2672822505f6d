//! The slice of the replay state model this crate reads.
//!
//! The full model is owned and mutated by the external mutator; only the pieces the externs and the
//! readback resolver consult are modelled here.

use core::fmt;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use glreplay_extras::gl::Endian;
use glreplay_extras::{ProgramIntrospection, ResourceId};

use crate::command::CommandIndex;
use crate::diagnostics::DiagnosticSink;

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

object_id!(
    /// Identifies a loaded capture.
    CaptureId(u64)
);
object_id!(
    /// Identifies a replay device.
    DeviceId(u64)
);
object_id!(
    /// GL texture name as seen by the recorded application.
    TextureId(u32)
);
object_id!(BufferId(u32));
object_id!(ProgramId(u32));

/// Where a replay runs: which capture, on which device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReplayTarget {
    pub capture: CaptureId,
    pub device: DeviceId,
}

impl fmt::Display for ReplayTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "capture {} on device {}", self.capture, self.device)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLayout {
    pub endian: Endian,
    pub pointer_size: u8,
}

impl Default for MemoryLayout {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            pointer_size: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Texture2d,
    Texture2dArray,
    Texture3d,
    CubeMap,
    External,
}

impl TextureKind {
    /// Whether individual layers must be attached with the layer form of framebuffer attach.
    pub fn is_layered(self) -> bool {
        matches!(self, Self::Texture2dArray | Self::Texture3d)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub internal_format: u32,
}

/// A texture object: mip levels, each holding one image per layer (array slice, depth slice or
/// cube face).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub kind: TextureKind,
    levels: BTreeMap<u32, BTreeMap<u32, Image>>,
}

impl Texture {
    pub fn new(id: TextureId, kind: TextureKind) -> Self {
        Self {
            id,
            kind,
            levels: BTreeMap::new(),
        }
    }

    pub fn with_image(mut self, level: u32, layer: u32, image: Image) -> Self {
        self.set_image(level, layer, image);
        self
    }

    pub fn set_image(&mut self, level: u32, layer: u32, image: Image) {
        self.levels.entry(level).or_default().insert(layer, image);
    }

    pub fn has_level(&self, level: u32) -> bool {
        self.levels.contains_key(&level)
    }

    pub fn image(&self, level: u32, layer: u32) -> Option<&Image> {
        self.levels.get(&level)?.get(&layer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    pub id: BufferId,
    pub size: u64,
    /// Content-store handle of the buffer's data, once known.
    pub data: Option<ResourceId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub id: ProgramId,
    pub introspection: Option<ProgramIntrospection>,
}

/// Mutable GL state at one point of the replay.
#[derive(Clone, Default)]
pub struct StateModel {
    pub memory_layout: MemoryLayout,
    pub textures: HashMap<TextureId, Texture>,
    pub buffers: HashMap<BufferId, Buffer>,
    pub programs: HashMap<ProgramId, Program>,
    /// Receives driver errors and diagnostic messages raised during mutation.
    pub diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl fmt::Debug for StateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateModel")
            .field("memory_layout", &self.memory_layout)
            .field("textures", &self.textures.len())
            .field("buffers", &self.buffers.len())
            .field("programs", &self.programs.len())
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

/// Read access to texture state at arbitrary command positions.
pub trait TextureSource: Send + Sync {
    fn texture_at(
        &self,
        capture: CaptureId,
        position: CommandIndex,
        texture: TextureId,
    ) -> Option<Texture>;
}

/// State snapshots keyed by command position, per capture.
///
/// A lookup at position P sees the latest snapshot recorded at or before P.
#[derive(Default)]
pub struct StateTimeline {
    captures: RwLock<HashMap<CaptureId, BTreeMap<CommandIndex, Arc<StateModel>>>>,
}

impl StateTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, capture: CaptureId, position: CommandIndex, state: StateModel) {
        let mut captures = self
            .captures
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        captures
            .entry(capture)
            .or_default()
            .insert(position, Arc::new(state));
    }

    pub fn state_at(&self, capture: CaptureId, position: CommandIndex) -> Option<Arc<StateModel>> {
        let captures = self
            .captures
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        captures
            .get(&capture)?
            .range(..=position)
            .next_back()
            .map(|(_, state)| Arc::clone(state))
    }
}

impl TextureSource for StateTimeline {
    fn texture_at(
        &self,
        capture: CaptureId,
        position: CommandIndex,
        texture: TextureId,
    ) -> Option<Texture> {
        self.state_at(capture, position)?
            .textures
            .get(&texture)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(texture: Texture) -> StateModel {
        let mut state = StateModel::default();
        state.textures.insert(texture.id, texture);
        state
    }

    #[test]
    fn timeline_returns_latest_snapshot_at_or_before_position() {
        let timeline = StateTimeline::new();
        let capture = CaptureId(1);
        let image = |w| Image {
            width: w,
            height: 1,
            internal_format: 0x8058,
        };
        timeline.record(
            capture,
            CommandIndex(10),
            state_with(
                Texture::new(TextureId(3), TextureKind::Texture2d).with_image(0, 0, image(4)),
            ),
        );
        timeline.record(
            capture,
            CommandIndex(20),
            state_with(
                Texture::new(TextureId(3), TextureKind::Texture2d).with_image(0, 0, image(8)),
            ),
        );

        assert!(timeline.texture_at(capture, CommandIndex(9), TextureId(3)).is_none());
        let at = |p| {
            timeline
                .texture_at(capture, CommandIndex(p), TextureId(3))
                .and_then(|t| t.image(0, 0).map(|i| i.width))
        };
        assert_eq!(at(10), Some(4));
        assert_eq!(at(19), Some(4));
        assert_eq!(at(500), Some(8));
        assert!(timeline
            .texture_at(CaptureId(2), CommandIndex(20), TextureId(3))
            .is_none());
    }

    #[test]
    fn texture_lookup_distinguishes_levels_and_layers() {
        let tex = Texture::new(TextureId(1), TextureKind::Texture2dArray).with_image(
            1,
            2,
            Image {
                width: 2,
                height: 2,
                internal_format: 0,
            },
        );
        assert!(tex.has_level(1));
        assert!(!tex.has_level(0));
        assert!(tex.image(1, 2).is_some());
        assert!(tex.image(1, 0).is_none());
    }
}
