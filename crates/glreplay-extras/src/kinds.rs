use crate::gl::{PixelFormat, PixelType, UniformType};
use crate::resource_id::ResourceId;

/// Wire tag of each extension kind. Values are part of the trace format and must never change.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtraTag {
    ErrorState = 1,
    ImageSnapshot = 2,
    ProgramIntrospection = 3,
    StaticContextState = 4,
    DynamicContextState = 5,
    PlatformBufferDescriptor = 6,
}

impl ExtraTag {
    pub fn from_raw(value: u16) -> Option<Self> {
        Some(match value {
            1 => Self::ErrorState,
            2 => Self::ImageSnapshot,
            3 => Self::ProgramIntrospection,
            4 => Self::StaticContextState,
            5 => Self::DynamicContextState,
            6 => Self::PlatformBufferDescriptor,
            _ => return None,
        })
    }

    pub fn raw(self) -> u16 {
        self as u16
    }
}

/// GL error state observed while tracing the command. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ErrorState {
    /// Error returned by the driver's `glGetError` right after the call.
    pub trace_driver_error: u32,
    /// Error raised by the interception layer itself (argument validation).
    pub interceptor_error: u32,
}

/// Externally sourced image (e.g. an `EGLImage` bound with `glEGLImageTargetTexture2DOES`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageSnapshot {
    /// Content of the image bytes.
    pub id: ResourceId,
    pub size: u32,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub ty: PixelType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActiveUniform {
    pub ty: UniformType,
    /// Name as reported by the driver; arrays usually carry a `[0]` suffix.
    pub name: String,
    pub array_size: u32,
    pub location: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActiveAttribute {
    pub ty: UniformType,
    pub name: String,
    pub array_size: u32,
    pub location: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniformBlock {
    pub name: String,
    pub binding: u32,
    pub data_size: u32,
    /// Indices into [`ProgramIntrospection::uniforms`].
    pub uniform_indices: Vec<u32>,
}

/// Program state discovered at link time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ProgramIntrospection {
    pub link_status: bool,
    pub info_log: String,
    pub uniforms: Vec<ActiveUniform>,
    pub attributes: Vec<ActiveAttribute>,
    pub uniform_blocks: Vec<UniformBlock>,
}

/// Platform (EGL) handles identifying a context and the surfaces bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContextIdentity {
    pub display: u64,
    pub surface: u64,
    pub context: u64,
}

/// Context properties that never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StaticContextState {
    pub identity: ContextIdentity,
    pub version_major: u32,
    pub version_minor: u32,
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub extensions: Vec<String>,
    pub max_texture_size: u32,
}

/// Context properties captured at each `eglMakeCurrent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DynamicContextState {
    pub identity: ContextIdentity,
    pub backbuffer_width: u32,
    pub backbuffer_height: u32,
    /// Sized internal formats of the default framebuffer attachments (0 when absent).
    pub color_format: u32,
    pub depth_format: u32,
    pub stencil_format: u32,
    pub reset_viewport_scissor: bool,
    pub preserve_buffers_on_swap: bool,
}

/// Platform-native graphics buffer (e.g. an Android `AHardwareBuffer`) bound as a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlatformBufferDescriptor {
    pub width: u32,
    pub height: u32,
    /// Row stride in pixels.
    pub stride: u32,
    /// Platform pixel format code.
    pub format: u32,
    /// Platform usage bit flags.
    pub usage: u64,
    pub layer_count: u32,
}

/// One extension object in an [`ExtrasBag`](crate::ExtrasBag).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extra {
    ErrorState(ErrorState),
    ImageSnapshot(ImageSnapshot),
    ProgramIntrospection(ProgramIntrospection),
    StaticContextState(StaticContextState),
    DynamicContextState(DynamicContextState),
    PlatformBufferDescriptor(PlatformBufferDescriptor),
}

impl Extra {
    pub fn tag(&self) -> ExtraTag {
        match self {
            Extra::ErrorState(_) => ExtraTag::ErrorState,
            Extra::ImageSnapshot(_) => ExtraTag::ImageSnapshot,
            Extra::ProgramIntrospection(_) => ExtraTag::ProgramIntrospection,
            Extra::StaticContextState(_) => ExtraTag::StaticContextState,
            Extra::DynamicContextState(_) => ExtraTag::DynamicContextState,
            Extra::PlatformBufferDescriptor(_) => ExtraTag::PlatformBufferDescriptor,
        }
    }

    /// Resource identities referenced by this object, in field order.
    pub fn resource_ids(&self) -> Vec<ResourceId> {
        match self {
            Extra::ImageSnapshot(image) => vec![image.id],
            _ => Vec::new(),
        }
    }

    /// Returns a copy with `f` applied once to every resource identity field.
    pub fn map_resource_ids<F>(&self, f: &mut F) -> Extra
    where
        F: FnMut(ResourceId) -> ResourceId,
    {
        match self {
            Extra::ImageSnapshot(image) => Extra::ImageSnapshot(ImageSnapshot {
                id: f(image.id),
                ..image.clone()
            }),
            other => other.clone(),
        }
    }
}

/// An extension kind that can be looked up in an [`ExtrasBag`](crate::ExtrasBag).
pub trait ExtraKind: Clone + Into<Extra> {
    const TAG: ExtraTag;

    fn from_extra(extra: &Extra) -> Option<&Self>;
}

macro_rules! extra_kind {
    ($($kind:ident),* $(,)?) => {
        $(
            impl ExtraKind for $kind {
                const TAG: ExtraTag = ExtraTag::$kind;

                fn from_extra(extra: &Extra) -> Option<&Self> {
                    match extra {
                        Extra::$kind(v) => Some(v),
                        _ => None,
                    }
                }
            }

            impl From<$kind> for Extra {
                fn from(value: $kind) -> Self {
                    Extra::$kind(value)
                }
            }
        )*
    };
}

extra_kind!(
    ErrorState,
    ImageSnapshot,
    ProgramIntrospection,
    StaticContextState,
    DynamicContextState,
    PlatformBufferDescriptor,
);
