//! Staging of a single texture image into host memory.

use glreplay_extras::gl::{uncompressed_image_size, ComponentKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{ReadbackError, ReadbackKey};
use crate::config::ReadbackConfig;
use crate::emitter::{
    Attachment, DeviceCmd, EmitError, FramebufferId, FramebufferTarget, ImageTarget,
    ReplaySession, Scratch,
};
use crate::state::{Image, Texture, TextureKind};

/// Everything needed to stage one image, computed before any device work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StagePlan {
    pub kind: TextureKind,
    pub image: Image,
    pub size: u64,
    pub attachment: Attachment,
}

impl StagePlan {
    pub fn new(
        texture: &Texture,
        key: &ReadbackKey,
        config: &ReadbackConfig,
    ) -> Result<Self, ReadbackError> {
        if !texture.has_level(key.level) {
            return Err(ReadbackError::LevelNotFound {
                texture: key.texture,
                level: key.level,
            });
        }
        let image = *texture
            .image(key.level, key.layer)
            .ok_or(ReadbackError::LayerNotFound {
                texture: key.texture,
                level: key.level,
                layer: key.layer,
            })?;

        let attachment = match key.format.component_kind() {
            ComponentKind::Color => Attachment::Color0,
            ComponentKind::Depth => Attachment::Depth,
            ComponentKind::Stencil | ComponentKind::DepthStencil => {
                return Err(ReadbackError::UnsupportedAttachment(key.format));
            }
        };

        let size = uncompressed_image_size(key.format, key.ty, image.width, image.height).ok_or(
            ReadbackError::UnsupportedFormat {
                format: key.format,
                ty: key.ty,
            },
        )?;
        if size > config.max_image_bytes {
            return Err(ReadbackError::TooLarge {
                size,
                limit: config.max_image_bytes,
            });
        }

        Ok(Self {
            kind: texture.kind,
            image,
            size,
            attachment,
        })
    }

    /// Attach command for the requested level/layer. The temporary framebuffer is only ever bound
    /// to the read target.
    pub fn attach_command(&self, key: &ReadbackKey) -> DeviceCmd {
        let target = FramebufferTarget::Read;
        let simple = |image_target| DeviceCmd::FramebufferTexture2d {
            target,
            attachment: self.attachment,
            image_target,
            texture: key.texture,
            level: key.level,
        };
        match self.kind {
            TextureKind::CubeMap => simple(ImageTarget::CubeMapFace(key.layer)),
            TextureKind::External => simple(ImageTarget::External),
            kind if !kind.is_layered() && key.layer == 0 => simple(ImageTarget::Texture2d),
            _ => DeviceCmd::FramebufferTextureLayer {
                target,
                attachment: self.attachment,
                texture: key.texture,
                level: key.level,
                layer: key.layer,
            },
        }
    }
}

fn checkpoint(token: &CancellationToken) -> Result<(), ReadbackError> {
    if token.is_cancelled() {
        return Err(ReadbackError::Cancelled);
    }
    Ok(())
}

/// Runs the staging sequence on `session` and returns the image bytes.
///
/// Blocking; callers run it off the async executor.
pub(crate) fn extract(
    session: &mut dyn ReplaySession,
    plan: &StagePlan,
    key: &ReadbackKey,
    token: &CancellationToken,
) -> Result<Vec<u8>, ReadbackError> {
    checkpoint(token)?;
    session
        .replay_until(key.position)
        .map_err(ReadbackError::device("replay"))?;
    checkpoint(token)?;

    let mut staging = Staging::new(session);
    let scratch = staging.allocate_scratch(plan.size)?;
    staging.create_framebuffer()?;
    staging.emit(plan.attach_command(key), "attach")?;
    checkpoint(token)?;

    staging.emit(
        DeviceCmd::ReadPixels {
            width: plan.image.width,
            height: plan.image.height,
            format: key.format,
            ty: key.ty,
            dst: scratch,
        },
        "read pixels",
    )?;
    let bytes = staging.fetch(scratch)?;
    debug!(
        texture = %key.texture,
        level = key.level,
        layer = key.layer,
        bytes = bytes.len(),
        "texture image staged"
    );
    Ok(bytes)
}

/// Owns the transient device state of one staging run and reverts it on drop.
struct Staging<'s> {
    session: &'s mut dyn ReplaySession,
    prior_read: FramebufferId,
    framebuffer: Option<FramebufferId>,
    scratch: Option<Scratch>,
}

impl<'s> Staging<'s> {
    fn new(session: &'s mut dyn ReplaySession) -> Self {
        let prior_read = session.framebuffer_binding(FramebufferTarget::Read);
        Self {
            session,
            prior_read,
            framebuffer: None,
            scratch: None,
        }
    }

    fn allocate_scratch(&mut self, size: u64) -> Result<Scratch, ReadbackError> {
        let scratch = self
            .session
            .allocate_scratch(size)
            .map_err(ReadbackError::device("allocate scratch"))?;
        self.scratch = Some(scratch);
        Ok(scratch)
    }

    fn create_framebuffer(&mut self) -> Result<FramebufferId, ReadbackError> {
        let framebuffer = self
            .session
            .gen_framebuffer()
            .map_err(ReadbackError::device("create framebuffer"))?;
        self.framebuffer = Some(framebuffer);
        self.emit(
            DeviceCmd::BindFramebuffer {
                target: FramebufferTarget::Read,
                framebuffer,
            },
            "bind framebuffer",
        )?;
        Ok(framebuffer)
    }

    fn emit(&mut self, cmd: DeviceCmd, step: &'static str) -> Result<(), ReadbackError> {
        self.session.emit(cmd).map_err(ReadbackError::device(step))
    }

    fn fetch(&mut self, scratch: Scratch) -> Result<Vec<u8>, ReadbackError> {
        let bytes = self
            .session
            .fetch_scratch(scratch)
            .map_err(ReadbackError::device("fetch"))?;
        if bytes.len() as u64 != scratch.size {
            return Err(ReadbackError::Device {
                step: "fetch",
                source: EmitError::ShortFetch {
                    expected: scratch.size,
                    actual: bytes.len() as u64,
                },
            });
        }
        Ok(bytes)
    }
}

impl Drop for Staging<'_> {
    fn drop(&mut self) {
        if let Some(framebuffer) = self.framebuffer.take() {
            let restore = DeviceCmd::BindFramebuffer {
                target: FramebufferTarget::Read,
                framebuffer: self.prior_read,
            };
            if let Err(err) = self.session.emit(restore) {
                warn!(error = %err, "failed to restore read framebuffer binding");
            }
            if let Err(err) = self.session.emit(DeviceCmd::DeleteFramebuffer(framebuffer)) {
                warn!(
                    error = %err,
                    framebuffer = framebuffer.0,
                    "failed to delete staging framebuffer"
                );
            }
        }
        if let Some(scratch) = self.scratch.take() {
            self.session.release_scratch(scratch);
        }
    }
}

#[cfg(test)]
mod tests {
    use glreplay_extras::gl::{PixelFormat, PixelType};

    use super::*;
    use crate::command::CommandIndex;
    use crate::state::{CaptureId, DeviceId, ReplayTarget, TextureId};

    fn key(layer: u32, format: PixelFormat, ty: PixelType) -> ReadbackKey {
        ReadbackKey {
            target: ReplayTarget {
                capture: CaptureId(1),
                device: DeviceId(1),
            },
            position: CommandIndex(5),
            texture: TextureId(7),
            level: 0,
            layer,
            format,
            ty,
        }
    }

    fn texture(kind: TextureKind, layers: u32) -> Texture {
        let mut texture = Texture::new(TextureId(7), kind);
        for layer in 0..layers {
            texture.set_image(
                0,
                layer,
                Image {
                    width: 4,
                    height: 2,
                    internal_format: 0x8058,
                },
            );
        }
        texture
    }

    fn plan(texture: &Texture, key: &ReadbackKey) -> Result<StagePlan, ReadbackError> {
        StagePlan::new(texture, key, &ReadbackConfig::default())
    }

    #[test]
    fn plan_sizes_scratch_from_format_and_type() {
        let tex = texture(TextureKind::Texture2d, 1);
        let p = plan(&tex, &key(0, PixelFormat::Rgba, PixelType::UnsignedByte)).unwrap();
        assert_eq!(p.size, 4 * 2 * 4);
        assert_eq!(p.attachment, Attachment::Color0);

        let p = plan(&tex, &key(0, PixelFormat::DepthComponent, PixelType::Float)).unwrap();
        assert_eq!(p.size, 4 * 2 * 4);
        assert_eq!(p.attachment, Attachment::Depth);
    }

    #[test]
    fn stencil_formats_are_unsupported() {
        let tex = texture(TextureKind::Texture2d, 1);
        let err = plan(
            &tex,
            &key(0, PixelFormat::DepthStencil, PixelType::UnsignedInt248),
        )
        .unwrap_err();
        assert_eq!(err, ReadbackError::UnsupportedAttachment(PixelFormat::DepthStencil));
    }

    #[test]
    fn size_limit_is_enforced() {
        let tex = texture(TextureKind::Texture2d, 1);
        let config = ReadbackConfig {
            max_image_bytes: 16,
            ..ReadbackConfig::default()
        };
        let err = StagePlan::new(
            &tex,
            &key(0, PixelFormat::Rgba, PixelType::UnsignedByte),
            &config,
        )
        .unwrap_err();
        assert_eq!(err, ReadbackError::TooLarge { size: 32, limit: 16 });
    }

    #[test]
    fn attach_form_follows_texture_kind_and_layer() {
        let rgba = |layer| key(layer, PixelFormat::Rgba, PixelType::UnsignedByte);

        let tex = texture(TextureKind::Texture2d, 1);
        let cmd = plan(&tex, &rgba(0)).unwrap().attach_command(&rgba(0));
        assert!(matches!(
            cmd,
            DeviceCmd::FramebufferTexture2d {
                image_target: ImageTarget::Texture2d,
                ..
            }
        ));

        let tex = texture(TextureKind::Texture2dArray, 3);
        for layer in [0, 2] {
            let cmd = plan(&tex, &rgba(layer)).unwrap().attach_command(&rgba(layer));
            assert!(matches!(
                cmd,
                DeviceCmd::FramebufferTextureLayer { layer: l, .. } if l == layer
            ));
        }

        let tex = texture(TextureKind::CubeMap, 6);
        let cmd = plan(&tex, &rgba(4)).unwrap().attach_command(&rgba(4));
        assert!(matches!(
            cmd,
            DeviceCmd::FramebufferTexture2d {
                image_target: ImageTarget::CubeMapFace(4),
                ..
            }
        ));
    }

    #[test]
    fn missing_level_and_layer_are_reported_separately() {
        let tex = texture(TextureKind::Texture2dArray, 2);
        let mut k = key(5, PixelFormat::Rgba, PixelType::UnsignedByte);
        assert!(matches!(
            plan(&tex, &k),
            Err(ReadbackError::LayerNotFound { layer: 5, .. })
        ));
        k.level = 3;
        assert!(matches!(
            plan(&tex, &k),
            Err(ReadbackError::LevelNotFound { level: 3, .. })
        ));
    }
}
