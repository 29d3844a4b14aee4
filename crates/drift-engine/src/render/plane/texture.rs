use std::collections::HashMap;
use std::fmt;

use crate::scene::TextureId;

/// Error returned by [`PlaneRenderer::upload_texture`](super::PlaneRenderer::upload_texture).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureUploadError {
    /// Width or height is zero.
    Empty,
    /// A side exceeds the device's 2D texture limit.
    TooLarge { width: u32, height: u32, max: u32 },
    /// Pixel buffer is not `width * height * 4` bytes.
    SizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for TextureUploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "texture upload error: image has no pixels"),
            Self::TooLarge { width, height, max } => {
                write!(f, "texture upload error: {width}x{height} exceeds device limit {max}")
            }
            Self::SizeMismatch { expected, actual } => {
                write!(f, "texture upload error: expected {expected} bytes of RGBA8, got {actual}")
            }
        }
    }
}

impl std::error::Error for TextureUploadError {}

/// Checks an RGBA8 upload against the device limit before touching the GPU.
pub(super) fn validate_rgba8(
    width: u32,
    height: u32,
    len: usize,
    max_dimension: u32,
) -> Result<(), TextureUploadError> {
    if width == 0 || height == 0 {
        return Err(TextureUploadError::Empty);
    }
    if width > max_dimension || height > max_dimension {
        return Err(TextureUploadError::TooLarge { width, height, max: max_dimension });
    }
    let expected = width as usize * height as usize * 4;
    if len != expected {
        return Err(TextureUploadError::SizeMismatch { expected, actual: len });
    }
    Ok(())
}

struct ImageTexture {
    // Held so the bind group's view stays valid.
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Image textures keyed by caller-assigned ids, plus a 1×1 transparent
/// placeholder bound for planes whose image has not arrived.
pub(super) struct TextureStore {
    images: HashMap<TextureId, ImageTexture>,
    placeholder: ImageTexture,
}

impl TextureStore {
    pub(super) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let (texture, bind_group) =
            create_rgba8(device, queue, layout, sampler, 1, 1, &[0, 0, 0, 0], "drift placeholder texture");
        Self {
            images: HashMap::new(),
            placeholder: ImageTexture { _texture: texture, bind_group },
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn insert(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        id: TextureId,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) {
        let (texture, bind_group) =
            create_rgba8(device, queue, layout, sampler, width, height, pixels, "drift image texture");
        self.images.insert(id, ImageTexture { _texture: texture, bind_group });
    }

    /// Bind group for `id`, or the placeholder while it is missing.
    pub(super) fn bind_group(&self, id: Option<TextureId>) -> &wgpu::BindGroup {
        let texture = id
            .and_then(|id| self.images.get(&id))
            .unwrap_or(&self.placeholder);
        &texture.bind_group
    }
}

#[allow(clippy::too_many_arguments)]
fn create_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
    pixels: &[u8],
    label: &str,
) -> (wgpu::Texture, wgpu::BindGroup) {
    let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    (texture, bind_group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_rgba8_buffer() {
        assert_eq!(validate_rgba8(2, 3, 24, 8192), Ok(()));
    }

    #[test]
    fn rejects_empty_image() {
        assert_eq!(validate_rgba8(0, 3, 0, 8192), Err(TextureUploadError::Empty));
    }

    #[test]
    fn rejects_oversized_image() {
        assert_eq!(
            validate_rgba8(9000, 10, 9000 * 10 * 4, 8192),
            Err(TextureUploadError::TooLarge { width: 9000, height: 10, max: 8192 })
        );
    }

    #[test]
    fn rejects_short_buffer() {
        assert_eq!(
            validate_rgba8(2, 2, 15, 8192),
            Err(TextureUploadError::SizeMismatch { expected: 16, actual: 15 })
        );
    }
}
