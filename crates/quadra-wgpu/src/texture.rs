//! RGBA texture upload.
//!
//! Textures are plain `Rgba8UnormSrgb` 2D images with a single mip level. Each
//! one carries its own sampler so wrap and filter modes stay per texture.

use crate::error::{RenderError, RenderResult};

/// Behaviour of texture coordinates outside `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

impl From<WrapMode> for wgpu::AddressMode {
    fn from(mode: WrapMode) -> Self {
        match mode {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

impl From<FilterMode> for wgpu::FilterMode {
    fn from(mode: FilterMode) -> Self {
        match mode {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Sampling parameters of an uploaded texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureParams {
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
}

impl TextureParams {
    /// Same wrap mode on both axes, same filter for minification and magnification.
    pub fn uniform(wrap: WrapMode, filter: FilterMode) -> Self {
        Self {
            wrap_u: wrap,
            wrap_v: wrap,
            min_filter: filter,
            mag_filter: filter,
        }
    }
}

/// A texture living on the GPU.
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    width: u32,
    height: u32,
}

impl GpuTexture {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Release the GPU memory immediately instead of waiting for the last reference.
    pub fn destroy(self) {
        self.texture.destroy();
    }
}

/// Check the dimensions and pixel buffer length of an upload.
pub fn validate_upload(
    pixels: &[u8],
    width: u32,
    height: u32,
    max_dimension: u32,
) -> RenderResult<()> {
    if width == 0 || height == 0 || width > max_dimension || height > max_dimension {
        return Err(RenderError::InvalidTextureSize { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(RenderError::TextureAllocation(format!(
            "expected {} bytes of RGBA pixels for {}x{}, got {}",
            expected,
            width,
            height,
            pixels.len()
        )));
    }
    Ok(())
}

/// Create a texture from tightly packed RGBA8 `pixels` (row-major, top row first).
pub fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pixels: &[u8],
    width: u32,
    height: u32,
    params: TextureParams,
) -> RenderResult<GpuTexture> {
    validate_upload(
        pixels,
        width,
        height,
        device.limits().max_texture_dimension_2d,
    )?;

    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("quadra texture"),
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
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());
    if let Some(err) = validation.or(out_of_memory) {
        texture.destroy();
        return Err(RenderError::TextureAllocation(err.to_string()));
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("quadra texture sampler"),
        address_mode_u: params.wrap_u.into(),
        address_mode_v: params.wrap_v.into(),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: params.mag_filter.into(),
        min_filter: params.min_filter.into(),
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    log::debug!("uploaded {}x{} texture ({:?})", width, height, params);

    Ok(GpuTexture {
        texture,
        view,
        sampler,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_params() {
        let params = TextureParams::uniform(WrapMode::Repeat, FilterMode::Nearest);
        assert_eq!(params.wrap_u, WrapMode::Repeat);
        assert_eq!(params.wrap_v, WrapMode::Repeat);
        assert_eq!(params.min_filter, FilterMode::Nearest);
        assert_eq!(params.mag_filter, FilterMode::Nearest);
    }

    #[test]
    fn test_mode_conversion() {
        assert_eq!(
            wgpu::AddressMode::from(WrapMode::MirrorRepeat),
            wgpu::AddressMode::MirrorRepeat
        );
        assert_eq!(
            wgpu::FilterMode::from(FilterMode::Linear),
            wgpu::FilterMode::Linear
        );
    }

    #[test]
    fn test_validate_upload() {
        assert!(validate_upload(&[0; 16], 2, 2, 8192).is_ok());
        assert!(matches!(
            validate_upload(&[], 0, 2, 8192),
            Err(RenderError::InvalidTextureSize { width: 0, height: 2 })
        ));
        assert!(matches!(
            validate_upload(&[0; 16], 2, 2, 1),
            Err(RenderError::InvalidTextureSize { .. })
        ));
        assert!(matches!(
            validate_upload(&[0; 15], 2, 2, 8192),
            Err(RenderError::TextureAllocation(_))
        ));
    }
}
