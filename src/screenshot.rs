// screenshot.rs — GPU read-back of an offscreen frame into a PNG

use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;

#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("viewport is empty")]
    EmptyViewport,

    #[error("unsupported texture format {0:?}")]
    UnsupportedFormat(wgpu::TextureFormat),

    #[error("failed to map read-back buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),

    #[error("read-back callback was dropped")]
    ChannelClosed,

    #[error("pixel buffer does not match {width}x{height}")]
    SizeMismatch { width: u32, height: u32 },

    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode png: {0}")]
    Encode(#[from] image::ImageError),
}

/// Rows copied out of a texture must start on 256-byte boundaries.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (unpadded + align - 1) / align * align
}

fn is_bgra(format: wgpu::TextureFormat) -> Result<bool, ScreenshotError> {
    match format {
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => Ok(false),
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => Ok(true),
        other => Err(ScreenshotError::UnsupportedFormat(other)),
    }
}

/// Strips row padding and reorders channels to RGBA.
pub fn to_rgba_image(
    data: &[u8],
    width: u32,
    height: u32,
    padded_bytes_per_row: u32,
    format: wgpu::TextureFormat,
) -> Result<RgbaImage, ScreenshotError> {
    let swap = is_bgra(format)?;
    if width == 0 || height == 0 {
        return Err(ScreenshotError::EmptyViewport);
    }
    let row_len = (width * 4) as usize;
    let stride = padded_bytes_per_row as usize;

    if stride < row_len || data.len() < stride * (height as usize).saturating_sub(1) + row_len {
        return Err(ScreenshotError::SizeMismatch { width, height });
    }

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in data.chunks(stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_len]);
    }
    if swap {
        for px in pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
    }

    RgbaImage::from_raw(width, height, pixels).ok_or(ScreenshotError::SizeMismatch { width, height })
}

/// `<dir>/screenshot_<YYYYmmdd_HHMMSS_mmm>.png`
pub fn timestamped_path(dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    dir.join(format!("screenshot_{stamp}.png"))
}

pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), ScreenshotError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ScreenshotError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Mappable buffer sized for one copy of a `width × height` color texture.
pub struct Readback {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_bytes_per_row: u32,
    format: wgpu::TextureFormat,
}

impl Readback {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Result<Self, ScreenshotError> {
        if width == 0 || height == 0 {
            return Err(ScreenshotError::EmptyViewport);
        }
        is_bgra(format)?;

        let padded_bytes_per_row = padded_bytes_per_row(width);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Screenshot Read-back"),
            size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Ok(Self {
            buffer,
            width,
            height,
            padded_bytes_per_row,
            format,
        })
    }

    pub fn copy_from(&self, encoder: &mut wgpu::CommandEncoder, texture: &wgpu::Texture) {
        encoder.copy_texture_to_buffer(
            texture.as_image_copy(),
            wgpu::ImageCopyBuffer {
                buffer: &self.buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Blocks until the copy has landed. Call after the copy was submitted.
    pub fn read(self, device: &wgpu::Device) -> Result<RgbaImage, ScreenshotError> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);
        rx.recv().map_err(|_| ScreenshotError::ChannelClosed)??;

        let image = {
            let data = slice.get_mapped_range();
            to_rgba_image(
                &data,
                self.width,
                self.height,
                self.padded_bytes_per_row,
                self.format,
            )
        };
        self.buffer.unmap();
        image
    }
}
