//! Rendering backend on top of the `image` crate.
//!
//! Surfaces are `DynamicImage`s of the same variant as the source, so bit
//! depth and channel layout carry through. Surfaces use a top-left origin,
//! so draw rects are flipped before they are snapped to pixels. Only the
//! source pixels that land on the canvas are cropped out and scaled, so the
//! working buffers stay near canvas size whatever the draw rect's extent.

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer};

use crate::geometry::{PixelSize, Rect};
use crate::resample::{DrawSurface, InterpolationQuality, RenderBackend, ResourceError};

/// Software [`RenderBackend`] for [`DynamicImage`].
///
/// ```
/// use image::{DynamicImage, RgbaImage};
/// use zenfill::{AspectFill, Gravity, ImageBackend};
///
/// let source = DynamicImage::ImageRgba8(RgbaImage::new(400, 200));
/// let out = AspectFill::new(100, 100)
///     .gravity(Gravity::Right)
///     .apply(&ImageBackend, &source)
///     .unwrap();
///
/// assert_eq!((out.width(), out.height()), (100, 100));
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct ImageBackend;

/// Drawing surface handed out by [`ImageBackend`].
#[derive(Clone, Debug)]
pub struct ImageSurface {
    canvas: DynamicImage,
    filter: FilterType,
}

/// Filter used for each quality level.
pub fn filter_for(quality: InterpolationQuality) -> FilterType {
    match quality {
        InterpolationQuality::None => FilterType::Nearest,
        InterpolationQuality::Low => FilterType::Triangle,
        InterpolationQuality::Medium => FilterType::CatmullRom,
        InterpolationQuality::High => FilterType::Lanczos3,
    }
}

impl RenderBackend for ImageBackend {
    type Image = DynamicImage;
    type Surface = ImageSurface;

    fn pixel_size(&self, image: &DynamicImage) -> PixelSize {
        PixelSize::new(image.width(), image.height())
    }

    fn create_surface(
        &self,
        size: PixelSize,
        template: &DynamicImage,
    ) -> Result<ImageSurface, ResourceError> {
        if size.is_empty() {
            return Err(ResourceError::ZeroArea {
                width: size.width,
                height: size.height,
            });
        }
        check_allocation(size, u64::from(template.color().bytes_per_pixel()))?;
        let canvas =
            blank_like(template, size).ok_or(ResourceError::UnsupportedPixelFormat)?;
        log::trace!(
            "created {:?} surface {}x{}",
            canvas.color(),
            size.width,
            size.height
        );
        Ok(ImageSurface {
            canvas,
            filter: filter_for(InterpolationQuality::default()),
        })
    }
}

impl DrawSurface for ImageSurface {
    type Image = DynamicImage;

    fn set_interpolation_quality(&mut self, quality: InterpolationQuality) {
        self.filter = filter_for(quality);
    }

    fn draw_image(&mut self, image: &DynamicImage, rect: Rect) -> Result<(), ResourceError> {
        let (iw, ih) = (image.width(), image.height());
        if iw == 0 || ih == 0 {
            return Err(ResourceError::DrawFailed);
        }
        let finite = rect.x.is_finite()
            && rect.y.is_finite()
            && rect.width.is_finite()
            && rect.height.is_finite();
        if !finite || rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(ResourceError::DrawFailed);
        }

        let (cw, ch) = (self.canvas.width(), self.canvas.height());
        let rect = rect.flip_y(ch as f64);
        let (Some((left, right)), Some((top, bottom))) = (
            visible_span(rect.x, rect.width, iw, cw),
            visible_span(rect.y, rect.height, ih, ch),
        ) else {
            return Ok(());
        };

        // Only the part of the source that lands on the canvas is scaled.
        let sx = rect.width / iw as f64;
        let sy = rect.height / ih as f64;
        let part = Rect::new(
            rect.x + left as f64 * sx,
            rect.y + top as f64 * sy,
            (right - left) as f64 * sx,
            (bottom - top) as f64 * sy,
        );
        let px = part.to_pixels().ok_or(ResourceError::AllocationFailed {
            width: part.width as u32,
            height: part.height as u32,
        })?;

        let cropped;
        let visible = if (left, top, right, bottom) == (0, 0, iw, ih) {
            image
        } else {
            cropped = image.crop_imm(left, top, right - left, bottom - top);
            &cropped
        };

        let scaled;
        let top_image = if px.size() == PixelSize::new(visible.width(), visible.height()) {
            visible
        } else {
            check_allocation(px.size(), WORKING_BYTES_PER_PIXEL)?;
            log::trace!(
                "scaling {}x{} of {iw}x{ih} -> {}x{} with {:?}",
                visible.width(),
                visible.height(),
                px.width,
                px.height,
                self.filter
            );
            scaled = visible.resize_exact(px.width, px.height, self.filter);
            &scaled
        };
        blit(&mut self.canvas, top_image, px.x, px.y)
    }

    fn snapshot(self) -> Result<DynamicImage, ResourceError> {
        Ok(self.canvas)
    }
}

/// `imageops::resize` works through an `Rgba<f32>` buffer of the output size.
const WORKING_BYTES_PER_PIXEL: u64 = 16;

/// Filter support in destination pixels (Lanczos3, the widest filter used).
const FILTER_RADIUS: f64 = 3.0;

/// Source pixels `[first, end)` along one axis that land on a canvas of
/// `canvas_len`, for a draw span starting at `origin` of length `extent`.
///
/// Downscaled axes keep enough extra source pixels to feed the filter at the
/// crop edges. Upscaled axes take none: each extra source pixel would cost
/// `scale` destination pixels.
fn visible_span(origin: f64, extent: f64, source_len: u32, canvas_len: u32) -> Option<(u32, u32)> {
    let lo = origin.max(0.0);
    let hi = (origin + extent).min(canvas_len as f64);
    if hi <= lo {
        return None;
    }
    let scale = extent / source_len as f64;
    let margin = if scale < 1.0 {
        (FILTER_RADIUS / scale).ceil()
    } else {
        0.0
    };
    let len = source_len as f64;
    let first = (((lo - origin) / scale).floor() - margin).clamp(0.0, len) as u32;
    let end = (((hi - origin) / scale).ceil() + margin).clamp(0.0, len) as u32;
    (end > first).then_some((first, end))
}

/// Reject buffers whose byte length cannot be addressed.
fn check_allocation(size: PixelSize, bytes_per_pixel: u64) -> Result<(), ResourceError> {
    let bytes = u64::from(size.width)
        .checked_mul(u64::from(size.height))
        .and_then(|n| n.checked_mul(bytes_per_pixel));
    match bytes {
        Some(n) if n <= isize::MAX as u64 => Ok(()),
        _ => Err(ResourceError::AllocationFailed {
            width: size.width,
            height: size.height,
        }),
    }
}

/// Transparent buffer with the same pixel layout as `template`.
fn blank_like(template: &DynamicImage, size: PixelSize) -> Option<DynamicImage> {
    let (w, h) = (size.width, size.height);
    Some(match template {
        DynamicImage::ImageLuma8(_) => DynamicImage::ImageLuma8(ImageBuffer::new(w, h)),
        DynamicImage::ImageLumaA8(_) => DynamicImage::ImageLumaA8(ImageBuffer::new(w, h)),
        DynamicImage::ImageRgb8(_) => DynamicImage::ImageRgb8(ImageBuffer::new(w, h)),
        DynamicImage::ImageRgba8(_) => DynamicImage::ImageRgba8(ImageBuffer::new(w, h)),
        DynamicImage::ImageLuma16(_) => DynamicImage::ImageLuma16(ImageBuffer::new(w, h)),
        DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLumaA16(ImageBuffer::new(w, h)),
        DynamicImage::ImageRgb16(_) => DynamicImage::ImageRgb16(ImageBuffer::new(w, h)),
        DynamicImage::ImageRgba16(_) => DynamicImage::ImageRgba16(ImageBuffer::new(w, h)),
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb32F(ImageBuffer::new(w, h)),
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba32F(ImageBuffer::new(w, h)),
        _ => return None,
    })
}

/// Copy `top` onto `canvas` at `(x, y)`, clipping to the canvas.
fn blit(canvas: &mut DynamicImage, top: &DynamicImage, x: i64, y: i64) -> Result<(), ResourceError> {
    use DynamicImage as D;
    match (canvas, top) {
        (D::ImageLuma8(c), D::ImageLuma8(t)) => imageops::replace(c, t, x, y),
        (D::ImageLumaA8(c), D::ImageLumaA8(t)) => imageops::replace(c, t, x, y),
        (D::ImageRgb8(c), D::ImageRgb8(t)) => imageops::replace(c, t, x, y),
        (D::ImageRgba8(c), D::ImageRgba8(t)) => imageops::replace(c, t, x, y),
        (D::ImageLuma16(c), D::ImageLuma16(t)) => imageops::replace(c, t, x, y),
        (D::ImageLumaA16(c), D::ImageLumaA16(t)) => imageops::replace(c, t, x, y),
        (D::ImageRgb16(c), D::ImageRgb16(t)) => imageops::replace(c, t, x, y),
        (D::ImageRgba16(c), D::ImageRgba16(t)) => imageops::replace(c, t, x, y),
        (D::ImageRgb32F(c), D::ImageRgb32F(t)) => imageops::replace(c, t, x, y),
        (D::ImageRgba32F(c), D::ImageRgba32F(t)) => imageops::replace(c, t, x, y),
        _ => return Err(ResourceError::UnsupportedPixelFormat),
    }
    Ok(())
}
