//! Resampling through an injected rendering capability.
//!
//! The core never samples pixels itself. It asks a [`RenderBackend`] for a
//! surface of the target size, draws the source into the rect computed by
//! [`resolve_draw_rect`], and snapshots the surface. Whatever falls outside
//! the surface is clipped away, which is how the crop happens.

use crate::geometry::{DomainError, Gravity, PixelSize, Rect, Size, resolve_draw_rect};

/// Filter strength passed to the rendering capability. Not interpreted here.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InterpolationQuality {
    /// Nearest neighbor.
    None,
    /// Cheap smoothing, such as bilinear.
    Low,
    /// Bicubic-class smoothing.
    Medium,
    /// Best available filter, such as Lanczos.
    #[default]
    High,
}

/// A 2D rendering capability that can allocate drawing surfaces.
pub trait RenderBackend {
    /// Pixel buffer type consumed and produced by this backend.
    type Image;
    /// Drawing surface for a single resample call.
    type Surface: DrawSurface<Image = Self::Image>;

    /// Intrinsic pixel dimensions of `image`.
    fn pixel_size(&self, image: &Self::Image) -> PixelSize;

    /// Create a surface of exactly `size`, with the pixel format of `template`.
    fn create_surface(
        &self,
        size: PixelSize,
        template: &Self::Image,
    ) -> Result<Self::Surface, ResourceError>;
}

/// A drawing surface that clips to its own bounds.
pub trait DrawSurface {
    type Image;

    /// Filter used by subsequent [`draw_image`](Self::draw_image) calls.
    fn set_interpolation_quality(&mut self, quality: InterpolationQuality);

    /// Draw `image` scaled into `rect`, given in bottom-left-origin surface
    /// coordinates. Parts outside the surface are discarded.
    fn draw_image(&mut self, image: &Self::Image, rect: Rect) -> Result<(), ResourceError>;

    /// Consume the surface and return its contents.
    fn snapshot(self) -> Result<Self::Image, ResourceError>;
}

/// The rendering capability failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResourceError {
    /// Requested canvas has zero width or height.
    ZeroArea { width: u32, height: u32 },
    /// Backend cannot render this pixel format.
    UnsupportedPixelFormat,
    /// Source carries no usable color space information.
    MissingColorSpace,
    /// Buffer of this size cannot be allocated.
    AllocationFailed { width: u32, height: u32 },
    /// Drawing the source onto the surface failed.
    DrawFailed,
    /// Surface contents could not be captured.
    SnapshotFailed,
}

impl core::fmt::Display for ResourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroArea { width, height } => {
                write!(f, "cannot create a {width}x{height} surface")
            }
            Self::UnsupportedPixelFormat => f.write_str("unsupported pixel format"),
            Self::MissingColorSpace => f.write_str("source image has no color space"),
            Self::AllocationFailed { width, height } => {
                write!(f, "cannot allocate a {width}x{height} buffer")
            }
            Self::DrawFailed => f.write_str("failed to draw source onto surface"),
            Self::SnapshotFailed => f.write_str("failed to snapshot surface"),
        }
    }
}

impl core::error::Error for ResourceError {}

/// Any failure of [`AspectFill::apply`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Domain(DomainError),
    Resource(ResourceError),
}

impl From<DomainError> for Error {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl From<ResourceError> for Error {
    fn from(e: ResourceError) -> Self {
        Self::Resource(e)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "invalid geometry: {e}"),
            Self::Resource(e) => write!(f, "rendering failed: {e}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Resource(e) => Some(e),
        }
    }
}

/// Render `source` into a new buffer of exactly `canvas` pixels, drawn at `draw`.
///
/// The surface lives only for this call and is dropped on every path; a
/// failed draw never yields a partial buffer.
pub fn resample<B: RenderBackend>(
    backend: &B,
    source: &B::Image,
    canvas: PixelSize,
    draw: Rect,
    quality: InterpolationQuality,
) -> Result<B::Image, ResourceError> {
    if canvas.is_empty() {
        return Err(ResourceError::ZeroArea {
            width: canvas.width,
            height: canvas.height,
        });
    }
    log::debug!(
        "resample into {}x{} at {draw:?} ({quality:?})",
        canvas.width,
        canvas.height
    );

    let mut surface = backend.create_surface(canvas, source)?;
    surface.set_interpolation_quality(quality);
    surface.draw_image(source, draw)?;
    surface.snapshot()
}

/// Aspect-fill a source into a fixed-size canvas.
///
/// # Example
///
/// ```
/// use zenfill::{AspectFill, Gravity, Rect};
///
/// let rect = AspectFill::new(100, 100)
///     .gravity(Gravity::Left)
///     .draw_rect(400, 200)
///     .unwrap();
///
/// assert_eq!(rect, Rect::new(0.0, 0.0, 200.0, 100.0));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AspectFill {
    pub canvas: PixelSize,
    pub gravity: Gravity,
    pub quality: InterpolationQuality,
}

impl AspectFill {
    /// Fill a `width`×`height` pixel canvas, centered, high quality.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: PixelSize::new(width, height),
            gravity: Gravity::Center,
            quality: InterpolationQuality::High,
        }
    }

    /// Fill a canvas given in points at `scale_factor` pixels per point.
    pub fn from_points(points: Size, scale_factor: f64) -> Result<Self, DomainError> {
        let px = PixelSize::from_points(points, scale_factor)?;
        Ok(Self::new(px.width, px.height))
    }

    /// Set which side of the overflow to keep.
    pub fn gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the interpolation quality forwarded to the backend.
    pub fn quality(mut self, quality: InterpolationQuality) -> Self {
        self.quality = quality;
        self
    }

    /// Draw rect for a source of the given pixel dimensions.
    pub fn draw_rect(&self, source_w: u32, source_h: u32) -> Result<Rect, DomainError> {
        if source_w == 0 || source_h == 0 {
            return Err(DomainError::ZeroSourceDimension);
        }
        if self.canvas.is_empty() {
            return Err(DomainError::ZeroCanvasDimension);
        }
        let ratio = Size::from(PixelSize::new(source_w, source_h))
            .aspect_ratio()
            .ok_or(DomainError::ZeroSourceDimension)?;
        resolve_draw_rect(ratio, self.canvas.into(), self.gravity)
    }

    /// Resolve the draw rect for `source` and resample it with `backend`.
    pub fn apply<B: RenderBackend>(&self, backend: &B, source: &B::Image) -> Result<B::Image, Error> {
        let src = backend.pixel_size(source);
        let rect = self.draw_rect(src.width, src.height)?;
        Ok(resample(backend, source, self.canvas, rect, self.quality)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Image that records how it was produced.
    #[derive(Clone, Debug, PartialEq)]
    struct Frame {
        size: PixelSize,
        has_color_space: bool,
        draws: Vec<(PixelSize, Rect, InterpolationQuality)>,
    }

    impl Frame {
        fn source(w: u32, h: u32) -> Self {
            Self {
                size: PixelSize::new(w, h),
                has_color_space: true,
                draws: Vec::new(),
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        surfaces_dropped: Rc<Cell<u32>>,
        fail_draw: bool,
        fail_snapshot: bool,
    }

    struct RecordingSurface {
        frame: Frame,
        quality: InterpolationQuality,
        dropped: Rc<Cell<u32>>,
        fail_draw: bool,
        fail_snapshot: bool,
    }

    impl Drop for RecordingSurface {
        fn drop(&mut self) {
            self.dropped.set(self.dropped.get() + 1);
        }
    }

    impl RenderBackend for Recorder {
        type Image = Frame;
        type Surface = RecordingSurface;

        fn pixel_size(&self, image: &Frame) -> PixelSize {
            image.size
        }

        fn create_surface(
            &self,
            size: PixelSize,
            template: &Frame,
        ) -> Result<RecordingSurface, ResourceError> {
            if !template.has_color_space {
                return Err(ResourceError::MissingColorSpace);
            }
            Ok(RecordingSurface {
                frame: Frame {
                    size,
                    has_color_space: true,
                    draws: Vec::new(),
                },
                quality: InterpolationQuality::None,
                dropped: Rc::clone(&self.surfaces_dropped),
                fail_draw: self.fail_draw,
                fail_snapshot: self.fail_snapshot,
            })
        }
    }

    impl DrawSurface for RecordingSurface {
        type Image = Frame;

        fn set_interpolation_quality(&mut self, quality: InterpolationQuality) {
            self.quality = quality;
        }

        fn draw_image(&mut self, image: &Frame, rect: Rect) -> Result<(), ResourceError> {
            if self.fail_draw {
                return Err(ResourceError::DrawFailed);
            }
            self.frame.draws.push((image.size, rect, self.quality));
            Ok(())
        }

        fn snapshot(self) -> Result<Frame, ResourceError> {
            if self.fail_snapshot {
                return Err(ResourceError::SnapshotFailed);
            }
            Ok(self.frame.clone())
        }
    }

    // ── resample ────────────────────────────────────────────────────────

    #[test]
    fn resample_forwards_rect_and_quality() {
        let backend = Recorder::default();
        let rect = Rect::new(-50.0, 0.0, 200.0, 100.0);
        let out = resample(
            &backend,
            &Frame::source(400, 200),
            PixelSize::new(100, 100),
            rect,
            InterpolationQuality::Medium,
        )
        .unwrap();
        assert_eq!(out.size, PixelSize::new(100, 100));
        assert_eq!(
            out.draws,
            vec![(PixelSize::new(400, 200), rect, InterpolationQuality::Medium)]
        );
        assert_eq!(backend.surfaces_dropped.get(), 1);
    }

    #[test]
    fn resample_zero_area_fails_before_backend() {
        let backend = Recorder::default();
        let err = resample(
            &backend,
            &Frame::source(10, 10),
            PixelSize::new(0, 10),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            InterpolationQuality::High,
        );
        assert_eq!(
            err,
            Err(ResourceError::ZeroArea {
                width: 0,
                height: 10
            })
        );
        assert_eq!(backend.surfaces_dropped.get(), 0);
    }

    #[test]
    fn resample_missing_color_space() {
        let backend = Recorder::default();
        let mut src = Frame::source(10, 10);
        src.has_color_space = false;
        let err = resample(
            &backend,
            &src,
            PixelSize::new(10, 10),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            InterpolationQuality::High,
        );
        assert_eq!(err, Err(ResourceError::MissingColorSpace));
    }

    #[test]
    fn surface_released_once_when_draw_fails() {
        let backend = Recorder {
            fail_draw: true,
            ..Recorder::default()
        };
        let err = resample(
            &backend,
            &Frame::source(10, 10),
            PixelSize::new(5, 5),
            Rect::new(0.0, 0.0, 5.0, 5.0),
            InterpolationQuality::Low,
        );
        assert_eq!(err, Err(ResourceError::DrawFailed));
        assert_eq!(backend.surfaces_dropped.get(), 1);
    }

    #[test]
    fn surface_released_once_when_snapshot_fails() {
        let backend = Recorder {
            fail_snapshot: true,
            ..Recorder::default()
        };
        let err = resample(
            &backend,
            &Frame::source(10, 10),
            PixelSize::new(5, 5),
            Rect::new(0.0, 0.0, 5.0, 5.0),
            InterpolationQuality::Low,
        );
        assert_eq!(err, Err(ResourceError::SnapshotFailed));
        assert_eq!(backend.surfaces_dropped.get(), 1);
    }

    // ── AspectFill ──────────────────────────────────────────────────────

    #[test]
    fn default_quality_is_high() {
        assert_eq!(InterpolationQuality::default(), InterpolationQuality::High);
        assert_eq!(AspectFill::new(10, 10).quality, InterpolationQuality::High);
    }

    #[test]
    fn apply_matching_ratio_draws_at_origin() {
        let backend = Recorder::default();
        let out = AspectFill::new(100, 50)
            .gravity(Gravity::Right)
            .apply(&backend, &Frame::source(400, 200))
            .unwrap();
        assert_eq!(out.size, PixelSize::new(100, 50));
        assert_eq!(out.draws.len(), 1);
        assert_eq!(out.draws[0].1, Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(out.draws[0].2, InterpolationQuality::High);
    }

    #[test]
    fn apply_tall_source_top() {
        let backend = Recorder::default();
        let out = AspectFill::new(100, 100)
            .gravity(Gravity::Top)
            .quality(InterpolationQuality::Low)
            .apply(&backend, &Frame::source(200, 400))
            .unwrap();
        assert_eq!(
            out.draws,
            vec![(
                PixelSize::new(200, 400),
                Rect::new(0.0, -100.0, 100.0, 200.0),
                InterpolationQuality::Low
            )]
        );
    }

    #[test]
    fn apply_zero_source_is_domain_error() {
        let backend = Recorder::default();
        let err = AspectFill::new(100, 100).apply(&backend, &Frame::source(400, 0));
        assert_eq!(err, Err(Error::Domain(DomainError::ZeroSourceDimension)));
        assert_eq!(backend.surfaces_dropped.get(), 0);
    }

    #[test]
    fn apply_zero_canvas_is_domain_error() {
        let backend = Recorder::default();
        let err = AspectFill::new(0, 100).apply(&backend, &Frame::source(400, 200));
        assert_eq!(err, Err(Error::Domain(DomainError::ZeroCanvasDimension)));
    }

    #[test]
    fn from_points_scales_canvas() {
        let fill = AspectFill::from_points(Size::new(50.0, 25.0), 3.0).unwrap();
        assert_eq!(fill.canvas, PixelSize::new(150, 75));
        assert_eq!(
            AspectFill::from_points(Size::new(50.0, 25.0), -1.0),
            Err(DomainError::InvalidScaleFactor)
        );
    }

    #[test]
    fn error_display_and_source() {
        use core::error::Error as _;
        let e = Error::from(ResourceError::UnsupportedPixelFormat);
        assert_eq!(e.to_string(), "rendering failed: unsupported pixel format");
        assert!(e.source().is_some());
        let e = Error::from(DomainError::ZeroSourceDimension);
        assert_eq!(
            e.to_string(),
            "invalid geometry: source image has zero width or height"
        );
    }
}
