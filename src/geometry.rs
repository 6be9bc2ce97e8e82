//! Aspect-fill geometry.
//!
//! Computes the rectangle at which a whole source image must be drawn so it
//! covers a canvas without distorting, with [`Gravity`] choosing which side
//! of the overflow stays visible. Pure `f64` geometry — no pixel operations,
//! no allocations, `no_std` compatible.
//!
//! Coordinates use a bottom-left origin: `y = 0` is the bottom edge of the
//! canvas and `y` grows upward. Backends with top-left surfaces convert with
//! [`Rect::flip_y`].
//!
//! # Example
//!
//! ```
//! use zenfill::{Gravity, Rect, Size, resolve_draw_rect};
//!
//! // 400×200 source (2:1) into a 100×100 canvas: overflow is horizontal.
//! let rect = resolve_draw_rect(2.0, Size::new(100.0, 100.0), Gravity::Center).unwrap();
//! assert_eq!(rect, Rect::new(-50.0, 0.0, 200.0, 100.0));
//! ```

use num_traits::Float;

/// Which part of the source survives when aspect-fill overflow is cropped.
///
/// Overflow only ever happens along one axis, so each variant anchors a
/// single edge. A gravity that names the axis without overflow is a no-op
/// there and the image stays centered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gravity {
    /// Crop both sides of the overflow equally.
    #[default]
    Center,
    /// Keep the left edge flush with the canvas.
    Left,
    /// Keep the top edge flush with the canvas.
    Top,
    /// Keep the right edge flush with the canvas.
    Right,
    /// Keep the bottom edge flush with the canvas.
    Bottom,
}

impl Gravity {
    /// Every gravity value, in declaration order.
    pub const ALL: [Gravity; 5] = [
        Gravity::Center,
        Gravity::Left,
        Gravity::Top,
        Gravity::Right,
        Gravity::Bottom,
    ];

    /// Origin of a `draw`-sized rect inside `canvas` (bottom-left origin).
    fn offset(self, canvas: Size, draw: Size) -> (f64, f64) {
        let center_x = (canvas.width - draw.width) / 2.0;
        let center_y = (canvas.height - draw.height) / 2.0;
        match self {
            Self::Center => (center_x, center_y),
            Self::Left => (0.0, center_y),
            Self::Right => (canvas.width - draw.width, center_y),
            Self::Top => (center_x, canvas.height - draw.height),
            Self::Bottom => (center_x, 0.0),
        }
    }
}

/// Width × height in pixels or abstract units.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `width / height`, or `None` when the ratio is undefined
    /// (zero height, negative or non-finite sides).
    pub fn aspect_ratio(&self) -> Option<f64> {
        if !self.is_valid() || self.height == 0.0 {
            return None;
        }
        Some(self.width / self.height)
    }

    /// Both sides strictly positive and finite.
    pub fn is_positive(&self) -> bool {
        self.is_valid() && self.width > 0.0 && self.height > 0.0
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

impl From<PixelSize> for Size {
    fn from(px: PixelSize) -> Self {
        Self::new(px.width as f64, px.height as f64)
    }
}

/// Integer dimensions of a pixel buffer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    /// Create a new pixel size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either side is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Convert a size in points to pixels: `round(points * scale_factor)`.
    ///
    /// ```
    /// use zenfill::{PixelSize, Size};
    ///
    /// let px = PixelSize::from_points(Size::new(320.0, 240.0), 2.0).unwrap();
    /// assert_eq!(px, PixelSize::new(640, 480));
    /// ```
    pub fn from_points(points: Size, scale_factor: f64) -> Result<Self, DomainError> {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return Err(DomainError::InvalidScaleFactor);
        }
        if !points.is_valid() {
            return Err(DomainError::InvalidDimension);
        }
        let w = Float::round(points.width * scale_factor);
        let h = Float::round(points.height * scale_factor);
        if w < 1.0 || h < 1.0 {
            return Err(DomainError::ZeroCanvasDimension);
        }
        if w > u32::MAX as f64 || h > u32::MAX as f64 {
            return Err(DomainError::InvalidDimension);
        }
        Ok(Self::new(w as u32, h as u32))
    }
}

/// Axis-aligned rectangle, bottom-left origin.
///
/// A draw rect is usually larger than the canvas and may start at a
/// negative origin; the canvas boundary performs the crop.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect at the origin with the given size.
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Size of this rect.
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Mirror vertically inside a canvas of `canvas_height`.
    ///
    /// Converts between bottom-left and top-left origin conventions. The
    /// operation is its own inverse.
    pub fn flip_y(self, canvas_height: f64) -> Self {
        Self {
            y: canvas_height - (self.y + self.height),
            ..self
        }
    }

    /// Snap to the integer pixel grid.
    ///
    /// Edges are rounded independently, so a rect that covers an integer
    /// canvas still covers it after snapping. Width and height are at least 1.
    /// Returns `None` when an edge falls outside `i64` or a side exceeds `u32`.
    pub fn to_pixels(&self) -> Option<PixelRect> {
        let left = Float::round(self.x);
        let bottom = Float::round(self.y);
        let right = Float::round(self.x + self.width);
        let top = Float::round(self.y + self.height);
        let in_range = |v: f64| v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64;
        if ![left, bottom, right, top].into_iter().all(in_range) {
            return None;
        }
        let width = (right - left).max(1.0);
        let height = (top - bottom).max(1.0);
        if width > u32::MAX as f64 || height > u32::MAX as f64 {
            return None;
        }
        Some(PixelRect {
            x: left as i64,
            y: bottom as i64,
            width: width as u32,
            height: height as u32,
        })
    }
}

/// A [`Rect`] snapped to whole pixels. Origin may be negative.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Size of this rect.
    pub const fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }
}

/// Invalid geometric input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DomainError {
    /// Source image has zero width or height.
    ZeroSourceDimension,
    /// Canvas width or height is zero.
    ZeroCanvasDimension,
    /// A dimension is negative, NaN, infinite, or out of range.
    InvalidDimension,
    /// Source aspect ratio is not a positive finite number.
    InvalidRatio,
    /// Scale factor is not a positive finite number.
    InvalidScaleFactor,
}

impl core::fmt::Display for DomainError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::ZeroSourceDimension => "source image has zero width or height",
            Self::ZeroCanvasDimension => "canvas has zero width or height",
            Self::InvalidDimension => "dimension is negative, non-finite, or out of range",
            Self::InvalidRatio => "source aspect ratio must be positive and finite",
            Self::InvalidScaleFactor => "scale factor must be positive and finite",
        })
    }
}

impl core::error::Error for DomainError {}

/// Resolve where to draw a source of `source_ratio` (width / height) so it
/// fills `canvas` while keeping its aspect ratio.
///
/// The returned rect always covers the canvas: `width ≥ canvas.width` and
/// `height ≥ canvas.height`. Ratios are compared exactly; a near-equal
/// ratio takes the overflow branch and overflows by a sub-pixel amount.
///
/// ```
/// use zenfill::{Gravity, Rect, Size, resolve_draw_rect};
///
/// // 200×400 source into 100×100, keep the top.
/// let rect = resolve_draw_rect(0.5, Size::new(100.0, 100.0), Gravity::Top).unwrap();
/// assert_eq!(rect, Rect::new(0.0, -100.0, 100.0, 200.0));
/// ```
pub fn resolve_draw_rect(
    source_ratio: f64,
    canvas: Size,
    gravity: Gravity,
) -> Result<Rect, DomainError> {
    if !source_ratio.is_finite() || source_ratio <= 0.0 {
        return Err(DomainError::InvalidRatio);
    }
    if !canvas.is_valid() {
        return Err(DomainError::InvalidDimension);
    }
    if !canvas.is_positive() {
        return Err(DomainError::ZeroCanvasDimension);
    }
    let target_ratio = canvas.width / canvas.height;

    if source_ratio == target_ratio {
        return Ok(Rect::from_size(canvas));
    }

    // `max` keeps the covering invariant when the product rounds below the canvas.
    let draw = if source_ratio > target_ratio {
        // Source is wider — full height, overflow horizontally.
        Size::new((canvas.height * source_ratio).max(canvas.width), canvas.height)
    } else {
        // Source is taller — full width, overflow vertically.
        Size::new(canvas.width, (canvas.width / source_ratio).max(canvas.height))
    };

    let (x, y) = gravity.offset(canvas, draw);
    let rect = Rect::new(x, y, draw.width, draw.height);
    log::trace!(
        "aspect-fill {source_ratio} into {}x{} ({gravity:?}) -> {rect:?}",
        canvas.width,
        canvas.height
    );
    Ok(rect)
}
