//! Aspect-fill layout with edge gravity, plus a pluggable resampling step.
//!
//! The geometry is pure and `no_std` compatible. Pixel work is delegated to
//! a [`RenderBackend`] passed in per call; the `image` feature provides one
//! for `image::DynamicImage`.
//!
//! # Modules
//!
//! - [`geometry`] — Sizes, rects, gravity, and the draw-rect resolver
//! - [`resample`] — Rendering capability traits, resampling, the [`AspectFill`] builder
//! - `backend` — [`ImageBackend`] on the `image` crate (feature `image`)

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

pub mod geometry;
pub mod resample;

#[cfg(feature = "image")]
pub mod backend;

// Re-exports: core types
pub use geometry::{DomainError, Gravity, PixelRect, PixelSize, Rect, Size, resolve_draw_rect};
pub use resample::{
    AspectFill, DrawSurface, Error, InterpolationQuality, RenderBackend, ResourceError, resample,
};

#[cfg(feature = "image")]
pub use backend::{ImageBackend, ImageSurface};
