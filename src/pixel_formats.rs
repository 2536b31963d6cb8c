//! Module for pixel formats.
//!
//! PNG stores pixels in a handful of layouts (greyscale, RGB, indexed, with or
//! without alpha, at various bit depths). This crate turns all of them into
//! [`RGBA8`], which is what most code wants in the end. [`RGB8`] is what a
//! palette entry is stored as.
//!
//! Both types are `#[repr(C)]` with only `u8` fields, so they're [`Pod`] and a
//! byte slice of the right length can be cast to a slice of them (and back)
//! with [`bytemuck`].

use bytemuck::{Pod, Zeroable};

/// An RGB value, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// An 8-bits per channel RGBA pixel.
///
/// Alpha is straight (not premultiplied), with 255 as fully opaque.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGBA8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}
impl RGBA8 {
  /// Makes a greyscale pixel.
  #[inline]
  #[must_use]
  pub const fn grey(y: u8, a: u8) -> Self {
    Self { r: y, g: y, b: y, a }
  }
}
impl From<RGB8> for RGBA8 {
  #[inline]
  fn from(RGB8 { r, g, b }: RGB8) -> Self {
    Self { r, g, b, a: 255 }
  }
}

#[test]
fn test_pixel_casts() {
  let bytes = [1_u8, 2, 3, 4, 5, 6];
  let rgb: &[RGB8] = bytemuck::cast_slice(&bytes);
  assert_eq!(rgb, &[RGB8 { r: 1, g: 2, b: 3 }, RGB8 { r: 4, g: 5, b: 6 }]);
  assert_eq!(RGBA8::from(rgb[1]), RGBA8 { r: 4, g: 5, b: 6, a: 255 });
  assert_eq!(RGBA8::grey(7, 8), RGBA8 { r: 7, g: 7, b: 7, a: 8 });
}
