#![forbid(unsafe_code)]

//! Module for working with PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## Automatic Decoding
//!
//! Just call [`decode_png`] (or
//! [`Bitmap::try_from_png_bytes`](crate::Bitmap::try_from_png_bytes)) and you
//! get back a [`Bitmap`](crate::Bitmap) of [`RGBA8`] pixels, or the first
//! [`PngError`] the decoder ran into. There's no partial output.
//!
//! This requires the `alloc` and `miniz_oxide` crate features.
//!
//! ## Stage By Stage Decoding
//!
//! The automatic decoder is just the following steps run back to back. Each
//! step consumes the value from the step before, so a decode can't be
//! accidentally run twice or out of order.
//!
//! 1) [`PngDecoder::new`] holds the bytes.
//! 2) [`PngDecoder::validate`] checks the 8 byte PNG signature.
//! 3) [`PngSignatureChecked::parse_chunks`] splits the rest of the bytes into
//!    chunks with a [`PngRawChunkIter`], turns each into a [`PngChunk`], and
//!    keeps the header, palette, transparency, and all of the `IDAT` bytes
//!    joined together. Unknown chunks are skipped.
//! 4) [`PngChunksParsed::parse_data`] decompresses the joined `IDAT` bytes,
//!    reverses the scanline filters with [`unfilter_image`], and turns the
//!    resulting samples into pixels with [`assemble_rgba8`].
//!
//! Between steps 3 and 4 you can inspect the [`IHDR`] and decide if you want
//! to continue (eg: to reject images that are too big for your use). You can
//! also supply your own zlib implementation via the [`Decompressor`] trait.
//!
//! ## Limits
//!
//! * Bit depths of 1, 2, and 4 pack more than one pixel per byte. These parse
//!   fine as a header, but decoding them gives
//!   [`UnsupportedBitDepth`](PngError::UnsupportedBitDepth).
//! * Interlaced images give [`UnsupportedInterlace`](PngError::UnsupportedInterlace).
//! * 16-bit channels are reduced to their high byte.
//! * CRC values are read but only checked if you ask for it with
//!   [`DecodeOptions::verify_crc`].

use core::fmt::{Debug, Write};

use log::{debug, trace, warn};

use crate::{
  parser_helpers::{try_split_off_byte_array, u16_be, u32_be},
  pixel_formats::{RGB8, RGBA8},
  PngError, PngResult,
};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

mod crc32;
pub use crc32::*;

mod raw_chunk;
pub use raw_chunk::*;

mod ihdr;
pub use ihdr::*;

mod plte;
pub use plte::*;

mod trns;
pub use trns::*;

mod chunk;
pub use chunk::*;

mod unfilter;
pub use unfilter::*;

#[cfg(feature = "alloc")]
mod assemble;
#[cfg(feature = "alloc")]
pub use assemble::*;

#[cfg(feature = "alloc")]
mod decoder;
#[cfg(feature = "alloc")]
pub use decoder::*;


/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the PNG's initial 8 bytes are correct.
///
/// * If this is the case, the rest of the bytes are very likely PNG data.
/// * If this is *not* the case, the rest of the bytes are very likely *not* PNG
///   data.
#[inline]
#[must_use]
pub const fn is_png_header_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels (samples) in each pixel of this color type.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }

  /// If the bit depth given is allowed for this color type.
  #[inline]
  #[must_use]
  pub const fn allows_bit_depth(self, bit_depth: u8) -> bool {
    match self {
      Self::Y => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
      Self::Index => matches!(bit_depth, 1 | 2 | 4 | 8),
      Self::RGB | Self::YA | Self::RGBA => matches!(bit_depth, 8 | 16),
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      other => return Err(PngError::InvalidColorType(other)),
    })
  }
}

#[test]
fn test_color_type_table() {
  assert_eq!(PngColorType::try_from(0), Ok(PngColorType::Y));
  assert_eq!(PngColorType::try_from(6), Ok(PngColorType::RGBA));
  assert_eq!(PngColorType::try_from(1), Err(PngError::InvalidColorType(1)));
  assert_eq!(PngColorType::try_from(5), Err(PngError::InvalidColorType(5)));
  let counts: [usize; 5] = [
    PngColorType::Y.channel_count(),
    PngColorType::RGB.channel_count(),
    PngColorType::Index.channel_count(),
    PngColorType::YA.channel_count(),
    PngColorType::RGBA.channel_count(),
  ];
  assert_eq!(counts, [1, 3, 1, 2, 4]);
  assert!(PngColorType::Index.allows_bit_depth(4));
  assert!(!PngColorType::Index.allows_bit_depth(16));
  assert!(!PngColorType::RGB.allows_bit_depth(4));
}

#[test]
fn test_is_png_header_correct() {
  assert!(is_png_header_correct(&PNG_SIGNATURE));
  assert!(is_png_header_correct(&[137, 80, 78, 71, 13, 10, 26, 10, 0, 0]));
  assert!(!is_png_header_correct(&[137, 80, 78, 71, 13, 10, 26]));
  assert!(!is_png_header_correct(b"GIF89a\0\0"));
}
