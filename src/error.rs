use core::{fmt, num::TryFromIntError};

/// An error from decoding PNG data.
///
/// Every stage of the decoder stops at the first problem it finds, so you get
/// one of these rather than a partially decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngError {
  /// The first 8 bytes aren't the PNG signature.
  BadSignature,

  /// A chunk's framing was cut short: the length, type, payload, or CRC field
  /// didn't fit in the remaining bytes. Also used for critical chunks with
  /// payloads of the wrong size.
  MalformedChunk,

  /// The data ended without an `IEND` chunk.
  ///
  /// This is only reported when
  /// [`require_end_chunk`](crate::png::DecodeOptions::require_end_chunk) is
  /// set.
  MissingTerminator,

  /// No `IHDR` chunk was found before the image data.
  MissingHeader,

  /// The image uses indexed color but has no `PLTE` chunk.
  MissingPalette,

  /// The header declares a compression method other than zlib (0).
  UnsupportedCompression(u8),

  /// The header declares a filter method other than adaptive filtering (0).
  UnsupportedFilterMethod(u8),

  /// The image is interlaced.
  UnsupportedInterlace,

  /// The zlib stream couldn't be decompressed.
  DecompressionError,

  /// A scanline used a filter type outside of `0..=4`.
  UnknownFilterType(u8),

  /// The header's color type isn't one of 0, 2, 3, 4, or 6.
  InvalidColorType(u8),

  /// The header's bit depth isn't allowed for its color type.
  InvalidBitDepth(u8),

  /// The bit depth is legal PNG, but packs several pixels per byte, which
  /// this decoder doesn't unpack.
  UnsupportedBitDepth(u8),

  /// An indexed pixel referred to a palette entry that doesn't exist.
  InvalidPaletteIndex {
    /// the index the pixel used
    index: u8,
    /// how many entries the palette actually has
    palette_len: usize,
  },

  /// A chunk's declared CRC didn't match its contents.
  ///
  /// This is only checked when
  /// [`verify_crc`](crate::png::DecodeOptions::verify_crc) is set. Re-reading
  /// the input is the only fix.
  ChunkIntegrity {
    /// the type tag of the chunk that failed
    chunk_type: [u8; 4],
  },

  /// The declared width and/or height of this image is 0.
  WidthOrHeightZero,

  /// The image is larger than the configured
  /// [`max_dimension`](crate::png::DecodeOptions::max_dimension).
  DimensionsTooLarge,

  /// After decompression there were fewer bytes than the header requires.
  NotEnoughImageData {
    /// bytes the header says the filtered data should have
    expected: usize,
    /// bytes that were actually available
    actual: usize,
  },

  /// A checked math operation failed.
  CheckedMath,

  /// The allocator couldn't give us enough space.
  #[cfg(feature = "alloc")]
  Alloc,
}

/// Shorthand for a result with a [`PngError`].
pub type PngResult<T> = Result<T, PngError>;

impl fmt::Display for PngError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::BadSignature => write!(f, "not PNG data: bad signature"),
      Self::MalformedChunk => write!(f, "malformed chunk"),
      Self::MissingTerminator => write!(f, "data ended without an IEND chunk"),
      Self::MissingHeader => write!(f, "no IHDR chunk before the image data"),
      Self::MissingPalette => write!(f, "indexed color image has no PLTE chunk"),
      Self::UnsupportedCompression(m) => write!(f, "unsupported compression method {m}"),
      Self::UnsupportedFilterMethod(m) => write!(f, "unsupported filter method {m}"),
      Self::UnsupportedInterlace => write!(f, "interlaced images are not supported"),
      Self::DecompressionError => write!(f, "zlib decompression failed"),
      Self::UnknownFilterType(t) => write!(f, "unknown scanline filter type {t}"),
      Self::InvalidColorType(c) => write!(f, "invalid color type {c}"),
      Self::InvalidBitDepth(d) => write!(f, "invalid bit depth {d} for the color type"),
      Self::UnsupportedBitDepth(d) => write!(f, "unsupported bit depth {d}"),
      Self::InvalidPaletteIndex { index, palette_len } => {
        write!(f, "palette index {index} out of bounds for {palette_len} entries")
      }
      Self::ChunkIntegrity { chunk_type } => {
        write!(f, "CRC mismatch in chunk ")?;
        for ch in chunk_type.iter().copied().map(|u| u as char) {
          write!(f, "{ch}")?;
        }
        Ok(())
      }
      Self::WidthOrHeightZero => write!(f, "image width or height is 0"),
      Self::DimensionsTooLarge => write!(f, "image dimensions are too large"),
      Self::NotEnoughImageData { expected, actual } => {
        write!(f, "expected {expected} bytes of filtered image data, got {actual}")
      }
      Self::CheckedMath => write!(f, "image size arithmetic overflowed"),
      #[cfg(feature = "alloc")]
      Self::Alloc => write!(f, "allocation failed"),
    }
  }
}

impl core::error::Error for PngError {}

#[cfg(feature = "alloc")]
impl From<alloc::collections::TryReserveError> for PngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}
impl From<TryFromIntError> for PngError {
  #[inline]
  fn from(_: TryFromIntError) -> Self {
    Self::CheckedMath
  }
}

#[test]
fn test_png_error_display() {
  extern crate std;
  use std::string::ToString;

  assert_eq!(PngError::UnknownFilterType(7).to_string(), "unknown scanline filter type 7");
  assert_eq!(
    PngError::ChunkIntegrity { chunk_type: *b"IDAT" }.to_string(),
    "CRC mismatch in chunk IDAT"
  );
  assert_eq!(
    PngError::InvalidPaletteIndex { index: 9, palette_len: 2 }.to_string(),
    "palette index 9 out of bounds for 2 entries"
  );
}
