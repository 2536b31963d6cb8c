use super::*;

/// Image Header
///
/// This is always the first chunk, and it says how to interpret all the rest
/// of the image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IHDR {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  /// 0 is zlib, there's no other defined value
  pub compression_method: u8,
  /// 0 is adaptive filtering (the five filter types), there's no other
  /// defined value
  pub filter_method: u8,
  /// 0 is no interlacing, 1 is Adam7
  pub interlace_method: u8,
}
impl TryFrom<&[u8]> for IHDR {
  type Error = PngError;
  fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
    match *data {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        let width = u32::from_be_bytes([w0, w1, w2, w3]);
        let height = u32::from_be_bytes([h0, h1, h2, h3]);
        if width == 0 || height == 0 {
          return Err(PngError::WidthOrHeightZero);
        }
        let color_type = PngColorType::try_from(color_type)?;
        if !color_type.allows_bit_depth(bit_depth) {
          return Err(PngError::InvalidBitDepth(bit_depth));
        }
        Ok(Self {
          width,
          height,
          bit_depth,
          color_type,
          compression_method,
          filter_method,
          interlace_method,
        })
      }
      _ => Err(PngError::MalformedChunk),
    }
  }
}
impl IHDR {
  /// Samples (channels) per pixel.
  #[inline]
  #[must_use]
  pub const fn samples_per_pixel(&self) -> usize {
    self.color_type.channel_count()
  }

  /// Bits per pixel, all channels combined.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.samples_per_pixel()
  }

  /// Bytes per pixel, rounded up.
  ///
  /// This is the distance that the filters look "to the left". When the bit
  /// depth is less than 8 this is 1, even though several pixels share a byte.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(&self) -> usize {
    (self.bits_per_pixel() + 7) / 8
  }

  /// If the image is stored interlaced.
  ///
  /// please don't make new interlaced images, they're terrible.
  #[inline]
  #[must_use]
  pub const fn is_interlaced(&self) -> bool {
    self.interlace_method != 0
  }

  /// Bytes of sample data in one scanline, not counting the filter byte.
  ///
  /// Pixels less than 8 bits can end up with a partial byte on the end of a
  /// line, so this rounds up.
  #[inline]
  pub fn bytes_per_scanline(&self) -> PngResult<usize> {
    let bits_per_line =
      self.bits_per_pixel().checked_mul(usize::try_from(self.width)?).ok_or(PngError::CheckedMath)?;
    Ok(bits_per_line / 8 + usize::from(bits_per_line % 8 != 0))
  }

  /// Bytes that the decompressed (still filtered) data of a non-interlaced
  /// image needs: every scanline plus its filter byte.
  #[inline]
  pub fn filtered_data_len(&self) -> PngResult<usize> {
    let bytes_per_filterline =
      self.bytes_per_scanline()?.checked_add(1).ok_or(PngError::CheckedMath)?;
    bytes_per_filterline.checked_mul(usize::try_from(self.height)?).ok_or(PngError::CheckedMath)
  }

  /// Checks that this header describes an image the decoder can turn into
  /// pixels.
  ///
  /// The header can be perfectly legal PNG and still fail this.
  pub fn check_decodable(&self) -> PngResult<()> {
    if self.compression_method != 0 {
      return Err(PngError::UnsupportedCompression(self.compression_method));
    }
    if self.filter_method != 0 {
      return Err(PngError::UnsupportedFilterMethod(self.filter_method));
    }
    if self.is_interlaced() {
      return Err(PngError::UnsupportedInterlace);
    }
    if self.bit_depth < 8 {
      return Err(PngError::UnsupportedBitDepth(self.bit_depth));
    }
    Ok(())
  }
}

#[cfg(test)]
fn ihdr_bytes(width: u32, height: u32, bit_depth: u8, color_type: u8) -> [u8; 13] {
  let mut out = [0_u8; 13];
  out[0..4].copy_from_slice(&width.to_be_bytes());
  out[4..8].copy_from_slice(&height.to_be_bytes());
  out[8] = bit_depth;
  out[9] = color_type;
  out
}

#[test]
fn test_ihdr_parse_and_derived_sizes() {
  let ihdr = IHDR::try_from(&ihdr_bytes(5, 3, 8, 2)[..]).unwrap();
  assert_eq!((ihdr.width, ihdr.height), (5, 3));
  assert_eq!(ihdr.color_type, PngColorType::RGB);
  assert_eq!(ihdr.samples_per_pixel(), 3);
  assert_eq!(ihdr.bits_per_pixel(), 24);
  assert_eq!(ihdr.bytes_per_pixel(), 3);
  assert_eq!(ihdr.bytes_per_scanline(), Ok(15));
  assert_eq!(ihdr.filtered_data_len(), Ok(16 * 3));
  assert_eq!(ihdr.check_decodable(), Ok(()));

  let ihdr = IHDR::try_from(&ihdr_bytes(2, 2, 16, 6)[..]).unwrap();
  assert_eq!(ihdr.bytes_per_pixel(), 8);
  assert_eq!(ihdr.filtered_data_len(), Ok(2 * 17));

  // sub-byte depths round up
  let ihdr = IHDR::try_from(&ihdr_bytes(3, 1, 1, 0)[..]).unwrap();
  assert_eq!(ihdr.bytes_per_pixel(), 1);
  assert_eq!(ihdr.bytes_per_scanline(), Ok(1));
  assert_eq!(ihdr.check_decodable(), Err(PngError::UnsupportedBitDepth(1)));
}

#[test]
fn test_ihdr_rejections() {
  assert_eq!(IHDR::try_from(&ihdr_bytes(1, 1, 8, 2)[..12]), Err(PngError::MalformedChunk));
  assert_eq!(IHDR::try_from(&ihdr_bytes(0, 1, 8, 2)[..]), Err(PngError::WidthOrHeightZero));
  assert_eq!(IHDR::try_from(&ihdr_bytes(1, 0, 8, 2)[..]), Err(PngError::WidthOrHeightZero));
  assert_eq!(IHDR::try_from(&ihdr_bytes(1, 1, 8, 7)[..]), Err(PngError::InvalidColorType(7)));
  assert_eq!(IHDR::try_from(&ihdr_bytes(1, 1, 4, 6)[..]), Err(PngError::InvalidBitDepth(4)));
  assert_eq!(IHDR::try_from(&ihdr_bytes(1, 1, 3, 0)[..]), Err(PngError::InvalidBitDepth(3)));

  let mut bytes = ihdr_bytes(1, 1, 8, 0);
  bytes[10] = 1;
  let ihdr = IHDR::try_from(&bytes[..]).unwrap();
  assert_eq!(ihdr.check_decodable(), Err(PngError::UnsupportedCompression(1)));
  let mut bytes = ihdr_bytes(1, 1, 8, 0);
  bytes[11] = 2;
  let ihdr = IHDR::try_from(&bytes[..]).unwrap();
  assert_eq!(ihdr.check_decodable(), Err(PngError::UnsupportedFilterMethod(2)));
  let mut bytes = ihdr_bytes(1, 1, 8, 0);
  bytes[12] = 1;
  let ihdr = IHDR::try_from(&bytes[..]).unwrap();
  assert_eq!(ihdr.check_decodable(), Err(PngError::UnsupportedInterlace));
}
