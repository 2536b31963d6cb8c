use super::*;

/// The per-scanline filter types.
///
/// Before compression each scanline of a PNG has one of these applied to make
/// it more compressible. Each line's filter is stored as the first byte of
/// that line in the decompressed data.
///
/// For all filters, the "left" byte `a` is the byte one *pixel* to the left
/// (which is [`IHDR::bytes_per_pixel`] bytes back), "up" `b` is the byte in the
/// same position on the previous line, and "up left" `c` is the left byte of
/// the previous line. Anything outside the image counts as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  /// The byte is unaltered.
  None = 0,
  /// The byte is stored as the difference from `a`.
  Sub = 1,
  /// The byte is stored as the difference from `b`.
  Up = 2,
  /// The byte is stored as the difference from the average of `a` and `b`.
  Average = 3,
  /// The byte is stored as the difference from the [`paeth_predict`] of `a`,
  /// `b`, and `c`.
  Paeth = 4,
}
impl TryFrom<u8> for FilterType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      other => return Err(PngError::UnknownFilterType(other)),
    })
  }
}

/// The Paeth predictor: picks whichever of `a` (left), `b` (up), or `c` (up
/// left) is closest to `a + b - c`.
#[inline]
#[must_use]
pub const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The order of these tests is fixed by the PNG standard. Reordering them
  // changes which neighbor wins a tie, and so changes the output.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reverses the filter on a single line of sample bytes, in place.
///
/// * `line` is the line's bytes *without* the leading filter type byte.
/// * `prev` is the already unfiltered previous line. Pass an empty slice for
///   the first line of an image and it will act as a line of all 0.
/// * `bytes_per_pixel` is the left-neighbor distance, see
///   [`IHDR::bytes_per_pixel`].
///
/// Everything is done left to right, so `a` and `c` are always read after
/// they've been unfiltered.
pub fn unfilter_line(filter: FilterType, bytes_per_pixel: usize, prev: &[u8], line: &mut [u8]) {
  let bpp = bytes_per_pixel.max(1);
  let up = |i: usize| prev.get(i).copied().unwrap_or(0);
  match filter {
    FilterType::None => (),
    FilterType::Sub => {
      for i in bpp..line.len() {
        line[i] = line[i].wrapping_add(line[i - bpp]);
      }
    }
    FilterType::Up => {
      line.iter_mut().zip(prev.iter().copied()).for_each(|(x, b)| *x = x.wrapping_add(b));
    }
    FilterType::Average => {
      // the first pixel has no `a`, so only half of `b` is added.
      for i in 0..line.len().min(bpp) {
        line[i] = line[i].wrapping_add(up(i) / 2);
      }
      for i in bpp..line.len() {
        let a = u32::from(line[i - bpp]);
        let b = u32::from(up(i));
        line[i] = line[i].wrapping_add(((a + b) / 2) as u8);
      }
    }
    FilterType::Paeth => {
      // with `a` and `c` both 0, the predictor always picks `b`.
      for i in 0..line.len().min(bpp) {
        line[i] = line[i].wrapping_add(up(i));
      }
      for i in bpp..line.len() {
        line[i] = line[i].wrapping_add(paeth_predict(line[i - bpp], up(i), up(i - bpp)));
      }
    }
  }
}

/// Unfilters all of the decompressed data of a (non-interlaced) image.
///
/// * `filtered` is the zlib-decompressed image data: `height` lines, each with
///   a filter type byte and then `width * bytes_per_pixel` sample bytes. Any
///   extra bytes beyond that are ignored.
/// * The output has the filter type bytes removed, so it's exactly `height`
///   lines of `width * bytes_per_pixel` bytes.
///
/// ## Failure
/// * [`NotEnoughImageData`](PngError::NotEnoughImageData) if `filtered` is too
///   short.
/// * [`UnknownFilterType`](PngError::UnknownFilterType) on the first line that
///   has an invalid filter type. No output is produced.
#[cfg(feature = "alloc")]
pub fn unfilter_image(
  filtered: &[u8], width: u32, height: u32, bytes_per_pixel: usize,
) -> PngResult<Vec<u8>> {
  let stride = usize::try_from(width)?.checked_mul(bytes_per_pixel).ok_or(PngError::CheckedMath)?;
  let bytes_per_filterline = stride.checked_add(1).ok_or(PngError::CheckedMath)?;
  let line_count = usize::try_from(height)?;
  let expected = bytes_per_filterline.checked_mul(line_count).ok_or(PngError::CheckedMath)?;
  if filtered.len() < expected {
    return Err(PngError::NotEnoughImageData { expected, actual: filtered.len() });
  }
  if filtered.len() > expected {
    warn!("ignoring {} bytes of image data past the last scanline", filtered.len() - expected);
  }

  let mut out: Vec<u8> = Vec::new();
  out.try_reserve_exact(stride * line_count)?;
  for (y, filterline) in filtered[..expected].chunks_exact(bytes_per_filterline).enumerate() {
    let (filter_byte, samples) = filterline.split_at(1);
    let filter = FilterType::try_from(filter_byte[0])?;
    let start = out.len();
    out.extend_from_slice(samples);
    let (done, line) = out.split_at_mut(start);
    let prev: &[u8] = if y == 0 { &[] } else { &done[start - stride..] };
    unfilter_line(filter, bytes_per_pixel, prev, line);
  }
  trace!("unfiltered {line_count} lines of {stride} bytes");
  Ok(out)
}

/// The encoder side of [`unfilter_line`], for building test data.
#[cfg(all(test, feature = "alloc"))]
pub(crate) fn filter_line(
  filter: FilterType, bytes_per_pixel: usize, prev: &[u8], raw: &[u8],
) -> Vec<u8> {
  let a = |i: usize| if i >= bytes_per_pixel { raw[i - bytes_per_pixel] } else { 0 };
  let b = |i: usize| prev.get(i).copied().unwrap_or(0);
  let c = |i: usize| if i >= bytes_per_pixel { b(i - bytes_per_pixel) } else { 0 };
  (0..raw.len())
    .map(|i| {
      let predicted = match filter {
        FilterType::None => 0,
        FilterType::Sub => a(i),
        FilterType::Up => b(i),
        FilterType::Average => ((u32::from(a(i)) + u32::from(b(i))) / 2) as u8,
        FilterType::Paeth => paeth_predict(a(i), b(i), c(i)),
      };
      raw[i].wrapping_sub(predicted)
    })
    .collect()
}

#[test]
fn test_paeth_predict() {
  for x in 0..=u8::MAX {
    assert_eq!(paeth_predict(x, x, x), x);
  }
  // ties go to `a` first, then `b`
  assert_eq!(paeth_predict(10, 10, 0), 10);
  assert_eq!(paeth_predict(0, 10, 0), 10);
  assert_eq!(paeth_predict(10, 0, 0), 10);
  // p = 100 + 20 - 90 = 30, closest is `b`
  assert_eq!(paeth_predict(100, 20, 90), 20);
  // p = 20 + 25 - 30 = 15, pa = 5, pb = 10, pc = 15
  assert_eq!(paeth_predict(20, 25, 30), 20);
  // p = 0 + 255 - 255 = 0, pa = 0
  assert_eq!(paeth_predict(0, 255, 255), 0);
  // p = 50 + 60 - 200 = -90, pa = 140, pb = 150, pc = 290
  assert_eq!(paeth_predict(50, 60, 200), 50);
  // p = 200 + 10 - 100 = 110, pa = 90, pb = 100, pc = 10
  assert_eq!(paeth_predict(200, 10, 100), 100);
}

#[test]
fn test_filter_type_from_byte() {
  assert_eq!(FilterType::try_from(0), Ok(FilterType::None));
  assert_eq!(FilterType::try_from(4), Ok(FilterType::Paeth));
  assert_eq!(FilterType::try_from(5), Err(PngError::UnknownFilterType(5)));
  assert_eq!(FilterType::try_from(255), Err(PngError::UnknownFilterType(255)));
}

#[test]
#[cfg(feature = "alloc")]
fn test_unfilter_line_reverses_each_filter() {
  let prev: [u8; 12] = [3, 250, 17, 0, 128, 9, 200, 201, 202, 1, 2, 255];
  let raw: [u8; 12] = [255, 0, 77, 140, 3, 99, 254, 12, 13, 250, 251, 6];
  for filter in
    [FilterType::None, FilterType::Sub, FilterType::Up, FilterType::Average, FilterType::Paeth]
  {
    for bpp in [1, 3, 4] {
      let mut line = filter_line(filter, bpp, &prev, &raw);
      unfilter_line(filter, bpp, &prev, &mut line);
      assert_eq!(line, raw, "{filter:?} with {bpp} bytes per pixel");

      // and again as a first line, with the implied zero line above
      let mut line = filter_line(filter, bpp, &[], &raw);
      unfilter_line(filter, bpp, &[], &mut line);
      assert_eq!(line, raw, "{filter:?} first line with {bpp} bytes per pixel");
    }
  }
}

#[test]
fn test_unfilter_line_wraps() {
  // Sub: 200 + 100 wraps to 44
  let mut line = [200_u8, 100];
  unfilter_line(FilterType::Sub, 1, &[], &mut line);
  assert_eq!(line, [200, 44]);
  // Average: the sum of a and b is not truncated before halving
  let mut line = [0_u8, 10];
  unfilter_line(FilterType::Average, 1, &[255, 255], &mut line);
  assert_eq!(line, [127, 10 + 191]);
  // Up: 255 + 2 wraps to 1
  let mut line = [2_u8];
  unfilter_line(FilterType::Up, 1, &[255], &mut line);
  assert_eq!(line, [1]);
}

#[test]
#[cfg(feature = "alloc")]
fn test_unfilter_image_up_on_first_row() {
  // one row, Up filter, nothing above: the samples come out as-is
  let filtered = [2_u8, 5, 6, 7, 8, 9, 10];
  assert_eq!(unfilter_image(&filtered, 2, 1, 3).unwrap(), alloc::vec![5, 6, 7, 8, 9, 10]);
}

#[test]
#[cfg(feature = "alloc")]
fn test_unfilter_image_multi_row() {
  // 2x3, one byte per pixel, a different filter each row
  let filtered = [
    1, 10, 5, // Sub: 10, 15
    2, 1, 1, // Up: 11, 16
    4, 1, 1, // Paeth: 12, then paeth(12, 16, 11) = 16 (p=17, pa=5, pb=1) + 1 = 17
  ];
  let out = unfilter_image(&filtered, 2, 3, 1).unwrap();
  assert_eq!(out, alloc::vec![10, 15, 11, 16, 12, 17]);
}

#[test]
#[cfg(feature = "alloc")]
fn test_unfilter_image_errors() {
  assert_eq!(
    unfilter_image(&[0, 1, 2, 0, 1], 2, 2, 1),
    Err(PngError::NotEnoughImageData { expected: 6, actual: 5 })
  );
  assert_eq!(unfilter_image(&[0, 1, 2, 9, 1, 2], 2, 2, 1), Err(PngError::UnknownFilterType(9)));
  // extra trailing bytes are fine
  assert_eq!(unfilter_image(&[0, 1, 2, 0xFF, 0xFF], 2, 1, 1), Ok(alloc::vec![1, 2]));
}
