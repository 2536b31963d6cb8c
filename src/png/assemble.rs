use super::*;

/// Turns unfiltered sample bytes into [`RGBA8`] pixels.
///
/// * `decoded` is the output of [`unfilter_image`]: every line of samples with
///   no filter bytes.
/// * `palette` is only used for indexed color, and should already have any
///   transparency merged in (see [`palette_rgba8`]).
/// * `trns` is only used for greyscale and RGB images, where it names a single
///   color that becomes fully transparent. For indexed color pass `None`, the
///   palette already has it.
///
/// 16-bit channels keep only their high byte, but the transparent color check
/// uses the full 16-bit value.
///
/// ## Failure
/// * [`UnsupportedBitDepth`](PngError::UnsupportedBitDepth) for bit depths less
///   than 8.
/// * [`NotEnoughImageData`](PngError::NotEnoughImageData) if `decoded` is too
///   short for the header's dimensions.
/// * [`InvalidPaletteIndex`](PngError::InvalidPaletteIndex) for the first
///   pixel that uses an index past the end of the palette.
pub fn assemble_rgba8(
  header: &IHDR, decoded: &[u8], palette: &[RGBA8], trns: Option<tRNS<'_>>,
) -> PngResult<Vec<RGBA8>> {
  let sample_bytes = match header.bit_depth {
    8 => 1,
    16 => 2,
    other => return Err(PngError::UnsupportedBitDepth(other)),
  };
  let bytes_per_pixel = header.bytes_per_pixel();
  let pixel_count = usize::try_from(header.width)?
    .checked_mul(usize::try_from(header.height)?)
    .ok_or(PngError::CheckedMath)?;
  let expected = pixel_count.checked_mul(bytes_per_pixel).ok_or(PngError::CheckedMath)?;
  if decoded.len() < expected {
    return Err(PngError::NotEnoughImageData { expected, actual: decoded.len() });
  }

  // channel `n` of a pixel, reduced to 8 bits
  let high = |px: &[u8], n: usize| px[n * sample_bytes];
  // channel `n` of a pixel at full precision
  let full = |px: &[u8], n: usize| -> u16 {
    if sample_bytes == 2 {
      u16::from_be_bytes([px[n * 2], px[n * 2 + 1]])
    } else {
      u16::from(px[n])
    }
  };
  let trns_y: Option<u16> = trns.and_then(|t| t.try_to_grayscale());
  let trns_rgb: Option<[u16; 3]> = trns.and_then(|t| t.try_to_rgb());

  let mut pixels: Vec<RGBA8> = Vec::new();
  pixels.try_reserve_exact(pixel_count)?;
  let pixel_data = decoded[..expected].chunks_exact(bytes_per_pixel);
  match header.color_type {
    PngColorType::Y => {
      pixels.extend(pixel_data.map(|px| {
        let a = if trns_y == Some(full(px, 0)) { 0 } else { 255 };
        RGBA8::grey(high(px, 0), a)
      }));
    }
    PngColorType::RGB => {
      pixels.extend(pixel_data.map(|px| {
        let key = [full(px, 0), full(px, 1), full(px, 2)];
        let a = if trns_rgb == Some(key) { 0 } else { 255 };
        RGBA8 { r: high(px, 0), g: high(px, 1), b: high(px, 2), a }
      }));
    }
    PngColorType::Index => {
      for px in pixel_data {
        let index = px[0];
        let color = palette
          .get(usize::from(index))
          .copied()
          .ok_or(PngError::InvalidPaletteIndex { index, palette_len: palette.len() })?;
        pixels.push(color);
      }
    }
    PngColorType::YA => {
      pixels.extend(pixel_data.map(|px| RGBA8::grey(high(px, 0), high(px, 1))));
    }
    PngColorType::RGBA => {
      pixels.extend(pixel_data.map(|px| RGBA8 {
        r: high(px, 0),
        g: high(px, 1),
        b: high(px, 2),
        a: high(px, 3),
      }));
    }
  }
  Ok(pixels)
}

#[cfg(test)]
fn header(width: u32, height: u32, bit_depth: u8, color_type: PngColorType) -> IHDR {
  IHDR {
    width,
    height,
    bit_depth,
    color_type,
    compression_method: 0,
    filter_method: 0,
    interlace_method: 0,
  }
}

#[test]
fn test_assemble_each_color_type() {
  use alloc::vec;

  let y = assemble_rgba8(&header(2, 1, 8, PngColorType::Y), &[0, 200], &[], None).unwrap();
  assert_eq!(y, vec![RGBA8::grey(0, 255), RGBA8::grey(200, 255)]);

  let rgb =
    assemble_rgba8(&header(1, 2, 8, PngColorType::RGB), &[1, 2, 3, 4, 5, 6], &[], None).unwrap();
  assert_eq!(rgb, vec![RGBA8 { r: 1, g: 2, b: 3, a: 255 }, RGBA8 { r: 4, g: 5, b: 6, a: 255 }]);

  let palette = [RGBA8 { r: 9, g: 8, b: 7, a: 6 }, RGBA8 { r: 1, g: 1, b: 1, a: 255 }];
  let index =
    assemble_rgba8(&header(3, 1, 8, PngColorType::Index), &[1, 0, 1], &palette, None).unwrap();
  assert_eq!(index, vec![palette[1], palette[0], palette[1]]);

  let ya = assemble_rgba8(&header(1, 1, 8, PngColorType::YA), &[50, 60], &[], None).unwrap();
  assert_eq!(ya, vec![RGBA8::grey(50, 60)]);

  let rgba =
    assemble_rgba8(&header(1, 1, 8, PngColorType::RGBA), &[10, 20, 30, 40], &[], None).unwrap();
  assert_eq!(rgba, vec![RGBA8 { r: 10, g: 20, b: 30, a: 40 }]);
}

#[test]
fn test_assemble_sixteen_bit_keeps_high_bytes() {
  let data = [0xAB, 0x01, 0xCD, 0x02, 0xEF, 0x03, 0x80, 0xFF];
  let rgba = assemble_rgba8(&header(1, 1, 16, PngColorType::RGBA), &data, &[], None).unwrap();
  assert_eq!(rgba, alloc::vec![RGBA8 { r: 0xAB, g: 0xCD, b: 0xEF, a: 0x80 }]);
}

#[test]
fn test_assemble_color_key_transparency() {
  let trns_y = tRNS::from(&[0_u8, 7][..]);
  let y = assemble_rgba8(&header(3, 1, 8, PngColorType::Y), &[7, 8, 7], &[], Some(trns_y)).unwrap();
  assert_eq!(y.iter().map(|p| p.a).collect::<Vec<_>>(), alloc::vec![0, 255, 0]);

  let trns_rgb = tRNS::from(&[0_u8, 1, 0, 2, 0, 3][..]);
  let rgb = assemble_rgba8(
    &header(2, 1, 8, PngColorType::RGB),
    &[1, 2, 3, 1, 2, 4],
    &[],
    Some(trns_rgb),
  )
  .unwrap();
  assert_eq!((rgb[0].a, rgb[1].a), (0, 255));

  // 16-bit keys compare all 16 bits, not just the high byte
  let trns_y16 = tRNS::from(&[0x12_u8, 0x34][..]);
  let y16 = assemble_rgba8(
    &header(2, 1, 16, PngColorType::Y),
    &[0x12, 0x34, 0x12, 0x35],
    &[],
    Some(trns_y16),
  )
  .unwrap();
  assert_eq!((y16[0], y16[1]), (RGBA8::grey(0x12, 0), RGBA8::grey(0x12, 255)));
}

#[test]
fn test_assemble_errors() {
  let palette = [RGBA8::default(); 2];
  assert_eq!(
    assemble_rgba8(&header(2, 1, 8, PngColorType::Index), &[1, 2], &palette, None),
    Err(PngError::InvalidPaletteIndex { index: 2, palette_len: 2 })
  );
  assert_eq!(
    assemble_rgba8(&header(2, 2, 8, PngColorType::RGB), &[0; 11], &[], None),
    Err(PngError::NotEnoughImageData { expected: 12, actual: 11 })
  );
  assert_eq!(
    assemble_rgba8(&header(8, 1, 1, PngColorType::Y), &[0], &[], None),
    Err(PngError::UnsupportedBitDepth(1))
  );
}
