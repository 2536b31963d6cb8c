use rgbapng::{png::*, Bitmap, PngError, RGBA8};
use walkdir::WalkDir;

#[test]
fn test_PngRawChunkIter_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    for _ in PngRawChunkIter::from_png_bytes(&v) {
      //
    }
    let _ = decode_png(&v);
  }
  // even totally random data should never panic the iterator!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    for _ in PngRawChunkIter::new(&v) {
      //
    }
    let mut png = PNG_SIGNATURE.to_vec();
    png.extend_from_slice(&v);
    let _ = decode_png(&png);
  }
}

fn adler32(data: &[u8]) -> u32 {
  let (mut a, mut b) = (1_u32, 0_u32);
  for &byte in data {
    a = (a + u32::from(byte)) % 65521;
    b = (b + a) % 65521;
  }
  (b << 16) | a
}

/// A zlib stream made of stored (uncompressed) DEFLATE blocks.
fn zlib_stored(data: &[u8]) -> Vec<u8> {
  let mut out = vec![0x78, 0x01];
  if data.is_empty() {
    out.extend_from_slice(&[1, 0, 0, 0xFF, 0xFF]);
  }
  let mut blocks = data.chunks(u16::MAX as usize).peekable();
  while let Some(block) = blocks.next() {
    let is_final = blocks.peek().is_none();
    out.push(u8::from(is_final));
    let len = block.len() as u16;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(block);
  }
  out.extend_from_slice(&adler32(data).to_be_bytes());
  out
}

struct PngBuilder {
  bytes: Vec<u8>,
}
impl PngBuilder {
  fn new() -> Self {
    Self { bytes: PNG_SIGNATURE.to_vec() }
  }
  fn chunk(mut self, chunk_type: &[u8; 4], data: &[u8]) -> Self {
    self.bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
    self.bytes.extend_from_slice(chunk_type);
    self.bytes.extend_from_slice(data);
    self.bytes.extend_from_slice(&png_chunk_crc(*chunk_type, data).to_be_bytes());
    self
  }
  fn ihdr(self, width: u32, height: u32, bit_depth: u8, color_type: u8) -> Self {
    self.ihdr_interlaced(width, height, bit_depth, color_type, 0)
  }
  fn ihdr_interlaced(
    self, width: u32, height: u32, bit_depth: u8, color_type: u8, interlace: u8,
  ) -> Self {
    let mut data = Vec::new();
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[bit_depth, color_type, 0, 0, interlace]);
    self.chunk(b"IHDR", &data)
  }
  /// One `IDAT` holding the zlib stream of `filtered`.
  fn idat(self, filtered: &[u8]) -> Self {
    self.chunk(b"IDAT", &zlib_stored(filtered))
  }
  fn iend(self) -> Vec<u8> {
    self.chunk(b"IEND", &[]).bytes
  }
}

/// Puts a filter type byte of 0 (None) in front of each row.
fn unfiltered_rows(rows: &[&[u8]]) -> Vec<u8> {
  let mut out = Vec::new();
  for row in rows {
    out.push(0);
    out.extend_from_slice(row);
  }
  out
}

/// Applies the given filter to each row, the way an encoder would.
fn filter_rows(rows: &[Vec<u8>], filters: &[u8], bpp: usize) -> Vec<u8> {
  let mut out = Vec::new();
  let zero_row = vec![0; rows[0].len()];
  for (y, (row, &filter)) in rows.iter().zip(filters).enumerate() {
    let prev = if y == 0 { &zero_row } else { &rows[y - 1] };
    let a = |i: usize| if i >= bpp { row[i - bpp] } else { 0 };
    let b = |i: usize| prev[i];
    let c = |i: usize| if i >= bpp { prev[i - bpp] } else { 0 };
    out.push(filter);
    for i in 0..row.len() {
      let predicted = match filter {
        0 => 0,
        1 => a(i),
        2 => b(i),
        3 => ((u16::from(a(i)) + u16::from(b(i))) / 2) as u8,
        4 => paeth_predict(a(i), b(i), c(i)),
        _ => unreachable!(),
      };
      out.push(row[i].wrapping_sub(predicted));
    }
  }
  out
}

#[test]
fn test_decode_all_zero_rgb() {
  let png = PngBuilder::new()
    .ihdr(2, 2, 8, 2)
    .idat(&unfiltered_rows(&[&[0; 6], &[0; 6]]))
    .iend();
  let bitmap = decode_png(&png).unwrap();
  assert_eq!((bitmap.width, bitmap.height), (2, 2));
  assert_eq!(bitmap.pixels, vec![RGBA8 { r: 0, g: 0, b: 0, a: 255 }; 4]);
}

#[test]
fn test_decode_every_color_type() {
  let (w, h) = (3_u32, 2_u32);
  // (color type, bytes per pixel, expected first pixel for sample bytes 1,2,3,4)
  let cases: [(u8, usize, RGBA8); 5] = [
    (0, 1, RGBA8 { r: 1, g: 1, b: 1, a: 255 }),
    (2, 3, RGBA8 { r: 1, g: 2, b: 3, a: 255 }),
    (3, 1, RGBA8 { r: 10, g: 20, b: 30, a: 255 }),
    (4, 2, RGBA8 { r: 1, g: 1, b: 1, a: 2 }),
    (6, 4, RGBA8 { r: 1, g: 2, b: 3, a: 4 }),
  ];
  for (color_type, bpp, first) in cases {
    let row: Vec<u8> = (1..=(w as usize * bpp) as u8).collect();
    let mut builder = PngBuilder::new().ihdr(w, h, 8, color_type);
    if color_type == 3 {
      let palette: Vec<u8> = (0..=6).flat_map(|i| [i * 10, i * 10 + 10, i * 10 + 20]).collect();
      builder = builder.chunk(b"PLTE", &palette);
    }
    let png = builder.idat(&unfiltered_rows(&[&row[..], &row[..]])).iend();
    let bitmap = decode_png(&png).unwrap_or_else(|e| panic!("color type {color_type}: {e}"));
    assert_eq!(bitmap.pixels.len(), (w * h) as usize, "color type {color_type}");
    assert_eq!(bitmap.pixels[0], first, "color type {color_type}");
    assert_eq!(bitmap.pixels[..3], bitmap.pixels[3..], "color type {color_type}");
  }
}

#[test]
fn test_decode_each_filter_type() {
  // 3x5 RGBA, every row uses a different filter
  let rows: Vec<Vec<u8>> = (0..5_u8)
    .map(|y| {
      (0..12_u8).map(|i| i.wrapping_mul(37).wrapping_add(y.wrapping_mul(91)) ^ 0x5A).collect()
    })
    .collect();
  let filtered = filter_rows(&rows, &[0, 1, 2, 3, 4], 4);
  let png = PngBuilder::new().ihdr(3, 5, 8, 6).idat(&filtered).iend();
  let bitmap = decode_png(&png).unwrap();
  let expected: Vec<RGBA8> = rows
    .iter()
    .flat_map(|row| row.chunks_exact(4).map(|p| RGBA8 { r: p[0], g: p[1], b: p[2], a: p[3] }))
    .collect();
  assert_eq!(bitmap.pixels, expected);

  // and again, starting with the filters that look at the row above
  let filtered = filter_rows(&rows, &[4, 3, 2, 1, 0], 4);
  let png = PngBuilder::new().ihdr(3, 5, 8, 6).idat(&filtered).iend();
  assert_eq!(decode_png(&png).unwrap().pixels, expected);
}

#[test]
fn test_decode_up_filter_single_row() {
  let png = PngBuilder::new().ihdr(2, 1, 8, 0).idat(&[2, 40, 41]).iend();
  let bitmap = decode_png(&png).unwrap();
  assert_eq!(bitmap.pixels, vec![RGBA8::grey(40, 255), RGBA8::grey(41, 255)]);
}

#[test]
fn test_decode_split_idat() {
  let zlib = zlib_stored(&unfiltered_rows(&[&[7, 8, 9]]));
  let (first, second) = zlib.split_at(5);
  let png = PngBuilder::new()
    .ihdr(1, 1, 8, 2)
    .chunk(b"IDAT", first)
    .chunk(b"tEXt", b"Title\0split")
    .chunk(b"IDAT", second)
    .iend();
  assert_eq!(decode_png(&png).unwrap().pixels, vec![RGBA8 { r: 7, g: 8, b: 9, a: 255 }]);
}

#[test]
fn test_decode_sixteen_bit_and_color_key() {
  let row: [u8; 4] = [0x12, 0x34, 0xAB, 0xCD];
  let png = PngBuilder::new()
    .ihdr(2, 1, 16, 0)
    .chunk(b"tRNS", &[0x12, 0x34])
    .idat(&unfiltered_rows(&[&row]))
    .iend();
  let bitmap = decode_png(&png).unwrap();
  assert_eq!(bitmap.pixels, vec![RGBA8::grey(0x12, 0), RGBA8::grey(0xAB, 255)]);
}

#[test]
fn test_decode_indexed_transparency() {
  let png = PngBuilder::new()
    .ihdr(2, 1, 8, 3)
    .chunk(b"PLTE", &[1, 2, 3, 4, 5, 6])
    .chunk(b"tRNS", &[0])
    .idat(&unfiltered_rows(&[&[0, 1]]))
    .iend();
  let bitmap = Bitmap::<RGBA8>::try_from_png_bytes(&png).unwrap();
  assert_eq!(
    bitmap.pixels,
    vec![RGBA8 { r: 1, g: 2, b: 3, a: 0 }, RGBA8 { r: 4, g: 5, b: 6, a: 255 }]
  );
  assert_eq!(bitmap.get(1, 0), Some(&RGBA8 { r: 4, g: 5, b: 6, a: 255 }));
}

#[test]
fn test_decode_errors() {
  assert_eq!(decode_png(b"GIF89a"), Err(PngError::BadSignature));

  let idat_first = PngBuilder::new()
    .idat(&unfiltered_rows(&[&[0]]))
    .ihdr(1, 1, 8, 0)
    .iend();
  assert_eq!(decode_png(&idat_first), Err(PngError::MissingHeader));

  let no_palette = PngBuilder::new().ihdr(1, 1, 8, 3).idat(&unfiltered_rows(&[&[0]])).iend();
  assert_eq!(decode_png(&no_palette), Err(PngError::MissingPalette));

  let bad_index = PngBuilder::new()
    .ihdr(1, 1, 8, 3)
    .chunk(b"PLTE", &[9, 9, 9])
    .idat(&unfiltered_rows(&[&[5]]))
    .iend();
  assert_eq!(decode_png(&bad_index), Err(PngError::InvalidPaletteIndex { index: 5, palette_len: 1 }));

  let mut truncated = PngBuilder::new().ihdr(1, 1, 8, 0).idat(&unfiltered_rows(&[&[0]])).iend();
  truncated.truncate(truncated.len() - 14);
  assert_eq!(decode_png(&truncated), Err(PngError::MalformedChunk));

  let not_zlib = PngBuilder::new().ihdr(1, 1, 8, 0).chunk(b"IDAT", &[0x12, 0x34, 0, 0]).iend();
  assert_eq!(decode_png(&not_zlib), Err(PngError::DecompressionError));

  let bad_filter = PngBuilder::new().ihdr(1, 1, 8, 0).idat(&[7, 0]).iend();
  assert_eq!(decode_png(&bad_filter), Err(PngError::UnknownFilterType(7)));

  let short = PngBuilder::new().ihdr(2, 2, 8, 0).idat(&[0, 1, 2]).iend();
  assert_eq!(decode_png(&short), Err(PngError::NotEnoughImageData { expected: 6, actual: 3 }));

  let sub_byte = PngBuilder::new().ihdr(8, 1, 1, 0).idat(&[0, 0xFF]).iend();
  assert_eq!(decode_png(&sub_byte), Err(PngError::UnsupportedBitDepth(1)));

  let interlaced = PngBuilder::new().ihdr_interlaced(1, 1, 8, 0, 1).idat(&[0, 0]).iend();
  assert_eq!(decode_png(&interlaced), Err(PngError::UnsupportedInterlace));

  let bad_depth = PngBuilder::new().ihdr(1, 1, 4, 2).idat(&[0, 0]).iend();
  assert_eq!(decode_png(&bad_depth), Err(PngError::InvalidBitDepth(4)));

  let bad_color = PngBuilder::new().ihdr(1, 1, 8, 5).idat(&[0, 0]).iend();
  assert_eq!(decode_png(&bad_color), Err(PngError::InvalidColorType(5)));

  let zero_width = PngBuilder::new().ihdr(0, 1, 8, 0).iend();
  assert_eq!(decode_png(&zero_width), Err(PngError::WidthOrHeightZero));
}

#[test]
fn test_strict_options() {
  let good = PngBuilder::new().ihdr(1, 1, 8, 0).idat(&unfiltered_rows(&[&[77]])).iend();
  assert!(decode_png_with_options(&good, DecodeOptions::strict()).is_ok());

  // break the IHDR's CRC
  let mut bad_crc = good.clone();
  bad_crc[8 + 8 + 13] ^= 0x01;
  assert_eq!(decode_png(&bad_crc).unwrap().pixels, vec![RGBA8::grey(77, 255)]);
  assert_eq!(
    decode_png_with_options(&bad_crc, DecodeOptions::strict()),
    Err(PngError::ChunkIntegrity { chunk_type: *b"IHDR" })
  );

  let no_end = good[..good.len() - 12].to_vec();
  assert_eq!(decode_png(&no_end).unwrap().pixels, vec![RGBA8::grey(77, 255)]);
  assert_eq!(
    decode_png_with_options(&no_end, DecodeOptions::strict()),
    Err(PngError::MissingTerminator)
  );
}

#[test]
fn test_staged_decode_matches_decode_png() {
  let png = PngBuilder::new()
    .ihdr(2, 2, 8, 4)
    .idat(&unfiltered_rows(&[&[1, 2, 3, 4], &[5, 6, 7, 8]]))
    .iend();
  let parsed = PngDecoder::new(&png).validate().unwrap().parse_chunks().unwrap();
  assert_eq!(parsed.header().color_type, PngColorType::YA);
  assert_eq!(parsed.header().filtered_data_len(), Ok(10));
  let staged = parsed.parse_data().unwrap();
  assert_eq!(staged, decode_png(&png).unwrap());
  assert_eq!(png_get_header(&png).map(|h| (h.width, h.height)), Some((2, 2)));
}

#[test]
fn test_decode_encoder_made_rgba() {
  // written by zlib at level 9, rows filtered Sub, Paeth, Average
  let png = include_bytes!("fixtures/gradient_rgba8.png");
  let bitmap = decode_png_with_options(png, DecodeOptions::strict()).unwrap();
  assert_eq!((bitmap.width, bitmap.height), (4, 3));
  for y in 0..3_u8 {
    for x in 0..4_u8 {
      let expected = RGBA8 { r: x * 40, g: y * 60, b: (x + y) * 20, a: 255 - x * 10 };
      assert_eq!(bitmap.get(u32::from(x), u32::from(y)), Some(&expected), "pixel {x},{y}");
    }
  }
}

#[test]
fn test_decode_encoder_made_indexed() {
  let png = include_bytes!("fixtures/indexed_trns.png");
  let bitmap = decode_png_with_options(png, DecodeOptions::strict()).unwrap();
  assert_eq!((bitmap.width, bitmap.height), (5, 2));
  let alphas = [0, 128, 255, 255];
  for (y, row) in bitmap.rows().enumerate() {
    for (x, px) in row.iter().enumerate() {
      let i = (x + y) % 4;
      let v = i as u8;
      let expected = RGBA8 { r: v * 50, g: 255 - v * 50, b: v * 20, a: alphas[i] };
      assert_eq!(*px, expected, "pixel {x},{y}");
    }
  }
}

#[test]
fn test_decode_compressed_idat() {
  let rows: Vec<Vec<u8>> = (0..8_u8).map(|y| (0..24_u8).map(|i| i / 3 + y).collect()).collect();
  let filtered = filter_rows(&rows, &[1, 2, 3, 4, 0, 4, 3, 2], 3);
  let zlib = miniz_oxide::deflate::compress_to_vec_zlib(&filtered, 9);
  assert!(zlib.len() < filtered.len());
  let (first, second) = zlib.split_at(zlib.len() / 2);
  let png = PngBuilder::new()
    .ihdr(8, 8, 8, 2)
    .chunk(b"IDAT", first)
    .chunk(b"IDAT", second)
    .iend();
  let bitmap = decode_png_with_options(&png, DecodeOptions::strict()).unwrap();
  let expected: Vec<RGBA8> = rows
    .iter()
    .flat_map(|row| row.chunks_exact(3).map(|p| RGBA8 { r: p[0], g: p[1], b: p[2], a: 255 }))
    .collect();
  assert_eq!(bitmap.pixels, expected);
}

#[test]
fn test_decode_surplus_zlib_output() {
  // one scanline of 2 greyscale pixels, followed by 5000 bytes the image has no room for
  let mut filtered = vec![0, 5, 6];
  filtered.resize(3 + 5000, 0);
  let zlib = miniz_oxide::deflate::compress_to_vec_zlib(&filtered, 6);
  let png = PngBuilder::new().ihdr(2, 1, 8, 0).chunk(b"IDAT", &zlib).iend();
  let expected = vec![RGBA8::grey(5, 255), RGBA8::grey(6, 255)];
  assert_eq!(decode_png(&png).unwrap().pixels, expected);
  assert_eq!(decode_png_with_options(&png, DecodeOptions::strict()).unwrap().pixels, expected);

  // the same thing from a stored block
  let png = PngBuilder::new().ihdr(2, 1, 8, 0).idat(&filtered).iend();
  assert_eq!(decode_png(&png).unwrap().pixels, expected);
}

#[test]
fn test_decode_ignores_bad_palette_when_unused() {
  // a PLTE that isn't whole RGB triples only matters to indexed images
  let rgb = PngBuilder::new()
    .ihdr(1, 1, 8, 2)
    .chunk(b"PLTE", &[1, 2, 3, 4])
    .idat(&unfiltered_rows(&[&[9, 8, 7]]))
    .iend();
  assert_eq!(decode_png(&rgb).unwrap().pixels, vec![RGBA8 { r: 9, g: 8, b: 7, a: 255 }]);

  let indexed = PngBuilder::new()
    .ihdr(1, 1, 8, 3)
    .chunk(b"PLTE", &[1, 2, 3, 4])
    .idat(&unfiltered_rows(&[&[0]]))
    .iend();
  assert_eq!(decode_png(&indexed), Err(PngError::MalformedChunk));
}
