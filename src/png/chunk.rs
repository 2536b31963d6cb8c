use super::*;

/// A parsed PNG chunk
///
/// Only the chunks that matter for getting flat RGBA pixels out of the image
/// are parsed, everything else is kept raw in [`PngChunk::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(nonstandard_style)]
pub enum PngChunk<'b> {
  /// Image Header
  IHDR(IHDR),
  /// Palette
  PLTE(PLTE<'b>),
  /// Transparency
  tRNS(tRNS<'b>),
  /// Image Data
  ///
  /// * Image data is stored with Zlib compression applied.
  /// * Images can have more than one IDAT chunk. They should all be stored in
  ///   a row. Multiple chunks are treated as a single Zlib datastream.
  IDAT(&'b [u8]),
  /// Image End
  IEND,
  /// Any chunk type that this crate doesn't interpret.
  Other(PngRawChunk<'b>),
}
impl<'b> TryFrom<PngRawChunk<'b>> for PngChunk<'b> {
  type Error = PngError;
  /// Parses the chunk payload according to the chunk type.
  ///
  /// Fails if a known chunk has a payload that doesn't make sense for it.
  /// Unknown chunks never fail.
  #[inline]
  fn try_from(raw: PngRawChunk<'b>) -> Result<Self, Self::Error> {
    Ok(match raw.chunk_type() {
      PngChunkType::IHDR => PngChunk::IHDR(IHDR::try_from(raw.data())?),
      PngChunkType::PLTE => PngChunk::PLTE(PLTE::try_from(raw.data())?),
      PngChunkType::tRNS => PngChunk::tRNS(tRNS::from(raw.data())),
      PngChunkType::IDAT => PngChunk::IDAT(raw.data()),
      PngChunkType::IEND => PngChunk::IEND,
      _ => PngChunk::Other(raw),
    })
  }
}
impl PngChunk<'_> {
  /// Gets the header out of this chunk, if it's a header.
  #[inline]
  #[must_use]
  pub const fn to_ihdr(self) -> Option<IHDR> {
    match self {
      PngChunk::IHDR(ihdr) => Some(ihdr),
      _ => None,
    }
  }
}

/// Gets the [`IHDR`] out of the PNG bytes.
///
/// This is the first `IHDR` that parses, so malformed chunks before it are
/// skipped.
pub fn png_get_header(bytes: &[u8]) -> Option<IHDR> {
  PngRawChunkIter::from_png_bytes(bytes)
    .filter_map(|raw| PngChunk::try_from(raw.ok()?).ok()?.to_ihdr())
    .next()
}

#[test]
fn test_png_chunk_dispatch() {
  let mut bytes: [u8; 4 + 4 + 13 + 4] = [0; 25];
  bytes[3] = 13;
  bytes[4..8].copy_from_slice(b"IHDR");
  bytes[8..12].copy_from_slice(&7_u32.to_be_bytes());
  bytes[12..16].copy_from_slice(&9_u32.to_be_bytes());
  bytes[16] = 8;
  bytes[17] = 4;
  let raw = PngRawChunkIter::new(&bytes).next().unwrap().unwrap();
  let ihdr = PngChunk::try_from(raw).unwrap().to_ihdr().unwrap();
  assert_eq!((ihdr.width, ihdr.height, ihdr.color_type), (7, 9, PngColorType::YA));

  let mut with_sig = [0_u8; 8 + 25];
  with_sig[..8].copy_from_slice(&PNG_SIGNATURE);
  with_sig[8..].copy_from_slice(&bytes);
  assert_eq!(png_get_header(&with_sig), Some(ihdr));

  // an unknown ancillary chunk passes through untouched
  let other: &[u8] = &[0, 0, 0, 1, b't', b'E', b'X', b't', 42, 0, 0, 0, 0];
  let raw = PngRawChunkIter::new(other).next().unwrap().unwrap();
  assert_eq!(PngChunk::try_from(raw), Ok(PngChunk::Other(raw)));

  // a PLTE that isn't whole RGB triples is an error
  let bad_plte: &[u8] = &[0, 0, 0, 2, b'P', b'L', b'T', b'E', 1, 2, 0, 0, 0, 0];
  let raw = PngRawChunkIter::new(bad_plte).next().unwrap().unwrap();
  assert_eq!(PngChunk::try_from(raw), Err(PngError::MalformedChunk));
}
