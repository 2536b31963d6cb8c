use super::*;

/// The 4 byte ASCII tag naming a chunk's type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PngChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl PngChunkType {
  /// Image header
  pub const IHDR: Self = Self(*b"IHDR");
  /// Palette
  pub const PLTE: Self = Self(*b"PLTE");
  /// Image data
  pub const IDAT: Self = Self(*b"IDAT");
  /// Image end
  pub const IEND: Self = Self(*b"IEND");
  /// Transparency
  pub const tRNS: Self = Self(*b"tRNS");

  /// Critical chunks have an uppercase first letter (bit 5 clear).
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.0[0] & 0b0010_0000) == 0
  }
}
impl Debug for PngChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    for ch in self.0.iter().copied().map(|u| u as char) {
      f.write_char(ch)?;
    }
    Ok(())
  }
}

/// An unparsed chunk from a PNG.
///
/// The payload is borrowed from the input bytes. The length field isn't
/// stored separately, it's always `data().len()`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PngRawChunk<'b> {
  chunk_type: PngChunkType,
  data: &'b [u8],
  declared_crc: u32,
}
impl Debug for PngRawChunk<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("PngRawChunk")
      .field("chunk_type", &self.chunk_type)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl<'b> PngRawChunk<'b> {
  /// The chunk's type tag.
  #[inline]
  #[must_use]
  pub const fn chunk_type(&self) -> PngChunkType {
    self.chunk_type
  }
  /// The chunk's payload.
  #[inline]
  #[must_use]
  pub const fn data(&self) -> &'b [u8] {
    self.data
  }
  /// The CRC value written in the data stream.
  #[inline]
  #[must_use]
  pub const fn declared_crc(&self) -> u32 {
    self.declared_crc
  }
  /// Computes the CRC that the chunk *should* have.
  #[inline]
  #[must_use]
  pub fn compute_crc(&self) -> u32 {
    png_chunk_crc(self.chunk_type.0, self.data)
  }
  /// Checks the declared CRC against the computed one.
  #[inline]
  #[must_use]
  pub fn crc_is_valid(&self) -> bool {
    self.declared_crc == self.compute_crc()
  }

  /// Splits one chunk off the front of `bytes`, or `None` if any part of the
  /// chunk is missing.
  fn split_off(bytes: &'b [u8]) -> Option<(Self, &'b [u8])> {
    let chunk_len = usize::try_from(u32_be(bytes)?).ok()?;
    let (type_bytes, rest) = try_split_off_byte_array::<4>(&bytes[4..])?;
    if rest.len() < chunk_len {
      return None;
    }
    let (data, rest) = rest.split_at(chunk_len);
    let declared_crc = u32_be(rest)?;
    let chunk = Self { chunk_type: PngChunkType(type_bytes), data, declared_crc };
    Some((chunk, &rest[4..]))
  }
}

/// An iterator that produces successive raw chunks from PNG bytes.
///
/// * The iterator stops after it produces an `IEND` chunk, even if there's
///   more data after that.
/// * If the bytes run out cleanly between two chunks, the iterator just stops.
///   Check [`saw_end`](Self::saw_end) afterwards if you care that the `IEND`
///   was actually present.
/// * If the bytes run out in the *middle* of a chunk, the iterator produces
///   one [`PngError::MalformedChunk`] and then stops.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PngRawChunkIter<'b> {
  bytes: &'b [u8],
  saw_end: bool,
}
impl<'b> PngRawChunkIter<'b> {
  /// Makes an iterator over bytes that start immediately *after* the PNG
  /// signature.
  #[inline]
  #[must_use]
  pub const fn new(chunk_bytes: &'b [u8]) -> Self {
    Self { bytes: chunk_bytes, saw_end: false }
  }

  /// Pass the full PNG bytes, it will remove the PNG signature automatically.
  ///
  /// The signature bytes are skipped whether or not they're correct, use
  /// [`is_png_header_correct`] if you want to check them.
  #[inline]
  #[must_use]
  pub const fn from_png_bytes(bytes: &'b [u8]) -> Self {
    match bytes {
      [_, _, _, _, _, _, _, _, rest @ ..] => Self::new(rest),
      _ => Self::new(&[]),
    }
  }

  /// If the iterator has produced an `IEND` chunk.
  #[inline]
  #[must_use]
  pub const fn saw_end(&self) -> bool {
    self.saw_end
  }
}
impl<'b> Iterator for PngRawChunkIter<'b> {
  type Item = PngResult<PngRawChunk<'b>>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.saw_end || self.bytes.is_empty() {
      return None;
    }
    match PngRawChunk::split_off(self.bytes) {
      Some((chunk, rest)) => {
        self.bytes = rest;
        self.saw_end = chunk.chunk_type == PngChunkType::IEND;
        Some(Ok(chunk))
      }
      None => {
        self.bytes = &[];
        Some(Err(PngError::MalformedChunk))
      }
    }
  }
}

#[test]
fn test_raw_chunk_iter_framing() {
  let bytes: &[u8] = &[
    0, 0, 0, 2, b'a', b'b', b'C', b'd', 7, 8, 1, 2, 3, 4, // abCd chunk
    0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82, // IEND
    9, 9, 9, // ignored after IEND
  ];
  let mut it = PngRawChunkIter::new(bytes);
  let first = it.next().unwrap().unwrap();
  assert_eq!(first.chunk_type(), PngChunkType(*b"abCd"));
  assert!(!first.chunk_type().is_critical());
  assert_eq!(first.data(), &[7, 8]);
  assert_eq!(first.declared_crc(), 0x0102_0304);
  assert!(!it.saw_end());
  let end = it.next().unwrap().unwrap();
  assert_eq!(end.chunk_type(), PngChunkType::IEND);
  assert!(end.chunk_type().is_critical());
  assert!(end.crc_is_valid());
  assert!(it.saw_end());
  assert!(it.next().is_none());
}

#[test]
fn test_raw_chunk_iter_truncation() {
  // declares 10 bytes of data but only has 3
  let bytes: &[u8] = &[0, 0, 0, 10, b'I', b'D', b'A', b'T', 1, 2, 3];
  let mut it = PngRawChunkIter::new(bytes);
  assert_eq!(it.next(), Some(Err(PngError::MalformedChunk)));
  assert_eq!(it.next(), None);

  // a partial length field is also malformed
  let mut it = PngRawChunkIter::new(&[0, 0]);
  assert_eq!(it.next(), Some(Err(PngError::MalformedChunk)));

  // data is all there but the CRC is cut short
  let mut it = PngRawChunkIter::new(&[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE]);
  assert_eq!(it.next(), Some(Err(PngError::MalformedChunk)));
  assert!(!it.saw_end());

  // nothing at all is just the end of the chunks
  assert_eq!(PngRawChunkIter::new(&[]).next(), None);
}
