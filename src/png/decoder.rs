use super::*;

use crate::image::Bitmap;

/// Runtime knobs for the decoder.
///
/// The defaults are lenient, in the spirit of the PNG standard's advice that
/// errors with little effect on the image may be ignored. Use
/// [`DecodeOptions::strict`] to check everything that can be checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
  /// Check each chunk's CRC (and the zlib stream's Adler32, when using
  /// [`ZlibDecompressor`]).
  pub verify_crc: bool,
  /// Fail with [`MissingTerminator`](PngError::MissingTerminator) if the data
  /// ends without an `IEND` chunk.
  pub require_end_chunk: bool,
  /// The largest width or height that will be decoded.
  ///
  /// This stops a tiny file from claiming to be enormous and causing an
  /// out-of-memory problem.
  pub max_dimension: u32,
}
impl Default for DecodeOptions {
  #[inline]
  fn default() -> Self {
    Self { verify_crc: false, require_end_chunk: false, max_dimension: 17_000 }
  }
}
impl DecodeOptions {
  /// Options with every integrity check turned on.
  #[inline]
  #[must_use]
  pub fn strict() -> Self {
    Self { verify_crc: true, require_end_chunk: true, ..Self::default() }
  }
}

/// Something that can decompress the zlib stream of a PNG's image data.
pub trait Decompressor {
  /// Decompresses all of `compressed` into `out`, returning how many bytes
  /// were written.
  ///
  /// `out` is exactly the size that the image needs. If the stream has more
  /// data than that, filling `out` is still a success.
  ///
  /// ## Failure
  /// * [`DecompressionError`](PngError::DecompressionError) if the data isn't
  ///   a valid zlib stream.
  fn decompress(&mut self, compressed: &[u8], out: &mut [u8]) -> PngResult<usize>;
}

/// A [`Decompressor`] using the `miniz_oxide` crate.
#[cfg(feature = "miniz_oxide")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ZlibDecompressor {
  /// Check the Adler32 value at the end of the zlib stream.
  pub verify_adler32: bool,
}
#[cfg(feature = "miniz_oxide")]
impl Decompressor for ZlibDecompressor {
  fn decompress(&mut self, compressed: &[u8], out: &mut [u8]) -> PngResult<usize> {
    use miniz_oxide::inflate::{decompress_slice_iter_to_slice, TINFLStatus};
    match decompress_slice_iter_to_slice(
      out,
      core::iter::once(compressed),
      true,
      !self.verify_adler32,
    ) {
      Ok(count) => Ok(count),
      Err(TINFLStatus::HasMoreOutput) => {
        warn!("zlib stream has more data than the image needs, ignoring the rest");
        Ok(out.len())
      }
      Err(status) => {
        debug!("zlib decompression failed: {status:?}");
        Err(PngError::DecompressionError)
      }
    }
  }
}

/// A PNG decode that hasn't started yet.
///
/// See the [module docs](crate::png) for the steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PngDecoder<'b> {
  bytes: &'b [u8],
  options: DecodeOptions,
}
impl<'b> PngDecoder<'b> {
  /// Starts a decode with default options.
  #[inline]
  #[must_use]
  pub fn new(bytes: &'b [u8]) -> Self {
    Self::with_options(bytes, DecodeOptions::default())
  }

  /// Starts a decode with the options given.
  #[inline]
  #[must_use]
  pub const fn with_options(bytes: &'b [u8], options: DecodeOptions) -> Self {
    Self { bytes, options }
  }

  /// Checks the PNG signature.
  ///
  /// ## Failure
  /// * [`BadSignature`](PngError::BadSignature) unless the bytes start with
  ///   [`PNG_SIGNATURE`].
  pub fn validate(self) -> PngResult<PngSignatureChecked<'b>> {
    if !is_png_header_correct(self.bytes) {
      return Err(PngError::BadSignature);
    }
    Ok(PngSignatureChecked {
      chunk_bytes: &self.bytes[PNG_SIGNATURE.len()..],
      options: self.options,
    })
  }
}

/// A PNG decode that has a correct signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PngSignatureChecked<'b> {
  chunk_bytes: &'b [u8],
  options: DecodeOptions,
}
impl<'b> PngSignatureChecked<'b> {
  /// Reads all of the chunks, keeping the ones needed to make pixels.
  ///
  /// * The first `IHDR`, `PLTE`, and `tRNS` are used, later duplicates are
  ///   ignored.
  /// * All `IDAT` payloads are joined, in order.
  /// * Unknown chunks are skipped.
  ///
  /// ## Failure
  /// * [`MalformedChunk`](PngError::MalformedChunk) if the chunk framing is cut
  ///   short or a known chunk has a bad payload. A bad `PLTE` is only an error
  ///   for indexed color images.
  /// * [`ChunkIntegrity`](PngError::ChunkIntegrity) on a CRC mismatch, when
  ///   checking that.
  /// * [`MissingHeader`](PngError::MissingHeader) if an `IDAT` comes before the
  ///   `IHDR`, or there's no `IHDR` at all.
  /// * [`MissingTerminator`](PngError::MissingTerminator) if there's no `IEND`,
  ///   when checking that.
  /// * [`DimensionsTooLarge`](PngError::DimensionsTooLarge) if the image is
  ///   bigger than the options allow.
  /// * [`MissingPalette`](PngError::MissingPalette) for an indexed color image
  ///   without a `PLTE`.
  pub fn parse_chunks(self) -> PngResult<PngChunksParsed<'b>> {
    let mut header: Option<IHDR> = None;
    // a bad PLTE only matters if the image turns out to be indexed
    let mut plte: Option<PngResult<PLTE<'b>>> = None;
    let mut trns: Option<tRNS<'b>> = None;
    let mut image_data: Vec<u8> = Vec::new();
    let mut idat_count = 0_usize;
    let mut other_count = 0_usize;

    let mut it = PngRawChunkIter::new(self.chunk_bytes);
    for raw in it.by_ref() {
      let raw = raw?;
      trace!("{raw:?}");
      if self.options.verify_crc && !raw.crc_is_valid() {
        return Err(PngError::ChunkIntegrity { chunk_type: raw.chunk_type().0 });
      }
      let chunk = match PngChunk::try_from(raw) {
        Ok(chunk) => chunk,
        Err(e) if raw.chunk_type() == PngChunkType::PLTE => {
          if plte.is_none() {
            plte = Some(Err(e));
          } else {
            warn!("ignoring a duplicate PLTE chunk");
          }
          continue;
        }
        Err(e) => return Err(e),
      };
      match chunk {
        PngChunk::IHDR(ihdr) => {
          if header.is_none() {
            header = Some(ihdr);
          } else {
            warn!("ignoring a duplicate IHDR chunk");
          }
        }
        PngChunk::PLTE(p) => {
          if plte.is_none() {
            plte = Some(Ok(p));
          } else {
            warn!("ignoring a duplicate PLTE chunk");
          }
        }
        PngChunk::tRNS(t) => {
          if trns.is_none() {
            trns = Some(t);
          } else {
            warn!("ignoring a duplicate tRNS chunk");
          }
        }
        PngChunk::IDAT(data) => {
          if header.is_none() {
            return Err(PngError::MissingHeader);
          }
          image_data.try_reserve(data.len())?;
          image_data.extend_from_slice(data);
          idat_count += 1;
        }
        PngChunk::IEND => (),
        PngChunk::Other(raw) => {
          if raw.chunk_type().is_critical() {
            warn!("skipping unknown critical chunk {:?}", raw.chunk_type());
          }
          other_count += 1;
        }
      }
    }
    if !it.saw_end() {
      if self.options.require_end_chunk {
        return Err(PngError::MissingTerminator);
      }
      warn!("PNG data ended without an IEND chunk");
    }

    let header = header.ok_or(PngError::MissingHeader)?;
    debug!("{header:?}");
    debug!(
      "{idat_count} IDAT chunks with {} bytes, {other_count} other chunks skipped",
      image_data.len()
    );
    if header.width > self.options.max_dimension || header.height > self.options.max_dimension {
      return Err(PngError::DimensionsTooLarge);
    }

    let (palette, transparency) = if header.color_type == PngColorType::Index {
      let plte = plte.ok_or(PngError::MissingPalette)??;
      // the alpha values live in the palette from now on
      (palette_rgba8(plte, trns)?, None)
    } else {
      if let Some(Err(e)) = plte {
        warn!("ignoring a PLTE chunk the image doesn't use: {e}");
      }
      (Vec::new(), trns)
    };

    Ok(PngChunksParsed { header, palette, transparency, image_data })
  }
}

/// A PNG decode that has read all of its chunks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PngChunksParsed<'b> {
  header: IHDR,
  palette: Vec<RGBA8>,
  transparency: Option<tRNS<'b>>,
  image_data: Vec<u8>,
}
impl<'b> PngChunksParsed<'b> {
  /// The image header.
  #[inline]
  #[must_use]
  pub const fn header(&self) -> &IHDR {
    &self.header
  }
  /// The palette, with transparency merged in. Empty unless the image uses
  /// indexed color.
  #[inline]
  #[must_use]
  pub fn palette(&self) -> &[RGBA8] {
    &self.palette
  }
  /// The transparent color key of a greyscale or RGB image, if any.
  #[inline]
  #[must_use]
  pub const fn transparency(&self) -> Option<tRNS<'b>> {
    self.transparency
  }
  /// All of the `IDAT` payloads joined together, still compressed.
  #[inline]
  #[must_use]
  pub fn image_data(&self) -> &[u8] {
    &self.image_data
  }

  /// Decompresses, unfilters, and assembles the final pixels, using the
  /// default zlib decompressor.
  #[cfg(feature = "miniz_oxide")]
  #[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
  pub fn parse_data(self) -> PngResult<Bitmap<RGBA8>> {
    self.parse_data_with(&mut ZlibDecompressor::default())
  }

  /// Decompresses, unfilters, and assembles the final pixels, using the
  /// decompressor you provide.
  ///
  /// ## Failure
  /// * The header has to pass [`IHDR::check_decodable`].
  /// * Any error from the decompressor, [`unfilter_image`], or
  ///   [`assemble_rgba8`].
  pub fn parse_data_with<D: Decompressor + ?Sized>(
    self, decompressor: &mut D,
  ) -> PngResult<Bitmap<RGBA8>> {
    let header = self.header;
    header.check_decodable()?;

    let zlib_len = header.filtered_data_len()?;
    let mut zlib_buffer: Vec<u8> = Vec::new();
    zlib_buffer.try_reserve_exact(zlib_len)?;
    zlib_buffer.resize(zlib_len, 0);
    let written = decompressor.decompress(&self.image_data, &mut zlib_buffer)?;
    debug!("decompressed {} bytes into {written} of {zlib_len}", self.image_data.len());
    let filtered = zlib_buffer.get(..written).unwrap_or(&zlib_buffer);

    let decoded = unfilter_image(filtered, header.width, header.height, header.bytes_per_pixel())?;
    let pixels = assemble_rgba8(&header, &decoded, &self.palette, self.transparency)?;
    Ok(Bitmap { width: header.width, height: header.height, pixels })
  }
}

/// Decodes PNG bytes into RGBA8 pixels, with default options.
///
/// See the [module docs](crate::png) for what is and isn't supported.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
pub fn decode_png(bytes: &[u8]) -> PngResult<Bitmap<RGBA8>> {
  decode_png_with_options(bytes, DecodeOptions::default())
}

/// Decodes PNG bytes into RGBA8 pixels.
///
/// When `options.verify_crc` is set, the zlib Adler32 is checked too.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
pub fn decode_png_with_options(bytes: &[u8], options: DecodeOptions) -> PngResult<Bitmap<RGBA8>> {
  let mut zlib = ZlibDecompressor { verify_adler32: options.verify_crc };
  PngDecoder::with_options(bytes, options).validate()?.parse_chunks()?.parse_data_with(&mut zlib)
}

#[cfg(feature = "miniz_oxide")]
impl Bitmap<RGBA8> {
  /// Attempts to make an image from PNG bytes.
  ///
  /// This is [`decode_png`], just under a more discoverable name.
  #[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
  #[inline]
  pub fn try_from_png_bytes(bytes: &[u8]) -> PngResult<Self> {
    decode_png(bytes)
  }
}
