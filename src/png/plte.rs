use super::*;

/// Palette data
///
/// Palette entries are always RGB.
///
/// If you want to have a paletted image with transparency then the transparency
/// info goes in a separate transparency chunk, see [`palette_rgba8`] for
/// combining the two.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PLTE<'b>(&'b [RGB8]);
impl<'b> TryFrom<&'b [u8]> for PLTE<'b> {
  type Error = PngError;
  #[inline]
  fn try_from(data: &'b [u8]) -> Result<Self, Self::Error> {
    let entries: &[RGB8] =
      bytemuck::try_cast_slice(data).map_err(|_| PngError::MalformedChunk)?;
    if entries.is_empty() || entries.len() > 256 {
      return Err(PngError::MalformedChunk);
    }
    Ok(Self(entries))
  }
}
impl Debug for PLTE<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 4 palette entries
    f.debug_tuple("PLTE").field(&&self.0[..self.0.len().min(4)]).field(&self.0.len()).finish()
  }
}
impl<'b> PLTE<'b> {
  /// Gets the entries as a slice.
  #[inline]
  #[must_use]
  pub const fn entries(&self) -> &'b [RGB8] {
    self.0
  }
}

/// Widens the palette to [`RGBA8`], taking alpha values from the transparency
/// chunk when there is one.
///
/// The transparency chunk can have fewer entries than the palette, and the
/// remaining entries are fully opaque. Any extra alpha entries beyond the end
/// of the palette are ignored.
#[cfg(feature = "alloc")]
pub fn palette_rgba8(plte: PLTE<'_>, trns: Option<tRNS<'_>>) -> PngResult<Vec<RGBA8>> {
  let alphas: &[u8] = trns.map(|t| t.to_alphas()).unwrap_or(&[]);
  if alphas.len() > plte.entries().len() {
    warn!(
      "tRNS has {} alpha entries but PLTE has only {} colors, ignoring the extras",
      alphas.len(),
      plte.entries().len()
    );
  }
  let mut out: Vec<RGBA8> = Vec::new();
  out.try_reserve_exact(plte.entries().len())?;
  let alpha_it = alphas.iter().copied().chain(core::iter::repeat(u8::MAX));
  out.extend(
    plte.entries().iter().copied().zip(alpha_it).map(|(rgb, a)| RGBA8 { a, ..RGBA8::from(rgb) }),
  );
  Ok(out)
}

#[test]
fn test_plte_parse() {
  let plte = PLTE::try_from(&[1_u8, 2, 3, 4, 5, 6][..]).unwrap();
  assert_eq!(plte.entries(), &[RGB8 { r: 1, g: 2, b: 3 }, RGB8 { r: 4, g: 5, b: 6 }]);
  assert_eq!(PLTE::try_from(&[1_u8, 2, 3, 4][..]), Err(PngError::MalformedChunk));
  assert_eq!(PLTE::try_from(&[0_u8; 0][..]), Err(PngError::MalformedChunk));
  let too_many = [0_u8; 257 * 3];
  assert_eq!(PLTE::try_from(&too_many[..]), Err(PngError::MalformedChunk));
}

#[test]
#[cfg(feature = "alloc")]
fn test_palette_rgba8_merges_alpha() {
  let plte = PLTE::try_from(&[10_u8, 11, 12, 20, 21, 22, 30, 31, 32][..]).unwrap();
  let opaque = palette_rgba8(plte, None).unwrap();
  assert!(opaque.iter().all(|p| p.a == 255));
  assert_eq!(opaque[2], RGBA8 { r: 30, g: 31, b: 32, a: 255 });

  let merged = palette_rgba8(plte, Some(tRNS::from(&[0_u8, 128][..]))).unwrap();
  assert_eq!(merged[0].a, 0);
  assert_eq!(merged[1], RGBA8 { r: 20, g: 21, b: 22, a: 128 });
  assert_eq!(merged[2].a, 255);

  let surplus = palette_rgba8(plte, Some(tRNS::from(&[1_u8, 2, 3, 4, 5][..]))).unwrap();
  assert_eq!(surplus.len(), 3);
  assert_eq!(surplus[2].a, 3);
}
