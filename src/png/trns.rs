use super::*;

/// Transparency data
///
/// What the bytes mean depends on the image's color type, so this just holds
/// the payload and you pick the interpretation:
/// * greyscale: one `u16` sample value that's fully transparent.
/// * RGB: one `[u16; 3]` color that's fully transparent.
/// * indexed: an alpha value per palette entry. There can be fewer alpha
///   entries than palette entries (missing entries are fully opaque).
///
/// The other color types already have an alpha channel and shouldn't have
/// this chunk at all.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(nonstandard_style)]
pub struct tRNS<'b>(&'b [u8]);
impl<'b> From<&'b [u8]> for tRNS<'b> {
  #[inline]
  fn from(data: &'b [u8]) -> Self {
    Self(data)
  }
}
impl Debug for tRNS<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_tuple("tRNS").field(&&self.0[..self.0.len().min(12)]).field(&self.0.len()).finish()
  }
}
impl<'b> tRNS<'b> {
  /// Gets the greyscale value that is transparent.
  ///
  /// Fails when the chunk has the wrong length for greyscale.
  #[inline]
  #[must_use]
  pub fn try_to_grayscale(&self) -> Option<u16> {
    if self.0.len() == 2 {
      u16_be(self.0)
    } else {
      None
    }
  }
  /// Gets the RGB value that is transparent.
  ///
  /// Fails when the chunk has the wrong length for RGB.
  #[inline]
  #[must_use]
  pub fn try_to_rgb(&self) -> Option<[u16; 3]> {
    match self.0 {
      [r0, r1, g0, g1, b0, b1] => Some([
        u16::from_be_bytes([*r0, *r1]),
        u16::from_be_bytes([*g0, *g1]),
        u16::from_be_bytes([*b0, *b1]),
      ]),
      _ => None,
    }
  }
  /// Gets the alpha values for each palette index.
  #[inline]
  #[must_use]
  pub const fn to_alphas(&self) -> &'b [u8] {
    self.0
  }
}

#[test]
fn test_trns_interpretations() {
  let y = tRNS::from(&[0x01_u8, 0x02][..]);
  assert_eq!(y.try_to_grayscale(), Some(0x0102));
  assert_eq!(y.try_to_rgb(), None);

  let rgb = tRNS::from(&[0_u8, 1, 0, 2, 0, 3][..]);
  assert_eq!(rgb.try_to_rgb(), Some([1, 2, 3]));
  assert_eq!(rgb.try_to_grayscale(), None);

  let alphas = tRNS::from(&[255_u8, 0, 7][..]);
  assert_eq!(alphas.to_alphas(), &[255, 0, 7]);
  assert_eq!(alphas.try_to_grayscale(), None);
  assert_eq!(alphas.try_to_rgb(), None);
}
