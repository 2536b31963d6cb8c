#![forbid(unsafe_code)]

//! Provides a heap-allocated image type.

use alloc::vec::Vec;

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
///
/// You don't ever need to call this function yourself, but it's how
/// [`Bitmap`] converts 2d coordinates into index values within its pixel
/// vector.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// A direct-color image.
///
/// Pixels are row-major, starting at the top left.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct Bitmap<P> {
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<P>,
}
impl<P> Bitmap<P> {
  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<&P> {
    if x < self.width && y < self.height {
      self.pixels.get(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Iterates the rows of the image, top to bottom.
  #[inline]
  pub fn rows(&self) -> impl Iterator<Item = &[P]> {
    // a zero width image has no rows worth of pixels to chunk
    self.pixels.chunks_exact(self.width.max(1) as usize)
  }
}

#[test]
fn test_bitmap_indexing() {
  use alloc::vec;
  let bitmap = Bitmap { width: 3, height: 2, pixels: vec![0_u8, 1, 2, 3, 40, 5] };
  assert_eq!(bitmap.get(2, 1), Some(&5));
  assert_eq!(bitmap.get(3, 0), None);
  assert_eq!(bitmap.get(0, 2), None);
  assert_eq!(bitmap.get(1, 1), Some(&40));
  let rows: Vec<&[u8]> = bitmap.rows().collect();
  assert_eq!(rows, vec![&[0_u8, 1, 2][..], &[3, 40, 5][..]]);
}
