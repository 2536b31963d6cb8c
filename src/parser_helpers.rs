#![forbid(unsafe_code)]

//! Just has shorthands for the big-endian int parsing that PNG needs.

/// Reads a big-endian `u32` from the first 4 bytes, if there are enough.
#[inline]
#[must_use]
pub fn u32_be(bytes: &[u8]) -> Option<u32> {
  match bytes {
    [a, b, c, d, ..] => Some(u32::from_be_bytes([*a, *b, *c, *d])),
    _ => None,
  }
}

/// Reads a big-endian `u16` from the first 2 bytes, if there are enough.
#[inline]
#[must_use]
pub fn u16_be(bytes: &[u8]) -> Option<u16> {
  match bytes {
    [a, b, ..] => Some(u16::from_be_bytes([*a, *b])),
    _ => None,
  }
}

/// Splits an `N` byte array off the front of `bytes`, returning the array and
/// the rest.
#[inline]
pub fn try_split_off_byte_array<const N: usize>(bytes: &[u8]) -> Option<([u8; N], &[u8])> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    let a: [u8; N] = head.try_into().ok()?;
    Some((a, tail))
  } else {
    None
  }
}

#[test]
fn test_int_helpers() {
  assert_eq!(u32_be(&[0, 0, 1, 2, 99]), Some(0x0102));
  assert_eq!(u32_be(&[1, 2, 3]), None);
  assert_eq!(u16_be(&[0xAB, 0xCD]), Some(0xABCD));
  assert_eq!(u16_be(&[0xAB]), None);
  assert_eq!(try_split_off_byte_array::<2>(&[1, 2, 3]), Some(([1, 2], &[3][..])));
  assert_eq!(try_split_off_byte_array::<4>(&[1, 2, 3]), None);
}
