const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      k += 1;
    }
    out[n] = c;
    n += 1;
  }
  out
}

#[inline]
fn update_crc(mut crc: u32, bytes: &[u8]) -> u32 {
  for byte in bytes.iter().copied() {
    let i = (crc ^ u32::from(byte)) as u8 as usize;
    crc = CRC_TABLE[i] ^ (crc >> 8);
  }
  crc
}

/// Computes the CRC32 of a chunk, which covers the type tag and the payload
/// (but not the length).
#[inline]
#[must_use]
pub fn png_chunk_crc(chunk_type: [u8; 4], data: &[u8]) -> u32 {
  update_crc(update_crc(u32::MAX, &chunk_type), data) ^ u32::MAX
}

#[test]
fn test_png_chunk_crc() {
  // every PNG ends with these exact 12 bytes
  assert_eq!(png_chunk_crc(*b"IEND", &[]), 0xAE42_6082);
  // the classic CRC32 check value, split across the "type" and "data"
  assert_eq!(png_chunk_crc(*b"1234", b"56789"), 0xCBF4_3926);
}
