#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A crate for decoding PNG data into plain RGBA8 pixels.
//!
//! The quick way in is [`decode_png`](crate::png::decode_png), which needs the
//! `alloc` and `miniz_oxide` features (both on by default):
//!
//! ```no_run
//! let bytes: &[u8] = unimplemented!("png data from somewhere");
//! let bitmap = rgbapng::png::decode_png(bytes)?;
//! println!("{}x{}, first pixel {:?}", bitmap.width, bitmap.height, bitmap.pixels[0]);
//! # Ok::<(), rgbapng::PngError>(())
//! ```
//!
//! If you want to drive the stages yourself, see [`png::PngDecoder`].

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

pub mod pixel_formats;
pub use pixel_formats::*;

mod error;
pub use error::*;

mod parser_helpers;
pub(crate) use parser_helpers::*;

#[cfg(feature = "alloc")]
pub mod image;
#[cfg(feature = "alloc")]
pub use image::*;

pub mod png;
