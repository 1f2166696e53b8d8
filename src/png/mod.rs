#![forbid(unsafe_code)]

//! Reading, repairing, and writing PNG chunk streams.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## The CgBI Variant
//!
//! Some device toolchains store PNGs in a variant that normal decoders reject.
//! The variant puts an extra `CgBI` chunk into the stream, and it stores the
//! image data (the `IDAT` chunks) as a *raw* deflate stream, without the zlib
//! header and Adler-32 trailer that PNG requires. The pixels themselves are
//! also BGRA with premultiplied alpha, but this module leaves pixel values
//! alone.
//!
//! Repair happens in three stages:
//!
//! 1) [`read_chunks`] splits the file into an owned list of [`Chunk`] values,
//!    stopping at `IEND`.
//! 2) [`recompress_pixel_data`] inflates the image data and deflates it again
//!    inside a zlib wrapper, fixing up the length and CRC of the `IDAT`.
//! 3) [`write_chunks`] puts the signature and the chunks back together,
//!    leaving out `CgBI` and any extra `IDAT`.
//!
//! ## Chunk Layout
//!
//! After the 8 byte signature, each chunk is:
//!
//! * a big-endian `u32` length of the data,
//! * four bytes of chunk type,
//! * the data,
//! * a big-endian CRC-32 of the type and data.
//!
//! The reader does not check the declared CRC. The writer always emits the CRC
//! stored in the chunk, and the recompressor always recomputes it for the data
//! it replaces, so the two never disagree for chunks this crate changes.

mod chunk;
pub use chunk::*;

mod chunk_type;
pub use chunk_type::*;

mod crc32;
pub use crc32::*;

mod reader;
pub use reader::*;

mod recompress;
pub use recompress::*;

mod writer;
pub use writer::*;


/// The 8 bytes every PNG starts with.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the PNG's initial 8 bytes are correct.
///
/// * If this is the case, the rest of the bytes are very likely PNG data.
/// * If this is *not* the case, the rest of the bytes are very likely *not* PNG
///   data.
#[inline]
#[must_use]
pub const fn is_png_header_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}
