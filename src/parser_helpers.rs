use bytemuck::{pod_read_unaligned, Pod};

use core::mem::size_of;

/// Splits `N` bytes off the front of `bytes`, or `None` if there aren't
/// enough.
#[inline]
pub(crate) fn try_pull_byte_array<const N: usize>(bytes: &[u8]) -> Option<([u8; N], &[u8])> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    let a: [u8; N] = head.try_into().ok()?;
    Some((a, tail))
  } else {
    None
  }
}

/// Reads a `T` (unaligned) off the front of `bytes`, or `None` if there aren't
/// enough.
#[inline]
pub(crate) fn try_pull_pod<T: Pod>(bytes: &[u8]) -> Option<(T, &[u8])> {
  let position = size_of::<T>();
  if bytes.len() >= position {
    let (head, tail) = bytes.split_at(position);
    let a: T = pod_read_unaligned(head);
    Some((a, tail))
  } else {
    None
  }
}

/// Splits `count` bytes off the front of `bytes`, or `None` if there aren't
/// enough.
#[inline]
pub(crate) fn try_pull_slice(bytes: &[u8], count: usize) -> Option<(&[u8], &[u8])> {
  if bytes.len() >= count {
    Some(bytes.split_at(count))
  } else {
    None
  }
}

#[test]
fn test_pull_helpers_never_overrun() {
  use crate::int_endian::U32BE;

  let bytes = [0_u8, 0, 0, 5, b'a', b'b'];
  let (len, rest) = try_pull_pod::<U32BE>(&bytes).unwrap();
  assert_eq!(len.to_u32(), 5);
  assert_eq!(rest, b"ab");
  assert!(try_pull_pod::<U32BE>(rest).is_none());
  assert!(try_pull_byte_array::<4>(rest).is_none());
  assert_eq!(try_pull_byte_array::<2>(rest), Some((*b"ab", &[][..])));
  assert!(try_pull_slice(rest, 3).is_none());
  assert_eq!(try_pull_slice(rest, 1), Some((&b"a"[..], &b"b"[..])));
}
