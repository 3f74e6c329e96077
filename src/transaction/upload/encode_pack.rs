use crate::sha::{Sha, Sha1};
use bytes::{BufMut, Bytes, BytesMut};

pub const PACK_HEADER_LEN: usize = 12;
const PACK_VERSION: u32 = 2;

/// A pack with no objects: header plus SHA-1 trailer. Stands in for real
/// pack data on the primary channel.
pub fn empty_pack() -> Bytes {
    let mut header = BytesMut::with_capacity(PACK_HEADER_LEN + 20);
    header.extend_from_slice(b"PACK");
    header.put_u32(PACK_VERSION);
    header.put_u32(0);
    let mut hash = Sha1::new();
    hash.update(&header[..]);
    let trailer = hash.finalize();
    header.extend_from_slice(&trailer);
    header.freeze()
}
