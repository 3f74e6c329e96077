pub mod sha1;

pub use self::sha1::Sha1;

/// Incremental hashing, used to build pack trailers.
pub trait Sha {
    fn update(&mut self, data: &[u8]);
    fn finalize(&mut self) -> Vec<u8>;
}
