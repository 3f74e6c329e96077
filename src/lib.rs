//! Git smart HTTP, protocol v2, `upload-pack` only.
//!
//! Answers capability advertisement, `ls-refs` and `fetch`. Fetch responses
//! are side-band multiplexed so progress output can travel next to the pack
//! data in one response body.

pub mod callback;
pub mod capability;
pub mod config;
pub mod error;
pub mod http;
pub mod pkt_line;
pub mod progress;
pub mod serve;
pub mod sha;
pub mod transaction;
