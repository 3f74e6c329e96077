//! Payload producers driven by the fetch loop.
//!
//! A producer is a blocking byte source: the session keeps calling
//! [`PayloadProducer::next`] until it returns `None`, writing every chunk to
//! the channel it names. Pacing is entirely the producer's business.

use crate::callback::sidebend::SideBend;
use crate::error::GitInnerError;
use async_trait::async_trait;
use bytes::Bytes;

pub mod animation;

pub use animation::{AnimationSource, ProgressAnimation};

#[async_trait]
pub trait PayloadProducer: Send {
    async fn next(&mut self) -> Result<Option<(SideBend, Bytes)>, GitInnerError>;
}

/// Hands out one producer per fetch.
pub trait PayloadSource: Send + Sync + 'static {
    fn producer(&self) -> Box<dyn PayloadProducer>;
}

/// Replays a fixed list of chunks.
pub struct ScriptedProducer {
    chunks: std::vec::IntoIter<(SideBend, Bytes)>,
}

impl ScriptedProducer {
    pub fn new(chunks: Vec<(SideBend, Bytes)>) -> Self {
        Self {
            chunks: chunks.into_iter(),
        }
    }
}

#[async_trait]
impl PayloadProducer for ScriptedProducer {
    async fn next(&mut self) -> Result<Option<(SideBend, Bytes)>, GitInnerError> {
        Ok(self.chunks.next())
    }
}
