use crate::error::GitInnerError;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc::{Receiver, Sender};

pub mod sidebend;

/// Byte sink behind a response. Each `send` is delivered to the peer as
/// one chunk, so a send doubles as the transport-level flush.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, chunk: Bytes) -> Result<(), GitInnerError>;
    fn is_closed(&self) -> bool;
}

/// Sending half of a response body. Dropping every `CallBack` ends the body.
#[derive(Clone)]
pub struct CallBack {
    callback: Sender<Bytes>,
}

pub struct CallBackReceiver {
    receive: Receiver<Bytes>,
}

impl CallBack {
    pub fn channel(size: usize) -> (CallBack, CallBackReceiver) {
        let (tx, rx) = tokio::sync::mpsc::channel(size.max(1));
        (CallBack { callback: tx }, CallBackReceiver { receive: rx })
    }
}

#[async_trait]
impl Transport for CallBack {
    async fn send(&mut self, chunk: Bytes) -> Result<(), GitInnerError> {
        self.callback
            .send(chunk)
            .await
            .map_err(|_| GitInnerError::ChannelClosed)
    }

    fn is_closed(&self) -> bool {
        self.callback.is_closed()
    }
}

impl CallBackReceiver {
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.receive.recv().await
    }

    /// Closes the channel from the reading side; pending and later sends fail.
    pub fn close(&mut self) {
        self.receive.close();
    }
}

/// In-memory transport, each send kept as a separate chunk.
#[async_trait]
impl Transport for Vec<Bytes> {
    async fn send(&mut self, chunk: Bytes) -> Result<(), GitInnerError> {
        self.push(chunk);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }
}
