use crate::callback::Transport;
use crate::error::GitInnerError;
use crate::pkt_line::{MAX_PKT_PAYLOAD, PktLineWriter};

/// Largest chunk a single side-band write can carry, one byte goes to the tag.
pub const MAX_SIDEBAND_PAYLOAD: usize = MAX_PKT_PAYLOAD - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideBend {
    SidebandPrimary = 1,
    SidebandProgress = 2,
    SidebandRemoteError = 3,
}

impl SideBend {
    pub fn to_u8(&self) -> u8 {
        *self as u8
    }
}

/// Tags every write with its channel and frames it as its own pkt-line.
///
/// The muxer holds the only mutable borrow of the writer for as long as it
/// lives, so packets go out exactly in call order and nothing else can
/// interleave bytes between a tag and its payload.
pub struct Muxer<'a, T> {
    writer: &'a mut PktLineWriter<T>,
}

impl<'a, T: Transport> Muxer<'a, T> {
    pub fn new(writer: &'a mut PktLineWriter<T>) -> Self {
        Self { writer }
    }

    /// Writes `data` on `channel` and flushes it to the peer. Returns the
    /// number of payload bytes written, the tag byte is not counted.
    pub async fn write_channel(
        &mut self,
        channel: SideBend,
        data: &[u8],
    ) -> Result<usize, GitInnerError> {
        if data.len() > MAX_SIDEBAND_PAYLOAD {
            return Err(GitInnerError::PayloadTooLarge(data.len()));
        }
        if self.writer.is_closed() {
            return Err(GitInnerError::ChannelClosed);
        }
        let mut tagged = Vec::with_capacity(data.len() + 1);
        tagged.push(channel.to_u8());
        tagged.extend_from_slice(data);
        self.writer.write_data(&tagged)?;
        self.writer.flush().await?;
        Ok(data.len())
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_closed()
    }

    /// Ends the multiplexed section with a flush packet.
    pub async fn finish(self) -> Result<(), GitInnerError> {
        self.writer.write_flush();
        self.writer.flush().await
    }
}

/// Plain byte sink over the progress channel, for producers that only know
/// how to write bytes. Input larger than one packet is split.
pub struct SidebandTty<'m, 'a, T> {
    mux: &'m mut Muxer<'a, T>,
}

impl<'m, 'a, T: Transport> SidebandTty<'m, 'a, T> {
    pub fn new(mux: &'m mut Muxer<'a, T>) -> Self {
        Self { mux }
    }

    pub async fn write(&mut self, data: &[u8]) -> Result<usize, GitInnerError> {
        let mut written = 0;
        for chunk in data.chunks(MAX_SIDEBAND_PAYLOAD) {
            written += self
                .mux
                .write_channel(SideBend::SidebandProgress, chunk)
                .await?;
        }
        Ok(written)
    }
}
