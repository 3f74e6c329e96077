//! pkt-line framing.
//!
//! Every unit on the wire is a 4 digit lowercase hex length (counting the
//! prefix itself) followed by the payload. `0000` is a flush packet and
//! `0001` a delimiter; neither carries a payload.

use crate::callback::Transport;
use crate::error::GitInnerError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Largest pkt-line including its length prefix.
pub const MAX_PKT_LINE: usize = 65520;
/// Largest payload a single data packet can carry.
pub const MAX_PKT_PAYLOAD: usize = MAX_PKT_LINE - 4;

const FLUSH_PKT: &[u8; 4] = b"0000";
const DELIM_PKT: &[u8; 4] = b"0001";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Flush,
    Delimiter,
    Data(Bytes),
}

impl Packet {
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Packet::Data(data) => Some(data),
            _ => None,
        }
    }

    /// Payload as text with a single trailing newline removed.
    pub fn as_line(&self) -> Result<Option<&str>, GitInnerError> {
        match self.data() {
            Some(data) => {
                let line = std::str::from_utf8(data).map_err(|_| GitInnerError::InvalidUtf8)?;
                Ok(Some(line.strip_suffix('\n').unwrap_or(line)))
            }
            None => Ok(None),
        }
    }
}

pub fn encode(payload: &[u8]) -> Result<Bytes, GitInnerError> {
    let mut buf = BytesMut::with_capacity(payload.len() + 4);
    encode_into(&mut buf, payload)?;
    Ok(buf.freeze())
}

pub fn encode_flush() -> Bytes {
    Bytes::from_static(FLUSH_PKT)
}

pub fn encode_delim() -> Bytes {
    Bytes::from_static(DELIM_PKT)
}

fn encode_into(buf: &mut BytesMut, payload: &[u8]) -> Result<(), GitInnerError> {
    if payload.len() > MAX_PKT_PAYLOAD {
        return Err(GitInnerError::PayloadTooLarge(payload.len()));
    }
    buf.put_slice(format!("{:04x}", payload.len() + 4).as_bytes());
    buf.put_slice(payload);
    Ok(())
}

fn parse_len(prefix: &[u8]) -> Result<usize, GitInnerError> {
    prefix.iter().try_fold(0usize, |acc, b| {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            _ => return Err(GitInnerError::MalformedLength),
        };
        Ok(acc * 16 + digit as usize)
    })
}

/// Decodes one packet from the front of `buf`.
pub fn decode<B: Buf>(buf: &mut B) -> Result<Packet, GitInnerError> {
    if buf.remaining() < 4 {
        return Err(GitInnerError::UnexpectedEof);
    }
    let mut prefix = [0u8; 4];
    buf.copy_to_slice(&mut prefix);
    match parse_len(&prefix)? {
        0 => Ok(Packet::Flush),
        1 => Ok(Packet::Delimiter),
        2 | 3 => Err(GitInnerError::MalformedLength),
        len => {
            let payload_len = len - 4;
            if buf.remaining() < payload_len {
                return Err(GitInnerError::UnexpectedEof);
            }
            Ok(Packet::Data(buf.copy_to_bytes(payload_len)))
        }
    }
}

/// Iterates the packets of a fully received body.
pub struct PktLineReader {
    buf: Bytes,
}

impl PktLineReader {
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    /// Next packet, or `None` once the input is exhausted.
    pub fn read(&mut self) -> Result<Option<Packet>, GitInnerError> {
        if !self.buf.has_remaining() {
            return Ok(None);
        }
        decode(&mut self.buf).map(Some)
    }
}

/// Buffers encoded packets until [`PktLineWriter::flush`] hands them to the
/// transport as a single chunk.
pub struct PktLineWriter<T> {
    buf: BytesMut,
    transport: T,
}

impl<T: Transport> PktLineWriter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            buf: BytesMut::new(),
            transport,
        }
    }

    pub fn write_data(&mut self, data: &[u8]) -> Result<(), GitInnerError> {
        encode_into(&mut self.buf, data)
    }

    /// Writes `s` as a line, appending the newline if it is missing.
    pub fn write_line(&mut self, s: &str) -> Result<(), GitInnerError> {
        if s.ends_with('\n') {
            return self.write_data(s.as_bytes());
        }
        let mut line = Vec::with_capacity(s.len() + 1);
        line.extend_from_slice(s.as_bytes());
        line.push(b'\n');
        self.write_data(&line)
    }

    pub fn write_flush(&mut self) {
        self.buf.put_slice(FLUSH_PKT);
    }

    pub fn write_delim(&mut self) {
        self.buf.put_slice(DELIM_PKT);
    }

    pub async fn flush(&mut self) -> Result<(), GitInnerError> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = self.buf.split().freeze();
        self.transport.send(chunk).await
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}
