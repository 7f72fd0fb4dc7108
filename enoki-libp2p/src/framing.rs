//! Length-delimited framing for the secure channel.
//!
//! Every Noise message, handshake and transport alike, is prefixed with
//! a 16-bit big-endian length. The maximum frame is therefore 65535
//! bytes, which also caps a Noise message per the protocol.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Error;

/// Longest frame the 16-bit length prefix can describe.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// A duplex byte stream carrying length-prefixed frames.
pub struct FramedTransport<S> {
    io: S,
}

impl<S: AsyncRead + AsyncWrite + Unpin> FramedTransport<S> {
    pub fn new(io: S) -> Self {
        Self { io }
    }

    /// Read exactly one frame.
    ///
    /// A stream that ends mid-prefix or mid-body surfaces as a transport
    /// error; the length prefix itself can never be inconsistent since
    /// every 16-bit value is a valid length.
    pub async fn read_frame(&mut self) -> Result<Vec<u8>, Error> {
        let mut prefix = [0u8; 2];
        self.io.read_exact(&mut prefix).await?;
        let len = usize::from(u16::from_be_bytes(prefix));

        let mut frame = vec![0u8; len];
        self.io.read_exact(&mut frame).await?;
        Ok(frame)
    }

    /// Write one frame with its length prefix.
    pub async fn write_frame(&mut self, frame: &[u8]) -> Result<(), Error> {
        let len = u16::try_from(frame.len())
            .map_err(|_| Error::MalformedFrame("frame exceeds 65535 bytes"))?;
        self.io.write_all(&len.to_be_bytes()).await?;
        self.io.write_all(frame).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Give back the underlying stream.
    pub fn into_inner(self) -> S {
        self.io
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_single_frame() {
        let (a, b) = tokio::io::duplex(1024);
        let mut writer = FramedTransport::new(a);
        let mut reader = FramedTransport::new(b);

        writer.write_frame(b"hello noise").await.unwrap();
        let frame = reader.read_frame().await.unwrap();
        assert_eq!(frame, b"hello noise");
    }

    #[tokio::test]
    async fn round_trip_multiple_frames() {
        let (a, b) = tokio::io::duplex(1024);
        let mut writer = FramedTransport::new(a);
        let mut reader = FramedTransport::new(b);

        let frames: &[&[u8]] = &[b"first", b"", b"third"];
        for frame in frames {
            writer.write_frame(frame).await.unwrap();
        }
        for frame in frames {
            assert_eq!(reader.read_frame().await.unwrap(), *frame);
        }
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected() {
        let (a, _b) = tokio::io::duplex(64);
        let mut writer = FramedTransport::new(a);
        let result = writer.write_frame(&vec![0u8; MAX_FRAME_LEN + 1]).await;
        assert!(matches!(result, Err(Error::MalformedFrame(_))));
    }

    #[tokio::test]
    async fn truncated_stream_is_a_transport_error() {
        let (a, b) = tokio::io::duplex(1024);
        {
            use tokio::io::AsyncWriteExt;
            let mut a = a;
            // Announce 100 bytes but deliver 3, then close.
            a.write_all(&[0x00, 0x64, 1, 2, 3]).await.unwrap();
        }

        let mut reader = FramedTransport::new(b);
        let result = reader.read_frame().await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn largest_frame_round_trips() {
        let (a, b) = tokio::io::duplex(MAX_FRAME_LEN + 2);
        let mut writer = FramedTransport::new(a);
        let mut reader = FramedTransport::new(b);

        let payload = vec![0x5Au8; MAX_FRAME_LEN];
        writer.write_frame(&payload).await.unwrap();
        assert_eq!(reader.read_frame().await.unwrap(), payload);
    }
}
