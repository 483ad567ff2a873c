use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest payload accepted in either direction.
pub const MAX_FRAME_LEN: u32 = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload was skipped; the stream is still aligned on a frame.
    #[error("Frame of {0} bytes exceeds the {MAX_FRAME_LEN} byte limit")]
    TooLarge(u32),
    #[error("Stream ended inside a frame ({0})")]
    Truncated(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// Whether the reader can keep reading after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrameError::TooLarge(_))
    }
}

/// Read the next frame.
///
/// `Ok(None)` means the channel is finished: either the stream ended
/// cleanly before a length prefix or the peer sent a zero-length frame.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FrameError::Truncated("length prefix"));
        }
        filled += n;
    }

    let len = u32::from_le_bytes(prefix);
    if len == 0 {
        tracing::debug!("Zero-length frame, closing channel");
        return Ok(None);
    }
    if len > MAX_FRAME_LEN {
        let mut rest = (&mut *reader).take(len as u64);
        let skipped = tokio::io::copy(&mut rest, &mut tokio::io::sink()).await?;
        if skipped < len as u64 {
            return Err(FrameError::Truncated("oversized payload"));
        }
        return Err(FrameError::TooLarge(len));
    }

    let mut payload = vec![0u8; len as usize];
    match reader.read_exact(&mut payload).await {
        Ok(_) => Ok(Some(payload)),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(FrameError::Truncated("payload"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Write one frame and flush it.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_LEN)
        .ok_or(FrameError::TooLarge(u32::MAX))?;
    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut bytes = (payload.len() as u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(payload);
        bytes
    }

    #[tokio::test]
    async fn test_read_frames_in_order() {
        let mut input = frame(br#"{"command":"initialize"}"#);
        input.extend(frame(br#"{"command":"new_game"}"#));
        let mut reader = input.as_slice();

        let first = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(first, br#"{"command":"initialize"}"#);
        let second = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(second, br#"{"command":"new_game"}"#);
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_length_frame_ends_channel() {
        let mut input = 0u32.to_le_bytes().to_vec();
        input.extend(frame(b"{}"));
        let mut reader = input.as_slice();
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_truncated_payload() {
        let mut input = 10u32.to_le_bytes().to_vec();
        input.extend_from_slice(b"{}");
        let mut reader = input.as_slice();
        let err = read_frame(&mut reader).await.unwrap_err();
        assert!(matches!(err, FrameError::Truncated("payload")));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_partial_prefix() {
        let mut reader: &[u8] = &[1, 0];
        assert!(matches!(
            read_frame(&mut reader).await,
            Err(FrameError::Truncated("length prefix"))
        ));
    }

    #[tokio::test]
    async fn test_oversized_frame_is_skipped() {
        let big = MAX_FRAME_LEN + 1;
        let mut input = big.to_le_bytes().to_vec();
        input.extend(std::iter::repeat(b' ').take(big as usize));
        input.extend(frame(b"{}"));
        let mut reader = input.as_slice();

        let err = read_frame(&mut reader).await.unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(read_frame(&mut reader).await.unwrap().unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_write_frame_prefix() {
        let mut out = Vec::new();
        write_frame(&mut out, br#"{"type":"status"}"#).await.unwrap();
        assert_eq!(&out[..4], &17u32.to_le_bytes());
        assert_eq!(&out[4..], br#"{"type":"status"}"#);
    }
}
