//! Content-Length framed message codec.
//!
//! Each message is a header `Content-Length: N\r\n\r\n` followed by
//! exactly N bytes of UTF-8 JSON (the same framing LSP uses). Readers
//! and writers are generic over the tokio I/O traits so the runtime can
//! be driven by stdio or by in-memory buffers in tests.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use picoclaw_types::error::{PicoClawError, Result};

/// Upper bound on a single frame body.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Read one framed message.
///
/// Returns `Ok(None)` on clean EOF (stream ends before any header
/// byte). EOF inside a header or body, a missing or unparseable
/// `Content-Length`, and oversized frames are protocol errors.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;

    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            if saw_header {
                return Err(PicoClawError::Protocol {
                    message: "eof inside frame header".into(),
                });
            }
            return Ok(None);
        }
        saw_header = true;

        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some(value) = trimmed.strip_prefix("Content-Length:") {
            let len: usize = value.trim().parse().map_err(|_| PicoClawError::Protocol {
                message: format!("invalid Content-Length: {}", value.trim()),
            })?;
            if len > MAX_FRAME_BYTES {
                return Err(PicoClawError::Protocol {
                    message: format!("frame of {len} bytes exceeds limit"),
                });
            }
            content_length = Some(len);
        }
        // Other headers (e.g. Content-Type) are tolerated and ignored.
    }

    let len = content_length.ok_or_else(|| PicoClawError::Protocol {
        message: "missing Content-Length header".into(),
    })?;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

/// Write one framed message and flush.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}
