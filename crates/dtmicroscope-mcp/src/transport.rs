//! Line-delimited stdio transport.
//!
//! Each JSON-RPC message is a single line of UTF-8 JSON terminated by `\n`.
//! Lines longer than the configured limit are drained and reported as
//! [`Frame::Oversized`] instead of being buffered.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// One unit read from the transport.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    Message(String),
    Oversized,
}

/// Read the next non-empty line.
///
/// Returns `None` on EOF.
pub async fn read_frame<R>(reader: &mut R, max_line_bytes: usize) -> io::Result<Option<Frame>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let mut buf = Vec::new();
        let limit = max_line_bytes as u64 + 1;
        let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Ok(None);
        }

        if buf.last() != Some(&b'\n') && buf.len() > max_line_bytes {
            discard_line(reader).await?;
            return Ok(Some(Frame::Oversized));
        }

        let line = String::from_utf8(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e)))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        return Ok(Some(Frame::Message(line.to_string())));
    }
}

/// Skip input up to and including the next newline.
async fn discard_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

/// Write one message followed by a newline and flush.
pub async fn write_frame<W>(writer: &mut W, message: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(message.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_read_lines_and_eof() {
        let input = b"{\"a\":1}\n\n  {\"b\":2}\r\n{\"c\":3}";
        let mut reader = BufReader::new(&input[..]);

        assert_eq!(
            read_frame(&mut reader, 1024).await.unwrap(),
            Some(Frame::Message("{\"a\":1}".into()))
        );
        assert_eq!(
            read_frame(&mut reader, 1024).await.unwrap(),
            Some(Frame::Message("{\"b\":2}".into()))
        );
        assert_eq!(
            read_frame(&mut reader, 1024).await.unwrap(),
            Some(Frame::Message("{\"c\":3}".into()))
        );
        assert_eq!(read_frame(&mut reader, 1024).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped() {
        let mut input = vec![b'x'; 100];
        input.extend_from_slice(b"\n{\"ok\":true}\n");
        let mut reader = BufReader::with_capacity(16, &input[..]);

        assert_eq!(
            read_frame(&mut reader, 32).await.unwrap(),
            Some(Frame::Oversized)
        );
        assert_eq!(
            read_frame(&mut reader, 32).await.unwrap(),
            Some(Frame::Message("{\"ok\":true}".into()))
        );
    }

    #[tokio::test]
    async fn test_line_at_limit_is_accepted() {
        let input = b"0123456789\n";
        let mut reader = BufReader::new(&input[..]);
        assert_eq!(
            read_frame(&mut reader, 10).await.unwrap(),
            Some(Frame::Message("0123456789".into()))
        );
    }

    #[tokio::test]
    async fn test_write_frame_appends_newline() {
        let mut out = Vec::new();
        write_frame(&mut out, "{\"id\":1}").await.unwrap();
        assert_eq!(out, b"{\"id\":1}\n");
    }
}
