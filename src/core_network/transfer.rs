use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Copies `reader` into `writer` until end-of-stream through one reusable
/// buffer of `buffer_size` bytes. Returns the number of bytes copied.
pub async fn stream_bytes<R, W>(reader: &mut R, writer: &mut W, buffer_size: usize) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let bytes_read = reader.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read]).await?;
        total += bytes_read as u64;
    }
    writer.flush().await?;
    Ok(total)
}

/// Forwards `reader` line by line, reusing one line buffer.
pub async fn stream_lines<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    let mut total = 0u64;
    loop {
        line.clear();
        let bytes_read = reader.read_until(b'\n', &mut line).await?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&line).await?;
        total += bytes_read as u64;
    }
    writer.flush().await?;
    Ok(total)
}
