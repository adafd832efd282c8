use crate::error::RouterError;
use crate::protocol::DvrPacket;
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

/// Inbound half of the relay channel: one JSON packet per line.
pub struct MessageReader<R> {
    reader: BufReader<R>,
    line: Vec<u8>,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line: Vec::new(),
        }
    }

    /// Blocks until the next packet arrives. End of stream is reported as
    /// `ConnectionClosed`; blank lines are skipped. A line that is not valid
    /// UTF-8 JSON is `Malformed`, not a transport error.
    pub async fn receive(&mut self) -> Result<DvrPacket, RouterError> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line).await? == 0 {
                return Err(RouterError::ConnectionClosed);
            }

            let trimmed = self.line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }

            return Ok(DvrPacket::from_slice(trimmed)?);
        }
    }
}

/// Outbound half of the relay channel.
pub struct MessageWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn send(&mut self, packet: &DvrPacket) -> Result<(), RouterError> {
        let mut data = packet.to_json()?;
        data.push('\n');
        self.writer.write_all(data.as_bytes()).await?;
        self.writer.flush().await?;
        debug!("→ Sent {}", packet);
        Ok(())
    }
}

/// Opens the TCP channel to the relay. Failure here means no session can start.
pub async fn connect(
    host: &str,
    port: u16,
) -> Result<(MessageReader<OwnedReadHalf>, MessageWriter<OwnedWriteHalf>), RouterError> {
    let addr = format!("{}:{}", host, port);
    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| RouterError::Connect { addr: addr.clone(), source })?;
    stream.set_nodelay(true)?;
    info!("Connected to relay at {}", addr);

    let (read_half, write_half) = stream.into_split();
    Ok((MessageReader::new(read_half), MessageWriter::new(write_half)))
}
