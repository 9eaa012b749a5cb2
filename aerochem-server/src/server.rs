use aerochem_game::{ErrorBody, GameService, Request, Response};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::enrichment::{ChemicalLookup, enrich};

/// Longest request line accepted, newline excluded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// One newline-terminated frame read from a client.
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    Line,
    TooLong,
    Eof,
}

/// Read the next line into `buf` without the newline, never holding more
/// than `max` bytes. An oversized line is drained and reported as
/// [`Frame::TooLong`] with `buf` left empty.
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>, max: usize) -> std::io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut overflow = false;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(if overflow {
                Frame::TooLong
            } else if buf.is_empty() {
                Frame::Eof
            } else {
                Frame::Line
            });
        }
        let newline = available.iter().position(|&b| b == b'\n');
        let chunk = &available[..newline.unwrap_or(available.len())];
        if !overflow {
            if buf.len() + chunk.len() > max {
                overflow = true;
                buf.clear();
            } else {
                buf.extend_from_slice(chunk);
            }
        }
        let used = chunk.len() + usize::from(newline.is_some());
        reader.consume(used);
        if newline.is_some() {
            return Ok(if overflow { Frame::TooLong } else { Frame::Line });
        }
    }
}

/// Line-delimited JSON front end: one request per line, one reply per line.
#[derive(Clone)]
pub struct GameServer {
    service: Arc<GameService>,
    lookup: Arc<dyn ChemicalLookup>,
    enrichment_timeout: Duration,
}

impl GameServer {
    pub fn new(
        service: GameService,
        lookup: Arc<dyn ChemicalLookup>,
        enrichment_timeout: Duration,
    ) -> Self {
        Self {
            service: Arc::new(service),
            lookup,
            enrichment_timeout,
        }
    }

    /// Accept connections until the listener fails.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, peer) = listener.accept().await.context("accepting connection")?;
            let server = self.clone();
            tokio::spawn(async move {
                if let Err(err) = server.handle_connection(stream, peer).await {
                    log::warn!("connection {peer} closed with error: {err:#}");
                }
            });
        }
    }

    async fn handle_connection(&self, stream: TcpStream, peer: SocketAddr) -> Result<()> {
        log::debug!("client connected: {peer}");
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            let mut reply = match read_frame(&mut reader, &mut buf, MAX_LINE_BYTES).await? {
                Frame::Eof => break,
                Frame::TooLong => {
                    log::warn!("{peer} sent a line over {MAX_LINE_BYTES} bytes");
                    bad_request(&format!("line exceeds {MAX_LINE_BYTES} bytes"))
                }
                Frame::Line => match std::str::from_utf8(&buf) {
                    Ok(line) if line.trim().is_empty() => continue,
                    Ok(line) => self.respond(line).await,
                    Err(err) => bad_request(&format!("line is not valid UTF-8: {err}")),
                },
            };
            reply.push('\n');
            writer.write_all(reply.as_bytes()).await?;
            writer.flush().await?;
        }
        log::debug!("client disconnected: {peer}");
        Ok(())
    }

    /// Answer one request line.
    pub async fn respond(&self, line: &str) -> String {
        let request = match serde_json::from_str::<Request>(line) {
            Ok(request) => request,
            Err(err) => return bad_request(&err.to_string()),
        };
        if let Request::Chemical { name } = &request {
            let info = enrich(self.lookup.as_ref(), name, self.enrichment_timeout).await;
            return Response::Chemical(info).to_json();
        }

        let mut response = self.service.handle(request);
        if let Some(chemical) = response.pending_chemical().map(str::to_string) {
            let info = enrich(self.lookup.as_ref(), &chemical, self.enrichment_timeout).await;
            response.attach_chemical(info);
        }
        response.to_json()
    }
}

fn bad_request(detail: &str) -> String {
    Response::Error(ErrorBody::bad_request(format!("Bad request: {detail}"))).to_json()
}
