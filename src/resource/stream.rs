//! Streaming upload and download
//!
//! Uploads are a future ([`Upload`]) resolving to the created resource.
//! Downloads are a handle ([`Download`]) that is either piped into an
//! `AsyncWrite` sink or turned into a consumer-driven byte stream.

use crate::error::{Error, Result};
use crate::gateway::transport::{ByteStream, PartBody, SharedHttp};
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::{StreamExt, TryStreamExt};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Payload of an upload
pub enum UploadData {
    Bytes(Bytes),
    Stream {
        stream: ByteStream,
        length: Option<u64>,
    },
}

impl UploadData {
    /// Stream of unknown length
    pub fn stream(stream: ByteStream) -> Self {
        Self::Stream {
            stream,
            length: None,
        }
    }

    pub(crate) fn into_part_body(self) -> PartBody {
        match self {
            Self::Bytes(bytes) => PartBody::Bytes(bytes),
            Self::Stream { stream, length } => PartBody::Stream { stream, length },
        }
    }
}

impl From<Bytes> for UploadData {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for UploadData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for UploadData {
    fn from(bytes: &'static [u8]) -> Self {
        Self::Bytes(Bytes::from_static(bytes))
    }
}

/// In-flight upload; await it for the created resource.
///
/// Nothing is sent until the handle is polled. The upload is all or
/// nothing: on failure the caller retries the whole thing.
#[must_use = "uploads do nothing unless awaited"]
pub struct Upload<R> {
    inner: BoxFuture<'static, Result<R>>,
}

impl<R> Upload<R> {
    pub(crate) fn new(inner: impl Future<Output = Result<R>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }
}

impl<R> Future for Upload<R> {
    type Output = Result<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

/// Pending download of a binary body
#[must_use = "downloads do nothing until piped or streamed"]
pub struct Download {
    http: SharedHttp,
    endpoint: String,
}

impl Download {
    pub(crate) fn new(http: SharedHttp, endpoint: String) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Start the request and hand out the body as it arrives
    pub async fn into_stream(self) -> Result<ByteStream> {
        self.http.stream_download(&self.endpoint).await
    }

    /// Stream the body into `sink`, returning the number of bytes written.
    ///
    /// A gateway error fails before the sink sees a byte. A sink failure
    /// stops the transfer and is returned as [`Error::Sink`] holding the
    /// sink's own error.
    pub async fn pipe_to<W>(self, sink: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let endpoint = self.endpoint.clone();
        let stream = self.into_stream().await?;
        let written = pipe_stream(stream, sink).await?;
        tracing::debug!("downloaded {} bytes from {}", written, endpoint);
        Ok(written)
    }

    /// Collect the whole body in memory
    pub async fn bytes(self) -> Result<Bytes> {
        let chunks: Vec<Bytes> = self.into_stream().await?.try_collect().await?;
        Ok(chunks.concat().into())
    }
}

/// Copy chunks into `sink`, waiting on each write before pulling the next
pub(crate) async fn pipe_stream<W>(mut stream: ByteStream, sink: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        sink.write_all(&chunk).await.map_err(Error::Sink)?;
        written += chunk.len() as u64;
    }
    sink.flush().await.map_err(Error::Sink)?;
    Ok(written)
}
