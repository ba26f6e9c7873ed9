//! HTTP/1.1 Framing
//!
//! Reads one request off a socket and writes one response back.
//! Parsing is done by `httparse`; requests and responses are carried as
//! `http` crate types so the router never sees raw bytes.

use std::io::Write as _;
use std::time::Duration;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

/// Largest accepted request head (request line + headers).
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Most headers accepted on one request.
const MAX_HEADERS: usize = 32;

const READ_CHUNK: usize = 1024;

/// Most unread request bytes discarded while closing a connection.
pub const DRAIN_LIMIT: u64 = 1024 * 1024;

/// Request could not be read.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request head is not valid HTTP/1.x.
    #[error("malformed request: {0}")]
    Parse(#[from] httparse::Error),

    /// Method, URI or header rejected by the `http` crate.
    #[error("invalid request: {0}")]
    Invalid(#[from] http::Error),

    /// Request head grew past [`MAX_HEAD_BYTES`].
    #[error("request head exceeds {} bytes", MAX_HEAD_BYTES)]
    HeadTooLarge,

    /// Declared body is larger than allowed.
    #[error("request body of {length} bytes exceeds limit of {limit}")]
    BodyTooLarge {
        /// Declared Content-Length.
        length: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Content-Length header is not a number.
    #[error("invalid Content-Length header")]
    BadContentLength,

    /// Chunked or other transfer codings.
    #[error("transfer encodings are not supported")]
    UnsupportedTransferEncoding,

    /// Peer closed before a full request arrived.
    #[error("connection closed mid-request")]
    Incomplete,
}

impl HttpError {
    /// Status to answer with, or `None` when the peer cannot be answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Io(_) | HttpError::Incomplete => None,
            HttpError::Parse(httparse::Error::TooManyHeaders) | HttpError::HeadTooLarge => {
                Some(StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE)
            }
            HttpError::Parse(_) | HttpError::Invalid(_) | HttpError::BadContentLength => {
                Some(StatusCode::BAD_REQUEST)
            }
            HttpError::BodyTooLarge { .. } => Some(StatusCode::PAYLOAD_TOO_LARGE),
            HttpError::UnsupportedTransferEncoding => Some(StatusCode::NOT_IMPLEMENTED),
        }
    }
}

/// Parsed request line and headers.
struct Head {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    len: usize,
}

fn parse_head(buf: &[u8]) -> Result<Option<Head>, HttpError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);

    let len = match req.parse(buf)? {
        httparse::Status::Complete(n) => n,
        httparse::Status::Partial => return Ok(None),
    };

    // Complete parses always carry method and path
    let method = Method::from_bytes(req.method.unwrap_or_default().as_bytes())
        .map_err(http::Error::from)?;
    let uri: Uri = req
        .path
        .unwrap_or("/")
        .parse()
        .map_err(http::Error::from)?;

    let mut map = HeaderMap::with_capacity(req.headers.len());
    for h in req.headers.iter() {
        let name = HeaderName::from_bytes(h.name.as_bytes()).map_err(http::Error::from)?;
        let value = HeaderValue::from_bytes(h.value).map_err(http::Error::from)?;
        map.append(name, value);
    }

    Ok(Some(Head {
        method,
        uri,
        headers: map,
        len,
    }))
}

fn content_length(headers: &HeaderMap) -> Result<usize, HttpError> {
    match headers.get(CONTENT_LENGTH) {
        None => Ok(0),
        Some(v) => v
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .ok_or(HttpError::BadContentLength),
    }
}

/// Read a single request, body included.
///
/// Bytes past the declared body (pipelined requests) are discarded; the
/// connection is closed after one exchange.
pub async fn read_request<S>(stream: &mut S, max_body: usize) -> Result<Request<Vec<u8>>, HttpError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    let head = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(HttpError::Incomplete);
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(head) = parse_head(&buf)? {
            if head.len > MAX_HEAD_BYTES {
                return Err(HttpError::HeadTooLarge);
            }
            break head;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(HttpError::HeadTooLarge);
        }
    };

    if head.headers.contains_key(TRANSFER_ENCODING) {
        return Err(HttpError::UnsupportedTransferEncoding);
    }

    let length = content_length(&head.headers)?;
    if length > max_body {
        return Err(HttpError::BodyTooLarge {
            length,
            limit: max_body,
        });
    }

    let mut body = buf.split_off(head.len);
    while body.len() < length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(HttpError::Incomplete);
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(length);

    let mut request = Request::builder()
        .method(head.method)
        .uri(head.uri)
        .body(body)?;
    *request.headers_mut() = head.headers;

    Ok(request)
}

/// Encode a response onto the socket and flush it.
///
/// `head_only` drops the body but keeps its Content-Length (HEAD requests).
pub async fn write_response<S>(
    stream: &mut S,
    response: &Response<Vec<u8>>,
    head_only: bool,
) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let status = response.status();
    let body = response.body();

    let mut out = Vec::with_capacity(256 + body.len());
    write!(
        out,
        "HTTP/1.1 {} {}\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )?;
    for (name, value) in response.headers() {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    if !response.headers().contains_key(CONTENT_LENGTH) {
        write!(out, "content-length: {}\r\n", body.len())?;
    }
    out.extend_from_slice(b"connection: close\r\n\r\n");
    if !head_only {
        out.extend_from_slice(body);
    }

    stream.write_all(&out).await?;
    stream.flush().await
}

/// Half-close the connection, then discard whatever the client is still
/// sending, up to [`DRAIN_LIMIT`] bytes or `linger`.
///
/// Dropping a socket with unread input resets it, and a reset can destroy
/// a response the client has not read yet.
pub async fn close_gracefully<S>(stream: &mut S, linger: Duration)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if stream.shutdown().await.is_err() {
        return;
    }
    let mut rest = (&mut *stream).take(DRAIN_LIMIT);
    let _ = timeout(linger, tokio::io::copy(&mut rest, &mut tokio::io::sink())).await;
}

/// Response with a body and content type.
pub fn response_with(
    status: StatusCode,
    content_type: &'static str,
    body: Vec<u8>,
) -> Response<Vec<u8>> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Plain-text response.
pub fn text_response(status: StatusCode, text: impl Into<String>) -> Response<Vec<u8>> {
    response_with(status, "text/plain; charset=utf-8", text.into().into_bytes())
}

/// JSON response from already-serialized bytes.
pub fn json_response(status: StatusCode, body: Vec<u8>) -> Response<Vec<u8>> {
    response_with(status, "application/json; charset=utf-8", body)
}

/// Response with no body.
pub fn empty_response(status: StatusCode) -> Response<Vec<u8>> {
    let mut response = Response::new(Vec::new());
    *response.status_mut() = status;
    response
}
