//! Socket driver framing and transport-failure tests
//!
//! Canned raw TCP servers exercise the from-scratch driver's response
//! parsing — chunked and EOF-delimited bodies — and the transport error
//! paths a well-behaved HTTP server never shows.

#[cfg(test)]
mod tests {
    use nekocurl::{Error, RequestDescriptor, RequestEngine};

    use crate::common::{canned_server, closing_server, init_tracing, refused_address};

    /// A chunked body is reassembled in order.
    #[tokio::test]
    async fn test_chunked_response_body() {
        init_tracing();
        let address = canned_server(
            b"HTTP/1.1 200 OK\r\n\
              content-type: text/plain\r\n\
              transfer-encoding: chunked\r\n\
              \r\n\
              5\r\nhello\r\n7\r\n, world\r\n0\r\n\r\n",
        )
        .await;

        let engine = RequestEngine::default();
        let descriptor = RequestDescriptor::get(&format!("http://{address}/chunked")).unwrap();
        let result = engine.send(&descriptor).await.unwrap();

        assert_eq!(result.text, "hello, world");
    }

    /// Without content-length or chunking the body runs to connection
    /// close.
    #[tokio::test]
    async fn test_eof_delimited_body() {
        let address = canned_server(
            b"HTTP/1.1 200 OK\r\n\
              content-type: text/plain\r\n\
              connection: close\r\n\
              \r\n\
              everything until close",
        )
        .await;

        let engine = RequestEngine::default();
        let descriptor = RequestDescriptor::get(&format!("http://{address}/stream")).unwrap();
        let result = engine.send(&descriptor).await.unwrap();

        assert_eq!(result.text, "everything until close");
    }

    /// A missing reason phrase falls back to the canonical one.
    #[tokio::test]
    async fn test_missing_reason_phrase_is_filled_in() {
        let address = canned_server(
            b"HTTP/1.1 200\r\ncontent-length: 2\r\n\r\nok",
        )
        .await;

        let engine = RequestEngine::default();
        let descriptor = RequestDescriptor::get(&format!("http://{address}/bare")).unwrap();
        let result = engine.send(&descriptor).await.unwrap();

        assert_eq!(result.status_text, "OK");
        assert_eq!(result.text, "ok");
    }

    /// Closing before any response head is a transport error.
    #[tokio::test]
    async fn test_premature_close_is_a_transport_error() {
        let address = closing_server().await;

        let engine = RequestEngine::default();
        let descriptor = RequestDescriptor::get(&format!("http://{address}/gone")).unwrap();
        let err = engine.send(&descriptor).await.unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
    }

    /// A body cut short of its declared content-length is a transport
    /// error, not a truncated success.
    #[tokio::test]
    async fn test_truncated_body_is_a_transport_error() {
        let address = canned_server(
            b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\nshort",
        )
        .await;

        let engine = RequestEngine::default();
        let descriptor = RequestDescriptor::get(&format!("http://{address}/cut")).unwrap();
        let err = engine.send(&descriptor).await.unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
    }

    /// Nothing listening means a transport error, surfaced immediately.
    #[tokio::test]
    async fn test_connection_refused_is_a_transport_error() {
        let address = refused_address().await;

        let engine = RequestEngine::default();
        let descriptor = RequestDescriptor::get(&format!("http://{address}/nobody")).unwrap();
        let err = engine.send(&descriptor).await.unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
    }

    /// Garbage instead of an HTTP status line is a transport error.
    #[tokio::test]
    async fn test_non_http_response_is_a_transport_error() {
        let address = canned_server(b"220 smtp.example ESMTP ready\r\n").await;

        let engine = RequestEngine::default();
        let descriptor = RequestDescriptor::get(&format!("http://{address}/smtp")).unwrap();
        let err = engine.send(&descriptor).await.unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
    }
}
