//! End-to-end compressed-response tests
//!
//! The server compresses, the engine decodes transparently, and the body
//! decoder's content sniffing runs on the decompressed bytes.

#[cfg(test)]
mod tests {
    use nekocurl::{Error, RequestDescriptor, RequestEngine};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::common::{deflate, gzip};

    /// The query string comes back gzip-compressed as form data and
    /// decodes to the original pairs.
    #[tokio::test]
    async fn test_gzip_form_urlencoded_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/compression-url"))
            .and(query_param("Nekocurl", "is amazing"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/x-www-form-urlencoded")
                    .insert_header("content-encoding", "gzip")
                    .set_body_bytes(gzip(b"Nekocurl=is+amazing")),
            )
            .mount(&server)
            .await;

        let engine = RequestEngine::default();
        let descriptor = RequestDescriptor::get(&format!(
            "{}/compression-url?Nekocurl=is+amazing",
            server.uri()
        ))
        .unwrap();
        let result = engine.send(&descriptor).await.unwrap();

        assert_eq!(
            result.body.as_form().unwrap(),
            &[("Nekocurl".to_string(), "is amazing".to_string())]
        );
        // raw_body holds the post-decompression bytes
        assert_eq!(result.raw_body.as_ref(), b"Nekocurl=is+amazing");
    }

    /// deflate (zlib-wrapped) responses decode the same way.
    #[tokio::test]
    async fn test_deflate_response_decodes() {
        let server = MockServer::start().await;
        Mock::given(path("/deflated"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain")
                    .insert_header("content-encoding", "deflate")
                    .set_body_bytes(deflate(b"squeezed text")),
            )
            .mount(&server)
            .await;

        let engine = RequestEngine::default();
        let descriptor =
            RequestDescriptor::get(&format!("{}/deflated", server.uri())).unwrap();
        let result = engine.send(&descriptor).await.unwrap();

        assert_eq!(result.text, "squeezed text");
    }

    /// gzip-compressed JSON decodes through both layers.
    #[tokio::test]
    async fn test_gzip_json_decodes() {
        let server = MockServer::start().await;
        Mock::given(path("/gzipped-json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .insert_header("content-encoding", "gzip")
                    .set_body_bytes(gzip(b"{\"compressed\":true}")),
            )
            .mount(&server)
            .await;

        let engine = RequestEngine::default();
        let descriptor =
            RequestDescriptor::get(&format!("{}/gzipped-json", server.uri())).unwrap();
        let result = engine.send(&descriptor).await.unwrap();

        assert_eq!(result.body.as_json().unwrap()["compressed"], true);
    }

    /// A declared encoding over a garbage payload is a fatal
    /// decompression error.
    #[tokio::test]
    async fn test_corrupt_gzip_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(path("/broken"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-encoding", "gzip")
                    .set_body_bytes(b"definitely not gzip".to_vec()),
            )
            .mount(&server)
            .await;

        let engine = RequestEngine::default();
        let descriptor = RequestDescriptor::get(&format!("{}/broken", server.uri())).unwrap();
        let err = engine.send(&descriptor).await.unwrap_err();

        assert!(matches!(err, Error::Decompression { .. }));
    }
}
