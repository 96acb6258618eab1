//! End-to-end multipart upload tests
//!
//! Encodes attachments through the engine and checks what a compliant
//! server-side parser sees: part kinds, filenames, content types and
//! byte-identical payloads.

#[cfg(test)]
mod tests {
    use nekocurl::core::multipart;
    use nekocurl::{FileAttachment, RequestDescriptor, RequestEngine};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::common::parse_multipart;

    /// One file part and one plain field arrive distinguishable and
    /// byte-identical.
    #[tokio::test]
    async fn test_file_and_field_parts_arrive_intact() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/post"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let image = b"\x89PNG\r\n\x1a\nimagebytes".to_vec();
        let engine = RequestEngine::default();
        let descriptor = RequestDescriptor::post(&format!("{}/post", server.uri()))
            .unwrap()
            .attach(FileAttachment::file("image", image.clone(), "image.png"))
            .attach(FileAttachment::field("test", "hahaha"));
        engine.send(&descriptor).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let content_type = requests[0]
            .headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data; boundary="));

        let parts = parse_multipart(&content_type, &requests[0].body);
        assert_eq!(parts.len(), 2);

        assert_eq!(parts[0].name, "image");
        assert_eq!(parts[0].filename.as_deref(), Some("image.png"));
        assert_eq!(parts[0].content_type.as_deref(), Some("image/png"));
        assert_eq!(parts[0].data, image);

        assert_eq!(parts[1].name, "test");
        assert_eq!(parts[1].filename, None);
        assert_eq!(parts[1].content_type, None);
        assert_eq!(parts[1].data, b"hahaha");
    }

    /// Encoding then parsing with the server-side parser round-trips every
    /// field name, filename and payload.
    #[tokio::test]
    async fn test_multipart_round_trip_without_network() {
        let attachments = vec![
            FileAttachment::file("binary", vec![0u8, 1, 2, 253, 254, 255], "data.bin"),
            FileAttachment::field("comment", "first comment"),
            FileAttachment::file("page", &b"<html></html>"[..], "index.html"),
        ];
        let encoded = multipart::encode(&attachments);
        let parts = parse_multipart(&encoded.content_type(), encoded.bytes());

        assert_eq!(parts.len(), attachments.len());
        for (part, attachment) in parts.iter().zip(&attachments) {
            assert_eq!(part.name, attachment.field_name);
            assert_eq!(part.filename, attachment.filename);
            assert_eq!(part.data, attachment.data.as_ref());
        }
        assert_eq!(parts[0].content_type.as_deref(), Some("application/octet-stream"));
        assert_eq!(parts[2].content_type.as_deref(), Some("text/html"));
    }

    /// An unknown extension falls back to application/octet-stream on the
    /// wire.
    #[tokio::test]
    async fn test_unknown_extension_uses_octet_stream() {
        let encoded = multipart::encode(&[FileAttachment::file("blob", &b"??"[..], "file.xyz")]);
        let parts = parse_multipart(&encoded.content_type(), encoded.bytes());
        assert_eq!(
            parts[0].content_type.as_deref(),
            Some("application/octet-stream")
        );
    }
}
