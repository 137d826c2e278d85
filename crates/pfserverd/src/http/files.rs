//! Regular-file responses, delegated to `tower-http`.

use std::convert::Infallible;
use std::path::Path;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::response::{FILE_NOT_FOUND, error_response};

/// Serves `path` for `request`.
///
/// `ServeFile` guesses the content type and answers `HEAD`, `Range`, and
/// `If-Modified-Since` requests. A file that disappears after routing is
/// reported as `404 File not found`.
pub(crate) async fn serve_file(path: &Path, request: Request) -> Response {
    let result: Result<_, Infallible> = ServeFile::new(path).oneshot(request).await;
    match result {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => {
            error_response(StatusCode::NOT_FOUND, FILE_NOT_FOUND)
        }
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use http_body_util::BodyExt;
    use std::fs;

    fn get(headers: &[(header::HeaderName, &str)]) -> Request {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(name.clone(), *value);
        }
        builder.body(Body::empty()).expect("request")
    }

    async fn body_text(response: Response) -> String {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[tokio::test]
    async fn streams_file_with_guessed_type() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").expect("write file");

        let response = serve_file(&path, get(&[])).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body_text(response).await, "hello");
    }

    #[tokio::test]
    async fn unknown_extensions_fall_back_to_octet_stream() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("blob.zzzunknown");
        fs::write(&path, [0_u8, 1, 2]).expect("write file");

        let response = serve_file(&path, get(&[])).await;
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn byte_ranges_are_honoured() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("alphabet.txt");
        fs::write(&path, "abcdefgh").expect("write file");

        let response = serve_file(&path, get(&[(header::RANGE, "bytes=2-4")])).await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 2-4/8");
        assert_eq!(body_text(response).await, "cde");
    }

    #[tokio::test]
    async fn unchanged_files_answer_not_modified() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").expect("write file");

        let first = serve_file(&path, get(&[])).await;
        let modified = first.headers()[header::LAST_MODIFIED]
            .to_str()
            .expect("ascii last-modified")
            .to_owned();

        let second = serve_file(&path, get(&[(header::IF_MODIFIED_SINCE, modified.as_str())])).await;
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn vanished_file_is_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let response = serve_file(&dir.path().join("gone.bin"), get(&[])).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Message: File not found."));
    }
}
