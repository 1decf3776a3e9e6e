//! `POST /api/mp4Meta` — the service's only real endpoint.
//!
//! Grounded on `main.go`'s `parseVideoInForm`: a method check, then
//! Open→Parse→ToJSON, with any failure along the way turned into the error
//! envelope instead of propagated. Panics are caught at this same boundary
//! the way `parseVideoInForm`'s `defer`/`recover` catches a panicking
//! `Fatal`, here by running the parse on its own task and inspecting the
//! `JoinError`.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::TryStreamExt;
use tokio_util::io::StreamReader;
use tracing::instrument;

use mp4_meta::error::{ApiError, ParseFault};

#[instrument(skip_all)]
pub async fn parse_video(req: Request) -> Response {
    if req.method() != Method::POST {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match tokio::spawn(run(req.into_body())).await {
        Ok(Ok(record)) => Json(record).into_response(),
        Ok(Err(api_err)) => api_err.into_response(),
        Err(join_err) if join_err.is_panic() => {
            ApiError::server_error(PanicMessage::from(join_err.into_panic())).into_response()
        }
        Err(join_err) => ApiError::server_error(join_err).into_response(),
    }
}

/// The body is read as a stream the whole way down: `into_data_stream`
/// bridged through `StreamReader` into an `AsyncRead`, so `mdat` never lands
/// in memory here any more than it does inside the scanner itself.
async fn run(body: Body) -> Result<mp4_meta::FileRecord, ApiError> {
    let stream = body
        .into_data_stream()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
    let reader = StreamReader::new(stream);

    let (metadata, total_size) = mp4_meta::scanner::scan(reader)
        .await
        .map_err(scan_fault_to_api)?;
    let mut record = mp4_meta::walker::walk(&metadata).map_err(ApiError::metadata_read)?;
    record.size = total_size;
    Ok(record)
}

fn scan_fault_to_api(fault: ParseFault) -> ApiError {
    if matches!(&fault, ParseFault::UnsupportedBrand(_)) {
        ApiError::codec_not_supported(fault)
    } else {
        ApiError::invalid_mp4(fault)
    }
}

/// The panic payload caught at the handler boundary, rendered as a string so
/// it can ride inside an `ApiError`'s cause chain.
#[derive(Debug)]
struct PanicMessage(String);

impl From<Box<dyn std::any::Any + Send>> for PanicMessage {
    fn from(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        PanicMessage(message)
    }
}

impl std::fmt::Display for PanicMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PanicMessage {}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::any;
    use axum::Router;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route("/api/mp4Meta", any(parse_video))
    }

    /// `ftyp` + `mvhd` + `mdat`, no tracks — enough to exercise the full
    /// scan/walk/serialize round trip without a `trak` box.
    fn minimal_file(brand: &[u8; 4]) -> Vec<u8> {
        let mut ftyp = Vec::new();
        ftyp.extend_from_slice(&16u32.to_be_bytes());
        ftyp.extend_from_slice(b"ftyp");
        ftyp.extend_from_slice(brand);
        ftyp.extend_from_slice(&0u32.to_be_bytes());

        let mut mvhd = Vec::new();
        mvhd.extend_from_slice(&36u32.to_be_bytes());
        mvhd.extend_from_slice(b"mvhd");
        mvhd.push(0);
        mvhd.extend_from_slice(&[0, 0, 0]);
        mvhd.extend_from_slice(&0u32.to_be_bytes());
        mvhd.extend_from_slice(&0u32.to_be_bytes());
        mvhd.extend_from_slice(&1000u32.to_be_bytes());
        mvhd.extend_from_slice(&5000u32.to_be_bytes());
        mvhd.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        mvhd.extend_from_slice(&0x0100_0000u32.to_be_bytes());

        let mut moov = Vec::new();
        moov.extend_from_slice(&((8 + mvhd.len()) as u32).to_be_bytes());
        moov.extend_from_slice(b"moov");
        moov.extend_from_slice(&mvhd);

        let mut mdat = Vec::new();
        mdat.extend_from_slice(&16u32.to_be_bytes());
        mdat.extend_from_slice(b"mdat");
        mdat.extend_from_slice(&[0xAAu8; 8]);

        let mut file = ftyp;
        file.extend_from_slice(&moov);
        file.extend_from_slice(&mdat);
        file
    }

    #[tokio::test]
    async fn well_formed_file_returns_json_record() {
        let data = minimal_file(b"isom");
        let total_len = data.len() as u64;
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/mp4Meta")
                    .body(Body::from(data))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["Codec"], "ISO 14496-1 Base Media");
        assert_eq!(json["Size"], total_len);
        assert_eq!(json["Movie"]["Duration"], 5.0);
    }

    #[tokio::test]
    async fn unrecognised_brand_reports_codec_not_supported() {
        let data = minimal_file(b"xyz1");
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/mp4Meta")
                    .body(Body::from(data))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["Error"], "codec not supported");
    }

    #[tokio::test]
    async fn non_post_method_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/mp4Meta")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_body_reports_invalid_mp4() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/mp4Meta")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["Error"], "file is not a valid MP4");
    }
}
