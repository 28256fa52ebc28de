//! Report endpoint: generation API call, document rendering, file response.

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::Response;

use super::sniff_image_mime;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::report::prompt::build_report_prompt;
use crate::report::{docx, pdf, ReportContext, ReportFormat};

/// `POST /generate_report` — call the generation API with the image and
/// classification, render the narrative into the requested format, and
/// stream the file back with a fixed download filename.
pub async fn generate(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut file: Option<Vec<u8>> = None;
    let mut prediction: Option<String> = None;
    let mut confidence: Option<String> = None;
    let mut language: Option<String> = None;
    let mut report_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or("") {
            "file" => file = Some(field.bytes().await?.to_vec()),
            "prediction" => prediction = Some(field.text().await?),
            "confidence" => confidence = Some(field.text().await?),
            "language" => language = Some(field.text().await?),
            "report_type" => report_type = Some(field.text().await?),
            _ => {}
        }
    }

    let file = file.ok_or_else(|| missing("file"))?;
    let prediction = prediction.ok_or_else(|| missing("prediction"))?;
    let confidence: f64 = confidence
        .ok_or_else(|| missing("confidence"))?
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest("Field `confidence` must be a number".into()))?;
    let language = language.ok_or_else(|| missing("language"))?;
    let report_type = report_type.ok_or_else(|| missing("report_type"))?;

    // Uniform failure policy: an unknown format is a 500 like any other
    // downstream failure, not a validation error.
    let format = ReportFormat::parse(&report_type)
        .ok_or_else(|| ApiError::Internal(format!("Unsupported report type '{report_type}'")))?;

    let report_ctx = ReportContext {
        prediction,
        confidence,
        language,
    };

    let prompt = build_report_prompt(&report_ctx);
    let mime = sniff_image_mime(&file);
    let text = ctx.generator.generate(&file, mime, &prompt).await?;

    let bytes = match format {
        ReportFormat::Pdf => {
            let font_path = ctx.config.arabic_font_path.clone();
            let report_ctx = report_ctx.clone();
            tokio::task::spawn_blocking(move || pdf::render_pdf(&text, &report_ctx, &font_path))
                .await??
        }
        ReportFormat::Word => {
            let report_ctx = report_ctx.clone();
            tokio::task::spawn_blocking(move || docx::render_docx(&text, &report_ctx)).await??
        }
    };

    tracing::info!(
        prediction = %report_ctx.prediction,
        language = %report_ctx.language,
        filename = format.filename(),
        size = bytes.len(),
        "Report rendered"
    );

    file_response(format, bytes)
}

fn missing(field: &str) -> ApiError {
    ApiError::BadRequest(format!("Missing required field `{field}`"))
}

/// Binary file response with the format's fixed download filename.
fn file_response(format: ReportFormat, bytes: Vec<u8>) -> Result<Response, ApiError> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.mime_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", format.filename()),
        );

    if format == ReportFormat::Pdf {
        builder = builder.header(header::CACHE_CONTROL, "no-cache");
    }

    builder
        .body(Body::from(bytes))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
