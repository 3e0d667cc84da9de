use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde_json::json;

use crate::intake::{self, IntakeError};
use crate::models::{ErrorBody, Payload};
use crate::relay::{RelayClient, RelayError};

/// Raw multipart form contents, before any validation.
struct Upload {
    /// `None` when no file part was present at all.
    filename: Option<String>,
    bytes: Vec<u8>,
    dataset_type: String,
}

pub async fn predict(mut form: Multipart, relay: web::Data<RelayClient>) -> HttpResponse {
    let upload = match read_upload(&mut form).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    // Intake validation happens entirely before the outbound call.
    if let Err(e) = intake::validate_filename(upload.filename.as_deref()) {
        return rejected(e);
    }
    let dataset_type = match intake::parse_dataset_type(&upload.dataset_type) {
        Ok(dataset_type) => dataset_type,
        Err(e) => return rejected(e),
    };
    let table = match intake::parse_csv(&upload.bytes) {
        Ok(table) => table,
        Err(e) => return rejected(e),
    };

    log::debug!(
        "relaying {} rows x {} columns as {}",
        table.row_count(),
        table.columns.len(),
        dataset_type
    );
    let payload = Payload::from_table(table, dataset_type);

    match relay.submit(&payload).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e @ RelayError::Timeout) => {
            log::error!("{}", e);
            HttpResponse::GatewayTimeout().json(ErrorBody::new(e.to_string()))
        }
        Err(e @ RelayError::Transport(_)) => {
            log::error!("{}", e);
            HttpResponse::InternalServerError().json(ErrorBody::new(e.to_string()))
        }
        Err(RelayError::Remote { status, body }) => {
            log::error!("prediction API returned {}: {}", status, body);
            HttpResponse::InternalServerError().json(ErrorBody::with_details(
                format!("Prediction API returned error: {}", status),
                body,
            ))
        }
    }
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "healthy"}))
}

/// Pull the `file` and `dataset_type` parts out of the multipart
/// stream. Unknown parts are drained and ignored; stream-level errors
/// short-circuit to a 400 response.
async fn read_upload(form: &mut Multipart) -> Result<Upload, HttpResponse> {
    let mut filename = None;
    let mut bytes = Vec::new();
    let mut dataset_type = String::new();

    while let Some(item) = form.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => return Err(rejected_multipart(e)),
        };
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or("").to_string();
        let part_filename = disposition.get_filename().map(str::to_string);

        let mut value = Vec::new();
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(data) => value.extend_from_slice(&data),
                Err(e) => return Err(rejected_multipart(e)),
            }
        }

        match name.as_str() {
            "file" => {
                filename = part_filename;
                bytes = value;
            }
            "dataset_type" => {
                dataset_type = String::from_utf8_lossy(&value).into_owned();
            }
            _ => {}
        }
    }

    Ok(Upload {
        filename,
        bytes,
        dataset_type,
    })
}

fn rejected(e: IntakeError) -> HttpResponse {
    log::warn!("upload rejected: {}", e);
    HttpResponse::BadRequest().json(ErrorBody::new(e.to_string()))
}

fn rejected_multipart(e: actix_multipart::MultipartError) -> HttpResponse {
    log::warn!("malformed multipart form: {}", e);
    HttpResponse::BadRequest().json(ErrorBody::new("Invalid multipart form data"))
}
