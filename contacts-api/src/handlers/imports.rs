use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use contacts_core::sources::{
    candidates_from_page, preview_from_page, write_contacts_csv, CsvContactParser, VcfParser,
};
use contacts_core::ImportReconciler;
use shared_types::{BulkImportRequest, ImportCandidate, ImportResponse, ImportSource};
use std::sync::Arc;

use crate::config::ImportConfig;
use crate::database::contacts as contacts_db;
use crate::database::Database;
use crate::error::ApiError;
use crate::helpers::owner::OwnerId;
use crate::integrations::google_people::{GooglePeopleClient, GooglePeopleError};

pub const GOOGLE_TOKEN_HEADER: &str = "x-google-access-token";
const EXPORT_FILE_NAME: &str = "contacts_export.csv";

async fn reconcile(
    db: &Database,
    import_config: &ImportConfig,
    owner: &OwnerId,
    candidates: Vec<ImportCandidate>,
) -> Result<HttpResponse, ApiError> {
    let store = db.contact_store();
    let summary = ImportReconciler::new(&store)
        .with_policy(import_config.import_match)
        .reconcile(owner.as_str(), candidates)
        .await?;

    Ok(HttpResponse::Ok().json(ImportResponse {
        success: true,
        summary,
    }))
}

pub async fn import_bulk(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    import_config: web::Data<ImportConfig>,
    request: web::Json<BulkImportRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    if request.contacts.is_empty() {
        return Err(ApiError::Validation("No contacts provided".to_string()));
    }

    let candidates = request
        .contacts
        .into_iter()
        .map(|candidate| ImportCandidate {
            source: ImportSource::BulkApi,
            ..candidate
        })
        .collect();

    reconcile(&db, &import_config, &owner, candidates).await
}

pub async fn import_csv(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    import_config: web::Data<ImportConfig>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let candidates = CsvContactParser::new().parse_candidates(&body)?;
    tracing::info!("Parsed {} CSV rows for owner {}", candidates.len(), owner.as_str());

    reconcile(&db, &import_config, &owner, candidates).await
}

pub async fn import_vcf(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    import_config: web::Data<ImportConfig>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let candidates = VcfParser::new().parse_candidates(&body)?;
    tracing::info!("Parsed {} vCards for owner {}", candidates.len(), owner.as_str());

    reconcile(&db, &import_config, &owner, candidates).await
}

pub async fn export_csv(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
) -> Result<HttpResponse, ApiError> {
    let contacts = contacts_db::list_contacts(&db.async_connection, owner.as_str()).await?;
    let csv = write_contacts_csv(&contacts).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(EXPORT_FILE_NAME.to_string())],
        })
        .body(csv))
}

fn google_token(req: &HttpRequest) -> Result<String, ApiError> {
    req.headers()
        .get(GOOGLE_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated with Google".to_string()))
}

fn google_error(e: GooglePeopleError) -> ApiError {
    match e {
        GooglePeopleError::Unauthorized => {
            ApiError::Unauthorized("Not authenticated with Google".to_string())
        }
        other => ApiError::Upstream(other.to_string()),
    }
}

pub async fn import_google(
    owner: OwnerId,
    req: HttpRequest,
    db: web::Data<Arc<Database>>,
    import_config: web::Data<ImportConfig>,
    google: web::Data<Arc<GooglePeopleClient>>,
) -> Result<HttpResponse, ApiError> {
    let token = google_token(&req)?;
    let page_size = import_config.google_page_size;

    let page = google
        .list_connections(&token, page_size)
        .await
        .map_err(google_error)?;
    let candidates = candidates_from_page(&page, page_size);
    tracing::info!(
        "Google returned {} connections, {} with a phone, for owner {}",
        page.connections.len(),
        candidates.len(),
        owner.as_str()
    );

    reconcile(&db, &import_config, &owner, candidates).await
}

pub async fn preview_google(
    _owner: OwnerId,
    req: HttpRequest,
    import_config: web::Data<ImportConfig>,
    google: web::Data<Arc<GooglePeopleClient>>,
) -> Result<HttpResponse, ApiError> {
    let token = google_token(&req)?;
    let page_size = import_config.google_preview_page_size;

    let page = google
        .list_connections(&token, page_size)
        .await
        .map_err(google_error)?;

    Ok(HttpResponse::Ok().json(preview_from_page(&page, page_size)))
}
