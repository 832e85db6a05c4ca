use actix_web::{web, HttpResponse};
use contacts_core::StoreError;
use shared_types::{CreateDirectoryEntryRequest, DirectoryResponse, NumberLookupResponse};
use std::sync::Arc;

use crate::database::directory as directory_db;
use crate::database::Database;
use crate::error::ApiError;
use crate::helpers::owner::OwnerId;

pub async fn list_entries(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
) -> Result<HttpResponse, ApiError> {
    let entries = directory_db::list_entries(&db.async_connection, owner.as_str()).await?;
    Ok(HttpResponse::Ok().json(DirectoryResponse { entries }))
}

pub async fn create_entry(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    request: web::Json<CreateDirectoryEntryRequest>,
) -> Result<HttpResponse, ApiError> {
    let field = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let (phone, name) = match (field(&request.phone), field(&request.name)) {
        (Some(phone), Some(name)) => (phone, name),
        _ => {
            return Err(ApiError::Validation(
                "Phone and Name are required".to_string(),
            ))
        }
    };

    let entry = directory_db::insert_entry(&db.async_connection, owner.as_str(), &phone, &name)
        .await
        .map_err(|e| match e {
            StoreError::DuplicateKey { .. } => ApiError::duplicate("Phone already exists", None),
            other => other.into(),
        })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "entry": entry
    })))
}

/// Unknown-number lookup across every directory, not only the caller's.
pub async fn lookup_number(
    _owner: OwnerId,
    db: web::Data<Arc<Database>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let phone = path.into_inner();

    match directory_db::lookup_number(&db.async_connection, &phone).await? {
        Some(entry) => Ok(HttpResponse::Ok().json(NumberLookupResponse {
            found: true,
            name: entry.name,
            phone: entry.phone,
        })),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "found": false,
            "message": "Number not found"
        }))),
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_database;
    use crate::handlers::{configure, test_support};
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_directory_add_and_lookup() {
        let (_dir, db) = test_database();
        let (db_data, import, google) = test_support::app_data(&db, "http://127.0.0.1:9");
        let app = test::init_service(
            App::new()
                .app_data(db_data)
                .app_data(import)
                .app_data(google)
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/dataset")
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"phone": "555-000-1111"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Phone and Name are required");

        let req = test::TestRequest::post()
            .uri("/api/dataset")
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"phone": "555-000-1111", "name": "Pizza"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/dataset")
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"phone": "5550001111", "name": "Pizza"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Phone already exists");

        // Lookup is not limited to the caller's own entries
        let req = test::TestRequest::get()
            .uri("/api/dataset/5550001111")
            .insert_header(("user-id", "U2"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["found"], true);
        assert_eq!(body["name"], "Pizza");
        assert_eq!(body["phone"], "555-000-1111");

        let req = test::TestRequest::get()
            .uri("/api/dataset/123")
            .insert_header(test_support::OWNER)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["found"], false);
        assert_eq!(body["message"], "Number not found");
    }
}
