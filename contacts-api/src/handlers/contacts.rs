use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shared_types::{ContactsResponse, CreateContactRequest, GeoPoint, UpdateContactRequest};
use std::sync::Arc;

use crate::config::ImportConfig;
use crate::database::contacts as contacts_db;
use crate::database::Database;
use crate::error::ApiError;
use crate::helpers::owner::OwnerId;

const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;

pub async fn list_contacts(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
) -> Result<HttpResponse, ApiError> {
    let contacts = contacts_db::list_contacts(&db.async_connection, owner.as_str()).await?;
    Ok(HttpResponse::Ok().json(ContactsResponse { contacts }))
}

pub async fn create_contact(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    import_config: web::Data<ImportConfig>,
    request: web::Json<CreateContactRequest>,
) -> Result<HttpResponse, ApiError> {
    let store = db.contact_store();
    let contact = contacts_core::create_contact(
        &store,
        owner.as_str(),
        &request,
        import_config.create_match,
    )
    .await?;

    tracing::info!("Created contact {} for owner {}", contact.id, owner.as_str());
    Ok(HttpResponse::Created().json(contact))
}

pub async fn get_contact(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let contact = contacts_db::get_contact(&db.async_connection, owner.as_str(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))?;

    Ok(HttpResponse::Ok().json(contact))
}

pub async fn update_contact(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    path: web::Path<i64>,
    request: web::Json<UpdateContactRequest>,
) -> Result<HttpResponse, ApiError> {
    let contact = contacts_db::update_contact(
        &db.async_connection,
        owner.as_str(),
        path.into_inner(),
        &request,
    )
    .await?;

    Ok(HttpResponse::Ok().json(contact))
}

pub async fn delete_contact(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let deleted =
        contacts_db::delete_contact(&db.async_connection, owner.as_str(), path.into_inner())
            .await?;
    if !deleted {
        return Err(ApiError::NotFound("Contact not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Contact deleted successfully"
    })))
}

/// Raw query values; numbers are parsed by the handler so bad input still gets a JSON error.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    /// Kilometres
    pub radius: Option<String>,
}

fn parse_number(value: Option<&str>) -> Option<Result<f64, ()>> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    Some(value.parse::<f64>().ok().filter(|n| n.is_finite()).ok_or(()))
}

pub async fn nearby_contacts(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    query: web::Query<NearbyQuery>,
) -> Result<HttpResponse, ApiError> {
    let (lat, lng) = match (
        parse_number(query.lat.as_deref()),
        parse_number(query.lng.as_deref()),
    ) {
        (Some(Ok(lat)), Some(Ok(lng))) => (lat, lng),
        _ => {
            return Err(ApiError::Validation(
                "Latitude and longitude required".to_string(),
            ))
        }
    };
    let radius = match parse_number(query.radius.as_deref()) {
        None => DEFAULT_NEARBY_RADIUS_KM,
        Some(Ok(radius)) if radius >= 0.0 => radius,
        Some(_) => {
            return Err(ApiError::Validation(
                "Radius must be a non-negative number".to_string(),
            ))
        }
    };

    let contacts = contacts_db::nearby_contacts(
        &db.async_connection,
        owner.as_str(),
        GeoPoint { lat, lng },
        radius,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ContactsResponse { contacts }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;
    use crate::handlers::{configure, test_support};
    use actix_web::{http::StatusCode, test, App};

    macro_rules! test_app {
        ($db:expr) => {{
            let (db, import, google) = test_support::app_data(&$db, "http://127.0.0.1:9");
            test::init_service(
                App::new()
                    .app_data(db)
                    .app_data(import)
                    .app_data(google)
                    .configure(configure),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_missing_owner_header_is_unauthorized() {
        let (_dir, db) = test_database();
        let app = test_app!(db);

        let req = test::TestRequest::get().uri("/api/contacts").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "User ID required");
    }

    #[actix_web::test]
    async fn test_create_rejects_phone_then_name_duplicates() {
        let (_dir, db) = test_database();
        let app = test_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"name": "Ann", "phone": "+1 (555) 111-2222"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(created["phoneNormalized"], "15551112222");
        assert_eq!(created["initial"], "A");
        assert_eq!(created["type"], "personal");

        // Same phone and same name: the phone conflict is reported
        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"name": "ann", "phone": "15551112222"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Phone number already exists in contacts");
        assert_eq!(body["existingContact"]["name"], "Ann");

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"name": "ANN", "phone": "999"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Name already exists");

        // Another owner is unaffected
        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(("user-id", "U2"))
            .set_json(serde_json::json!({"name": "Ann", "phone": "15551112222"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn test_update_and_delete_routes() {
        let (_dir, db) = test_database();
        let app = test_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"name": "Ann", "phone": "111"}))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/api/contacts/{id}"))
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"name": "bea"}))
            .to_request();
        let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["name"], "bea");
        assert_eq!(updated["initial"], "B");
        assert_eq!(updated["phone"], "111");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/contacts/{id}"))
            .insert_header(("user-id", "someone-else"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/contacts/{id}"))
            .insert_header(test_support::OWNER)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/api/contacts/{id}"))
            .insert_header(test_support::OWNER)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_nearby_requires_coordinates() {
        let (_dir, db) = test_database();
        let app = test_app!(db);

        let req = test::TestRequest::get()
            .uri("/api/contacts/nearby?lat=48.85")
            .insert_header(test_support::OWNER)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Latitude and longitude required");

        for uri in [
            "/api/contacts/nearby?lat=&lng=2.35",
            "/api/contacts/nearby?lat=abc&lng=2.35",
        ] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header(test_support::OWNER)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], "Latitude and longitude required", "{uri}");
        }

        let req = test::TestRequest::get()
            .uri("/api/contacts/nearby?lat=48.85&lng=2.35&radius=far")
            .insert_header(test_support::OWNER)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Radius must be a non-negative number");

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({
                "name": "Cafe",
                "phone": "1",
                "location": {"lat": 48.8570, "lng": 2.3520}
            }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/api/contacts/nearby?lat=48.8566&lng=2.3522&radius=1")
            .insert_header(test_support::OWNER)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["contacts"][0]["name"], "Cafe");
    }
}
