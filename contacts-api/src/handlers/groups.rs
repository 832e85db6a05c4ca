use actix_web::{web, HttpResponse};
use shared_types::{CreateGroupRequest, GroupsResponse, UpdateGroupRequest};
use std::sync::Arc;

use crate::database::groups as groups_db;
use crate::database::Database;
use crate::error::ApiError;
use crate::helpers::owner::OwnerId;

fn group_not_found() -> ApiError {
    ApiError::NotFound("Group not found".to_string())
}

pub async fn list_groups(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
) -> Result<HttpResponse, ApiError> {
    let groups = groups_db::list_groups(&db.async_connection, owner.as_str()).await?;
    Ok(HttpResponse::Ok().json(GroupsResponse { groups }))
}

pub async fn create_group(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    request: web::Json<CreateGroupRequest>,
) -> Result<HttpResponse, ApiError> {
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::Validation("Group name is required".to_string()))?;

    let group = groups_db::create_group(
        &db.async_connection,
        owner.as_str(),
        name,
        request.description.as_deref(),
        &request.members,
    )
    .await?;

    Ok(HttpResponse::Created().json(group))
}

pub async fn update_group(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    path: web::Path<i64>,
    request: web::Json<UpdateGroupRequest>,
) -> Result<HttpResponse, ApiError> {
    let name = request.name.as_deref().map(str::trim);
    if name == Some("") {
        return Err(ApiError::Validation("Group name cannot be empty".to_string()));
    }

    let group = groups_db::update_group(
        &db.async_connection,
        owner.as_str(),
        path.into_inner(),
        name,
        request.description.as_deref(),
        request.members.as_deref(),
    )
    .await?
    .ok_or_else(group_not_found)?;

    Ok(HttpResponse::Ok().json(group))
}

pub async fn delete_group(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    if !groups_db::delete_group(&db.async_connection, owner.as_str(), path.into_inner()).await? {
        return Err(group_not_found());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Group deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use crate::database::test_database;
    use crate::handlers::{configure, test_support};
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_group_lifecycle() {
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
            .uri("/api/contacts")
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"name": "Ann", "phone": "111"}))
            .to_request();
        let ann: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/groups")
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"name": "Family", "members": [ann["id"]]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let group: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(group["members"][0]["name"], "Ann");
        assert_eq!(group["members"][0]["initial"], "A");
        let group_id = group["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/api/groups/{group_id}"))
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"members": []}))
            .to_request();
        let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["name"], "Family");
        assert_eq!(updated["members"].as_array().unwrap().len(), 0);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/groups/{group_id}"))
            .insert_header(("user-id", "U2"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/groups/{group_id}"))
            .insert_header(test_support::OWNER)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/groups")
            .insert_header(test_support::OWNER)
            .to_request();
        let listed: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed["groups"].as_array().unwrap().len(), 0);
    }
}
