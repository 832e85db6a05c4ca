use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use shared_types::{CreateTodoRequest, TodoFilter, TodosResponse, UpdateTodoRequest};
use std::sync::Arc;

use crate::database::todos::{self as todos_db, TodoChanges};
use crate::database::Database;
use crate::error::ApiError;
use crate::helpers::owner::OwnerId;

fn todo_not_found() -> ApiError {
    ApiError::NotFound("Todo not found".to_string())
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only the calendar day.
/// Empty input means no due date.
fn parse_due_date(value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map(Some)
        .map_err(|_| ApiError::Validation("Invalid due date".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct TodosQuery {
    pub filter: Option<String>,
}

pub async fn list_todos(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    query: web::Query<TodosQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = TodoFilter::from_query(query.filter.as_deref());
    let today = chrono::Local::now().date_naive();

    let todos = todos_db::list_todos(&db.async_connection, owner.as_str(), filter, today).await?;
    Ok(HttpResponse::Ok().json(TodosResponse { todos }))
}

pub async fn create_todo(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    request: web::Json<CreateTodoRequest>,
) -> Result<HttpResponse, ApiError> {
    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::Validation("Description is required".to_string()))?;
    let due_date = parse_due_date(request.due_date.as_deref())?;

    let todo =
        todos_db::create_todo(&db.async_connection, owner.as_str(), description, due_date).await?;

    Ok(HttpResponse::Created().json(todo))
}

pub async fn update_todo(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    path: web::Path<i64>,
    request: web::Json<UpdateTodoRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();

    let description = match request.description.as_deref().map(str::trim) {
        Some("") => {
            return Err(ApiError::Validation(
                "Description cannot be empty".to_string(),
            ))
        }
        other => other.map(str::to_string),
    };
    let due_date = match request.due_date.as_deref() {
        Some(value) => Some(parse_due_date(Some(value))?),
        None => None,
    };

    let todo = todos_db::update_todo(
        &db.async_connection,
        owner.as_str(),
        path.into_inner(),
        TodoChanges {
            description,
            due_date,
            is_completed: request.is_completed,
        },
    )
    .await?
    .ok_or_else(todo_not_found)?;

    Ok(HttpResponse::Ok().json(todo))
}

pub async fn complete_todo(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let todo = todos_db::complete_todo(&db.async_connection, owner.as_str(), path.into_inner())
        .await?
        .ok_or_else(todo_not_found)?;

    Ok(HttpResponse::Ok().json(todo))
}

pub async fn delete_todo(
    owner: OwnerId,
    db: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    if !todos_db::delete_todo(&db.async_connection, owner.as_str(), path.into_inner()).await? {
        return Err(todo_not_found());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Todo deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;
    use crate::handlers::{configure, test_support};
    use actix_web::{http::StatusCode, test, App};
    use chrono::Duration;

    #[::core::prelude::v1::test]
    fn test_parse_due_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 10);
        assert_eq!(parse_due_date(Some("2024-03-10")).unwrap(), expected);
        assert_eq!(parse_due_date(Some("2024-03-10T18:30:00Z")).unwrap(), expected);
        assert_eq!(parse_due_date(Some("  ")).unwrap(), None);
        assert!(parse_due_date(Some("next week")).is_err());
    }

    #[actix_web::test]
    async fn test_todo_lifecycle() {
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

        let today = chrono::Local::now().date_naive();
        let yesterday = (today - Duration::days(1)).to_string();
        let next_week = (today + Duration::days(7)).to_string();

        let req = test::TestRequest::post()
            .uri("/api/todos")
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"dueDate": next_week}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Description is required");

        let mut ids = Vec::new();
        for (description, due_date) in [
            ("plan trip", Some(next_week.clone())),
            ("pay bill", Some(yesterday.clone())),
            ("call Ann", Some(today.to_string())),
            ("read book", None),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/todos")
                .insert_header(test_support::OWNER)
                .set_json(serde_json::json!({"description": description, "dueDate": due_date}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let todo: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(todo["isCompleted"], false);
            ids.push(todo["id"].as_i64().unwrap());
        }

        let list = |filter: &str| {
            test::TestRequest::get()
                .uri(&format!("/api/todos?filter={filter}"))
                .insert_header(test_support::OWNER)
                .to_request()
        };
        let descriptions = |body: serde_json::Value| {
            body["todos"]
                .as_array()
                .unwrap()
                .iter()
                .map(|t| t["description"].as_str().unwrap().to_string())
                .collect::<Vec<_>>()
        };

        let body = test::call_and_read_body_json(&app, list("all")).await;
        assert_eq!(
            descriptions(body),
            vec!["read book", "pay bill", "call Ann", "plan trip"]
        );
        let body = test::call_and_read_body_json(&app, list("today")).await;
        assert_eq!(descriptions(body), vec!["call Ann"]);
        let body = test::call_and_read_body_json(&app, list("upcoming")).await;
        assert_eq!(descriptions(body), vec!["call Ann", "plan trip"]);
        let body = test::call_and_read_body_json(&app, list("past")).await;
        assert_eq!(descriptions(body), vec!["pay bill"]);

        let req = test::TestRequest::put()
            .uri(&format!("/api/todos/{}", ids[1]))
            .insert_header(test_support::OWNER)
            .set_json(serde_json::json!({"description": "pay rent", "dueDate": ""}))
            .to_request();
        let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["description"], "pay rent");
        assert!(updated["dueDate"].is_null());

        let req = test::TestRequest::patch()
            .uri(&format!("/api/todos/{}/complete", ids[0]))
            .insert_header(test_support::OWNER)
            .to_request();
        let completed: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(completed["isCompleted"], true);
        assert_eq!(completed["description"], "plan trip");

        let req = test::TestRequest::patch()
            .uri(&format!("/api/todos/{}/complete", ids[0]))
            .insert_header(("user-id", "U2"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Todo not found");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/todos/{}", ids[2]))
            .insert_header(test_support::OWNER)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Todo deleted successfully");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/todos/{}", ids[2]))
            .insert_header(test_support::OWNER)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
