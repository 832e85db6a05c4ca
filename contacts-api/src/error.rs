use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use contacts_core::sources::SourceError;
use contacts_core::{CreateContactError, ReconcileError, StoreError};
use shared_types::{ErrorResponse, ExistingContactRef};
use thiserror::Error;

use crate::database::contacts::UpdateContactError;

const PHONE_EXISTS_IN_CONTACTS: &str = "Phone number already exists in contacts";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Duplicate {
        message: String,
        existing: Option<ExistingContactRef>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Contact store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn duplicate(message: impl Into<String>, existing: Option<ExistingContactRef>) -> Self {
        ApiError::Duplicate {
            message: message.into(),
            existing,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = match self {
            ApiError::Duplicate { message, existing } => ErrorResponse {
                message: message.clone(),
                existing_contact: existing.clone(),
            },
            other => ErrorResponse::new(other.to_string()),
        };

        HttpResponse::build(status).json(body)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => ApiError::StoreUnavailable(msg),
            StoreError::DuplicateKey { .. } => ApiError::duplicate(PHONE_EXISTS_IN_CONTACTS, None),
            StoreError::Rejected(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<ReconcileError> for ApiError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::StoreUnavailable(msg) => ApiError::StoreUnavailable(msg),
        }
    }
}

impl From<CreateContactError> for ApiError {
    fn from(e: CreateContactError) -> Self {
        match e {
            CreateContactError::Validation(msg) => ApiError::Validation(msg),
            CreateContactError::PhoneConflict(existing) => {
                ApiError::duplicate(PHONE_EXISTS_IN_CONTACTS, Some((&existing).into()))
            }
            CreateContactError::NameConflict(existing) => {
                ApiError::duplicate("Name already exists", Some((&existing).into()))
            }
            CreateContactError::PhoneTaken => ApiError::duplicate(PHONE_EXISTS_IN_CONTACTS, None),
            CreateContactError::Store(e) => e.into(),
        }
    }
}

impl From<UpdateContactError> for ApiError {
    fn from(e: UpdateContactError) -> Self {
        match e {
            UpdateContactError::NotFound => ApiError::NotFound("Contact not found".to_string()),
            UpdateContactError::Validation(msg) => ApiError::Validation(msg),
            UpdateContactError::PhoneConflict(existing) => {
                ApiError::duplicate(PHONE_EXISTS_IN_CONTACTS, Some((&existing).into()))
            }
            UpdateContactError::PhoneTaken => ApiError::duplicate(PHONE_EXISTS_IN_CONTACTS, None),
            UpdateContactError::Store(e) => e.into(),
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(e: SourceError) -> Self {
        ApiError::Validation(e.to_string())
    }
}
