//! Unified error handling for the app's HTML routes.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use hfd_shipping_core::ShipmentValidationError;
use thiserror::Error;

use crate::courier::CourierError;
use crate::services::ShipmentError;
use crate::store::StoreError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// The shipment request is incomplete.
    #[error("Invalid shipment: {0}")]
    Validation(#[from] ShipmentValidationError),

    /// No HFD settings saved for the shop.
    #[error("HFD settings are not configured for {0}")]
    ConfigurationMissing(String),

    /// HFD could not be reached or did not create the shipment.
    #[error("HFD error: {0}")]
    Courier(#[from] CourierError),

    /// Settings store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<ShipmentError> for AppError {
    fn from(err: ShipmentError) -> Self {
        match err {
            ShipmentError::ConfigurationMissing(shop) => Self::ConfigurationMissing(shop),
            ShipmentError::Validation(e) => Self::Validation(e),
            ShipmentError::Courier(e) => Self::Courier(e),
            ShipmentError::Store(e) => Self::Store(e),
        }
    }
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
    /// Courier response body, shown verbatim.
    pub detail: Option<String>,
    pub back_href: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ConfigurationMissing(_) => StatusCode::CONFLICT,
            Self::Courier(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message shown to the merchant. Internal details stay in the logs.
    fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::ConfigurationMissing(shop) => format!(
                "HFD is not configured for {shop}. Save your HFD token and client number first."
            ),
            Self::Courier(CourierError::Transport(_)) => {
                "Could not reach HFD. Please try again.".to_string()
            }
            Self::Courier(CourierError::Upstream { status, .. }) => {
                format!("HFD did not create the shipment (HTTP {status}).")
            }
            Self::Store(_) => "Internal server error".to_string(),
            Self::BadRequest(_) => self.to_string(),
        }
    }

    fn back_href(&self) -> String {
        match self {
            Self::ConfigurationMissing(shop) => format!("/?shop={}", urlencoding::encode(shop)),
            _ => "/".to_string(),
        }
    }

    /// Courier response body, for upstream rejections only.
    fn detail(&self) -> Option<String> {
        match self {
            Self::Courier(CourierError::Upstream { body, .. }) => Some(body.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Store(_) | Self::Courier(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let status = self.status();
        let template = ErrorTemplate {
            status: status.as_u16(),
            message: self.user_message(),
            detail: self.detail(),
            back_href: self.back_href(),
        };

        let body = template.render().unwrap_or_else(|e| {
            tracing::error!("Template render error: {}", e);
            "Internal Server Error".to_string()
        });

        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid shop".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid shop");

        let err = AppError::ConfigurationMissing("demo.myshopify.com".to_string());
        assert_eq!(
            err.to_string(),
            "HFD settings are not configured for demo.myshopify.com"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(ShipmentValidationError::MissingReceiverName.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::ConfigurationMissing("s".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(
                CourierError::Upstream {
                    status: 500,
                    body: "boom".to_string()
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(StoreError::Unavailable("lock".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_shipment_error_maps_to_matching_variant() {
        let err = AppError::from(ShipmentError::ConfigurationMissing(
            "demo.myshopify.com".to_string(),
        ));
        assert!(matches!(err, AppError::ConfigurationMissing(_)));
        assert_eq!(err.back_href(), "/?shop=demo.myshopify.com");
        assert!(err.user_message().contains("Save your HFD token"));

        let err = AppError::from(ShipmentError::Validation(
            ShipmentValidationError::MissingReceiverPhone,
        ));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_upstream_body_is_surfaced_verbatim() {
        let err = AppError::Courier(CourierError::Upstream {
            status: 500,
            body: r#"{"error":"bad token"}"#.to_string(),
        });
        assert_eq!(err.detail().as_deref(), Some(r#"{"error":"bad token"}"#));
        assert!(err.user_message().contains("HTTP 500"));
    }

    #[test]
    fn test_store_details_are_hidden() {
        let err = AppError::from(StoreError::Unavailable("lock poisoned".to_string()));
        assert_eq!(err.user_message(), "Internal server error");
        assert_eq!(err.detail(), None);
    }
}
