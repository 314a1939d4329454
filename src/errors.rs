use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Everything that can go wrong between the upstream feed and a JSON reply.
/// None of these are retried; the next request simply tries again.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("feed is missing expected element <{0}>")]
    MissingElement(&'static str),
    #[error("feed day has a bad timestamp attribute: {0}")]
    BadTimestamp(String),
    #[error("feed price is not a number: {0}")]
    BadPrice(String),
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = match self {
            FeedError::Fetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        log::error!("meal plan request failed: {self}");
        (status, self.to_string()).into_response()
    }
}
