use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use time::Date;

use crate::gateway::GatewayError;
use crate::model::TestExecution;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange { from: Date, to: Date },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] GatewayError),

    /// The execution row was written but the test case update was not.
    #[error("Execution {} recorded but test case update failed: {source}", .execution.id)]
    PartiallyApplied {
        execution: Box<TestExecution>,
        source: GatewayError,
    },
}

impl AppError {
    /// Lifts a gateway miss into `NotFound`, keeping every other failure as persistence.
    pub fn from_gateway(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound { table, id } => {
                AppError::NotFound(format!("{} {}", table.entity_name(), id))
            }
            other => AppError::Persistence(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(GatewayError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PartiallyApplied { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!("{}", self);
        (status, self.to_string()).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
