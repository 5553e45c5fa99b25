// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::utils::errors::RepositoryError;

/// 接口层可预期的错误
#[derive(Error, Debug)]
pub enum ApiError {
    /// 当前没有排名
    #[error("Restaurant not found or currently closed")]
    RankingNotFound,

    /// 餐厅标识格式不正确
    #[error("Invalid restaurant slug: {0}")]
    InvalidSlug(String),
}

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_message = self.0.to_string();

        let status = if let Some(api_err) = self.0.downcast_ref::<ApiError>() {
            match api_err {
                ApiError::RankingNotFound => StatusCode::NOT_FOUND,
                ApiError::InvalidSlug(_) => StatusCode::BAD_REQUEST,
            }
        } else {
            match self.0.downcast_ref::<RepositoryError>() {
                Some(RepositoryError::InvalidParameter(_)) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            }
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self.0);
        }

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
