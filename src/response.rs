//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// List envelope: the standard fields plus pagination meta.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub success: bool,
    pub message: &'static str,
    pub data: Vec<T>,
    pub total_pages: u64,
    pub current_page: u64,
}

pub fn success_one<T: Serialize>(
    status: StatusCode,
    message: &'static str,
    data: T,
) -> (StatusCode, Json<Envelope<T>>) {
    (
        status,
        Json(Envelope {
            success: true,
            message,
            data: Some(data),
        }),
    )
}

/// Success with no `data` key at all.
pub fn success_empty(message: &'static str) -> (StatusCode, Json<Envelope<()>>) {
    (
        StatusCode::OK,
        Json(Envelope {
            success: true,
            message,
            data: None,
        }),
    )
}

pub fn success_page<T: Serialize>(
    message: &'static str,
    data: Vec<T>,
    total_pages: u64,
    current_page: u64,
) -> (StatusCode, Json<PageEnvelope<T>>) {
    (
        StatusCode::OK,
        Json(PageEnvelope {
            success: true,
            message,
            data,
            total_pages,
            current_page,
        }),
    )
}
