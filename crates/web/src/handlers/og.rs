use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use folio_core::AppError;
use folio_images::og::OgProps;

use crate::AppState;

pub const IMMUTABLE: &str = "public, max-age=31536000, immutable";

pub async fn get_og_image(
    Path(file): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let slug = file.strip_suffix(".png").ok_or(AppError::Status(StatusCode::NOT_FOUND))?;
    let post = state
        .content
        .get(slug)
        .filter(|post| !post.data.has_og_image())
        .ok_or(AppError::Status(StatusCode::NOT_FOUND))?;
    let props = OgProps::from(post);
    let og = state.og.clone();
    let data = tokio::task::spawn_blocking(move || og.render(&props)).await??;
    Ok(png_response(data))
}

pub fn png_response(data: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, mime::IMAGE_PNG.as_ref()), (header::CACHE_CONTROL, IMMUTABLE)], data)
        .into_response()
}
