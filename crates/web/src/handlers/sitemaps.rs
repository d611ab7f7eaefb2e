use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use folio_content::sitemap;
use folio_core::AppError;

use crate::AppState;

pub async fn get_index(State(state): State<AppState>) -> Result<Response, AppError> {
    let sitemap = sitemap::generate(&state.config.site, state.content.posts())?;
    Ok(xml(sitemap.index))
}

pub async fn get_pages(State(state): State<AppState>) -> Result<Response, AppError> {
    let sitemap = sitemap::generate(&state.config.site, state.content.posts())?;
    Ok(xml(sitemap.pages))
}

fn xml(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}
