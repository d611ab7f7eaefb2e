use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    routing::get,
};
use folio_content::sitemap;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::AppState;

pub mod og;
pub mod security;
mod sitemaps;

pub fn build_router(state: &AppState) -> Router<AppState> {
    let mut router = Router::new().route("/og-image/{*file}", get(og::get_og_image));
    if state.config.sitemap.enabled {
        router = router
            .route(&format!("/{}", sitemap::INDEX_FILE), get(sitemaps::get_index))
            .route(&format!("/{}", sitemap::PAGES_FILE), get(sitemaps::get_pages));
    }
    router.fallback_service(<ServeDir as ServiceExt<Request>>::map_response(
        ServeDir::new(&state.config.output.dir),
        |mut response| {
            // Generated pages are not hashed, so revalidate daily
            response.headers_mut().insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=86400, must-revalidate"),
            );
            response
        },
    ))
}
