use axum::{
    Router,
    routing::{get, post},
};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> Router<AppState> {
    Router::new().nest("/products", product_routes(config))
}

fn product_routes(config: &AppConfig) -> Router<AppState> {
    let crud = Router::new()
        .route(
            "/",
            get(handlers::product::list_products).post(handlers::product::create_product),
        )
        .route("/{id}", get(handlers::product::get_product))
        .route(
            "/images/{filename}/url",
            get(handlers::image::image_url),
        );

    let upload = Router::new()
        .route("/images", post(handlers::image::upload_image))
        .layer(handlers::image::image_upload_body_limit(&config.storage));

    crud.merge(upload)
}
