pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Showcase API",
        version = "1.0.0",
        description = "Submit products, upload their images and browse the catalogue"
    ),
    paths(
        handlers::product::create_product,
        handlers::product::list_products,
        handlers::product::get_product,
        handlers::image::upload_image,
        handlers::image::image_url,
        handlers::storage::serve_object,
    ),
    tags(
        (name = "Products", description = "Creating and browsing products"),
        (name = "Product Images", description = "Uploading product images and resolving their URLs"),
        (name = "Storage", description = "Public object downloads"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allow_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(cors.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let api = ApiDoc::openapi();
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes(&state.config))
        .route(
            "/storage/{bucket}/{filename}",
            get(handlers::storage::serve_object),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(cors)
}
