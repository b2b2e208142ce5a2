mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use error::app_error::AppError;

use crate::db::stage_db;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, Cors, CorsOptions};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::{get_openapi_route, okapi::merge::marge_spec_list};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence over the configured level, e.g.
    //   RUST_LOG=spymaster::database=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // A subscriber may already be installed when the app is built twice in one process
    let _ = if json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
}

fn build_cors(cors_config: &config::CorsConfig) -> Result<Cors, AppError> {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    if is_wildcard && cors_config.allow_credentials {
        return Err(AppError::configuration(
            "Invalid CORS configuration: wildcard origins (*) cannot be combined with credentials",
        ));
    }

    let allowed_origins = if cors_config.allowed_origins.is_empty() {
        AllowedOrigins::some_exact::<&str>(&[])
    } else if is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    let options = CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Patch, Method::Delete, Method::Options, Method::Head]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Accept", middleware::REQUEST_ID_HEADER]),
        expose_headers: [
            middleware::REQUEST_ID_HEADER,
            app_routes::user::TOTAL_COUNT_HEADER,
            app_routes::user::PAGE_HEADER,
            app_routes::user::PER_PAGE_HEADER,
        ]
        .iter()
        .map(ToString::to_string)
        .collect(),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    };

    Ok(options.to_cors()?)
}

fn get_swagger_config(openapi_url: &str) -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: openapi_url.to_string(),
        ..Default::default()
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return config::DEFAULT_API_BASE_PATH.to_string();
    }

    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };

    while normalized.ends_with('/') && normalized.len() > 1 {
        normalized.pop();
    }

    normalized
}

fn join_base_path(base_path: &str, path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let suffix = path.trim_start_matches('/');

    if base.is_empty() {
        format!("/{}", suffix)
    } else {
        format!("{}/{}", base, suffix)
    }
}

fn collect_base_paths(api_config: &config::ApiConfig) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    let mut push_unique = |path: String| {
        if !normalized.contains(&path) {
            normalized.push(path);
        }
    };

    push_unique(normalize_base_path(&api_config.base_path));
    for extra in &api_config.additional_base_paths {
        push_unique(normalize_base_path(extra));
    }

    normalized
}

struct RouteSpec {
    path: &'static str,
    routes: Vec<rocket::Route>,
    openapi: rocket_okapi::okapi::openapi3::OpenApi,
}

fn collect_route_specs() -> Vec<RouteSpec> {
    let (user_routes, user_openapi) = app_routes::user::routes();
    let (ping_routes, ping_openapi) = app_routes::health::ping_routes();
    let (health_routes, health_openapi) = app_routes::health::routes();

    vec![
        RouteSpec {
            path: "/users",
            routes: user_routes,
            openapi: user_openapi,
        },
        RouteSpec {
            path: "/ping",
            routes: ping_routes,
            openapi: ping_openapi,
        },
        RouteSpec {
            path: "/health",
            routes: health_routes,
            openapi: health_openapi,
        },
    ]
}

fn mount_api_routes(mut rocket: Rocket<Build>, base_path: &str, enable_swagger: bool) -> Result<Rocket<Build>, AppError> {
    let route_specs = collect_route_specs();

    if !enable_swagger {
        for spec in route_specs {
            rocket = rocket.mount(join_base_path(base_path, spec.path), spec.routes);
        }
        return Ok(rocket);
    }

    let mut openapi_list = Vec::new();
    for spec in route_specs {
        rocket = rocket.mount(join_base_path(base_path, spec.path), spec.routes);
        openapi_list.push((spec.path, spec.openapi));
    }

    let openapi_docs = marge_spec_list(&openapi_list).map_err(|e| AppError::configuration(format!("Could not merge OpenAPI spec: {}", e)))?;

    let settings = rocket_okapi::settings::OpenApiSettings::default();
    rocket = rocket.mount(base_path, vec![get_openapi_route(openapi_docs, &settings)]);

    let docs_path = join_base_path(base_path, "docs");
    let openapi_url = join_base_path(base_path, "openapi.json");
    Ok(rocket.mount(docs_path, make_swagger_ui(&get_swagger_config(&openapi_url))))
}

pub fn build_rocket(config: Config) -> Result<Rocket<Build>, AppError> {
    init_tracing(&config.logging.level, config.logging.json_format);

    let cors = build_cors(&config.cors)?;
    let base_paths = collect_base_paths(&config.api);

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()));

    let mut rocket = rocket::custom(figment)
        .attach(cors)
        .attach(RequestLogger)
        .attach(stage_db(config.database));

    for base_path in &base_paths {
        rocket = mount_api_routes(rocket, base_path, config.api.enable_swagger)?;
        rocket = rocket.register(
            base_path.as_str(),
            catchers![
                app_routes::error::bad_request,
                app_routes::error::not_found,
                app_routes::error::conflict,
                app_routes::error::unprocessable_entity,
                app_routes::error::internal_error
            ],
        );
    }

    Ok(rocket)
}
