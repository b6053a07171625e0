use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "kegmon",
        description = "IoT keg telemetry backend",
    ),
    paths(crate::api::handlers::health::health),
    components(schemas(crate::api::handlers::auth::types::SessionInfo)),
    tags(
        (name = "health", description = "Liveness and build information"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_contains_health_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
