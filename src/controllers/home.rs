use axum::Json;

#[derive(serde::Serialize)]
pub struct HomeResponse {
    pub name: &'static str,
    pub version: &'static str,
}

#[tracing::instrument(name = "[GET] index", skip_all)]
pub async fn index() -> Json<HomeResponse> {
    Json(HomeResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
