use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, Request, header},
    middleware,
    routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{middlewares::jwt_auth_middleware, state::SharedAppState};

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn init_router(state: SharedAppState) -> Router {
    let app = Router::new().route("/", get(crate::controllers::home::index));

    let movies_route = Router::new()
        .route(
            "/",
            get(crate::controllers::movies::index).post(crate::controllers::movies::store),
        )
        .route("/existing", post(crate::controllers::movies::store_existing))
        .route("/search/{query}", get(crate::controllers::movies::search))
        .route(
            "/metadata/{title}",
            get(crate::controllers::movies::metadata),
        )
        .route(
            "/{id}",
            post(crate::controllers::movies::update).delete(crate::controllers::movies::destroy),
        )
        .route("/{id}/reviews", post(crate::controllers::reviews::store))
        .route(
            "/{id}/reviews/{review_id}",
            patch(crate::controllers::reviews::update)
                .delete(crate::controllers::reviews::destroy),
        )
        .route(
            "/{id}/reviews/{review_id}/vote",
            post(crate::controllers::reviews::vote),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let friends_route = Router::new()
        .route("/feed", get(crate::controllers::friends::feed))
        .route("/{id}", get(crate::controllers::friends::show))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let maintenance_route = Router::new().route(
        "/flush-cache",
        post(crate::controllers::maintenance::flush_cache),
    );

    let x_request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_id_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = match request.headers().get(REQUEST_ID_HEADER) {
                    Some(val) => val.to_str().unwrap_or(""),
                    None => "",
                };
                let user_agent = match request.headers().get(header::USER_AGENT) {
                    Some(val) => val.to_str().unwrap_or(""),
                    None => "",
                };

                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                tracing::info_span!(
                    "http_request",
                    request_id,
                    method = ?request.method(),
                    uri = ?request.uri(),
                    path = matched_path,
                    version = ?request.version(),
                    user_agent,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id_header));

    app.nest("/movies", movies_route)
        .nest("/friends", friends_route)
        .nest("/maintenance", maintenance_route)
        .layer(CompressionLayer::new())
        .layer(request_id_middleware)
        .with_state(state)
}
