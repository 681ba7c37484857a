use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod health;
pub mod players;
pub mod rooms;
pub mod rounds;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = rooms::router()
        .merge(players::router())
        .merge(rounds::router());

    let root_router = Router::new()
        .nest("/api", api_router)
        .merge(health::router());

    let docs_router = docs::router(state.clone());

    root_router.merge(docs_router).with_state(state)
}
