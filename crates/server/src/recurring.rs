//! Recurring materialization endpoints.
//!
//! Clients poll these opportunistically (e.g. once per session); every
//! call is idempotent, so duplicate or concurrent triggers from
//! multiple tabs are harmless.

use api_types::recurring::CheckResponse;
use axum::{Extension, Json, extract::State};
use engine::DefinitionKind;

use crate::{ServerError, server::ServerState, user};

async fn check(
    state: &ServerState,
    user: &user::Model,
    kind: DefinitionKind,
) -> Result<Json<CheckResponse>, ServerError> {
    let created = state.engine.materialize(&user.username, kind).await?;
    Ok(Json(CheckResponse { created }))
}

pub async fn check_expenses(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CheckResponse>, ServerError> {
    check(&state, &user, DefinitionKind::Expense).await
}

pub async fn check_income(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CheckResponse>, ServerError> {
    check(&state, &user, DefinitionKind::Income).await
}

pub async fn check_contributions(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CheckResponse>, ServerError> {
    check(&state, &user, DefinitionKind::Contribution).await
}
