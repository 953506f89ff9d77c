//! Wizard session endpoints: one request per UI action.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::{ApiError, AppState, json_body};
use crate::configurator::{CustomerInfo, PathChoice, Wizard, WizardStep};
use crate::error::WizardError;
use crate::orders::{OrderOutcome, OrderRequest};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/customer", post(submit_customer))
        .route("/api/sessions/{id}/path", post(choose_path))
        .route("/api/sessions/{id}/products/submit", post(submit_products))
        .route("/api/sessions/{id}/products/{product_id}", post(change_product))
        .route("/api/sessions/{id}/plan", post(select_plan))
        .route("/api/sessions/{id}/back", post(back))
        .route("/api/sessions/{id}/restart", post(restart))
        .route("/api/sessions/{id}/confirm", post(confirm))
}

#[derive(Serialize)]
struct SessionView {
    id: Uuid,
    state: Wizard,
}

type SessionResult = Result<Json<SessionView>, ApiError>;

/// Run a wizard mutation and answer with the resulting state.
async fn apply(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut Wizard) -> Result<(), WizardError>,
) -> SessionResult {
    let (result, wizard) = state
        .sessions
        .update(id, f)
        .await
        .ok_or_else(ApiError::session_not_found)?;
    if let Err(e) = result {
        warn!(session_id = %id, step = %wizard.step, error = %e, "Wizard action rejected");
        return Err(e.into());
    }
    Ok(Json(SessionView { id, state: wizard }))
}

async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let (id, wizard) = state.sessions.create().await;
    (StatusCode::CREATED, Json(SessionView { id, state: wizard }))
}

async fn get_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> SessionResult {
    let wizard = state
        .sessions
        .get(id)
        .await
        .ok_or_else(ApiError::session_not_found)?;
    Ok(Json(SessionView { id, state: wizard }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::session_not_found())
    }
}

async fn submit_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<CustomerInfo>, JsonRejection>,
) -> SessionResult {
    let info = json_body(body)?;
    apply(&state, id, |w| w.submit_customer(info).map(drop)).await
}

#[derive(Deserialize)]
struct PathRequest {
    path: PathChoice,
}

async fn choose_path(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<PathRequest>, JsonRejection>,
) -> SessionResult {
    let body = json_body(body)?;
    let catalog = state.catalog.clone();
    apply(&state, id, |w| w.choose_path(&catalog, body.path).map(drop)).await
}

/// `{enabled}` for switch products, `{optionId}` for select products.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductChange {
    Switch {
        enabled: bool,
    },
    Select {
        #[serde(rename = "optionId")]
        option_id: String,
    },
}

async fn change_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, String)>,
    body: Result<Json<ProductChange>, JsonRejection>,
) -> SessionResult {
    let change = json_body(body)?;
    let catalog = state.catalog.clone();
    apply(&state, id, |w| {
        let total = match change {
            ProductChange::Switch { enabled } => {
                w.set_switch_product(&catalog, &product_id, enabled)
            }
            ProductChange::Select { option_id } => {
                w.set_select_option(&catalog, &product_id, &option_id)
            }
        };
        total.map(drop)
    })
    .await
}

async fn submit_products(State(state): State<AppState>, Path(id): Path<Uuid>) -> SessionResult {
    apply(&state, id, |w| w.submit_products().map(drop)).await
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanRequest {
    plan_id: String,
}

async fn select_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<PlanRequest>, JsonRejection>,
) -> SessionResult {
    let body = json_body(body)?;
    let catalog = state.catalog.clone();
    apply(&state, id, |w| w.select_plan(&catalog, &body.plan_id).map(drop)).await
}

async fn back(State(state): State<AppState>, Path(id): Path<Uuid>) -> SessionResult {
    apply(&state, id, |w| w.back().map(drop)).await
}

async fn restart(State(state): State<AppState>, Path(id): Path<Uuid>) -> SessionResult {
    apply(&state, id, |w| {
        w.restart();
        Ok(())
    })
    .await
}

#[derive(Serialize)]
struct ConfirmResponse {
    #[serde(flatten)]
    outcome: OrderOutcome,
    state: Wizard,
}

/// Place the order for the confirmed selection. A session whose order
/// already went through is not charged again.
///
/// The session lock is not held while the order pipeline runs.
async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let snapshot = state
        .sessions
        .get(id)
        .await
        .ok_or_else(ApiError::session_not_found)?;

    if snapshot.step != WizardStep::Confirmation || snapshot.is_complete() {
        return Err(WizardError::InvalidTransition {
            step: snapshot.step.to_string(),
            action: "confirm the order".to_string(),
        }
        .into());
    }
    let Some(customer) = snapshot.customer.clone() else {
        return Err(WizardError::MissingCustomer {
            target: WizardStep::Confirmation.to_string(),
        }
        .into());
    };

    let order = OrderRequest {
        customer,
        products: snapshot.line_items().to_vec(),
        total: snapshot.total,
    };
    let outcome = state.orders.submit(&order).await;

    let wizard = match &outcome {
        OrderOutcome::Success { invoice_url } => {
            info!(session_id = %id, invoice_url = %invoice_url, "Order confirmed");
            let url = invoice_url.clone();
            let recorded = state
                .sessions
                .update(id, |w| {
                    if w.step == WizardStep::Confirmation && w.selection == snapshot.selection {
                        w.complete(url).is_ok()
                    } else {
                        false
                    }
                })
                .await;
            match recorded {
                Some((true, wizard)) => wizard,
                Some((false, wizard)) => {
                    warn!(session_id = %id, "Session changed during checkout; outcome not recorded");
                    wizard
                }
                None => snapshot,
            }
        }
        OrderOutcome::Failure { error } => {
            warn!(session_id = %id, error = %error, "Order failed");
            state.sessions.get(id).await.unwrap_or(snapshot)
        }
    };

    Ok(Json(ConfirmResponse {
        outcome,
        state: wizard,
    }))
}
