//! Dashboards

use axum::extract::State;

use crate::handlers::extract::Json;
use crate::middleware::AdminUser;
use crate::models::admin::{AlumniDashboard, DashboardStats, EmployerDashboard};
use crate::services::AuthUser;
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn admin_stats(State(state): State<AppState>, _admin: AdminUser) -> Result<Json<DashboardStats>> {
    Ok(Json(state.services.dashboard.admin_stats().await?))
}

pub async fn alumni(State(state): State<AppState>, user: AuthUser) -> Result<Json<AlumniDashboard>> {
    Ok(Json(state.services.dashboard.alumni(user.id).await?))
}

pub async fn employer(State(state): State<AppState>, user: AuthUser) -> Result<Json<EmployerDashboard>> {
    Ok(Json(state.services.dashboard.employer(user.id).await?))
}
