//! Dashboard aggregation
//!
//! Each dashboard issues its independent queries concurrently and bounds the
//! whole batch with one timeout.

use std::future::Future;
use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use crate::database::DatabaseService;
use crate::models::admin::{AlumniDashboard, DashboardStats, EmployerDashboard};
use crate::utils::errors::{PortalError, Result};

const DASHBOARD_LIST_SIZE: i64 = 5;

/// Race `future` against `duration`
pub async fn with_timeout<T, F>(duration: Duration, label: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation = %label, timeout_ms = duration.as_millis() as u64, "Operation timed out");
            Err(PortalError::Timeout(format!(
                "{} did not complete within {}ms",
                label,
                duration.as_millis()
            )))
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardService {
    db: DatabaseService,
    timeout: Duration,
}

impl DashboardService {
    pub fn new(db: DatabaseService, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub async fn admin_stats(&self) -> Result<DashboardStats> {
        with_timeout(self.timeout, "admin dashboard", self.db.admin.dashboard_stats()).await
    }

    pub async fn alumni(&self, user_id: Uuid) -> Result<AlumniDashboard> {
        let db = &self.db;
        let queries = async {
            let (
                profile,
                upcoming_events,
                recent_jobs,
                connection_count,
                pending_connection_requests,
                unread_messages,
                unread_notifications,
                mentorship_requests,
            ) = tokio::try_join!(
                db.profiles.find_by_id(user_id),
                db.events.upcoming_for_attendee(user_id, DASHBOARD_LIST_SIZE),
                db.jobs.recent(DASHBOARD_LIST_SIZE),
                db.connections.count_accepted(user_id),
                db.connections.count_pending_incoming(user_id),
                db.messages.unread_count(user_id),
                db.notifications.unread_count(user_id),
                db.mentorship.requests_for_user(user_id),
            )?;

            let profile = profile.ok_or_else(|| PortalError::not_found("Profile", user_id))?;

            Ok::<_, PortalError>(AlumniDashboard {
                profile_completeness: profile.completeness(),
                upcoming_events,
                recent_jobs,
                connection_count,
                pending_connection_requests,
                unread_messages,
                unread_notifications,
                mentorship_requests,
            })
        };

        with_timeout(self.timeout, "alumni dashboard", queries).await
    }

    pub async fn employer(&self, user_id: Uuid) -> Result<EmployerDashboard> {
        let db = &self.db;
        let queries = async {
            let (jobs, recent_applications) = tokio::try_join!(
                db.jobs.application_counts_for_poster(user_id),
                db.jobs.recent_applications_for_poster(user_id, DASHBOARD_LIST_SIZE),
            )?;

            Ok::<_, PortalError>(EmployerDashboard::from_parts(jobs, recent_applications))
        };

        with_timeout(self.timeout, "employer dashboard", queries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let value = with_timeout(Duration::from_millis(100), "fast", async { Ok::<_, PortalError>(7) }).await;
        assert_eq!(value.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, PortalError>(())
        };
        let result = with_timeout(Duration::from_millis(10), "slow", slow).await;
        assert_matches!(result, Err(PortalError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_with_timeout_keeps_inner_error() {
        let failing = async { Err::<(), _>(PortalError::InvalidInput("bad".to_string())) };
        let result = with_timeout(Duration::from_millis(100), "failing", failing).await;
        assert_matches!(result, Err(PortalError::InvalidInput(_)));
    }
}
