//! Admin repository: portal-wide statistics

use sqlx::PgPool;

use crate::models::admin::DashboardStats;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Counters for the admin dashboard in a single round trip
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM profiles) AS total_users,
                (SELECT COUNT(*) FROM profiles WHERE is_verified) AS verified_users,
                (SELECT COUNT(*) FROM profiles WHERE alumni_verification_status = 'pending') AS pending_verifications,
                (SELECT COUNT(*) FROM jobs) AS total_jobs,
                (SELECT COUNT(*) FROM jobs
                 WHERE is_active AND is_approved AND (expires_at IS NULL OR expires_at > NOW())) AS active_jobs,
                (SELECT COUNT(*) FROM jobs WHERE NOT is_approved) AS pending_job_approvals,
                (SELECT COUNT(*) FROM events) AS total_events,
                (SELECT COUNT(*) FROM events WHERE start_date >= NOW()) AS upcoming_events,
                (SELECT COUNT(*) FROM job_applications) AS total_applications,
                (SELECT COUNT(*) FROM groups) AS total_groups,
                (SELECT COUNT(*) FROM mentors WHERE status = 'approved') AS approved_mentors,
                (SELECT COUNT(*) FROM messages WHERE created_at >= NOW() - INTERVAL '7 days') AS messages_last_7_days,
                (SELECT COUNT(*) FROM feedback) AS total_feedback
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
