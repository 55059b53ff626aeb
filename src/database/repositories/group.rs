//! Group repository implementation

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::group::{
    CreateGroupRequest, CreatePostRequest, Group, GroupFilter, GroupMember, GroupMemberWithProfile,
    GroupPost, GroupRole, GroupWithStats,
};
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::like_pattern;

const GROUP_COLUMNS: &str =
    "id, name, description, is_private, tags, group_avatar_url, created_by, created_at, updated_at";

const POST_COLUMNS: &str =
    "id, group_id, user_id, parent_post_id, content, image_url, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a group with its creator as the first admin
    pub async fn create_group_and_add_admin(
        &self,
        created_by: Uuid,
        request: CreateGroupRequest,
    ) -> Result<Group> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO groups (name, description, is_private, tags, group_avatar_url, created_by,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {}
            "#,
            GROUP_COLUMNS
        );
        let group = sqlx::query_as::<_, Group>(&sql)
            .bind(request.name.trim())
            .bind(request.description)
            .bind(request.is_private)
            .bind(request.tags)
            .bind(request.group_avatar_url)
            .bind(created_by)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO group_members (group_id, user_id, role, joined_at) VALUES ($1, $2, 'admin', $3)",
        )
        .bind(group.id)
        .bind(created_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(group)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>> {
        let sql = format!("SELECT {} FROM groups WHERE id = $1", GROUP_COLUMNS);
        let group = sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(group)
    }

    /// Public groups with member counts
    pub async fn list_public(&self, filter: &GroupFilter, limit: i64, offset: i64) -> Result<Vec<GroupWithStats>> {
        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT g.id, g.name, g.description, g.is_private, g.tags, g.group_avatar_url,
                   g.created_by, g.created_at,
                   (SELECT COUNT(*) FROM group_members m WHERE m.group_id = g.id) AS member_count
            FROM groups g
            WHERE NOT g.is_private
            "#,
        );

        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            query
                .push(" AND (g.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR g.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(tag) = filter.tag.as_deref().filter(|t| !t.is_empty()) {
            query.push(" AND ").push_bind(tag.to_string()).push(" = ANY(g.tags)");
        }

        query
            .push(" ORDER BY g.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let groups = query.build_query_as::<GroupWithStats>().fetch_all(&self.pool).await?;
        Ok(groups)
    }

    pub async fn member_role(&self, group_id: Uuid, user_id: Uuid) -> Result<Option<GroupRole>> {
        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM group_members WHERE group_id = $1 AND user_id = $2")
                .bind(group_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        role.map(|r| r.parse::<GroupRole>()).transpose()
    }

    /// Returns false when the user was already a member
    pub async fn join(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role, joined_at)
            VALUES ($1, $2, 'member', $3)
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Leave a group; the last admin has to hand over before leaving
    pub async fn leave(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let admins: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM group_members WHERE group_id = $1 AND role = 'admin' FOR UPDATE",
        )
        .bind(group_id)
        .fetch_all(&mut *tx)
        .await?;

        if admins == [user_id] {
            return Err(PortalError::Conflict(
                "The last admin cannot leave the group".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn members(&self, group_id: Uuid) -> Result<Vec<GroupMemberWithProfile>> {
        let members = sqlx::query_as::<_, GroupMemberWithProfile>(
            r#"
            SELECT m.group_id, m.user_id, m.role, m.joined_at, p.full_name, p.avatar_url
            FROM group_members m
            JOIN profiles p ON p.id = m.user_id
            WHERE m.group_id = $1
            ORDER BY m.joined_at ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        // Removal follows the same last-admin rule as leaving
        self.leave(group_id, user_id).await
    }

    /// Change a member's role without leaving the group admin-less
    pub async fn update_member_role(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
    ) -> Result<GroupMember> {
        let mut tx = self.pool.begin().await?;

        let admins: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM group_members WHERE group_id = $1 AND role = 'admin' FOR UPDATE",
        )
        .bind(group_id)
        .fetch_all(&mut *tx)
        .await?;

        if role != GroupRole::Admin && admins == [user_id] {
            return Err(PortalError::Conflict(
                "The group must keep at least one admin".to_string(),
            ));
        }

        let member = sqlx::query_as::<_, GroupMember>(
            r#"
            UPDATE group_members
            SET role = $3
            WHERE group_id = $1 AND user_id = $2
            RETURNING group_id, user_id, role, joined_at
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(role.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| PortalError::not_found("Group member", user_id))?;

        tx.commit().await?;
        Ok(member)
    }

    /// Create a post or reply. Replies must stay within the same group.
    pub async fn create_post(&self, group_id: Uuid, user_id: Uuid, request: CreatePostRequest) -> Result<GroupPost> {
        if let Some(parent_id) = request.parent_post_id {
            let parent_group: Option<Uuid> =
                sqlx::query_scalar("SELECT group_id FROM group_posts WHERE id = $1")
                    .bind(parent_id)
                    .fetch_optional(&self.pool)
                    .await?;

            if parent_group != Some(group_id) {
                return Err(PortalError::InvalidInput(
                    "Reply must reference a post in the same group".to_string(),
                ));
            }
        }

        let sql = format!(
            r#"
            INSERT INTO group_posts (group_id, user_id, parent_post_id, content, image_url,
                                     created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {}
            "#,
            POST_COLUMNS
        );
        let post = sqlx::query_as::<_, GroupPost>(&sql)
            .bind(group_id)
            .bind(user_id)
            .bind(request.parent_post_id)
            .bind(request.content.trim())
            .bind(request.image_url)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(post)
    }

    pub async fn posts(&self, group_id: Uuid, limit: i64, offset: i64) -> Result<Vec<GroupPost>> {
        let sql = format!(
            "SELECT {} FROM group_posts WHERE group_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            POST_COLUMNS
        );
        let posts = sqlx::query_as::<_, GroupPost>(&sql)
            .bind(group_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    pub async fn find_post(&self, post_id: Uuid) -> Result<Option<GroupPost>> {
        let sql = format!("SELECT {} FROM group_posts WHERE id = $1", POST_COLUMNS);
        let post = sqlx::query_as::<_, GroupPost>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    pub async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM group_posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
