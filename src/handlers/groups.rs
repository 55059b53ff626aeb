//! Networking groups: membership, posts and moderation

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use crate::handlers::extract::{Json, Path, Query};
use crate::middleware::OptionalAuthUser;
use crate::models::group::{
    CreateGroupRequest, CreatePostRequest, Group, GroupFilter, GroupMember, GroupMemberWithProfile,
    GroupPost, GroupRole, GroupWithStats, UpdateMemberRoleRequest,
};
use crate::services::AuthUser;
use crate::state::AppState;
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{require_text, Pagination, DEFAULT_PAGE_SIZE};
use crate::utils::logging::log_user_action;

const MAX_GROUP_NAME_LENGTH: usize = 120;
const MAX_POST_LENGTH: usize = 5000;

pub async fn create_group(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut request): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse> {
    request.name = require_text("name", &request.name, MAX_GROUP_NAME_LENGTH)?;

    let group = state
        .db
        .groups
        .create_group_and_add_admin(user.id, request)
        .await?;

    log_user_action(user.id, "create_group", Some(&group.id.to_string()));
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn list_groups(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(filter): Query<GroupFilter>,
) -> Result<Json<Vec<GroupWithStats>>> {
    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    Ok(Json(state.db.groups.list_public(&filter, limit, offset).await?))
}

pub async fn get_group(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Group>> {
    let group = find_group(&state, id).await?;
    ensure_visible(&state, &group, viewer.as_ref()).await?;
    Ok(Json(group))
}

pub async fn join_group(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let group = find_group(&state, id).await?;
    if group.is_private {
        return Err(PortalError::PermissionDenied(
            "This group is private; ask a group admin for an invitation".to_string(),
        ));
    }

    if !state.db.groups.join(id, user.id).await? {
        return Ok((
            StatusCode::OK,
            Json(json!({ "message": "User is already a member of this group." })),
        ));
    }

    log_user_action(user.id, "join_group", Some(&id.to_string()));
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Successfully joined the group." })),
    ))
}

pub async fn leave_group(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.db.groups.leave(id, user.id).await? {
        return Err(PortalError::not_found("Group membership", id));
    }

    log_user_action(user.id, "leave_group", Some(&id.to_string()));
    Ok(Json(json!({ "message": "Successfully left the group." })))
}

pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(mut request): Json<CreatePostRequest>,
) -> Result<impl IntoResponse> {
    find_group(&state, id).await?;
    if state.db.groups.member_role(id, user.id).await?.is_none() {
        return Err(PortalError::PermissionDenied(
            "Only members can post in this group".to_string(),
        ));
    }

    request.content = require_text("content", &request.content, MAX_POST_LENGTH)?;
    let post = state.db.groups.create_post(id, user.id, request).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_posts(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<Uuid>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<GroupPost>>> {
    let group = find_group(&state, id).await?;
    ensure_visible(&state, &group, viewer.as_ref()).await?;

    let (limit, offset) = page.resolve(DEFAULT_PAGE_SIZE);
    Ok(Json(state.db.groups.posts(id, limit, offset).await?))
}

/// Authors delete their own posts; group admins delete any
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path((group_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    let post = state
        .db
        .groups
        .find_post(post_id)
        .await?
        .filter(|p| p.group_id == group_id)
        .ok_or_else(|| PortalError::not_found("Group post", post_id))?;

    if post.user_id != user.id {
        let role = state.db.groups.member_role(group_id, user.id).await?;
        if role != Some(GroupRole::Admin) {
            return Err(PortalError::PermissionDenied(
                "Only the author or a group admin can delete this post".to_string(),
            ));
        }
    }

    state.db.groups.delete_post(post_id).await?;
    log_user_action(user.id, "delete_group_post", Some(&post_id.to_string()));
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GroupMemberWithProfile>>> {
    let group = find_group(&state, id).await?;
    ensure_visible(&state, &group, viewer.as_ref()).await?;
    Ok(Json(state.db.groups.members(id).await?))
}

pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((group_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    ensure_group_admin(&state, group_id, &user).await?;

    if !state.db.groups.remove_member(group_id, member_id).await? {
        return Err(PortalError::not_found("Group membership", member_id));
    }

    log_user_action(user.id, "remove_group_member", Some(&member_id.to_string()));
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_member_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path((group_id, member_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateMemberRoleRequest>,
) -> Result<Json<GroupMember>> {
    ensure_group_admin(&state, group_id, &user).await?;

    let member = state
        .db
        .groups
        .update_member_role(group_id, member_id, request.role)
        .await?;

    log_user_action(user.id, "update_group_role", Some(request.role.as_str()));
    Ok(Json(member))
}

async fn find_group(state: &AppState, id: Uuid) -> Result<Group> {
    state
        .db
        .groups
        .find_by_id(id)
        .await?
        .ok_or_else(|| PortalError::not_found("Group", id))
}

/// Private groups are visible to their members only
async fn ensure_visible(state: &AppState, group: &Group, viewer: Option<&AuthUser>) -> Result<()> {
    if !group.is_private {
        return Ok(());
    }

    let is_member = match viewer {
        Some(user) => state.db.groups.member_role(group.id, user.id).await?.is_some(),
        None => false,
    };

    if is_member {
        Ok(())
    } else {
        Err(PortalError::PermissionDenied("This group is private".to_string()))
    }
}

async fn ensure_group_admin(state: &AppState, group_id: Uuid, user: &AuthUser) -> Result<()> {
    find_group(state, group_id).await?;
    match state.db.groups.member_role(group_id, user.id).await? {
        Some(GroupRole::Admin) => Ok(()),
        _ => Err(PortalError::PermissionDenied(
            "Group admin privileges required".to_string(),
        )),
    }
}
