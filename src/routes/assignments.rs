use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::{
        api::ApiResponse,
        assignment_dto::{
            AssignmentListQuery, AssignmentResponse, AssignmentSideQuery,
            CreateUserQuizAssignmentPayload, UpdateUserQuizAssignmentPayload,
        },
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/user-quiz-assignments",
    request_body = CreateUserQuizAssignmentPayload,
    responses(
        (status = 201, description = "Assignment created", body = Json<AssignmentResponse>),
        (status = 400, description = "Duplicate assignment or user is not an admin"),
        (status = 404, description = "User or quiz not found")
    )
)]
#[axum::debug_handler]
pub async fn create_assignment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserQuizAssignmentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let assignment = state
        .assignment_service
        .create(payload, &claims.sub)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            assignment,
            "User assigned to quiz successfully",
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/user-quiz-assignments",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-indexed)"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("user_id" = Option<i32>, Query, description = "Filter by user"),
        ("quiz_id" = Option<i32>, Query, description = "Filter by quiz"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag")
    ),
    responses(
        (status = 200, description = "Paginated assignments", body = Json<ApiResponse<Vec<AssignmentResponse>>>)
    )
)]
#[axum::debug_handler]
pub async fn list_assignments(
    State(state): State<AppState>,
    Query(query): Query<AssignmentListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.assignment_service.list(query).await?;
    Ok(Json(ApiResponse::paginated(
        result.items,
        result.total,
        result.page,
        result.limit,
        "User-quiz assignments retrieved successfully",
    )))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/quizzes",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("page" = Option<i64>, Query, description = "Page number (1-indexed)"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag")
    ),
    responses(
        (status = 200, description = "Quizzes assigned to the user")
    )
)]
#[axum::debug_handler]
pub async fn list_user_quizzes(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(query): Query<AssignmentSideQuery>,
) -> Result<impl IntoResponse> {
    let result = state
        .assignment_service
        .list_user_quizzes(user_id, query.page, query.limit, query.is_active)
        .await?;
    let message = format!("Found {} quizzes assigned to user", result.total);
    Ok(Json(ApiResponse::paginated(
        result.items,
        result.total,
        result.page,
        result.limit,
        message,
    )))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{quiz_id}/users",
    params(
        ("quiz_id" = i32, Path, description = "Quiz ID"),
        ("page" = Option<i64>, Query, description = "Page number (1-indexed)"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag")
    ),
    responses(
        (status = 200, description = "Users assigned to the quiz")
    )
)]
#[axum::debug_handler]
pub async fn list_quiz_users(
    State(state): State<AppState>,
    Path(quiz_id): Path<i32>,
    Query(query): Query<AssignmentSideQuery>,
) -> Result<impl IntoResponse> {
    let result = state
        .assignment_service
        .list_quiz_users(quiz_id, query.page, query.limit, query.is_active)
        .await?;
    let message = format!("Found {} users assigned to quiz", result.total);
    Ok(Json(ApiResponse::paginated(
        result.items,
        result.total,
        result.page,
        result.limit,
        message,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/user-quiz-assignments/{id}",
    params(
        ("id" = i32, Path, description = "Assignment ID")
    ),
    request_body = UpdateUserQuizAssignmentPayload,
    responses(
        (status = 200, description = "Assignment updated", body = Json<AssignmentResponse>),
        (status = 404, description = "Assignment not found")
    )
)]
#[axum::debug_handler]
pub async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserQuizAssignmentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let assignment = state.assignment_service.update(id, payload).await?;
    Ok(Json(ApiResponse::ok(
        assignment,
        "User-quiz assignment updated successfully",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/user-quiz-assignments/{id}",
    params(
        ("id" = i32, Path, description = "Assignment ID")
    ),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.assignment_service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
