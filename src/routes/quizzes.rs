use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::{
        api::ApiResponse,
        quiz_dto::{QuizLinks, UploadedImage},
    },
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/quizzes/{quiz_id}/image",
    params(
        ("quiz_id" = i32, Path, description = "Quiz ID")
    ),
    responses(
        (status = 201, description = "Image stored", body = Json<UploadedImage>),
        (status = 400, description = "Invalid or missing file"),
        (status = 404, description = "Quiz not found")
    )
)]
#[axum::debug_handler]
pub async fn upload_quiz_image(
    State(state): State<AppState>,
    Path(quiz_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let quiz = state.quiz_service.get_by_id(quiz_id).await?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field
            .file_name()
            .map(String::from)
            .ok_or_else(|| Error::BadRequest("Missing file name".to_string()))?;
        let mime_type = field
            .content_type()
            .map(String::from)
            .ok_or_else(|| Error::BadRequest("Missing content type".to_string()))?;
        let data = field.bytes().await?;

        let uploaded = state
            .upload_service
            .save_image(&data, &original_name, &mime_type, &quiz.slug)
            .await?;
        state
            .quiz_service
            .set_image_url(quiz_id, &uploaded.file_path)
            .await?;

        return Ok((
            StatusCode::CREATED,
            Json(ApiResponse::ok(
                uploaded,
                "Quiz image uploaded successfully",
            )),
        ));
    }

    Err(Error::BadRequest(
        "Multipart field 'file' is required".to_string(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{quiz_id}/links",
    params(
        ("quiz_id" = i32, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Quiz links", body = Json<QuizLinks>),
        (status = 404, description = "Quiz not found")
    )
)]
#[axum::debug_handler]
pub async fn get_quiz_links(
    State(state): State<AppState>,
    Path(quiz_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let quiz = state.quiz_service.get_by_id(quiz_id).await?;
    let links = state.url_service.generate_quiz_urls(&quiz).await;
    Ok(Json(ApiResponse::ok(
        links,
        "Quiz links generated successfully",
    )))
}
