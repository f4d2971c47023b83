use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use tracing::info;

use yachiyo_types::api::{InsertResult, NewReview, ReviewQuery};
use yachiyo_types::models::Review;

use crate::AppState;
use crate::error::{ApiError, ApiResult, blocking};

pub async fn list_reviews(
    State(state): State<AppState>,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Review>>> {
    let Query(query) = query?;
    let reviews = blocking(move || state.db.list_reviews(query.room_id)).await?;
    Ok(Json(reviews))
}

/// POST /reviews: `idx` is not checked against existing rooms.
pub async fn create_review(
    State(state): State<AppState>,
    body: Result<Json<NewReview>, JsonRejection>,
) -> ApiResult<Json<InsertResult>> {
    let Json(review) = body?;
    if !(1..=5).contains(&review.rating) {
        return Err(ApiError::BadRequest(format!(
            "Rating must be between 1 and 5, got {}",
            review.rating
        )));
    }

    let idx = review.idx;
    let inserted_id = blocking(move || state.db.insert_review(&review)).await?;
    info!("Created review {} for room index {}", inserted_id, idx);

    Ok(Json(InsertResult {
        acknowledged: true,
        inserted_id,
    }))
}
