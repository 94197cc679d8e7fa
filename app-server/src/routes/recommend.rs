use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use cinematch_retrieval::Recommendation;

use crate::error::ServerResult;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub user_input: String,
}

/// Run the refinement pipeline for one utterance.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> ServerResult<Json<Recommendation>> {
    let recommendation = state.pipeline.recommend(&request.user_input).await?;

    info!(
        "Recommended {} keywords from {} expansion terms",
        recommendation.recommended_keywords.len(),
        recommendation.llm_generated_keywords.len()
    );
    Ok(Json(recommendation))
}
