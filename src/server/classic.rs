use super::{ cors, AppState };
use axum::{
    extract::{ rejection::FormRejection, State },
    http::StatusCode,
    response::{ Html, IntoResponse, Response },
    routing::get,
    Form,
    Router,
};
use log::{ error, warn };
use serde::Deserialize;

const CHAT_PAGE: &str = include_str!("../../templates/chat.html");

#[derive(Deserialize)]
pub struct ChatForm {
    pub msg: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/get", get(chat).post(chat))
        .layer(cors())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

/// Answers `msg` (query string for GET, urlencoded body for POST) with the plain-text reply.
/// A request without `msg` is a 400 whether it arrives as a query or a body.
async fn chat(
    State(state): State<AppState>,
    form: Result<Form<ChatForm>, FormRejection>
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            warn!("Rejected classic request: {}", rejection);
            return (StatusCode::BAD_REQUEST, rejection.body_text()).into_response();
        }
    };

    // Held for the whole turn: classic turns run one at a time.
    let mut session = state.session.lock().await;

    match session.handle_turn(&state.pipeline, &form.msg).await {
        Ok(answer) => answer.into_response(),
        Err(e) => {
            error!("Classic turn failed: {}", e);
            (StatusCode::BAD_GATEWAY, format!("Error processing request: {}", e)).into_response()
        }
    }
}
