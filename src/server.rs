//! HTTP front door for Slack: slash commands and Events API callbacks.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::commands::{self, Ack, Command, Context};
use crate::slack::signature::{self, SignatureError};
use crate::slack::types::{Event, EventEnvelope};
use crate::slack::{Block, Message, SlashCommand, Text};

#[derive(Clone)]
pub struct AppState {
    pub ctx: Context,
    pub signing_secret: Arc<str>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/slack/commands", post(slash_command))
        .route("/slack/events", post(events))
        .route("/healthz", get(health))
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening for Slack requests");
    axum::serve(listener, router(state)).await
}

fn verify_request(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), SignatureError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    signature::verify(
        &state.signing_secret,
        header("x-slack-request-timestamp"),
        header("x-slack-signature"),
        body,
        chrono::Utc::now().timestamp(),
    )
}

async fn health() -> &'static str {
    "ok"
}

async fn slash_command(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(err) = verify_request(&state, &headers, &body) {
        warn!(error = %err, "rejected slash command");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let pairs: Vec<(String, String)> = form_urlencoded::parse(&body).into_owned().collect();
    let invocation = SlashCommand::from_form(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    let Some(command) = Command::parse(&invocation.command) else {
        debug!(command = %invocation.command, "unknown slash command");
        return (
            StatusCode::OK,
            format!("Sorry, I don't know how to handle {}.", invocation.command),
        )
            .into_response();
    };

    // The handler keeps running after the HTTP response; Slack only waits
    // for the acknowledgment.
    let (ack, acked) = Ack::channel();
    let ctx = state.ctx.clone();
    tokio::spawn(async move {
        commands::handle(&ctx, command, &invocation, ack).await;
    });

    if acked.await.is_err() {
        error!(%command, "handler stopped before acknowledging");
    }
    StatusCode::OK.into_response()
}

async fn events(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(err) = verify_request(&state, &headers, &body) {
        warn!(error = %err, "rejected event callback");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(error = %err, "malformed event payload");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            Json(json!({ "challenge": challenge })).into_response()
        }
        EventEnvelope::EventCallback { event } => {
            if let Some((channel, user)) = greeting_target(event) {
                let ctx = state.ctx.clone();
                tokio::spawn(async move { greet(&ctx, &channel, &user).await });
            }
            StatusCode::OK.into_response()
        }
        EventEnvelope::Other => StatusCode::OK.into_response(),
    }
}

/// Channel and user to greet when someone says hello. Messages from bots,
/// the bot itself included, are ignored.
fn greeting_target(event: Event) -> Option<(String, String)> {
    match event {
        Event::Message {
            text: Some(text),
            user: Some(user),
            channel,
            bot_id: None,
        } if text.contains("hello") => Some((channel, user)),
        _ => None,
    }
}

async fn greet(ctx: &Context, channel: &str, user: &str) {
    let text = format!("Hey there <@{user}>!");
    let message = Message::blocks(vec![Block::section(Text::mrkdwn(text.clone()))]).with_text(text);
    if let Err(err) = ctx.messenger.post(channel, &message).await {
        error!(error = %err, channel, "failed to send greeting");
    }
}
