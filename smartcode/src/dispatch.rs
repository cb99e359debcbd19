//! Runs keybinding commands and applies their settled results.
//!
//! Remote calls are spawned as tokio tasks that report back through the event
//! channel as [`ApiEvent`]s, so the render loop never waits on the network.
//! History writes are awaited inline since they are local.

use smartcode_core::api::{ApiClient, ReviewBackend};
use smartcode_core::history::HistoryStore;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppState;
use crate::event::{ApiEvent, AppEvent};
use crate::ui::keybindings::Command;

/// Starts `cmd`. Remote work completes later as an `AppEvent::Api`.
pub async fn run(
    cmd: Command,
    state: &mut AppState,
    client: &ApiClient,
    history: &mut HistoryStore,
    tx: &UnboundedSender<AppEvent>,
) {
    match cmd {
        Command::Submit(submission) => {
            tracing::info!(action = ?submission.action(), "submitting");
            spawn_call(client, tx, move |client| async move {
                ApiEvent::Submission(submission.execute(&client).await)
            });
        }
        Command::SendChat { generation, request } => {
            spawn_call(client, tx, move |client| async move {
                ApiEvent::Chat { generation, result: client.chat(&request).await }
            });
        }
        Command::OpenHistory(id) => match history.select(&id) {
            Some(entry) => state.open_history_entry(entry.clone()),
            None => tracing::debug!(%id, "history entry no longer stored"),
        },
        Command::LoadSessions => {
            spawn_call(client, tx, |client| async move {
                ApiEvent::Sessions(client.list_sessions().await)
            });
        }
        Command::OpenSession(id) => {
            spawn_call(client, tx, move |client| async move {
                ApiEvent::SessionOpened(client.session_detail(&id).await)
            });
        }
        Command::DeleteSession(id) => {
            spawn_call(client, tx, move |client| async move {
                let result = client.delete_session(&id).await;
                ApiEvent::SessionDeleted { id, result }
            });
        }
        Command::ClearHistory => {
            history.clear().await;
            state.set_history(Vec::new());
            tracing::info!("history cleared");
        }
    }
}

/// Applies a settled remote call to the UI state.
pub async fn apply(event: ApiEvent, state: &mut AppState, history: &mut HistoryStore) {
    match event {
        ApiEvent::Submission(result) => {
            if let Some(review) = state.apply_submission(result) {
                if history.record(&review).await {
                    state.set_history(history.entries().to_vec());
                }
            }
        }
        ApiEvent::Chat { generation, result } => state.apply_chat(generation, result),
        ApiEvent::Sessions(result) => state.apply_sessions(result),
        ApiEvent::SessionOpened(result) => state.apply_session_opened(result),
        ApiEvent::SessionDeleted { id, result } => state.apply_session_deleted(&id, result),
    }
}

/// Spawns `call` on a clone of `client` and forwards its event to the loop.
fn spawn_call<F, Fut>(client: &ApiClient, tx: &UnboundedSender<AppEvent>, call: F)
where
    F: FnOnce(ApiClient) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ApiEvent> + Send + 'static,
{
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = call(client).await;
        // The loop has exited when the receiver is gone; nothing to deliver.
        let _ = tx.send(AppEvent::Api(Box::new(event)));
    });
}
