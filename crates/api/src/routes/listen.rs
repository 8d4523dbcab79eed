use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::{self, Stream, StreamExt};
use gtm_site_core::events::SiteEvent;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::state::AppState;

/// Server-sent change feed.
pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/listen", get(listen))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListenParams {
    /// Only deliver events concerning this document (plus site-wide ones).
    document_id: Option<Uuid>,
}

/// Opens with a `welcome` event. A listener that falls behind the bus gets a
/// `reconnect` event and should refetch.
async fn listen(
    State(state): State<AppState>,
    Query(params): Query<ListenParams>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.event_bus().subscribe();
    tracing::debug!(document_id = ?params.document_id, "listener connected");

    let updates = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Ok(event) => Some((event, rx)),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "listener lagged behind event bus");
                Some((SiteEvent::Reconnect, rx))
            }
            Err(RecvError::Closed) => None,
        }
    });

    let scope = params.document_id;
    let events = stream::once(async { SiteEvent::Welcome })
        .chain(updates)
        .filter(move |event| {
            let keep = scope.map_or(true, |id| event.concerns(id));
            async move { keep }
        })
        .map(|event| Event::default().event(event.kind()).json_data(&event));

    Sse::new(events).keep_alive(KeepAlive::default())
}
