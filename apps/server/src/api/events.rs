use std::{convert::Infallible, sync::Arc, time::Duration};

use crate::main_lib::AppState;
use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_core::stream::Stream;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = BroadcastStream::new(state.event_bus.subscribe());
    let stream = tokio_stream::StreamExt::filter_map(receiver, |event| match event {
        Ok(evt) => {
            let sse_event = SseEvent::default().event(evt.name);
            let sse_event = match evt.payload {
                Some(payload) => match sse_event.json_data(payload) {
                    Ok(ev) => ev,
                    Err(err) => {
                        tracing::error!("Failed to serialize SSE payload for {}: {}", evt.name, err);
                        return None;
                    }
                },
                None => sse_event.data("null"),
            };
            Some(Ok(sse_event))
        }
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!("SSE client lagged, {} events dropped", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/events/stream", get(stream_events))
}
