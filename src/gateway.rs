use tracing::Instrument;

use crate::{
    dispatch::Dispatcher,
    request::{RawEvent, normalize},
    response::Envelope,
    state::AppState,
};

/// The single entry point: raw event in, envelope out.
pub struct Gateway {
    state: AppState,
    dispatcher: Dispatcher,
}

impl Gateway {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn handle(&self, event: RawEvent) -> Envelope {
        let request = match normalize(event, &self.state.tokens) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(error = %err, "rejecting unreadable request");
                return Envelope::bad_request(&err);
            }
        };

        let action = request.action().unwrap_or_default().to_string();
        let span = tracing::info_span!(
            "dispatch",
            action = %action,
            method = %request.method,
            path = %request.path,
            anonymous = request.identity.is_anonymous(),
        );

        async {
            match self
                .dispatcher
                .dispatch(&self.state, &action, request.data())
                .await
            {
                Ok(Some(body)) => Envelope::ok(&body),
                Ok(None) => Envelope::empty(),
                Err(err) => {
                    tracing::warn!(error = %err, kind = err.kind(), "action failed");
                    Envelope::failure(&err)
                }
            }
        }
        .instrument(span)
        .await
    }
}
