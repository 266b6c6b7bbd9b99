//! Live search suggestions while the user is typing.
//!
//! Keystrokes are pushed into a [`SuggestionFeed`]; a background task waits
//! for a quiet period before geocoding the latest input and publishes the
//! result on a `watch` channel. Suggestions are speculative, so lookup
//! failures only clear the list.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{model::Location, provider::WeatherProvider};

pub const DEBOUNCE: Duration = Duration::from_millis(300);
/// Inputs this short are not looked up.
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    pub query: String,
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone)]
pub struct SuggestionFeed {
    input: mpsc::UnboundedSender<String>,
    output: watch::Receiver<Suggestions>,
}

impl SuggestionFeed {
    /// Spawn the debounce task on the current tokio runtime.
    pub fn spawn(
        provider: Arc<dyn WeatherProvider>,
        count: u8,
        quiet: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (input, inputs) = mpsc::unbounded_channel();
        let (outputs, output) = watch::channel(Suggestions::default());
        let handle = tokio::spawn(run(provider, count, quiet, inputs, outputs));

        (Self { input, output }, handle)
    }

    /// Record the current contents of the search box.
    pub fn push(&self, input: &str) {
        if self.input.send(input.to_string()).is_err() {
            tracing::debug!("suggestion task has stopped; input dropped");
        }
    }

    /// Push `input` and wait up to `limit` for the lookup of exactly that
    /// input. Gives up with an empty list rather than showing results for an
    /// older prefix.
    pub async fn suggest(&self, input: &str, limit: Duration) -> Suggestions {
        let mut updates = self.subscribe();
        if updates.borrow().query == input {
            return self.latest();
        }

        self.push(input);
        match tokio::time::timeout(limit, updates.wait_for(|s| s.query == input)).await {
            Ok(Ok(suggestions)) => (*suggestions).clone(),
            Ok(Err(_)) | Err(_) => {
                tracing::debug!(input, "no suggestions in time");
                Suggestions {
                    query: input.to_string(),
                    locations: Vec::new(),
                }
            }
        }
    }

    pub fn latest(&self) -> Suggestions {
        self.output.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Suggestions> {
        self.output.clone()
    }
}

async fn run(
    provider: Arc<dyn WeatherProvider>,
    count: u8,
    quiet: Duration,
    mut inputs: mpsc::UnboundedReceiver<String>,
    outputs: watch::Sender<Suggestions>,
) {
    while let Some(mut query) = inputs.recv().await {
        // Restart the quiet period on every new input.
        let mut closed = false;
        loop {
            match tokio::time::timeout(quiet, inputs.recv()).await {
                Ok(Some(newer)) => query = newer,
                Ok(None) => {
                    closed = true;
                    break;
                }
                Err(_) => break,
            }
        }

        let suggestions = lookup(provider.as_ref(), &query, count).await;
        if outputs.send(suggestions).is_err() || closed {
            break;
        }
    }
}

async fn lookup(provider: &dyn WeatherProvider, query: &str, count: u8) -> Suggestions {
    let trimmed = query.trim();
    let locations = if trimmed.chars().count() < MIN_QUERY_CHARS {
        Vec::new()
    } else {
        match provider.search_locations(trimmed, count).await {
            Ok(locations) => locations,
            Err(error) => {
                tracing::warn!(query = trimmed, %error, "suggestion lookup failed");
                Vec::new()
            }
        }
    };

    Suggestions {
        query: query.to_string(),
        locations,
    }
}
