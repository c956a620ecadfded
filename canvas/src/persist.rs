//! Persistence collaborator: where finished items go.
//!
//! The engine never awaits persistence. [`ItemSink`] is called synchronously
//! from action dispatch and implementations decide how (and whether) to push
//! work to the network. The local item store stays authoritative for the
//! session regardless of what the sink does.
//!
//! ERROR HANDLING
//! ==============
//! Submission failures are logged by the sink, never surfaced to the engine
//! and never retried.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use crate::doc::{BoardItem, ItemId};

/// Form field carrying the board identifier.
pub const FIELD_BOARD_ID: &str = "boardid";
/// Form field carrying the JSON-encoded item.
pub const FIELD_BOARD_ITEM: &str = "boarditem";

/// Error from encoding or sending one submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("could not encode board item: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Network(String),
    #[error("server rejected item with status {0}")]
    Status(u16),
}

/// Receives board mutations from the engine.
///
/// Only creation is required; removal and move hooks default to no-ops
/// because the server endpoint is append-only.
pub trait ItemSink {
    /// A stroke or image was finished and appended to the local store.
    fn submit_item(&mut self, item: &BoardItem, board_id: &str);

    /// Items were removed locally by delete or undo.
    fn items_removed(&mut self, _board_id: &str, _ids: &[ItemId]) {}

    /// A move gesture was committed; `items` hold the final geometry.
    fn items_moved(&mut self, _board_id: &str, _items: &[BoardItem]) {}
}

/// One encoded submission, ready to be sent as form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub board_id: String,
    pub item_json: String,
}

impl Submission {
    /// Encode `item` in its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Encode`] if the item cannot be serialized.
    pub fn encode(item: &BoardItem, board_id: &str) -> Result<Self, SubmitError> {
        Ok(Self { board_id: board_id.to_owned(), item_json: serde_json::to_string(item)? })
    }

    /// Form fields in submission order.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 2] {
        [(FIELD_BOARD_ID, &self.board_id), (FIELD_BOARD_ITEM, &self.item_json)]
    }
}

/// Records every call, for assertions in tests and demos.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub submitted: Vec<(String, BoardItem)>,
    pub removed: Vec<(String, Vec<ItemId>)>,
    pub moved: Vec<(String, Vec<BoardItem>)>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemSink for RecordingSink {
    fn submit_item(&mut self, item: &BoardItem, board_id: &str) {
        self.submitted.push((board_id.to_owned(), item.clone()));
    }

    fn items_removed(&mut self, board_id: &str, ids: &[ItemId]) {
        self.removed.push((board_id.to_owned(), ids.to_vec()));
    }

    fn items_moved(&mut self, board_id: &str, items: &[BoardItem]) {
        self.moved.push((board_id.to_owned(), items.to_vec()));
    }
}

/// Posts finished items to the board server as `multipart/form-data`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct HttpSink {
    url: String,
}

#[cfg(target_arch = "wasm32")]
impl HttpSink {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(target_arch = "wasm32")]
impl ItemSink for HttpSink {
    fn submit_item(&mut self, item: &BoardItem, board_id: &str) {
        let submission = match Submission::encode(item, board_id) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("not submitting {} {}: {e}", item.kind(), item.id());
                return;
            }
        };
        let url = self.url.clone();
        let id = item.id();
        wasm_bindgen_futures::spawn_local(async move {
            match post(&url, &submission).await {
                Ok(()) => log::debug!("submitted item {id}"),
                Err(e) => log::warn!("item {id} was not saved: {e}"),
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
async fn post(url: &str, submission: &Submission) -> Result<(), SubmitError> {
    let js_err = |e: wasm_bindgen::JsValue| SubmitError::Network(format!("{e:?}"));
    let form = web_sys::FormData::new().map_err(js_err)?;
    for (name, value) in submission.fields() {
        form.append_with_str(name, value).map_err(js_err)?;
    }
    let resp = gloo_net::http::Request::post(url)
        .body(form)
        .map_err(|e| SubmitError::Network(e.to_string()))?
        .send()
        .await
        .map_err(|e| SubmitError::Network(e.to_string()))?;
    let status = resp.status();
    if !(200..300).contains(&status) {
        return Err(SubmitError::Status(status));
    }
    Ok(())
}
