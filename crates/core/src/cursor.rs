//! Pagination state for location queries.
//!
//! A cursor travels to the client as an opaque token: JSON encoded with
//! URL-safe base64 without padding. Any token that fails to decode is
//! rejected, never reset.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use codenav_api::{CodeNavError, Result, UploadId};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CursorPhase {
    /// Paging through results gathered from the visible uploads.
    Local { offset: usize },
    /// Paging through other uploads that share a moniker with the query.
    Remote {
        /// Candidate uploads consumed so far.
        upload_offset: usize,
        /// Current batch; empty when the next batch must be fetched.
        upload_batch_ids: Vec<UploadId>,
        /// Locations consumed from the current batch.
        location_offset: usize,
        /// Unknown until the first batch is fetched.
        total_uploads: Option<usize>,
    },
    Done,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Visible uploads at the time of the first page.
    pub visible_upload_ids: Vec<UploadId>,
    #[serde(flatten)]
    pub phase: CursorPhase,
}

impl Cursor {
    pub fn start(visible_upload_ids: Vec<UploadId>) -> Self {
        Self {
            visible_upload_ids,
            phase: CursorPhase::Local { offset: 0 },
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, CursorPhase::Done)
    }

    pub fn advance_local(&mut self, consumed: usize) {
        if let CursorPhase::Local { offset } = &mut self.phase {
            *offset += consumed;
        }
    }

    pub fn enter_remote(&mut self) {
        self.phase = CursorPhase::Remote {
            upload_offset: 0,
            upload_batch_ids: Vec::new(),
            location_offset: 0,
            total_uploads: None,
        };
    }

    /// Installs a freshly fetched batch of candidate uploads.
    pub fn begin_batch(&mut self, batch: Vec<UploadId>, scanned: usize, total: usize) {
        if let CursorPhase::Remote {
            upload_offset,
            upload_batch_ids,
            location_offset,
            total_uploads,
        } = &mut self.phase
        {
            *upload_offset += scanned;
            *upload_batch_ids = batch;
            *location_offset = 0;
            *total_uploads = Some(total);
        }
    }

    pub fn advance_locations(&mut self, consumed: usize) {
        if let CursorPhase::Remote {
            location_offset, ..
        } = &mut self.phase
        {
            *location_offset += consumed;
        }
    }

    /// Drops the current batch; finishes when no candidates remain.
    pub fn end_batch(&mut self) {
        let exhausted = if let CursorPhase::Remote {
            upload_offset,
            upload_batch_ids,
            location_offset,
            total_uploads,
        } = &mut self.phase
        {
            upload_batch_ids.clear();
            *location_offset = 0;
            (*total_uploads).is_some_and(|total| *upload_offset >= total)
        } else {
            false
        };
        if exhausted {
            self.phase = CursorPhase::Done;
        }
    }

    pub fn finish(&mut self) {
        self.phase = CursorPhase::Done;
    }

    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)
            .map_err(|err| CodeNavError::InvalidCursor(format!("encode: {err}")))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    pub fn decode(token: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|err| CodeNavError::InvalidCursor(format!("not base64: {err}")))?;
        let cursor: Cursor = serde_json::from_slice(&bytes)
            .map_err(|err| CodeNavError::InvalidCursor(format!("not a cursor: {err}")))?;
        if let CursorPhase::Remote {
            upload_batch_ids,
            location_offset,
            ..
        } = &cursor.phase
        {
            if upload_batch_ids.is_empty() && *location_offset != 0 {
                return Err(CodeNavError::InvalidCursor(
                    "location offset without an upload batch".to_string(),
                ));
            }
        }
        Ok(cursor)
    }

    /// Token for the next page, or `None` when the results are exhausted.
    pub fn next_token(&self) -> Result<Option<String>> {
        if self.is_done() {
            return Ok(None);
        }
        self.encode().map(Some)
    }
}
