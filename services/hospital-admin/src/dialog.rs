//! Edit dialog state machine shared by every screen
//!
//! `Closed -> Open -> Submitting -> Closed` on success, or back to `Open`
//! with the error attached on failure. While `Submitting` no second
//! submission is accepted. Closing does not cancel an in-flight request;
//! its completion is simply dropped.

use crate::{HospitalError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum DialogState<D> {
    Closed,
    Open { draft: D, error: Option<String> },
    Submitting { draft: D },
}

#[derive(Debug, Clone)]
pub struct Dialog<D> {
    state: DialogState<D>,
}

impl<D> Default for Dialog<D> {
    fn default() -> Self {
        Self {
            state: DialogState::Closed,
        }
    }
}

impl<D: Clone> Dialog<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DialogState<D> {
        &self.state
    }

    pub fn open(&mut self, draft: D) {
        self.state = DialogState::Open { draft, error: None };
    }

    pub fn close(&mut self) {
        if self.is_submitting() {
            tracing::debug!("Dialog closed with a request still in flight");
        }
        self.state = DialogState::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DialogState::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, DialogState::Submitting { .. })
    }

    pub fn draft(&self) -> Option<&D> {
        match &self.state {
            DialogState::Closed => None,
            DialogState::Open { draft, .. } | DialogState::Submitting { draft } => Some(draft),
        }
    }

    /// Mutable draft, only while the dialog is being edited
    pub fn draft_mut(&mut self) -> Result<&mut D> {
        match &mut self.state {
            DialogState::Open { draft, .. } => Ok(draft),
            DialogState::Submitting { .. } => Err(HospitalError::InvalidState(
                "Dialog is submitting".to_string(),
            )),
            DialogState::Closed => Err(HospitalError::InvalidState("Dialog is closed".to_string())),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            DialogState::Open { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Move to `Submitting`, handing back a copy of the draft to send
    pub fn begin_submit(&mut self) -> Result<D> {
        match std::mem::replace(&mut self.state, DialogState::Closed) {
            DialogState::Open { draft, .. } => {
                let submitted = draft.clone();
                self.state = DialogState::Submitting { draft };
                Ok(submitted)
            }
            DialogState::Submitting { draft } => {
                self.state = DialogState::Submitting { draft };
                Err(HospitalError::InvalidState(
                    "A submission is already in progress".to_string(),
                ))
            }
            DialogState::Closed => Err(HospitalError::InvalidState(
                "Dialog is not open".to_string(),
            )),
        }
    }

    /// Settle a submission: close on success, reopen with the message on failure
    pub fn complete<T>(&mut self, result: &Result<T>) {
        let state = std::mem::replace(&mut self.state, DialogState::Closed);
        match (state, result) {
            (DialogState::Submitting { .. }, Ok(_)) => {}
            (DialogState::Submitting { draft }, Err(e)) => {
                self.state = DialogState::Open {
                    draft,
                    error: Some(e.to_string()),
                };
            }
            (other, _) => {
                tracing::debug!("Ignoring completion for a dialog that is no longer submitting");
                self.state = other;
            }
        }
    }
}
