//! Dog-ear control for Footnotes.
//!
//! Per-footnote-view state machine orchestrating selection capture, the
//! confirmation affordance, dog-ear persistence, and marker re-application.
//! Event methods return a [`ControlEffect`] describing what the host must do
//! next (fire a persistence call, navigate to login, re-run the marker), so
//! persistence stays asynchronous and un-awaited; the host reports the
//! outcome back through [`DogEarControl::persist_completed`] /
//! [`DogEarControl::persist_failed`].
//!
//! At most one persistence call is outstanding at a time: while `Saving`,
//! every further trigger is ignored.

use crate::services::auth_service::login_redirect;
use crate::services::locator;
use crate::services::marker;
use crate::services::selection_capture::SelectionEvent;
use crate::types::errors::DogEarError;
use crate::types::selection::Selection;
use crate::types::surface::TextSurface;

/// Who is looking at the footnote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    SignedIn,
}

/// Visible state of the dog-ear control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlState {
    Unbookmarked,
    /// A valid selection awaits confirmation.
    PendingSelection(Selection),
    /// A persistence call is in flight; triggers are ignored.
    Saving,
    /// Bookmarked, optionally anchored to a passage.
    Bookmarked(Option<String>),
    /// A persistence call failed; dismissing reverts to the prior state.
    Error(String),
}

/// A persistence request for the host to run against the dog-ear store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRequest {
    Upsert { selected_text: Option<String> },
    Remove,
}

/// What the host must do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEffect {
    None,
    /// Run this request against the store, then report the outcome.
    Persist(StoreRequest),
    /// Navigate to the authentication entry point; `location` carries the
    /// current page as the return path.
    RedirectToLogin { location: String },
    /// Re-run locate + mark against the current surface
    /// (see [`DogEarControl::refresh_markers`]).
    RefreshMarkers,
}

/// Dog-ear state machine for a single footnote view.
pub struct DogEarControl {
    footnote_id: String,
    page_path: String,
    published: bool,
    viewer: Viewer,
    state: ControlState,
    /// Last settled visible state; restored when an action fails or a
    /// pending selection is dismissed.
    prior: ControlState,
    in_flight: Option<StoreRequest>,
}

impl DogEarControl {
    /// Creates the control for one footnote view.
    ///
    /// `initial` is the viewer's existing dog-ear, if any: `Some(passage)`
    /// as loaded from the store, `None` when the footnote is unbookmarked.
    pub fn new(
        footnote_id: impl Into<String>,
        page_path: impl Into<String>,
        published: bool,
        viewer: Viewer,
        initial: Option<Option<String>>,
    ) -> Self {
        let state = match initial {
            Some(passage) => ControlState::Bookmarked(passage),
            None => ControlState::Unbookmarked,
        };
        Self {
            footnote_id: footnote_id.into(),
            page_path: page_path.into(),
            published,
            viewer,
            state: state.clone(),
            prior: state,
            in_flight: None,
        }
    }

    pub fn footnote_id(&self) -> &str {
        &self.footnote_id
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// The settled bookmark state underneath any transient overlay
    /// (pending selection, in-flight save, error).
    pub fn visible_state(&self) -> ControlState {
        match &self.state {
            ControlState::PendingSelection(_)
            | ControlState::Saving
            | ControlState::Error(_) => self.prior.clone(),
            settled => settled.clone(),
        }
    }

    pub fn is_bookmarked(&self) -> bool {
        matches!(self.visible_state(), ControlState::Bookmarked(_))
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, ControlState::Saving)
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            ControlState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Feeds a selection-capture event into the control.
    pub fn selection_event(&mut self, event: SelectionEvent) -> ControlEffect {
        if !self.published || self.is_saving() || self.error_message().is_some() {
            return ControlEffect::None;
        }
        match event {
            SelectionEvent::Selected(selection) => {
                self.prior = self.visible_state();
                self.state = ControlState::PendingSelection(selection);
            }
            SelectionEvent::Cleared => {
                if matches!(self.state, ControlState::PendingSelection(_)) {
                    self.state = self.prior.clone();
                }
            }
        }
        ControlEffect::None
    }

    /// The reader confirmed the pending selection.
    pub fn confirm_selection(&mut self) -> ControlEffect {
        let ControlState::PendingSelection(selection) = self.state.clone() else {
            return ControlEffect::None;
        };
        if self.viewer == Viewer::Anonymous {
            // Not queued or replayed: after signing in the reader lands back
            // on this footnote and must re-select.
            self.state = self.prior.clone();
            return ControlEffect::RedirectToLogin {
                location: login_redirect(&self.page_path),
            };
        }
        let request = StoreRequest::Upsert {
            selected_text: Some(selection.text),
        };
        self.in_flight = Some(request.clone());
        self.state = ControlState::Saving;
        ControlEffect::Persist(request)
    }

    /// The reader toggled the whole-footnote bookmark icon.
    pub fn toggle_bookmark(&mut self) -> ControlEffect {
        if !self.published || self.is_saving() || self.error_message().is_some() {
            return ControlEffect::None;
        }
        if self.viewer == Viewer::Anonymous {
            return ControlEffect::RedirectToLogin {
                location: login_redirect(&self.page_path),
            };
        }
        let request = match self.visible_state() {
            ControlState::Bookmarked(_) => StoreRequest::Remove,
            _ => StoreRequest::Upsert {
                selected_text: None,
            },
        };
        self.prior = self.visible_state();
        self.in_flight = Some(request.clone());
        self.state = ControlState::Saving;
        ControlEffect::Persist(request)
    }

    /// The in-flight persistence call succeeded.
    pub fn persist_completed(&mut self) -> ControlEffect {
        let Some(request) = self.in_flight.take() else {
            return ControlEffect::None;
        };
        self.state = match request {
            StoreRequest::Upsert { selected_text } => ControlState::Bookmarked(selected_text),
            StoreRequest::Remove => ControlState::Unbookmarked,
        };
        self.prior = self.state.clone();
        ControlEffect::RefreshMarkers
    }

    /// The in-flight persistence call failed. The optimistic state is never
    /// committed: the control reverts and, depending on the failure, either
    /// stays silent, redirects to login, or surfaces a dismissible error.
    /// No automatic retry.
    pub fn persist_failed(&mut self, error: &DogEarError) -> ControlEffect {
        self.in_flight = None;
        match error {
            DogEarError::NotFound(_) => {
                self.state = self.prior.clone();
                ControlEffect::None
            }
            DogEarError::Unauthorized => {
                self.state = self.prior.clone();
                ControlEffect::RedirectToLogin {
                    location: login_redirect(&self.page_path),
                }
            }
            DogEarError::DatabaseError(msg) => {
                self.state = ControlState::Error(msg.clone());
                ControlEffect::None
            }
        }
    }

    /// Dismisses a surfaced error, restoring the prior visible state.
    pub fn dismiss_error(&mut self) {
        if matches!(self.state, ControlState::Error(_)) {
            self.state = self.prior.clone();
        }
    }

    /// Re-runs locate + mark against the current render.
    ///
    /// Called on every render of the footnote, however the current state was
    /// reached. Always clears first, so repeated renders are idempotent; a
    /// passage that no longer occurs in the body simply leaves no marker.
    pub fn refresh_markers(&self, surface: &mut TextSurface) {
        marker::clear_markers(surface);
        if !self.published {
            return;
        }
        if let ControlState::Bookmarked(Some(passage)) = self.visible_state() {
            let located = locator::locate(surface, &passage);
            marker::apply_marker(surface, located.as_ref());
        }
    }
}
