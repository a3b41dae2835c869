use super::content_warning::ContentWarningGate;
use super::entity::{Status, TootPayload};
use super::toot::{normalize, TootViewModel, Viewer};
use crate::dispatch::{Intent, IntentKind, Outcome};

/// One toot box: the payload it was given, the view derived from it, and
/// the reader's content-warning choice.
#[derive(Debug, Clone)]
pub struct TootCard {
    payload: TootPayload,
    view: TootViewModel,
    gate: ContentWarningGate,
    thread_hint: bool,
}

impl TootCard {
    pub fn new(payload: TootPayload, viewer: &Viewer, thread_hint: bool) -> Self {
        let view = normalize(Some(&payload), viewer, thread_hint);
        let gate = ContentWarningGate::new(view.sensitive());
        let mut card = TootCard {
            payload,
            view,
            gate,
            thread_hint,
        };
        card.sync_gate();
        card
    }

    fn sync_gate(&mut self) {
        self.view.content_hidden = self.gate.is_hidden();
    }

    fn renormalize(&mut self, viewer: &Viewer) {
        self.view = normalize(Some(&self.payload), viewer, self.thread_hint);
        self.gate.rebind(self.view.sensitive());
        self.sync_gate();
    }

    /// Replaces the payload. The view is rebuilt from scratch; the content
    /// warning choice survives as long as it is still the same status.
    pub fn set_payload(&mut self, payload: TootPayload, viewer: &Viewer) {
        let same_status = payload.display_status().map(|s| s.id.as_str()) == self.view.status_id();
        self.payload = payload;
        if !same_status {
            self.gate = ContentWarningGate::new(false);
        }
        self.renormalize(viewer);
    }

    pub fn set_viewer(&mut self, viewer: &Viewer) {
        self.renormalize(viewer);
    }

    pub fn view(&self) -> &TootViewModel {
        &self.view
    }

    pub fn payload(&self) -> &TootPayload {
        &self.payload
    }

    pub fn gate(&self) -> &ContentWarningGate {
        &self.gate
    }

    pub fn toggle_content_warning(&mut self) {
        self.gate.toggle();
        self.sync_gate();
    }

    /// Carries the content-warning choice over from an earlier card for
    /// the same status.
    pub fn inherit_gate(&mut self, previous: &TootCard) {
        if previous.view.status_id().is_some()
            && previous.view.status_id() == self.view.status_id()
            && previous.gate.is_active() == self.gate.is_active()
        {
            self.gate = previous.gate;
            self.sync_gate();
        }
    }

    pub fn status(&self) -> Option<&Status> {
        self.view.body()
    }

    pub fn shows_status(&self, status_id: &str) -> bool {
        self.view.status_id() == Some(status_id)
    }

    /// Whether this card belongs to `account_id`, as author of the shown
    /// status or as the notification actor.
    pub fn involves_account(&self, account_id: &str) -> bool {
        let author = self.view.display_account.as_ref().map(|a| a.id.as_str());
        let actor = self.view.actor.as_ref().map(|a| a.id.as_str());
        author == Some(account_id) || actor == Some(account_id)
    }

    /// Builds the request for `kind`, or `None` when the toot does not
    /// allow it (nothing loaded, or not the viewer's toot to delete/pin,
    /// or the viewer's own account to mute/block).
    pub fn intent(&self, kind: IntentKind) -> Option<Intent> {
        let status = self.view.body()?;
        let status_id = status.id.clone();
        if status_id.is_empty() {
            return None;
        }
        match kind {
            IntentKind::Favourite => Some(Intent::Favourite {
                status_id,
                want: !status.favourited,
            }),
            IntentKind::Reblog => Some(Intent::Reblog {
                status_id,
                want: !status.reblogged,
            }),
            IntentKind::Delete if self.view.is_mine => Some(Intent::Delete { status_id }),
            IntentKind::TogglePin if self.view.is_mine => Some(Intent::SetPin {
                status_id,
                currently_pinned: status.pinned,
            }),
            IntentKind::Mute if !self.view.is_mine => Some(Intent::MuteAccount {
                status_id,
                account_id: status.account.id.clone(),
            }),
            IntentKind::Block if !self.view.is_mine => Some(Intent::BlockAccount {
                status_id,
                account_id: status.account.id.clone(),
            }),
            _ => None,
        }
    }

    /// Applies a successful mutation to this card. Returns true if the
    /// card changed. Applying the same outcome twice changes nothing the
    /// second time.
    pub fn apply(&mut self, outcome: &Outcome, viewer: &Viewer) -> bool {
        let status = match self.payload.display_status_mut() {
            Some(s) => s,
            None => return false,
        };
        let changed = match outcome {
            Outcome::Favourited {
                status_id,
                favourited,
            } if *status_id == status.id && status.favourited != *favourited => {
                status.favourited = *favourited;
                status.favourites_count = step(status.favourites_count, *favourited);
                true
            }
            Outcome::Reblogged {
                status_id,
                reblogged,
            } if *status_id == status.id && status.reblogged != *reblogged => {
                status.reblogged = *reblogged;
                status.reblogs_count = step(status.reblogs_count, *reblogged);
                true
            }
            Outcome::Pinned { status_id, pinned }
                if *status_id == status.id && status.pinned != *pinned =>
            {
                status.pinned = *pinned;
                true
            }
            _ => false,
        };
        if changed {
            self.renormalize(viewer);
        }
        changed
    }
}

fn step(count: u32, up: bool) -> u32 {
    if up {
        count.saturating_add(1)
    } else {
        count.saturating_sub(1)
    }
}
