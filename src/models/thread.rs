use super::card::TootCard;
use super::entity::{Context, Status, TootPayload};
use super::toot::Viewer;
use crate::dispatch::Outcome;

/// A toot opened on its own, with the conversation around it. Any toot in
/// the conversation can be selected; selection starts on the focal toot.
#[derive(Debug, Clone)]
pub struct ThreadViewModel {
    pub ancestors: Vec<TootCard>,
    pub focal: TootCard,
    pub descendants: Vec<TootCard>,
    pub context_loaded: bool,
    /// Index into ancestors, focal, descendants in reading order.
    pub selected_index: usize,
}

impl ThreadViewModel {
    /// Detail views never show the "显示前文" hint: the thread is already there.
    pub fn new(focal: TootPayload, viewer: &Viewer) -> Self {
        ThreadViewModel {
            ancestors: Vec::new(),
            focal: TootCard::new(focal, viewer, false),
            descendants: Vec::new(),
            context_loaded: false,
            selected_index: 0,
        }
    }

    /// Fills in (or refreshes) the conversation. Toots already on screen
    /// keep their card, so a revealed content warning stays revealed.
    pub fn set_context(&mut self, context: Context, viewer: &Viewer) {
        let selected_key = self.selected().map(|c| c.payload().key().to_string());
        let was_loaded = self.context_loaded;

        let mut previous: Vec<TootCard> = self
            .ancestors
            .drain(..)
            .chain(self.descendants.drain(..))
            .collect();
        let mut card = |status: Status| {
            let payload = TootPayload::Status(status);
            let existing = previous.iter().position(|c| c.payload().key() == payload.key());
            match existing {
                Some(i) => {
                    let mut card = previous.swap_remove(i);
                    card.set_payload(payload, viewer);
                    card
                }
                None => TootCard::new(payload, viewer, false),
            }
        };
        self.ancestors = context.ancestors.into_iter().map(&mut card).collect();
        self.descendants = context.descendants.into_iter().map(&mut card).collect();
        self.context_loaded = true;

        match selected_key {
            Some(key) if was_loaded => self.reselect(&key),
            _ => self.selected_index = self.focal_index(),
        }
    }

    pub fn focal_status_id(&self) -> Option<&str> {
        self.focal.view().status_id()
    }

    pub fn focal_index(&self) -> usize {
        self.ancestors.len()
    }

    fn len(&self) -> usize {
        self.ancestors.len() + 1 + self.descendants.len()
    }

    pub fn selected(&self) -> Option<&TootCard> {
        let i = self.selected_index;
        let focal = self.focal_index();
        if i < focal {
            self.ancestors.get(i)
        } else if i == focal {
            Some(&self.focal)
        } else {
            self.descendants.get(i - focal - 1)
        }
    }

    pub fn selected_mut(&mut self) -> Option<&mut TootCard> {
        let i = self.selected_index;
        let focal = self.focal_index();
        if i < focal {
            self.ancestors.get_mut(i)
        } else if i == focal {
            Some(&mut self.focal)
        } else {
            self.descendants.get_mut(i - focal - 1)
        }
    }

    pub fn is_focal_selected(&self) -> bool {
        self.selected_index == self.focal_index()
    }

    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.len() {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.len() - 1;
    }

    fn reselect(&mut self, key: &str) {
        let position = self
            .ancestors
            .iter()
            .chain(std::iter::once(&self.focal))
            .chain(self.descendants.iter())
            .position(|c| c.payload().key() == key);
        self.selected_index = match position {
            Some(i) => i,
            None => self.selected_index.min(self.len() - 1),
        };
    }

    /// Applies an outcome to every toot in the thread. Returns false when
    /// nothing here was affected; a deleted focal toot is reported through
    /// `focal_removed`.
    pub fn apply(&mut self, outcome: &Outcome, viewer: &Viewer) -> bool {
        let selected_key = self.selected().map(|c| c.payload().key().to_string());
        let mut touched = false;
        match outcome {
            Outcome::Deleted { status_id } => {
                let before = self.ancestors.len() + self.descendants.len();
                self.ancestors.retain(|c| !c.shows_status(status_id));
                self.descendants.retain(|c| !c.shows_status(status_id));
                touched |= before != self.ancestors.len() + self.descendants.len();
                touched |= self.focal.shows_status(status_id);
            }
            Outcome::Muted { account_id } | Outcome::Blocked { account_id } => {
                let before = self.ancestors.len() + self.descendants.len();
                self.ancestors.retain(|c| !c.involves_account(account_id));
                self.descendants.retain(|c| !c.involves_account(account_id));
                touched |= before != self.ancestors.len() + self.descendants.len();
                touched |= self.focal.involves_account(account_id);
            }
            _ => {
                touched |= self.focal.apply(outcome, viewer);
                for card in self.ancestors.iter_mut().chain(self.descendants.iter_mut()) {
                    touched |= card.apply(outcome, viewer);
                }
            }
        }
        if let Some(key) = selected_key {
            self.reselect(&key);
        }
        touched
    }

    /// Whether the outcome removes the toot this view is about.
    pub fn focal_removed(&self, outcome: &Outcome) -> bool {
        match outcome {
            Outcome::Deleted { status_id } => self.focal.shows_status(status_id),
            Outcome::Muted { account_id } | Outcome::Blocked { account_id } => {
                self.focal.involves_account(account_id)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::{Account, Status};

    fn status(id: &str, account_id: &str) -> Status {
        Status {
            id: id.into(),
            account: Account {
                id: account_id.into(),
                username: format!("user{}", account_id),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn detail_view_suppresses_thread_hint() {
        let viewer = Viewer::new("1", "user1");
        let mut s = status("s1", "1");
        s.in_reply_to_account_id = Some("1".into());
        let thread = ThreadViewModel::new(TootPayload::Status(s), &viewer);
        assert!(!thread.focal.view().show_thread_hint);
    }

    #[test]
    fn context_fills_both_sides() {
        let viewer = Viewer::new("1", "user1");
        let mut thread = ThreadViewModel::new(TootPayload::Status(status("s2", "9")), &viewer);
        thread.set_context(
            Context {
                ancestors: vec![status("s1", "9")],
                descendants: vec![status("s3", "8"), status("s4", "9")],
            },
            &viewer,
        );
        assert!(thread.context_loaded);
        assert_eq!(thread.ancestors.len(), 1);
        assert_eq!(thread.descendants.len(), 2);

        let blocked = Outcome::Blocked {
            account_id: "8".into(),
        };
        assert!(thread.apply(&blocked, &viewer));
        assert_eq!(thread.descendants.len(), 1);
        assert!(!thread.focal_removed(&blocked));

        let deleted = Outcome::Deleted {
            status_id: "s2".into(),
        };
        assert!(thread.focal_removed(&deleted));
    }

    fn sensitive(id: &str, account_id: &str) -> Status {
        Status {
            sensitive: true,
            spoiler_text: "spoilers".into(),
            ..status(id, account_id)
        }
    }

    #[test]
    fn refreshing_context_keeps_revealed_replies_open() {
        let viewer = Viewer::new("1", "user1");
        let context = Context {
            ancestors: vec![],
            descendants: vec![sensitive("s2", "9"), status("s3", "8")],
        };
        let mut thread = ThreadViewModel::new(TootPayload::Status(status("s1", "9")), &viewer);
        thread.set_context(context.clone(), &viewer);
        assert!(thread.descendants[0].gate().is_hidden());

        thread.select_next();
        thread.selected_mut().unwrap().toggle_content_warning();
        assert!(!thread.descendants[0].gate().is_hidden());

        thread.set_context(context, &viewer);
        assert!(!thread.descendants[0].gate().is_hidden());
        // Selection stays on the same reply
        assert_eq!(thread.selected().unwrap().payload().key(), "s2");
    }

    #[test]
    fn selection_walks_the_whole_conversation() {
        let viewer = Viewer::new("1", "user1");
        let mut thread = ThreadViewModel::new(TootPayload::Status(status("s2", "9")), &viewer);
        assert!(thread.is_focal_selected());
        thread.set_context(
            Context {
                ancestors: vec![status("s1", "9")],
                descendants: vec![status("s3", "8")],
            },
            &viewer,
        );
        // Loading the context keeps the focal toot selected
        assert_eq!(thread.selected_index, 1);
        assert!(thread.is_focal_selected());

        thread.select_first();
        assert_eq!(thread.selected().unwrap().payload().key(), "s1");
        thread.select_prev();
        assert_eq!(thread.selected_index, 0);
        thread.select_last();
        assert_eq!(thread.selected().unwrap().payload().key(), "s3");
        thread.select_next();
        assert_eq!(thread.selected().unwrap().payload().key(), "s3");
    }

    #[test]
    fn removing_the_selected_reply_keeps_selection_in_range() {
        let viewer = Viewer::new("1", "user1");
        let mut thread = ThreadViewModel::new(TootPayload::Status(status("s1", "9")), &viewer);
        thread.set_context(
            Context {
                ancestors: vec![],
                descendants: vec![status("s2", "8")],
            },
            &viewer,
        );
        thread.select_last();
        assert!(thread.apply(&Outcome::Muted { account_id: "8".into() }, &viewer));
        assert!(thread.is_focal_selected());
    }
}
