use super::card::TootCard;
use super::entity::TootPayload;
use super::toot::Viewer;
use crate::dispatch::Outcome;

#[derive(Debug, Clone)]
pub struct FeedState {
    pub cards: Vec<TootCard>,
    pub cursor: Option<String>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub loading: bool,
    pub thread_hint: bool,
}

impl FeedState {
    pub fn new(thread_hint: bool) -> Self {
        FeedState {
            cards: Vec::new(),
            cursor: None,
            selected_index: 0,
            scroll_offset: 0,
            loading: false,
            thread_hint,
        }
    }

    pub fn select_next(&mut self) {
        if !self.cards.is_empty() && self.selected_index < self.cards.len() - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        if !self.cards.is_empty() {
            self.selected_index = self.cards.len() - 1;
        }
    }

    pub fn selected(&self) -> Option<&TootCard> {
        self.cards.get(self.selected_index)
    }

    pub fn selected_mut(&mut self) -> Option<&mut TootCard> {
        self.cards.get_mut(self.selected_index)
    }

    fn build(&self, payloads: Vec<TootPayload>, viewer: &Viewer) -> Vec<TootCard> {
        payloads
            .into_iter()
            .map(|p| {
                let mut card = TootCard::new(p, viewer, self.thread_hint);
                if let Some(old) = self
                    .cards
                    .iter()
                    .find(|c| c.payload().key() == card.payload().key())
                {
                    card.inherit_gate(old);
                }
                card
            })
            .collect()
    }

    pub fn append(&mut self, payloads: Vec<TootPayload>, cursor: Option<String>, viewer: &Viewer) {
        let cards = self.build(payloads, viewer);
        self.cards.extend(cards);
        self.cursor = cursor;
        self.loading = false;
    }

    /// Swaps in a fresh page. Content warnings the reader already opened
    /// stay open for toots that are still there.
    pub fn replace(&mut self, payloads: Vec<TootPayload>, cursor: Option<String>, viewer: &Viewer) {
        self.cards = self.build(payloads, viewer);
        self.cursor = cursor;
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.loading = false;
    }

    pub fn set_viewer(&mut self, viewer: &Viewer) {
        for card in &mut self.cards {
            card.set_viewer(viewer);
        }
    }

    /// Applies a successful mutation. Returns false when no card in this
    /// feed was affected.
    pub fn apply(&mut self, outcome: &Outcome, viewer: &Viewer) -> bool {
        let before = self.cards.len();
        let touched = match outcome {
            Outcome::Deleted { status_id } => {
                self.cards.retain(|c| !c.shows_status(status_id));
                self.cards.len() != before
            }
            Outcome::Muted { account_id } | Outcome::Blocked { account_id } => {
                self.cards.retain(|c| !c.involves_account(account_id));
                self.cards.len() != before
            }
            _ => {
                let mut touched = false;
                for card in &mut self.cards {
                    touched |= card.apply(outcome, viewer);
                }
                touched
            }
        };
        if self.selected_index >= self.cards.len() {
            self.selected_index = self.cards.len().saturating_sub(1);
        }
        touched
    }

    pub fn near_bottom(&self) -> bool {
        if self.cards.is_empty() {
            return false;
        }
        self.selected_index + 3 >= self.cards.len() && self.cursor.is_some()
    }
}
