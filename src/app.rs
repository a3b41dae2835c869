use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use crossterm::event::Event;
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::action::{Action, FeedKind};
use crate::api::auth;
use crate::api::client::{MastodonClient, NewStatus};
use crate::api::session;
use crate::config::AppConfig;
use crate::dispatch::{self, InFlight, Intent, IntentKind, Outcome};
use crate::event::{self, EventHandler};
use crate::models::card::TootCard;
use crate::models::entity::TootPayload;
use crate::models::feed::FeedState;
use crate::models::menu::{MenuAction, SHARE_PLACEHOLDER};
use crate::models::profile::ProfileViewModel;
use crate::models::reply::ReplyContext;
use crate::models::thread::ThreadViewModel;
use crate::models::toot::Viewer;
use crate::store::{self, EmojiMap, Store, EMOJI_KEY};
use crate::tui::Tui;
use crate::ui::composer::Composer;
use crate::ui::login::LoginForm;
use crate::ui::menu::MenuPopup;
use crate::ui::toot_box::TootBoxContext;
use crate::ui::Component;
use crate::utils::clipboard;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Login,
    Home,
    Notifications,
    Detail,
    Profile,
}

/// An opened toot and the reply context its composer starts from.
struct DetailPage {
    thread: ThreadViewModel,
    reply: Option<ReplyContext>,
}

pub struct App {
    should_quit: bool,
    screen: Screen,
    screen_stack: Vec<Screen>,
    active_tab: usize,
    config: AppConfig,
    client: Arc<MastodonClient>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    viewer: Option<Viewer>,

    // State
    home: FeedState,
    notifications: FeedState,
    unread_notifications: bool,
    /// One page per `Screen::Detail` on the stack, innermost last.
    details: Vec<DetailPage>,
    profile: Option<ProfileViewModel>,
    profile_feed: FeedState,
    emojis: EmojiMap,
    in_flight: InFlight,
    error_message: Option<String>,
    notice: Option<String>,

    // Active data-loading task (aborted when a new load starts or on navigation)
    active_load: Option<JoinHandle<()>>,

    // Modals
    login_form: LoginForm,
    composer: Composer,
    show_composer: bool,
    menu: Option<MenuPopup>,
}

impl App {
    pub fn new(config: AppConfig, client: Arc<MastodonClient>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let default_instance = session::last_instance().or_else(|| Some(config.instance_url.clone()));
        let thread_hint = config.show_thread_hint;
        let char_limit = config.char_limit;

        App {
            should_quit: false,
            screen: Screen::Login,
            screen_stack: Vec::new(),
            active_tab: 0,
            config,
            client,
            action_tx,
            action_rx,
            viewer: None,
            home: FeedState::new(thread_hint),
            notifications: FeedState::new(thread_hint),
            unread_notifications: false,
            details: Vec::new(),
            profile: None,
            profile_feed: FeedState::new(thread_hint),
            emojis: EmojiMap::new(),
            in_flight: InFlight::new(),
            error_message: None,
            notice: None,
            active_load: None,
            login_form: LoginForm::new(default_instance),
            composer: Composer::new(char_limit),
            show_composer: false,
            menu: None,
        }
    }

    pub async fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        match auth::try_restore_session(&self.client).await {
            auth::AuthResult::Success(viewer) => self.dispatch(Action::LoginSuccess(viewer)),
            auth::AuthResult::NeedsLogin => self.screen = Screen::Login,
        }

        let mut events = EventHandler::new(Duration::from_millis(250));

        loop {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                Some(event) = events.next() => {
                    self.handle_event(event);
                }
                Some(action) = self.action_rx.recv() => {
                    self.update(action).await;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        let key = match event {
            Event::Key(key) => key,
            _ => return,
        };

        // Any key dismisses the last message
        self.error_message = None;
        self.notice = None;

        // Modals take the keyboard first
        if let Some(menu) = self.menu.as_mut() {
            if let Some(action) = menu.handle_key_event(key) {
                self.dispatch(action);
            }
            return;
        }

        if self.show_composer {
            if let Some(action) = self.composer.handle_key_event(key) {
                self.dispatch(action);
            }
            return;
        }

        if self.screen == Screen::Login {
            if let Some(action) = self.login_form.handle_key_event(key) {
                self.dispatch(action);
            }
            return;
        }

        if let Some(action) = event::key_to_action(key) {
            self.dispatch(action);
        }
    }

    fn dispatch(&self, action: Action) {
        let _ = self.action_tx.send(action);
    }

    fn spawn_load(&mut self, future: impl std::future::Future<Output = ()> + Send + 'static) {
        self.cancel_load();
        self.active_load = Some(tokio::spawn(future));
    }

    fn cancel_load(&mut self) {
        if let Some(handle) = self.active_load.take() {
            handle.abort();
            self.clear_loading();
        }
    }

    fn clear_loading(&mut self) {
        self.home.loading = false;
        self.notifications.loading = false;
        self.profile_feed.loading = false;
    }

    fn feed(&self, kind: FeedKind) -> &FeedState {
        match kind {
            FeedKind::Home => &self.home,
            FeedKind::Notifications => &self.notifications,
            FeedKind::Profile => &self.profile_feed,
        }
    }

    fn feed_mut(&mut self, kind: FeedKind) -> &mut FeedState {
        match kind {
            FeedKind::Home => &mut self.home,
            FeedKind::Notifications => &mut self.notifications,
            FeedKind::Profile => &mut self.profile_feed,
        }
    }

    /// The list feed behind the current screen, if it is one.
    fn screen_feed(&self) -> Option<FeedKind> {
        match self.screen {
            Screen::Home => Some(FeedKind::Home),
            Screen::Notifications => Some(FeedKind::Notifications),
            Screen::Profile => Some(FeedKind::Profile),
            Screen::Login | Screen::Detail => None,
        }
    }

    fn detail_thread_mut(&mut self) -> Option<&mut ThreadViewModel> {
        match self.screen {
            Screen::Detail => self.details.last_mut().map(|p| &mut p.thread),
            _ => None,
        }
    }

    /// The toot box the keyboard is pointing at.
    fn current_card(&self) -> Option<&TootCard> {
        match self.screen {
            Screen::Detail => self.details.last().and_then(|p| p.thread.selected()),
            _ => self.screen_feed().and_then(|kind| self.feed(kind).selected()),
        }
    }

    fn current_card_mut(&mut self) -> Option<&mut TootCard> {
        match self.screen {
            Screen::Detail => self.details.last_mut().and_then(|p| p.thread.selected_mut()),
            _ => match self.screen_feed() {
                Some(kind) => self.feed_mut(kind).selected_mut(),
                None => None,
            },
        }
    }

    fn load_feed(&mut self, kind: FeedKind, append: bool) {
        let limit = self.config.timeline_limit;
        let account_id = self.profile.as_ref().map(|p| p.id.clone());
        let feed = self.feed_mut(kind);
        if append && (feed.loading || feed.cursor.is_none()) {
            return;
        }
        let cursor = if append { feed.cursor.clone() } else { None };
        feed.loading = true;

        let client = self.client.clone();
        let tx = self.action_tx.clone();
        self.spawn_load(async move {
            let page = match kind {
                FeedKind::Home => client.home_timeline(cursor, limit).await,
                FeedKind::Notifications => client.notifications(cursor, limit).await,
                FeedKind::Profile => match account_id {
                    Some(id) => client.account_statuses(&id, false, cursor, limit).await,
                    None => return,
                },
            };
            match page {
                Ok((payloads, cursor)) => {
                    let _ = tx.send(Action::FeedLoaded {
                        feed: kind,
                        payloads,
                        cursor,
                        append,
                    });
                }
                Err(e) => {
                    let _ = tx.send(Action::Error(e.to_string()));
                }
            }
        });
    }

    fn load_context(&mut self) {
        let status_id = match self
            .details
            .last()
            .and_then(|p| p.thread.focal_status_id())
        {
            Some(id) => id.to_string(),
            None => return,
        };
        let client = self.client.clone();
        let tx = self.action_tx.clone();
        self.spawn_load(async move {
            match client.status_context(&status_id).await {
                Ok(context) => {
                    let _ = tx.send(Action::ContextLoaded { status_id, context });
                }
                Err(e) => {
                    let _ = tx.send(Action::Error(e.to_string()));
                }
            }
        });
    }

    /// Custom emoji come from the local store when cached, otherwise from
    /// the instance (and are cached for next time).
    fn load_emojis(&self) {
        let client = self.client.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let store = Store::open();
            match store.fetch::<EmojiMap>(EMOJI_KEY) {
                Ok(Some(map)) => {
                    debug!("Loaded {} cached emoji", map.len());
                    let _ = tx.send(Action::EmojisLoaded(map));
                    return;
                }
                Ok(None) => {}
                Err(e) => warn!("Emoji cache unreadable: {}", e),
            }
            match client.custom_emojis().await {
                Ok(list) => {
                    let map = store::emoji_map(&list);
                    if let Err(e) = store.save(EMOJI_KEY, &map) {
                        warn!("Failed to cache emoji: {}", e);
                    }
                    let _ = tx.send(Action::EmojisLoaded(map));
                }
                Err(e) => warn!("Failed to fetch custom emoji: {}", e),
            }
        });
    }

    fn open_detail(&mut self, card: &TootCard) {
        let viewer = match self.viewer.as_ref() {
            Some(v) => v,
            None => return,
        };
        let status = match card.status() {
            Some(s) => s,
            None => return,
        };
        let reply = Some(ReplyContext::for_detail(status));
        let mut thread = ThreadViewModel::new(card.payload().clone(), viewer);
        thread.focal.inherit_gate(card);

        self.screen_stack.push(self.screen);
        self.screen = Screen::Detail;
        self.details.push(DetailPage { thread, reply });
        self.load_context();
    }

    fn open_composer(&mut self, reply: Option<ReplyContext>) {
        self.composer = Composer::new(self.config.char_limit);
        if let (Some(reply), Some(viewer)) = (reply, self.viewer.as_ref()) {
            self.composer.open_reply(reply, viewer);
        }
        self.show_composer = true;
    }

    fn open_url(&mut self, url: Option<String>, what: &str) {
        match url {
            Some(url) => {
                if let Err(e) = open::that(&url) {
                    self.error_message = Some(format!("Could not open {}: {}", what, e));
                }
            }
            None => self.notice = Some(format!("No {} to open", what)),
        }
    }

    /// A mutation came back. Failures leave every toot as it was and do not
    /// touch page loads that may still be running.
    fn finish_intent(&mut self, intent: &Intent, result: Result<Outcome, String>) {
        self.in_flight.finish(intent);
        match result {
            Ok(outcome) => self.apply_outcome(&outcome),
            Err(msg) => {
                error!("{:?} on {} failed: {}", intent.kind(), intent.status_id(), msg);
                self.error_message = Some(msg);
            }
        }
    }

    fn apply_outcome(&mut self, outcome: &Outcome) {
        let viewer = match self.viewer.clone() {
            Some(v) => v,
            None => return,
        };

        let mut touched = false;
        for feed in [&mut self.home, &mut self.notifications, &mut self.profile_feed] {
            touched |= feed.apply(outcome, &viewer);
        }

        let mut focal_gone = false;
        let innermost = self.details.len().saturating_sub(1);
        for (i, page) in self.details.iter_mut().enumerate() {
            if i == innermost {
                focal_gone = page.thread.focal_removed(outcome);
            }
            touched |= page.thread.apply(outcome, &viewer);
        }

        if !touched {
            // The toot box that asked for this is gone
            debug!("No toot box left for {:?}", outcome);
            return;
        }

        match outcome {
            Outcome::Deleted { .. } => self.notice = Some("已删除".to_string()),
            Outcome::Pinned { pinned, .. } => {
                self.notice = Some(if *pinned { "已置顶" } else { "已取消置顶" }.to_string())
            }
            Outcome::Muted { .. } => self.notice = Some("已隐藏".to_string()),
            Outcome::Blocked { .. } => self.notice = Some("已屏蔽".to_string()),
            Outcome::Favourited { .. } | Outcome::Reblogged { .. } => {}
        }

        if focal_gone && self.screen == Screen::Detail {
            self.dispatch(Action::GoBack);
        }
    }

    async fn update(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.cancel_load();
                self.should_quit = true;
            }

            Action::SubmitLogin {
                instance_url,
                access_token,
            } => {
                let client = self.client.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match auth::login_with_token(&client, &instance_url, &access_token).await {
                        Ok(viewer) => {
                            let _ = tx.send(Action::LoginSuccess(viewer));
                        }
                        Err(e) => {
                            let _ = tx.send(Action::LoginFailed(e.to_string()));
                        }
                    }
                });
            }

            Action::LoginSuccess(viewer) => {
                info!("Signed in as {}", viewer.username);
                self.home.set_viewer(&viewer);
                self.notifications.set_viewer(&viewer);
                self.profile_feed.set_viewer(&viewer);
                self.viewer = Some(viewer);
                self.screen = Screen::Home;
                self.screen_stack.clear();
                self.active_tab = 0;
                self.load_emojis();
                self.load_feed(FeedKind::Home, false);
            }

            Action::LoginFailed(msg) => {
                warn!("Login failed: {}", msg);
                self.login_form.set_error(msg);
            }

            Action::Logout => {
                self.cancel_load();
                if let Err(e) = auth::logout(&self.client).await {
                    warn!("Logout cleanup failed: {}", e);
                }
                let thread_hint = self.config.show_thread_hint;
                self.viewer = None;
                self.screen = Screen::Login;
                self.screen_stack.clear();
                self.details.clear();
                self.home = FeedState::new(thread_hint);
                self.notifications = FeedState::new(thread_hint);
                self.profile_feed = FeedState::new(thread_hint);
                self.profile = None;
                self.unread_notifications = false;
                self.login_form = LoginForm::new(Some(self.config.instance_url.clone()));
            }

            Action::Refresh => match self.screen {
                Screen::Home => self.load_feed(FeedKind::Home, false),
                Screen::Notifications => self.load_feed(FeedKind::Notifications, false),
                Screen::Profile => {
                    if let Some(id) = self.profile.as_ref().map(|p| p.id.clone()) {
                        self.dispatch(Action::LoadProfile(id));
                    }
                }
                Screen::Detail => self.load_context(),
                Screen::Login => {}
            },

            Action::LoadMore => {
                if let Some(kind) = self.screen_feed() {
                    self.load_feed(kind, true);
                }
            }

            Action::FeedLoaded {
                feed,
                payloads,
                cursor,
                append,
            } => {
                let viewer = match self.viewer.clone() {
                    Some(v) => v,
                    None => return,
                };
                if feed == FeedKind::Notifications && !append && self.screen != Screen::Notifications {
                    let newest = payloads.first().map(|p| p.key().to_string());
                    let seen = self.notifications.cards.first().map(|c| c.payload().key().to_string());
                    self.unread_notifications |= newest.is_some() && newest != seen;
                }
                let state = self.feed_mut(feed);
                if append {
                    state.append(payloads, cursor, &viewer);
                } else {
                    state.replace(payloads, cursor, &viewer);
                }
            }

            Action::EmojisLoaded(map) => {
                self.emojis = map;
            }

            Action::SelectNext => {
                if let Some(thread) = self.detail_thread_mut() {
                    thread.select_next();
                } else if let Some(kind) = self.screen_feed() {
                    let feed = self.feed_mut(kind);
                    feed.select_next();
                    if feed.near_bottom() {
                        self.dispatch(Action::LoadMore);
                    }
                }
            }

            Action::SelectPrev => {
                if let Some(thread) = self.detail_thread_mut() {
                    thread.select_prev();
                } else if let Some(kind) = self.screen_feed() {
                    self.feed_mut(kind).select_prev();
                }
            }

            Action::ScrollToTop => {
                if let Some(thread) = self.detail_thread_mut() {
                    thread.select_first();
                } else if let Some(kind) = self.screen_feed() {
                    self.feed_mut(kind).select_first();
                }
            }

            Action::ScrollToBottom => {
                if let Some(thread) = self.detail_thread_mut() {
                    thread.select_last();
                } else if let Some(kind) = self.screen_feed() {
                    self.feed_mut(kind).select_last();
                }
            }

            Action::OpenDetail => {
                let on_focal = self
                    .details
                    .last()
                    .map(|p| p.thread.is_focal_selected())
                    .unwrap_or(false);
                if self.screen == Screen::Detail && on_focal {
                    return;
                }
                let card = match self.current_card() {
                    Some(c) => c.clone(),
                    None => return,
                };
                if card.status().is_some() {
                    self.open_detail(&card);
                } else if let Some(actor) = card.view().actor.as_ref() {
                    // Follow notifications open the follower's profile
                    self.screen_stack.push(self.screen);
                    self.dispatch(Action::LoadProfile(actor.id.clone()));
                }
            }

            Action::ContextLoaded { status_id, context } => {
                let viewer = match self.viewer.clone() {
                    Some(v) => v,
                    None => return,
                };
                if let Some(page) = self.details.last_mut() {
                    if page.thread.focal_status_id() == Some(status_id.as_str()) {
                        page.thread.set_context(context, &viewer);
                    }
                }
            }

            Action::GoBack => {
                self.cancel_load();
                if let Some(prev) = self.screen_stack.pop() {
                    if self.screen == Screen::Detail {
                        self.details.pop();
                    }
                    self.screen = prev;
                    if self.screen == Screen::Detail
                        && self.details.last().map(|p| !p.thread.context_loaded).unwrap_or(false)
                    {
                        self.load_context();
                    }
                }
            }

            Action::SwitchTab(idx) => {
                self.cancel_load();
                self.screen_stack.clear();
                self.details.clear();
                self.active_tab = idx;
                match idx {
                    0 => {
                        self.screen = Screen::Home;
                        if self.home.cards.is_empty() {
                            self.load_feed(FeedKind::Home, false);
                        }
                    }
                    1 => {
                        self.screen = Screen::Notifications;
                        self.unread_notifications = false;
                        if self.notifications.cards.is_empty() {
                            self.load_feed(FeedKind::Notifications, false);
                        }
                    }
                    2 => {
                        if let Some(id) = self.viewer.as_ref().map(|v| v.id.clone()) {
                            self.dispatch(Action::LoadProfile(id));
                        }
                    }
                    _ => {}
                }
            }

            Action::ViewAuthorProfile => {
                let account_id = self.current_card().and_then(|c| {
                    let view = c.view();
                    view.display_account
                        .as_ref()
                        .or(view.actor.as_ref())
                        .map(|a| a.id.clone())
                });
                if let Some(id) = account_id {
                    self.screen_stack.push(self.screen);
                    self.dispatch(Action::LoadProfile(id));
                }
            }

            Action::LoadProfile(account_id) => {
                self.screen = Screen::Profile;
                self.profile = None;
                self.profile_feed = FeedState::new(self.config.show_thread_hint);
                self.profile_feed.loading = true;
                let limit = self.config.timeline_limit;
                let client = self.client.clone();
                let tx = self.action_tx.clone();
                self.spawn_load(async move {
                    let loaded = async {
                        let account = client.account(&account_id).await?;
                        let (pinned, _) = client.account_statuses(&account_id, true, None, limit).await?;
                        let (recent, cursor) =
                            client.account_statuses(&account_id, false, None, limit).await?;
                        Ok::<_, crate::api::ApiError>(Action::ProfileLoaded {
                            account,
                            pinned,
                            recent,
                            cursor,
                        })
                    }
                    .await;
                    let _ = tx.send(loaded.unwrap_or_else(|e| Action::Error(e.to_string())));
                });
            }

            Action::ProfileLoaded {
                account,
                pinned,
                recent,
                cursor,
            } => {
                let viewer = match self.viewer.clone() {
                    Some(v) => v,
                    None => return,
                };
                self.profile = Some(ProfileViewModel::from_account(&account));
                let payloads = merge_pinned(pinned, recent);
                self.profile_feed.replace(payloads, cursor, &viewer);
            }

            Action::ReplyToSelected => {
                let card = match self.current_card() {
                    Some(c) => c.clone(),
                    None => return,
                };
                let reply = match card.status() {
                    Some(status) => ReplyContext::for_reply(status),
                    None => return,
                };
                if self.screen != Screen::Detail {
                    self.open_detail(&card);
                }
                self.open_composer(Some(reply));
            }

            Action::OpenComposer => {
                let reply = match self.screen {
                    Screen::Detail => self.details.last().and_then(|p| p.reply.clone()),
                    _ => None,
                };
                self.open_composer(reply);
            }

            Action::CloseComposer => {
                self.show_composer = false;
            }

            Action::SubmitToot {
                text,
                spoiler_text,
                in_reply_to_id,
            } => {
                self.show_composer = false;
                let new_status = NewStatus {
                    status: text,
                    sensitive: spoiler_text.is_some(),
                    spoiler_text,
                    in_reply_to_id,
                };
                let client = self.client.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match client.post_status(&new_status).await {
                        Ok(status) => {
                            let _ = tx.send(Action::TootPosted(status));
                        }
                        Err(e) => {
                            let _ = tx.send(Action::PostFailed(e.to_string()));
                        }
                    }
                });
            }

            Action::PostFailed(msg) => {
                error!("Posting failed: {}", msg);
                self.error_message = Some(msg);
            }

            Action::TootPosted(status) => {
                info!("Toot {} posted", status.id);
                self.notice = Some("嘟文已发送".to_string());
                match self.screen {
                    Screen::Detail => self.load_context(),
                    Screen::Home => self.load_feed(FeedKind::Home, false),
                    _ => {}
                }
            }

            Action::ToggleContentWarning => {
                if let Some(card) = self.current_card_mut() {
                    card.toggle_content_warning();
                }
            }

            Action::Interact(kind) => {
                let intent = match self.current_card().and_then(|c| c.intent(kind)) {
                    Some(i) => i,
                    None => {
                        debug!("{:?} not available on this toot", kind);
                        return;
                    }
                };
                if !self.in_flight.try_begin(&intent) {
                    debug!("{:?} on {} already pending", kind, intent.status_id());
                    return;
                }
                let client = self.client.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let result = dispatch::dispatch(&*client, intent.clone())
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(Action::IntentFinished { intent, result });
                });
            }

            Action::IntentFinished { intent, result } => self.finish_intent(&intent, result),

            Action::ShowMenu => {
                let view = match self.current_card() {
                    Some(c) if c.status().is_some() => c.view(),
                    _ => return,
                };
                self.menu = Some(MenuPopup::new(view.is_mine, view.pinned()));
            }

            Action::CloseMenu => {
                self.menu = None;
            }

            Action::MenuSelected(item) => {
                self.menu = None;
                match item {
                    MenuAction::Share => self.dispatch(Action::Notice(SHARE_PLACEHOLDER.to_string())),
                    MenuAction::CopyLink => self.dispatch(Action::CopyLink),
                    MenuAction::Delete => self.dispatch(Action::Interact(IntentKind::Delete)),
                    MenuAction::TogglePin => self.dispatch(Action::Interact(IntentKind::TogglePin)),
                    MenuAction::MuteAccount => self.dispatch(Action::Interact(IntentKind::Mute)),
                    MenuAction::BlockAccount => self.dispatch(Action::Interact(IntentKind::Block)),
                }
            }

            Action::CopyLink => {
                let url = self
                    .current_card()
                    .and_then(|c| c.view().url())
                    .map(str::to_string);
                match url {
                    Some(url) => match clipboard::set_string(&url) {
                        Ok(()) => self.notice = Some("链接已复制".to_string()),
                        Err(e) => self.error_message = Some(format!("Clipboard: {}", e)),
                    },
                    None => self.notice = Some("No link for this toot".to_string()),
                }
            }

            Action::OpenAvatar => {
                let url = match self.screen {
                    Screen::Profile => self.profile.as_ref().and_then(|p| p.avatar.clone()),
                    _ => self.current_card().and_then(|c| c.view().avatars.primary.clone()),
                };
                self.open_url(url, "avatar");
            }

            Action::OpenMedia => {
                let card = match self.current_card() {
                    Some(c) => c,
                    None => return,
                };
                if card.gate().is_hidden() {
                    self.notice = Some("Content warning: press c first".to_string());
                    return;
                }
                let url = card.view().media().first().and_then(|m| m.url.clone());
                self.open_url(url, "media");
            }

            Action::Notice(msg) => {
                self.notice = Some(msg);
            }

            Action::Error(msg) => {
                error!("Error: {}", msg);
                self.clear_loading();
                self.error_message = Some(msg);
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        crate::ui::tabs::draw_tabs(frame, chunks[0], self.active_tab, self.unread_notifications);

        let ctx = TootBoxContext {
            emojis: &self.emojis,
            now: Utc::now(),
            in_flight: &self.in_flight,
        };

        match self.screen {
            Screen::Login => {
                self.login_form.draw(frame, chunks[1]);
            }
            Screen::Home => {
                crate::ui::timeline::draw_feed(
                    frame,
                    chunks[1],
                    &self.home,
                    &ctx,
                    "No toots yet. Press R to refresh.",
                );
            }
            Screen::Notifications => {
                crate::ui::timeline::draw_feed(
                    frame,
                    chunks[1],
                    &self.notifications,
                    &ctx,
                    "No notifications.",
                );
            }
            Screen::Detail => {
                crate::ui::thread::draw_thread(
                    frame,
                    chunks[1],
                    self.details.last().map(|p| &p.thread),
                    &ctx,
                );
            }
            Screen::Profile => {
                crate::ui::profile::draw_profile(
                    frame,
                    chunks[1],
                    self.profile.as_ref(),
                    &self.profile_feed,
                    &ctx,
                );
            }
        }

        crate::ui::statusbar::draw_statusbar(
            frame,
            chunks[2],
            &self.screen,
            self.show_composer || self.menu.is_some(),
            self.error_message.as_deref(),
            self.notice.as_deref(),
        );

        if self.show_composer {
            self.composer.draw(frame, area);
        }

        if let Some(menu) = self.menu.as_ref() {
            menu.draw(frame, area);
        }
    }
}

/// Pinned toots first, marked as pinned, then the rest without repeats.
fn merge_pinned(pinned: Vec<TootPayload>, recent: Vec<TootPayload>) -> Vec<TootPayload> {
    let mut out: Vec<TootPayload> = pinned
        .into_iter()
        .map(|mut p| {
            if let TootPayload::Status(s) = &mut p {
                s.pinned = true;
            }
            p
        })
        .collect();
    for p in recent {
        if !out.iter().any(|q| q.key() == p.key()) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::{Account, Context, Status};
    use crate::models::toot::AdditionalInfo;

    fn status(id: &str) -> TootPayload {
        TootPayload::Status(Status {
            id: id.into(),
            ..Default::default()
        })
    }

    #[test]
    fn pinned_toots_lead_and_are_not_repeated() {
        let merged = merge_pinned(vec![status("3")], vec![status("5"), status("3"), status("1")]);
        let keys: Vec<&str> = merged.iter().map(|p| p.key()).collect();
        assert_eq!(keys, vec!["3", "5", "1"]);

        let viewer = Viewer::new("1", "bob");
        let card = TootCard::new(merged[0].clone(), &viewer, false);
        assert_eq!(card.view().additional_info, AdditionalInfo::Pinned);
    }

    fn alice_status(id: &str) -> Status {
        Status {
            id: id.into(),
            account: Account {
                id: "9".into(),
                username: "alice".into(),
                acct: "alice".into(),
                ..Default::default()
            },
            favourites_count: 2,
            ..Default::default()
        }
    }

    fn signed_in_app() -> App {
        let mut app = App::new(AppConfig::default(), Arc::new(MastodonClient::new()));
        let viewer = Viewer::new("1", "bob");
        app.home.replace(
            vec![TootPayload::Status(alice_status("s1"))],
            None,
            &viewer,
        );
        app.viewer = Some(viewer);
        app.screen = Screen::Home;
        app
    }

    fn favourites(app: &App) -> u32 {
        app.home.cards[0]
            .view()
            .action_bar()
            .map(|bar| bar.favourites_count)
            .unwrap_or_default()
    }

    #[test]
    fn failed_mutation_unlocks_and_leaves_toot_alone() {
        let mut app = signed_in_app();
        app.home.loading = true;
        let intent = Intent::Favourite {
            status_id: "s1".into(),
            want: true,
        };
        assert!(app.in_flight.try_begin(&intent));

        app.finish_intent(&intent, Err("boom".into()));

        assert!(!app.in_flight.is_pending("s1", IntentKind::Favourite));
        assert_eq!(favourites(&app), 2);
        assert_eq!(app.error_message.as_deref(), Some("boom"));
        // A page load that is still running keeps its spinner
        assert!(app.home.loading);
    }

    #[test]
    fn finished_mutation_updates_the_toot() {
        let mut app = signed_in_app();
        let intent = Intent::Favourite {
            status_id: "s1".into(),
            want: true,
        };
        assert!(app.in_flight.try_begin(&intent));

        app.finish_intent(
            &intent,
            Ok(Outcome::Favourited {
                status_id: "s1".into(),
                favourited: true,
            }),
        );

        assert!(!app.in_flight.is_pending("s1", IntentKind::Favourite));
        assert_eq!(favourites(&app), 3);
        assert!(app.error_message.is_none());
    }

    #[test]
    fn late_completion_without_a_toot_is_dropped() {
        let mut app = signed_in_app();
        let intent = Intent::Delete {
            status_id: "gone".into(),
        };
        assert!(app.in_flight.try_begin(&intent));

        app.finish_intent(
            &intent,
            Ok(Outcome::Deleted {
                status_id: "gone".into(),
            }),
        );

        assert!(!app.in_flight.is_pending("gone", IntentKind::Delete));
        assert_eq!(app.home.cards.len(), 1);
        assert!(app.notice.is_none());
    }

    #[tokio::test]
    async fn failed_post_keeps_running_loads() {
        let mut app = signed_in_app();
        app.home.loading = true;
        app.update(Action::PostFailed("422".into())).await;
        assert!(app.home.loading);
        assert_eq!(app.error_message.as_deref(), Some("422"));
    }

    #[tokio::test]
    async fn replies_in_detail_can_be_selected_and_revealed() {
        let mut app = signed_in_app();
        let viewer = Viewer::new("1", "bob");
        let mut thread = ThreadViewModel::new(TootPayload::Status(alice_status("s1")), &viewer);
        thread.set_context(
            Context {
                ancestors: vec![],
                descendants: vec![Status {
                    sensitive: true,
                    spoiler_text: "spoilers".into(),
                    ..alice_status("s2")
                }],
            },
            &viewer,
        );
        app.details.push(DetailPage {
            thread,
            reply: None,
        });
        app.screen_stack.push(Screen::Home);
        app.screen = Screen::Detail;

        app.update(Action::SelectNext).await;
        app.update(Action::ToggleContentWarning).await;

        let card = app.current_card().map(|c| (c.payload().key().to_string(), c.gate().body_visible()));
        assert_eq!(card, Some(("s2".to_string(), true)));
        // The focal toot stays behind its own gate
        assert!(!app.details[0].thread.focal.gate().is_active());
    }
}
