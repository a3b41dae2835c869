use crate::dispatch::{Intent, IntentKind, Outcome};
use crate::models::entity::{Account, Context, Status, TootPayload};
use crate::models::menu::MenuAction;
use crate::models::toot::Viewer;
use crate::store::EmojiMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Home,
    Notifications,
    Profile,
}

#[derive(Debug, Clone)]
pub enum Action {
    Quit,

    // Navigation
    SelectNext,
    SelectPrev,
    ScrollToTop,
    ScrollToBottom,
    OpenDetail,
    GoBack,
    SwitchTab(usize),
    ViewAuthorProfile,

    // Auth
    SubmitLogin {
        instance_url: String,
        access_token: String,
    },
    LoginSuccess(Viewer),
    LoginFailed(String),
    Logout,

    // Feeds
    Refresh,
    LoadMore,
    FeedLoaded {
        feed: FeedKind,
        payloads: Vec<TootPayload>,
        cursor: Option<String>,
        append: bool,
    },
    EmojisLoaded(EmojiMap),

    // Detail
    ContextLoaded {
        status_id: String,
        context: Context,
    },

    // Profile
    LoadProfile(String),
    ProfileLoaded {
        account: Account,
        pinned: Vec<TootPayload>,
        recent: Vec<TootPayload>,
        cursor: Option<String>,
    },

    // Composer
    ReplyToSelected,
    OpenComposer,
    CloseComposer,
    SubmitToot {
        text: String,
        spoiler_text: Option<String>,
        in_reply_to_id: Option<String>,
    },
    TootPosted(Status),
    PostFailed(String),

    // Toot box
    ToggleContentWarning,
    Interact(IntentKind),
    IntentFinished {
        intent: Intent,
        result: Result<Outcome, String>,
    },
    ShowMenu,
    CloseMenu,
    MenuSelected(MenuAction),
    CopyLink,
    OpenAvatar,
    OpenMedia,

    // Errors and notices
    Notice(String),
    /// A page or context load failed.
    Error(String),
}
