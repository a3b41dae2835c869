use chrono::{DateTime, Utc};

use super::entity::{Account, Attachment, NotificationType, Status, TootPayload};

/// Read-only snapshot of the signed-in account, handed to every toot box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub id: String,
    pub username: String,
}

impl Viewer {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Viewer {
            id: id.into(),
            username: username.into(),
        }
    }

    /// Usernames are compared as well as ids: ids from different
    /// instances can collide.
    pub fn owns(&self, account: &Account) -> bool {
        !self.id.is_empty() && self.id == account.id && self.username == account.username
    }
}

/// The line drawn above a toot explaining why it is in the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdditionalInfo {
    #[default]
    None,
    Reblog,
    Pinned,
    Favourite,
    Follow,
    Mention,
}

impl AdditionalInfo {
    pub fn label(self) -> Option<&'static str> {
        match self {
            AdditionalInfo::None => None,
            AdditionalInfo::Reblog => Some("转嘟了"),
            AdditionalInfo::Pinned => Some("置顶嘟文"),
            AdditionalInfo::Favourite => Some("收藏了"),
            AdditionalInfo::Follow => Some("开始关注你"),
            AdditionalInfo::Mention => Some("提及了"),
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            AdditionalInfo::Reblog => "⟳",
            AdditionalInfo::Pinned => "📌",
            AdditionalInfo::Favourite => "★",
            AdditionalInfo::Follow => "👤",
            AdditionalInfo::Mention => "@",
            AdditionalInfo::None => "",
        }
    }
}

impl From<NotificationType> for AdditionalInfo {
    fn from(kind: NotificationType) -> Self {
        match kind {
            NotificationType::Reblog => AdditionalInfo::Reblog,
            NotificationType::Favourite => AdditionalInfo::Favourite,
            NotificationType::Follow => AdditionalInfo::Follow,
            NotificationType::Mention => AdditionalInfo::Mention,
            NotificationType::Pinned => AdditionalInfo::Pinned,
            NotificationType::Unknown => AdditionalInfo::None,
        }
    }
}

/// Avatars for a toot. A boost shows the original author with the
/// booster's avatar tucked in the corner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Avatars {
    pub primary: Option<String>,
    pub overlay: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionBar {
    pub replies_count: u32,
    pub reblogs_count: u32,
    pub favourites_count: u32,
    pub reblogged: bool,
    pub favourited: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TootViewModel {
    pub display_account: Option<Account>,
    pub display_status: Option<Status>,
    /// Who boosted, pinned, favourited, followed or mentioned.
    pub actor: Option<Account>,
    pub is_notification_page: bool,
    pub additional_info: AdditionalInfo,
    pub content_hidden: bool,
    pub is_mine: bool,
    pub avatars: Avatars,
    pub show_thread_hint: bool,
}

/// Derives the view model for one toot box. Pure: the same inputs always
/// produce the same output.
pub fn normalize(
    payload: Option<&TootPayload>,
    viewer: &Viewer,
    thread_hint_enabled: bool,
) -> TootViewModel {
    let payload = match payload {
        Some(p) => p,
        None => return TootViewModel::default(),
    };

    let display_status = payload.display_status().cloned();

    let (is_notification_page, additional_info, actor) = match payload {
        TootPayload::Notification(n) => (true, n.kind.into(), Some(n.account.clone())),
        TootPayload::Status(s) => {
            let info = if s.reblog.is_some() {
                AdditionalInfo::Reblog
            } else if s.pinned {
                AdditionalInfo::Pinned
            } else {
                AdditionalInfo::None
            };
            (false, info, Some(s.account.clone()))
        }
    };

    let display_account = match (&display_status, payload) {
        (Some(status), _) => Some(status.account.clone()),
        (None, TootPayload::Notification(n)) => Some(n.account.clone()),
        (None, TootPayload::Status(_)) => None,
    };

    let avatars = match payload {
        TootPayload::Status(s) => match s.reblog.as_deref() {
            Some(original) => Avatars {
                primary: original.account.avatar.clone(),
                overlay: s.account.avatar.clone(),
            },
            None => Avatars {
                primary: s.account.avatar.clone(),
                overlay: None,
            },
        },
        TootPayload::Notification(_) => Avatars {
            primary: display_account.as_ref().and_then(|a| a.avatar.clone()),
            overlay: None,
        },
    };

    let is_mine = display_status
        .as_ref()
        .map(|s| viewer.owns(&s.account))
        .unwrap_or(false);

    let show_thread_hint = thread_hint_enabled
        && is_mine
        && display_status
            .as_ref()
            .and_then(|s| s.in_reply_to_account_id.as_deref())
            .map(|id| id == viewer.id)
            .unwrap_or(false);

    let content_hidden = display_status.as_ref().map(|s| s.sensitive).unwrap_or(false);

    TootViewModel {
        display_account,
        display_status,
        actor: actor.filter(|_| additional_info != AdditionalInfo::None),
        is_notification_page,
        additional_info,
        content_hidden,
        is_mine,
        avatars,
        show_thread_hint,
    }
}

impl TootViewModel {
    fn is_follow(&self) -> bool {
        self.additional_info == AdditionalInfo::Follow && self.is_notification_page
    }

    /// Status to render as a body, `None` for follow notifications.
    pub fn body(&self) -> Option<&Status> {
        if self.is_follow() {
            return None;
        }
        self.display_status.as_ref()
    }

    pub fn action_bar(&self) -> Option<ActionBar> {
        self.body().map(|s| ActionBar {
            replies_count: s.replies_count,
            reblogs_count: s.reblogs_count,
            favourites_count: s.favourites_count,
            reblogged: s.reblogged,
            favourited: s.favourited,
        })
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.body().and_then(|s| s.created_at)
    }

    pub fn relative_time(&self, now: DateTime<Utc>) -> Option<String> {
        self.created_at()
            .map(|at| crate::utils::time::relative_time_from(&at, now))
    }

    pub fn status_id(&self) -> Option<&str> {
        self.display_status.as_ref().map(|s| s.id.as_str())
    }

    pub fn url(&self) -> Option<&str> {
        self.display_status.as_ref().and_then(|s| s.url.as_deref())
    }

    pub fn pinned(&self) -> bool {
        self.display_status.as_ref().map(|s| s.pinned).unwrap_or(false)
    }

    pub fn sensitive(&self) -> bool {
        self.display_status.as_ref().map(|s| s.sensitive).unwrap_or(false)
    }

    pub fn media(&self) -> &[Attachment] {
        self.body()
            .map(|s| s.media_attachments.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::Notification;

    fn account(id: &str, username: &str) -> Account {
        Account {
            id: id.into(),
            username: username.into(),
            avatar: Some(format!("https://example.social/{}.png", username)),
            ..Default::default()
        }
    }

    fn status(id: &str, author: Account) -> Status {
        Status {
            id: id.into(),
            account: author,
            content: "<p>hi</p>".into(),
            ..Default::default()
        }
    }

    #[test]
    fn absent_payload_gives_empty_model() {
        let vm = normalize(None, &Viewer::default(), true);
        assert_eq!(vm, TootViewModel::default());
        assert!(vm.body().is_none());
        assert!(vm.action_bar().is_none());
    }

    #[test]
    fn follow_notification_has_no_body_icons_or_time() {
        let payload = TootPayload::Notification(Notification {
            id: "n1".into(),
            kind: NotificationType::Follow,
            account: account("a1", "u"),
            status: None,
            created_at: Some(Utc::now()),
        });
        let vm = normalize(Some(&payload), &Viewer::new("1", "bob"), true);
        assert!(vm.is_notification_page);
        assert_eq!(vm.additional_info, AdditionalInfo::Follow);
        assert!(vm.body().is_none());
        assert!(vm.action_bar().is_none());
        assert!(vm.relative_time(Utc::now()).is_none());
        assert_eq!(vm.display_account.as_ref().map(|a| a.id.as_str()), Some("a1"));
        assert_eq!(vm.actor.as_ref().map(|a| a.username.as_str()), Some("u"));
        assert!(!vm.is_mine);
    }

    #[test]
    fn reblog_resolves_to_inner_status() {
        let mut inner = status("s2", account("9", "alice"));
        inner.content = "hi".into();
        let mut outer = status("s1", account("3", "carol"));
        outer.reblog = Some(Box::new(inner));
        let payload = TootPayload::Status(outer);

        let vm = normalize(Some(&payload), &Viewer::new("1", "bob"), true);
        assert_eq!(vm.status_id(), Some("s2"));
        assert_eq!(vm.additional_info, AdditionalInfo::Reblog);
        assert_eq!(vm.actor.as_ref().map(|a| a.id.as_str()), Some("3"));
        assert_eq!(
            vm.avatars.primary.as_deref(),
            Some("https://example.social/alice.png")
        );
        assert_eq!(
            vm.avatars.overlay.as_deref(),
            Some("https://example.social/carol.png")
        );
    }

    #[test]
    fn pinned_status_is_flagged() {
        let mut s = status("s1", account("1", "bob"));
        s.pinned = true;
        let vm = normalize(Some(&TootPayload::Status(s)), &Viewer::new("1", "bob"), true);
        assert_eq!(vm.additional_info, AdditionalInfo::Pinned);
        assert!(vm.pinned());
        assert!(vm.avatars.overlay.is_none());
    }

    #[test]
    fn plain_status_has_no_actor() {
        let s = status("s1", account("3", "carol"));
        let vm = normalize(Some(&TootPayload::Status(s)), &Viewer::new("1", "bob"), true);
        assert_eq!(vm.additional_info, AdditionalInfo::None);
        assert!(vm.actor.is_none());
    }

    #[test]
    fn mention_notification_uses_inner_status() {
        let payload = TootPayload::Notification(Notification {
            id: "n2".into(),
            kind: NotificationType::Mention,
            account: account("5", "dave"),
            status: Some(status("s9", account("5", "dave"))),
            created_at: None,
        });
        let vm = normalize(Some(&payload), &Viewer::new("1", "bob"), true);
        assert_eq!(vm.additional_info, AdditionalInfo::Mention);
        assert_eq!(vm.status_id(), Some("s9"));
        assert!(vm.action_bar().is_some());
    }

    #[test]
    fn is_mine_requires_matching_username() {
        let viewer = Viewer::new("1", "bob");
        let mine = TootPayload::Status(status("s1", account("1", "bob")));
        let collision = TootPayload::Status(status("s2", account("1", "eve")));
        assert!(normalize(Some(&mine), &viewer, true).is_mine);
        assert!(!normalize(Some(&collision), &viewer, true).is_mine);
    }

    #[test]
    fn normalize_is_pure() {
        let mut s = status("s1", account("1", "bob"));
        s.sensitive = true;
        s.spoiler_text = "cw".into();
        let payload = TootPayload::Status(s);
        let viewer = Viewer::new("1", "bob");
        assert_eq!(
            normalize(Some(&payload), &viewer, true),
            normalize(Some(&payload), &viewer, true)
        );
    }

    #[test]
    fn thread_hint_only_for_self_replies() {
        let viewer = Viewer::new("1", "bob");
        let mut s = status("s1", account("1", "bob"));
        s.in_reply_to_account_id = Some("1".into());
        let payload = TootPayload::Status(s);
        assert!(normalize(Some(&payload), &viewer, true).show_thread_hint);
        assert!(!normalize(Some(&payload), &viewer, false).show_thread_hint);

        let mut other = status("s2", account("1", "bob"));
        other.in_reply_to_account_id = Some("4".into());
        assert!(!normalize(Some(&TootPayload::Status(other)), &viewer, true).show_thread_hint);
    }

    #[test]
    fn sensitive_status_starts_hidden() {
        let mut s = status("s1", account("3", "carol"));
        s.sensitive = true;
        let vm = normalize(Some(&TootPayload::Status(s)), &Viewer::default(), true);
        assert!(vm.content_hidden);
    }
}
