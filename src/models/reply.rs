use super::entity::{Mention, Status};
use super::toot::Viewer;

/// What the composer needs to answer a toot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyContext {
    pub reply_to_username: String,
    pub in_reply_to_id: String,
    pub in_reply_to_account_id: String,
    pub mentions: Vec<Mention>,
    pub spoiler_text: String,
    /// Whether the composer starts with its content warning switched on.
    pub cw: bool,
}

impl ReplyContext {
    fn seed(status: &Status, cw: bool) -> Self {
        ReplyContext {
            reply_to_username: status.account.username.clone(),
            in_reply_to_id: status.id.clone(),
            in_reply_to_account_id: status.account.id.clone(),
            mentions: status.mentions.clone(),
            spoiler_text: status.spoiler_text.clone(),
            cw,
        }
    }

    /// Replying directly: a toot behind a content warning gets a reply
    /// behind the same warning.
    pub fn for_reply(status: &Status) -> Self {
        Self::seed(status, !status.spoiler_text.trim().is_empty())
    }

    /// Opening the detail view: the composer there starts unarmed.
    pub fn for_detail(status: &Status) -> Self {
        Self::seed(status, false)
    }

    /// Initial composer text: the author and everyone mentioned, minus the
    /// viewer, each once.
    pub fn initial_text(&self, viewer: &Viewer) -> String {
        let mut handles: Vec<&str> = Vec::new();
        if !self.reply_to_username.is_empty() && self.reply_to_username != viewer.username {
            handles.push(&self.reply_to_username);
        }
        for mention in &self.mentions {
            let handle = if mention.acct.is_empty() {
                mention.username.as_str()
            } else {
                mention.acct.as_str()
            };
            if handle.is_empty() || mention.id == viewer.id || handles.contains(&handle) {
                continue;
            }
            handles.push(handle);
        }
        if handles.is_empty() {
            return String::new();
        }
        let mut text = handles
            .iter()
            .map(|h| format!("@{}", h))
            .collect::<Vec<_>>()
            .join(" ");
        text.push(' ');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::Account;

    fn status() -> Status {
        Status {
            id: "s1".into(),
            account: Account {
                id: "9".into(),
                username: "alice".into(),
                ..Default::default()
            },
            mentions: vec![
                Mention {
                    id: "1".into(),
                    username: "bob".into(),
                    acct: "bob".into(),
                    url: None,
                },
                Mention {
                    id: "4".into(),
                    username: "carol".into(),
                    acct: "carol@example.social".into(),
                    url: None,
                },
            ],
            spoiler_text: "spoilers".into(),
            ..Default::default()
        }
    }

    #[test]
    fn reply_arms_cw_when_spoiler_present() {
        let ctx = ReplyContext::for_reply(&status());
        assert!(ctx.cw);
        assert_eq!(ctx.reply_to_username, "alice");
        assert_eq!(ctx.in_reply_to_id, "s1");
        assert_eq!(ctx.in_reply_to_account_id, "9");
        assert_eq!(ctx.spoiler_text, "spoilers");
        assert_eq!(ctx.mentions.len(), 2);
    }

    #[test]
    fn reply_without_spoiler_is_unarmed() {
        let mut s = status();
        s.spoiler_text.clear();
        assert!(!ReplyContext::for_reply(&s).cw);
    }

    #[test]
    fn detail_never_arms_cw() {
        let ctx = ReplyContext::for_detail(&status());
        assert!(!ctx.cw);
        assert_eq!(ctx.spoiler_text, "spoilers");
    }

    #[test]
    fn initial_text_skips_viewer() {
        let ctx = ReplyContext::for_reply(&status());
        let viewer = Viewer::new("1", "bob");
        assert_eq!(ctx.initial_text(&viewer), "@alice @carol@example.social ");
    }

    #[test]
    fn replying_to_self_has_no_prefix() {
        let mut s = status();
        s.mentions.clear();
        let viewer = Viewer::new("9", "alice");
        assert_eq!(ReplyContext::for_reply(&s).initial_text(&viewer), "");
    }
}
