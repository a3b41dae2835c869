use super::entity::Account;
use crate::utils::text::html_to_text;

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileViewModel {
    pub id: String,
    pub acct: String,
    pub display_name: String,
    pub note: String,
    pub avatar: Option<String>,
    pub followers_count: u64,
    pub following_count: u64,
    pub statuses_count: u64,
}

impl ProfileViewModel {
    pub fn from_account(account: &Account) -> Self {
        ProfileViewModel {
            id: account.id.clone(),
            acct: if account.acct.is_empty() {
                account.username.clone()
            } else {
                account.acct.clone()
            },
            display_name: account.name().to_string(),
            note: html_to_text(&account.note),
            avatar: account.avatar.clone(),
            followers_count: account.followers_count,
            following_count: account.following_count,
            statuses_count: account.statuses_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_is_flattened() {
        let account = Account {
            id: "1".into(),
            username: "bob".into(),
            note: "<p>hello &amp; welcome</p>".into(),
            followers_count: 3,
            ..Default::default()
        };
        let profile = ProfileViewModel::from_account(&account);
        assert_eq!(profile.acct, "bob");
        assert_eq!(profile.display_name, "bob");
        assert_eq!(profile.note, "hello & welcome");
        assert_eq!(profile.followers_count, 3);
    }
}
