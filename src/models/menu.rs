#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Share,
    CopyLink,
    Delete,
    TogglePin,
    MuteAccount,
    BlockAccount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub icon: &'static str,
    pub action: MenuAction,
}

pub const SHARE_PLACEHOLDER: &str = "分享功能正在实现哦～";

/// Context menu for a toot. Own toots can be deleted and pinned; other
/// people's toots offer muting and blocking their author instead.
pub fn build_menu(is_mine: bool, pinned: bool) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem {
            label: "分享",
            icon: "⇪",
            action: MenuAction::Share,
        },
        MenuItem {
            label: "复制链接",
            icon: "🔗",
            action: MenuAction::CopyLink,
        },
    ];

    if is_mine {
        items.push(MenuItem {
            label: "删除",
            icon: "🗑",
            action: MenuAction::Delete,
        });
        items.push(MenuItem {
            label: if pinned { "取消置顶" } else { "置顶" },
            icon: "📌",
            action: MenuAction::TogglePin,
        });
    } else {
        items.push(MenuItem {
            label: "隐藏",
            icon: "🔇",
            action: MenuAction::MuteAccount,
        });
        items.push(MenuItem {
            label: "屏蔽",
            icon: "🔒",
            action: MenuAction::BlockAccount,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(items: &[MenuItem]) -> Vec<MenuAction> {
        items.iter().map(|i| i.action).collect()
    }

    #[test]
    fn own_toot_menu() {
        let items = build_menu(true, false);
        assert_eq!(
            actions(&items),
            vec![
                MenuAction::Share,
                MenuAction::CopyLink,
                MenuAction::Delete,
                MenuAction::TogglePin
            ]
        );
        assert_eq!(items[3].label, "置顶");
        assert_eq!(build_menu(true, true)[3].label, "取消置顶");
    }

    #[test]
    fn other_toot_menu_never_offers_delete_or_pin() {
        let items = build_menu(false, true);
        assert_eq!(
            actions(&items),
            vec![
                MenuAction::Share,
                MenuAction::CopyLink,
                MenuAction::MuteAccount,
                MenuAction::BlockAccount
            ]
        );
    }
}
