/// Hide/reveal state for a sensitive toot body.
///
/// The gate only tracks the user's choice. Refreshing the toot's data does
/// not touch it; [`ContentWarningGate::rebind`] resets it only when the
/// toot itself changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentWarningGate {
    sensitive: bool,
    hidden: bool,
}

impl ContentWarningGate {
    pub fn new(sensitive: bool) -> Self {
        ContentWarningGate {
            sensitive,
            hidden: sensitive,
        }
    }

    /// Whether the gate is in play at all.
    pub fn is_active(&self) -> bool {
        self.sensitive
    }

    pub fn is_hidden(&self) -> bool {
        self.sensitive && self.hidden
    }

    pub fn body_visible(&self) -> bool {
        !self.is_hidden()
    }

    pub fn toggle(&mut self) {
        if self.sensitive {
            self.hidden = !self.hidden;
        }
    }

    /// Label of the reveal control.
    pub fn toggle_label(&self) -> &'static str {
        if self.is_hidden() {
            "显示内容"
        } else {
            "隐藏内容"
        }
    }

    /// Re-attach the gate after the toot's data changed. A status that
    /// became sensitive starts hidden; one that stopped being sensitive
    /// bypasses the gate. Otherwise the user's choice stands.
    pub fn rebind(&mut self, sensitive: bool) {
        if sensitive != self.sensitive {
            *self = ContentWarningGate::new(sensitive);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_sensitive_is_always_visible() {
        let mut gate = ContentWarningGate::new(false);
        assert!(!gate.is_active());
        assert!(gate.body_visible());
        gate.toggle();
        assert!(gate.body_visible());
    }

    #[test]
    fn sensitive_toggles_back_and_forth() {
        let mut gate = ContentWarningGate::new(true);
        assert!(gate.is_hidden());
        assert_eq!(gate.toggle_label(), "显示内容");
        gate.toggle();
        assert!(gate.body_visible());
        assert_eq!(gate.toggle_label(), "隐藏内容");
        gate.toggle();
        assert!(gate.is_hidden());
    }

    #[test]
    fn rebind_keeps_user_choice() {
        let mut gate = ContentWarningGate::new(true);
        gate.toggle();
        gate.rebind(true);
        assert!(gate.body_visible());
    }

    #[test]
    fn rebind_resets_when_sensitivity_changes() {
        let mut gate = ContentWarningGate::new(false);
        gate.rebind(true);
        assert!(gate.is_hidden());
        gate.rebind(false);
        assert!(gate.body_visible());
    }
}
