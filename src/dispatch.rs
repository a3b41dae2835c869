//! Toot interactions that hit the server.
//!
//! An [`Intent`] is built from a toot box (which checks ownership rules),
//! run with [`dispatch`], and the returned [`Outcome`] is applied by the
//! caller. Nothing changes locally until the server says yes.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::api::{ApiError, MutationApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Favourite,
    Reblog,
    Delete,
    TogglePin,
    Mute,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Favourite { status_id: String, want: bool },
    Reblog { status_id: String, want: bool },
    Delete { status_id: String },
    SetPin { status_id: String, currently_pinned: bool },
    MuteAccount { status_id: String, account_id: String },
    BlockAccount { status_id: String, account_id: String },
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Favourite { .. } => IntentKind::Favourite,
            Intent::Reblog { .. } => IntentKind::Reblog,
            Intent::Delete { .. } => IntentKind::Delete,
            Intent::SetPin { .. } => IntentKind::TogglePin,
            Intent::MuteAccount { .. } => IntentKind::Mute,
            Intent::BlockAccount { .. } => IntentKind::Block,
        }
    }

    /// Status the intent was issued from.
    pub fn status_id(&self) -> &str {
        match self {
            Intent::Favourite { status_id, .. }
            | Intent::Reblog { status_id, .. }
            | Intent::Delete { status_id }
            | Intent::SetPin { status_id, .. }
            | Intent::MuteAccount { status_id, .. }
            | Intent::BlockAccount { status_id, .. } => status_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Favourited { status_id: String, favourited: bool },
    Reblogged { status_id: String, reblogged: bool },
    Deleted { status_id: String },
    Pinned { status_id: String, pinned: bool },
    Muted { account_id: String },
    Blocked { account_id: String },
}

pub async fn dispatch(api: &dyn MutationApi, intent: Intent) -> Result<Outcome, ApiError> {
    let result = match &intent {
        Intent::Favourite { status_id, want } => api
            .favourite(status_id, *want)
            .await
            .map(|_| Outcome::Favourited {
                status_id: status_id.clone(),
                favourited: *want,
            }),
        Intent::Reblog { status_id, want } => {
            api.reblog(status_id, *want).await.map(|_| Outcome::Reblogged {
                status_id: status_id.clone(),
                reblogged: *want,
            })
        }
        Intent::Delete { status_id } => api
            .delete_status(status_id)
            .await
            .map(|_| Outcome::Deleted {
                status_id: status_id.clone(),
            }),
        Intent::SetPin {
            status_id,
            currently_pinned,
        } => api
            .set_pin(status_id, *currently_pinned)
            .await
            .map(|_| Outcome::Pinned {
                status_id: status_id.clone(),
                pinned: !*currently_pinned,
            }),
        Intent::MuteAccount { account_id, .. } => api
            .mute_account(account_id, true)
            .await
            .map(|_| Outcome::Muted {
                account_id: account_id.clone(),
            }),
        Intent::BlockAccount { account_id, .. } => api
            .block_account(account_id, true)
            .await
            .map(|_| Outcome::Blocked {
                account_id: account_id.clone(),
            }),
    };

    match &result {
        Ok(outcome) => info!("{:?} succeeded: {:?}", intent.kind(), outcome),
        Err(e) => warn!("{:?} on {} failed: {}", intent.kind(), intent.status_id(), e),
    }
    result
}

/// Requests currently outstanding, one per (status, intent kind).
#[derive(Debug, Default)]
pub struct InFlight {
    pending: HashSet<(String, IntentKind)>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the intent as started. Returns false if the same intent is
    /// already waiting on the server.
    pub fn try_begin(&mut self, intent: &Intent) -> bool {
        self.pending
            .insert((intent.status_id().to_string(), intent.kind()))
    }

    pub fn finish(&mut self, intent: &Intent) {
        self.pending
            .remove(&(intent.status_id().to_string(), intent.kind()));
    }

    pub fn is_pending(&self, status_id: &str, kind: IntentKind) -> bool {
        self.pending.contains(&(status_id.to_string(), kind))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call; fails all of them when `fail` is set.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub calls: Mutex<Vec<String>>,
        pub fail: bool,
    }

    impl FakeApi {
        fn record(&self, call: String) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                Err(ApiError::Status {
                    code: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl MutationApi for FakeApi {
        async fn favourite(&self, id: &str, want: bool) -> Result<(), ApiError> {
            self.record(format!("favourite {} {}", id, want))
        }
        async fn reblog(&self, id: &str, want: bool) -> Result<(), ApiError> {
            self.record(format!("reblog {} {}", id, want))
        }
        async fn delete_status(&self, id: &str) -> Result<(), ApiError> {
            self.record(format!("delete {}", id))
        }
        async fn set_pin(&self, id: &str, currently_pinned: bool) -> Result<(), ApiError> {
            self.record(format!("pin {} {}", id, currently_pinned))
        }
        async fn mute_account(&self, id: &str, want: bool) -> Result<(), ApiError> {
            self.record(format!("mute {} {}", id, want))
        }
        async fn block_account(&self, id: &str, want: bool) -> Result<(), ApiError> {
            self.record(format!("block {} {}", id, want))
        }
    }

    #[tokio::test]
    async fn favourite_reports_requested_state() {
        let api = FakeApi::default();
        let outcome = dispatch(
            &api,
            Intent::Favourite {
                status_id: "s1".into(),
                want: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            outcome,
            Outcome::Favourited {
                status_id: "s1".into(),
                favourited: true
            }
        );
        assert_eq!(*api.calls.lock().unwrap(), vec!["favourite s1 true"]);
    }

    #[tokio::test]
    async fn pin_flips_current_state() {
        let api = FakeApi::default();
        let outcome = dispatch(
            &api,
            Intent::SetPin {
                status_id: "s1".into(),
                currently_pinned: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            outcome,
            Outcome::Pinned {
                status_id: "s1".into(),
                pinned: false
            }
        );
    }

    #[tokio::test]
    async fn mute_and_block_always_request_true() {
        let api = FakeApi::default();
        dispatch(
            &api,
            Intent::MuteAccount {
                status_id: "s1".into(),
                account_id: "a1".into(),
            },
        )
        .await
        .unwrap();
        dispatch(
            &api,
            Intent::BlockAccount {
                status_id: "s1".into(),
                account_id: "a1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(*api.calls.lock().unwrap(), vec!["mute a1 true", "block a1 true"]);
    }

    #[tokio::test]
    async fn failure_is_returned_not_applied() {
        let api = FakeApi {
            fail: true,
            ..Default::default()
        };
        let result = dispatch(
            &api,
            Intent::Delete {
                status_id: "s1".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(ApiError::Status { code: 500, .. })));
    }

    #[test]
    fn in_flight_rejects_duplicates_until_finished() {
        let mut in_flight = InFlight::new();
        let intent = Intent::Reblog {
            status_id: "s1".into(),
            want: true,
        };
        assert!(in_flight.try_begin(&intent));
        assert!(!in_flight.try_begin(&intent));
        assert!(in_flight.is_pending("s1", IntentKind::Reblog));

        let other = Intent::Favourite {
            status_id: "s1".into(),
            want: true,
        };
        assert!(in_flight.try_begin(&other));

        in_flight.finish(&intent);
        assert!(in_flight.try_begin(&intent));
    }
}
