//! Signed-in user bookkeeping
//!
//! The session is a user id kept in the local store. On start-up it is
//! checked against the backend before any screen other than login is shown.

use std::future::Future;

use crate::api::{ApiError, UserProfile};
use crate::router::Screen;
use crate::storage::{keys, KeyValueStore, StoreError};

/// Outcome of restoring a stored session
#[derive(Debug, Clone, PartialEq)]
pub struct Restored {
    pub screen: Screen,
    pub user: Option<UserProfile>,
}

impl Restored {
    fn login() -> Self {
        Self {
            screen: Screen::Login,
            user: None,
        }
    }
}

/// Parse a stored id the lenient way: leading digits only
fn parse_user_id(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Stored user id, if any and valid
pub fn stored_user_id<S: KeyValueStore + ?Sized>(store: &S) -> Option<u64> {
    store.get(keys::USER_ID).as_deref().and_then(parse_user_id)
}

/// Decide the first screen from the stored session
///
/// # Parameters
/// * `store` - Local store holding the session keys
/// * `current_path` - Path the client was started on
/// * `lookup` - Fetches the user for an id
///
/// # Returns
/// * Login when no valid session exists (stale keys are cleared)
/// * Onboarding when the user never finished it
/// * Settings when started on `/settings`, the dashboard otherwise
pub async fn restore<S, F, Fut>(
    store: &mut S,
    current_path: &str,
    lookup: F,
) -> Result<Restored, StoreError>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce(u64) -> Fut,
    Fut: Future<Output = Result<Option<UserProfile>, ApiError>>,
{
    let Some(raw) = store.get(keys::USER_ID) else {
        return Ok(Restored::login());
    };

    let Some(user_id) = parse_user_id(&raw) else {
        log::warn!("Invalid user id in store ({:?}), clearing session", raw);
        forget(store)?;
        return Ok(Restored::login());
    };

    let user = match lookup(user_id).await {
        Ok(Some(user)) if user.id.is_some() => user,
        Ok(_) => {
            log::warn!("User {} not found, clearing session", user_id);
            forget(store)?;
            return Ok(Restored::login());
        }
        Err(e) => {
            log::warn!("Failed to load user {}: {}", user_id, e);
            forget(store)?;
            return Ok(Restored::login());
        }
    };

    let screen = if !user.onboarding_completed {
        Screen::Onboarding
    } else if current_path == "/settings" {
        Screen::Settings
    } else {
        Screen::Dashboard
    };

    log::info!("Restored session of user {} on {}", user_id, screen);

    Ok(Restored {
        screen,
        user: Some(user),
    })
}

/// Keep a freshly signed-in user
pub fn remember_login<S: KeyValueStore + ?Sized>(
    store: &mut S,
    user: &UserProfile,
) -> Result<(), StoreError> {
    if let Some(id) = user.id {
        store.set(keys::USER_ID, &id.to_string())?;
    }
    store.set(keys::USERNAME, &user.username)?;
    store.set(
        keys::ONBOARDING_COMPLETED,
        if user.onboarding_completed {
            "true"
        } else {
            "false"
        },
    )
}

/// Whether the stored session finished onboarding
pub fn onboarding_completed<S: KeyValueStore + ?Sized>(store: &S) -> bool {
    store.get(keys::ONBOARDING_COMPLETED).as_deref() == Some("true")
}

/// Drop every session key
pub fn forget<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    for key in keys::SESSION {
        store.remove(key)?;
    }
    Ok(())
}

/// Name shown in the header; any failure degrades to an empty string
pub async fn display_name<F, Fut>(user_id: u64, lookup: F) -> String
where
    F: FnOnce(u64) -> Fut,
    Fut: Future<Output = Result<Option<UserProfile>, ApiError>>,
{
    match lookup(user_id).await {
        Ok(Some(user)) => user.username,
        Ok(None) => String::new(),
        Err(e) => {
            log::debug!("Display name unavailable: {}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn user(id: u64, onboarded: bool) -> UserProfile {
        UserProfile {
            id: Some(id),
            username: "민지".to_string(),
            onboarding_completed: onboarded,
            ..UserProfile::default()
        }
    }

    fn store_with_id(raw: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set(keys::USER_ID, raw).unwrap();
        store.set(keys::USERNAME, "민지").unwrap();
        store
    }

    #[tokio::test]
    async fn test_no_stored_id_goes_to_login() {
        let mut store = MemoryStore::new();
        let mut looked_up = false;

        let restored = restore(&mut store, "/", |_| {
            looked_up = true;
            async { Ok(None) }
        })
        .await
        .unwrap();

        assert_eq!(restored, Restored::login());
        assert!(!looked_up);
    }

    #[tokio::test]
    async fn test_invalid_id_clears_session() {
        let mut store = store_with_id("abc");

        let restored = restore(&mut store, "/", |_| async { Ok(None) })
            .await
            .unwrap();

        assert_eq!(restored.screen, Screen::Login);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_clears_session() {
        let mut store = store_with_id("7");

        let restored = restore(&mut store, "/", |_| async {
            Err(ApiError::Server {
                status: 500,
                message: "down".to_string(),
            })
        })
        .await
        .unwrap();

        assert_eq!(restored.screen, Screen::Login);
        assert_eq!(store.get(keys::USERNAME), None);
    }

    #[tokio::test]
    async fn test_missing_user_clears_session() {
        let mut store = store_with_id("7");

        let restored = restore(&mut store, "/", |_| async { Ok(None) })
            .await
            .unwrap();

        assert_eq!(restored.screen, Screen::Login);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_onboarding_incomplete() {
        let mut store = store_with_id("7");

        let restored = restore(&mut store, "/settings", |id| async move {
            Ok(Some(user(id, false)))
        })
        .await
        .unwrap();

        assert_eq!(restored.screen, Screen::Onboarding);
    }

    #[tokio::test]
    async fn test_settings_path_is_kept() {
        let mut store = store_with_id("7");

        let restored = restore(&mut store, "/settings", |id| async move {
            Ok(Some(user(id, true)))
        })
        .await
        .unwrap();

        assert_eq!(restored.screen, Screen::Settings);
        assert_eq!(restored.user.and_then(|u| u.id), Some(7));
    }

    #[tokio::test]
    async fn test_other_paths_restore_to_dashboard() {
        let mut store = store_with_id("12x");

        let restored = restore(&mut store, "/subject/3", |id| async move {
            assert_eq!(id, 12);
            Ok(Some(user(id, true)))
        })
        .await
        .unwrap();

        assert_eq!(restored.screen, Screen::Dashboard);
    }

    #[test]
    fn test_remember_and_forget() {
        let mut store = MemoryStore::new();

        remember_login(&mut store, &user(3, true)).unwrap();
        assert_eq!(stored_user_id(&store), Some(3));
        assert!(onboarding_completed(&store));

        forget(&mut store).unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_display_name_degrades_to_empty() {
        let name = display_name(1, |_| async {
            Err(ApiError::NoSession)
        })
        .await;

        assert_eq!(name, "");
    }
}
