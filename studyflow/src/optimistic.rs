//! Optimistic updates with rollback
//!
//! The local value changes first; the server call follows. When the call
//! fails the previous value comes back, either from a snapshot or from a
//! fresh fetch.

use itertools::Itertools;
use std::future::Future;

use crate::api::Subject;

/// Replace `state` with `next`, then persist
///
/// On failure the pre-update value is restored exactly and the error is
/// returned.
///
/// # Parameters
/// * `state` - Value shown to the user
/// * `next` - Value to show while the call is in flight
/// * `persist` - The server call
pub async fn apply_optimistic<T, R, E, F, Fut>(state: &mut T, next: T, persist: F) -> Result<R, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let snapshot = std::mem::replace(state, next);

    match persist().await {
        Ok(value) => Ok(value),
        Err(e) => {
            *state = snapshot;
            Err(e)
        }
    }
}

/// Move the element at `from` to `to`, shifting the elements in between
///
/// Out-of-range positions leave the order unchanged.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut moved = items.to_vec();
    if from >= moved.len() || to >= moved.len() || from == to {
        return moved;
    }

    let item = moved.remove(from);
    moved.insert(to, item);
    moved
}

/// Move the element identified by `active` to the position of `over`
///
/// Returns `None` when either id is missing or both are the same.
pub fn reorder_by_id<T, K, F>(items: &[T], key: F, active: &K, over: &K) -> Option<Vec<T>>
where
    T: Clone,
    K: PartialEq,
    F: Fn(&T) -> K,
{
    if active == over {
        return None;
    }

    let from = items.iter().position(|item| key(item) == *active)?;
    let to = items.iter().position(|item| key(item) == *over)?;
    Some(move_item(items, from, to))
}

/// Position key of a subject: its explicit order, else its id
pub fn display_order(subject: &Subject) -> i64 {
    subject
        .order
        .unwrap_or_else(|| i64::try_from(subject.id).unwrap_or(i64::MAX))
}

/// Sort subjects the way the dashboard lists them
pub fn sort_by_display_order(subjects: &mut [Subject]) {
    subjects.sort_by_key(display_order);
}

/// Drag one subject onto another and persist the new order
///
/// `persist` receives the full id order. Returns `Ok(false)` when nothing
/// moved.
pub async fn reorder_subjects<E, F, Fut>(
    subjects: &mut Vec<Subject>,
    active_id: u64,
    over_id: u64,
    persist: F,
) -> Result<bool, E>
where
    F: FnOnce(Vec<u64>) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let Some(next) = reorder_by_id(subjects, |s| s.id, &active_id, &over_id) else {
        return Ok(false);
    };

    let ids: Vec<u64> = next.iter().map(|s| s.id).collect();
    debug_assert!(ids.iter().all_unique());

    apply_optimistic(subjects, next, || persist(ids)).await?;
    Ok(true)
}

/// Recolor a subject, reloading the list from the server if the change fails
///
/// When the reload fails too, the pre-change list is kept.
pub async fn recolor_subject<E, P, PFut, L, LFut>(
    subjects: &mut Vec<Subject>,
    subject_id: u64,
    color: &str,
    persist: P,
    reload: L,
) -> Result<(), E>
where
    P: FnOnce() -> PFut,
    PFut: Future<Output = Result<(), E>>,
    L: FnOnce() -> LFut,
    LFut: Future<Output = Result<Vec<Subject>, E>>,
{
    let next: Vec<Subject> = subjects
        .iter()
        .map(|s| {
            if s.id == subject_id {
                Subject {
                    color: Some(color.to_string()),
                    ..s.clone()
                }
            } else {
                s.clone()
            }
        })
        .collect();

    let Err(e) = apply_optimistic(subjects, next, persist).await else {
        return Ok(());
    };

    match reload().await {
        Ok(mut fresh) => {
            sort_by_display_order(&mut fresh);
            *subjects = fresh;
        }
        Err(_) => log::warn!("Reload after failed color change also failed"),
    }

    Err(e)
}
