use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::Duration;
use selecta_core::AppError;
use selecta_domain::{Action, NotificationRecipient, Resource, Role, UserId};

use crate::AuthorizationService;
use crate::clock::Clock;
use crate::selection_ports::GrantQuery;
use crate::test_support::{FakeStore, ManualClock, config};

use super::InterviewerGrantService;

fn services(
    store: &Arc<FakeStore>,
    clock: &Arc<ManualClock>,
) -> (AuthorizationService, InterviewerGrantService) {
    let authorization = AuthorizationService::new(
        store.clone(),
        store.clone(),
        clock.clone(),
        config().store_timeout,
    );
    let grants = InterviewerGrantService::new(
        authorization.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        clock.clone(),
        config().store_timeout,
    );
    (authorization, grants)
}

#[tokio::test]
async fn granted_access_lapses_without_revoke() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (authorization, grants) = services(&store, &clock);
    let president = store.add_member(Role::President).await;
    let member = store.add_member(Role::Member).await;

    let grant = grants
        .grant(&president, member.id(), Some(clock.now() + Duration::hours(1)))
        .await;
    assert!(grant.is_ok());

    let allowed = authorization
        .check_permission(&member, Resource::Candidates, Action::Interview)
        .await;
    assert!(allowed.unwrap_or(false));

    clock.advance(Duration::minutes(61));

    let allowed = authorization
        .check_permission(&member, Resource::Candidates, Action::Interview)
        .await;
    assert!(!allowed.unwrap_or(true));
    assert!(!grants.is_active(member.id()).await.unwrap_or(true));
    assert!(store.grant_rows(member.id()).await[0].revoked_at.is_none());
}

#[tokio::test]
async fn regranting_refreshes_instead_of_duplicating() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (_, grants) = services(&store, &clock);
    let president = store.add_member(Role::President).await;
    let member = store.add_member(Role::Member).await;

    let first = grants
        .grant(&president, member.id(), Some(clock.now() + Duration::hours(1)))
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = grants
        .grant(&president, member.id(), Some(clock.now() + Duration::hours(8)))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(first.grant_id, second.grant_id);
    assert_eq!(second.expires_at, Some(clock.now() + Duration::hours(8)));
    assert_eq!(store.grant_rows(member.id()).await.len(), 1);
}

#[tokio::test]
async fn concurrent_grants_leave_one_active_grant() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (_, grants) = services(&store, &clock);
    let president = store.add_member(Role::President).await;
    let vice_president = store.add_member(Role::VicePresident).await;
    let member = store.add_member(Role::Member).await;

    let mut handles = Vec::new();
    for attempt in 0..16 {
        let grants = grants.clone();
        let actor = if attempt % 2 == 0 { president } else { vice_president };
        handles.push(tokio::spawn(async move {
            grants.grant(&actor, member.id(), None).await
        }));
    }
    for handle in handles {
        assert!(matches!(handle.await, Ok(Ok(_))));
    }

    let now = clock.now();
    let active = store
        .grant_rows(member.id())
        .await
        .into_iter()
        .filter(|grant| grant.is_active_at(now))
        .count();
    assert_eq!(active, 1);
}

#[tokio::test]
async fn only_process_managers_grant_and_revoke() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (_, grants) = services(&store, &clock);
    let director = store.add_member(Role::DirectorOfCommunications).await;
    let member = store.add_member(Role::Member).await;

    let granted = grants.grant(&director, member.id(), None).await;
    let revoked = grants.revoke(&director, member.id()).await;

    assert!(matches!(granted, Err(AppError::Forbidden(_))));
    assert!(matches!(revoked, Err(AppError::Forbidden(_))));
    assert!(store.grant_rows(member.id()).await.is_empty());
}

#[tokio::test]
async fn denial_does_not_reveal_unknown_targets() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (_, grants) = services(&store, &clock);
    let member = store.add_member(Role::Member).await;

    let result = grants.grant(&member, UserId::new(), None).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn past_expiry_is_rejected() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (_, grants) = services(&store, &clock);
    let superadmin = store.add_member(Role::Superadmin).await;
    let member = store.add_member(Role::Member).await;

    let result = grants
        .grant(&superadmin, member.id(), Some(clock.now() - Duration::minutes(5)))
        .await;

    assert!(matches!(result, Err(AppError::InvalidExpiry(_))));
}

#[tokio::test]
async fn granting_to_unknown_member_is_not_found() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (_, grants) = services(&store, &clock);
    let president = store.add_member(Role::President).await;

    let result = grants.grant(&president, UserId::new(), None).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn granting_to_inactive_member_is_rejected() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (_, grants) = services(&store, &clock);
    let president = store.add_member(Role::President).await;
    let inactive = store.add_member_with_status(Role::Member, false).await;

    let result = grants.grant(&president, inactive.id(), None).await;

    assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("not active")));
    assert!(store.grant_rows(inactive.id()).await.is_empty());
    assert!(store.notifications.lock().await.is_empty());
}

#[tokio::test]
async fn failed_audit_keeps_granted_and_revoked_access() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (_, grants) = services(&store, &clock);
    let president = store.add_member(Role::President).await;
    let member = store.add_member(Role::Member).await;
    store.audit_failing.store(true, Ordering::SeqCst);

    let granted = grants.grant(&president, member.id(), None).await;
    assert!(granted.is_ok());
    assert!(grants.is_active(member.id()).await.unwrap_or(false));
    assert_eq!(store.notifications.lock().await.len(), 1);

    let revoked = grants.revoke(&president, member.id()).await;
    assert!(revoked.is_ok());
    assert!(!grants.is_active(member.id()).await.unwrap_or(true));
}

#[tokio::test]
async fn revoke_stamps_the_row_and_requires_an_active_grant() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (_, grants) = services(&store, &clock);
    let president = store.add_member(Role::President).await;
    let member = store.add_member(Role::Member).await;

    let missing = grants.revoke(&president, member.id()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let _ = grants.grant(&president, member.id(), None).await;
    let revoked = grants.revoke(&president, member.id()).await;
    assert!(matches!(&revoked, Ok(grant) if grant.revoked_by == Some(president.id())));
    assert!(!grants.is_active(member.id()).await.unwrap_or(true));

    let rows = store.grant_rows(member.id()).await;
    assert_eq!(rows.len(), 1);
    assert!(rows[0].revoked_at.is_some());

    let again = grants.revoke(&president, member.id()).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn grant_notifies_the_new_interviewer_best_effort() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (_, grants) = services(&store, &clock);
    let president = store.add_member(Role::President).await;
    let first = store.add_member(Role::Member).await;
    let second = store.add_member(Role::Member).await;

    let _ = grants.grant(&president, first.id(), None).await;
    {
        let notifications = store.notifications.lock().await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(
            notifications[0].recipient,
            NotificationRecipient::Member {
                user_id: first.id()
            }
        );
    }

    store.notifications_failing.store(true, Ordering::SeqCst);
    let result = grants.grant(&president, second.id(), None).await;
    assert!(result.is_ok());
    assert!(grants.is_active(second.id()).await.unwrap_or(false));
}

#[tokio::test]
async fn listing_reports_activity_at_query_time() {
    let store = Arc::new(FakeStore::default());
    let clock = Arc::new(ManualClock::new());
    let (_, grants) = services(&store, &clock);
    let president = store.add_member(Role::President).await;
    let short = store.add_member(Role::Member).await;
    let open_ended = store.add_member(Role::Member).await;

    let _ = grants
        .grant(&president, short.id(), Some(clock.now() + Duration::minutes(10)))
        .await;
    let _ = grants.grant(&president, open_ended.id(), None).await;
    clock.advance(Duration::minutes(30));

    let all = grants
        .list_interviewer_access(&president, GrantQuery::default())
        .await
        .unwrap_or_default();
    assert_eq!(all.len(), 2);
    assert_eq!(all.iter().filter(|entry| entry.is_active).count(), 1);
    let lapsed: Vec<UserId> = all
        .iter()
        .filter(|entry| entry.is_lapsed)
        .map(|entry| entry.grant.user_id)
        .collect();
    assert_eq!(lapsed, vec![short.id()]);

    let active_only = grants
        .list_interviewer_access(
            &president,
            GrantQuery {
                user_id: None,
                active_only: true,
            },
        )
        .await
        .unwrap_or_default();
    assert_eq!(active_only.len(), 1);
    assert_eq!(active_only[0].grant.user_id, open_ended.id());
}
