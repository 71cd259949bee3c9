//! End-to-end lockout flow: lock an account, issue a bypass link, follow
//! it, and verify the gate behaves at every step.

use std::sync::Arc;

use lockgate_core::{
    AccessDecisionEngine, AuthGate, BypassLinkIssuer, Decision, GateError, MemorySession,
    MemoryStatusStore, Session, StatusStore, TokenGenerator,
};
use lockgate_shared::{AccountId, AccountStatus};

struct Fixture {
    store: Arc<MemoryStatusStore>,
    engine: AccessDecisionEngine,
    gate: Arc<AuthGate>,
    issuer: BypassLinkIssuer,
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStatusStore::new());
    let gate = Arc::new(AuthGate::new(store.clone(), TokenGenerator::new()));
    store.register_listener(gate.clone());
    Fixture {
        engine: AccessDecisionEngine::new(store.clone()),
        issuer: BypassLinkIssuer::new(store.clone(), TokenGenerator::new()),
        store,
        gate,
    }
}

#[tokio::test]
async fn locked_account_lifecycle() {
    let f = fixture().await;
    let id = AccountId(42);
    f.store.add_account(id, AccountStatus::Normal).await;

    // Normal: logs in and browses freely.
    f.gate.authenticate(id).await.unwrap();
    let mut session = MemorySession::established(id);
    assert_eq!(
        f.engine.evaluate("/secret", &mut session).await.unwrap(),
        Decision::Allow
    );

    // Lock the account; the status-change hook provisions a token.
    f.store.set_status(id, AccountStatus::Locked).await.unwrap();
    let token = f.store.access_token(id).await.unwrap().unwrap();
    assert!(!token.is_empty());

    // Logins now fail, and browsing redirects.
    assert!(matches!(
        f.gate.authenticate(id).await,
        Err(GateError::LoginRejected(_))
    ));
    assert!(!f.gate.allow_password_reset(true, id).await.unwrap());
    assert_eq!(
        f.engine.evaluate("/secret", &mut session).await.unwrap(),
        Decision::Redirect("/locked".to_string())
    );

    // An admin issues a bypass link for one destination.
    let link = f.issuer.issue_link(id, "/reports").await.unwrap();
    assert!(link.starts_with("/reports?"));

    // Following the link from a fresh browser establishes a session and
    // lands on the now-whitelisted destination.
    let mut fresh = MemorySession::anonymous();
    assert_eq!(
        f.engine.evaluate(&link, &mut fresh).await.unwrap(),
        Decision::Allow
    );
    assert_eq!(fresh.current_account(), Some(id));

    // The session is real but not a wildcard: everything else still
    // redirects.
    assert_eq!(
        f.engine.evaluate("/secret", &mut fresh).await.unwrap(),
        Decision::Redirect("/locked".to_string())
    );

    // Unlocking restores normal access with the token left in place.
    f.store.set_status(id, AccountStatus::Normal).await.unwrap();
    f.gate.authenticate(id).await.unwrap();
    assert_eq!(
        f.engine.evaluate("/secret", &mut fresh).await.unwrap(),
        Decision::Allow
    );
}

#[tokio::test]
async fn issued_link_preserves_destination_encoding() {
    let f = fixture().await;
    let id = AccountId(11);
    f.store.add_account(id, AccountStatus::Locked).await;

    // The destination already carries a percent-encoded query. The
    // issued link must keep it byte-for-byte, or stripping the
    // credential would no longer match the whitelist entry.
    let link = f.issuer.issue_link(id, "/r?x=a%20b").await.unwrap();
    assert!(link.starts_with("/r?x=a%20b&"));

    let mut session = MemorySession::anonymous();
    assert_eq!(
        f.engine.evaluate(&link, &mut session).await.unwrap(),
        Decision::Allow
    );
    assert_eq!(session.current_account(), Some(id));
}

#[tokio::test]
async fn tampered_link_fails_closed() {
    let f = fixture().await;
    let id = AccountId(7);
    f.store.add_account(id, AccountStatus::Locked).await;

    let link = f.issuer.issue_link(id, "/docs").await.unwrap();
    let tampered = link.replace("access_account=7", "access_account=8");

    let mut session = MemorySession::anonymous();
    assert_eq!(
        f.engine.evaluate(&tampered, &mut session).await.unwrap(),
        Decision::Redirect("/disabled".to_string())
    );
    assert_eq!(session.current_account(), None);
}

#[tokio::test]
async fn disabling_overrides_an_issued_link() {
    let f = fixture().await;
    let id = AccountId(9);
    f.store.add_account(id, AccountStatus::Locked).await;

    let link = f.issuer.issue_link(id, "/docs").await.unwrap();
    f.store.set_status(id, AccountStatus::Disabled).await.unwrap();

    // The credential still matches, so a session is established, but the
    // disabled status wins over the whitelist.
    let mut session = MemorySession::anonymous();
    assert_eq!(
        f.engine.evaluate(&link, &mut session).await.unwrap(),
        Decision::Redirect("/disabled".to_string())
    );
    assert_eq!(session.current_account(), Some(id));
}
