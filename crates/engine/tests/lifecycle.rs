//! End-to-end lifecycle scenarios over the in-memory store.

use domain::{
    ChefId, FulfillmentStatus, NewRoleRequest, NewUser, OrderDraft, PaymentStatus, RequestStatus,
    RequestType, Role,
};
use engine::{Decision, EngineError, Identity, InMemoryCheckoutProvider, Lifecycle};
use store::{InMemoryStore, OrderStore, RoleRequestStore, UserStore};

fn setup() -> Lifecycle<InMemoryStore, InMemoryCheckoutProvider> {
    Lifecycle::new(InMemoryStore::new(), InMemoryCheckoutProvider::new())
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.into(),
        name: email.split('@').next().unwrap_or("user").into(),
        photo_url: None,
    }
}

fn draft(food: &str, customer: &str, quantity: u32) -> OrderDraft {
    OrderDraft {
        food_id: food.into(),
        food_name: "Shorshe Ilish".into(),
        customer_email: customer.into(),
        chef_id: ChefId::new("CHEF-7777").unwrap(),
        quantity,
        amount_cents: 50_000,
    }
}

async fn make_admin(
    engine: &Lifecycle<InMemoryStore, InMemoryCheckoutProvider>,
    email: &str,
) -> Identity {
    engine.signup(new_user(email)).await.unwrap();
    engine
        .store()
        .set_role(email, Role::Admin, None)
        .await
        .unwrap();
    Identity::new(email)
}

#[tokio::test]
async fn signup_is_idempotent() {
    let engine = setup();

    let first = engine.signup(new_user("alice@example.com")).await.unwrap();
    let mut repeat = new_user("alice@example.com");
    repeat.name = "Different Name".into();
    let second = engine.signup(repeat).await.unwrap();

    // existing record returned unmutated
    assert_eq!(first.id, second.id);
    assert_eq!(second.name, first.name);
}

#[tokio::test]
async fn deliver_requires_payment_then_succeeds() {
    let engine = setup();
    engine.signup(new_user("alice@example.com")).await.unwrap();

    let order = engine
        .place_order(draft("meal-1", "alice@example.com", 1))
        .await
        .unwrap();
    assert_eq!(order.fulfillment, FulfillmentStatus::Pending);
    assert_eq!(order.payment, PaymentStatus::Pending);

    // deliver before payment fails without touching state
    let err = engine.deliver_order(order.id).await.unwrap_err();
    assert!(matches!(err, EngineError::PreconditionFailed(_)));

    engine.record_payment(order.id, 50_000).await.unwrap();
    let paid = engine.store().find_order(order.id).await.unwrap().unwrap();
    assert_eq!(paid.payment, PaymentStatus::Paid);

    engine.deliver_order(order.id).await.unwrap();
    let delivered = engine.store().find_order(order.id).await.unwrap().unwrap();
    assert_eq!(delivered.fulfillment, FulfillmentStatus::Delivered);
}

#[tokio::test]
async fn concurrent_accepts_have_one_winner() {
    let engine = setup();
    engine.signup(new_user("alice@example.com")).await.unwrap();
    let order = engine
        .place_order(draft("meal-1", "alice@example.com", 1))
        .await
        .unwrap();

    let (e1, e2) = (engine.clone(), engine.clone());
    let id = order.id;
    let t1 = tokio::spawn(async move { e1.accept_order(id).await });
    let t2 = tokio::spawn(async move { e2.accept_order(id).await });

    let r1 = t1.await.unwrap();
    let r2 = t2.await.unwrap();

    let successes = [&r1, &r2].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one accept must succeed");
    let conflict = if r1.is_err() { r1 } else { r2 };
    assert!(matches!(conflict, Err(EngineError::Conflict(_))));

    let stored = engine.store().find_order(id).await.unwrap().unwrap();
    assert_eq!(stored.fulfillment, FulfillmentStatus::Accepted);
}

#[tokio::test]
async fn accepted_orders_cannot_be_cancelled() {
    let engine = setup();
    engine.signup(new_user("alice@example.com")).await.unwrap();
    let order = engine
        .place_order(draft("meal-1", "alice@example.com", 1))
        .await
        .unwrap();

    engine.accept_order(order.id).await.unwrap();
    let err = engine.cancel_order(order.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn transitions_on_missing_orders_report_not_found() {
    let engine = setup();
    let missing = common::OrderId::new();

    assert!(matches!(
        engine.accept_order(missing).await.unwrap_err(),
        EngineError::NotFound { .. }
    ));
    assert!(matches!(
        engine.deliver_order(missing).await.unwrap_err(),
        EngineError::NotFound { .. }
    ));
}

#[tokio::test]
async fn fraud_flagged_users_cannot_place_orders() {
    let engine = setup();
    let admin = make_admin(&engine, "admin@example.com").await;
    let user = engine.signup(new_user("mallory@example.com")).await.unwrap();

    engine.flag_fraud(&admin, user.id).await.unwrap();

    let err = engine
        .place_order(draft("meal-1", "mallory@example.com", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // regardless of payload
    let err = engine
        .place_order(draft("meal-9", "mallory@example.com", 7))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn fraud_flagging_requires_admin() {
    let engine = setup();
    let user = engine.signup(new_user("bob@example.com")).await.unwrap();

    let err = engine
        .flag_fraud(&Identity::new("bob@example.com"), user.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn duplicate_open_order_is_a_conflict() {
    let engine = setup();
    engine.signup(new_user("alice@example.com")).await.unwrap();

    engine
        .place_order(draft("meal-1", "alice@example.com", 2))
        .await
        .unwrap();
    let err = engine
        .place_order(draft("meal-1", "alice@example.com", 2))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // a different quantity is a different order
    engine
        .place_order(draft("meal-1", "alice@example.com", 3))
        .await
        .unwrap();
}

#[tokio::test]
async fn payment_for_missing_order_is_inconsistent() {
    let engine = setup();

    let err = engine
        .record_payment(common::OrderId::new(), 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Inconsistent(_)));
}

#[tokio::test]
async fn checkout_session_touches_no_state() {
    let engine = setup();
    engine.signup(new_user("alice@example.com")).await.unwrap();
    let order = engine
        .place_order(draft("meal-1", "alice@example.com", 1))
        .await
        .unwrap();

    let session = engine
        .create_checkout_session(order.id, order.amount_cents)
        .await
        .unwrap();
    assert!(session.url.contains(&order.id.to_string()));

    let stored = engine.store().find_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.payment, PaymentStatus::Pending);
}

#[tokio::test]
async fn role_request_workflow_end_to_end() {
    let engine = setup();
    let admin = make_admin(&engine, "admin@example.com").await;
    engine.signup(new_user("uma@example.com")).await.unwrap();

    // open request
    let r1 = engine
        .request_role(NewRoleRequest {
            requester_email: "uma@example.com".into(),
            request_type: RequestType::Chef,
        })
        .await
        .unwrap();

    // second request of the same type conflicts, r1 unchanged
    let err = engine
        .request_role(NewRoleRequest {
            requester_email: "uma@example.com".into(),
            request_type: RequestType::Chef,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
    let stored = engine
        .store()
        .find_request(r1.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);

    // admin rejects: role unchanged, request terminal
    engine
        .decide_role_request(&admin, r1.id, Decision::Reject)
        .await
        .unwrap();
    assert_eq!(engine.role_of("uma@example.com").await.unwrap(), Role::User);
    let stored = engine
        .store()
        .find_request(r1.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, RequestStatus::Rejected);

    // a new request of the same type is allowed again
    let r2 = engine
        .request_role(NewRoleRequest {
            requester_email: "uma@example.com".into(),
            request_type: RequestType::Chef,
        })
        .await
        .unwrap();

    // approval elevates and assigns a chef identifier
    engine
        .decide_role_request(&admin, r2.id, Decision::Approve)
        .await
        .unwrap();
    let user = engine
        .store()
        .find_user_by_email("uma@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.role, Role::Chef);
    let chef_id = user.chef_id.expect("chef id assigned on approval");
    assert!(ChefId::new(chef_id.as_str()).is_ok());
}

#[tokio::test]
async fn admin_approval_sets_admin_role_without_chef_id() {
    let engine = setup();
    let admin = make_admin(&engine, "admin@example.com").await;
    engine.signup(new_user("vera@example.com")).await.unwrap();

    let req = engine
        .request_role(NewRoleRequest {
            requester_email: "vera@example.com".into(),
            request_type: RequestType::Admin,
        })
        .await
        .unwrap();
    engine
        .decide_role_request(&admin, req.id, Decision::Approve)
        .await
        .unwrap();

    let user = engine
        .store()
        .find_user_by_email("vera@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.role, Role::Admin);
    assert!(user.chef_id.is_none());
}

#[tokio::test]
async fn decisions_require_admin() {
    let engine = setup();
    engine.signup(new_user("uma@example.com")).await.unwrap();
    let req = engine
        .request_role(NewRoleRequest {
            requester_email: "uma@example.com".into(),
            request_type: RequestType::Chef,
        })
        .await
        .unwrap();

    let err = engine
        .decide_role_request(&Identity::new("uma@example.com"), req.id, Decision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn re_deciding_a_request_is_permitted() {
    // Reference behavior: decisions apply regardless of current status.
    let engine = setup();
    let admin = make_admin(&engine, "admin@example.com").await;
    engine.signup(new_user("uma@example.com")).await.unwrap();

    let req = engine
        .request_role(NewRoleRequest {
            requester_email: "uma@example.com".into(),
            request_type: RequestType::Chef,
        })
        .await
        .unwrap();

    engine
        .decide_role_request(&admin, req.id, Decision::Reject)
        .await
        .unwrap();
    engine
        .decide_role_request(&admin, req.id, Decision::Approve)
        .await
        .unwrap();

    assert_eq!(engine.role_of("uma@example.com").await.unwrap(), Role::Chef);
}

#[tokio::test]
async fn approving_for_a_missing_user_is_inconsistent_but_terminal() {
    let engine = setup();
    let admin = make_admin(&engine, "admin@example.com").await;

    // request for an email with no directory record
    let req = engine
        .request_role(NewRoleRequest {
            requester_email: "ghost@example.com".into(),
            request_type: RequestType::Chef,
        })
        .await
        .unwrap();

    let err = engine
        .decide_role_request(&admin, req.id, Decision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Inconsistent(_)));

    // the status write still ran
    let stored = engine
        .store()
        .find_request(req.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, RequestStatus::Approved);
}

#[tokio::test]
async fn profile_updates_are_self_scoped() {
    let engine = setup();
    engine.signup(new_user("alice@example.com")).await.unwrap();

    let err = engine
        .update_profile(
            &Identity::new("bob@example.com"),
            "alice@example.com",
            domain::ProfileUpdate {
                name: Some("Hijacked".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine
        .update_profile(
            &Identity::new("alice@example.com"),
            "alice@example.com",
            domain::ProfileUpdate {
                name: Some("Alice B".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let user = engine
        .store()
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.name, "Alice B");
}

#[tokio::test]
async fn empty_profile_update_still_reports_missing_user() {
    let engine = setup();

    let err = engine
        .update_profile(
            &Identity::new("ghost@example.com"),
            "ghost@example.com",
            domain::ProfileUpdate::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));

    engine.signup(new_user("alice@example.com")).await.unwrap();
    engine
        .update_profile(
            &Identity::new("alice@example.com"),
            "alice@example.com",
            domain::ProfileUpdate::default(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn order_queries_are_scoped_and_sorted() {
    let engine = setup();
    engine.signup(new_user("alice@example.com")).await.unwrap();

    engine
        .place_order(draft("meal-1", "alice@example.com", 1))
        .await
        .unwrap();
    engine
        .place_order(draft("meal-2", "alice@example.com", 1))
        .await
        .unwrap();

    let err = engine
        .orders_for_customer(&Identity::new("eve@example.com"), "alice@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let orders = engine
        .orders_for_customer(&Identity::new("alice@example.com"), "alice@example.com")
        .await
        .unwrap();
    assert_eq!(orders.len(), 2);

    let chef_orders = engine
        .orders_for_chef(&ChefId::new("CHEF-7777").unwrap())
        .await
        .unwrap();
    assert_eq!(chef_orders.len(), 2);
}

#[tokio::test]
async fn role_of_defaults_to_user() {
    let engine = setup();
    assert_eq!(
        engine.role_of("nobody@example.com").await.unwrap(),
        Role::User
    );
}
