//! End-to-end exercises of the assembled service.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use peridot::{
    ActionContext, ActionError, Attribute, ConflictStrategy, Constraint, DecisionStage,
    EnforcementError, EvaluationError, EvaluationRequest, FnPolicyAction, Operator, PapError,
    Policy, PolicyType, QueryCondition, RightsManagement, Rule, StaticInformationPoint, Transform,
};
use serde_json::json;

const NODE: &str = "did:example:node";
const USER: &str = "did:example:user";

fn use_request() -> EvaluationRequest {
    EvaluationRequest::new("doc", "use", USER, NODE).with_target("asset/1")
}

#[test]
fn policy_lifecycle_store_retrieve_query_remove() {
    let rm = RightsManagement::in_memory();
    let policy = Policy::new("urn:policy:1")
        .with_assigner(NODE)
        .with_permission(Rule::new("asset/1", "use"));

    rm.pap_store(NODE, policy.clone()).expect("store");
    assert_eq!(rm.pap_retrieve(NODE, "urn:policy:1").expect("retrieve"), policy);

    let page = rm
        .pap_query(
            NODE,
            &[QueryCondition::TargetsAsset("asset/1".to_string())],
            None,
            None,
        )
        .expect("query");
    assert_eq!(page.policies.len(), 1);
    assert!(page.cursor.is_none());

    rm.pap_remove(NODE, "urn:policy:1").expect("remove");
    assert!(matches!(
        rm.pap_retrieve(NODE, "urn:policy:1"),
        Err(PapError::NotFound { .. })
    ));
    assert!(matches!(
        rm.pap_remove(NODE, "urn:policy:1"),
        Err(PapError::NotFound { .. })
    ));
}

#[test]
fn invalid_documents_are_rejected_at_the_boundary() {
    let rm = RightsManagement::in_memory();

    let offer_without_assigner = Policy::new("urn:policy:offer").of_type(PolicyType::Offer);
    assert!(matches!(
        rm.pap_store(NODE, offer_without_assigner),
        Err(PapError::ValidationFailed(_))
    ));

    let agreement_without_parties =
        Policy::new("urn:policy:agreement").of_type(PolicyType::Agreement);
    assert!(matches!(
        rm.pap_store(NODE, agreement_without_parties),
        Err(PapError::ValidationFailed(_))
    ));
}

#[test]
fn intercept_allows_and_returns_transformed_payload() {
    let rm = RightsManagement::in_memory();
    rm.pap_store(
        NODE,
        Policy::new("urn:policy:1").with_permission(
            Rule::new("asset/1", "use")
                .with_transform(Transform::Redact {
                    fields: vec!["owner.mail".to_string()],
                })
                .with_transform(Transform::Remove {
                    fields: vec!["internal_id".to_string()],
                }),
        ),
    )
    .expect("store");

    let request = use_request().with_data(json!({
        "title": "report",
        "owner": {"mail": "a@example.org"},
        "internal_id": 7,
    }));
    let data = rm.intercept(&request).expect("intercept");
    assert_eq!(
        data,
        Some(json!({"title": "report", "owner": {"mail": "***"}}))
    );
}

#[test]
fn intercept_denies_without_policy_detail() {
    let rm = RightsManagement::in_memory();
    rm.pap_store(
        NODE,
        Policy::new("urn:policy:1").with_prohibition(Rule::new("asset/1", "use")),
    )
    .expect("store");

    let err = rm.intercept(&use_request()).expect_err("deny");
    assert!(matches!(err, EnforcementError::AccessDenied));
    assert_eq!(err.to_string(), "access denied");
}

#[test]
fn attributes_flow_from_the_information_point() {
    let pip = StaticInformationPoint::new(vec![Attribute::new("count", 3)]);
    let rm = RightsManagement::new(peridot::MemoryPolicyStore::new(), pip);
    rm.pap_store(
        NODE,
        Policy::new("urn:policy:1").with_permission(
            Rule::new("asset/1", "use").with_constraint(Constraint::new(
                "count",
                Operator::Lteq,
                5,
            )),
        ),
    )
    .expect("store");

    assert!(rm.evaluate(&use_request()).expect("evaluate").is_allowed());
}

#[test]
fn cross_policy_prohibition_denies() {
    let rm = RightsManagement::in_memory();
    rm.pap_store(
        NODE,
        Policy::new("urn:policy:perm")
            .with_conflict(ConflictStrategy::Perm)
            .with_permission(Rule::new("asset/1", "use")),
    )
    .expect("store");
    rm.pap_store(
        NODE,
        Policy::new("urn:policy:proh")
            .with_conflict(ConflictStrategy::Prohibit)
            .with_prohibition(Rule::new("asset/1", "use")),
    )
    .expect("store");

    let verdict = rm.evaluate(&use_request()).expect("evaluate");
    assert!(!verdict.is_allowed());
    assert_eq!(verdict.policies.len(), 2);
}

#[test]
fn invalid_conflict_surfaces_distinctly() {
    let rm = RightsManagement::in_memory();
    rm.pap_store(
        NODE,
        Policy::new("urn:policy:1")
            .with_conflict(ConflictStrategy::Invalid)
            .with_permission(Rule::new("asset/1", "use"))
            .with_prohibition(Rule::new("asset/1", "use")),
    )
    .expect("store");

    assert!(matches!(
        rm.evaluate(&use_request()),
        Err(EvaluationError::ConflictUnresolved { .. })
    ));
    assert!(matches!(
        rm.intercept(&use_request()),
        Err(EnforcementError::Evaluation(
            EvaluationError::ConflictUnresolved { .. }
        ))
    ));
}

#[test]
fn policies_are_node_scoped() {
    let rm = RightsManagement::in_memory();
    rm.pap_store(
        "did:example:other-node",
        Policy::new("urn:policy:1").with_permission(Rule::new("asset/1", "use")),
    )
    .expect("store");

    assert!(!rm.evaluate(&use_request()).expect("evaluate").is_allowed());
    assert!(matches!(
        rm.pap_retrieve(NODE, "urn:policy:1"),
        Err(PapError::NotFound { .. })
    ));
}

#[test]
fn unregistered_obligation_action_is_skipped_not_fatal() {
    let rm = RightsManagement::in_memory();
    rm.pap_store(
        NODE,
        Policy::new("urn:policy:1")
            .with_permission(Rule::new("asset/1", "use"))
            .with_obligation(Rule::for_action("notify")),
    )
    .expect("store");

    // "notify" is never registered; the grant still goes through.
    assert!(rm.intercept(&use_request()).is_ok());
}

#[test]
fn registered_then_unregistered_actions_no_longer_run() {
    let rm = RightsManagement::in_memory();
    rm.pap_store(
        NODE,
        Policy::new("urn:policy:1")
            .with_permission(Rule::new("asset/1", "use"))
            .with_obligation(Rule::for_action("audit")),
    )
    .expect("store");

    let counter = Arc::new(AtomicUsize::new(0));
    let seen = counter.clone();
    rm.register_action(
        "audit",
        DecisionStage::Before,
        Arc::new(FnPolicyAction::new(move |_: &ActionContext| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })),
    );

    rm.intercept(&use_request()).expect("first intercept");
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    rm.unregister_action("audit");
    rm.unregister_action("never-registered");

    rm.intercept(&use_request()).expect("second intercept");
    assert_eq!(counter.load(Ordering::SeqCst), 1, "unregistered action must not run");
}

#[test]
fn failed_before_obligation_blocks_the_grant() {
    let rm = RightsManagement::in_memory();
    rm.pap_store(
        NODE,
        Policy::new("urn:policy:1")
            .with_permission(Rule::new("asset/1", "use"))
            .with_obligation(Rule::for_action("consent")),
    )
    .expect("store");
    rm.register_action(
        "consent",
        DecisionStage::Before,
        Arc::new(FnPolicyAction::new(|_: &ActionContext| {
            Err(ActionError::new("consent record missing"))
        })),
    );

    assert!(matches!(
        rm.intercept(&use_request()),
        Err(EnforcementError::AccessDenied)
    ));
}

#[test]
fn after_obligations_run_without_blocking_the_caller() {
    let rm = RightsManagement::in_memory();
    rm.pap_store(
        NODE,
        Policy::new("urn:policy:1")
            .with_permission(Rule::new("asset/1", "use"))
            .with_obligation(Rule::for_action("notify")),
    )
    .expect("store");

    let (tx, rx) = mpsc::channel();
    rm.register_action(
        "notify",
        DecisionStage::After,
        Arc::new(FnPolicyAction::new(move |ctx: &ActionContext| {
            tx.send(ctx.action.clone())
                .map_err(|_| ActionError::new("receiver gone"))
        })),
    );

    rm.intercept(&use_request()).expect("intercept");
    let action = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("after-stage obligation ran");
    assert_eq!(action, "use");
}

#[test]
fn repeated_evaluation_is_stable() {
    let rm = RightsManagement::in_memory();
    for i in 0..5 {
        rm.pap_store(
            NODE,
            Policy::new(format!("urn:policy:{i}"))
                .with_permission(Rule::new("asset/1", "use")),
        )
        .expect("store");
    }

    let first = rm.evaluate(&use_request()).expect("first");
    let second = rm.evaluate(&use_request()).expect("second");
    assert_eq!(first, second);
    let uids: Vec<&str> = first.policies.iter().map(|p| p.uid.as_str()).collect();
    assert!(uids.windows(2).all(|w| w[0] < w[1]), "uid ordered: {uids:?}");
}
