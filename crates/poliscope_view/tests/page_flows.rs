#![forbid(unsafe_code)]

use poliscope_contracts::access::{AccessContext, Role, UserId, UserProfile};
use poliscope_contracts::policy::{Eligibility, Policy, PolicyId};
use poliscope_gateway::gateway::GatewayErrorKind;
use poliscope_gateway::memory::MemoryPolicyGateway;
use poliscope_view::detail::{
    DeleteOutcome, DetailViewConfig, DetailViewController, FavoriteOutcome, GENERIC_FETCH_ERROR,
    POLICY_NOT_FOUND,
};
use poliscope_view::diag::{DiagnosticKind, MemoryDiagnostics};
use poliscope_view::env::{NavTarget, ScriptedEnvironment};
use poliscope_view::render::{PageAction, PageRender};

fn acme_policy() -> Policy {
    Policy::v1(
        PolicyId::new("p1").unwrap(),
        "Acme".to_string(),
        "Term Life".to_string(),
        Some(12_000),
        Some(500_000),
        None,
        Some(9_850),
        vec!["Accident cover".to_string(), "Tax benefit".to_string()],
        Vec::new(),
        vec!["Pre-existing conditions".to_string()],
        Some(Eligibility::v1(18, 65, 300_000).unwrap()),
        vec!["Family protection".to_string()],
        None,
    )
    .unwrap()
}

fn signed_in(role: Role) -> AccessContext {
    AccessContext::signed_in(UserProfile::v1(UserId::new("u_1").unwrap(), role))
}

fn page(
    gateway: MemoryPolicyGateway,
    access: AccessContext,
) -> DetailViewController<MemoryPolicyGateway, ScriptedEnvironment, MemoryDiagnostics> {
    DetailViewController::new(
        DetailViewConfig::mvp_v1(),
        gateway,
        ScriptedEnvironment::new(),
        MemoryDiagnostics::new_in_memory(),
        access,
    )
    .unwrap()
}

#[test]
fn at_flow_01_acme_scenario_renders_formatted_fields() {
    let mut gw = MemoryPolicyGateway::new_in_memory();
    gw.insert_policy(acme_policy());
    let mut c = page(gw, signed_in(Role::User));
    c.load(PolicyId::new("p1").unwrap());

    let PageRender::Loaded(view) = c.render() else {
        panic!("expected loaded page");
    };
    assert_eq!(view.provider, "Acme");
    assert_eq!(view.premium_display, "\u{20b9}12,000");
    assert_eq!(view.coverage_display, "\u{20b9}5,00,000");
    assert_eq!(view.term_display, "N/A");
}

#[test]
fn at_flow_02_missing_policy_offers_back_to_list() {
    let gw = MemoryPolicyGateway::new_in_memory();
    let mut c = page(gw, signed_in(Role::User));
    c.load(PolicyId::new("missing").unwrap());

    let PageRender::NotFound { message, actions } = c.render() else {
        panic!("expected not-found page");
    };
    assert_eq!(message, POLICY_NOT_FOUND);
    assert_eq!(actions, vec![PageAction::BackToList]);

    c.navigate_back_to_list();
    assert_eq!(c.environment().navigations(), &[NavTarget::PolicyList]);
}

#[test]
fn at_flow_03_gateway_error_renders_generic_message() {
    let mut gw = MemoryPolicyGateway::new_in_memory();
    gw.insert_policy(acme_policy());
    gw.fail_next(GatewayErrorKind::Transport);
    let mut c = page(gw, signed_in(Role::User));
    c.load(PolicyId::new("p1").unwrap());

    let PageRender::Error { message, .. } = c.render() else {
        panic!("expected error page");
    };
    assert_eq!(message, GENERIC_FETCH_ERROR);
}

#[test]
fn at_flow_04_toggle_adds_favorite_once_and_sets_flag() {
    let mut gw = MemoryPolicyGateway::new_in_memory();
    gw.insert_policy(acme_policy());
    let mut c = page(gw, signed_in(Role::User));
    c.load(PolicyId::new("p1").unwrap());
    assert!(!c.is_favorite());

    assert_eq!(c.toggle_favorite(), FavoriteOutcome::Favorited);
    assert!(c.is_favorite());
    let adds = c
        .gateway()
        .calls()
        .iter()
        .filter(|call| call.as_str() == "add_to_favorites u_1 p1")
        .count();
    assert_eq!(adds, 1);
    assert!(c.gateway().is_favorited(
        &UserId::new("u_1").unwrap(),
        &PolicyId::new("p1").unwrap()
    ));
}

#[test]
fn at_flow_05_delete_without_confirmation_is_inert() {
    let mut gw = MemoryPolicyGateway::new_in_memory();
    gw.insert_policy(acme_policy());
    let mut c = page(gw, signed_in(Role::Insurer));
    c.load(PolicyId::new("p1").unwrap());
    let calls_before = c.gateway().calls().len();

    assert_eq!(c.delete_policy(), DeleteOutcome::Cancelled);
    assert_eq!(c.gateway().calls().len(), calls_before);
    assert!(c.environment().navigations().is_empty());
    assert!(c.gateway().contains_policy(&PolicyId::new("p1").unwrap()));
}

#[test]
fn at_flow_06_role_gates_edit_and_delete_controls() {
    let mut gw = MemoryPolicyGateway::new_in_memory();
    gw.insert_policy(acme_policy());
    let mut insurer = page(gw.clone(), signed_in(Role::Insurer));
    insurer.load(PolicyId::new("p1").unwrap());
    let PageRender::Loaded(insurer_view) = insurer.render() else {
        panic!("expected loaded page");
    };
    assert!(insurer_view.actions.contains(&PageAction::Edit));
    assert!(insurer_view.actions.contains(&PageAction::Delete));

    let mut user = page(gw, signed_in(Role::User));
    user.load(PolicyId::new("p1").unwrap());
    let PageRender::Loaded(user_view) = user.render() else {
        panic!("expected loaded page");
    };
    assert!(!user_view.actions.contains(&PageAction::Edit));
    assert!(!user_view.actions.contains(&PageAction::Delete));
}

#[test]
fn at_flow_07_deleted_policy_leaves_for_list_view() {
    let mut gw = MemoryPolicyGateway::new_in_memory();
    gw.insert_policy(acme_policy());
    let mut c = page(gw, signed_in(Role::Insurer));
    c.load(PolicyId::new("p1").unwrap());
    c.environment_mut().push_confirm_answer(true);

    assert_eq!(c.delete_policy(), DeleteOutcome::Deleted);
    assert_eq!(c.environment().navigations(), &[NavTarget::PolicyList]);
    assert!(!c.gateway().contains_policy(&PolicyId::new("p1").unwrap()));
}

#[test]
fn at_flow_08_identifier_change_reloads_and_discards_stale_state() {
    let mut gw = MemoryPolicyGateway::new_in_memory();
    gw.insert_policy(acme_policy());
    let second = Policy::v1(
        PolicyId::new("p2").unwrap(),
        "Zen Assurance".to_string(),
        "Term Life".to_string(),
        Some(8_000),
        None,
        Some(10),
        None,
        Vec::new(),
        Vec::new(),
        Vec::new(),
        None,
        Vec::new(),
        None,
    )
    .unwrap();
    gw.insert_policy(second);

    let mut c = page(gw, signed_in(Role::User));
    let stale = c.begin_load(PolicyId::new("p1").unwrap());
    let stale_outcome = c.fetch(&stale);
    let fresh = c.begin_load(PolicyId::new("p2").unwrap());
    let fresh_outcome = c.fetch(&fresh);
    c.resolve_load(fresh, fresh_outcome);
    c.resolve_load(stale, stale_outcome);

    assert_eq!(c.policy().unwrap().provider, "Zen Assurance");
    assert_eq!(
        c.diagnostics()
            .events()
            .iter()
            .filter(|e| e.kind == DiagnosticKind::StaleLoadDiscarded)
            .count(),
        1
    );
}

#[test]
fn at_flow_09_purchase_navigation_targets_loaded_policy() {
    let mut gw = MemoryPolicyGateway::new_in_memory();
    gw.insert_policy(acme_policy());
    let mut c = page(gw, signed_in(Role::User));
    c.load(PolicyId::new("p1").unwrap());
    c.navigate_to_purchase();
    assert_eq!(
        c.environment().navigations()[0].path(),
        "/dashboard/policies/p1/purchase"
    );
}
