#![forbid(unsafe_code)]

use poliscope_contracts::access::{AccessContext, Role};
use poliscope_contracts::policy::{Eligibility, Policy, POLICY_CONTRACT_VERSION};
use poliscope_contracts::ContractViolation;

use crate::detail::{ViewSnapshot, POLICY_NOT_FOUND};

pub const PAGE_ALLOWED_ROLES: [Role; 3] = [Role::User, Role::Insurer, Role::Admin];

pub const NO_BENEFITS_LISTED: &str = "No benefits listed";
pub const NO_ADD_ONS_AVAILABLE: &str = "No add-ons available";
pub const NO_EXCLUSIONS_LISTED: &str = "No exclusions listed";
pub const NO_GOALS_SPECIFIED: &str = "No goals specified";
pub const NO_FLEXIBILITY_SPECIFIED: &str = "No flexibility features specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageAction {
    BackToList,
    ToggleFavorite,
    Edit,
    Delete,
    Share,
    Download,
    Purchase,
}

/// The mutually-exclusive render branch. Exactly one applies to a page
/// instance at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRender {
    Loading,
    Error {
        message: String,
        actions: Vec<PageAction>,
    },
    NotFound {
        message: String,
        actions: Vec<PageAction>,
    },
    AccessDenied,
    Loaded(PolicyView),
}

/// Display projection of a loaded policy: every field is a final
/// string, absences already rendered as "N/A" or the section's
/// empty-state line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyView {
    pub provider: String,
    pub policy_type: String,
    pub premium_display: String,
    pub coverage_display: String,
    pub term_display: String,
    pub claim_settlement_display: String,
    pub benefit_lines: Vec<String>,
    pub add_on_lines: Vec<String>,
    pub exclusion_lines: Vec<String>,
    pub goal_lines: Vec<String>,
    pub flexibility_lines: Vec<String>,
    pub age_range_display: String,
    pub min_income_display: String,
    pub is_favorite: bool,
    pub actions: Vec<PageAction>,
}

/// Groups digits the Indian way: last three, then pairs
/// ("1234567" -> "12,34,567").
pub fn format_inr_grouped(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<String> = Vec::new();
    let head_bytes = head.as_bytes();
    let mut i = head_bytes.len();
    while i > 0 {
        let start = i.saturating_sub(2);
        groups.push(head[start..i].to_string());
        i = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

pub fn rupees_display(value: Option<u64>) -> String {
    match value {
        Some(v) => format!("\u{20b9}{}", format_inr_grouped(v)),
        None => "N/A".to_string(),
    }
}

pub fn term_display(term_years: Option<u16>) -> String {
    match term_years {
        Some(years) => format!("{years} years"),
        None => "N/A".to_string(),
    }
}

/// Basis points to a percent string: 9850 -> "98.5%", 9800 -> "98%".
pub fn claim_settlement_display(bp: Option<u16>) -> String {
    let Some(bp) = bp else {
        return "N/A".to_string();
    };
    let whole = bp / 100;
    let frac = bp % 100;
    if frac == 0 {
        format!("{whole}%")
    } else if frac % 10 == 0 {
        format!("{whole}.{}%", frac / 10)
    } else {
        format!("{whole}.{frac:02}%")
    }
}

pub fn age_range_display(eligibility: Option<&Eligibility>) -> String {
    match eligibility {
        Some(e) => format!("{} - {} years", e.min_age, e.max_age),
        None => "N/A".to_string(),
    }
}

pub fn min_income_display(eligibility: Option<&Eligibility>) -> String {
    match eligibility {
        Some(e) => format!("\u{20b9}{}/year", format_inr_grouped(e.min_income)),
        None => "N/A".to_string(),
    }
}

fn lines_or(entries: &[String], empty_line: &str) -> Vec<String> {
    if entries.is_empty() {
        vec![empty_line.to_string()]
    } else {
        entries.to_vec()
    }
}

fn flexibility_lines(policy: &Policy) -> Vec<String> {
    match &policy.flexibility {
        None => vec![NO_FLEXIBILITY_SPECIFIED.to_string()],
        Some(f) => {
            let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
            vec![
                format!("Length: {} years", f.length_years),
                format!("Portability: {}", yes_no(f.portability)),
                format!("Partial Withdrawal: {}", yes_no(f.partial_withdrawal)),
                format!("Top-up: {}", yes_no(f.top_up)),
            ]
        }
    }
}

/// Controls offered on the loaded page. Edit and delete are the
/// insurer's alone; the favorite star needs a signed-in identity.
pub fn available_actions(role: Role) -> Vec<PageAction> {
    let mut actions = vec![PageAction::BackToList, PageAction::ToggleFavorite];
    if role == Role::Insurer {
        actions.push(PageAction::Edit);
        actions.push(PageAction::Delete);
    }
    actions.push(PageAction::Share);
    actions.push(PageAction::Download);
    actions.push(PageAction::Purchase);
    actions
}

pub fn render_page(snapshot: &ViewSnapshot<'_>, access: &AccessContext) -> PageRender {
    if snapshot.loading || !snapshot.completed {
        return PageRender::Loading;
    }
    if let Some(message) = snapshot.error {
        return PageRender::Error {
            message: message.to_string(),
            actions: vec![PageAction::BackToList],
        };
    }
    let Some(policy) = snapshot.policy else {
        return PageRender::NotFound {
            message: POLICY_NOT_FOUND.to_string(),
            actions: vec![PageAction::BackToList],
        };
    };

    // The loaded markup sits behind the role guard; the transient
    // branches above render for anyone who reached the route.
    let Some(role) = access.role() else {
        return PageRender::AccessDenied;
    };
    if !PAGE_ALLOWED_ROLES.contains(&role) {
        return PageRender::AccessDenied;
    }

    PageRender::Loaded(PolicyView {
        provider: policy.provider.clone(),
        policy_type: policy.policy_type.clone(),
        premium_display: rupees_display(policy.premium),
        coverage_display: rupees_display(policy.coverage),
        term_display: term_display(policy.term_years),
        claim_settlement_display: claim_settlement_display(policy.claim_settlement_bp),
        benefit_lines: lines_or(&policy.benefits, NO_BENEFITS_LISTED),
        add_on_lines: lines_or(&policy.add_ons, NO_ADD_ONS_AVAILABLE),
        exclusion_lines: lines_or(&policy.exclusions, NO_EXCLUSIONS_LISTED),
        goal_lines: lines_or(&policy.goals, NO_GOALS_SPECIFIED),
        flexibility_lines: flexibility_lines(policy),
        age_range_display: age_range_display(policy.eligibility.as_ref()),
        min_income_display: min_income_display(policy.eligibility.as_ref()),
        is_favorite: snapshot.is_favorite,
        actions: available_actions(role),
    })
}

/// Payload for the download affordance: the record as pretty JSON,
/// stamped with the contract version it was serialized under.
pub fn policy_export_json(policy: &Policy) -> Result<String, ContractViolation> {
    let payload = serde_json::json!({
        "schema_version": POLICY_CONTRACT_VERSION.0,
        "policy": policy,
    });
    serde_json::to_string_pretty(&payload).map_err(|_| ContractViolation::InvalidValue {
        field: "policy_export",
        reason: "record did not serialize",
    })
}

/// Path for the share affordance.
pub fn share_path(policy: &Policy) -> String {
    format!("/dashboard/policies/{}", policy.id.as_str())
}
