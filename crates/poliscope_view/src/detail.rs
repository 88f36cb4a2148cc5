#![forbid(unsafe_code)]

use poliscope_contracts::access::AccessContext;
use poliscope_contracts::policy::{Policy, PolicyId};
use poliscope_contracts::{ContractViolation, ReasonCodeId};
use poliscope_gateway::gateway::PolicyGateway;

use crate::diag::{DiagnosticKind, DiagnosticsSink};
use crate::env::{NavTarget, PageEnvironment};
use crate::render::{render_page, PageRender};

pub mod reason_codes {
    use poliscope_contracts::ReasonCodeId;

    // Detail-view reason-code namespace.
    pub const DETAIL_FETCH_FAILED: ReasonCodeId = ReasonCodeId(0x504C_0101);
    pub const DETAIL_FAVORITE_TOGGLE_FAILED: ReasonCodeId = ReasonCodeId(0x504C_0201);
    pub const DETAIL_DELETE_FAILED: ReasonCodeId = ReasonCodeId(0x504C_0202);
    pub const DETAIL_STALE_LOAD_DISCARDED: ReasonCodeId = ReasonCodeId(0x504C_0301);
}

/// User-facing message for any read failure; the gateway error's
/// content never leaks into it.
pub const GENERIC_FETCH_ERROR: &str = "Failed to fetch policy details. Please try again later.";
pub const POLICY_NOT_FOUND: &str = "Policy not found";
pub const CONFIRM_DELETE_MESSAGE: &str = "Are you sure you want to delete this policy?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailViewConfig {
    pub confirm_delete_message: String,
    pub max_diagnostic_detail: usize,
}

impl DetailViewConfig {
    pub fn mvp_v1() -> Self {
        Self {
            confirm_delete_message: CONFIRM_DELETE_MESSAGE.to_string(),
            max_diagnostic_detail: 240,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadSeq(pub u64);

/// One-shot tag tying a load to the identifier that triggered it. A
/// resolution whose ticket no longer matches the controller's current
/// sequence is discarded instead of overwriting fresher state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    seq: LoadSeq,
    policy_id: PolicyId,
}

impl LoadTicket {
    pub fn seq(&self) -> LoadSeq {
        self.seq
    }

    pub fn policy_id(&self) -> &PolicyId {
        &self.policy_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { policy: Policy, is_favorite: bool },
    NotFound,
    FetchFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResolution {
    Applied,
    DiscardedStale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    NotEligible,
    Favorited,
    Unfavorited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    NotEligible,
    Cancelled,
    Deleted,
    FailedSilently,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewState {
    loading: bool,
    completed: bool,
    policy: Option<Policy>,
    error: Option<String>,
    is_favorite: bool,
}

impl ViewState {
    fn initial() -> Self {
        Self {
            loading: true,
            completed: false,
            policy: None,
            error: None,
            is_favorite: false,
        }
    }
}

/// Borrowed view of the controller's state for the render projection.
#[derive(Debug, Clone, Copy)]
pub struct ViewSnapshot<'a> {
    pub loading: bool,
    pub completed: bool,
    pub policy: Option<&'a Policy>,
    pub error: Option<&'a str>,
    pub is_favorite: bool,
}

/// The detail-page controller. Owns the view state of one page
/// instance and orchestrates reads and mutations against the injected
/// gateway; navigation and confirmation go through the injected
/// environment. Single-threaded by construction.
pub struct DetailViewController<G, E, D>
where
    G: PolicyGateway,
    E: PageEnvironment,
    D: DiagnosticsSink,
{
    config: DetailViewConfig,
    gateway: G,
    env: E,
    diagnostics: D,
    access: AccessContext,
    state: ViewState,
    current_seq: LoadSeq,
}

impl<G, E, D> DetailViewController<G, E, D>
where
    G: PolicyGateway,
    E: PageEnvironment,
    D: DiagnosticsSink,
{
    pub fn new(
        config: DetailViewConfig,
        gateway: G,
        env: E,
        diagnostics: D,
        access: AccessContext,
    ) -> Result<Self, ContractViolation> {
        if config.confirm_delete_message.is_empty() || config.confirm_delete_message.len() > 240 {
            return Err(ContractViolation::InvalidValue {
                field: "detail_view_config.confirm_delete_message",
                reason: "must be within 1..=240 chars",
            });
        }
        if config.max_diagnostic_detail == 0 || config.max_diagnostic_detail > 1024 {
            return Err(ContractViolation::InvalidValue {
                field: "detail_view_config.max_diagnostic_detail",
                reason: "must be within 1..=1024",
            });
        }
        Ok(Self {
            config,
            gateway,
            env,
            diagnostics,
            access,
            state: ViewState::initial(),
            current_seq: LoadSeq(0),
        })
    }

    /// Starts a load cycle: replaces the view state wholesale and
    /// invalidates every outstanding ticket.
    pub fn begin_load(&mut self, policy_id: PolicyId) -> LoadTicket {
        self.current_seq = LoadSeq(self.current_seq.0 + 1);
        self.state = ViewState::initial();
        LoadTicket {
            seq: self.current_seq,
            policy_id,
        }
    }

    /// Runs the gateway reads for a ticket. The favorite check only
    /// happens for a signed-in profile; its failure counts as a fetch
    /// failure, matching the single try/catch of the page.
    pub fn fetch(&mut self, ticket: &LoadTicket) -> LoadOutcome {
        let policy = match self.gateway.get_policy_by_id(&ticket.policy_id) {
            Ok(Some(policy)) => policy,
            Ok(None) => return LoadOutcome::NotFound,
            Err(err) => {
                self.diagnose(
                    DiagnosticKind::FetchFailed,
                    reason_codes::DETAIL_FETCH_FAILED,
                    Some(ticket.policy_id.clone()),
                    err.detail,
                );
                return LoadOutcome::FetchFailed;
            }
        };

        let user_id = match self.access.user_id() {
            Some(user_id) => user_id.clone(),
            None => {
                return LoadOutcome::Loaded {
                    policy,
                    is_favorite: false,
                }
            }
        };
        match self.gateway.is_policy_favorite(&user_id, &ticket.policy_id) {
            Ok(is_favorite) => LoadOutcome::Loaded {
                policy,
                is_favorite,
            },
            Err(err) => {
                self.diagnose(
                    DiagnosticKind::FetchFailed,
                    reason_codes::DETAIL_FETCH_FAILED,
                    Some(ticket.policy_id.clone()),
                    err.detail,
                );
                LoadOutcome::FetchFailed
            }
        }
    }

    /// Applies an outcome if its ticket is still current; stale
    /// resolutions are discarded and recorded, never applied.
    pub fn resolve_load(&mut self, ticket: LoadTicket, outcome: LoadOutcome) -> LoadResolution {
        if ticket.seq != self.current_seq {
            self.diagnose(
                DiagnosticKind::StaleLoadDiscarded,
                reason_codes::DETAIL_STALE_LOAD_DISCARDED,
                Some(ticket.policy_id),
                format!(
                    "seq {} superseded by {}",
                    ticket.seq.0, self.current_seq.0
                ),
            );
            return LoadResolution::DiscardedStale;
        }

        match outcome {
            LoadOutcome::Loaded {
                policy,
                is_favorite,
            } => {
                self.state.policy = Some(policy);
                self.state.is_favorite = is_favorite;
                self.state.error = None;
            }
            LoadOutcome::NotFound => {
                self.state.policy = None;
                self.state.error = None;
            }
            LoadOutcome::FetchFailed => {
                self.state.policy = None;
                self.state.error = Some(GENERIC_FETCH_ERROR.to_string());
            }
        }
        // Single reconcile point for the loading flag, on every path.
        self.state.loading = false;
        self.state.completed = true;
        LoadResolution::Applied
    }

    /// The composed synchronous form: begin, fetch, resolve.
    pub fn load(&mut self, policy_id: PolicyId) -> LoadResolution {
        let ticket = self.begin_load(policy_id);
        let outcome = self.fetch(&ticket);
        self.resolve_load(ticket, outcome)
    }

    /// Flips the favorite flag after the matching gateway call
    /// completes. The flip is unconditional on completion; a gateway
    /// failure is recorded and otherwise swallowed.
    pub fn toggle_favorite(&mut self) -> FavoriteOutcome {
        let user_id = match self.access.user_id() {
            Some(user_id) => user_id.clone(),
            None => return FavoriteOutcome::NotEligible,
        };
        let policy_id = match &self.state.policy {
            Some(policy) => policy.id.clone(),
            None => return FavoriteOutcome::NotEligible,
        };

        let result = if self.state.is_favorite {
            self.gateway.remove_from_favorites(&user_id, &policy_id)
        } else {
            self.gateway.add_to_favorites(&user_id, &policy_id)
        };
        if let Err(err) = result {
            self.diagnose(
                DiagnosticKind::FavoriteToggleFailed,
                reason_codes::DETAIL_FAVORITE_TOGGLE_FAILED,
                Some(policy_id),
                err.detail,
            );
        }

        self.state.is_favorite = !self.state.is_favorite;
        if self.state.is_favorite {
            FavoriteOutcome::Favorited
        } else {
            FavoriteOutcome::Unfavorited
        }
    }

    /// Deletes the loaded policy after an explicit confirmation, then
    /// leaves for the list view. Declining performs no gateway call; a
    /// gateway failure is recorded and the page stays put.
    pub fn delete_policy(&mut self) -> DeleteOutcome {
        if self.access.profile.is_none() {
            return DeleteOutcome::NotEligible;
        }
        let policy_id = match &self.state.policy {
            Some(policy) => policy.id.clone(),
            None => return DeleteOutcome::NotEligible,
        };

        let message = self.config.confirm_delete_message.clone();
        if !self.env.confirm(&message) {
            return DeleteOutcome::Cancelled;
        }

        match self.gateway.delete_policy(&policy_id) {
            Ok(()) => {
                self.env.navigate(NavTarget::PolicyList);
                DeleteOutcome::Deleted
            }
            Err(err) => {
                self.diagnose(
                    DiagnosticKind::DeleteFailed,
                    reason_codes::DETAIL_DELETE_FAILED,
                    Some(policy_id),
                    err.detail,
                );
                DeleteOutcome::FailedSilently
            }
        }
    }

    /// Leaves the page without touching view state.
    pub fn navigate_back_to_list(&mut self) {
        self.env.navigate(NavTarget::PolicyList);
    }

    pub fn navigate_to_edit(&mut self) {
        if let Some(policy) = &self.state.policy {
            let target = NavTarget::PolicyEdit(policy.id.clone());
            self.env.navigate(target);
        }
    }

    pub fn navigate_to_purchase(&mut self) {
        if let Some(policy) = &self.state.policy {
            let target = NavTarget::PolicyPurchase(policy.id.clone());
            self.env.navigate(target);
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot<'_> {
        ViewSnapshot {
            loading: self.state.loading,
            completed: self.state.completed,
            policy: self.state.policy.as_ref(),
            error: self.state.error.as_deref(),
            is_favorite: self.state.is_favorite,
        }
    }

    pub fn render(&self) -> PageRender {
        render_page(&self.snapshot(), &self.access)
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn is_favorite(&self) -> bool {
        self.state.is_favorite
    }

    pub fn policy(&self) -> Option<&Policy> {
        self.state.policy.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn access(&self) -> &AccessContext {
        &self.access
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn diagnose(
        &mut self,
        kind: DiagnosticKind,
        reason_code: ReasonCodeId,
        policy_id: Option<PolicyId>,
        detail: String,
    ) {
        let bounded: String = detail
            .chars()
            .take(self.config.max_diagnostic_detail)
            .collect();
        self.diagnostics.record(kind, reason_code, policy_id, bounded);
    }
}
