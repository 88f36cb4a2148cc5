#![forbid(unsafe_code)]

use poliscope_contracts::policy::PolicyId;
use poliscope_contracts::ReasonCodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    FetchFailed,
    FavoriteToggleFailed,
    DeleteFailed,
    StaleLoadDiscarded,
}

/// One swallowed-failure record. These never surface to the user; they
/// exist so the silent paths of the page stay observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub seq: u64,
    pub reason_code: ReasonCodeId,
    pub kind: DiagnosticKind,
    pub policy_id: Option<PolicyId>,
    pub detail: String,
}

pub trait DiagnosticsSink {
    fn record(
        &mut self,
        kind: DiagnosticKind,
        reason_code: ReasonCodeId,
        policy_id: Option<PolicyId>,
        detail: String,
    );
}

/// Append-only in-memory sink with a monotonic sequence.
#[derive(Debug, Clone, Default)]
pub struct MemoryDiagnostics {
    events: Vec<DiagnosticEvent>,
    next_seq: u64,
}

impl MemoryDiagnostics {
    pub fn new_in_memory() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DiagnosticEvent] {
        &self.events
    }
}

impl DiagnosticsSink for MemoryDiagnostics {
    fn record(
        &mut self,
        kind: DiagnosticKind,
        reason_code: ReasonCodeId,
        policy_id: Option<PolicyId>,
        detail: String,
    ) {
        self.next_seq += 1;
        self.events.push(DiagnosticEvent {
            seq: self.next_seq,
            reason_code,
            kind,
            policy_id,
            detail,
        });
    }
}
