#![forbid(unsafe_code)]

use std::collections::VecDeque;

use poliscope_contracts::policy::PolicyId;

/// Navigation targets the page can leave to. Paths mirror the
/// dashboard's routing convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    PolicyList,
    PolicyEdit(PolicyId),
    PolicyPurchase(PolicyId),
}

impl NavTarget {
    pub fn path(&self) -> String {
        match self {
            NavTarget::PolicyList => "/dashboard/policies".to_string(),
            NavTarget::PolicyEdit(id) => format!("/dashboard/policies/{}/edit", id.as_str()),
            NavTarget::PolicyPurchase(id) => {
                format!("/dashboard/policies/{}/purchase", id.as_str())
            }
        }
    }
}

/// Environment capabilities the hosting runtime provides: page-to-page
/// navigation and a blocking confirmation prompt. Injected so the
/// controller stays testable without a UI runtime.
pub trait PageEnvironment {
    fn navigate(&mut self, target: NavTarget);

    fn confirm(&mut self, message: &str) -> bool;
}

/// Test double: records navigations and prompts, answers confirmations
/// from a queue (defaulting to "no" when the queue runs dry).
#[derive(Debug, Clone, Default)]
pub struct ScriptedEnvironment {
    confirm_answers: VecDeque<bool>,
    navigations: Vec<NavTarget>,
    prompts: Vec<String>,
}

impl ScriptedEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_confirm_answer(&mut self, answer: bool) {
        self.confirm_answers.push_back(answer);
    }

    pub fn navigations(&self) -> &[NavTarget] {
        &self.navigations
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl PageEnvironment for ScriptedEnvironment {
    fn navigate(&mut self, target: NavTarget) {
        self.navigations.push(target);
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.confirm_answers.pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_env_01_nav_paths_follow_dashboard_convention() {
        let id = PolicyId::new("p1").unwrap();
        assert_eq!(NavTarget::PolicyList.path(), "/dashboard/policies");
        assert_eq!(
            NavTarget::PolicyEdit(id.clone()).path(),
            "/dashboard/policies/p1/edit"
        );
        assert_eq!(
            NavTarget::PolicyPurchase(id).path(),
            "/dashboard/policies/p1/purchase"
        );
    }

    #[test]
    fn at_env_02_scripted_confirm_defaults_to_decline() {
        let mut env = ScriptedEnvironment::new();
        assert!(!env.confirm("sure?"));
        env.push_confirm_answer(true);
        assert!(env.confirm("sure?"));
        assert_eq!(env.prompts().len(), 2);
    }
}
