#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use poliscope_contracts::access::UserId;
use poliscope_contracts::policy::{Policy, PolicyId};

use crate::gateway::{GatewayError, GatewayErrorKind, PolicyGateway};

/// Deterministic in-memory rendition of the policy service. Backs the
/// integration tests and offline use; iteration order is stable by
/// construction (BTree keys).
#[derive(Debug, Clone, Default)]
pub struct MemoryPolicyGateway {
    policies: BTreeMap<String, Policy>,
    favorites: BTreeSet<(String, String)>,
    fail_next: Option<(Option<&'static str>, GatewayErrorKind)>,
    calls: Vec<String>,
}

impl MemoryPolicyGateway {
    pub fn new_in_memory() -> Self {
        Self::default()
    }

    pub fn insert_policy(&mut self, policy: Policy) {
        self.policies.insert(policy.id.as_str().to_string(), policy);
    }

    pub fn seed_favorite(&mut self, user_id: &UserId, policy_id: &PolicyId) {
        self.favorites.insert((
            user_id.as_str().to_string(),
            policy_id.as_str().to_string(),
        ));
    }

    /// Makes the next gateway call fail with the given kind, once.
    pub fn fail_next(&mut self, kind: GatewayErrorKind) {
        self.fail_next = Some((None, kind));
    }

    /// Makes the next call to the named operation fail, once; calls to
    /// other operations pass through untouched.
    pub fn fail_next_on(&mut self, op: &'static str, kind: GatewayErrorKind) {
        self.fail_next = Some((Some(op), kind));
    }

    pub fn contains_policy(&self, id: &PolicyId) -> bool {
        self.policies.contains_key(id.as_str())
    }

    pub fn is_favorited(&self, user_id: &UserId, policy_id: &PolicyId) -> bool {
        self.favorites.contains(&(
            user_id.as_str().to_string(),
            policy_id.as_str().to_string(),
        ))
    }

    /// Call journal for tests: one entry per gateway invocation, in
    /// order, e.g. "add_to_favorites u_1 p1".
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn take_injected_failure(&mut self, op: &str) -> Result<(), GatewayError> {
        if let Some((target, kind)) = self.fail_next {
            if target.map_or(true, |t| t == op) {
                self.fail_next = None;
                return Err(GatewayError::new(kind, format!("injected failure in {op}")));
            }
        }
        Ok(())
    }
}

impl PolicyGateway for MemoryPolicyGateway {
    fn get_policy_by_id(&mut self, id: &PolicyId) -> Result<Option<Policy>, GatewayError> {
        self.calls.push(format!("get_policy_by_id {}", id.as_str()));
        self.take_injected_failure("get_policy_by_id")?;
        Ok(self.policies.get(id.as_str()).cloned())
    }

    fn is_policy_favorite(
        &mut self,
        user_id: &UserId,
        policy_id: &PolicyId,
    ) -> Result<bool, GatewayError> {
        self.calls.push(format!(
            "is_policy_favorite {} {}",
            user_id.as_str(),
            policy_id.as_str()
        ));
        self.take_injected_failure("is_policy_favorite")?;
        Ok(self.is_favorited(user_id, policy_id))
    }

    fn add_to_favorites(
        &mut self,
        user_id: &UserId,
        policy_id: &PolicyId,
    ) -> Result<(), GatewayError> {
        self.calls.push(format!(
            "add_to_favorites {} {}",
            user_id.as_str(),
            policy_id.as_str()
        ));
        self.take_injected_failure("add_to_favorites")?;
        self.favorites.insert((
            user_id.as_str().to_string(),
            policy_id.as_str().to_string(),
        ));
        Ok(())
    }

    fn remove_from_favorites(
        &mut self,
        user_id: &UserId,
        policy_id: &PolicyId,
    ) -> Result<(), GatewayError> {
        self.calls.push(format!(
            "remove_from_favorites {} {}",
            user_id.as_str(),
            policy_id.as_str()
        ));
        self.take_injected_failure("remove_from_favorites")?;
        self.favorites.remove(&(
            user_id.as_str().to_string(),
            policy_id.as_str().to_string(),
        ));
        Ok(())
    }

    fn delete_policy(&mut self, policy_id: &PolicyId) -> Result<(), GatewayError> {
        self.calls
            .push(format!("delete_policy {}", policy_id.as_str()));
        self.take_injected_failure("delete_policy")?;
        self.policies.remove(policy_id.as_str());
        self.favorites
            .retain(|(_, fav_policy)| fav_policy.as_str() != policy_id.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(id: &str) -> Policy {
        Policy::v1(
            PolicyId::new(id).unwrap(),
            "Acme Life".to_string(),
            "Term Life".to_string(),
            Some(12_000),
            Some(500_000),
            None,
            None,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            None,
            Vec::new(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn at_memgw_01_get_returns_seeded_record() {
        let mut gw = MemoryPolicyGateway::new_in_memory();
        gw.insert_policy(policy("p1"));
        let got = gw.get_policy_by_id(&PolicyId::new("p1").unwrap()).unwrap();
        assert_eq!(got.unwrap().provider, "Acme Life");
        assert!(gw
            .get_policy_by_id(&PolicyId::new("missing").unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn at_memgw_02_favorite_roundtrip() {
        let mut gw = MemoryPolicyGateway::new_in_memory();
        gw.insert_policy(policy("p1"));
        let user = UserId::new("u_1").unwrap();
        let pid = PolicyId::new("p1").unwrap();
        assert!(!gw.is_policy_favorite(&user, &pid).unwrap());
        gw.add_to_favorites(&user, &pid).unwrap();
        assert!(gw.is_policy_favorite(&user, &pid).unwrap());
        gw.remove_from_favorites(&user, &pid).unwrap();
        assert!(!gw.is_policy_favorite(&user, &pid).unwrap());
    }

    #[test]
    fn at_memgw_03_delete_drops_record_and_favorite_rows() {
        let mut gw = MemoryPolicyGateway::new_in_memory();
        gw.insert_policy(policy("p1"));
        let user = UserId::new("u_1").unwrap();
        let pid = PolicyId::new("p1").unwrap();
        gw.add_to_favorites(&user, &pid).unwrap();
        gw.delete_policy(&pid).unwrap();
        assert!(!gw.contains_policy(&pid));
        assert!(!gw.is_favorited(&user, &pid));
    }

    #[test]
    fn at_memgw_04_injected_failure_fires_once() {
        let mut gw = MemoryPolicyGateway::new_in_memory();
        gw.insert_policy(policy("p1"));
        let pid = PolicyId::new("p1").unwrap();
        gw.fail_next(GatewayErrorKind::Timeout);
        let err = gw.get_policy_by_id(&pid).unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::Timeout);
        assert!(gw.get_policy_by_id(&pid).unwrap().is_some());
    }
}
