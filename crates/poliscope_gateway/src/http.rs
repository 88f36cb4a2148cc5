#![forbid(unsafe_code)]

use std::time::Duration;

use serde_json::Value;

use poliscope_contracts::access::UserId;
use poliscope_contracts::policy::{
    Eligibility, Flexibility, Policy, PolicyId, MAX_ELIGIBILITY_AGE,
};
use poliscope_contracts::ContractViolation;

use crate::gateway::{GatewayError, GatewayErrorKind, PolicyGateway};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    pub timeout_ms: u32,
    pub user_agent: String,
}

impl HttpGatewayConfig {
    pub fn mvp_v1(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: 10_000,
            user_agent: "poliscope/0.1".to_string(),
        }
    }
}

/// Blocking HTTP rendition of the policy service. Routes follow the
/// comparison service's REST surface; a 404 on the policy read is a
/// well-formed empty result, not an error.
pub struct HttpPolicyGateway {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpPolicyGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        if config.timeout_ms == 0 {
            return Err(GatewayError::new(
                GatewayErrorKind::Config,
                "timeout_ms must be > 0",
            ));
        }
        if config.base_url.is_empty() {
            return Err(GatewayError::new(
                GatewayErrorKind::Config,
                "base_url must be non-empty",
            ));
        }
        let timeout = Duration::from_millis(u64::from(config.timeout_ms).max(100));
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(&config.user_agent)
            .build();
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            agent,
        })
    }

    fn policy_url(&self, id: &PolicyId) -> String {
        format!("{}/policies/{}", self.base_url, id.as_str())
    }

    fn favorite_url(&self, user_id: &UserId, policy_id: &PolicyId) -> String {
        format!(
            "{}/favorites/{}/{}",
            self.base_url,
            user_id.as_str(),
            policy_id.as_str()
        )
    }
}

impl PolicyGateway for HttpPolicyGateway {
    fn get_policy_by_id(&mut self, id: &PolicyId) -> Result<Option<Policy>, GatewayError> {
        let response = match self.agent.get(&self.policy_url(id)).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(err) => return Err(gateway_error_from_ureq(err)),
        };
        let body: Value = serde_json::from_reader(response.into_reader())
            .map_err(|e| GatewayError::decode(format!("policy body: {e}")))?;
        decode_policy_value(&body).map(Some)
    }

    fn is_policy_favorite(
        &mut self,
        user_id: &UserId,
        policy_id: &PolicyId,
    ) -> Result<bool, GatewayError> {
        let response = self
            .agent
            .get(&self.favorite_url(user_id, policy_id))
            .call()
            .map_err(gateway_error_from_ureq)?;
        let body: Value = serde_json::from_reader(response.into_reader())
            .map_err(|e| GatewayError::decode(format!("favorite body: {e}")))?;
        body.get("favorite")
            .and_then(Value::as_bool)
            .ok_or_else(|| GatewayError::decode("favorite body: missing boolean 'favorite'"))
    }

    fn add_to_favorites(
        &mut self,
        user_id: &UserId,
        policy_id: &PolicyId,
    ) -> Result<(), GatewayError> {
        self.agent
            .put(&self.favorite_url(user_id, policy_id))
            .call()
            .map_err(gateway_error_from_ureq)?;
        Ok(())
    }

    fn remove_from_favorites(
        &mut self,
        user_id: &UserId,
        policy_id: &PolicyId,
    ) -> Result<(), GatewayError> {
        self.agent
            .delete(&self.favorite_url(user_id, policy_id))
            .call()
            .map_err(gateway_error_from_ureq)?;
        Ok(())
    }

    fn delete_policy(&mut self, policy_id: &PolicyId) -> Result<(), GatewayError> {
        self.agent
            .delete(&self.policy_url(policy_id))
            .call()
            .map_err(gateway_error_from_ureq)?;
        Ok(())
    }
}

fn gateway_error_from_ureq(err: ureq::Error) -> GatewayError {
    match err {
        ureq::Error::Status(status, _) => GatewayError::new(
            GatewayErrorKind::NonSuccessStatus(status),
            format!("http status {status}"),
        ),
        ureq::Error::Transport(transport) => {
            let combined = format!("{:?} {}", transport.kind(), transport);
            if combined.to_ascii_lowercase().contains("timeout") {
                GatewayError::timeout(combined)
            } else {
                GatewayError::transport(combined)
            }
        }
    }
}

fn contract_decode(violation: ContractViolation) -> GatewayError {
    GatewayError::decode(format!("policy contract: {violation:?}"))
}

fn opt_u64(obj: &serde_json::Map<String, Value>, key: &str) -> Option<u64> {
    obj.get(key).and_then(Value::as_u64)
}

/// Checked narrowing for decoded numerics; an out-of-bounds value is a
/// decode error, never a silent wrap.
fn bounded_u16(value: u64, max: u16, field: &str) -> Result<u16, GatewayError> {
    if value > u64::from(max) {
        return Err(GatewayError::decode(format!(
            "'{field}' must be <= {max}"
        )));
    }
    Ok(value as u16)
}

fn string_list(
    obj: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Vec<String>, GatewayError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| GatewayError::decode(format!("'{key}' entries must be strings")))
            })
            .collect(),
        Some(_) => Err(GatewayError::decode(format!("'{key}' must be an array"))),
    }
}

/// Field-by-field decode of the service's policy JSON (camelCase keys,
/// per the comparison service). Missing numerics decode to `None`;
/// structural mismatches are decode errors.
pub fn decode_policy_value(value: &Value) -> Result<Policy, GatewayError> {
    let obj = value
        .as_object()
        .ok_or_else(|| GatewayError::decode("policy body must be a JSON object"))?;

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::decode("'id' must be a string"))?;
    let provider = obj
        .get("provider")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::decode("'provider' must be a string"))?;
    let policy_type = obj
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let claim_settlement_bp = match obj.get("claimSettlementRatio") {
        None | Some(Value::Null) => None,
        Some(v) => {
            let ratio = v
                .as_f64()
                .ok_or_else(|| GatewayError::decode("'claimSettlementRatio' must be a number"))?;
            if !(0.0..=100.0).contains(&ratio) {
                return Err(GatewayError::decode(
                    "'claimSettlementRatio' must be within 0..=100",
                ));
            }
            Some((ratio * 100.0).round() as u16)
        }
    };

    let term_years = match opt_u64(obj, "term") {
        Some(term) if term >= 1 && term <= 100 => Some(term as u16),
        Some(_) => return Err(GatewayError::decode("'term' must be within 1..=100")),
        None => None,
    };

    let eligibility = match obj.get("eligibility") {
        None | Some(Value::Null) => None,
        Some(Value::Object(e)) => {
            let min_age = opt_u64(e, "minAge")
                .ok_or_else(|| GatewayError::decode("'eligibility.minAge' must be a number"))?;
            let max_age = opt_u64(e, "maxAge")
                .ok_or_else(|| GatewayError::decode("'eligibility.maxAge' must be a number"))?;
            let min_age = bounded_u16(min_age, MAX_ELIGIBILITY_AGE, "eligibility.minAge")?;
            let max_age = bounded_u16(max_age, MAX_ELIGIBILITY_AGE, "eligibility.maxAge")?;
            let min_income = opt_u64(e, "minIncome").unwrap_or(0);
            Some(Eligibility::v1(min_age, max_age, min_income).map_err(contract_decode)?)
        }
        Some(_) => return Err(GatewayError::decode("'eligibility' must be an object")),
    };

    let flexibility = match obj.get("flexibility") {
        None | Some(Value::Null) => None,
        Some(Value::Object(f)) => Some(
            Flexibility::v1(
                bounded_u16(opt_u64(f, "length").unwrap_or(0), 100, "flexibility.length")?,
                f.get("portability").and_then(Value::as_bool).unwrap_or(false),
                f.get("partialWithdrawal")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                f.get("topUp").and_then(Value::as_bool).unwrap_or(false),
            )
            .map_err(contract_decode)?,
        ),
        Some(_) => return Err(GatewayError::decode("'flexibility' must be an object")),
    };

    Policy::v1(
        PolicyId::new(id).map_err(contract_decode)?,
        provider.to_string(),
        policy_type.to_string(),
        opt_u64(obj, "premium"),
        opt_u64(obj, "coverage"),
        term_years,
        claim_settlement_bp,
        string_list(obj, "benefits")?,
        string_list(obj, "addOns")?,
        string_list(obj, "exclusions")?,
        eligibility,
        string_list(obj, "goals")?,
        flexibility,
    )
    .map_err(contract_decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_httpgw_01_full_policy_decodes() {
        let body: Value = serde_json::from_str(
            r#"{
                "id": "p1",
                "provider": "Acme",
                "type": "Term Life",
                "premium": 12000,
                "coverage": 500000,
                "term": 20,
                "claimSettlementRatio": 98.5,
                "benefits": ["Accident cover"],
                "addOns": ["Critical illness rider"],
                "exclusions": ["Pre-existing conditions"],
                "eligibility": {"minAge": 18, "maxAge": 65, "minIncome": 300000},
                "goals": ["Family protection"],
                "flexibility": {"length": 20, "portability": true, "partialWithdrawal": false, "topUp": true}
            }"#,
        )
        .unwrap();
        let policy = decode_policy_value(&body).unwrap();
        assert_eq!(policy.id.as_str(), "p1");
        assert_eq!(policy.premium, Some(12_000));
        assert_eq!(policy.claim_settlement_bp, Some(9_850));
        assert_eq!(policy.eligibility.unwrap().max_age, 65);
        assert!(policy.flexibility.unwrap().top_up);
    }

    #[test]
    fn at_httpgw_02_absent_numerics_decode_to_none() {
        let body: Value =
            serde_json::from_str(r#"{"id": "p2", "provider": "Acme", "type": "Health"}"#).unwrap();
        let policy = decode_policy_value(&body).unwrap();
        assert!(policy.premium.is_none());
        assert!(policy.term_years.is_none());
        assert!(policy.benefits.is_empty());
        assert!(policy.eligibility.is_none());
    }

    #[test]
    fn at_httpgw_03_structural_mismatch_is_decode_error() {
        let body: Value =
            serde_json::from_str(r#"{"id": "p3", "provider": "Acme", "benefits": "not a list"}"#)
                .unwrap();
        let err = decode_policy_value(&body).unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::Decode);
    }

    #[test]
    fn at_httpgw_04_ratio_out_of_range_rejected() {
        let body: Value = serde_json::from_str(
            r#"{"id": "p4", "provider": "Acme", "claimSettlementRatio": 101.0}"#,
        )
        .unwrap();
        assert!(decode_policy_value(&body).is_err());
    }

    #[test]
    fn at_httpgw_05_zero_timeout_is_config_error() {
        let mut config = HttpGatewayConfig::mvp_v1("http://localhost:9");
        config.timeout_ms = 0;
        let err = HttpPolicyGateway::new(config).err().unwrap();
        assert_eq!(err.kind, GatewayErrorKind::Config);
    }

    #[test]
    fn at_httpgw_06_oversized_eligibility_age_is_decode_error() {
        let body: Value = serde_json::from_str(
            r#"{"id": "p5", "provider": "Acme", "eligibility": {"minAge": 18, "maxAge": 65601}}"#,
        )
        .unwrap();
        let err = decode_policy_value(&body).err().unwrap();
        assert_eq!(err.kind, GatewayErrorKind::Decode);
    }

    #[test]
    fn at_httpgw_07_oversized_flexibility_length_is_decode_error() {
        let body: Value = serde_json::from_str(
            r#"{"id": "p6", "provider": "Acme", "flexibility": {"length": 65556}}"#,
        )
        .unwrap();
        let err = decode_policy_value(&body).err().unwrap();
        assert_eq!(err.kind, GatewayErrorKind::Decode);
    }
}
