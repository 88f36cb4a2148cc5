#![forbid(unsafe_code)]

use serde::Serialize;

use crate::common::{validate_text, validate_token};
use crate::{ContractViolation, SchemaVersion, Validate};

pub const POLICY_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

pub const MAX_LIST_ENTRIES: usize = 64;
pub const MAX_LIST_ENTRY_LEN: usize = 240;
pub const MAX_CLAIM_SETTLEMENT_BP: u16 = 10_000;
pub const MAX_ELIGIBILITY_AGE: u16 = 130;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PolicyId(String);

impl PolicyId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = Self(id.into());
        v.validate()?;
        Ok(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for PolicyId {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_token("policy_id", &self.0, 64)
    }
}

/// Age and income gate for a policy. `min_income` is rupees per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub min_age: u16,
    pub max_age: u16,
    pub min_income: u64,
}

impl Eligibility {
    pub fn v1(min_age: u16, max_age: u16, min_income: u64) -> Result<Self, ContractViolation> {
        let e = Self {
            min_age,
            max_age,
            min_income,
        };
        e.validate()?;
        Ok(e)
    }
}

impl Validate for Eligibility {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.max_age > MAX_ELIGIBILITY_AGE {
            return Err(ContractViolation::InvalidRange {
                field: "eligibility.max_age",
                min: 0,
                max: u64::from(MAX_ELIGIBILITY_AGE),
                got: u64::from(self.max_age),
            });
        }
        if self.min_age > self.max_age {
            return Err(ContractViolation::InvalidValue {
                field: "eligibility.min_age",
                reason: "must be <= max_age",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Flexibility {
    pub length_years: u16,
    pub portability: bool,
    pub partial_withdrawal: bool,
    pub top_up: bool,
}

impl Flexibility {
    pub fn v1(
        length_years: u16,
        portability: bool,
        partial_withdrawal: bool,
        top_up: bool,
    ) -> Result<Self, ContractViolation> {
        let f = Self {
            length_years,
            portability,
            partial_withdrawal,
            top_up,
        };
        f.validate()?;
        Ok(f)
    }
}

impl Validate for Flexibility {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.length_years > 100 {
            return Err(ContractViolation::InvalidRange {
                field: "flexibility.length_years",
                min: 0,
                max: 100,
                got: u64::from(self.length_years),
            });
        }
        Ok(())
    }
}

/// One policy record as served by the comparison service. Numeric
/// fields are optional; absence is rendered as "N/A" downstream, it is
/// never a contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Policy {
    pub id: PolicyId,
    pub provider: String,
    pub policy_type: String,
    pub premium: Option<u64>,
    pub coverage: Option<u64>,
    pub term_years: Option<u16>,
    /// Claim settlement ratio in basis points (9850 = 98.5%).
    pub claim_settlement_bp: Option<u16>,
    pub benefits: Vec<String>,
    pub add_ons: Vec<String>,
    pub exclusions: Vec<String>,
    pub eligibility: Option<Eligibility>,
    pub goals: Vec<String>,
    pub flexibility: Option<Flexibility>,
}

impl Policy {
    #[allow(clippy::too_many_arguments)]
    pub fn v1(
        id: PolicyId,
        provider: String,
        policy_type: String,
        premium: Option<u64>,
        coverage: Option<u64>,
        term_years: Option<u16>,
        claim_settlement_bp: Option<u16>,
        benefits: Vec<String>,
        add_ons: Vec<String>,
        exclusions: Vec<String>,
        eligibility: Option<Eligibility>,
        goals: Vec<String>,
        flexibility: Option<Flexibility>,
    ) -> Result<Self, ContractViolation> {
        let p = Self {
            id,
            provider,
            policy_type,
            premium,
            coverage,
            term_years,
            claim_settlement_bp,
            benefits,
            add_ons,
            exclusions,
            eligibility,
            goals,
            flexibility,
        };
        p.validate()?;
        Ok(p)
    }
}

fn validate_entries(
    field: &'static str,
    entries: &[String],
) -> Result<(), ContractViolation> {
    if entries.len() > MAX_LIST_ENTRIES {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must hold at most 64 entries",
        });
    }
    for entry in entries {
        validate_token(field, entry, MAX_LIST_ENTRY_LEN)?;
    }
    Ok(())
}

impl Validate for Policy {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.id.validate()?;
        validate_token("policy.provider", &self.provider, 120)?;
        validate_text("policy.policy_type", &self.policy_type, 64)?;
        if let Some(bp) = self.claim_settlement_bp {
            if bp > MAX_CLAIM_SETTLEMENT_BP {
                return Err(ContractViolation::InvalidRange {
                    field: "policy.claim_settlement_bp",
                    min: 0,
                    max: u64::from(MAX_CLAIM_SETTLEMENT_BP),
                    got: u64::from(bp),
                });
            }
        }
        if let Some(term_years) = self.term_years {
            if term_years == 0 || term_years > 100 {
                return Err(ContractViolation::InvalidRange {
                    field: "policy.term_years",
                    min: 1,
                    max: 100,
                    got: u64::from(term_years),
                });
            }
        }
        validate_entries("policy.benefits", &self.benefits)?;
        validate_entries("policy.add_ons", &self.add_ons)?;
        validate_entries("policy.exclusions", &self.exclusions)?;
        validate_entries("policy.goals", &self.goals)?;
        if let Some(eligibility) = &self.eligibility {
            eligibility.validate()?;
        }
        if let Some(flexibility) = &self.flexibility {
            flexibility.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(id: &str) -> Policy {
        Policy::v1(
            PolicyId::new(id).unwrap(),
            "Acme Life".to_string(),
            "Term Life".to_string(),
            None,
            None,
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
    fn at_policy_01_minimal_record_is_valid() {
        let p = minimal("p1");
        assert_eq!(p.id.as_str(), "p1");
        assert!(p.premium.is_none());
    }

    #[test]
    fn at_policy_02_claim_settlement_bp_bounded() {
        let mut p = minimal("p1");
        p.claim_settlement_bp = Some(10_001);
        assert!(p.validate().is_err());
        p.claim_settlement_bp = Some(10_000);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn at_policy_03_eligibility_age_order_enforced() {
        assert!(Eligibility::v1(66, 65, 0).is_err());
        assert!(Eligibility::v1(18, 65, 300_000).is_ok());
    }

    #[test]
    fn at_policy_04_list_entries_reject_control_chars() {
        let mut p = minimal("p1");
        p.benefits = vec!["Accident cover".to_string(), "bad\u{0}entry".to_string()];
        assert!(p.validate().is_err());
    }

    #[test]
    fn at_policy_05_empty_policy_id_rejected() {
        assert!(PolicyId::new("").is_err());
    }
}
