use core::str::FromStr;

use serde::{Deserialize, Serialize};

use refhub_auth::{AccountRole, StaffTier};
use refhub_core::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(DomainError::validation(format!(
                "gender must be one of: male, female (got '{other}')"
            ))),
        }
    }
}

/// Attributes of an individual account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualProfile {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub phone_number: String,
    pub address: Option<String>,
    pub country: Option<String>,
    pub state: String,
    pub city: String,
}

impl IndividualProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Attributes of a company account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_name: String,
    /// Stored trimmed and upper-cased; unique across companies.
    pub company_registration_number: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
}

/// Staff record attached to an admin identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub tier: StaffTier,
}

/// Role-specific profile. Exactly one per identity, matching its role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Profile {
    Individual(IndividualProfile),
    Company(CompanyProfile),
    Admin(StaffProfile),
}

impl Profile {
    pub fn role(&self) -> AccountRole {
        match self {
            Profile::Individual(_) => AccountRole::Individual,
            Profile::Company(_) => AccountRole::Company,
            Profile::Admin(_) => AccountRole::Admin,
        }
    }

    pub fn staff_tier(&self) -> Option<StaffTier> {
        match self {
            Profile::Admin(staff) => Some(staff.tier),
            _ => None,
        }
    }

    pub fn as_company(&self) -> Option<&CompanyProfile> {
        match self {
            Profile::Company(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_individual(&self) -> Option<&IndividualProfile> {
        match self {
            Profile::Individual(i) => Some(i),
            _ => None,
        }
    }
}

/// Canonical form used for registration-number uniqueness.
pub fn normalize_registration_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_is_tagged_by_role() {
        let profile = Profile::Company(CompanyProfile {
            company_name: "Acme".to_string(),
            company_registration_number: "RC123".to_string(),
            phone_number: None,
            address: None,
            country: Some("NG".to_string()),
        });
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["type"], "company");
        assert_eq!(json["company_registration_number"], "RC123");
        assert_eq!(profile.role(), AccountRole::Company);
        assert_eq!(profile.staff_tier(), None);
    }

    #[test]
    fn gender_parsing() {
        assert_eq!(" Female ".parse::<Gender>().unwrap(), Gender::Female);
        assert!("other".parse::<Gender>().is_err());
    }

    #[test]
    fn registration_numbers_normalize() {
        assert_eq!(normalize_registration_number("  rc123 "), "RC123");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalization_is_idempotent(raw in "[ a-zA-Z0-9-]{0,20}") {
                let once = normalize_registration_number(&raw);
                prop_assert_eq!(normalize_registration_number(&once), once.clone());
                prop_assert_eq!(once.trim(), once.as_str());
            }
        }
    }
}
