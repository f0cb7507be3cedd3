use core::str::FromStr;

use serde::{Deserialize, Serialize};

use refhub_core::DomainError;

/// Account type of an identity. Drives every authorization outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Individual,
    Company,
    Admin,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Individual => "individual",
            AccountRole::Company => "company",
            AccountRole::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        *self == AccountRole::Admin
    }
}

impl core::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" => Ok(AccountRole::Individual),
            "company" => Ok(AccountRole::Company),
            "admin" => Ok(AccountRole::Admin),
            other => Err(DomainError::validation(format!(
                "unknown role '{other}'; expected one of: individual, company, admin"
            ))),
        }
    }
}

/// Staff tier of an admin identity.
///
/// The tier is the source of the identity's elevated flags:
/// `admin` → staff, `superadmin` → staff + superuser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffTier {
    Admin,
    Superadmin,
}

impl StaffTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffTier::Admin => "admin",
            StaffTier::Superadmin => "superadmin",
        }
    }

    pub fn is_staff(&self) -> bool {
        true
    }

    pub fn is_superuser(&self) -> bool {
        *self == StaffTier::Superadmin
    }
}

impl core::fmt::Display for StaffTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(StaffTier::Admin),
            "superadmin" => Ok(StaffTier::Superadmin),
            other => Err(DomainError::validation(format!(
                "unknown staff tier '{other}'; expected admin or superadmin"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("Company".parse::<AccountRole>().unwrap(), AccountRole::Company);
        assert!("staff".parse::<AccountRole>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AccountRole::Individual).unwrap(), "\"individual\"");
    }

    #[test]
    fn superadmin_is_superuser() {
        assert!(StaffTier::Superadmin.is_superuser());
        assert!(!StaffTier::Admin.is_superuser());
        assert!(StaffTier::Admin < StaffTier::Superadmin);
    }
}
