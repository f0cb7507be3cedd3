//! Role-specific registration payload validation.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use refhub_auth::AccountRole;
use refhub_core::{DomainError, Email, Fields, FileRef, Upload, UploadKind};

use crate::account::Account;
use crate::identity::{validate_password, Identity};
use crate::profile::{normalize_registration_number, CompanyProfile, IndividualProfile, Profile};

const INDIVIDUAL_ONLY: &[&str] = &["first_name", "last_name", "gender", "state", "city"];
const COMPANY_ONLY: &[&str] = &["company_name", "company_registration_number"];

/// Registration payload as sent by a client; every field is optional here so
/// validation can report all missing fields at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,

    pub company_name: Option<String>,
    pub company_registration_number: Option<String>,

    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,

    pub profile_picture: Option<Upload>,
    pub referral_code: Option<String>,
}

/// A registration that passed validation; the password is still plain text
/// and must be hashed by the caller before building the account.
#[derive(Debug, Clone)]
pub struct ValidatedRegistration {
    pub email: Email,
    pub password: String,
    pub name: String,
    pub profile: Profile,
    pub profile_picture: Option<FileRef>,
    pub referral_code: Option<String>,
}

impl ValidatedRegistration {
    pub fn role(&self) -> AccountRole {
        self.profile.role()
    }

    /// Build the account (identity + profile) from a hashed password.
    pub fn into_account(self, password_hash: String, now: DateTime<Utc>) -> Result<Account, DomainError> {
        let mut identity = Identity::new(self.email, password_hash, self.name, self.profile.role(), now);
        identity.profile_picture = self.profile_picture;
        Account::new(identity, self.profile)
    }
}

impl RegistrationForm {
    /// Check that exactly the fields required for `role` are present.
    pub fn validate(self, role: AccountRole) -> Result<ValidatedRegistration, DomainError> {
        let foreign = match role {
            AccountRole::Individual => COMPANY_ONLY,
            AccountRole::Company => INDIVIDUAL_ONLY,
            AccountRole::Admin => {
                return Err(DomainError::validation("admin accounts cannot self-register"));
            }
        };
        let unexpected: Vec<&str> = foreign
            .iter()
            .copied()
            .filter(|field| self.has(field))
            .collect();
        if !unexpected.is_empty() {
            return Err(DomainError::validation(format!(
                "unexpected fields for {role} registration: {}",
                unexpected.join(", ")
            )));
        }

        let mut fields = Fields::default();
        let email = fields.required("email", self.email, 254);
        let password = self.password.filter(|p| !p.is_empty());
        if password.is_none() {
            fields.mark_missing("password");
        }

        let profile = match role {
            AccountRole::Individual => {
                let first_name = fields.required("first_name", self.first_name, 30);
                let last_name = fields.required("last_name", self.last_name, 30);
                let gender = fields.required("gender", self.gender, 10);
                let phone_number = fields.required("phone_number", self.phone_number, 20);
                let state = fields.required("state", self.state, 50);
                let city = fields.required("city", self.city, 50);
                let address = fields.optional("address", self.address, 255);
                let country = fields.optional("country", self.country, 100);
                fields.finish()?;

                // `finish` returned Ok, so every required value is present.
                match (first_name, last_name, gender, phone_number, state, city) {
                    (Some(first_name), Some(last_name), Some(gender), Some(phone_number), Some(state), Some(city)) => {
                        Profile::Individual(IndividualProfile {
                            first_name,
                            last_name,
                            gender: gender.parse()?,
                            phone_number,
                            address,
                            country,
                            state,
                            city,
                        })
                    }
                    _ => return Err(DomainError::invariant("required individual field vanished")),
                }
            }
            AccountRole::Company => {
                let company_name = fields.required("company_name", self.company_name, 255);
                let registration_number =
                    fields.required("company_registration_number", self.company_registration_number, 50);
                let phone_number = fields.optional("phone_number", self.phone_number, 20);
                let address = fields.optional("address", self.address, 255);
                let country = fields.optional("country", self.country, 100);
                fields.finish()?;

                match (company_name, registration_number) {
                    (Some(company_name), Some(registration_number)) => Profile::Company(CompanyProfile {
                        company_name,
                        company_registration_number: normalize_registration_number(&registration_number),
                        phone_number,
                        address,
                        country,
                    }),
                    _ => return Err(DomainError::invariant("required company field vanished")),
                }
            }
            AccountRole::Admin => {
                return Err(DomainError::validation("admin accounts cannot self-register"));
            }
        };

        let (Some(email), Some(password)) = (email, password) else {
            return Err(DomainError::invariant("required credential field vanished"));
        };
        let email = Email::parse(&email)?;
        validate_password(&password)?;

        let name = match self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => match &profile {
                Profile::Individual(p) => p.full_name(),
                Profile::Company(p) => p.company_name.clone(),
                Profile::Admin(_) => String::new(),
            },
        };

        let profile_picture = self
            .profile_picture
            .map(|upload| upload.accept(UploadKind::ProfilePicture))
            .transpose()?;

        let referral_code = self
            .referral_code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());

        Ok(ValidatedRegistration {
            email,
            password,
            name,
            profile,
            profile_picture,
            referral_code,
        })
    }

    fn has(&self, field: &str) -> bool {
        let value = match field {
            "first_name" => &self.first_name,
            "last_name" => &self.last_name,
            "gender" => &self.gender,
            "state" => &self.state,
            "city" => &self.city,
            "company_name" => &self.company_name,
            "company_registration_number" => &self.company_registration_number,
            _ => return false,
        };
        value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn individual_form() -> RegistrationForm {
        RegistrationForm {
            email: Some("Ada@Example.com".to_string()),
            password: Some("password123".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: Some("Obi".to_string()),
            gender: Some("female".to_string()),
            phone_number: Some("08030000000".to_string()),
            state: Some("Lagos".to_string()),
            city: Some("Ikeja".to_string()),
            ..Default::default()
        }
    }

    fn company_form() -> RegistrationForm {
        RegistrationForm {
            email: Some("ops@acme.com".to_string()),
            password: Some("password123".to_string()),
            company_name: Some("Acme".to_string()),
            company_registration_number: Some(" rc123 ".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_individual_registration() {
        let reg = individual_form().validate(AccountRole::Individual).unwrap();
        assert_eq!(reg.email.as_str(), "ada@example.com");
        assert_eq!(reg.name, "Ada Obi");
        assert_eq!(reg.role(), AccountRole::Individual);
        let profile = reg.profile.as_individual().unwrap();
        assert_eq!(profile.city, "Ikeja");
        assert_eq!(profile.address, None);
    }

    #[test]
    fn missing_gender_is_reported() {
        let form = RegistrationForm {
            gender: None,
            ..individual_form()
        };
        let err = form.validate(AccountRole::Individual).unwrap_err();
        assert_eq!(err, DomainError::MissingFields(vec!["gender".to_string()]));
    }

    #[test]
    fn all_missing_fields_listed_together() {
        let form = RegistrationForm {
            email: Some("x@example.com".to_string()),
            ..Default::default()
        };
        let DomainError::MissingFields(missing) = form.validate(AccountRole::Company).unwrap_err() else {
            panic!("expected MissingFields");
        };
        assert_eq!(missing, vec!["password", "company_name", "company_registration_number"]);
    }

    #[test]
    fn blank_values_count_as_missing() {
        let form = RegistrationForm {
            city: Some("   ".to_string()),
            ..individual_form()
        };
        assert_eq!(
            form.validate(AccountRole::Individual).unwrap_err(),
            DomainError::MissingFields(vec!["city".to_string()])
        );
    }

    #[test]
    fn company_registration_number_is_normalized() {
        let reg = company_form().validate(AccountRole::Company).unwrap();
        assert_eq!(reg.profile.as_company().unwrap().company_registration_number, "RC123");
        assert_eq!(reg.name, "Acme");
    }

    #[test]
    fn foreign_role_fields_are_rejected() {
        let form = RegistrationForm {
            company_name: Some("Sneaky Ltd".to_string()),
            ..individual_form()
        };
        let err = form.validate(AccountRole::Individual).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("company_name")));

        let form = RegistrationForm {
            gender: Some("male".to_string()),
            ..company_form()
        };
        assert!(form.validate(AccountRole::Company).is_err());
    }

    #[test]
    fn admin_cannot_self_register() {
        assert!(company_form().validate(AccountRole::Admin).is_err());
    }

    #[test]
    fn bad_email_gender_and_password_are_rejected() {
        let form = RegistrationForm {
            email: Some("nope".to_string()),
            ..individual_form()
        };
        assert!(form.validate(AccountRole::Individual).is_err());

        let form = RegistrationForm {
            gender: Some("robot".to_string()),
            ..individual_form()
        };
        assert!(form.validate(AccountRole::Individual).is_err());

        let form = RegistrationForm {
            password: Some("short".to_string()),
            ..individual_form()
        };
        assert!(form.validate(AccountRole::Individual).is_err());
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let form = RegistrationForm {
            first_name: Some("x".repeat(31)),
            ..individual_form()
        };
        let err = form.validate(AccountRole::Individual).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("first_name")));
    }

    #[test]
    fn referral_code_is_normalized() {
        let form = RegistrationForm {
            referral_code: Some(" abc123 ".to_string()),
            ..individual_form()
        };
        let reg = form.validate(AccountRole::Individual).unwrap();
        assert_eq!(reg.referral_code.as_deref(), Some("ABC123"));
    }

    #[test]
    fn validated_registration_builds_matching_account() {
        let reg = company_form().validate(AccountRole::Company).unwrap();
        let account = reg.into_account("hash".to_string(), Utc::now()).unwrap();
        assert_eq!(account.identity().role, AccountRole::Company);
        assert_eq!(account.profile().role(), AccountRole::Company);
    }
}
