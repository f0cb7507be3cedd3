use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use refhub_auth::{AccountRole, AccountStatus, Principal, StaffTier};
use refhub_core::{DomainError, Fields, Upload, UploadKind, UserId};

use crate::identity::Identity;
use crate::profile::{normalize_registration_number, Profile, StaffProfile};

/// An identity paired with its role-specific profile.
///
/// Construction checks that the profile kind matches the identity role, and
/// for admins keeps the identity's staff flags in line with the staff tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    identity: Identity,
    profile: Profile,
}

impl Account {
    pub fn new(mut identity: Identity, profile: Profile) -> Result<Self, DomainError> {
        if identity.role != profile.role() {
            return Err(DomainError::invariant(format!(
                "{} identity cannot carry a {} profile",
                identity.role,
                profile.role()
            )));
        }
        identity.apply_staff_tier(profile.staff_tier());
        Ok(Self { identity, profile })
    }

    pub fn id(&self) -> UserId {
        self.identity.id
    }

    pub fn role(&self) -> AccountRole {
        self.identity.role
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn into_parts(self) -> (Identity, Profile) {
        (self.identity, self.profile)
    }

    /// Authorization view of this account.
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.identity.id,
            role: self.identity.role,
            status: self.identity.status,
            is_active: self.identity.is_active,
            staff_tier: self.profile.staff_tier(),
        }
    }

    /// Profile returned alongside a login; admins get none.
    pub fn login_profile(&self) -> Option<&Profile> {
        match self.profile {
            Profile::Admin(_) => None,
            _ => Some(&self.profile),
        }
    }

    pub fn can_authenticate(&self) -> bool {
        self.identity.can_authenticate()
    }

    /// Returns `true` if the status changed.
    pub fn approve(&mut self) -> bool {
        let changed = !matches!(self.identity.status, AccountStatus::Approved);
        self.identity.approve();
        changed
    }

    /// Returns `true` if the status changed.
    pub fn decline(&mut self) -> bool {
        let changed = !matches!(self.identity.status, AccountStatus::Declined);
        self.identity.decline();
        changed
    }

    pub fn activate(&mut self) -> bool {
        let changed = !self.identity.is_active;
        self.identity.activate();
        changed
    }

    pub fn deactivate(&mut self) -> bool {
        let changed = self.identity.is_active;
        self.identity.deactivate();
        changed
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.identity.record_login(now);
    }

    pub fn set_name(&mut self, name: String) {
        self.identity.name = name;
    }

    pub fn set_password_hash(&mut self, hash: String) {
        self.identity.password_hash = hash;
    }

    /// Take over the self-service fields of `edited`: display name, picture
    /// and the individual or company profile. An admin's staff profile is
    /// not self-service and stays as it is.
    pub fn take_profile_from(&mut self, edited: &Account) {
        self.identity.name.clone_from(&edited.identity.name);
        self.identity.profile_picture.clone_from(&edited.identity.profile_picture);
        if self.profile.role() == edited.profile.role() && !matches!(self.profile, Profile::Admin(_)) {
            self.profile.clone_from(&edited.profile);
        }
    }

    /// Take over the admin-controlled fields of `edited`: lifecycle status,
    /// activation and staff tier.
    pub fn take_access_from(&mut self, edited: &Account) {
        self.identity.status = edited.identity.status;
        self.identity.is_active = edited.identity.is_active;
        if let (Profile::Admin(staff), Profile::Admin(edited_staff)) = (&mut self.profile, &edited.profile) {
            staff.tier = edited_staff.tier;
        }
        self.identity.apply_staff_tier(self.profile.staff_tier());
    }

    /// Change the staff tier of an admin account.
    pub fn set_staff_tier(&mut self, tier: StaffTier) -> Result<(), DomainError> {
        match &mut self.profile {
            Profile::Admin(staff) => {
                *staff = StaffProfile { tier };
                self.identity.apply_staff_tier(Some(tier));
                Ok(())
            }
            _ => Err(DomainError::validation("only admin accounts have a staff tier")),
        }
    }

    /// Apply a partial profile update; fields belonging to another role are rejected.
    pub fn apply_update(&mut self, update: ProfileUpdate) -> Result<(), DomainError> {
        update.reject_foreign(self.role())?;

        let mut fields = Fields::default();
        let name = fields.optional("name", update.name, 100);
        let phone_number = fields.optional("phone_number", update.phone_number, 20);
        let address = fields.optional("address", update.address, 255);
        let country = fields.optional("country", update.country, 100);
        let first_name = fields.optional("first_name", update.first_name, 30);
        let last_name = fields.optional("last_name", update.last_name, 30);
        let gender = fields.optional("gender", update.gender, 10);
        let state = fields.optional("state", update.state, 50);
        let city = fields.optional("city", update.city, 50);
        let company_name = fields.optional("company_name", update.company_name, 255);
        let registration_number =
            fields.optional("company_registration_number", update.company_registration_number, 50);
        fields.finish()?;

        let gender = gender.map(|g| g.parse()).transpose()?;
        let picture = update
            .profile_picture
            .map(|upload| upload.accept(UploadKind::ProfilePicture))
            .transpose()?;

        match &mut self.profile {
            Profile::Individual(p) => {
                if let Some(v) = first_name {
                    p.first_name = v;
                }
                if let Some(v) = last_name {
                    p.last_name = v;
                }
                if let Some(v) = gender {
                    p.gender = v;
                }
                if let Some(v) = phone_number {
                    p.phone_number = v;
                }
                if let Some(v) = state {
                    p.state = v;
                }
                if let Some(v) = city {
                    p.city = v;
                }
                if address.is_some() {
                    p.address = address;
                }
                if country.is_some() {
                    p.country = country;
                }
            }
            Profile::Company(p) => {
                if let Some(v) = company_name {
                    p.company_name = v;
                }
                if let Some(v) = registration_number {
                    p.company_registration_number = normalize_registration_number(&v);
                }
                if phone_number.is_some() {
                    p.phone_number = phone_number;
                }
                if address.is_some() {
                    p.address = address;
                }
                if country.is_some() {
                    p.country = country;
                }
            }
            Profile::Admin(_) => {}
        }

        if let Some(name) = name {
            self.identity.name = name;
        }
        if picture.is_some() {
            self.identity.profile_picture = picture;
        }
        Ok(())
    }
}

/// Partial update of an account's own profile. Absent or blank fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,

    pub company_name: Option<String>,
    pub company_registration_number: Option<String>,

    pub profile_picture: Option<Upload>,
}

impl ProfileUpdate {
    fn reject_foreign(&self, role: AccountRole) -> Result<(), DomainError> {
        let individual = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("gender", &self.gender),
            ("state", &self.state),
            ("city", &self.city),
        ];
        let company = [
            ("company_name", &self.company_name),
            ("company_registration_number", &self.company_registration_number),
        ];
        let contact = [
            ("phone_number", &self.phone_number),
            ("address", &self.address),
            ("country", &self.country),
        ];

        let foreign: Vec<&str> = match role {
            AccountRole::Individual => company.iter().filter(|(_, v)| v.is_some()).map(|(k, _)| *k).collect(),
            AccountRole::Company => individual.iter().filter(|(_, v)| v.is_some()).map(|(k, _)| *k).collect(),
            AccountRole::Admin => individual
                .iter()
                .chain(company.iter())
                .chain(contact.iter())
                .filter(|(_, v)| v.is_some())
                .map(|(k, _)| *k)
                .collect(),
        };
        if foreign.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "unexpected fields for {role} profile: {}",
                foreign.join(", ")
            )))
        }
    }
}
