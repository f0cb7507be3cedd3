//! `refhub-accounts`: identities and their role-specific profiles.
//!
//! One [`Identity`] per login, one [`Profile`] per identity. The profile is a
//! tagged union over the three account kinds, and [`Account`] refuses to pair
//! an identity with a profile of another kind.

pub mod account;
pub mod identity;
pub mod profile;
pub mod registration;
pub mod staff;

pub use account::{Account, ProfileUpdate};
pub use identity::{generate_referral_code, validate_password, Identity, MIN_PASSWORD_LEN};
pub use profile::{
    normalize_registration_number, CompanyProfile, Gender, IndividualProfile, Profile, StaffProfile,
};
pub use registration::{RegistrationForm, ValidatedRegistration};
pub use staff::{NewStaffForm, StaffUpdate, ValidatedStaff};
