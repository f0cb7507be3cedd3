//! `refhub-referrals`: marketplace resources (products, support tickets,
//! user rankings, and the referral/wallet ledger).
//!
//! Types here validate their own fields and state transitions. Who may call
//! what is decided by `refhub-auth`; persistence lives in `refhub-infra`.

/// Closed set of lowercase text values with `as_str`, `Display`, `FromStr`
/// and serde support, all agreeing on the same spelling.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
        default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = ::refhub_core::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        ::refhub_core::DomainError::validation(format!(
                            "{} must be one of: {} (got '{}')",
                            $label,
                            allowed.join(", "),
                            s
                        ))
                    })
            }
        }
    };
}

pub mod product;
pub mod ranking;
pub mod referral;
pub mod ticket;

pub use product::{Product, ProductForm, ProductStatus, MAX_PRODUCT_COUNTER};
pub use ranking::{RankTier, RankingForm, RankingStatus, UserRanking};
pub use referral::{Referral, Wallet};
pub use ticket::{SupportTicket, TicketCategory, TicketForm, TicketPriority, TicketStatus};

/// Length cap for free-text bodies such as descriptions.
pub(crate) const MAX_TEXT_LEN: usize = 10_000;

/// Range-check an integer counter; out-of-range values are recorded on `fields`.
pub(crate) fn bounded(
    fields: &mut refhub_core::Fields,
    field: &'static str,
    value: Option<i64>,
    max: i64,
) -> Option<i64> {
    let value = value?;
    if !(0..=max).contains(&value) {
        fields.invalid(format!("{field} must be between 0 and {max}"));
    }
    Some(value)
}
