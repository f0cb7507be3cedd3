use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use refhub_core::{DomainError, Entity, Fields, FileRef, RankingId, Upload, UploadKind};

use crate::bounded;

const MAX_RANK_COUNTER: i64 = i32::MAX as i64;

text_enum! {
    RankTier("name") {
        GoldPro => "gold pro",
        Gold => "gold",
        SilverPro => "silver pro",
        Silver => "silver",
        Platinum => "platinum",
    }
    default Silver
}

text_enum! {
    RankingStatus("status") {
        Enabled => "enabled",
        Disabled => "disabled",
    }
    default Enabled
}

/// Leaderboard entry maintained by admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRanking {
    pub id: RankingId,
    pub icon: FileRef,
    /// Free-text label of the ranked user, not a reference to an identity.
    pub user: String,
    pub rank_level: i64,
    pub name: RankTier,
    pub total_recruits: i64,
    pub bonus: i64,
    pub status: RankingStatus,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingForm {
    pub icon: Option<Upload>,
    pub user: Option<String>,
    pub rank_level: Option<i64>,
    pub name: Option<RankTier>,
    pub total_recruits: Option<i64>,
    pub bonus: Option<i64>,
    pub status: Option<RankingStatus>,
}

struct Checked {
    icon: Option<FileRef>,
    user: Option<String>,
    rank_level: Option<i64>,
    total_recruits: Option<i64>,
    bonus: Option<i64>,
}

impl RankingForm {
    fn check(&mut self, require_user: bool, require_icon: bool) -> Result<Checked, DomainError> {
        let mut fields = Fields::default();
        if require_icon && self.icon.is_none() {
            fields.mark_missing("icon");
        }
        let user = if require_user {
            fields.required("user", self.user.take(), 255)
        } else {
            fields.optional("user", self.user.take(), 255)
        };
        let rank_level = bounded(&mut fields, "rank_level", self.rank_level, MAX_RANK_COUNTER);
        let total_recruits = bounded(&mut fields, "total_recruits", self.total_recruits, MAX_RANK_COUNTER);
        let bonus = bounded(&mut fields, "bonus", self.bonus, MAX_RANK_COUNTER);
        fields.finish()?;

        let icon = self
            .icon
            .take()
            .map(|u| u.accept(UploadKind::RankingIcon))
            .transpose()?;
        Ok(Checked {
            icon,
            user,
            rank_level,
            total_recruits,
            bonus,
        })
    }
}

impl UserRanking {
    pub fn create(mut form: RankingForm, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let checked = form.check(true, true)?;
        let (Some(icon), Some(user)) = (checked.icon, checked.user) else {
            return Err(DomainError::invariant("required ranking field vanished"));
        };
        Ok(Self {
            id: RankingId::new(),
            icon,
            user,
            rank_level: checked.rank_level.unwrap_or(0),
            name: form.name.unwrap_or_default(),
            total_recruits: checked.total_recruits.unwrap_or(0),
            bonus: checked.bonus.unwrap_or(0),
            status: form.status.unwrap_or_default(),
            date: now,
        })
    }

    /// Full update; the icon may be omitted to keep the current one.
    pub fn replace(&mut self, mut form: RankingForm) -> Result<(), DomainError> {
        let checked = form.check(true, false)?;
        let Some(user) = checked.user else {
            return Err(DomainError::invariant("required ranking field vanished"));
        };
        if let Some(icon) = checked.icon {
            self.icon = icon;
        }
        self.user = user;
        self.rank_level = checked.rank_level.unwrap_or(0);
        self.name = form.name.unwrap_or_default();
        self.total_recruits = checked.total_recruits.unwrap_or(0);
        self.bonus = checked.bonus.unwrap_or(0);
        self.status = form.status.unwrap_or_default();
        Ok(())
    }

    pub fn patch(&mut self, mut form: RankingForm) -> Result<(), DomainError> {
        let checked = form.check(false, false)?;
        if let Some(icon) = checked.icon {
            self.icon = icon;
        }
        if let Some(v) = checked.user {
            self.user = v;
        }
        if let Some(v) = checked.rank_level {
            self.rank_level = v;
        }
        if let Some(v) = form.name {
            self.name = v;
        }
        if let Some(v) = checked.total_recruits {
            self.total_recruits = v;
        }
        if let Some(v) = checked.bonus {
            self.bonus = v;
        }
        if let Some(v) = form.status {
            self.status = v;
        }
        Ok(())
    }
}

impl Entity for UserRanking {
    const KIND: &'static str = "user ranking";

    type Id = RankingId;

    fn id(&self) -> RankingId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon() -> Upload {
        Upload {
            file_name: "gold.png".to_string(),
            size_bytes: 512,
        }
    }

    fn form() -> RankingForm {
        RankingForm {
            icon: Some(icon()),
            user: Some("Top recruiter".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn create_defaults() {
        let r = UserRanking::create(form(), Utc::now()).unwrap();
        assert_eq!(r.name, RankTier::Silver);
        assert_eq!(r.status, RankingStatus::Enabled);
        assert_eq!(r.rank_level, 0);
        assert!(r.icon.as_str().starts_with("ranking_icons/"));
    }

    #[test]
    fn icon_and_user_required() {
        let err = UserRanking::create(RankingForm::default(), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingFields(vec!["icon".to_string(), "user".to_string()])
        );
    }

    #[test]
    fn negative_counters_rejected() {
        for form in [
            RankingForm { rank_level: Some(-1), ..form() },
            RankingForm { total_recruits: Some(-5), ..form() },
            RankingForm { bonus: Some(-100), ..form() },
        ] {
            assert!(UserRanking::create(form, Utc::now()).unwrap_err().is_validation());
        }
    }

    #[test]
    fn tier_names_with_spaces() {
        assert_eq!("Gold Pro".parse::<RankTier>().unwrap(), RankTier::GoldPro);
        assert_eq!(serde_json::to_string(&RankTier::SilverPro).unwrap(), "\"silver pro\"");
        let f: RankingForm = serde_json::from_str(r#"{"name":"platinum","status":"disabled"}"#).unwrap();
        assert_eq!(f.name, Some(RankTier::Platinum));
        assert_eq!(f.status, Some(RankingStatus::Disabled));
    }

    #[test]
    fn patch_keeps_icon_and_updates_bonus() {
        let mut r = UserRanking::create(form(), Utc::now()).unwrap();
        let icon = r.icon.clone();
        r.patch(RankingForm {
            bonus: Some(250),
            name: Some(RankTier::Gold),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(r.bonus, 250);
        assert_eq!(r.name, RankTier::Gold);
        assert_eq!(r.icon, icon);
    }

    #[test]
    fn replace_resets_omitted_fields() {
        let mut r = UserRanking::create(
            RankingForm {
                bonus: Some(10),
                name: Some(RankTier::Platinum),
                ..form()
            },
            Utc::now(),
        )
        .unwrap();
        r.replace(RankingForm {
            user: Some("Renamed".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(r.user, "Renamed");
        assert_eq!(r.bonus, 0);
        assert_eq!(r.name, RankTier::Silver);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn non_negative_counters_accepted(level in 0i64..1000, recruits in 0i64..100_000, bonus in 0i64..1_000_000) {
                let r = UserRanking::create(
                    RankingForm { rank_level: Some(level), total_recruits: Some(recruits), bonus: Some(bonus), ..form() },
                    Utc::now(),
                ).unwrap();
                prop_assert_eq!(r.rank_level, level);
                prop_assert_eq!(r.total_recruits, recruits);
                prop_assert_eq!(r.bonus, bonus);
            }
        }
    }
}
