use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Volunteers may withdraw a claim only while the pickup is at least this far
/// from the offer's expiration time.
pub const CANCEL_CUTOFF_HOURS: i64 = 24;

#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    MasterAdmin,
    OrgAdmin,
    Restaurant,
    Volunteer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::MasterAdmin => "master_admin",
            Role::OrgAdmin => "org_admin",
            Role::Restaurant => "restaurant",
            Role::Volunteer => "volunteer",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::MasterAdmin | Role::OrgAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master_admin" => Ok(Role::MasterAdmin),
            "org_admin" => Ok(Role::OrgAdmin),
            "restaurant" => Ok(Role::Restaurant),
            "volunteer" => Ok(Role::Volunteer),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    PendingOnboarding,
    Active,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::PendingOnboarding => "pending_onboarding",
            UserStatus::Active => "active",
            UserStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_onboarding" => Ok(UserStatus::PendingOnboarding),
            "active" => Ok(UserStatus::Active),
            "suspended" => Ok(UserStatus::Suspended),
            other => Err(UnknownVariant::new("user status", other)),
        }
    }
}

/// Offer lifecycle. `Expired` is a recognized terminal state but nothing
/// transitions into it server-side; listings simply stop showing stale offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Open,
    Claimed,
    Confirmed,
    Completed,
    Cancelled,
    Expired,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Open => "open",
            OfferStatus::Claimed => "claimed",
            OfferStatus::Confirmed => "confirmed",
            OfferStatus::Completed => "completed",
            OfferStatus::Cancelled => "cancelled",
            OfferStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OfferStatus::Completed | OfferStatus::Cancelled | OfferStatus::Expired
        )
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(OfferStatus::Open),
            "claimed" => Ok(OfferStatus::Claimed),
            "confirmed" => Ok(OfferStatus::Confirmed),
            "completed" => Ok(OfferStatus::Completed),
            "cancelled" => Ok(OfferStatus::Cancelled),
            "expired" => Ok(OfferStatus::Expired),
            other => Err(UnknownVariant::new("offer status", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Rejected,
}

impl PickupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupStatus::Pending => "pending",
            PickupStatus::Confirmed => "confirmed",
            PickupStatus::Completed => "completed",
            PickupStatus::Cancelled => "cancelled",
            PickupStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PickupStatus::Completed | PickupStatus::Cancelled | PickupStatus::Rejected
        )
    }
}

impl fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickupStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PickupStatus::Pending),
            "confirmed" => Ok(PickupStatus::Confirmed),
            "completed" => Ok(PickupStatus::Completed),
            "cancelled" => Ok(PickupStatus::Cancelled),
            "rejected" => Ok(PickupStatus::Rejected),
            other => Err(UnknownVariant::new("pickup status", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    System,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::System => "system",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageKind::Text),
            "system" => Ok(MessageKind::System),
            other => Err(UnknownVariant::new("message kind", other)),
        }
    }
}

/// The 24-hour rule: a volunteer may withdraw their claim only while at least
/// [`CANCEL_CUTOFF_HOURS`] remain before the offer expires.
pub fn within_cancel_window(expiration: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expiration - now >= Duration::hours(CANCEL_CUTOFF_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            OfferStatus::Open,
            OfferStatus::Claimed,
            OfferStatus::Confirmed,
            OfferStatus::Completed,
            OfferStatus::Cancelled,
            OfferStatus::Expired,
        ] {
            assert_eq!(status.as_str().parse::<OfferStatus>().unwrap(), status);
        }
        assert!("picked_up".parse::<OfferStatus>().is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(!OfferStatus::Open.is_terminal());
        assert!(!OfferStatus::Claimed.is_terminal());
        assert!(!OfferStatus::Confirmed.is_terminal());
        assert!(OfferStatus::Completed.is_terminal());
        assert!(OfferStatus::Cancelled.is_terminal());
        assert!(OfferStatus::Expired.is_terminal());

        assert!(!PickupStatus::Pending.is_terminal());
        assert!(PickupStatus::Rejected.is_terminal());
    }

    #[test]
    fn cancel_window_boundary() {
        let now = Utc::now();
        assert!(within_cancel_window(now + Duration::hours(25), now));
        assert!(within_cancel_window(now + Duration::hours(24), now));
        assert!(!within_cancel_window(
            now + Duration::hours(24) - Duration::seconds(1),
            now
        ));
        assert!(!within_cancel_window(now + Duration::hours(2), now));
    }

    #[test]
    fn roles_serialize_snake_case() {
        assert_eq!(Role::MasterAdmin.to_string(), "master_admin");
        assert_eq!("org_admin".parse::<Role>().unwrap(), Role::OrgAdmin);
        assert!(Role::OrgAdmin.is_admin());
        assert!(!Role::Volunteer.is_admin());
    }
}
