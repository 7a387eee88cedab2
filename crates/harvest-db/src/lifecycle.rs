//! Offer/pickup transition engine.
//!
//! Every transition runs as a single SQLite transaction covering the offer
//! update, the pickup update and the system chat message, and re-validates
//! status and ownership against the row it just read. Combined with the
//! serialized connection this makes concurrent conflicting transitions
//! impossible: the loser of a claim race sees `claimed` and gets a conflict,
//! not a second pickup.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use harvest_types::models::{MessageKind, OfferStatus, PickupStatus, within_cancel_window};

use crate::models::{OfferRow, PickupRow, UserRow};
use crate::queries::{OFFER_COLUMNS, PICKUP_COLUMNS, map_offer, map_pickup};
use crate::{Database, StoreError, StoreResult};

impl Database {
    /// open → claimed. Creates the pickup, stamps the offer, announces the
    /// claim in the conversation.
    pub fn claim_offer(
        &self,
        offer_id: &str,
        volunteer: &UserRow,
        now: DateTime<Utc>,
    ) -> StoreResult<(OfferRow, PickupRow)> {
        let now_s = now.to_rfc3339();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let offer = fetch_offer(&tx, offer_id)?;
            if offer_status(&offer)? != OfferStatus::Open {
                return Err(StoreError::Conflict("Offer is no longer available".into()));
            }

            let display_name = volunteer.display_name();
            let pickup_id = Uuid::new_v4().to_string();
            tx.execute(
                &format!(
                    "INSERT INTO pickups ({PICKUP_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    pickup_id,
                    offer_id,
                    volunteer.id,
                    display_name,
                    offer.restaurant_id,
                    PickupStatus::Pending.as_str(),
                    Option::<String>::None,
                    now_s,
                    now_s,
                ],
            )?;

            tx.execute(
                "UPDATE food_offers
                 SET status = ?2, claimed_by = ?3, claimed_by_name = ?4, claimed_at = ?5,
                     pickup_id = ?6, updated_at = ?5
                 WHERE id = ?1",
                params![
                    offer_id,
                    OfferStatus::Claimed.as_str(),
                    volunteer.id,
                    display_name,
                    now_s,
                    pickup_id,
                ],
            )?;

            append_system_message(
                &tx,
                &pickup_id,
                &format!("{display_name} claimed this offer."),
                &now_s,
            )?;

            let offer = fetch_offer(&tx, offer_id)?;
            let pickup = fetch_pickup(&tx, &pickup_id)?;
            tx.commit()?;
            Ok((offer, pickup))
        })
    }

    /// claimed → confirmed, by the owning restaurant.
    pub fn confirm_offer(
        &self,
        offer_id: &str,
        restaurant_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<(OfferRow, Option<PickupRow>)> {
        let now_s = now.to_rfc3339();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let offer = fetch_offer(&tx, offer_id)?;
            if offer.restaurant_id != restaurant_id {
                return Err(StoreError::Forbidden(
                    "Not authorized to manage this offer".into(),
                ));
            }
            if offer_status(&offer)? != OfferStatus::Claimed {
                return Err(StoreError::Conflict(
                    "Offer cannot be confirmed in current status".into(),
                ));
            }

            tx.execute(
                "UPDATE food_offers SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![offer_id, OfferStatus::Confirmed.as_str(), now_s],
            )?;

            if let Some(pickup_id) = offer.pickup_id.as_deref() {
                update_pickup_status(&tx, pickup_id, PickupStatus::Confirmed, None, &now_s)?;
                append_system_message(
                    &tx,
                    pickup_id,
                    "The restaurant confirmed this pickup.",
                    &now_s,
                )?;
            }

            let offer = fetch_offer(&tx, offer_id)?;
            let pickup = maybe_pickup(&tx, offer.pickup_id.as_deref())?;
            tx.commit()?;
            Ok((offer, pickup))
        })
    }

    /// claimed → open, driven by the owning restaurant. `outcome` records why
    /// the claim ended on the pickup: `Rejected` for a decline, `Cancelled`
    /// for a cancellation with an optional reason.
    pub fn release_claim(
        &self,
        offer_id: &str,
        restaurant_id: &str,
        outcome: PickupStatus,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> StoreResult<(OfferRow, Option<PickupRow>)> {
        if !matches!(outcome, PickupStatus::Rejected | PickupStatus::Cancelled) {
            return Err(StoreError::Invalid(format!(
                "{outcome} is not a release outcome"
            )));
        }

        let now_s = now.to_rfc3339();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let offer = fetch_offer(&tx, offer_id)?;
            if offer.restaurant_id != restaurant_id {
                return Err(StoreError::Forbidden(
                    "Not authorized to manage this offer".into(),
                ));
            }
            if offer_status(&offer)? != OfferStatus::Claimed {
                return Err(StoreError::Conflict(
                    "Offer is not currently claimed".into(),
                ));
            }

            let pickup_id = offer.pickup_id.clone();
            reopen_offer(&tx, offer_id, &now_s)?;

            if let Some(pickup_id) = pickup_id.as_deref() {
                update_pickup_status(&tx, pickup_id, outcome, reason, &now_s)?;
                let note = match (outcome, reason) {
                    (PickupStatus::Cancelled, Some(r)) => {
                        format!("The restaurant cancelled this pickup: {r}")
                    }
                    (PickupStatus::Cancelled, None) => {
                        "The restaurant cancelled this pickup.".to_string()
                    }
                    _ => "The restaurant declined this pickup. The offer is open again."
                        .to_string(),
                };
                append_system_message(&tx, pickup_id, &note, &now_s)?;
            }

            let offer = fetch_offer(&tx, offer_id)?;
            let pickup = maybe_pickup(&tx, pickup_id.as_deref())?;
            tx.commit()?;
            Ok((offer, pickup))
        })
    }

    /// claimed → open, driven by the claiming volunteer. Refused inside the
    /// 24-hour window before the offer expires.
    pub fn withdraw_claim(
        &self,
        offer_id: &str,
        volunteer_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<(OfferRow, Option<PickupRow>)> {
        let now_s = now.to_rfc3339();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let offer = fetch_offer(&tx, offer_id)?;
            if offer_status(&offer)? != OfferStatus::Claimed {
                return Err(StoreError::Conflict(
                    "Offer is not currently claimed".into(),
                ));
            }
            if offer.claimed_by.as_deref() != Some(volunteer_id) {
                return Err(StoreError::Forbidden(
                    "Only the claiming volunteer can cancel this pickup".into(),
                ));
            }

            let expiration = parse_timestamp(&offer.expiration_time)?;
            if !within_cancel_window(expiration, now) {
                return Err(StoreError::Forbidden(
                    "Cannot cancel within 24 hours of pickup time".into(),
                ));
            }

            let pickup_id = offer.pickup_id.clone();
            reopen_offer(&tx, offer_id, &now_s)?;

            if let Some(pickup_id) = pickup_id.as_deref() {
                update_pickup_status(&tx, pickup_id, PickupStatus::Cancelled, None, &now_s)?;
                append_system_message(
                    &tx,
                    pickup_id,
                    "The volunteer cancelled this pickup. The offer is open again.",
                    &now_s,
                )?;
            }

            let offer = fetch_offer(&tx, offer_id)?;
            let pickup = maybe_pickup(&tx, pickup_id.as_deref())?;
            tx.commit()?;
            Ok((offer, pickup))
        })
    }

    /// confirmed → completed, by the owning restaurant or the claiming
    /// volunteer.
    pub fn complete_offer(
        &self,
        offer_id: &str,
        actor_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<(OfferRow, Option<PickupRow>)> {
        let now_s = now.to_rfc3339();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let offer = fetch_offer(&tx, offer_id)?;
            let is_party = offer.restaurant_id == actor_id
                || offer.claimed_by.as_deref() == Some(actor_id);
            if !is_party {
                return Err(StoreError::Forbidden(
                    "Not authorized to complete this pickup".into(),
                ));
            }
            if offer_status(&offer)? != OfferStatus::Confirmed {
                return Err(StoreError::Conflict(
                    "Offer cannot be completed in current status".into(),
                ));
            }

            tx.execute(
                "UPDATE food_offers SET status = ?2, completed_at = ?3, updated_at = ?3
                 WHERE id = ?1",
                params![offer_id, OfferStatus::Completed.as_str(), now_s],
            )?;

            if let Some(pickup_id) = offer.pickup_id.as_deref() {
                update_pickup_status(&tx, pickup_id, PickupStatus::Completed, None, &now_s)?;
                append_system_message(
                    &tx,
                    pickup_id,
                    "Pickup completed. Thank you for reducing food waste!",
                    &now_s,
                )?;
            }

            let offer = fetch_offer(&tx, offer_id)?;
            let pickup = maybe_pickup(&tx, offer.pickup_id.as_deref())?;
            tx.commit()?;
            Ok((offer, pickup))
        })
    }

    /// open → cancelled, by the owning restaurant. The only removal path an
    /// offer has.
    pub fn cancel_offer(
        &self,
        offer_id: &str,
        restaurant_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<OfferRow> {
        let now_s = now.to_rfc3339();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let offer = fetch_offer(&tx, offer_id)?;
            if offer.restaurant_id != restaurant_id {
                return Err(StoreError::Forbidden(
                    "Not authorized to manage this offer".into(),
                ));
            }
            if offer_status(&offer)? != OfferStatus::Open {
                return Err(StoreError::Conflict(
                    "Only open offers can be cancelled".into(),
                ));
            }

            tx.execute(
                "UPDATE food_offers SET status = ?2, cancelled_at = ?3, updated_at = ?3
                 WHERE id = ?1",
                params![offer_id, OfferStatus::Cancelled.as_str(), now_s],
            )?;

            let offer = fetch_offer(&tx, offer_id)?;
            tx.commit()?;
            Ok(offer)
        })
    }
}

fn fetch_offer(conn: &Connection, id: &str) -> StoreResult<OfferRow> {
    conn.query_row(
        &format!("SELECT {OFFER_COLUMNS} FROM food_offers WHERE id = ?1"),
        [id],
        map_offer,
    )
    .optional()?
    .ok_or(StoreError::NotFound("offer"))
}

fn fetch_pickup(conn: &Connection, id: &str) -> StoreResult<PickupRow> {
    conn.query_row(
        &format!("SELECT {PICKUP_COLUMNS} FROM pickups WHERE id = ?1"),
        [id],
        map_pickup,
    )
    .optional()?
    .ok_or(StoreError::NotFound("pickup"))
}

fn maybe_pickup(conn: &Connection, id: Option<&str>) -> StoreResult<Option<PickupRow>> {
    match id {
        Some(id) => Ok(Some(fetch_pickup(conn, id)?)),
        None => Ok(None),
    }
}

fn offer_status(offer: &OfferRow) -> StoreResult<OfferStatus> {
    offer
        .status
        .parse()
        .map_err(|_| StoreError::Invalid(format!("corrupt offer status: {}", offer.status)))
}

fn parse_timestamp(value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::Invalid(format!("corrupt timestamp: {value}")))
}

/// Clears the claim fields and puts the offer back on the board.
fn reopen_offer(conn: &Connection, offer_id: &str, now: &str) -> StoreResult<()> {
    conn.execute(
        "UPDATE food_offers
         SET status = ?2, claimed_by = NULL, claimed_by_name = NULL, claimed_at = NULL,
             pickup_id = NULL, updated_at = ?3
         WHERE id = ?1",
        params![offer_id, OfferStatus::Open.as_str(), now],
    )?;
    Ok(())
}

fn update_pickup_status(
    conn: &Connection,
    pickup_id: &str,
    status: PickupStatus,
    cancel_reason: Option<&str>,
    now: &str,
) -> StoreResult<()> {
    conn.execute(
        "UPDATE pickups
         SET status = ?2, cancel_reason = COALESCE(?3, cancel_reason), updated_at = ?4
         WHERE id = ?1",
        params![pickup_id, status.as_str(), cancel_reason, now],
    )?;
    Ok(())
}

fn append_system_message(
    conn: &Connection,
    pickup_id: &str,
    content: &str,
    now: &str,
) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO messages (id, pickup_id, sender_id, kind, content, created_at)
         VALUES (?1, ?2, NULL, ?3, ?4, ?5)",
        params![
            Uuid::new_v4().to_string(),
            pickup_id,
            MessageKind::System.as_str(),
            content,
            now,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use harvest_types::models::{Role, UserStatus};

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed_user(db: &Database, role: Role, name: &str, org: Option<&str>) -> UserRow {
        let now = Utc::now().to_rfc3339();
        let user = UserRow {
            id: Uuid::new_v4().to_string(),
            email: format!("{}@example.org", Uuid::new_v4()),
            password: "hash".into(),
            name: name.into(),
            role: role.to_string(),
            status: UserStatus::Active.to_string(),
            organization_id: None,
            organization_name: org.map(String::from),
            address: None,
            created_by: None,
            onboarded_at: Some(now.clone()),
            suspended_at: None,
            suspended_by: None,
            created_at: now.clone(),
            updated_at: now,
        };
        db.insert_user(&user).unwrap();
        user
    }

    fn seed_offer(db: &Database, restaurant: &UserRow, expires_in: Duration) -> OfferRow {
        let now = Utc::now();
        let offer = OfferRow {
            id: Uuid::new_v4().to_string(),
            restaurant_id: restaurant.id.clone(),
            restaurant_name: restaurant.name.clone(),
            title: "Trays of lasagna".into(),
            description: "Surplus from lunch service".into(),
            quantity: 12,
            food_type: Some("Prepared meals".into()),
            dietary_info: "[\"Vegetarian\"]".into(),
            expiration_time: (now + expires_in).to_rfc3339(),
            status: OfferStatus::Open.to_string(),
            claimed_by: None,
            claimed_by_name: None,
            claimed_at: None,
            pickup_id: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now.to_rfc3339(),
            updated_at: now.to_rfc3339(),
        };
        db.insert_offer(&offer).unwrap();
        offer
    }

    #[test]
    fn claim_creates_pickup_and_stamps_offer() {
        let db = test_db();
        let restaurant = seed_user(&db, Role::Restaurant, "Trattoria", None);
        let volunteer = seed_user(&db, Role::Volunteer, "Dana", Some("Food Runners"));
        let offer = seed_offer(&db, &restaurant, Duration::hours(48));

        let (offer, pickup) = db.claim_offer(&offer.id, &volunteer, Utc::now()).unwrap();

        assert_eq!(offer.status, "claimed");
        assert_eq!(offer.claimed_by.as_deref(), Some(volunteer.id.as_str()));
        assert_eq!(offer.claimed_by_name.as_deref(), Some("Dana (Food Runners)"));
        assert_eq!(offer.pickup_id.as_deref(), Some(pickup.id.as_str()));
        assert_eq!(pickup.status, "pending");
        assert_eq!(pickup.restaurant_id, restaurant.id);

        let messages = db.messages_for_pickup(&pickup.id).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind, "system");
        assert!(messages[0].sender_id.is_none());
    }

    #[test]
    fn claiming_a_non_open_offer_conflicts_and_changes_nothing() {
        let db = test_db();
        let restaurant = seed_user(&db, Role::Restaurant, "Trattoria", None);
        let first = seed_user(&db, Role::Volunteer, "Dana", None);
        let second = seed_user(&db, Role::Volunteer, "Eli", None);
        let offer = seed_offer(&db, &restaurant, Duration::hours(48));

        db.claim_offer(&offer.id, &first, Utc::now()).unwrap();
        let err = db.claim_offer(&offer.id, &second, Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let offer = db.get_offer(&offer.id).unwrap().unwrap();
        assert_eq!(offer.claimed_by.as_deref(), Some(first.id.as_str()));
    }

    #[test]
    fn confirm_requires_the_owning_restaurant() {
        let db = test_db();
        let restaurant = seed_user(&db, Role::Restaurant, "Trattoria", None);
        let other = seed_user(&db, Role::Restaurant, "Bistro", None);
        let volunteer = seed_user(&db, Role::Volunteer, "Dana", None);
        let offer = seed_offer(&db, &restaurant, Duration::hours(48));

        db.claim_offer(&offer.id, &volunteer, Utc::now()).unwrap();

        let err = db
            .confirm_offer(&offer.id, &other.id, Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));
        assert_eq!(db.get_offer(&offer.id).unwrap().unwrap().status, "claimed");

        let (offer, pickup) = db
            .confirm_offer(&offer.id, &restaurant.id, Utc::now())
            .unwrap();
        assert_eq!(offer.status, "confirmed");
        assert_eq!(pickup.unwrap().status, "confirmed");
    }

    #[test]
    fn complete_runs_only_from_confirmed_and_only_for_parties() {
        let db = test_db();
        let restaurant = seed_user(&db, Role::Restaurant, "Trattoria", None);
        let volunteer = seed_user(&db, Role::Volunteer, "Dana", None);
        let stranger = seed_user(&db, Role::Volunteer, "Eli", None);
        let offer = seed_offer(&db, &restaurant, Duration::hours(48));

        db.claim_offer(&offer.id, &volunteer, Utc::now()).unwrap();

        // Not yet confirmed
        let err = db
            .complete_offer(&offer.id, &volunteer.id, Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        db.confirm_offer(&offer.id, &restaurant.id, Utc::now())
            .unwrap();

        let err = db
            .complete_offer(&offer.id, &stranger.id, Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        let (offer_row, pickup) = db
            .complete_offer(&offer.id, &volunteer.id, Utc::now())
            .unwrap();
        assert_eq!(offer_row.status, "completed");
        assert!(offer_row.completed_at.is_some());
        assert_eq!(pickup.unwrap().status, "completed");

        // Terminal: a second complete conflicts
        let err = db
            .complete_offer(&offer.id, &restaurant.id, Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn reject_reopens_and_clears_claim_fields() {
        let db = test_db();
        let restaurant = seed_user(&db, Role::Restaurant, "Trattoria", None);
        let volunteer = seed_user(&db, Role::Volunteer, "Dana", None);
        let offer = seed_offer(&db, &restaurant, Duration::hours(48));

        let (_, pickup) = db.claim_offer(&offer.id, &volunteer, Utc::now()).unwrap();
        let (offer_row, released) = db
            .release_claim(
                &offer.id,
                &restaurant.id,
                PickupStatus::Rejected,
                None,
                Utc::now(),
            )
            .unwrap();

        assert_eq!(offer_row.status, "open");
        assert!(offer_row.claimed_by.is_none());
        assert!(offer_row.claimed_at.is_none());
        assert!(offer_row.pickup_id.is_none());
        assert_eq!(released.unwrap().status, "rejected");

        // The pickup record survives the re-open for audit/chat history
        assert_eq!(db.get_pickup(&pickup.id).unwrap().unwrap().status, "rejected");
    }

    #[test]
    fn restaurant_cancel_records_reason() {
        let db = test_db();
        let restaurant = seed_user(&db, Role::Restaurant, "Trattoria", None);
        let volunteer = seed_user(&db, Role::Volunteer, "Dana", None);
        let offer = seed_offer(&db, &restaurant, Duration::hours(48));

        db.claim_offer(&offer.id, &volunteer, Utc::now()).unwrap();
        let (_, pickup) = db
            .release_claim(
                &offer.id,
                &restaurant.id,
                PickupStatus::Cancelled,
                Some("Kitchen closed early"),
                Utc::now(),
            )
            .unwrap();

        let pickup = pickup.unwrap();
        assert_eq!(pickup.status, "cancelled");
        assert_eq!(pickup.cancel_reason.as_deref(), Some("Kitchen closed early"));
    }

    #[test]
    fn withdraw_respects_the_24h_cutoff() {
        let db = test_db();
        let restaurant = seed_user(&db, Role::Restaurant, "Trattoria", None);
        let volunteer = seed_user(&db, Role::Volunteer, "Dana", None);

        // Expires too soon: refused
        let soon = seed_offer(&db, &restaurant, Duration::hours(2));
        db.claim_offer(&soon.id, &volunteer, Utc::now()).unwrap();
        let err = db
            .withdraw_claim(&soon.id, &volunteer.id, Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));
        assert_eq!(db.get_offer(&soon.id).unwrap().unwrap().status, "claimed");

        // Plenty of time: reopened
        let later = seed_offer(&db, &restaurant, Duration::hours(48));
        db.claim_offer(&later.id, &volunteer, Utc::now()).unwrap();
        let (offer_row, pickup) = db
            .withdraw_claim(&later.id, &volunteer.id, Utc::now())
            .unwrap();
        assert_eq!(offer_row.status, "open");
        assert!(offer_row.claimed_by.is_none());
        assert_eq!(pickup.unwrap().status, "cancelled");
    }

    #[test]
    fn withdraw_requires_the_claiming_volunteer() {
        let db = test_db();
        let restaurant = seed_user(&db, Role::Restaurant, "Trattoria", None);
        let claimant = seed_user(&db, Role::Volunteer, "Dana", None);
        let other = seed_user(&db, Role::Volunteer, "Eli", None);
        let offer = seed_offer(&db, &restaurant, Duration::hours(48));

        db.claim_offer(&offer.id, &claimant, Utc::now()).unwrap();
        let err = db
            .withdraw_claim(&offer.id, &other.id, Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));
    }

    #[test]
    fn cancel_only_from_open() {
        let db = test_db();
        let restaurant = seed_user(&db, Role::Restaurant, "Trattoria", None);
        let volunteer = seed_user(&db, Role::Volunteer, "Dana", None);
        let offer = seed_offer(&db, &restaurant, Duration::hours(48));

        db.claim_offer(&offer.id, &volunteer, Utc::now()).unwrap();
        let err = db
            .cancel_offer(&offer.id, &restaurant.id, Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let open = seed_offer(&db, &restaurant, Duration::hours(48));
        let cancelled = db.cancel_offer(&open.id, &restaurant.id, Utc::now()).unwrap();
        assert_eq!(cancelled.status, "cancelled");
        assert!(cancelled.cancelled_at.is_some());
    }

    #[test]
    fn every_transition_appends_a_system_message() {
        let db = test_db();
        let restaurant = seed_user(&db, Role::Restaurant, "Trattoria", None);
        let volunteer = seed_user(&db, Role::Volunteer, "Dana", None);
        let offer = seed_offer(&db, &restaurant, Duration::hours(48));

        let (_, pickup) = db.claim_offer(&offer.id, &volunteer, Utc::now()).unwrap();
        db.confirm_offer(&offer.id, &restaurant.id, Utc::now())
            .unwrap();
        db.complete_offer(&offer.id, &restaurant.id, Utc::now())
            .unwrap();

        let messages = db.messages_for_pickup(&pickup.id).unwrap();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m.kind == "system"));
    }

    #[test]
    fn unknown_offer_is_not_found() {
        let db = test_db();
        let volunteer = seed_user(&db, Role::Volunteer, "Dana", None);
        let err = db
            .claim_offer(&Uuid::new_v4().to_string(), &volunteer, Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
