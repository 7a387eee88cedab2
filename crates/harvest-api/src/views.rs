//! Row → response shaping. Rows keep ids, statuses and timestamps as strings;
//! the parsers here fall back to inert values on corrupt data (nil id, epoch
//! timestamp, terminal status) rather than failing a whole listing.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use harvest_db::models::{MessageRow, OfferRow, OrganizationRow, PickupRow, UserRow};
use harvest_types::api::{
    MessageResponse, OfferResponse, OrganizationResponse, PartyResponse, PickupResponse,
    UserResponse,
};
use harvest_types::models::{MessageKind, OfferStatus, PickupStatus, Role, UserStatus};

fn parse_or<T: FromStr>(value: &str, what: &str, fallback: T) -> T {
    value.parse().unwrap_or_else(|_| {
        warn!("Corrupt {what} '{value}' in store");
        fallback
    })
}

pub(crate) fn parse_uuid(value: &str, what: &str) -> Uuid {
    parse_or(value, what, Uuid::default())
}

fn opt_uuid(value: Option<&str>, what: &str) -> Option<Uuid> {
    value.map(|v| parse_uuid(v, what))
}

pub(crate) fn parse_ts(value: &str, what: &str) -> DateTime<Utc> {
    parse_or(value, what, DateTime::default())
}

fn opt_ts(value: Option<&str>, what: &str) -> Option<DateTime<Utc>> {
    value.map(|v| parse_ts(v, what))
}

pub fn user_response(row: &UserRow) -> UserResponse {
    UserResponse {
        id: parse_uuid(&row.id, "user id"),
        email: row.email.clone(),
        name: row.name.clone(),
        role: parse_or(&row.role, "role", Role::Volunteer),
        status: parse_or(&row.status, "user status", UserStatus::Suspended),
        organization_id: opt_uuid(row.organization_id.as_deref(), "organization id"),
        organization_name: row.organization_name.clone(),
        address: row.address.clone(),
        created_at: parse_ts(&row.created_at, "created_at"),
    }
}

pub fn organization_response(row: &OrganizationRow) -> OrganizationResponse {
    OrganizationResponse {
        id: parse_uuid(&row.id, "organization id"),
        name: row.name.clone(),
        admin_id: parse_uuid(&row.admin_id, "admin id"),
        created_at: parse_ts(&row.created_at, "created_at"),
    }
}

pub fn offer_response(row: &OfferRow) -> OfferResponse {
    let dietary_info: Vec<String> =
        serde_json::from_str(&row.dietary_info).unwrap_or_else(|_| {
            warn!("Corrupt dietary_info on offer '{}'", row.id);
            vec![]
        });

    OfferResponse {
        id: parse_uuid(&row.id, "offer id"),
        restaurant_id: parse_uuid(&row.restaurant_id, "restaurant id"),
        restaurant_name: row.restaurant_name.clone(),
        title: row.title.clone(),
        description: row.description.clone(),
        quantity: row.quantity,
        food_type: row.food_type.clone(),
        dietary_info,
        expiration_time: parse_ts(&row.expiration_time, "expiration_time"),
        status: parse_or(&row.status, "offer status", OfferStatus::Expired),
        claimed_by: opt_uuid(row.claimed_by.as_deref(), "claimed_by"),
        claimed_by_name: row.claimed_by_name.clone(),
        claimed_at: opt_ts(row.claimed_at.as_deref(), "claimed_at"),
        pickup_id: opt_uuid(row.pickup_id.as_deref(), "pickup id"),
        completed_at: opt_ts(row.completed_at.as_deref(), "completed_at"),
        cancelled_at: opt_ts(row.cancelled_at.as_deref(), "cancelled_at"),
        created_at: parse_ts(&row.created_at, "created_at"),
        updated_at: parse_ts(&row.updated_at, "updated_at"),
    }
}

pub fn pickup_response(row: &PickupRow) -> PickupResponse {
    PickupResponse {
        id: parse_uuid(&row.id, "pickup id"),
        food_offer_id: parse_uuid(&row.food_offer_id, "offer id"),
        volunteer_id: parse_uuid(&row.volunteer_id, "volunteer id"),
        volunteer_name: row.volunteer_name.clone(),
        restaurant_id: parse_uuid(&row.restaurant_id, "restaurant id"),
        status: parse_or(&row.status, "pickup status", PickupStatus::Cancelled),
        cancel_reason: row.cancel_reason.clone(),
        created_at: parse_ts(&row.created_at, "created_at"),
        updated_at: parse_ts(&row.updated_at, "updated_at"),
        offer: None,
        restaurant: None,
        volunteer: None,
    }
}

/// Pickup enriched with its offer and both parties, as the detail endpoint
/// returns it.
pub fn pickup_detail(
    row: &PickupRow,
    offer: Option<&OfferRow>,
    restaurant: Option<&UserRow>,
    volunteer: Option<&UserRow>,
) -> PickupResponse {
    let mut pickup = pickup_response(row);
    pickup.offer = offer.map(offer_response);
    pickup.restaurant = restaurant.map(|r| PartyResponse {
        id: parse_uuid(&r.id, "user id"),
        name: r.name.clone(),
        address: r.address.clone(),
        organization_name: None,
    });
    pickup.volunteer = volunteer.map(|v| PartyResponse {
        id: parse_uuid(&v.id, "user id"),
        name: v.display_name(),
        address: v.address.clone(),
        organization_name: v.organization_name.clone(),
    });
    pickup
}

pub fn message_response(row: &MessageRow) -> MessageResponse {
    MessageResponse {
        id: parse_uuid(&row.id, "message id"),
        pickup_id: parse_uuid(&row.pickup_id, "pickup id"),
        sender_id: opt_uuid(row.sender_id.as_deref(), "sender id"),
        sender_name: row.sender_name.clone(),
        kind: parse_or(&row.kind, "message kind", MessageKind::Text),
        content: row.content.clone(),
        created_at: parse_ts(&row.created_at, "created_at"),
    }
}
