use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{MessageKind, OfferStatus, PickupStatus, Role, UserStatus};

// -- JWT Claims --

/// Bearer-token claims. Demo tokens (`demo-token-<uid>`) bypass JWT decoding
/// and are resolved against the user store instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterMasterAdminRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrgAdminRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub organization_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRestaurantRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateVolunteerRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Role-specific onboarding payload; extra keys are tolerated since the
/// form differs per role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteOnboardingRequest {
    pub location: Option<String>,
    pub food_types: Option<Vec<String>>,
    pub waste_frequency: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserIdRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub status: UserStatus,
    pub organization_id: Option<Uuid>,
    pub organization_name: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
    pub needs_onboarding: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub name: String,
    pub admin_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUsersResponse {
    pub active_users: Vec<UserResponse>,
    pub pending_users: Vec<UserResponse>,
    pub organizations: Vec<OrganizationResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgVolunteersResponse {
    pub active_volunteers: Vec<UserResponse>,
    pub pending_volunteers: Vec<UserResponse>,
    pub organization: Option<OrganizationResponse>,
}

// -- Offers --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOfferRequest {
    pub title: String,
    pub description: String,
    pub quantity: u32,
    #[serde(default)]
    pub food_type: Option<String>,
    pub expiration_time: DateTime<Utc>,
    #[serde(default)]
    pub dietary_info: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub restaurant_name: String,
    pub title: String,
    pub description: String,
    pub quantity: u32,
    pub food_type: Option<String>,
    pub dietary_info: Vec<String>,
    pub expiration_time: DateTime<Utc>,
    pub status: OfferStatus,
    pub claimed_by: Option<Uuid>,
    pub claimed_by_name: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub pickup_id: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferListResponse {
    pub offers: Vec<OfferResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferTransitionResponse {
    pub message: String,
    pub offer: OfferResponse,
}

// -- Pickups --

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancelPickupRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyResponse {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub organization_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupResponse {
    pub id: Uuid,
    pub food_offer_id: Uuid,
    pub volunteer_id: Uuid,
    pub volunteer_name: String,
    pub restaurant_id: Uuid,
    pub status: PickupStatus,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<OfferResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<PartyResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volunteer: Option<PartyResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupDetailResponse {
    pub pickup: PickupResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub pickup: PickupResponse,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupTransitionResponse {
    pub message: String,
    pub pickup: PickupResponse,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessageRequest {
    pub pickup_id: Uuid,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub pickup_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub sender_name: Option<String>,
    pub kind: MessageKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub messages: Vec<MessageResponse>,
    pub pickup: PickupResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessageResponse {
    pub message: MessageResponse,
}

// -- Volunteers --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCountResponse {
    pub count: u64,
}

// -- Reports --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummaryResponse {
    pub total_offers: u64,
    pub offers_by_status: BTreeMap<String, u64>,
    pub total_pickups: u64,
    pub completed_pickups: u64,
    pub quantity_offered: u64,
    pub quantity_rescued: u64,
    pub active_restaurants: u64,
    pub active_volunteers: u64,
    pub organizations: u64,
}
