/// Database row types — these map directly to SQLite rows. Ids, statuses and
/// timestamps stay as strings here; the API layer parses them into typed
/// values when shaping responses.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
    pub status: String,
    pub organization_id: Option<String>,
    pub organization_name: Option<String>,
    pub address: Option<String>,
    pub created_by: Option<String>,
    pub onboarded_at: Option<String>,
    pub suspended_at: Option<String>,
    pub suspended_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    /// "Name (Organization)" for volunteers with an affiliation, plain name
    /// otherwise.
    pub fn display_name(&self) -> String {
        match &self.organization_name {
            Some(org) => format!("{} ({})", self.name, org),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrganizationRow {
    pub id: String,
    pub name: String,
    pub admin_id: String,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct OfferRow {
    pub id: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub title: String,
    pub description: String,
    pub quantity: u32,
    pub food_type: Option<String>,
    pub dietary_info: String,
    pub expiration_time: String,
    pub status: String,
    pub claimed_by: Option<String>,
    pub claimed_by_name: Option<String>,
    pub claimed_at: Option<String>,
    pub pickup_id: Option<String>,
    pub completed_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct PickupRow {
    pub id: String,
    pub food_offer_id: String,
    pub volunteer_id: String,
    pub volunteer_name: String,
    pub restaurant_id: String,
    pub status: String,
    pub cancel_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub pickup_id: String,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub kind: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ReportSummaryRow {
    pub total_offers: u64,
    pub offers_by_status: Vec<(String, u64)>,
    pub total_pickups: u64,
    pub completed_pickups: u64,
    pub quantity_offered: u64,
    pub quantity_rescued: u64,
    pub active_restaurants: u64,
    pub active_volunteers: u64,
    pub organizations: u64,
}
