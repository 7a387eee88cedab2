use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::models::{
    MessageRow, OfferRow, OrganizationRow, PickupRow, ReportSummaryRow, UserRow,
};
use crate::{Database, StoreResult};

const USER_COLUMNS: &str = "id, email, password, name, role, status, organization_id, \
     organization_name, address, created_by, onboarded_at, suspended_at, suspended_by, \
     created_at, updated_at";

pub(crate) const OFFER_COLUMNS: &str = "id, restaurant_id, restaurant_name, title, description, quantity, \
     food_type, dietary_info, expiration_time, status, claimed_by, claimed_by_name, claimed_at, \
     pickup_id, completed_at, cancelled_at, created_at, updated_at";

pub(crate) const PICKUP_COLUMNS: &str = "id, food_offer_id, volunteer_id, volunteer_name, restaurant_id, \
     status, cancel_reason, created_at, updated_at";

impl Database {
    // -- Users --

    pub fn insert_user(&self, user: &UserRow) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO users ({USER_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
                ),
                params![
                    user.id,
                    user.email,
                    user.password,
                    user.name,
                    user.role,
                    user.status,
                    user.organization_id,
                    user.organization_name,
                    user.address,
                    user.created_by,
                    user.onboarded_at,
                    user.suspended_at,
                    user.suspended_by,
                    user.created_at,
                    user.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                    [id],
                    map_user,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_email_and_role(
        &self,
        email: &str,
        role: &str,
    ) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1 AND role = ?2"),
                    [email, role],
                    map_user,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn email_taken(&self, email: &str) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let count: u64 =
                conn.query_row("SELECT COUNT(*) FROM users WHERE email = ?1", [email], |r| {
                    r.get(0)
                })?;
            Ok(count > 0)
        })
    }

    pub fn master_admin_exists(&self) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let count: u64 = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'master_admin'",
                [],
                |r| r.get(0),
            )?;
            Ok(count > 0)
        })
    }

    pub fn list_users_by_roles(&self, roles: &[&str]) -> StoreResult<Vec<UserRow>> {
        if roles.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=roles.len()).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users WHERE role IN ({}) ORDER BY created_at",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let db_params: Vec<&dyn rusqlite::types::ToSql> = roles
                .iter()
                .map(|r| r as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(db_params.as_slice(), map_user)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_volunteers_by_org(&self, organization_id: &str) -> StoreResult<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE role = 'volunteer' AND organization_id = ?1
                 ORDER BY created_at"
            ))?;
            let rows = stmt
                .query_map([organization_id], map_user)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_active_volunteers(&self) -> StoreResult<u64> {
        self.with_conn(|conn| {
            let count: u64 = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'volunteer' AND status = 'active'",
                [],
                |r| r.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn suspend_user(&self, id: &str, suspended_by: &str, now: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET status = 'suspended', suspended_at = ?2, suspended_by = ?3,
                 updated_at = ?2 WHERE id = ?1",
                params![id, now, suspended_by],
            )?;
            Ok(())
        })
    }

    pub fn unsuspend_user(&self, id: &str, new_status: &str, now: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET status = ?2, suspended_at = NULL, suspended_by = NULL,
                 updated_at = ?3 WHERE id = ?1",
                params![id, new_status, now],
            )?;
            Ok(())
        })
    }

    pub fn complete_onboarding(
        &self,
        id: &str,
        address: Option<&str>,
        now: &str,
    ) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET status = 'active', address = ?2, onboarded_at = ?3,
                 updated_at = ?3 WHERE id = ?1",
                params![id, address, now],
            )?;
            Ok(())
        })
    }

    pub fn update_password(&self, id: &str, password_hash: &str, now: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET password = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, password_hash, now],
            )?;
            Ok(())
        })
    }

    pub fn delete_user(&self, id: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn delete_offers_by_restaurant(&self, restaurant_id: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM food_offers WHERE restaurant_id = ?1",
                [restaurant_id],
            )?;
            Ok(())
        })
    }

    pub fn delete_users_by_org(&self, organization_id: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM users WHERE organization_id = ?1",
                [organization_id],
            )?;
            Ok(())
        })
    }

    // -- Organizations --

    pub fn insert_organization(&self, org: &OrganizationRow) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO organizations (id, name, admin_id, created_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![org.id, org.name, org.admin_id, org.created_by, org.created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_organization(&self, id: &str) -> StoreResult<Option<OrganizationRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, name, admin_id, created_by, created_at
                     FROM organizations WHERE id = ?1",
                    [id],
                    map_organization,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_organizations(&self) -> StoreResult<Vec<OrganizationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, admin_id, created_by, created_at
                 FROM organizations ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([], map_organization)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_organization(&self, id: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM organizations WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Offers --

    pub fn insert_offer(&self, offer: &OfferRow) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO food_offers ({OFFER_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
                ),
                params![
                    offer.id,
                    offer.restaurant_id,
                    offer.restaurant_name,
                    offer.title,
                    offer.description,
                    offer.quantity,
                    offer.food_type,
                    offer.dietary_info,
                    offer.expiration_time,
                    offer.status,
                    offer.claimed_by,
                    offer.claimed_by_name,
                    offer.claimed_at,
                    offer.pickup_id,
                    offer.completed_at,
                    offer.cancelled_at,
                    offer.created_at,
                    offer.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_offer(&self, id: &str) -> StoreResult<Option<OfferRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {OFFER_COLUMNS} FROM food_offers WHERE id = ?1"),
                    [id],
                    map_offer,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_open_offers(&self) -> StoreResult<Vec<OfferRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {OFFER_COLUMNS} FROM food_offers
                 WHERE status = 'open' ORDER BY created_at DESC"
            ))?;
            let rows = stmt
                .query_map([], map_offer)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_offers_by_restaurant(&self, restaurant_id: &str) -> StoreResult<Vec<OfferRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {OFFER_COLUMNS} FROM food_offers
                 WHERE restaurant_id = ?1 ORDER BY created_at DESC"
            ))?;
            let rows = stmt
                .query_map([restaurant_id], map_offer)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Pickups --

    pub fn get_pickup(&self, id: &str) -> StoreResult<Option<PickupRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {PICKUP_COLUMNS} FROM pickups WHERE id = ?1"),
                    [id],
                    map_pickup,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, message: &MessageRow) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, pickup_id, sender_id, kind, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    message.id,
                    message.pickup_id,
                    message.sender_id,
                    message.kind,
                    message.content,
                    message.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn messages_for_pickup(&self, pickup_id: &str) -> StoreResult<Vec<MessageRow>> {
        self.with_conn(|conn| {
            // JOIN users to fetch sender names in a single query
            let mut stmt = conn.prepare(
                "SELECT m.id, m.pickup_id, m.sender_id, u.name, m.kind, m.content, m.created_at
                 FROM messages m
                 LEFT JOIN users u ON m.sender_id = u.id
                 WHERE m.pickup_id = ?1
                 ORDER BY m.created_at",
            )?;
            let rows = stmt
                .query_map([pickup_id], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        pickup_id: row.get(1)?,
                        sender_id: row.get(2)?,
                        sender_name: row.get(3)?,
                        kind: row.get(4)?,
                        content: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Reports --

    pub fn report_summary(&self) -> StoreResult<ReportSummaryRow> {
        self.with_conn(|conn| {
            let total_offers = count(conn, "SELECT COUNT(*) FROM food_offers")?;

            let mut stmt =
                conn.prepare("SELECT status, COUNT(*) FROM food_offers GROUP BY status")?;
            let offers_by_status = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ReportSummaryRow {
                total_offers,
                offers_by_status,
                total_pickups: count(conn, "SELECT COUNT(*) FROM pickups")?,
                completed_pickups: count(
                    conn,
                    "SELECT COUNT(*) FROM pickups WHERE status = 'completed'",
                )?,
                quantity_offered: count(
                    conn,
                    "SELECT COALESCE(SUM(quantity), 0) FROM food_offers",
                )?,
                quantity_rescued: count(
                    conn,
                    "SELECT COALESCE(SUM(quantity), 0) FROM food_offers WHERE status = 'completed'",
                )?,
                active_restaurants: count(
                    conn,
                    "SELECT COUNT(*) FROM users WHERE role = 'restaurant' AND status = 'active'",
                )?,
                active_volunteers: count(
                    conn,
                    "SELECT COUNT(*) FROM users WHERE role = 'volunteer' AND status = 'active'",
                )?,
                organizations: count(conn, "SELECT COUNT(*) FROM organizations")?,
            })
        })
    }
}

fn count(conn: &Connection, sql: &str) -> StoreResult<u64> {
    let n: u64 = conn.query_row(sql, [], |r| r.get(0))?;
    Ok(n)
}

pub(crate) fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        name: row.get(3)?,
        role: row.get(4)?,
        status: row.get(5)?,
        organization_id: row.get(6)?,
        organization_name: row.get(7)?,
        address: row.get(8)?,
        created_by: row.get(9)?,
        onboarded_at: row.get(10)?,
        suspended_at: row.get(11)?,
        suspended_by: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn map_organization(row: &Row<'_>) -> rusqlite::Result<OrganizationRow> {
    Ok(OrganizationRow {
        id: row.get(0)?,
        name: row.get(1)?,
        admin_id: row.get(2)?,
        created_by: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub(crate) fn map_offer(row: &Row<'_>) -> rusqlite::Result<OfferRow> {
    Ok(OfferRow {
        id: row.get(0)?,
        restaurant_id: row.get(1)?,
        restaurant_name: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        quantity: row.get(5)?,
        food_type: row.get(6)?,
        dietary_info: row.get(7)?,
        expiration_time: row.get(8)?,
        status: row.get(9)?,
        claimed_by: row.get(10)?,
        claimed_by_name: row.get(11)?,
        claimed_at: row.get(12)?,
        pickup_id: row.get(13)?,
        completed_at: row.get(14)?,
        cancelled_at: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

pub(crate) fn map_pickup(row: &Row<'_>) -> rusqlite::Result<PickupRow> {
    Ok(PickupRow {
        id: row.get(0)?,
        food_offer_id: row.get(1)?,
        volunteer_id: row.get(2)?,
        volunteer_name: row.get(3)?,
        restaurant_id: row.get(4)?,
        status: row.get(5)?,
        cancel_reason: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: &str, status: &str, email: &str) -> UserRow {
        let now = Utc::now().to_rfc3339();
        UserRow {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password: "hash".into(),
            name: "Someone".into(),
            role: role.into(),
            status: status.into(),
            organization_id: None,
            organization_name: None,
            address: None,
            created_by: None,
            onboarded_at: None,
            suspended_at: None,
            suspended_by: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    #[test]
    fn email_uniqueness_is_visible_before_insert() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.email_taken("kitchen@trattoria.example").unwrap());

        db.insert_user(&user("restaurant", "active", "kitchen@trattoria.example"))
            .unwrap();
        assert!(db.email_taken("kitchen@trattoria.example").unwrap());

        // The UNIQUE constraint backs it up
        let dup = db.insert_user(&user("restaurant", "active", "kitchen@trattoria.example"));
        assert!(dup.is_err());
    }

    #[test]
    fn suspend_and_unsuspend_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let admin = user("master_admin", "active", "admin@example.org");
        let volunteer = user("volunteer", "active", "dana@example.org");
        db.insert_user(&admin).unwrap();
        db.insert_user(&volunteer).unwrap();

        let now = Utc::now().to_rfc3339();
        db.suspend_user(&volunteer.id, &admin.id, &now).unwrap();
        let row = db.get_user_by_id(&volunteer.id).unwrap().unwrap();
        assert_eq!(row.status, "suspended");
        assert_eq!(row.suspended_by.as_deref(), Some(admin.id.as_str()));

        db.unsuspend_user(&volunteer.id, "active", &now).unwrap();
        let row = db.get_user_by_id(&volunteer.id).unwrap().unwrap();
        assert_eq!(row.status, "active");
        assert!(row.suspended_at.is_none());
        assert!(row.suspended_by.is_none());
    }

    #[test]
    fn master_admin_existence_check() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.master_admin_exists().unwrap());
        db.insert_user(&user("master_admin", "active", "admin@example.org"))
            .unwrap();
        assert!(db.master_admin_exists().unwrap());
    }

    #[test]
    fn report_summary_counts_what_exists() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&user("restaurant", "active", "kitchen@trattoria.example"))
            .unwrap();
        db.insert_user(&user("volunteer", "active", "dana@example.org"))
            .unwrap();
        db.insert_user(&user("volunteer", "pending_onboarding", "eli@example.org"))
            .unwrap();

        let summary = db.report_summary().unwrap();
        assert_eq!(summary.total_offers, 0);
        assert_eq!(summary.active_restaurants, 1);
        assert_eq!(summary.active_volunteers, 1);
        assert_eq!(summary.organizations, 0);
    }
}
