use rusqlite::Connection;
use tracing::info;

use crate::StoreResult;

pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS organizations (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            admin_id    TEXT NOT NULL,
            created_by  TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id                  TEXT PRIMARY KEY,
            email               TEXT NOT NULL UNIQUE,
            password            TEXT NOT NULL,
            name                TEXT NOT NULL,
            role                TEXT NOT NULL,
            status              TEXT NOT NULL,
            organization_id     TEXT,
            organization_name   TEXT,
            address             TEXT,
            created_by          TEXT,
            onboarded_at        TEXT,
            suspended_at        TEXT,
            suspended_by        TEXT,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_users_role
            ON users(role, status);
        CREATE INDEX IF NOT EXISTS idx_users_org
            ON users(organization_id);

        CREATE TABLE IF NOT EXISTS food_offers (
            id                  TEXT PRIMARY KEY,
            restaurant_id       TEXT NOT NULL,
            restaurant_name     TEXT NOT NULL,
            title               TEXT NOT NULL,
            description         TEXT NOT NULL,
            quantity            INTEGER NOT NULL,
            food_type           TEXT,
            dietary_info        TEXT NOT NULL DEFAULT '[]',
            expiration_time     TEXT NOT NULL,
            status              TEXT NOT NULL,
            claimed_by          TEXT,
            claimed_by_name     TEXT,
            claimed_at          TEXT,
            pickup_id           TEXT,
            completed_at        TEXT,
            cancelled_at        TEXT,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_offers_status
            ON food_offers(status, created_at);
        CREATE INDEX IF NOT EXISTS idx_offers_restaurant
            ON food_offers(restaurant_id, created_at);

        CREATE TABLE IF NOT EXISTS pickups (
            id              TEXT PRIMARY KEY,
            food_offer_id   TEXT NOT NULL REFERENCES food_offers(id) ON DELETE CASCADE,
            volunteer_id    TEXT NOT NULL,
            volunteer_name  TEXT NOT NULL,
            restaurant_id   TEXT NOT NULL,
            status          TEXT NOT NULL,
            cancel_reason   TEXT,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_pickups_offer
            ON pickups(food_offer_id);

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            pickup_id   TEXT NOT NULL REFERENCES pickups(id) ON DELETE CASCADE,
            sender_id   TEXT,
            kind        TEXT NOT NULL,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_pickup
            ON messages(pickup_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
