use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use uuid::Uuid;

use harvest_db::models::{OrganizationRow, UserRow};
use harvest_types::api::{
    AdminLoginRequest, AdminUsersResponse, ChangePasswordRequest, Claims,
    CompleteOnboardingRequest, CreateOrgAdminRequest, CreateRestaurantRequest,
    CreateVolunteerRequest, LoginRequest, LoginResponse, OrgVolunteersResponse,
    RegisterMasterAdminRequest, UserIdRequest,
};
use harvest_types::models::{Role, UserStatus};

use crate::error::{ApiError, ApiResult};
use crate::middleware::current_user;
use crate::views::{organization_response, user_response};
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 8;

// -- Public endpoints --

pub async fn admin_exists(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let exists = state.db.master_admin_exists()?;
    Ok(Json(json!({ "exists": exists })))
}

/// One-time bootstrap: works only while no master admin exists.
pub async fn register_master_admin(
    State(state): State<AppState>,
    Json(req): Json<RegisterMasterAdminRequest>,
) -> ApiResult<impl IntoResponse> {
    if state.db.master_admin_exists()? {
        return Err(ApiError::Forbidden("Master admin already registered".into()));
    }

    let email = validate_new_account(&state, &req.email, &req.password, &req.name)?;
    let user = new_user_row(
        &email,
        &hash_password(&req.password)?,
        req.name.trim(),
        Role::MasterAdmin,
        UserStatus::Active,
        None,
        None,
    );
    state.db.insert_user(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Master admin registered successfully",
            "admin": { "id": user.id, "email": user.email, "name": user.name },
        })),
    ))
}

pub async fn master_admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    login_flow(
        &state,
        &req.email,
        &req.password,
        Role::MasterAdmin,
        "No master admin registered",
    )
}

pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    login_flow(
        &state,
        &req.email,
        &req.password,
        Role::OrgAdmin,
        "No organizational admin account found",
    )
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if !matches!(req.role, Role::Restaurant | Role::Volunteer) {
        return Err(ApiError::Validation("Invalid role".into()));
    }

    login_flow(
        &state,
        &req.email,
        &req.password,
        req.role,
        "No account found. Contact admin for registration",
    )
}

// -- Account management (authenticated) --

/// Master admin creates an org admin together with its organization.
pub async fn create_org_admin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOrgAdminRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = current_user(&state, &claims)?;
    require_role(
        &admin,
        Role::MasterAdmin,
        "Only master admin can create organizational admins",
    )?;

    let org_name = req.organization_name.trim();
    if org_name.is_empty() {
        return Err(ApiError::Validation(
            "Email, password, name, and organization name are required".into(),
        ));
    }

    let email = validate_new_account(&state, &req.email, &req.password, &req.name)?;
    let mut user = new_user_row(
        &email,
        &hash_password(&req.password)?,
        req.name.trim(),
        Role::OrgAdmin,
        UserStatus::PendingOnboarding,
        None,
        Some(&admin.id),
    );

    let org = OrganizationRow {
        id: Uuid::new_v4().to_string(),
        name: org_name.to_string(),
        admin_id: user.id.clone(),
        created_by: admin.id.clone(),
        created_at: user.created_at.clone(),
    };
    user.organization_id = Some(org.id.clone());
    user.organization_name = Some(org.name.clone());

    state.db.insert_organization(&org)?;
    state.db.insert_user(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Organizational admin account created. They can now sign in.",
            "user": user_response(&user),
        })),
    ))
}

pub async fn create_restaurant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateRestaurantRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = current_user(&state, &claims)?;
    require_role(
        &admin,
        Role::MasterAdmin,
        "Only master admin can create restaurant accounts",
    )?;

    let email = validate_new_account(&state, &req.email, &req.password, &req.name)?;
    let user = new_user_row(
        &email,
        &hash_password(&req.password)?,
        req.name.trim(),
        Role::Restaurant,
        UserStatus::PendingOnboarding,
        None,
        Some(&admin.id),
    );
    state.db.insert_user(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Restaurant account created. They can now sign in.",
            "user": user_response(&user),
        })),
    ))
}

/// Org admin creates a volunteer inside their own organization.
pub async fn create_volunteer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateVolunteerRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = current_user(&state, &claims)?;
    require_role(
        &admin,
        Role::OrgAdmin,
        "Only organizational admins can create volunteer accounts",
    )?;

    let email = validate_new_account(&state, &req.email, &req.password, &req.name)?;
    let org = (admin.organization_id.clone(), admin.organization_name.clone());
    let user = new_user_row(
        &email,
        &hash_password(&req.password)?,
        req.name.trim(),
        Role::Volunteer,
        UserStatus::PendingOnboarding,
        Some(org),
        Some(&admin.id),
    );
    state.db.insert_user(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Volunteer account created. They can now sign in.",
            "user": user_response(&user),
        })),
    ))
}

/// Master admin dashboard: org admins and restaurants, active and pending,
/// plus every organization.
pub async fn master_admin_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<AdminUsersResponse>> {
    let admin = current_user(&state, &claims)?;
    require_role(&admin, Role::MasterAdmin, "Only master admin can view users")?;

    let users = state
        .db
        .list_users_by_roles(&[Role::OrgAdmin.as_str(), Role::Restaurant.as_str()])?;
    let (pending, active): (Vec<_>, Vec<_>) = users
        .iter()
        .partition(|u| u.status == UserStatus::PendingOnboarding.as_str());

    let organizations = state.db.list_organizations()?;

    Ok(Json(AdminUsersResponse {
        active_users: active.into_iter().map(user_response).collect(),
        pending_users: pending.into_iter().map(user_response).collect(),
        organizations: organizations.iter().map(organization_response).collect(),
    }))
}

pub async fn org_volunteers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<OrgVolunteersResponse>> {
    let admin = current_user(&state, &claims)?;
    require_role(
        &admin,
        Role::OrgAdmin,
        "Only org admins can view their volunteers",
    )?;

    let org_id = admin
        .organization_id
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Admin has no organization".into()))?;

    let volunteers = state.db.list_volunteers_by_org(org_id)?;
    let (pending, active): (Vec<_>, Vec<_>) = volunteers
        .iter()
        .partition(|u| u.status == UserStatus::PendingOnboarding.as_str());

    let organization = state.db.get_organization(org_id)?;

    Ok(Json(OrgVolunteersResponse {
        active_volunteers: active.into_iter().map(user_response).collect(),
        pending_volunteers: pending.into_iter().map(user_response).collect(),
        organization: organization.as_ref().map(organization_response),
    }))
}

/// First-login onboarding; required fields differ per role.
pub async fn complete_onboarding(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CompleteOnboardingRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = current_user(&state, &claims)?;
    if user.status != UserStatus::PendingOnboarding.as_str() {
        return Err(ApiError::Validation("User already onboarded".into()));
    }

    let location = req
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    if user.role == Role::Restaurant.as_str() {
        let complete = location.is_some()
            && req.food_types.as_ref().is_some_and(|t| !t.is_empty())
            && req
                .waste_frequency
                .as_deref()
                .is_some_and(|f| !f.trim().is_empty());
        if !complete {
            return Err(ApiError::Validation(
                "Location, food types, and waste frequency are required".into(),
            ));
        }
    } else if location.is_none() {
        return Err(ApiError::Validation("Location is required".into()));
    }

    if let Some(phone) = req.phone.as_deref()
        && !phone.is_empty()
        && !is_valid_phone(phone)
    {
        return Err(ApiError::Validation("Invalid phone number".into()));
    }

    let now = Utc::now().to_rfc3339();
    state.db.complete_onboarding(&user.id, location, &now)?;

    let user = current_user(&state, &claims)?;
    Ok(Json(json!({
        "message": "Onboarding complete!",
        "user": user_response(&user),
    })))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = state.db.get_user_by_id(&claims.sub.to_string())?;
    Ok(Json(json!({ "user": user.as_ref().map(user_response) })))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.new_password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let user = current_user(&state, &claims)?;
    verify_password(&req.current_password, &user.password)
        .map_err(|_| ApiError::Unauthorized("Current password is incorrect".into()))?;

    let now = Utc::now().to_rfc3339();
    state
        .db
        .update_password(&user.id, &hash_password(&req.new_password)?, &now)?;

    Ok(Json(json!({ "message": "Password changed successfully" })))
}

// -- Suspension and deletion --

pub async fn suspend_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UserIdRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = current_user(&state, &claims)?;
    let target = admin_target(&state, &admin, req.user_id, "suspend")?;

    let now = Utc::now().to_rfc3339();
    state.db.suspend_user(&target.id, &admin.id, &now)?;

    let target = state.db.get_user_by_id(&target.id)?;
    Ok(Json(json!({
        "message": "User suspended successfully",
        "user": target.as_ref().map(user_response),
    })))
}

pub async fn unsuspend_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UserIdRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = current_user(&state, &claims)?;
    let target = admin_target(&state, &admin, req.user_id, "unsuspend")?;

    // Back to where they were: onboarded accounts reactivate, the rest
    // return to pending onboarding.
    let new_status = if target.onboarded_at.is_some() {
        UserStatus::Active
    } else {
        UserStatus::PendingOnboarding
    };

    let now = Utc::now().to_rfc3339();
    state
        .db
        .unsuspend_user(&target.id, new_status.as_str(), &now)?;

    let target = state.db.get_user_by_id(&target.id)?;
    Ok(Json(json!({
        "message": "User reactivated successfully",
        "user": target.as_ref().map(user_response),
    })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let admin = current_user(&state, &claims)?;
    let target = admin_target(&state, &admin, user_id, "delete")?;

    // Take associated data down with the account.
    if target.role == Role::Restaurant.as_str() {
        state.db.delete_offers_by_restaurant(&target.id)?;
    }
    if target.role == Role::OrgAdmin.as_str()
        && let Some(org_id) = target.organization_id.as_deref()
    {
        state.db.delete_users_by_org(org_id)?;
        state.db.delete_organization(org_id)?;
    }

    state.db.delete_user(&target.id)?;

    Ok(Json(json!({ "message": "User deleted successfully" })))
}

// -- Helpers --

/// Shared admin authorization for suspend/unsuspend/delete: master admin may
/// act on anyone except a master admin; org admins only on volunteers of
/// their own organization.
fn admin_target(
    state: &AppState,
    admin: &UserRow,
    user_id: Uuid,
    action: &str,
) -> ApiResult<UserRow> {
    let admin_role: Role = admin
        .role
        .parse()
        .map_err(|e| ApiError::internal(anyhow::Error::new(e)))?;
    if !admin_role.is_admin() {
        return Err(ApiError::Forbidden(format!("Only admins can {action} users")));
    }

    let target = state
        .db
        .get_user_by_id(&user_id.to_string())?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if target.role == Role::MasterAdmin.as_str() {
        return Err(ApiError::Forbidden(format!(
            "Cannot {action} master admin account"
        )));
    }

    if admin_role == Role::OrgAdmin {
        let same_org = target.role == Role::Volunteer.as_str()
            && target.organization_id == admin.organization_id
            && admin.organization_id.is_some();
        if !same_org {
            return Err(ApiError::Forbidden(format!(
                "You can only {action} volunteers in your organization"
            )));
        }
    }

    Ok(target)
}

fn require_role(user: &UserRow, role: Role, message: &str) -> ApiResult<()> {
    if user.role != role.as_str() {
        return Err(ApiError::Forbidden(message.into()));
    }
    Ok(())
}

fn login_flow(
    state: &AppState,
    email: &str,
    password: &str,
    role: Role,
    not_found: &str,
) -> ApiResult<Json<LoginResponse>> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".into()));
    }

    let user = state
        .db
        .get_user_by_email_and_role(&email, role.as_str())?
        .ok_or_else(|| ApiError::NotFound(not_found.into()))?;

    if user.status == UserStatus::Suspended.as_str() {
        return Err(ApiError::Forbidden(
            "Your account has been suspended. Please contact the administrator".into(),
        ));
    }

    verify_password(password, &user.password)
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".into()))?;

    let user_id = crate::views::parse_uuid(&user.id, "user id");
    let token = create_token(&state.jwt_secret, user_id, role)?;
    let needs_onboarding = user.status == UserStatus::PendingOnboarding.as_str();

    Ok(Json(LoginResponse {
        user: user_response(&user),
        token,
        needs_onboarding,
    }))
}

fn validate_new_account(
    state: &AppState,
    email: &str,
    password: &str,
    name: &str,
) -> ApiResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.is_empty() || name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Email, password, and name are required".into(),
        ));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("A valid email is required".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if state.db.email_taken(&email)? {
        return Err(ApiError::Conflict("Email already in use".into()));
    }
    Ok(email)
}

fn new_user_row(
    email: &str,
    password_hash: &str,
    name: &str,
    role: Role,
    status: UserStatus,
    organization: Option<(Option<String>, Option<String>)>,
    created_by: Option<&str>,
) -> UserRow {
    let now = Utc::now().to_rfc3339();
    let (organization_id, organization_name) = organization.unwrap_or((None, None));
    UserRow {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        password: password_hash.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        status: status.to_string(),
        organization_id,
        organization_name,
        address: None,
        created_by: created_by.map(String::from),
        onboarded_at: None,
        suspended_at: None,
        suspended_by: None,
        created_at: now.clone(),
        updated_at: now,
    }
}

fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<(), argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Argon2::default().verify_password(password.as_bytes(), &parsed)
}

fn create_token(secret: &str, user_id: Uuid, role: Role) -> ApiResult<String> {
    let claims = Claims {
        sub: user_id,
        role,
        exp: (Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(anyhow::Error::new(e)))
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_valid_phone(phone: &str) -> bool {
    let s = phone.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    (7..=20).contains(&s.len())
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert_ne!(hash, "correct horse battery");
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }

    #[test]
    fn token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = create_token("test-secret", user_id, Role::Volunteer).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, user_id);
        assert_eq!(decoded.claims.role, Role::Volunteer);
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("kitchen@trattoria.example"));
        assert!(!is_valid_email("kitchen"));
        assert!(!is_valid_email("@trattoria.example"));
        assert!(!is_valid_email("kitchen@nodot"));
        assert!(!is_valid_email("kitchen@.example"));
    }

    #[test]
    fn phone_validation() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(is_valid_phone("5551234567"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("call me maybe"));
    }
}
