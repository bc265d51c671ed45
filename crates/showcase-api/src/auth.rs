use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{info, warn};

use showcase_db::{CreateUser, Database, NewUser};
use showcase_types::Role;
use showcase_types::api::{Claims, Flash, FormPage, LoginForm, RegisterForm};

use crate::config::{AdminAccount, SessionConfig};
use crate::error::{AppError, AppResult};
use crate::flash;
use crate::middleware::{CurrentUser, LOGIN_PATH, MaybeUser};
use crate::password;
use crate::state::{AppState, with_db};

pub const SESSION_COOKIE: &str = "showcase_session";

const REGISTER_PATH: &str = "/student/register";
const ADMIN_LOGIN_PATH: &str = "/admin/login";

// -- Session tokens --

pub fn issue_session(config: &SessionConfig, user_id: i64, role: Role) -> anyhow::Result<String> {
    let now = chrono::Utc::now();
    let expiry = chrono::TimeDelta::try_days(config.lifetime_days)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| anyhow::anyhow!("session lifetime of {} days is out of range", config.lifetime_days))?;
    let claims = Claims {
        sub: user_id,
        role,
        iat: now.timestamp(),
        exp: expiry.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

/// Decode a session token; any invalid, tampered or expired token is simply no session.
pub fn decode_session(config: &SessionConfig, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

// -- Bootstrap --

/// Make sure the configured admin account exists. Idempotent; run once before serving.
///
/// Returns `true` when the account was created by this call.
pub fn bootstrap_admin(db: &Database, admin: &AdminAccount) -> anyhow::Result<bool> {
    if let Some(existing) = db.get_user_by_email(&admin.email)? {
        if existing.role() != Role::Admin {
            anyhow::bail!("admin email {} belongs to a student account", admin.email);
        }
        return Ok(false);
    }

    let password_hash = password::hash_password(&admin.password)?;
    let outcome = db.create_user(&NewUser {
        name: &admin.name,
        email: &admin.email,
        roll_number: &admin.roll_number,
        password_hash: &password_hash,
        role: Role::Admin,
    })?;

    match outcome {
        CreateUser::Created(id) => {
            info!(user_id = id, email = %admin.email, "Created default admin account");
            Ok(true)
        }
        // Only reachable if the email was registered between the lookup and the insert
        CreateUser::EmailTaken => anyhow::bail!("admin email {} was taken during bootstrap", admin.email),
        CreateUser::RollNumberTaken => anyhow::bail!(
            "admin roll number {} is already used by another account",
            admin.roll_number
        ),
    }
}

// -- Registration --

pub async fn register_page(jar: CookieJar) -> (CookieJar, Json<FormPage>) {
    let (jar, flash) = flash::take(jar);
    (jar, Json(FormPage { flash }))
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let name = form.name.trim().to_string();
    let email = form.email.trim().to_string();
    let roll_number = form.roll_number.trim().to_string();

    if name.is_empty() || email.is_empty() || roll_number.is_empty() || form.password.is_empty() {
        return Err(AppError::redirect(REGISTER_PATH, "Please fill all required fields."));
    }

    let password_hash = password::hash_password(&form.password)?;

    let outcome = with_db(&state, move |db| {
        let outcome = db.create_user(&NewUser {
            name: &name,
            email: &email,
            roll_number: &roll_number,
            password_hash: &password_hash,
            role: Role::Student,
        })?;
        if let CreateUser::Created(id) = outcome {
            info!(user_id = id, %email, %roll_number, "Student registered");
        }
        Ok(outcome)
    })
    .await?;

    match outcome {
        CreateUser::Created(_) => Ok(flash::redirect(
            jar,
            LOGIN_PATH,
            Flash::success("Registration successful! Please login."),
        )),
        CreateUser::EmailTaken => Err(AppError::redirect(REGISTER_PATH, "Email already registered.")),
        CreateUser::RollNumberTaken => {
            Err(AppError::redirect(REGISTER_PATH, "Roll number already registered."))
        }
    }
}

// -- Login --

pub async fn student_login_page(MaybeUser(user): MaybeUser, jar: CookieJar) -> Response {
    if let Some(user) = user {
        return flash_free_redirect(user.role.home_path());
    }
    let (jar, flash) = flash::take(jar);
    (jar, Json(FormPage { flash })).into_response()
}

pub async fn admin_login_page(MaybeUser(user): MaybeUser, jar: CookieJar) -> Response {
    if let Some(user) = user.filter(|u| u.role == Role::Admin) {
        return flash_free_redirect(user.role.home_path());
    }
    let (jar, flash) = flash::take(jar);
    (jar, Json(FormPage { flash })).into_response()
}

pub async fn student_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    login_as(state, jar, form, Role::Student).await
}

pub async fn admin_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    login_as(state, jar, form, Role::Admin).await
}

/// Shared login flow. The same message covers an unknown email and a wrong
/// password, so the response never reveals which one failed.
async fn login_as(state: AppState, jar: CookieJar, form: LoginForm, role: Role) -> AppResult<Response> {
    let (form_path, invalid, welcome) = match role {
        Role::Student => (LOGIN_PATH, "Invalid email or password.", "Welcome back!"),
        Role::Admin => (ADMIN_LOGIN_PATH, "Invalid admin credentials.", "Welcome Admin!"),
    };

    let email = form.email.trim().to_string();
    let lookup = email.clone();
    let row = with_db(&state, move |db| db.get_user_for_login(&lookup, role)).await?;

    let user = match row {
        Some(row) if password::verify_password(&form.password, &row.password)? => row,
        _ => {
            warn!(%email, ?role, "Login refused");
            return Err(AppError::redirect(form_path, invalid));
        }
    };

    let token = issue_session(&state.config.session, user.id, role)?;
    info!(user_id = user.id, ?role, "Login");

    Ok(flash::redirect(
        jar.add(session_cookie(token)),
        role.home_path(),
        Flash::success(welcome),
    ))
}

pub async fn logout(CurrentUser(user): CurrentUser, jar: CookieJar) -> Response {
    info!(user_id = user.id, "Logout");
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    flash::redirect(jar, LOGIN_PATH, Flash::success("You have been logged out."))
}

fn flash_free_redirect(to: &str) -> Response {
    axum::response::Redirect::to(to).into_response()
}
