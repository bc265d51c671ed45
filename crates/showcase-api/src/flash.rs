use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use showcase_types::api::Flash;

pub const FLASH_COOKIE: &str = "showcase_flash";

/// Cookie-safe encoding: base64url over the JSON form.
pub fn encode(flash: &Flash) -> String {
    B64.encode(serde_json::to_vec(flash).unwrap_or_default())
}

pub fn decode(raw: &str) -> Option<Flash> {
    let bytes = B64.decode(raw).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// 303 to `to`, leaving `flash` for the next page to pick up.
pub fn redirect(jar: CookieJar, to: &str, flash: Flash) -> Response {
    let cookie = Cookie::build((FLASH_COOKIE, encode(&flash)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), Redirect::to(to)).into_response()
}

/// Read the pending flash and clear it, so it shows exactly once.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let flash = decode(cookie.value());
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
}
