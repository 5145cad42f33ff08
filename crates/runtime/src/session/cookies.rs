//! Browser cookie handling.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Cookie name to value.
pub type CookieJar = BTreeMap<String, String>;

/// Cookies without which the service treats the request as anonymous.
pub const REQUIRED_COOKIES: [&str; 5] = ["SID", "HSID", "SSID", "APISID", "SAPISID"];

/// Cookies kept from a captured browser session; everything else is dropped.
pub const ALLOWED_COOKIES: [&str; 16] = [
	"SID",
	"HSID",
	"SSID",
	"APISID",
	"SAPISID",
	"__Secure-1PSID",
	"__Secure-3PSID",
	"__Secure-1PAPISID",
	"__Secure-3PAPISID",
	"OSID",
	"__Secure-OSID",
	"__Secure-1PSIDTS",
	"__Secure-3PSIDTS",
	"SIDCC",
	"__Secure-1PSIDCC",
	"__Secure-3PSIDCC",
];

/// Parses a `Cookie` header value as copied from browser dev tools.
///
/// Pairs without `=` are ignored; later duplicates win.
pub fn parse_cookie_header(header: &str) -> CookieJar {
	header
		.split(';')
		.filter_map(|part| {
			let (name, value) = part.trim().split_once('=')?;
			let name = name.trim();
			(!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
		})
		.collect()
}

/// Keeps only allow-listed cookies.
pub fn filter_allowed(cookies: CookieJar) -> CookieJar {
	cookies
		.into_iter()
		.filter(|(name, _)| ALLOWED_COOKIES.contains(&name.as_str()))
		.collect()
}

pub fn missing_required(cookies: &CookieJar) -> Vec<&'static str> {
	REQUIRED_COOKIES
		.into_iter()
		.filter(|name| cookies.get(*name).is_none_or(|v| v.is_empty()))
		.collect()
}

/// Fails with an auth error naming every absent mandatory cookie.
pub fn validate(cookies: &CookieJar) -> Result<()> {
	let missing = missing_required(cookies);
	if missing.is_empty() {
		return Ok(());
	}
	Err(Error::Auth(format!(
		"missing required cookies: {}; capture fresh cookies from a signed-in browser",
		missing.join(", ")
	)))
}

/// Renders cookies as a `Cookie` header value.
pub fn cookie_header(cookies: &CookieJar) -> String {
	cookies
		.iter()
		.map(|(name, value)| format!("{name}={value}"))
		.collect::<Vec<_>>()
		.join("; ")
}
