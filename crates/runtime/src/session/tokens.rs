//! Extraction of the ephemeral tokens embedded in the service home page.
//!
//! The page carries a JSON-ish configuration blob with, among others:
//!
//! ```text
//! "SNlM0e":"AF1_QpN...:1766372302394"   CSRF token, sent as `at`
//! "FdrFJe":"-7215..."                    session id, sent as `f.sid`
//! ```
//!
//! Neither marker is documented, so matching tolerates whitespace and
//! escaped characters and rejects values that could not be real tokens.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

const CSRF_MARKER: &str = "SNlM0e";
const SESSION_MARKER: &str = "FdrFJe";

static CSRF_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex(CSRF_MARKER));
static SESSION_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex(SESSION_MARKER));

fn marker_regex(key: &str) -> Regex {
	Regex::new(&format!(r#""{}"\s*:\s*"((?:[^"\\]|\\.)*)""#, regex::escape(key))).unwrap()
}

/// Tokens scraped from one page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTokens {
	pub csrf_token: String,
	pub session_id: Option<String>,
}

/// Extracts both tokens; the CSRF token is mandatory.
pub fn extract_tokens(html: &str) -> Result<PageTokens> {
	let csrf_token = find_marker(&CSRF_RE, html).ok_or_else(|| {
		Error::Auth(format!(
			"CSRF token marker {CSRF_MARKER} not found in the home page; the page layout may have changed"
		))
	})?;
	Ok(PageTokens {
		csrf_token,
		session_id: find_marker(&SESSION_RE, html),
	})
}

/// First occurrence of a marker whose value decodes to a plausible token.
fn find_marker(re: &Regex, html: &str) -> Option<String> {
	re.captures_iter(html)
		.filter_map(|caps| decode_value(caps.get(1)?.as_str()))
		.next()
}

/// Decodes JSON string escapes (`\u003d`, `\/`) and rejects empty or
/// non-printable values.
fn decode_value(raw: &str) -> Option<String> {
	let value: String = serde_json::from_str(&format!("\"{raw}\"")).ok()?;
	let printable = !value.is_empty() && value.chars().all(|c| !c.is_control() && !c.is_whitespace());
	printable.then_some(value)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extracts_both_tokens() {
		let html = r#"<script>WIZ_global_data = {"FdrFJe":"-7215034","SNlM0e":"AF1_Qp:1766"};</script>"#;
		let tokens = extract_tokens(html).unwrap();
		assert_eq!(tokens.csrf_token, "AF1_Qp:1766");
		assert_eq!(tokens.session_id.as_deref(), Some("-7215034"));
	}

	#[test]
	fn tolerates_whitespace_and_escapes() {
		let html = r#"{"SNlM0e" : "abc=\/x", "FdrFJe":  "42"}"#;
		let tokens = extract_tokens(html).unwrap();
		assert_eq!(tokens.csrf_token, "abc=/x");
		assert_eq!(tokens.session_id.as_deref(), Some("42"));
	}

	#[test]
	fn escaped_quote_does_not_end_value() {
		let html = r#""SNlM0e":"a\"b""#;
		assert_eq!(extract_tokens(html).unwrap().csrf_token, "a\"b");
	}

	#[test]
	fn session_id_is_optional() {
		let tokens = extract_tokens(r#""SNlM0e":"tok""#).unwrap();
		assert_eq!(tokens.session_id, None);
	}

	#[test]
	fn missing_csrf_is_auth_error() {
		let err = extract_tokens(r#"<html>"FdrFJe":"1"</html>"#).unwrap_err();
		assert!(err.is_auth());
	}

	#[test]
	fn empty_or_unprintable_values_are_skipped() {
		assert!(extract_tokens(r#""SNlM0e":"""#).is_err());
		assert!(extract_tokens(r#""SNlM0e":"a\nb""#).is_err());
		let html = r#""SNlM0e":"", "SNlM0e":"second""#;
		assert_eq!(extract_tokens(html).unwrap().csrf_token, "second");
	}
}
