use serde_json::json;

use super::*;

#[test]
fn result_builder_success() {
	let result = ResultBuilder::new("notebook.list").data(json!([{"id": "nb-1"}])).build();

	assert!(result.ok);
	assert_eq!(result.command, "notebook.list");
	assert!(result.data.is_some());
	assert!(result.error.is_none());
	assert!(result.timings.is_some());
}

#[test]
fn result_builder_error() {
	let result: CommandResult<()> = ResultBuilder::new("auth.status")
		.error(CommandError {
			code: ErrorCode::AuthError,
			message: "no credentials".into(),
			details: None,
		})
		.build();

	assert!(!result.ok);
	assert!(result.data.is_none());
	assert_eq!(result.error.as_ref().unwrap().code, ErrorCode::AuthError);
}

#[test]
fn envelope_omits_absent_fields() {
	let result = ResultBuilder::new("notebook.rename").data(json!({"renamed": true})).build();
	let value = serde_json::to_value(&result).unwrap();

	assert_eq!(value["ok"], true);
	assert!(value.get("error").is_none());
	assert!(value["timings"]["durationMs"].is_u64());
}

#[test]
fn error_codes_serialize_like_display() {
	for code in [
		ErrorCode::AuthError,
		ErrorCode::RateLimited,
		ErrorCode::ProtocolError,
		ErrorCode::TransportError,
		ErrorCode::PollTimeout,
		ErrorCode::InvalidInput,
		ErrorCode::IoError,
		ErrorCode::InternalError,
	] {
		assert_eq!(serde_json::to_value(code).unwrap(), json!(code.to_string()));
	}
	assert_eq!(ErrorCode::RateLimited.to_string(), "RATE_LIMITED");
}

#[test]
fn output_format_parse() {
	assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
	assert_eq!("NDJSON".parse::<OutputFormat>().unwrap(), OutputFormat::Ndjson);
	assert!("toon".parse::<OutputFormat>().is_err());
	assert_eq!(OutputFormat::Text.to_string(), "text");
}
