//! Credential management.

use std::io::Read;

use anyhow::Context;
use nlm::client::COOKIES_ENV;
use nlm::{CredentialBundle, parse_cookie_header};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{CommandContext, to_data};
use crate::cli::AuthAction;
use crate::error::{CliError, Result};

/// What `auth` commands report. Token values are never printed.
#[derive(Debug, Serialize)]
struct AuthSummary {
	source: &'static str,
	path: Option<String>,
	cookies: Vec<String>,
	has_csrf_token: bool,
	has_session_id: bool,
	extracted_at: Option<f64>,
}

impl AuthSummary {
	fn new(source: &'static str, path: Option<String>, bundle: &CredentialBundle) -> Self {
		Self {
			source,
			path,
			cookies: bundle.cookies.keys().cloned().collect(),
			has_csrf_token: bundle.csrf_token.is_some(),
			has_session_id: bundle.session_id.is_some(),
			extracted_at: bundle.extracted_at,
		}
	}
}

pub async fn run(action: AuthAction, ctx: &CommandContext) -> Result<Value> {
	match action {
		AuthAction::Save { cookies } => {
			let header = match cookies {
				Some(header) => header,
				None => {
					let mut header = String::new();
					std::io::stdin()
						.read_to_string(&mut header)
						.context("reading the Cookie header from stdin")?;
					header
				}
			};
			let header = header.trim().trim_start_matches("Cookie:").trim();
			if header.is_empty() {
				return Err(CliError::Input(
					"no cookies given; pass --cookies or pipe the Cookie header on stdin".into(),
				));
			}

			let (client, store) = ctx.stored_client()?;
			let bundle = client.session().save_explicit(parse_cookie_header(header)).await?;
			info!(target = "nlm", path = %store.path().display(), "credentials saved");
			to_data(&AuthSummary::new("file", Some(store.path().display().to_string()), &bundle))
		}
		AuthAction::Status => {
			let from_env = std::env::var(COOKIES_ENV).is_ok_and(|v| !v.trim().is_empty());
			let client = ctx.client()?;
			let bundle = client.check_credentials().await?;
			let path = client.session().store().map(|s| s.path().display().to_string());
			let source = if from_env { "environment" } else { "file" };
			to_data(&AuthSummary::new(source, path, &bundle))
		}
		AuthAction::Refresh => {
			let client = ctx.client()?;
			let bundle = client.session().force_refresh().await?;
			let path = client.session().store().map(|s| s.path().display().to_string());
			to_data(&AuthSummary::new("refresh", path, &bundle))
		}
	}
}
