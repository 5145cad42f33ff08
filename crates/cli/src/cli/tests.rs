use clap::Parser;

use super::*;

#[test]
fn parse_query_with_sources() {
	let args = vec!["nlm", "query", "nb-1", "What changed?", "--source", "s1", "--source", "s2"];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Query(args) => {
			assert_eq!(args.notebook_id, "nb-1");
			assert_eq!(args.question, "What changed?");
			assert_eq!(args.source_ids, vec!["s1", "s2"]);
			assert_eq!(args.conversation, None);
			assert!(!args.stream);
		}
		_ => panic!("Expected Query command"),
	}
}

#[test]
fn parse_global_flags_after_subcommand() {
	let cli = Cli::try_parse_from(["nlm", "notebook", "list", "-vv", "-f", "ndjson"]).unwrap();
	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.format, OutputFormat::Ndjson);
	assert!(matches!(
		cli.command,
		Commands::Notebook {
			action: NotebookAction::List
		}
	));
}

#[test]
fn format_defaults_to_json() {
	let cli = Cli::try_parse_from(["nlm", "nb", "list"]).unwrap();
	assert_eq!(cli.format, OutputFormat::Json);
	assert_eq!(cli.verbose, 0);
}

#[test]
fn parse_research_start_options() {
	let cli = Cli::try_parse_from(["nlm", "research", "start", "nb", "rust async", "--mode", "deep"]).unwrap();
	match cli.command {
		Commands::Research {
			action: ResearchAction::Start { query, source, mode, .. },
		} => {
			assert_eq!(query, "rust async");
			assert_eq!(source, ResearchSource::Web);
			assert_eq!(mode, ResearchMode::Deep);
		}
		_ => panic!("Expected Research Start command"),
	}
}

#[test]
fn unknown_option_names_are_rejected() {
	assert!(Cli::try_parse_from(["nlm", "research", "start", "nb", "q", "--mode", "slow"]).is_err());
	assert!(Cli::try_parse_from(["nlm", "studio", "video", "nb", "--style", "cubist"]).is_err());
}

#[test]
fn parse_studio_audio_defaults() {
	let cli = Cli::try_parse_from(["nlm", "studio", "audio", "nb", "--length", "long"]).unwrap();
	match cli.command {
		Commands::Studio {
			action: StudioAction::Audio { target, format, length },
		} => {
			assert_eq!(target.notebook_id, "nb");
			assert!(target.source_ids.is_empty());
			assert_eq!(target.language, None);
			assert_eq!(format, AudioFormat::DeepDive);
			assert_eq!(length, AudioLength::Long);
		}
		_ => panic!("Expected Studio Audio command"),
	}
}

#[test]
fn video_style_accepts_dashes() {
	let cli = Cli::try_parse_from(["nlm", "studio", "video", "nb", "--style", "paper-craft"]).unwrap();
	match cli.command {
		Commands::Studio {
			action: StudioAction::Video { style, .. },
		} => assert_eq!(style, VideoStyle::PaperCraft),
		_ => panic!("Expected Studio Video command"),
	}
}

#[test]
fn source_add_requires_content() {
	assert!(Cli::try_parse_from(["nlm", "source", "add", "nb"]).is_err());
	assert!(Cli::try_parse_from(["nlm", "source", "add", "nb", "--url", "a", "--text", "b"]).is_err());

	let cli = Cli::try_parse_from(["nlm", "source", "add", "nb", "--drive", "doc-1", "--title", "Plan"]).unwrap();
	match cli.command {
		Commands::Source {
			action: SourceAction::Add(args),
		} => {
			assert_eq!(args.drive.as_deref(), Some("doc-1"));
			assert_eq!(args.mime_type, nlm::mime::GOOGLE_DOC);
		}
		_ => panic!("Expected Source Add command"),
	}
}

#[test]
fn parse_poll_overrides() {
	let cli = Cli::try_parse_from(["nlm", "studio", "wait", "nb", "a-1", "--interval", "5", "--max-wait", "60"]).unwrap();
	match cli.command {
		Commands::Studio {
			action: StudioAction::Wait { artifact_id, poll, .. },
		} => {
			assert_eq!(artifact_id, "a-1");
			assert_eq!(poll.interval, Some(5));
			assert_eq!(poll.max_wait, Some(60));
		}
		_ => panic!("Expected Studio Wait command"),
	}
}

#[test]
fn zero_poll_interval_is_rejected() {
	let err = Cli::try_parse_from(["nlm", "research", "wait", "nb", "--interval", "0"]).unwrap_err();
	assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
	assert!(Cli::try_parse_from(["nlm", "research", "wait", "nb", "--interval", "1", "--max-wait", "0"]).is_ok());
}
