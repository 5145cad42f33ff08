use nlm::DiscoveredSource;
use serde_json::Value;

use super::{CommandContext, to_data};
use crate::cli::ResearchAction;
use crate::error::{CliError, Result};

pub async fn run(action: ResearchAction, ctx: &CommandContext) -> Result<Value> {
	let client = ctx.client()?;
	match action {
		ResearchAction::Start {
			notebook_id,
			query,
			source,
			mode,
		} => to_data(&client.start_research(&notebook_id, &query, source, mode).await?),
		ResearchAction::Status { notebook_id } => to_data(&client.research_status(&notebook_id).await?),
		ResearchAction::Wait { notebook_id, poll } => {
			let options = ctx.config.poll_options(&poll);
			to_data(&client.wait_for_research(&notebook_id, options).await?)
		}
		ResearchAction::Import {
			notebook_id,
			task_id,
			indices,
		} => {
			let status = client.research_status(&notebook_id).await?;
			if status.task_id.as_deref() != Some(task_id.as_str()) {
				return Err(CliError::Input(format!(
					"task {task_id} is not the latest research in notebook {notebook_id}"
				)));
			}
			let selected = select(&status.sources, &indices)?;
			to_data(&client.import_research(&notebook_id, &task_id, &selected).await?)
		}
	}
}

/// Sources picked by index; every source when no index is given.
fn select(sources: &[DiscoveredSource], indices: &[usize]) -> Result<Vec<DiscoveredSource>> {
	if sources.is_empty() {
		return Err(CliError::Input("research found no sources to import".into()));
	}
	if indices.is_empty() {
		return Ok(sources.to_vec());
	}
	indices
		.iter()
		.map(|&index| {
			sources
				.iter()
				.find(|s| s.index == index)
				.cloned()
				.ok_or_else(|| CliError::Input(format!("no discovered source with index {index}")))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn discovered(index: usize) -> DiscoveredSource {
		DiscoveredSource {
			index,
			url: format!("https://example.com/{index}"),
			title: format!("Result {index}"),
			description: String::new(),
			result_type: 1,
			result_type_name: "web",
		}
	}

	#[test]
	fn empty_selection_takes_everything() {
		let sources = vec![discovered(0), discovered(1)];
		assert_eq!(select(&sources, &[]).unwrap(), sources);
	}

	#[test]
	fn selection_keeps_the_requested_order() {
		let sources = vec![discovered(0), discovered(1), discovered(2)];
		let picked = select(&sources, &[2, 0]).unwrap();
		assert_eq!(picked.iter().map(|s| s.index).collect::<Vec<_>>(), vec![2, 0]);
	}

	#[test]
	fn unknown_index_or_no_results_is_input_error() {
		assert!(matches!(select(&[discovered(0)], &[5]), Err(CliError::Input(_))));
		assert!(matches!(select(&[], &[]), Err(CliError::Input(_))));
	}
}
