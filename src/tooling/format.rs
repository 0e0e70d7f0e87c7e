//! Format command results as text or JSON.

use crate::commands::CommandOutcome;
use crate::error::ApiError;
use crate::types::BlockSummary;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_block_list(blocks: &[BlockSummary], format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return serde_json::to_string_pretty(blocks)
            .map_err(|e| ApiError::ConfigError(format!("Failed to serialize list: {}", e)));
    }

    if blocks.is_empty() {
        return Ok("No code blocks found".to_string());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Description", "Files", "Visibility"]);
    for block in blocks {
        let visibility = if block.is_private { "private" } else { "public" };
        table.add_row(vec![
            block.id.clone(),
            block.description.clone(),
            block.file_count.to_string(),
            visibility.to_string(),
        ]);
    }
    Ok(format!(
        "{}\n\n{}\n",
        format_section_heading("Code blocks"),
        table
    ))
}

/// One-line summary of a command outcome.
pub fn format_outcome(outcome: &CommandOutcome, format: &str) -> Result<String, ApiError> {
    let text = match outcome {
        CommandOutcome::Opened(wc) => format!(
            "Opened code block {} in {} ({} file(s))",
            wc.block_id,
            wc.dir.display(),
            wc.files.len()
        ),
        CommandOutcome::Created(block) => {
            format!("Created code block {}\n{}", block.id, block.html_url)
        }
        CommandOutcome::Added { file_name } => format!("Added {}", file_name),
        CommandOutcome::Removed(identity) => format!(
            "Removed {} from code block {}",
            identity.file_name, identity.storage_block_id
        ),
        CommandOutcome::Deleted(outcome) => format!(
            "Deleted code block {} (closed {} editor(s))",
            outcome.block_id,
            outcome.closed.len()
        ),
        CommandOutcome::DescriptionChanged(description) => {
            format!("Description changed to \"{}\"", description)
        }
        CommandOutcome::Listed(blocks) => format_block_list(blocks, format)?,
        CommandOutcome::Starred { block_id, starred } => {
            let verb = if *starred { "Starred" } else { "Unstarred" };
            format!("{} code block {}", verb, block_id)
        }
        CommandOutcome::Saved(identity) => format!(
            "Pushed {} to code block {}",
            identity.file_name, identity.storage_block_id
        ),
        CommandOutcome::ProviderSwitched(name) => format!("Current provider: {}", name),
        CommandOutcome::LoggedIn => "Logged in".to_string(),
        CommandOutcome::NoOp => "Nothing to do".to_string(),
        CommandOutcome::Failed(message) => message.clone(),
    };
    Ok(text)
}
