//! CLI command dispatcher.
//!
//! Each command builds the pieces it needs from the loaded configuration
//! and prints its result through the output module.

use std::sync::Arc;

use anyhow::Result;
use granary::{Config, GrantService, QueryExpander, Taxonomy};

use super::output;

/// Run the classify command: tag one grant without storing it.
pub async fn run_classify(
    config: Config,
    name: String,
    description: String,
    json_output: bool,
) -> Result<()> {
    let service = GrantService::new(&config)?;
    let result = service.classify(&name, &description).await;
    output::print_classification(&result, json_output);
    Ok(())
}

/// Run the tags command: list the canonical taxonomy.
pub fn run_tags(config: Config, json_output: bool) -> Result<()> {
    let taxonomy = Taxonomy::load(&config.taxonomy)?;
    output::print_tags(&taxonomy, json_output);
    Ok(())
}

/// Run the expand command: show the effective tag set for a selection.
/// Pure taxonomy math, so no service (and no store) is wired up.
pub fn run_expand(
    config: Config,
    selection: String,
    no_synonyms: bool,
    json_output: bool,
) -> Result<()> {
    let taxonomy = Arc::new(Taxonomy::load(&config.taxonomy)?);
    let expander = QueryExpander::new(taxonomy);
    let explicit = granary::parse_tag_list(&selection);
    let effective = expander.expand(&explicit, !no_synonyms);
    output::print_effective_tags(&explicit, &effective, json_output);
    Ok(())
}
