//! The `lexidrill grammar` command.

use std::path::PathBuf;

use anyhow::Result;

use lexidrill_providers::config::{create_grammar_checker, load_config_from};

pub async fn execute(text: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let checker = create_grammar_checker(&config.grammar);

    let issues = checker.check(&text).await?;
    if issues.is_empty() {
        println!("No issues found ({}).", checker.name());
        return Ok(());
    }

    println!("{} issue(s) found ({}):", issues.len(), checker.name());
    for issue in &issues {
        println!("- {}", issue.message);
        if !issue.suggestions.is_empty() {
            println!("  Suggestions: {}", issue.suggestions.join(", "));
        }
    }
    Ok(())
}
