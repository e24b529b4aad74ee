//! The `lexidrill words` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use lexidrill_core::WordEntry;
use lexidrill_providers::config::{create_word_source, load_config_from};

pub async fn execute(count: Option<usize>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    config.validate()?;

    let count = count.unwrap_or(config.broadcast.words_per_session);
    anyhow::ensure!(count >= 1, "count must be at least 1");

    let source = create_word_source(&config.dictionary)?;
    let words = source
        .fetch(count)
        .await
        .with_context(|| format!("failed to fetch words from {}", source.name()))?;

    println!("{}", render_table(&words));
    Ok(())
}

fn render_table(words: &[WordEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Word", "Definition"]);
    for entry in words {
        table.add_row(vec![Cell::new(&entry.word), Cell::new(&entry.definition)]);
    }
    table
}
