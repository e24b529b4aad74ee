//! The `lexidrill init` command.

use std::path::Path;

use anyhow::Result;

use lexidrill_providers::vocabulary::VOCABULARY;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("lexidrill.toml"), SAMPLE_CONFIG)?;

    let words = VOCABULARY.join("\n") + "\n";
    write_if_missing(Path::new("wordlist.txt"), &words)?;

    println!("\nNext steps:");
    println!("  1. Put your bot token in .env as LEXIDRILL_BOT_TOKEN=...");
    println!("  2. Try it locally: lexidrill run --console");
    println!("  3. Go live: lexidrill run");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# lexidrill configuration

[telegram]
bot_token = "${LEXIDRILL_BOT_TOKEN}"
poll_timeout_secs = 30

# Words from a local list. For Merriam-Webster definitions use:
#   type = "merriam-webster"
#   api_key = "${LEXIDRILL_MW_KEY}"
#   thesaurus_key = "${LEXIDRILL_THESAURUS_KEY}"
[dictionary]
type = "local"
path = "wordlist.txt"
# /synonym and /antonym pick five entries from these lists, one per line.
# synonyms_path = "synonyms.txt"
# antonyms_path = "antonyms.txt"

# Public LanguageTool server; point base_url at a local instance for heavy use.
[grammar]
type = "languagetool"
language = "en-US"

[broadcast]
interval_secs = 600
words_per_session = 5
rotate_on_start = false

[scoring]
first_use_points = 30
repeat_use_points = 20
penalty_per_issue = 5
"#;
