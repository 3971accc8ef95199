//! CLI interface for lingotutor

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::time::Duration;

use crate::config::Config;
use crate::gateway::GeminiClient;
use crate::profile::{extract, ProfileStore};
use crate::tasks::TaskStore;
use crate::tokens::TokenLedger;
use crate::vocab::{parse_word_grades, VocabStore, CANONICAL_FORMS};
use crate::{editor, prompts};

#[derive(Parser)]
#[command(name = "lingotutor")]
#[command(about = "Personal English tutor with weakness tracking and vocabulary mastery", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate today's personalized exercise
    Generate,
    /// Submit a numbered task (1-4) for grading
    Review {
        /// Task number: 1 word transformation, 2 translation,
        /// 3 conversation, 4 grammar
        task: u8,
        /// Task date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show the learner profile
    Profile,
    /// Topic-specific study material
    Material {
        #[command(subcommand)]
        command: MaterialCommands,
    },
    /// Manage tracked vocabulary
    Vocab {
        #[command(subcommand)]
        command: VocabCommands,
    },
    /// Show token usage statistics
    Tokens,
}

#[derive(Subcommand)]
enum MaterialCommands {
    /// Suggest topics based on current weaknesses
    List,
    /// Generate study material for a topic
    Generate {
        /// Topic, e.g. "Simple Tenses (Present, Past, Future)"
        topic: String,
    },
}

#[derive(Subcommand)]
enum VocabCommands {
    /// Add a word to track without reviewing it
    Add {
        word: String,
        /// Word type (verb, noun, ...)
        #[arg(long)]
        word_type: Option<String>,
        /// Indonesian meaning
        #[arg(long)]
        meaning: Option<String>,
    },
    /// Mastered / weak / unreviewed counts
    Stats,
    /// Full details for one word
    Show { word: String },
    /// Manually set a form's value (marks it mastered)
    SetForm {
        word: String,
        /// One of: verb, noun, adjective, adverb, opposite
        form: String,
        value: String,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Generate => handle_generate(&config).await,
        Commands::Review { task, date } => handle_review(&config, task, date).await,
        Commands::Profile => handle_profile(&config),
        Commands::Material { command } => match command {
            MaterialCommands::List => handle_material_list(&config),
            MaterialCommands::Generate { topic } => {
                handle_material_generate(&config, &topic).await
            }
        },
        Commands::Vocab { command } => handle_vocab(&config, command),
        Commands::Tokens => handle_tokens(&config),
    }
}

async fn handle_generate(config: &Config) -> Result<()> {
    let client = GeminiClient::from_config(config)?;
    let profile_store = ProfileStore::with_dir(config.data_dir()?)?;
    let vocab_store = VocabStore::with_dir(config.data_dir()?)?;
    let task_store = TaskStore::with_dir(config.tasks_dir()?)?;

    let user_context = profile_store.load().context_for_ai();
    let vocab_digest = prompts::vocab_digest(&vocab_store)?;
    let prompt = prompts::daily_task(&user_context, &vocab_digest);

    let generation = generate_with_spinner(&client, &prompt, "Generating today's task...").await?;
    log_usage(config, "daily_task", client.model(), &generation)?;

    let today = Local::now().date_naive();
    let path = task_store.write_task(today, &generation.text)?;

    println!("{}", generation.text);
    println!("\nSaved to {}", path.display());
    Ok(())
}

async fn handle_review(config: &Config, task: u8, date: Option<String>) -> Result<()> {
    if !(1..=4).contains(&task) {
        bail!("Task number must be between 1 and 4, got {task}");
    }
    let date = parse_date(date)?;

    let client = GeminiClient::from_config(config)?;
    let task_store = TaskStore::with_dir(config.tasks_dir()?)?;
    let profile_store = ProfileStore::with_dir(config.data_dir()?)?;

    // Reviews for tasks 2 and 3 need the original exercise text; the full
    // transcript is the fallback when the numbered section is missing.
    let exercise = match task_store.section(date, task)? {
        Some(section) => section,
        None => task_store.read_task(date)?,
    };

    let answers = editor::capture_input(&editor::answer_template(task))?;

    let prompt = match task {
        1 => prompts::review_task1(&answers),
        2 => prompts::review_task2(&exercise, &answers),
        3 => prompts::review_task3(&exercise, &answers),
        4 => prompts::review_task4(&answers),
        _ => unreachable!(),
    };

    let message = format!("Grading task {task}...");
    let generation = generate_with_spinner(&client, &prompt, &message).await?;
    let operation = format!("review_task{task}");
    log_usage(config, &operation, client.model(), &generation)?;

    task_store.append_review(date, task, &generation.text)?;

    let report = extract(&generation.text);
    profile_store.update(&report, &operation, date)?;

    if task == 1 {
        let vocab_store = VocabStore::with_dir(config.data_dir()?)?;
        for grade in parse_word_grades(&generation.text) {
            vocab_store.update_mastery(&grade.into_update(), date)?;
        }
    }

    println!("{}", generation.text);
    Ok(())
}

fn handle_profile(config: &Config) -> Result<()> {
    let store = ProfileStore::with_dir(config.data_dir()?)?;
    let profile = store.load();

    println!("Learner Profile");
    println!("===============");
    println!("Total reviews: {}", profile.total_reviews);

    print_tag_list("Urgent", &profile.focus_areas.urgent);
    print_tag_list("Practice", &profile.focus_areas.practice);
    print_tag_list("Maintain", &profile.focus_areas.maintain);
    print_tag_list("Persistent issues", &profile.patterns.persistent_issues);
    print_tag_list("Improving", &profile.patterns.improving_areas);
    print_tag_list("New issues", &profile.patterns.new_issues);

    if !profile.vocabulary_gaps.is_empty() {
        println!("\nVocabulary gaps:");
        for gap in &profile.vocabulary_gaps {
            println!(
                "  {} (missed {}x, last seen {})",
                gap.word, gap.missed_count, gap.last_seen
            );
        }
    }

    println!("\nAI context:\n{}", profile.context_for_ai());
    Ok(())
}

fn handle_material_list(config: &Config) -> Result<()> {
    let store = ProfileStore::with_dir(config.data_dir()?)?;
    let topics = prompts::suggest_topics(&store.load());

    println!("Suggested topics:");
    for (i, topic) in topics.iter().enumerate() {
        println!("  {}. {topic}", i + 1);
    }
    println!("\nGenerate one with: lingotutor material generate \"<topic>\"");
    Ok(())
}

async fn handle_material_generate(config: &Config, topic: &str) -> Result<()> {
    let client = GeminiClient::from_config(config)?;
    let prompt = prompts::learning_material(topic);

    let message = format!("Generating material for '{topic}'...");
    let generation = generate_with_spinner(&client, &prompt, &message).await?;
    log_usage(config, "learning_material", client.model(), &generation)?;

    let slug: String = topic
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let path = config.tasks_dir()?.join(format!("material_{slug}.md"));
    std::fs::write(&path, &generation.text)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{}", generation.text);
    println!("\nSaved to {}", path.display());
    Ok(())
}

fn handle_vocab(config: &Config, command: VocabCommands) -> Result<()> {
    let store = VocabStore::with_dir(config.data_dir()?)?;

    match command {
        VocabCommands::Add {
            word,
            word_type,
            meaning,
        } => {
            if store.add_word(&word, word_type.as_deref(), meaning.as_deref())? {
                println!("Added '{word}'");
            } else {
                println!("'{word}' is already tracked");
            }
        }
        VocabCommands::Stats => {
            let stats = store.stats()?;
            println!("Vocabulary: {} words", stats.total);
            println!("  Mastered:   {}", stats.mastered);
            println!("  Weak:       {}", stats.weak);
            println!("  Unreviewed: {}", stats.unreviewed);
        }
        VocabCommands::Show { word } => {
            let Some(details) = store.details(&word)? else {
                bail!("'{word}' is not tracked; add it with: lingotutor vocab add {word}");
            };
            let s = &details.summary;
            println!("{}", s.word);
            if let Some(word_type) = &s.word_type {
                println!("  Type: {word_type}");
            }
            if let Some(meaning) = &s.meaning {
                println!("  Meaning: {meaning}");
            }
            println!("  Source: {}", s.source);
            println!("  Accuracy: {} ({} reviews)", s.accuracy_score, s.total_reviews);
            if let Some(last) = s.last_reviewed {
                println!("  Last reviewed: {last}");
            }
            println!("  Forms:");
            for form in &details.forms {
                let mark = if form.is_mastered { "✓" } else { "✗" };
                println!(
                    "    {mark} {}: {}",
                    form.form_type,
                    form.value.as_deref().unwrap_or("-")
                );
            }
            if !details.history.is_empty() {
                println!("  History:");
                for record in &details.history {
                    println!("    {} - {}%", record.date, record.accuracy);
                }
            }
        }
        VocabCommands::SetForm { word, form, value } => {
            let form = form.to_lowercase();
            if !CANONICAL_FORMS.contains(&form.as_str()) {
                bail!(
                    "Unknown form '{form}'; expected one of: {}",
                    CANONICAL_FORMS.join(", ")
                );
            }
            if store.set_form(&word, &form, &value)? {
                println!("Set {form} of '{word}' to '{value}'");
            } else {
                bail!("'{word}' is not tracked; add it with: lingotutor vocab add {word}");
            }
        }
    }
    Ok(())
}

fn handle_tokens(config: &Config) -> Result<()> {
    let ledger = TokenLedger::with_dir(config.data_dir()?)?;
    let stats = ledger.stats(10)?;

    println!("Token usage ({} calls)", stats.calls);
    println!("  Input:  {}", stats.total.input);
    println!("  Output: {}", stats.total.output);
    println!("  Total:  {}", stats.total.input + stats.total.output);

    if !stats.recent.is_empty() {
        println!("\nRecent calls:");
        for entry in &stats.recent {
            println!(
                "  {} {} ({}) - {} tokens",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.operation,
                entry.model,
                entry.total_tokens
            );
        }
    }
    Ok(())
}

/// Run one generation call behind a terminal spinner
async fn generate_with_spinner(
    client: &GeminiClient,
    prompt: &str,
    message: &str,
) -> Result<crate::gateway::Generation> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = client.generate(prompt).await;
    spinner.finish_and_clear();

    result.context("AI call failed")
}

fn log_usage(
    config: &Config,
    operation: &str,
    model: &str,
    generation: &crate::gateway::Generation,
) -> Result<()> {
    let ledger = TokenLedger::with_dir(config.data_dir()?)?;
    ledger.log(operation, model, generation.usage)
}

fn parse_date(date: Option<String>) -> Result<NaiveDate> {
    match date {
        None => Ok(Local::now().date_naive()),
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid date '{raw}', expected YYYY-MM-DD")),
    }
}

fn print_tag_list(label: &str, tags: &[String]) {
    if !tags.is_empty() {
        println!("{label}: {}", tags.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dates_must_be_iso() {
        assert!(parse_date(Some("2026-08-29".to_string())).is_ok());
        assert!(parse_date(Some("29/08/2026".to_string())).is_err());
        assert!(parse_date(Some("yesterday".to_string())).is_err());
    }

    #[test]
    fn missing_date_defaults_to_today() {
        assert_eq!(parse_date(None).unwrap(), Local::now().date_naive());
    }
}
