//! `quizbuzz questions`: the question bank editor.

use anyhow::{Context, Result, bail};
use quizbuzz_core::constants::MAX_OPTIONS;
use quizbuzz_storage::{JsonFileStore, QuestionBank, QuestionStore};
use tracing::info;

use crate::cli::{QuestionCommands, SetArgs};
use crate::config::AppConfig;
use crate::render;

pub async fn run(config: &AppConfig, action: QuestionCommands) -> Result<()> {
    let bank = QuestionBank::new(JsonFileStore::new(config.store.clone()));
    match action {
        QuestionCommands::List => list(&bank).await,
        QuestionCommands::Set(args) => set(&bank, args).await,
        QuestionCommands::Reset => {
            let records = bank
                .reset_to_defaults()
                .await
                .context("writing default questions")?;
            info!(count = records.len(), "question bank reset");
            println!("Question bank reset to {} placeholders.", records.len());
            Ok(())
        }
    }
}

async fn list<S: QuestionStore>(bank: &QuestionBank<S>) -> Result<()> {
    for (index, record) in bank.load_records().await.iter().enumerate() {
        println!("{}", render::record(index + 1, record));
    }
    Ok(())
}

async fn set<S: QuestionStore>(bank: &QuestionBank<S>, args: SetArgs) -> Result<()> {
    if args.number == 0 {
        bail!("question numbers start at 1");
    }
    if args.answers.len() > MAX_OPTIONS {
        bail!("at most {MAX_OPTIONS} answers, got {}", args.answers.len());
    }
    let correct = match args.correct {
        Some(0) => bail!("answer numbers start at 1"),
        Some(n) => Some(n - 1),
        None => None,
    };

    let record = bank
        .edit(args.number - 1, |record| {
            if let Some(text) = args.text {
                record.question = text;
            }
            if !args.answers.is_empty() {
                let mut answers = args.answers;
                answers.resize(MAX_OPTIONS, String::new());
                record.answers = answers;
            }
            if let Some(correct) = correct {
                record.correct = correct;
            }
            if args.enable {
                record.enabled = true;
            } else if args.disable {
                record.enabled = false;
            }
        })
        .await
        .with_context(|| format!("editing question {}", args.number))?;

    println!("{}", render::record(args.number, &record));
    Ok(())
}
