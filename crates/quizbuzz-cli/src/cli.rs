//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Buzzer quiz host console
#[derive(Debug, Parser)]
#[command(name = "quizbuzz")]
#[command(about = "Run a buzzer quiz and manage its questions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Question file (overrides `store.path`)
    #[arg(long, global = true)]
    pub questions: Option<PathBuf>,

    /// Log filter, e.g. `info` or `quizbuzz_engine=debug` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Host a game (the default)
    Play(PlayArgs),

    /// Inspect or edit the question bank
    Questions {
        #[command(subcommand)]
        action: QuestionCommands,
    },
}

#[derive(Debug, Default, Args)]
pub struct PlayArgs {
    /// Serial port of the buzzer controller (overrides `serial.port`)
    #[arg(long)]
    pub port: Option<String>,

    /// Use a simulated buzzer panel driven from the console
    #[arg(long)]
    pub mock: bool,
}

#[derive(Debug, Subcommand)]
pub enum QuestionCommands {
    /// Print every stored question
    List,

    /// Edit the question at a position (counting from 1)
    Set(SetArgs),

    /// Replace the bank with the default placeholders
    Reset,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Question number, starting at 1
    pub number: usize,

    /// Question text
    #[arg(long)]
    pub text: Option<String>,

    /// Answer slot text; repeat up to four times, blanks are allowed
    #[arg(long = "answer", num_args = 1, action = clap::ArgAction::Append)]
    pub answers: Vec<String>,

    /// Correct answer slot, counting from 1
    #[arg(long)]
    pub correct: Option<u8>,

    /// Include the question in the next game
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Leave the question out of the next game
    #[arg(long)]
    pub disable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::parse_from(["quizbuzz"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_play_flags() {
        let cli = Cli::parse_from(["quizbuzz", "play", "--mock", "--port", "/dev/ttyUSB1"]);
        let Some(Commands::Play(args)) = cli.command else {
            panic!("expected play");
        };
        assert!(args.mock);
        assert_eq!(args.port.as_deref(), Some("/dev/ttyUSB1"));
    }

    #[test]
    fn test_questions_set() {
        let cli = Cli::parse_from([
            "quizbuzz",
            "--questions",
            "bank.json",
            "questions",
            "set",
            "3",
            "--text",
            "Largest planet?",
            "--answer",
            "Mars",
            "--answer",
            "Jupiter",
            "--correct",
            "2",
            "--enable",
        ]);
        assert_eq!(cli.questions, Some(PathBuf::from("bank.json")));
        let Some(Commands::Questions {
            action: QuestionCommands::Set(args),
        }) = cli.command
        else {
            panic!("expected questions set");
        };
        assert_eq!(args.number, 3);
        assert_eq!(args.answers, vec!["Mars", "Jupiter"]);
        assert_eq!(args.correct, Some(2));
        assert!(args.enable);
    }

    #[test]
    fn test_enable_and_disable_conflict() {
        let result = Cli::try_parse_from(["quizbuzz", "questions", "set", "1", "--enable", "--disable"]);
        assert!(result.is_err());
    }
}
