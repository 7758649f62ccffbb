//! Interactive host console for `quizbuzz play`.
//!
//! Host commands are read line by line from stdin while buzzes arrive from
//! the background poller. Both feed the same session controller, so they
//! are serialized in one `select!` loop.

use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use quizbuzz_core::ContestantId;
use quizbuzz_engine::{CommandError, CommandReply, SessionController, SessionEvent};
use quizbuzz_hardware::AnyInputSource;
use quizbuzz_hardware::mock::{MockBuzzerHandle, MockBuzzerPanel};
use quizbuzz_storage::{JsonFileStore, QuestionBank};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::render;

const HELP: &str = "\
Commands:
  start                 start a new game
  answer <player> <n>   answer option n for a player
  declare <player>      award an open question to a player
  next                  move to the next question
  round-reset           clear the floor and lockouts of this question
  reset                 discard the game
  buzz <player>         press a console buzzer (simulated panel only)
  status                show the current question and scores
  help                  show this text
  quit                  leave";

/// A line typed by the host. Players and options count from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Start,
    Answer { player: u8, option: usize },
    Declare { player: u8 },
    Next,
    RoundReset,
    Reset,
    Buzz { player: u8 },
    Status,
    Help,
    Quit,
}

impl FromStr for HostCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "answer" | "a" => Self::Answer {
                player: number(words.next(), "player")?,
                option: usize::from(number(words.next(), "option")?),
            },
            "declare" | "d" => Self::Declare {
                player: number(words.next(), "player")?,
            },
            "next" | "n" => Self::Next,
            "round-reset" => Self::RoundReset,
            "reset" => Self::Reset,
            "buzz" | "b" => Self::Buzz {
                player: number(words.next(), "player")?,
            },
            "status" | "s" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command `{other}`, type `help`"),
        };

        if words.next().is_some() {
            bail!("too many arguments for `{verb}`");
        }
        Ok(command)
    }
}

/// Parse a 1-based number argument.
fn number(word: Option<&str>, what: &str) -> Result<u8> {
    let word = word.ok_or_else(|| anyhow!("missing {what} number"))?;
    match word.parse::<u8>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => bail!("{what} must be a number from 1, got `{word}`"),
    }
}

/// Where buzzes come from for this run.
pub struct Buzzers {
    pub source: AnyInputSource,

    /// Set when the console simulates the panel.
    pub console: Option<MockBuzzerHandle>,
}

impl Buzzers {
    /// Open the configured controller, or fall back to console buzzers.
    ///
    /// A controller that cannot be opened is not fatal: the game still runs
    /// and the host can press buzzers or declare winners from the console.
    pub fn open(config: &AppConfig) -> Self {
        if !config.mock {
            #[cfg(feature = "hardware-serial")]
            {
                let serial = config.serial_for_roster();
                match quizbuzz_hardware::modbus::ModbusRtuInput::open(serial) {
                    Ok(reader) => {
                        info!(port = %config.serial.port, "buzzer controller opened");
                        return Self {
                            source: reader.into(),
                            console: None,
                        };
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            port = %config.serial.port,
                            "buzzer controller unavailable, using console buzzers"
                        );
                    }
                }
            }
            #[cfg(not(feature = "hardware-serial"))]
            {
                warn!("built without serial support, using console buzzers");
            }
        }

        Self::console(config.game.roster_size)
    }

    pub fn console(roster_size: usize) -> Self {
        let (panel, handle) = MockBuzzerPanel::with_name("console".to_string(), roster_size);
        Self {
            source: panel.into(),
            console: Some(handle),
        }
    }
}

/// Run the console until the host quits or stdin closes.
pub async fn run(config: AppConfig) -> Result<()> {
    let roster_size = config.game.roster_size;
    let bank = QuestionBank::new(JsonFileStore::new(config.store.clone()));
    let mut controller = SessionController::new(bank, config.game.clone())?;

    let buzzers = Buzzers::open(&config);
    let console = buzzers.console;
    let mut mailbox = controller.attach_poller(buzzers.source).await?;
    let mut polling = true;
    let mut events = controller.subscribe();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!(
        "quizbuzz: {roster_size} players, questions from {}",
        config.store.path.display()
    );
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<HostCommand>() {
                    Ok(HostCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(&mut controller, command, console.as_ref()).await {
                            println!("{e}");
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }

            buzz = mailbox.recv(), if polling => match buzz {
                Some(buzz) => {
                    controller.handle_buzz(buzz)?;
                }
                None => {
                    polling = false;
                    warn!("buzz polling stopped");
                    println!("Buzzers unavailable. Use `declare <player>` to award points.");
                }
            },

            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(panel) = &console
                        && releases_console_buzzers(&event)
                    {
                        panel.release_all();
                    }
                    if let Some(text) = render::event(&event) {
                        println!("{text}");
                    }
                }
                Err(RecvError::Lagged(missed)) => warn!(missed, "console fell behind on events"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    let last = controller.shutdown().await;
    if let Some(report) = &last.report {
        println!("{report}");
    }
    info!("console closed");
    Ok(())
}

/// Console presses are held until the floor changes hands or the round
/// moves on.
fn releases_console_buzzers(event: &SessionEvent) -> bool {
    matches!(
        event,
        SessionEvent::FloorGranted { .. }
            | SessionEvent::QuestionPresented { .. }
            | SessionEvent::RoundReset
            | SessionEvent::RoundResolved { .. }
            | SessionEvent::SessionReset
    )
}

async fn execute(
    controller: &mut SessionController<JsonFileStore>,
    command: HostCommand,
    console: Option<&MockBuzzerHandle>,
) -> Result<()> {
    let roster_size = controller.engine().config().roster_size;
    let player = |n: u8| ContestantId::new(n - 1, roster_size);

    let reply: CommandReply = match command {
        HostCommand::Start => match controller.start_session().await {
            Err(CommandError::NoEnabledQuestions) => {
                bail!("No enabled questions. Add some with `quizbuzz questions set`.")
            }
            result => result?,
        },
        HostCommand::Answer { player: n, option } => {
            controller.submit_answer(player(n)?, option - 1)?
        }
        HostCommand::Declare { player: n } => controller.declare_manual_winner(player(n)?)?,
        HostCommand::Next => controller.advance()?,
        HostCommand::RoundReset => controller.reset_round()?,
        HostCommand::Reset => controller.reset_session()?,
        HostCommand::Buzz { player: n } => {
            let Some(panel) = console else {
                bail!("Real buzzers are connected; `buzz` only drives the simulated panel.");
            };
            let id = player(n)?;
            if controller.snapshot().contestants[id.index()].locked_out {
                bail!("{id} is locked out for this question.");
            }
            panel.press(id.index());
            return Ok(());
        }
        HostCommand::Status => {
            println!("{}", render::snapshot(&controller.snapshot()));
            return Ok(());
        }
        HostCommand::Help => {
            println!("{HELP}");
            return Ok(());
        }
        HostCommand::Quit => return Ok(()),
    };

    if let Some(reason) = reply.disposition.ignored_because() {
        println!("Ignored: {reason}.");
    }
    Ok(())
}
