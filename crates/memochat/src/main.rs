//! A terminal chat client that streams replies as they arrive.

#[macro_use]
extern crate tracing;

use std::fmt::Display;
use std::io::Write as _;
use std::iter;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use memochat::{Command, FileIdentityStore, Settings, conversation_from_detail};
use memochat_core::identity::MemoryIdentityStore;
use memochat_core::{ConversationState, Session, SessionBuilder, TurnPhase};
use memochat_http::HttpChatService;
use memochat_model::{MessageId, Role, SemanticMemory};
use owo_colors::OwoColorize;
use serde_json::Value;
use tokio::io::{self, AsyncBufReadExt};

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env();
    let identity = match Settings::identity_file() {
        Some(path) => {
            let store = FileIdentityStore::new(path);
            debug!("identity file: {}", store.path().display());
            settings.identity(&store)
        }
        None => {
            warn!("no config directory, the identity won't be kept");
            settings.identity(&MemoryIdentityStore::new())
        }
    };

    let service = HttpChatService::new(settings.chat_config(identity));
    println!(
        "{} connected to {} as {}",
        BAR_CHAR.bright_cyan(),
        service.config().base_url().bright_white(),
        service.config().identity().bright_white(),
    );

    let mut printer = TurnPrinter::new();
    let mut session = SessionBuilder::with_chat_service(service.clone())
        .on_update(move |state| printer.update(state))
        .build();

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Quit => break,
            Command::Usage(usage) => println!("usage: {usage}"),
            Command::Send(text) => {
                if session.is_turn_active() {
                    println!("Please wait for the current reply.");
                    continue;
                }
                let phase = session.send_message(&text).await;
                debug!("turn ended: {phase:?}");
            }
            Command::New => match service.create_conversation().await {
                Ok(summary) => {
                    session.set_conversation(ConversationState::from_history(
                        Some(summary.id.clone()),
                        iter::empty(),
                    ));
                    println!("Started {}.", summary.id.bright_white());
                }
                Err(err) => print_error(err),
            },
            Command::Chats => match service.list_conversations().await {
                Ok(chats) if chats.is_empty() => println!("No conversations."),
                Ok(chats) => {
                    let current = session.state().chat_id();
                    for chat in chats {
                        let marker =
                            if current == Some(chat.id.as_str()) { "*" } else { " " };
                        println!(
                            "{marker} {}  {} ({} messages)",
                            chat.id.bright_white(),
                            chat.title,
                            chat.message_count,
                        );
                    }
                }
                Err(err) => print_error(err),
            },
            Command::Open(chat_id) => {
                match service.get_conversation(&chat_id).await {
                    Ok(detail) => {
                        session.set_conversation(conversation_from_detail(detail));
                        print_history(&session);
                    }
                    Err(err) => print_error(err),
                }
            }
            Command::Delete(chat_id) => {
                match service.delete_conversation(&chat_id).await {
                    Ok(deleted) => {
                        if session.state().chat_id() == Some(deleted.as_str()) {
                            session.set_conversation(ConversationState::new());
                        }
                        println!("Deleted {}.", deleted.bright_white());
                    }
                    Err(err) => print_error(err),
                }
            }
            Command::Memories => {
                if !session.refresh_memories().await {
                    print_error("failed to fetch memories");
                }
                print_memories(session.memories());
            }
        }
    }
}

/// Prints the assistant message of each turn as it grows.
struct TurnPrinter {
    style: ProgressStyle,
    current: Option<MessageId>,
    printed: usize,
    finished: bool,
    spinner: Option<ProgressBar>,
}

impl TurnPrinter {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        Self {
            style,
            current: None,
            printed: 0,
            finished: false,
            spinner: None,
        }
    }

    fn update(&mut self, state: &ConversationState) {
        let (Some(message), Some(phase)) =
            (state.turn_message(), state.turn_phase())
        else {
            return;
        };

        if self.current != Some(message.id) {
            self.current = Some(message.id);
            self.printed = 0;
            self.finished = false;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(self.style.clone());
            spinner.set_message("🤔 Thinking...");
            spinner.enable_steady_tick(Duration::from_millis(100));
            self.spinner = Some(spinner);
        }
        if self.finished {
            return;
        }

        let delta = message.content.get(self.printed..).unwrap_or_default();
        if !delta.is_empty() {
            // Finish the spinner before printing anything else.
            if let Some(spinner) = self.spinner.take() {
                spinner.finish_and_clear();
                print!("{}🤖 ", BAR_CHAR.bright_cyan());
            }
            print!("{}", delta.bright_white());
            std::io::stdout().flush().ok();
            self.printed = message.content.len();
        }

        if phase.is_terminal() {
            if let Some(spinner) = self.spinner.take() {
                spinner.finish_and_clear();
            }
            if self.printed > 0 {
                println!();
            }
            if phase == TurnPhase::Failed {
                println!("{}", "The reply was interrupted.".bright_red());
            }
            self.finished = true;
        }
    }
}

fn print_history(session: &Session) {
    for message in session.state().messages() {
        match message.role {
            Role::User => println!("> {}", message.content),
            Role::Assistant => println!(
                "{}🤖 {}",
                BAR_CHAR.bright_cyan(),
                message.content.bright_white()
            ),
        }
    }
}

fn print_memories(memories: &[SemanticMemory]) {
    if memories.is_empty() {
        println!("Nothing remembered yet.");
        return;
    }
    for memory in memories {
        let value = match &memory.value {
            Value::String(value) => value.clone(),
            value => value.to_string(),
        };
        let kind = memory.kind.as_deref().unwrap_or("memory");
        match memory.confidence {
            Some(confidence) => println!(
                "{} {}: {} ({kind}, {:.0}%)",
                BAR_CHAR.bright_magenta(),
                memory.key.bold(),
                value,
                confidence * 100.0,
            ),
            None => println!(
                "{} {}: {} ({kind})",
                BAR_CHAR.bright_magenta(),
                memory.key.bold(),
                value,
            ),
        }
    }
}

fn print_error(err: impl Display) {
    eprintln!("{} {err}", "error:".bright_red());
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
