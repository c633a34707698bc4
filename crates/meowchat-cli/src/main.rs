//! Meowchat CLI - Chat with the household cats
//!
//! Talks to a running meowchat-server over HTTP.

mod api;
mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{Input, Select};

use api::{MeowchatClient, SessionResponse};
use config::Config;

#[derive(Parser)]
#[command(name = "meowchat")]
#[command(about = "Meowchat CLI - Chat with the household cats", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the cats, eldest first
    Personas,

    /// Start an interactive chat
    Chat {
        /// Cat to talk to (defaults to the configured persona, then the server default)
        #[arg(short, long)]
        persona: Option<String>,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set the server URL
    SetUrl {
        /// e.g. http://127.0.0.1:3000
        url: String,
    },
    /// Set the persona `chat` starts with
    SetPersona {
        /// Persona ID, e.g. Molly
        id: String,
    },
}

/// One line of input in the chat loop
#[derive(Debug, PartialEq)]
enum ChatCommand<'a> {
    Empty,
    Say(&'a str),
    Clear,
    Switch(&'a str),
    Starters,
    Quit,
    Unknown(&'a str),
}

impl<'a> ChatCommand<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if !line.starts_with('/') {
            return Self::Say(line);
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        match (command, arg) {
            ("/clear", _) => Self::Clear,
            ("/starters", _) => Self::Starters,
            ("/quit" | "/exit", _) => Self::Quit,
            ("/switch", id) if !id.is_empty() => Self::Switch(id),
            _ => Self::Unknown(command),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Personas => cmd_personas().await,
        Commands::Chat { persona } => cmd_chat(persona).await,
        Commands::Config { action } => cmd_config(action).await,
    }
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_personas() -> Result<()> {
    let config = Config::load()?;
    let client = MeowchatClient::new(&config.base_url);

    let personas = client.list_personas().await?;

    if let Ok(household) = client.household().await {
        println!(
            "{} {} ({})",
            "Cats of".bold(),
            household.owners_display.cyan(),
            household.location.dimmed()
        );
    }

    for persona in personas {
        let is_default = config.default_persona.as_deref() == Some(persona.id.as_str());
        let default_marker = if is_default {
            " (default)".green().to_string()
        } else {
            String::new()
        };

        println!("\n  {}{}", persona.label.cyan().bold(), default_marker);
        println!("  {}", persona.age_summary.dimmed());
        for fact in &persona.display_facts {
            println!("    • {}: {}", fact.label.bold(), fact.value);
        }
    }

    println!("\n{}", "Start chatting with:".dimmed());
    println!("  meowchat chat --persona <ID>");

    Ok(())
}

async fn cmd_chat(persona: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let client = MeowchatClient::new(&config.base_url);

    if !client.health().await.unwrap_or(false) {
        bail!(
            "Could not reach the Meowchat server at {}. Is meowchat-server running?",
            config.base_url
        );
    }

    let mut session = client
        .create_session(config.persona(persona.as_deref()))
        .await?;

    if let Ok(household) = client.household().await {
        println!(
            "{} {} in {}",
            "🐾 The cats of".bold(),
            household.owners_display.cyan(),
            household.location
        );
    }
    print_persona_header(&session);
    print_starters(available_starters(&session));
    println!(
        "{}",
        "Commands: /switch <id>, /clear, /starters, /quit".dimmed()
    );

    loop {
        let line: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?;

        match ChatCommand::parse(&line) {
            ChatCommand::Empty => continue,
            ChatCommand::Quit => break,
            ChatCommand::Say(text) => {
                say(&client, &mut session, text).await;
            }
            ChatCommand::Clear => match client.clear(session.id).await {
                Ok(cleared) => {
                    session = cleared;
                    println!("{} Conversation cleared", "✓".green());
                }
                Err(e) => println!("{} {}", "✗".red(), e),
            },
            ChatCommand::Switch(id) => match client.switch_persona(session.id, id).await {
                Ok(resp) if resp.switched => {
                    session = resp.session;
                    println!("{} Switched persona", "✓".green());
                    print_persona_header(&session);
                }
                Ok(resp) => {
                    session = resp.session;
                    println!("Already chatting with {}", session.persona.id.cyan());
                }
                Err(e) => println!("{} {}", "✗".red(), e),
            },
            ChatCommand::Starters => {
                let starters = available_starters(&session).to_vec();
                if starters.is_empty() {
                    println!("Starters are only offered before the conversation begins. Use /clear to start over.");
                    continue;
                }
                let choice = Select::new()
                    .with_prompt("Pick a starter")
                    .items(&starters)
                    .default(0)
                    .interact_opt()
                    .context("Failed to read selection")?;
                if let Some(index) = choice {
                    println!("{} {}", "You:".bold(), starters[index]);
                    say(&client, &mut session, &starters[index]).await;
                }
            }
            ChatCommand::Unknown(command) => {
                println!("{} Unknown command {}", "✗".yellow(), command);
            }
        }
    }

    if let Err(e) = client.end_session(session.id).await {
        eprintln!("{}", format!("Could not end session: {}", e).dimmed());
    }
    println!("{}", "Bye! 🐾".dimmed());

    Ok(())
}

async fn say(client: &MeowchatClient, session: &mut SessionResponse, text: &str) {
    match client.send_message(session.id, text).await {
        Ok(resp) => {
            println!("{} {}", format!("{}:", session.persona.id).cyan().bold(), resp.reply.content);
            *session = resp.session;
        }
        Err(e) => println!("{} {}", "✗".red(), e),
    }
}

fn print_persona_header(session: &SessionResponse) {
    println!("\n{}", session.persona.label.cyan().bold());
    println!("{}", session.persona.age_summary.dimmed());
    if !session.turns.is_empty() {
        println!("{}", format!("{} earlier messages", session.turns.len()).dimmed());
    }
}

/// Starters apply only to a conversation that has not begun
fn available_starters(session: &SessionResponse) -> &[String] {
    if session.turns.is_empty() {
        &session.conversation_starters
    } else {
        &[]
    }
}

fn print_starters(starters: &[String]) {
    if starters.is_empty() {
        return;
    }
    println!("\n{}", "Try asking:".bold());
    for starter in starters {
        println!("  • {}", starter);
    }
    println!();
}

async fn cmd_config(action: Option<ConfigAction>) -> Result<()> {
    let mut config = Config::load()?;

    match action {
        None => {
            println!("{}", "Configuration:".bold());
            println!("  Path: {:?}", Config::config_path()?);
            println!("  Server URL: {}", config.base_url);
            println!(
                "  Default Persona: {}",
                config.default_persona.as_deref().unwrap_or("Server default").cyan()
            );
        }

        Some(ConfigAction::SetUrl { url }) => {
            config.set_base_url(&url);
            config.save()?;
            println!("{} Server URL set to {}", "✓".green(), config.base_url);
        }

        Some(ConfigAction::SetPersona { id }) => {
            let client = MeowchatClient::new(&config.base_url);
            match client.get_persona(&id).await {
                Ok(persona) => {
                    config.set_default_persona(persona.id.clone());
                    config.save()?;
                    println!("{} Default persona set to {}", "✓".green(), persona.label.cyan());
                }
                Err(e) => {
                    bail!("Could not verify persona '{}': {}", id, e);
                }
            }
        }
    }

    Ok(())
}
