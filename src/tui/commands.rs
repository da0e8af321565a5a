//! Slash command parsing and definitions

use crossterm::style::Stylize;

/// Available slash commands
#[derive(Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    Clear,
    Model(Option<String>),
    Provider(Option<String>),
    Models,
    Thinking,
    Status,
}

/// Parse a slash command from user input.
/// Returns None if the input is not a slash command.
pub fn parse_command(input: &str) -> Option<SlashCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts
        .get(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(SlashCommand::Help),
        "/quit" | "/q" | "/exit" => Some(SlashCommand::Quit),
        "/clear" | "/cls" => Some(SlashCommand::Clear),
        "/model" => Some(SlashCommand::Model(arg)),
        "/provider" => Some(SlashCommand::Provider(arg)),
        "/models" => Some(SlashCommand::Models),
        "/thinking" => Some(SlashCommand::Thinking),
        "/status" => Some(SlashCommand::Status),
        _ => None,
    }
}

/// Render help text for all slash commands
pub fn render_help(renderer: &super::renderer::TerminalRenderer) {
    let cmd_color = renderer.command_color();
    let dim_color = renderer.dim_color();

    println!();
    renderer.render_system("Available commands:");
    println!();

    let commands = [
        ("/help", "Show this help message"),
        ("/quit", "Exit the chat"),
        ("/clear", "Clear the conversation history"),
        ("/model [name]", "Show or change the current model"),
        ("/provider [name]", "Show or change the provider"),
        ("/models", "List models offered by the provider"),
        ("/thinking", "Toggle display of reasoning tokens"),
        ("/status", "Show current provider and session status"),
    ];

    for (cmd, desc) in &commands {
        println!("  {:<20} {}", cmd.with(cmd_color), desc.with(dim_color));
    }
    println!();
}
