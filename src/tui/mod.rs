//! Interactive terminal chat
//!
//! A small shell over the provider abstraction with streaming responses,
//! colored output, markdown rendering, and multi-turn conversation history.
//! Reasoning tokens stream dimmed and can be toggled off entirely.

pub mod commands;
pub mod prompt;
pub mod renderer;
pub mod spinner;
pub mod theme;

use crate::api::{
    create_provider, ChatProvider, ChatRequest, Message, ProviderKind, StreamEvent,
};
use crate::config::Config;

use commands::{parse_command, render_help, SlashCommand};
use prompt::PromptHandler;
use renderer::TerminalRenderer;
use spinner::WaitSpinner;

use anyhow::Result;
use crossterm::style::Stylize;

/// Interactive chat shell with streaming, markdown, and multi-turn support
pub struct ChatShell {
    config: Config,
    provider: Box<dyn ChatProvider>,
    renderer: TerminalRenderer,
    prompt_handler: PromptHandler,
    /// Conversation history (user + assistant messages)
    conversation: Vec<Message>,
    /// System prompt applied to every turn
    system: Option<String>,
    /// Whether reasoning tokens are rendered
    show_thinking: bool,
    /// Number of turns completed
    turn_count: usize,
}

/// Result of handling a slash command
enum CommandResult {
    Continue,
    Quit,
}

impl ChatShell {
    pub fn new(
        config: Config,
        kind: ProviderKind,
        model: Option<String>,
        system: Option<String>,
        show_thinking: bool,
    ) -> Result<Self> {
        let provider = build_provider(&config, kind, model)?;

        Ok(Self {
            config,
            provider,
            renderer: TerminalRenderer::new(),
            prompt_handler: PromptHandler::new(),
            conversation: Vec::new(),
            system,
            show_thinking,
            turn_count: 0,
        })
    }

    /// Run the chat shell main loop
    pub async fn run(&mut self) -> Result<()> {
        self.renderer.render_banner(
            env!("CARGO_PKG_VERSION"),
            self.provider.kind().display_name(),
            self.provider.model(),
        );

        loop {
            let input = match self.prompt_handler.read_line(self.renderer.prompt_color()) {
                Some(input) => input,
                None => {
                    // EOF (Ctrl+D)
                    self.render_session_summary();
                    break;
                }
            };

            if input.is_empty() {
                continue;
            }

            if let Some(cmd) = parse_command(&input) {
                match self.handle_command(cmd).await {
                    CommandResult::Continue => continue,
                    CommandResult::Quit => {
                        self.render_session_summary();
                        break;
                    }
                }
            } else {
                self.process_message(&input).await;
            }
        }

        Ok(())
    }

    /// Handle a slash command
    async fn handle_command(&mut self, cmd: SlashCommand) -> CommandResult {
        match cmd {
            SlashCommand::Help => {
                render_help(&self.renderer);
            }
            SlashCommand::Quit => {
                return CommandResult::Quit;
            }
            SlashCommand::Clear => {
                self.conversation.clear();
                self.renderer.render_success("Conversation history cleared.");
            }
            SlashCommand::Model(name) => {
                if let Some(name) = name {
                    match build_provider(&self.config, self.provider.kind(), Some(name.clone())) {
                        Ok(provider) => {
                            self.provider = provider;
                            self.renderer
                                .render_success(&format!("Model set to: {}", name));
                        }
                        Err(e) => {
                            self.renderer
                                .render_error(&format!("Failed to switch model: {}", e));
                        }
                    }
                } else {
                    self.renderer
                        .render_info(&format!("Current model: {}", self.provider.model()));
                }
            }
            SlashCommand::Provider(name) => {
                if let Some(name) = name {
                    match self.switch_provider(&name) {
                        Ok(()) => {
                            self.renderer.render_success(&format!(
                                "Switched to provider: {} ({})",
                                self.provider.kind().display_name(),
                                self.provider.model()
                            ));
                        }
                        Err(e) => {
                            self.renderer.render_error(&format!("{}", e));
                        }
                    }
                } else {
                    self.renderer.render_info(&format!(
                        "Current provider: {} ({})",
                        self.provider.kind().display_name(),
                        self.provider.model()
                    ));
                }
            }
            SlashCommand::Models => {
                self.list_models().await;
            }
            SlashCommand::Thinking => {
                self.show_thinking = !self.show_thinking;
                self.renderer.render_success(&format!(
                    "Reasoning tokens {}.",
                    if self.show_thinking { "shown" } else { "hidden" }
                ));
            }
            SlashCommand::Status => {
                self.render_status();
            }
        }
        CommandResult::Continue
    }

    /// Process a user message: build request, stream response, update history
    async fn process_message(&mut self, input: &str) {
        let mut request = ChatRequest::new(input).with_history(self.conversation.clone());
        if let Some(system) = &self.system {
            request = request.with_system(system.clone());
        }

        let mut spinner = WaitSpinner::new();
        spinner.start("Waiting for reply...");

        let mut rx = match self.provider.send_streaming(request).await {
            Ok(rx) => rx,
            Err(e) => {
                spinner.stop();
                self.renderer.render_error(&format!("Request failed: {}", e));
                return;
            }
        };

        let mut full_response = String::new();
        let mut first_token = true;
        let mut in_thinking = false;

        while let Some(event) = rx.recv().await {
            match &event {
                StreamEvent::Thinking(_) => {
                    if !self.show_thinking {
                        continue;
                    }
                    let text = event.unescaped_text().unwrap_or_default();
                    if first_token {
                        spinner.stop();
                        println!();
                        first_token = false;
                    }
                    in_thinking = true;
                    self.renderer.render_thinking_delta(&text);
                }
                StreamEvent::Content(_) => {
                    let text = event.unescaped_text().unwrap_or_default();
                    if first_token {
                        spinner.stop();
                        println!();
                        first_token = false;
                    }
                    if in_thinking {
                        // Separate the reasoning trace from the answer
                        println!("\n");
                        in_thinking = false;
                    }
                    full_response.push_str(&text);
                    self.renderer.render_delta(&text);
                }
                StreamEvent::Done => {
                    spinner.stop();
                    break;
                }
                StreamEvent::Error(msg) => {
                    spinner.stop();
                    if !full_response.is_empty() {
                        println!();
                    }
                    self.renderer.render_error(&format!("Stream error: {}", msg));
                    break;
                }
            }
        }

        if full_response.is_empty() {
            if first_token {
                spinner.stop();
            }
            self.renderer.render_error("No response received.");
            return;
        }

        // Re-render with markdown if applicable
        self.renderer.render_markdown(&full_response);
        self.renderer.render_turn_line(
            self.provider.kind().display_name(),
            self.provider.model(),
        );

        self.conversation.push(Message::user(input));
        self.conversation.push(Message::assistant(full_response));
        self.turn_count += 1;
    }

    /// Fetch and display the provider's model catalogue
    async fn list_models(&self) {
        let mut spinner = WaitSpinner::new();
        spinner.start("Fetching models...");

        match self.provider.list_models().await {
            Ok(models) => {
                spinner.stop();
                if models.is_empty() {
                    self.renderer.render_info("No models reported.");
                } else {
                    self.renderer.render_system(&format!(
                        "Models at {}:",
                        self.provider.kind().display_name()
                    ));
                    for model in models {
                        println!("  {}", model.with(self.renderer.dim_color()));
                    }
                }
            }
            Err(e) => {
                spinner.stop();
                self.renderer
                    .render_error(&format!("Failed to fetch models: {}", e));
            }
        }
    }

    /// Switch to a different provider from the registry
    fn switch_provider(&mut self, name: &str) -> Result<()> {
        let kind = ProviderKind::from_name(name)?;
        self.provider = build_provider(&self.config, kind, None)?;
        Ok(())
    }

    /// Render current status
    fn render_status(&self) {
        println!();
        self.renderer.render_system("Current Status:");
        println!(
            "  {} {}",
            "Provider:".with(self.renderer.dim_color()),
            self.provider
                .kind()
                .display_name()
                .with(self.renderer.accent_color()),
        );
        println!(
            "  {} {}",
            "Model:".with(self.renderer.dim_color()),
            self.provider.model().with(self.renderer.accent_color()),
        );
        println!(
            "  {} {}",
            "API base:".with(self.renderer.dim_color()),
            self.provider.api_base().with(self.renderer.accent_color()),
        );
        let thinking_state = if self.show_thinking { "shown" } else { "hidden" };
        println!(
            "  {} {}",
            "Reasoning tokens:".with(self.renderer.dim_color()),
            thinking_state.with(self.renderer.accent_color()),
        );
        println!(
            "  {} {}",
            "Turns:".with(self.renderer.dim_color()),
            format!("{}", self.turn_count).with(self.renderer.accent_color()),
        );
        println!(
            "  {} {}",
            "Inputs:".with(self.renderer.dim_color()),
            format!("{}", self.prompt_handler.history_len())
                .with(self.renderer.accent_color()),
        );
        println!();
    }

    /// Render session summary on exit
    fn render_session_summary(&self) {
        println!();
        self.renderer.render_system("Session Summary:");
        println!(
            "  {} turns with {}",
            format!("{}", self.turn_count).with(self.renderer.accent_color()),
            self.provider
                .kind()
                .display_name()
                .with(self.renderer.accent_color()),
        );
        self.renderer.render_info("Goodbye!");
        println!();
    }
}

/// Build a provider from stored settings, optionally overriding the model
fn build_provider(
    config: &Config,
    kind: ProviderKind,
    model: Option<String>,
) -> Result<Box<dyn ChatProvider>> {
    let mut provider_config = config.provider_config(kind);
    if model.is_some() {
        provider_config.model = model;
    }
    Ok(create_provider(kind, provider_config)?)
}
