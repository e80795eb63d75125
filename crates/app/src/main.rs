use agent_host::{attachments, Conversation, PendingAttachment, TurnError};
use anyhow::{bail, Context, Result};
use providers::{ChatBackend, OllamaClient};
use services::sessions::{self, SessionStore};
use services::SettingsStore;
use std::fs;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod commands;
mod host;
mod render;

use commands::Command;
use host::PreviewHost;

struct ChatApp {
    chat: Conversation,
    chat_id: String,
    sessions: SessionStore,
    backend: OllamaClient,
    host: PreviewHost,
    attachment: Option<PendingAttachment>,
}

impl ChatApp {
    fn save(&self) {
        if let Err(err) = self.sessions.upsert(&self.chat_id, self.chat.messages()) {
            tracing::warn!(error = %err, "could not save chat");
        }
    }

    fn start_new(&mut self) {
        self.save();
        self.chat = Conversation::new();
        self.chat_id = sessions::new_id();
        self.attachment = None;
    }

    fn print_transcript(&self) {
        for message in self.chat.messages() {
            println!("{}", render::message_text(message));
        }
    }

    fn refresh_preview(&self) -> Result<()> {
        if self.chat.preview().is_open {
            let path = self.host.show(self.chat.preview())?;
            println!("preview: {}", path.display());
        }
        Ok(())
    }

    fn require_preview(&self) -> Result<()> {
        if !self.chat.preview().is_open {
            bail!("no preview is open (use /preview <n>)");
        }
        Ok(())
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        let attachment = self.attachment.take();
        println!("… thinking ({})", self.backend.describe());
        let result = self
            .chat
            .submit(&self.backend, text, attachment.as_ref())
            .await;
        match result {
            Ok(reply) => {
                let applied = reply.is_edit_response();
                println!("{}", render::message_text(reply));
                if applied {
                    self.refresh_preview()?;
                }
            }
            Err(TurnError::Backend(_)) => {
                if let Some(error) = self.chat.messages().last() {
                    println!("{}", render::message_text(error));
                }
            }
            Err(err) => println!("{err}"),
        }
        self.save();
        Ok(())
    }

    fn preview(&mut self, index: Option<usize>) -> Result<()> {
        let Some(n) = index else {
            let last_edit = self
                .chat
                .messages()
                .iter()
                .rposition(|m| m.is_edit_response());
            match last_edit {
                Some(i) => {
                    self.chat.reopen_edit(i);
                }
                None => self.require_preview()?,
            }
            return self.refresh_preview();
        };

        let reply = self
            .chat
            .last_assistant()
            .map(|m| m.content.clone())
            .context("no assistant reply yet")?;
        let segments = content::parse(&reply);
        let segment = n
            .checked_sub(1)
            .and_then(|i| segments.get(i))
            .with_context(|| format!("the last reply has {} segments", segments.len()))?;
        if !self.chat.open_preview(segment) {
            bail!("segment {n} is a {} segment and cannot be previewed", segment.kind());
        }
        self.refresh_preview()
    }

    /// Returns false when the user asked to quit.
    async fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Send(text) => self.send(&text).await?,
            Command::Preview(index) => self.preview(index)?,
            Command::Edit(path) => {
                self.require_preview()?;
                let code = fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                self.chat.edit_preview_locally(code);
                self.refresh_preview()?;
            }
            Command::Sync => {
                self.require_preview()?;
                self.chat.sync_preview();
                println!("local edits kept");
            }
            Command::Reset => {
                self.require_preview()?;
                self.chat.reset_preview();
                self.refresh_preview()?;
            }
            Command::Close => {
                self.chat.close_preview();
                println!("preview closed");
            }
            Command::Attach(path) => {
                let file = attachments::load(&path)?;
                println!("attached {} ({})", file.name, file.mime_type);
                self.attachment = Some(file);
            }
            Command::New => {
                self.start_new();
                self.print_transcript();
            }
            Command::History => {
                let records = self.sessions.load_all();
                if records.is_empty() {
                    println!("no saved chats");
                }
                for record in sessions::sorted(&records) {
                    let pin = if record.pinned { "📌" } else { "  " };
                    println!(
                        "{pin} {}  {}  {}",
                        record.id,
                        record.date.format("%Y-%m-%d %H:%M"),
                        record.title
                    );
                }
            }
            Command::Load(id) => {
                let record = self
                    .sessions
                    .get(&id)
                    .with_context(|| format!("no saved chat {id}"))?;
                self.save();
                self.chat = Conversation::from_messages(record.messages);
                self.chat_id = record.id;
                self.print_transcript();
            }
            Command::Delete(id) => {
                if !self.sessions.delete(&id)? {
                    bail!("no saved chat {id}");
                }
                if id == self.chat_id {
                    self.chat = Conversation::new();
                    self.chat_id = sessions::new_id();
                }
                println!("deleted {id}");
            }
            Command::Pin(id) => {
                if !self.sessions.toggle_pin(&id)? {
                    bail!("no saved chat {id}");
                }
            }
            Command::Rename { id, title } => {
                if !self.sessions.rename(&id, &title)? {
                    bail!("no saved chat {id}");
                }
            }
            Command::Export(path) => {
                let title = sessions::derive_title(self.chat.messages());
                fs::write(&path, render::transcript_html(&title, self.chat.messages()))
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("exported to {}", path.display());
            }
            Command::Help => println!("{}", commands::HELP),
            Command::Quit => {
                self.save();
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let settings = SettingsStore::open_default().load();
    let backend = OllamaClient::new(&settings.model);
    tracing::info!(backend = %backend.describe(), "starting");

    let mut app = ChatApp {
        chat: Conversation::new(),
        chat_id: sessions::new_id(),
        sessions: SessionStore::open_default(),
        backend,
        host: PreviewHost::open_default(),
        attachment: None,
    };
    if !settings.user_name.is_empty() {
        println!("Hi {}!", settings.user_name);
    }
    app.print_transcript();
    println!("(/help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("› ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            app.save();
            break;
        };
        match commands::parse(&line) {
            Ok(Some(command)) => match app.handle(command).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => println!("error: {err:#}"),
            },
            Ok(None) => {}
            Err(usage) => println!("{usage}"),
        }
    }
    Ok(())
}
