#![allow(missing_docs)]

//! Command-line driver for the parish-admin inbox and content editor.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use parish_admin::api::http::{ApiClient, HttpMessageApi};
use parish_admin::config::{self, Config, ContentBackend};
use parish_admin::editor::{
    ContentEditor, ContentStore, HttpContentStore, InMemoryContentStore, MediaKind, MediaUploader,
    ReplayWidget,
};
use parish_admin::inbox::{
    FilterState, InboxSettings, InboxState, MessageListController, MessageStatus, StatusFilter,
};
use parish_admin::logging;

#[derive(Debug, Parser)]
#[command(name = "parish-admin", version, about = "Parish website admin console")]
struct Cli {
    /// Config file (default: $PARISH_ADMIN_CONFIG or ~/.parish-admin/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write JSON logs, rotated daily, into this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Contact-message inbox.
    #[command(subcommand)]
    Inbox(InboxCommand),
    /// Events and sermons.
    #[command(subcommand)]
    Content(ContentCommand),
}

#[derive(Debug, Clone, Args)]
struct FilterArgs {
    /// all, new, read, replied or archived.
    #[arg(long, default_value = "all")]
    status: StatusFilter,

    /// Free-text search.
    #[arg(long, default_value = "")]
    search: String,

    /// Page number (clamped to the available pages).
    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Debug, Subcommand)]
enum InboxCommand {
    /// List one page of messages.
    List(FilterArgs),
    /// Show the full detail of a listed message.
    Show {
        /// Message identifier.
        id: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Change a message's status and print the refreshed page.
    SetStatus {
        /// Message identifier.
        id: String,
        /// new, read, replied or archived.
        status: MessageStatus,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Debug, Subcommand)]
enum ContentCommand {
    /// List events and sermons.
    List,
    /// Add an event.
    AddEvent {
        /// Title.
        #[arg(long)]
        title: String,
        /// Date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        /// Description.
        #[arg(long)]
        description: String,
        /// Hosted image URL; repeat for several.
        #[arg(long = "image")]
        images: Vec<String>,
    },
    /// Add a sermon.
    AddSermon {
        /// Title.
        #[arg(long)]
        title: String,
        /// Date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        /// Hosted video URL.
        #[arg(long)]
        video: Option<String>,
        /// Hosted audio URL.
        #[arg(long)]
        audio: Option<String>,
    },
    /// Delete an event.
    DeleteEvent {
        /// Event identifier.
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let _log_guard = match &cli.log_dir {
        Some(dir) => Some(logging::init_production(dir)?),
        None => {
            logging::init_cli();
            None
        }
    };

    match cli.command {
        Command::Init { force } => init(cli.config.as_deref(), force),
        Command::Inbox(command) => {
            let config = config::load(cli.config.as_deref()).context("failed to load configuration")?;
            run_inbox(&config, command).await
        }
        Command::Content(command) => {
            let config = config::load(cli.config.as_deref()).context("failed to load configuration")?;
            run_content(&config, command).await
        }
    }
}

fn init(explicit: Option<&Path>, force: bool) -> Result<()> {
    let path = config::resolve_config_path(explicit, |key| std::env::var(key).ok())?;
    if path.exists() && !force {
        anyhow::bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, Config::default().to_toml()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote default config");
    println!("Wrote {}", path.display());
    Ok(())
}

fn api_client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(config.api.base()?, config.api.timeout()).context("failed to build HTTP client")
}

async fn run_inbox(config: &Config, command: InboxCommand) -> Result<()> {
    let api = Arc::new(HttpMessageApi::new(api_client(config)?));
    // One-shot commands never see a second keystroke.
    let settings = InboxSettings {
        search_debounce: Duration::ZERO,
        ..InboxSettings::from(&config.inbox)
    };

    let filters = match &command {
        InboxCommand::List(f)
        | InboxCommand::Show { filters: f, .. }
        | InboxCommand::SetStatus { filters: f, .. } => f.clone(),
    };
    let controller = MessageListController::with_filters(
        api,
        settings,
        FilterState {
            status: filters.status,
            search: filters.search,
            page: filters.page,
            limit: settings.page_size,
        },
    );
    controller
        .mount()
        .await
        .context("failed to load messages")?;

    match command {
        InboxCommand::List(_) => print_inbox(&controller.snapshot().await),
        InboxCommand::Show { id, .. } => {
            if !controller.open_detail(&id).await {
                anyhow::bail!("message {id} is not on this page");
            }
            if let Some(detail) = controller.snapshot().await.detail.layout() {
                print!("{detail}");
            }
        }
        InboxCommand::SetStatus { id, status, .. } => {
            controller
                .update_status(&id, status)
                .await
                .with_context(|| format!("failed to set message {id} to {status}"))?;
            print_inbox(&controller.snapshot().await);
        }
    }
    Ok(())
}

fn print_inbox(state: &InboxState) {
    let cards = state.cards();
    if cards.is_empty() {
        println!("No messages found");
    }
    for card in cards {
        println!("{card}\n");
    }
    let bar = state.pagination_bar();
    if bar.visible {
        println!(
            "{}{}{}  ({} messages)",
            if bar.previous_enabled { "< " } else { "" },
            bar.label(),
            if bar.next_enabled { " >" } else { "" },
            state.pagination.total
        );
    }
    if let Some(feedback) = &state.feedback {
        println!("{feedback}");
    }
}

fn content_store(config: &Config) -> Result<Arc<dyn ContentStore>> {
    Ok(match config.content.backend {
        ContentBackend::Memory if config.content.seed_demo => {
            Arc::new(InMemoryContentStore::with_demo_data())
        }
        ContentBackend::Memory => Arc::new(InMemoryContentStore::new()),
        ContentBackend::Http => Arc::new(HttpContentStore::new(api_client(config)?)),
    })
}

fn upload_media(
    config: &Config,
    editor: &mut ContentEditor,
    media: &[(MediaKind, String)],
) -> Result<()> {
    if media.is_empty() {
        return Ok(());
    }
    let mut widget = ReplayWidget::new();
    let mut kinds = Vec::new();
    for (kind, url) in media {
        widget.queue(*kind, url.clone());
        if !kinds.contains(kind) {
            kinds.push(*kind);
        }
    }
    let mut uploader = MediaUploader::new(widget);
    uploader.configure(&config.upload)?;
    for kind in kinds {
        uploader.open(kind)?;
        editor.apply_uploads(&mut uploader);
    }
    uploader.dispose();
    Ok(())
}

async fn run_content(config: &Config, command: ContentCommand) -> Result<()> {
    let mut editor = ContentEditor::new(content_store(config)?);
    editor.load().await.context("failed to load content")?;

    match command {
        ContentCommand::List => {
            println!("Events");
            for event in editor.events() {
                println!("{event}");
            }
            println!("\nSermons");
            for sermon in editor.sermons() {
                println!("{sermon}");
            }
            return Ok(());
        }
        ContentCommand::AddEvent {
            title,
            date,
            description,
            images,
        } => {
            let media: Vec<_> = images.into_iter().map(|url| (MediaKind::Image, url)).collect();
            upload_media(config, &mut editor, &media)?;
            let draft = editor.event_draft_mut();
            draft.title = title;
            draft.date = date;
            draft.description = description;
            let event = editor.submit_event().await.context("event not added")?;
            println!("{event}");
        }
        ContentCommand::AddSermon {
            title,
            date,
            video,
            audio,
        } => {
            let media: Vec<_> = video
                .map(|url| (MediaKind::Video, url))
                .into_iter()
                .chain(audio.map(|url| (MediaKind::Audio, url)))
                .collect();
            upload_media(config, &mut editor, &media)?;
            let draft = editor.sermon_draft_mut();
            draft.title = title;
            draft.date = date;
            let sermon = editor.submit_sermon().await.context("sermon not added")?;
            println!("{sermon}");
        }
        ContentCommand::DeleteEvent { id } => {
            editor
                .delete_event(&id)
                .await
                .with_context(|| format!("event {id} not deleted"))?;
        }
    }

    if let Some(feedback) = editor.feedback() {
        println!("{feedback}");
    }
    Ok(())
}
