//! Command-line interface for dunamis.
//!
//! Browsing commands talk to the public API, admin commands use the
//! session saved by `dunamis login`, and `serve` runs the Open Graph proxy.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::adapters::{AdminClient, ApiClient, ApiError, HttpMetadataFetcher, ResourceQuery};
use crate::config::{self, paths, ResolvedConfig};
use crate::domain::{Category, Resource, ResourceDraft};
use crate::loader::{CategoryLoader, CategoryView};
use crate::resolver::{LinkPrefill, LinkResolver, PrefillOutcome, MANUAL_ENTRY_MESSAGE};
use crate::server::{self, ProxyState};
use crate::session::{Session, SessionStore};

/// dunamis - Dunamis Faith Resource Hub client
#[derive(Parser, Debug)]
#[command(name = "dunamis")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List one page of a category
    List {
        /// Category (sermons, worship, books, movies)
        category: Category,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Resources per page (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// List every resource, optionally filtered by category
    All {
        #[arg(short, long)]
        category: Option<Category>,

        #[arg(short, long, default_value = "1")]
        page: u32,

        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// List featured resources
    Featured,

    /// Show one resource
    Show {
        /// Resource ID
        id: String,
    },

    /// Look up title, description and thumbnail for a link
    Resolve {
        /// External link (YouTube, Spotify, book page or PDF)
        url: String,
    },

    /// Run the Open Graph proxy
    Serve {
        /// Address to bind to (defaults to the configured address)
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Log in as an admin
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "DUNAMIS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the saved admin session
    Logout,

    /// Show the logged-in admin
    Whoami,

    /// Create a resource
    Create {
        /// External link; details are looked up unless --no-prefill
        #[arg(long)]
        link: String,

        #[arg(short, long)]
        category: Category,

        #[command(flatten)]
        fields: DraftFields,
    },

    /// Update a resource
    Update {
        /// Resource ID
        id: String,

        /// New external link; details are looked up unless --no-prefill
        #[arg(long)]
        link: Option<String>,

        #[arg(short, long)]
        category: Option<Category>,

        #[command(flatten)]
        fields: DraftFields,
    },

    /// Delete a resource
    Delete {
        /// Resource ID
        id: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Draft fields shared by create and update. Explicit values win over
/// looked-up link details.
#[derive(Args, Debug, Default)]
pub struct DraftFields {
    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Thumbnail URL
    #[arg(short, long)]
    pub image: Option<String>,

    /// Show on the landing page (`--featured false` clears it)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub featured: Option<bool>,

    /// Skip the link lookup
    #[arg(long)]
    pub no_prefill: bool,
}

impl DraftFields {
    /// Overwrite draft fields with the values given on the command line
    fn apply(&self, draft: &mut ResourceDraft) {
        if let Some(title) = &self.title {
            draft.title = title.clone();
        }
        if let Some(description) = &self.description {
            draft.description = description.clone();
        }
        if let Some(image) = &self.image {
            draft.image_url = image.clone();
        }
        if let Some(featured) = self.featured {
            draft.featured = featured;
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::config()?;

        match self.command {
            Commands::List {
                category,
                page,
                limit,
            } => list_category(cfg, category, page, limit).await,
            Commands::All {
                category,
                page,
                limit,
            } => list_all(cfg, category, page, limit).await,
            Commands::Featured => list_featured(cfg).await,
            Commands::Show { id } => show_resource(cfg, &id).await,
            Commands::Resolve { url } => resolve_link(cfg, &url).await,
            Commands::Serve { address } => serve(cfg, address).await,
            Commands::Login { email, password } => login(cfg, &email, &password).await,
            Commands::Logout => logout().await,
            Commands::Whoami => whoami(cfg).await,
            Commands::Create {
                link,
                category,
                fields,
            } => create_resource(cfg, link, category, fields).await,
            Commands::Update {
                id,
                link,
                category,
                fields,
            } => update_resource(cfg, &id, link, category, fields).await,
            Commands::Delete { id } => delete_resource(cfg, &id).await,
            Commands::Config => show_config(cfg),
        }
    }
}

fn api_client(cfg: &ResolvedConfig) -> Result<ApiClient> {
    ApiClient::from_config(cfg).context("Failed to create API client")
}

fn session_store() -> Result<SessionStore> {
    Ok(SessionStore::new(paths::session_file()?))
}

fn link_prefill(cfg: &ResolvedConfig) -> Result<LinkPrefill<HttpMetadataFetcher>> {
    let fetcher =
        HttpMetadataFetcher::from_config(cfg).context("Failed to create metadata clients")?;
    Ok(LinkPrefill::new(LinkResolver::new(fetcher, cfg.request_timeout)))
}

/// Print one page of a category
async fn list_category(
    cfg: &ResolvedConfig,
    category: Category,
    page: u32,
    limit: Option<u32>,
) -> Result<()> {
    let loader = CategoryLoader::new(api_client(cfg)?)
        .with_page_size(limit.unwrap_or(cfg.page_size));

    print!("{}", CategoryView::heading(category));
    eprint!("{}", CategoryView::Loading.body());

    let view = loader.view(category, page).await;
    print!("{}", view.body());

    if let CategoryView::Failed { .. } = view {
        std::process::exit(1);
    }
    Ok(())
}

/// Print the general listing
async fn list_all(
    cfg: &ResolvedConfig,
    category: Option<Category>,
    page: u32,
    limit: Option<u32>,
) -> Result<()> {
    let query = ResourceQuery {
        page: Some(page),
        limit: Some(limit.unwrap_or(cfg.page_size)),
        category,
    };
    let result = api_client(cfg)?.list_resources(&query).await?;

    if result.is_empty() {
        println!("No resources found.");
        return Ok(());
    }

    print_table(&result.docs);
    if result.needs_pagination() {
        println!("\nPage {} of {}", result.page, result.total_pages);
    }
    println!("Total: {} resources", result.total_docs);
    Ok(())
}

/// Print featured resources
async fn list_featured(cfg: &ResolvedConfig) -> Result<()> {
    let resources = api_client(cfg)?.featured().await?;

    if resources.is_empty() {
        println!("No featured resources.");
        return Ok(());
    }

    print_table(&resources);
    Ok(())
}

fn print_table(resources: &[Resource]) {
    println!("{:<26} {:<9} {:<50}", "ID", "CATEGORY", "TITLE");
    println!("{}", "-".repeat(86));

    for resource in resources {
        let title: String = if resource.title.chars().count() > 47 {
            format!("{}...", resource.title.chars().take(47).collect::<String>())
        } else {
            resource.title.clone()
        };
        println!("{:<26} {:<9} {:<50}", resource.id, resource.category, title);
    }
}

/// Print one resource in full
async fn show_resource(cfg: &ResolvedConfig, id: &str) -> Result<()> {
    let resource = api_client(cfg)?
        .get_resource(id)
        .await
        .with_context(|| format!("Failed to load resource {}", id))?;

    println!("ID:          {}", resource.id);
    println!("Title:       {}", resource.title);
    println!("Category:    {}", resource.category.title());
    println!("Link:        {}", resource.external_link);
    println!("Image:       {}", resource.image_url);
    println!("Featured:    {}", if resource.featured { "yes" } else { "no" });
    if let Some(author) = resource.author_name() {
        println!("Author:      {}", author);
    }
    if let Some(created) = resource.created_at {
        println!("Created:     {}", created);
    }
    if let Some(views) = resource.view_count {
        println!("Views:       {}", views);
    }
    println!();
    println!("{}", resource.description);

    Ok(())
}

/// Resolve a link and print what a draft would be filled with
async fn resolve_link(cfg: &ResolvedConfig, url: &str) -> Result<()> {
    let fetcher =
        HttpMetadataFetcher::from_config(cfg).context("Failed to create metadata clients")?;
    let resolver = LinkResolver::new(fetcher, cfg.request_timeout);

    match resolver.resolve(url).await {
        Ok(Some(metadata)) => {
            println!("Title:       {}", metadata.title.as_deref().unwrap_or("-"));
            println!("Description: {}", metadata.description.as_deref().unwrap_or("-"));
            println!("Image:       {}", metadata.image_url.as_deref().unwrap_or("-"));
        }
        Ok(None) => {
            println!("No details available for this link. Fill in the fields manually.");
        }
        Err(e) => {
            eprintln!("{}", MANUAL_ENTRY_MESSAGE);
            eprintln!("  ({})", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Run the Open Graph proxy
async fn serve(cfg: &ResolvedConfig, address: Option<String>) -> Result<()> {
    let address = address.unwrap_or_else(|| cfg.bind_address.clone());
    let state = ProxyState::new(cfg.request_timeout)?;
    server::serve(&address, state).await
}

/// Log in and save the session
async fn login(cfg: &ResolvedConfig, email: &str, password: &str) -> Result<()> {
    let api = api_client(cfg)?;
    let tokens = api.login(email, password).await.context("Login failed")?;

    let mut admin = AdminClient::new(api, Session::new(tokens.token, tokens.refresh_token, email));
    let user = admin.verify_admin().await?;

    let session = admin
        .into_session()
        .context("Session was rejected right after login")?;
    let store = session_store()?;
    store.save(&session).await?;

    info!(email, "Logged in");
    println!(
        "Logged in as {}",
        user.name.as_deref().unwrap_or(email)
    );
    Ok(())
}

/// Remove the saved session
async fn logout() -> Result<()> {
    let store = session_store()?;
    if store.clear().await? {
        info!("Logged out");
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

/// Admin client from the saved session
async fn admin_client(cfg: &ResolvedConfig) -> Result<(AdminClient, SessionStore)> {
    let store = session_store()?;
    let session = store
        .load()
        .await?
        .context("Not logged in. Run 'dunamis login' first.")?;

    Ok((AdminClient::new(api_client(cfg)?, session), store))
}

/// Persist whatever happened to the session during a command.
///
/// A refreshed token is saved; a session the backend rejected is removed.
async fn sync_session<T>(
    admin: &AdminClient,
    store: &SessionStore,
    result: Result<T, ApiError>,
) -> Result<T> {
    match admin.session() {
        Some(session) => store.save(session).await?,
        None => {
            store.clear().await?;
        }
    }

    if let Err(ApiError::Forbidden) = &result {
        store.clear().await?;
    }

    Ok(result?)
}

async fn whoami(cfg: &ResolvedConfig) -> Result<()> {
    let (mut admin, store) = admin_client(cfg).await?;
    let result = admin.me().await;
    let user = sync_session(&admin, &store, result).await?;

    println!("Name:  {}", user.name.as_deref().unwrap_or("-"));
    println!("Email: {}", user.email.as_deref().unwrap_or("-"));
    println!("Role:  {}", user.role);
    Ok(())
}

/// Look up link details for a draft and report what happened
async fn prefill_draft(cfg: &ResolvedConfig, draft: &mut ResourceDraft) -> Result<()> {
    let prefill = link_prefill(cfg)?;

    match prefill.prefill(draft).await {
        PrefillOutcome::Applied(_) => eprintln!("Filled in details from {}", draft.external_link),
        PrefillOutcome::NoMetadata => {}
        PrefillOutcome::Failed { message } => eprintln!("{}", message),
        PrefillOutcome::Stale => {}
    }
    Ok(())
}

async fn create_resource(
    cfg: &ResolvedConfig,
    link: String,
    category: Category,
    fields: DraftFields,
) -> Result<()> {
    let mut draft = ResourceDraft::new(category).with_link(link);
    if !fields.no_prefill {
        prefill_draft(cfg, &mut draft).await?;
    }
    fields.apply(&mut draft);
    draft.validate()?;

    let (mut admin, store) = admin_client(cfg).await?;
    let result = match admin.verify_admin().await {
        Ok(_) => admin.create_resource(&draft).await,
        Err(e) => Err(e),
    };
    let created = sync_session(&admin, &store, result).await?;

    info!(id = %created.id, "Created resource");
    println!("Created {} ({})", created.title, created.id);
    Ok(())
}

async fn update_resource(
    cfg: &ResolvedConfig,
    id: &str,
    link: Option<String>,
    category: Option<Category>,
    fields: DraftFields,
) -> Result<()> {
    let existing = api_client(cfg)?
        .get_resource(id)
        .await
        .with_context(|| format!("Failed to load resource {}", id))?;

    let mut draft = ResourceDraft::from(&existing);
    if let Some(category) = category {
        draft.category = category;
    }
    if let Some(link) = link.filter(|l| *l != existing.external_link) {
        draft.external_link = link;
        if !fields.no_prefill {
            prefill_draft(cfg, &mut draft).await?;
        }
    }
    fields.apply(&mut draft);
    draft.validate()?;

    let (mut admin, store) = admin_client(cfg).await?;
    let result = match admin.verify_admin().await {
        Ok(_) => admin.update_resource(id, &draft).await,
        Err(e) => Err(e),
    };
    let updated = sync_session(&admin, &store, result).await?;

    info!(id = %updated.id, "Updated resource");
    println!("Updated {} ({})", updated.title, updated.id);
    Ok(())
}

async fn delete_resource(cfg: &ResolvedConfig, id: &str) -> Result<()> {
    let (mut admin, store) = admin_client(cfg).await?;
    let result = match admin.verify_admin().await {
        Ok(_) => admin.delete_resource(id).await,
        Err(e) => Err(e),
    };
    sync_session(&admin, &store, result).await?;

    info!(id, "Deleted resource");
    println!("Deleted {}", id);
    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("Dunamis Configuration");
    println!("{}", "=".repeat(40));
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Endpoints:");
    println!("  API:        {}", cfg.api_url);
    println!("  Site:       {}", cfg.site_url);
    println!("  Proxy bind: {}", cfg.bind_address);
    println!();
    println!("Paths:");
    println!("  Home:    {}", cfg.home.display());
    println!("  Session: {}", paths::session_file()?.display());
    println!();
    println!("Requests:");
    println!("  Page size: {}", cfg.page_size);
    println!("  Timeout:   {}s", cfg.request_timeout.as_secs());
    println!(
        "  YouTube API key: {}",
        if cfg.youtube_api_key.is_some() { "set" } else { "(not set)" }
    );

    Ok(())
}
