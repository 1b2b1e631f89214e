use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use trueline::config::{ClientConfig, ConfigError};
use trueline::error::{ApiError, AuthError, ValidationErrors};
use trueline::forms::{BlogForm, GalleryForm, QuoteRequestForm, ServiceForm, TestimonialForm};
use trueline::net::api;
use trueline::net::client::ApiClient;
use trueline::net::request::FileUpload;
use trueline::net::types::{BookingStatus, PhotoKind};
use trueline::routes::{self, GuardDecision, Route};
use trueline::state::auth::SessionStore;
use trueline::storage::FileStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not logged in; run `trueline login` first")]
    NotAuthenticated,
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "trueline", about = "Trueline site API and admin CLI")]
struct Cli {
    /// Overrides `TRUELINE_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Overrides `TRUELINE_STATE_DIR`.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in as an operator and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TRUELINE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    /// Show what the site would render for a location.
    Open { location: String },
    Bookings(BookingsCommand),
    Services(ServicesCommand),
    Gallery(GalleryCommand),
    Blog(BlogCommand),
    Testimonials(TestimonialsCommand),
}

// =============================================================================
// RESOURCE SUBCOMMANDS
// =============================================================================

#[derive(Args, Debug)]
struct BookingsCommand {
    #[command(subcommand)]
    command: BookingsSubcommand,
}

#[derive(Subcommand, Debug)]
enum BookingsSubcommand {
    List,
    /// Submit a quote request (public).
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        street: String,
        #[arg(long)]
        state: String,
        #[arg(long = "service", required = true)]
        services: Vec<String>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Status {
        id: String,
        /// One of: Pending, Approved, "In Progress", Completed, Canceled.
        status: BookingStatus,
    },
    Photos {
        id: String,
        #[arg(long, value_enum)]
        kind: PhotoSide,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PhotoSide {
    Before,
    After,
}

impl From<PhotoSide> for PhotoKind {
    fn from(side: PhotoSide) -> Self {
        match side {
            PhotoSide::Before => Self::Before,
            PhotoSide::After => Self::After,
        }
    }
}

#[derive(Args, Debug)]
struct ServicesCommand {
    #[command(subcommand)]
    command: ServicesSubcommand,
}

#[derive(Args, Debug)]
struct ServiceArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
    /// Comma-separated detail bullets.
    #[arg(long, default_value = "")]
    details: String,
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ServicesSubcommand {
    List,
    Get { id: String },
    Create(ServiceArgs),
    Update {
        id: String,
        #[command(flatten)]
        service: ServiceArgs,
    },
    Delete { id: String },
}

#[derive(Args, Debug)]
struct GalleryCommand {
    #[command(subcommand)]
    command: GallerySubcommand,
}

#[derive(Subcommand, Debug)]
enum GallerySubcommand {
    List {
        /// Use the public listing instead of the admin one.
        #[arg(long, default_value_t = false)]
        public: bool,
    },
    Create {
        #[arg(long)]
        service_type: String,
        #[arg(long)]
        description: String,
        #[arg(long = "before")]
        before: Vec<PathBuf>,
        #[arg(long = "after")]
        after: Vec<PathBuf>,
    },
    Delete { id: String },
}

#[derive(Args, Debug)]
struct BlogCommand {
    #[command(subcommand)]
    command: BlogSubcommand,
}

#[derive(Subcommand, Debug)]
enum BlogSubcommand {
    List,
    Get { id: String },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        image: PathBuf,
    },
    Delete { id: String },
}

#[derive(Args, Debug)]
struct TestimonialsCommand {
    #[command(subcommand)]
    command: TestimonialsSubcommand,
}

#[derive(Subcommand, Debug)]
enum TestimonialsSubcommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value_t = 5)]
        rating: u8,
        #[arg(long)]
        review: String,
    },
    Delete { id: String },
}

// =============================================================================
// CONTEXT
// =============================================================================

struct CliContext {
    store: Arc<SessionStore>,
    client: ApiClient,
}

impl CliContext {
    fn init(cli: &Cli) -> Result<Self, CliError> {
        // Flags take precedence over the environment.
        let config = ClientConfig::from_lookup(|key| match key {
            "TRUELINE_API_URL" if cli.api_url.is_some() => cli.api_url.clone(),
            "TRUELINE_STATE_DIR" if cli.state_dir.is_some() => {
                cli.state_dir.as_ref().map(|dir| dir.display().to_string())
            }
            _ => std::env::var(key).ok(),
        })?;
        tracing::debug!(api_url = %config.api_url, state_dir = %config.state_dir.display(), "client config");

        let storage = Arc::new(FileStore::new(config.state_dir.clone()));
        let store = Arc::new(SessionStore::new(storage, ApiClient::new(&config)?));
        store.rehydrate();
        let client = store.authorized_client();
        Ok(Self { store, client })
    }

    /// Admin commands go through the same guard as the dashboard view.
    fn require_admin(&self) -> Result<(), CliError> {
        match routes::resolve(Route::Dashboard, &self.store.snapshot()) {
            GuardDecision::Render(_) => Ok(()),
            GuardDecision::Loading | GuardDecision::Redirect { .. } => Err(CliError::NotAuthenticated),
        }
    }

    /// Map an API result, dropping the stored session on a 401.
    fn checked<T>(&self, result: Result<T, ApiError>) -> Result<T, CliError> {
        result.map_err(|err| {
            if self.store.logout_if_unauthorized(&err) {
                tracing::warn!("stored session was rejected; logged out");
            }
            CliError::Api(err)
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).init();

    let ctx = CliContext::init(&cli)?;
    match cli.command {
        Command::Login { email, password } => {
            let session = ctx.store.login(&email, &password).await?;
            eprintln!("logged in as {} <{}>", session.name, session.email);
            Ok(())
        }
        Command::Logout => {
            ctx.store.logout();
            eprintln!("logged out");
            Ok(())
        }
        Command::Whoami => match ctx.store.session() {
            Some(session) => {
                println!("{} <{}> ({})", session.name, session.email, session.user_id);
                Ok(())
            }
            None => Err(CliError::NotAuthenticated),
        },
        Command::Open { location } => {
            run_open(&ctx, &location);
            Ok(())
        }
        Command::Bookings(cmd) => run_bookings(&ctx, cmd).await,
        Command::Services(cmd) => run_services(&ctx, cmd).await,
        Command::Gallery(cmd) => run_gallery(&ctx, cmd).await,
        Command::Blog(cmd) => run_blog(&ctx, cmd).await,
        Command::Testimonials(cmd) => run_testimonials(&ctx, cmd).await,
    }
}

fn run_open(ctx: &CliContext, location: &str) {
    let route = Route::parse(location);
    match routes::resolve(route, &ctx.store.snapshot()) {
        GuardDecision::Loading => println!("loading"),
        GuardDecision::Redirect { to, replace } => {
            let how = if replace { "replace" } else { "push" };
            println!("redirect {to} ({how})");
        }
        GuardDecision::Render(route) => println!("render {route}"),
    }
}

async fn run_bookings(ctx: &CliContext, cmd: BookingsCommand) -> Result<(), CliError> {
    match cmd.command {
        BookingsSubcommand::Create { name, phone, email, unit, street, state, services, notes } => {
            let booking = QuoteRequestForm {
                name,
                phone,
                email,
                unit_house_number: unit,
                street_name: street,
                state,
                services,
                notes,
            }
            .validate()?;
            let created = api::create_booking(&ctx.client, &booking).await?;
            print_json(&created)
        }
        BookingsSubcommand::List => {
            ctx.require_admin()?;
            let bookings = ctx.checked(api::get_bookings(&ctx.client).await)?;
            print_json(&bookings)
        }
        BookingsSubcommand::Status { id, status } => {
            ctx.require_admin()?;
            let updated = ctx.checked(api::update_booking_status(&ctx.client, &id, status).await)?;
            print_json(&updated)
        }
        BookingsSubcommand::Photos { id, kind, files } => {
            ctx.require_admin()?;
            let photos = read_uploads(&files).await?;
            let updated = ctx.checked(api::upload_booking_photos(&ctx.client, &id, kind.into(), photos).await)?;
            print_json(&updated)
        }
        BookingsSubcommand::Delete { id } => {
            ctx.require_admin()?;
            ctx.checked(api::delete_booking(&ctx.client, &id).await)?;
            eprintln!("deleted booking {id}");
            Ok(())
        }
    }
}

async fn run_services(ctx: &CliContext, cmd: ServicesCommand) -> Result<(), CliError> {
    match cmd.command {
        ServicesSubcommand::List => print_json(&api::get_services(&ctx.client).await?),
        ServicesSubcommand::Get { id } => print_json(&api::get_service(&ctx.client, &id).await?),
        ServicesSubcommand::Create(args) => {
            ctx.require_admin()?;
            let upload = service_form(args).await?.validate()?;
            print_json(&ctx.checked(api::create_service(&ctx.client, upload).await)?)
        }
        ServicesSubcommand::Update { id, service } => {
            ctx.require_admin()?;
            let upload = service_form(service).await?.validate()?;
            print_json(&ctx.checked(api::update_service(&ctx.client, &id, upload).await)?)
        }
        ServicesSubcommand::Delete { id } => {
            ctx.require_admin()?;
            ctx.checked(api::delete_service(&ctx.client, &id).await)?;
            eprintln!("deleted service {id}");
            Ok(())
        }
    }
}

async fn service_form(args: ServiceArgs) -> Result<ServiceForm, CliError> {
    let image = match &args.image {
        Some(path) => Some(read_upload(path).await?),
        None => None,
    };
    Ok(ServiceForm { name: args.name, description: args.description, details: args.details, image })
}

async fn run_gallery(ctx: &CliContext, cmd: GalleryCommand) -> Result<(), CliError> {
    match cmd.command {
        GallerySubcommand::List { public: true } => print_json(&api::get_public_gallery(&ctx.client).await?),
        GallerySubcommand::List { public: false } => {
            ctx.require_admin()?;
            print_json(&ctx.checked(api::get_gallery_items(&ctx.client).await)?)
        }
        GallerySubcommand::Create { service_type, description, before, after } => {
            ctx.require_admin()?;
            let upload = GalleryForm {
                service_type,
                description,
                before: read_uploads(&before).await?,
                after: read_uploads(&after).await?,
            }
            .validate()?;
            print_json(&ctx.checked(api::create_gallery_item(&ctx.client, upload).await)?)
        }
        GallerySubcommand::Delete { id } => {
            ctx.require_admin()?;
            ctx.checked(api::delete_gallery_item(&ctx.client, &id).await)?;
            eprintln!("deleted gallery item {id}");
            Ok(())
        }
    }
}

async fn run_blog(ctx: &CliContext, cmd: BlogCommand) -> Result<(), CliError> {
    match cmd.command {
        BlogSubcommand::List => print_json(&api::get_blog_posts(&ctx.client).await?),
        BlogSubcommand::Get { id } => print_json(&api::get_blog_post(&ctx.client, &id).await?),
        BlogSubcommand::Create { title, content, image } => {
            ctx.require_admin()?;
            let upload = BlogForm { title, content, image: Some(read_upload(&image).await?) }.validate()?;
            print_json(&ctx.checked(api::create_blog_post(&ctx.client, upload).await)?)
        }
        BlogSubcommand::Delete { id } => {
            ctx.require_admin()?;
            ctx.checked(api::delete_blog_post(&ctx.client, &id).await)?;
            eprintln!("deleted blog post {id}");
            Ok(())
        }
    }
}

async fn run_testimonials(ctx: &CliContext, cmd: TestimonialsCommand) -> Result<(), CliError> {
    match cmd.command {
        TestimonialsSubcommand::List => print_json(&api::get_testimonials(&ctx.client).await?),
        TestimonialsSubcommand::Create { name, location, rating, review } => {
            let testimonial = TestimonialForm { name, location, rating, review_text: review }.validate()?;
            print_json(&api::create_testimonial(&ctx.client, &testimonial).await?)
        }
        TestimonialsSubcommand::Delete { id } => {
            ctx.require_admin()?;
            ctx.checked(api::delete_testimonial(&ctx.client, &id).await)?;
            eprintln!("deleted testimonial {id}");
            Ok(())
        }
    }
}

async fn read_upload(path: &Path) -> Result<FileUpload, CliError> {
    FileUpload::read(path).await.map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

async fn read_uploads(paths: &[PathBuf]) -> Result<Vec<FileUpload>, CliError> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        uploads.push(read_upload(path).await?);
    }
    Ok(uploads)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
