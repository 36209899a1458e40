use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use modstrip::api;
use modstrip::error::{ErrorResponse, Stage};
use modstrip::models::{AppConfig, RenderOptions, RenderRequest, TrimOption};
use modstrip::server;

#[derive(Parser)]
#[command(name = "modstrip")]
#[command(about = "Join remote product module images into one continuous strip")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Render a strip directly to a PNG file
    Render {
        /// Module image URLs, left to right
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// How background margins are detected
        #[arg(long, value_enum, default_value_t = TrimMode::Fixed)]
        trim: TrimMode,

        /// Background color for the "fixed" trim mode
        #[arg(long)]
        trim_color: Option<String>,

        /// Color distance tolerance for "fixed" and "corners"
        #[arg(long)]
        tolerance: Option<f32>,

        /// Alpha cutoff for the "alpha" trim mode
        #[arg(long)]
        cutoff: Option<u8>,

        /// Pixels kept around each trimmed module
        #[arg(long)]
        padding: Option<u32>,

        /// Pixels removed from edges facing a neighbour
        #[arg(long, default_value_t = 0)]
        seam_crop: u32,

        /// Common module height (default: smallest input height)
        #[arg(long)]
        height: Option<u32>,

        /// Pixels shared by neighbouring modules
        #[arg(long, default_value_t = 0)]
        overlap: u32,

        /// Pixels of background between modules
        #[arg(long, default_value_t = 0)]
        gap: u32,

        /// Background color, or "transparent"
        #[arg(short, long)]
        background: Option<String>,

        /// Draw a soft shadow under the modules
        #[arg(long)]
        shadow: bool,

        /// Draw a base strip below the modules
        #[arg(long)]
        base: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TrimMode {
    Fixed,
    Corners,
    Alpha,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Modstrip API",
        description = "Join remote product module images into one continuous strip",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(api::handle_render),
    components(schemas(
        RenderRequest,
        RenderOptions,
        TrimOption,
        ErrorResponse,
        Stage,
    )),
    tags(
        (name = "Render", description = "Strip rendering")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Render {
            urls,
            output,
            trim,
            trim_color,
            tolerance,
            cutoff,
            padding,
            seam_crop,
            height,
            overlap,
            gap,
            background,
            shadow,
            base,
        }) => {
            let trim = match trim {
                TrimMode::Fixed => TrimOption::Fixed {
                    color: trim_color.as_deref().map(str::parse).transpose()?,
                    tolerance,
                },
                TrimMode::Corners => TrimOption::Corners { tolerance },
                TrimMode::Alpha => TrimOption::Alpha { cutoff },
            };
            let options = RenderOptions {
                trim: Some(trim),
                padding,
                seam_crop,
                target_height: height,
                background: background.as_deref().map(str::parse).transpose()?,
                overlap,
                gap,
                tolerance: None,
                add_shadow: shadow,
                add_base: base,
            };
            run_render_command(RenderRequest { urls, options }, &output).await
        }
        Some(Commands::Serve) => run_server().await,
        None => {
            run_status_command();
            Ok(())
        }
    }
}

fn config_path() -> Option<PathBuf> {
    std::env::var("CONFIG_FILE").ok().map(PathBuf::from)
}

/// Render a strip directly to a PNG file (no server needed)
async fn run_render_command(request: RenderRequest, output: &Path) -> anyhow::Result<()> {
    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modstrip=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = AppConfig::load(config_path().as_deref());
    let state = server::create_app_state(config)?;

    let result = state.renderer.render(request).await?;
    std::fs::write(output, &result.png)?;

    println!(
        "Wrote {} ({}x{}, {} bytes)",
        output.display(),
        result.width,
        result.height,
        result.png.len()
    );
    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Read environment variables
    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();

    // Header
    println!("Modstrip v{VERSION}");
    println!("Joins remote product module images into one strip\n");

    // Environment variables section
    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );

    // Config source
    let config_source = match config_file {
        Some(ref path) if Path::new(path).exists() => path.to_string(),
        Some(_) => "defaults (file not found)".to_string(),
        None => "defaults".to_string(),
    };
    let config = AppConfig::load(config_path().as_deref());

    println!("\nConfiguration ({config_source}):");
    println!(
        "  Limits:   {} images, {} px max side, {} bytes per download",
        config.limits.max_images, config.limits.max_dimension, config.limits.max_download_bytes
    );
    println!(
        "  Fetch:    {}s timeout, {} retries, {} ms backoff, {} parallel",
        config.fetch.timeout_secs,
        config.fetch.retries,
        config.fetch.backoff_ms,
        config.fetch.concurrency
    );
    let background = match config.defaults.background.color() {
        Some(color) => color.to_string(),
        None => "transparent".to_string(),
    };
    println!(
        "  Defaults: tolerance {}, padding {}, background {}, optimize {}",
        config.defaults.tolerance, config.defaults.padding, background, config.defaults.optimize_png
    );

    // Commands section
    println!("\nCommands:");
    println!("  modstrip serve    Start the HTTP server");
    println!("  modstrip render   Render a strip to a PNG file");
    println!("\nRun 'modstrip --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modstrip=debug,strip_compose=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_file = config_path();
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    tracing::info!(
        config = ?config_file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "defaults".to_string()),
        "Configuration source"
    );

    let config = AppConfig::load(config_file.as_deref());

    // Create application state using shared server module
    let state = server::create_app_state(config)?;

    // Build router: start with shared API routes, add production-only routes
    let app = server::build_router(state)
        // OpenAPI documentation (production only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Modstrip server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
