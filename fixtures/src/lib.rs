use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use clap::Parser;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Common CLI arguments for all fixture servers
#[derive(Parser, Debug, Clone)]
pub struct FixtureArgs {
    /// The port to listen on
    #[arg(short, long, default_value = "0")]
    pub port: u16,

    /// The host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// CSV file of `address,standard[,displayed]` rows to serve
    #[arg(short, long)]
    pub data: Option<PathBuf>,
}

/// What the fake explorer shows for one requested token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPage {
    /// Address printed on the page. Differs from the requested one when
    /// simulating a redirect to another token.
    pub displayed: String,
    pub standard: String,
}

/// Tokens known to the fake explorer, keyed by the path segment requested.
#[derive(Debug, Clone, Default)]
pub struct TokenCatalog {
    pages: HashMap<String, TokenPage>,
}

impl TokenCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, address: &str, standard: &str) -> Self {
        self.insert(address, address, standard);
        self
    }

    pub fn insert(&mut self, requested: &str, displayed: &str, standard: &str) {
        self.pages.insert(
            requested.to_string(),
            TokenPage {
                displayed: displayed.to_string(),
                standard: standard.to_string(),
            },
        );
    }

    pub fn get(&self, requested: &str) -> Option<&TokenPage> {
        self.pages.get(requested)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Parses `address,standard[,displayed]` lines. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn from_csv(contents: &str) -> anyhow::Result<Self> {
        let mut catalog = Self::new();

        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            match fields.as_slice() {
                [address, standard] => catalog.insert(address, address, standard),
                [address, standard, displayed] => catalog.insert(address, displayed, standard),
                _ => anyhow::bail!(
                    "line {}: expected `address,standard[,displayed]`, got {:?}",
                    number + 1,
                    line
                ),
            }
        }

        Ok(catalog)
    }
}

/// Renders a token page with the markup the explorer used for its token
/// detail view: the address link inside the overview column and the
/// standard label inside the card header.
pub fn render_token_page(address: &str, standard: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Token {address} | Explorer</title></head>
<body>
  <div class="card">
    <div class="card-header">
      <h2 class="card-header-title">Overview <span class="text-secondary small">{standard}</span></h2>
    </div>
    <div class="row">
      <div class="col-md-4">Contract:</div>
      <div class="col-md-6">
        <a class="text-truncate d-block mr-2" href="/address/{address}">{address}</a>
      </div>
    </div>
  </div>
</body>
</html>"#
    )
}

pub fn render_not_found_page(token: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Explorer</title></head>
<body><div class="container"><h1>Sorry, we are unable to locate this TokenName</h1><p>{token}</p></div></body>
</html>"#
    )
}

/// Router serving `GET /token/:token` from the catalog.
pub fn explorer_router(catalog: TokenCatalog) -> Router {
    Router::new()
        .route("/token/:token", get(token_page))
        .with_state(Arc::new(catalog))
}

async fn token_page(
    State(catalog): State<Arc<TokenCatalog>>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    match catalog.get(&token) {
        Some(page) => {
            info!("EXPLORER: Serving token page for {}", token);
            (
                StatusCode::OK,
                Html(render_token_page(&page.displayed, &page.standard)),
            )
        }
        None => {
            info!("EXPLORER: Unknown token {}", token);
            (StatusCode::NOT_FOUND, Html(render_not_found_page(&token)))
        }
    }
}

/// Serves `app` on an ephemeral local port in the background and returns
/// its address. Meant for tests.
pub async fn spawn_server(app: Router) -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!("Fixture server on {} stopped: {}", addr, err);
        }
    });

    Ok(addr)
}

/// Common function to run a fixture server
pub async fn run_server(args: FixtureArgs, app: Router) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let addr = format!("{}:{}", args.host, args.port).parse::<SocketAddr>()?;

    let app = app.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Fixture server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
