use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use tfidf_core::persist::open_corpus;
use tfidf_core::Corpus;
use tracing_subscriber::{fmt, EnvFilter};
use tfidf_server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Saved corpus directory, a JSON/JSONL file, or a directory of them
    #[arg(long, default_value = "./corpus")]
    corpus: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let path = Path::new(&args.corpus);
    let corpus = if path.exists() {
        open_corpus(path)?
    } else {
        tracing::warn!(corpus = %args.corpus, "no corpus found, starting empty");
        Corpus::new("corpus")
    };
    tracing::info!(num_docs = corpus.len(), "corpus loaded");

    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app: Router = build_app(corpus, admin_token);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
