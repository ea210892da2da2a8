use clap::Parser;
use log::info;
use std::sync::Arc;
use std::time::Duration;

use server::api::{routes, AppContext};
use server::manager::AreaManager;
use server::persist::{MemoryPersistence, Persistence};
use server::session::SessionStore;
use server::store::AreaStore;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Per-area lock acquisition timeout in milliseconds
    #[arg(long, default_value = "5000")]
    lock_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let store = Arc::new(AreaStore::with_lock_timeout(Duration::from_millis(
        args.lock_timeout_ms,
    )));
    let persist: Arc<dyn Persistence> = Arc::new(MemoryPersistence::new());
    let context = Arc::new(AppContext {
        store: Arc::clone(&store),
        manager: AreaManager::new(Arc::clone(&store), Arc::clone(&persist)),
        sessions: SessionStore::new(),
        persist,
    });

    let app = routes().with_state(context);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
