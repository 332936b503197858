use argh::FromArgs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use testdeck::{AppState, Config, Dashboard, Gateway, MemoryGateway, create_app};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(FromArgs, Debug)]
/// Testdeck: metrics, execution recording and integration sync for test cases.
struct Args {
    /// host to bind to
    #[argh(option, default = "String::from(\"127.0.0.1\")")]
    host: String,

    /// port to listen on (0 for random available port)
    #[argh(option, short = 'p', default = "0")]
    port: u16,

    /// JSON snapshot file backing the store (defaults to $TESTDECK_DATA, in-memory when unset)
    #[argh(option, short = 'd')]
    data: Option<String>,

    /// seconds a single provider sync may take
    #[argh(option, default = "30")]
    sync_timeout: u64,

    /// owner id stamped on created rows (defaults to $TESTDECK_OWNER or demo-user)
    #[argh(option)]
    owner: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "testdeck=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Args = argh::from_env();

    let mut config = Config::from_env().with_sync_timeout(Duration::from_secs(args.sync_timeout));
    if let Some(owner) = args.owner {
        config = config.with_owner(owner);
    }

    let data_path = args.data.or_else(|| std::env::var("TESTDECK_DATA").ok());
    let gateway: Arc<dyn Gateway> = match &data_path {
        Some(path) => {
            tracing::info!("Using snapshot store {}", path);
            Arc::new(MemoryGateway::open(path).await?)
        }
        None => {
            tracing::warn!("No --data given, rows are kept in memory only");
            Arc::new(MemoryGateway::new())
        }
    };

    let state = Arc::new(AppState::new(Dashboard::new(gateway, config)));
    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("http://{}", actual_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
