use sales_dashboard::{AppState, dataset, router};
use std::{env, net::SocketAddr, process};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = dataset::resolve_dataset_path();
    let table = match dataset::load_dataset(&data_path) {
        Ok(table) => table,
        Err(err) => {
            // No partial UI: a missing or unreadable dataset halts startup.
            error!("cannot start dashboard: {err}");
            process::exit(1);
        }
    };

    let state = AppState::new(table);
    let app = router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
