use clap::Parser;
use fleetgate::ServerConfig;
use fleetgate::cli::{Args, init_logging, load_signing_secret, open_database};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(access_secret) =
        load_signing_secret("ACCESS_TOKEN_SECRET", args.access_secret_file.as_deref())
    else {
        std::process::exit(1);
    };

    let Some(refresh_secret) =
        load_signing_secret("REFRESH_TOKEN_SECRET", args.refresh_secret_file.as_deref())
    else {
        std::process::exit(1);
    };

    if access_secret == refresh_secret {
        error!("Access and refresh signing secrets must differ");
        std::process::exit(1);
    }

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = listener.local_addr().unwrap();

    let config = ServerConfig {
        db,
        access_secret,
        refresh_secret,
    };

    info!(address = %local_addr, "Listening");

    if let Err(e) = fleetgate::run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
