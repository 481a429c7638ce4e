mod command;
mod config;
mod error;
mod handlers;
mod service;

#[tokio::main]
async fn main() {
    if let Err(err) = command::run().await {
        tracing::error!(target: "ledger-service", error = %err, "fatal error, exiting");
        std::process::exit(1);
    }
}
