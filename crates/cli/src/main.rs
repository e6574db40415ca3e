use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    retail_cli::run().await
}
