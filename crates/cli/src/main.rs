use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    reko_cli::run().await
}
