use std::process;

#[tokio::main]
async fn main() {
    if let Err(err) = dbprobe::cli::start().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}
