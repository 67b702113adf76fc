use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = tiksavectl::Cli::parse();
    tiksavectl::init_tracing(cli.verbose);
    if let Err(err) = tiksavectl::run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
