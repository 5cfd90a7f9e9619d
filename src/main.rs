use clap::Parser;
use takehome::api::{self, Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    takehome::logging::init_logging(cli.verbose);

    let outcome = match cli.command {
        Command::Serve(args) => api::run_http_server(args.port)
            .await
            .map_err(|e| format!("Server error: {e}")),
        Command::Compute(args) => api::run_compute(args),
        Command::Regimes => {
            api::print_regimes();
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
