use clap::Parser;
use komaink_app::{run, Cli};

fn main() {
    env_logger::init();
    log::info!("Starting KomaInk");

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        log::error!("{err}");
        eprintln!("komaink: {err}");
        std::process::exit(1);
    }
}
