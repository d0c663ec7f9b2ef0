mod error;
mod state;
mod cli;

fn main() {
    use tracing_subscriber::{FmtSubscriber, EnvFilter};

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .expect("failed to initialize global tracing subscriber");

    if let Err(err) = cli::start() {
        println!("{}", err);

        std::process::exit(1);
    }
}
