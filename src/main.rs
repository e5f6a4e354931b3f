use clap::Parser;
use driving_app::cli::{Cli, Commands};
use driving_app::{Config, run};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command() {
        Commands::InitConfig => {
            let path = cli.config.unwrap_or_else(Config::default_config_path);
            if Config::create_default_if_missing(&path)? {
                println!("Created {}", path.display());
            } else {
                println!("{} already exists, leaving it untouched", path.display());
            }
            Ok(())
        }
        Commands::Serve { port } => {
            let mut config = Config::load_with_path(cli.config.as_deref())?;
            if let Some(port) = port {
                config.server.port = port;
            }

            let worker_threads = config.general.worker_threads;

            let mut builder = tokio::runtime::Builder::new_multi_thread();
            builder.enable_all();

            if worker_threads > 0 {
                builder.worker_threads(worker_threads);
            }

            let runtime = builder.build()?;
            runtime.block_on(run(config))
        }
    }
}
