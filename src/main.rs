use apkforge::cli::commands::{CliArgs, Commands};
use apkforge::cli::handlers::{
    handle_compact_install, handle_decompile, handle_install, handle_update,
};
use apkforge::util::logging::{init_logging, json_requested, resolve_level, LoggingConfig};
use apkforge::VERSION;

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig {
        level: resolve_level(args.log_level.as_deref(), args.verbose, args.quiet),
        use_json: json_requested(),
        ..Default::default()
    });

    debug!("apkforge v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Install => handle_install(&args).await,
        Commands::Update => handle_update(&args).await,
        Commands::CompactInstall => handle_compact_install(&args).await,
        Commands::Decompile(decompile_args) => handle_decompile(&args, decompile_args).await,
    };

    std::process::exit(exit_code);
}
