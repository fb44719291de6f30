use clap::Parser;
use dayglow::cli::commands::Cli;
use dayglow::cli::handlers::{self, Context};

fn main() {
    let cli = Cli::parse();

    let ctx = match Context::load(cli.config.as_deref(), cli.data_dir.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    ctx.init_logging();

    let result = match cli.command {
        // No subcommand → launch TUI
        None => dayglow::tui::run(&ctx),
        Some(command) => handlers::dispatch(command, &ctx, cli.json),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        log::logger().flush();
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
    // The logger handle lives in a static and is never dropped
    log::logger().flush();
}
