use clap::Parser;
use miette::Result;
use schemaform::cli::commands;
use schemaform::cli::{Cli, Commands};
use schemaform::core::Config;

fn main() -> Result<()> {
    // Terminate silently on a closed pipe (`schemaform flatten ... | head`)
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    schemaform::logging::init_tracing(global.verbose, global.quiet);

    let config = Config::load();

    match cli.command {
        Commands::Schema(cmd) => commands::schema::run(cmd, &global, &config),
        Commands::Flatten(args) => commands::flatten::run(args, &global, &config),
        Commands::Validate(args) => commands::validate::run(args, &global, &config),
        Commands::Fill(args) => commands::fill::run(args, &global, &config),
        Commands::Config(cmd) => commands::config::run(cmd, &global, &config),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
