use clap::Parser;
use job_autofill::cli::commands::{cmd_attach, cmd_autofill, cmd_scan};
use job_autofill::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // Bridge script resolution: CLI > config
    let bridge = cli.bridge_script.as_deref();

    match cli.command {
        Commands::Scan { url } => {
            cmd_scan(&url, bridge, &config, cli.verbose)?;
        }
        Commands::Autofill { url, profile, mapper, attach } => {
            cmd_autofill(
                &url,
                &profile,
                mapper.as_deref(),
                attach,
                bridge,
                &config,
                cli.verbose,
            )?;
        }
        Commands::Attach { url, file, kind, mime } => {
            cmd_attach(&url, &file, &kind, &mime, bridge, &config)?;
        }
    }

    Ok(())
}
