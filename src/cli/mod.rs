use std::path::PathBuf;

#[derive(clap::Parser)]
#[command(version, about = "Air quality lookups, and a game about them")]
pub struct Cli {
    /// Config file to use instead of `ENNIS_AIR_TOML` or `./ennis-air.toml`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Default, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the lookup proxy.
    #[default]
    Serve,

    /// Play the guessing game in the terminal.
    Play {
        /// Look readings up in-process instead of asking a running proxy.
        #[arg(long)]
        direct: bool,
    },
}

impl Cli {
    pub fn command(&self) -> &Command {
        static SERVE: Command = Command::Serve;
        self.command.as_ref().unwrap_or(&SERVE)
    }
}
