#![warn(clippy::perf)]
#![warn(clippy::unwrap_used)]

use clap::Parser;
use tracing::info;
use tracing_unwrap::ResultExt;

use ennis_air::{
    framework::{self, Config},
    game::{self, Game, ProxySource},
    lookup::LookupProxy,
    openaq::OpenAq,
    server,
};

mod cli;
use cli::{Cli, Command};

#[allow(dead_code)]
mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

async fn play(config: &Config, direct: bool) -> anyhow::Result<()> {
    let settings = config.game.settings()?;
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    if direct {
        let proxy = LookupProxy::new(OpenAq::new(&config.openaq)?);
        game::play::run(&Game::new(proxy, settings), stdin, &mut stdout).await?;
    } else {
        // each lookup on the proxy makes two upstream calls
        let timeout = config.openaq.timeout() * 2;
        let source = ProxySource::new(&config.game.server_url, timeout)?;
        info!(endpoint = %source.endpoint(), "playing against running proxy");
        game::play::run(&Game::new(source, settings), stdin, &mut stdout).await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    framework::logging::init_tracing();

    let build = if built_info::DEBUG {
        format!("development build {}", built_info::PKG_VERSION)
    } else {
        format!("release {}", built_info::PKG_VERSION)
    };

    info!("{build}");

    let config = Config::load(cli.config.as_deref()).expect_or_log("config should load");

    match cli.command() {
        Command::Serve => server::serve(&config).await?,
        Command::Play { direct } => play(&config, *direct).await?,
    }

    Ok(())
}
