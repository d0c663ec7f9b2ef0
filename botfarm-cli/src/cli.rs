use botfarm_api::bots;
use botfarm_api::client::ApiClient;
use botfarm_api::client::bots::{UploadBot, ProcessBot, StartBot, StopBot};
use clap::{Parser, Subcommand, Args};

use crate::error::{self, Context};
use crate::state::AppState;

mod pack;

/// a cli for deploying bots to a botfarm server.
///
/// packages a bot directory into an uploadable archive and drives the
/// upload, process, start, and stop lifecycle against the server.
#[derive(Debug, Parser)]
struct Cli {
    /// address of the botfarm server
    #[arg(long, global = true, default_value = AppState::DEFAULT_SERVER)]
    server: String,

    /// deploy token authenticating requests to the server
    #[arg(long, global = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: BaseCmds,
}

pub fn start() -> error::Result {
    let args = Cli::parse();
    let state = AppState::new(args.server, args.key);

    handle(&state, args.command)
}

#[derive(Debug, Subcommand)]
enum BaseCmds {
    /// packages a bot directory into a deployable archive
    Pack(pack::PackArgs),

    /// uploads a packaged bot to the botfarm
    Upload(BotArgs),

    /// removes the local package of a bot
    Clean(BotArgs),

    /// packs, uploads, and registers a bot in one go
    Prepare(pack::PackArgs),

    /// has the botfarm unpack an uploaded bot package
    Process(BotArgs),

    /// starts a processed bot on the botfarm
    Start(BotArgs),

    /// stops a running bot on the botfarm
    Stop(BotArgs),
}

#[derive(Debug, Args)]
struct BotArgs {
    /// name of the bot
    name: String,
}

fn handle(state: &AppState, command: BaseCmds) -> error::Result {
    match command {
        BaseCmds::Pack(given) => pack::pack(state, given).map(|_| ()),
        BaseCmds::Upload(given) => upload(state, &state.client()?, &given.name),
        BaseCmds::Clean(given) => pack::clean(state, &given.name),
        BaseCmds::Prepare(given) => prepare(state, &state.client()?, given),
        BaseCmds::Process(given) => process(&state.client()?, &given.name),
        BaseCmds::Start(given) => start_bot(&state.client()?, &given.name),
        BaseCmds::Stop(given) => stop_bot(&state.client()?, &given.name),
    }
}

pub(crate) fn check_name(name: &str) -> error::Result {
    if !bots::name_valid(name) {
        return Err(error::Error::new().context(format!(
            "the bot name {:?} is not valid",
            name
        )));
    }

    Ok(())
}

fn upload(state: &AppState, client: &ApiClient, name: &str) -> error::Result {
    check_name(name)?;

    let archive = state.archive_path(name);
    let found = archive.try_exists()
        .context("failed to check for the bot package")?;

    if !found {
        return Err(error::Error::new().context(format!(
            "no bot package found at {}. run pack first",
            archive.display()
        )));
    }

    UploadBot::archive(archive)
        .send(client)
        .context("failed to upload the bot package")?;

    println!("uploaded the bot package to the botfarm");

    Ok(())
}

fn process(client: &ApiClient, name: &str) -> error::Result {
    check_name(name)?;

    ProcessBot::name(name)
        .send(client)
        .context("failed to process the bot")?;

    println!("the bot has been processed by the botfarm");

    Ok(())
}

fn start_bot(client: &ApiClient, name: &str) -> error::Result {
    check_name(name)?;

    StartBot::name(name)
        .send(client)
        .context("failed to start the bot")?;

    println!("the bot has been started by the botfarm");

    Ok(())
}

fn stop_bot(client: &ApiClient, name: &str) -> error::Result {
    check_name(name)?;

    StopBot::name(name)
        .send(client)
        .context("failed to stop the bot")?;

    println!("the bot has been stopped by the botfarm");

    Ok(())
}

fn prepare(state: &AppState, client: &ApiClient, args: pack::PackArgs) -> error::Result {
    let name = args.name.clone();

    pack::pack(state, args)?;
    upload(state, client, &name)?;
    pack::clean(state, &name)?;
    process(client, &name)
}
