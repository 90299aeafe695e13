use clap::Parser;
use nui::HostLink;
use overlay::config;
use overlay::gui::app::AppModel;
use overlay::sys::runtime;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "overlay", version, about, long_about = None)]
struct Args {
    /// Socket to listen on, overriding the configuration
    #[arg(short, long)]
    socket: Option<PathBuf>,

    /// Write the default configuration file and exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.write_config {
        let path = config::write_default_config()?;
        println!("{}", path.display());
        return Ok(());
    }

    let mut config = config::load_or_default();
    if let Some(socket) = &args.socket {
        config.bridge.socket = socket.clone();
    }

    let link = HostLink::new(config.bridge.timeout(), config.bridge.stub_table());
    let (tx, rx) = async_channel::bounded(64);

    runtime::start_background_services(tx.clone(), link.clone(), config.bridge.socket.clone())?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut app = AppModel::new(&config, link, tx);
    if let Some(socket) = args.socket {
        app = app.pin_socket(socket);
    }
    rt.block_on(app.run(rx));
    Ok(())
}
