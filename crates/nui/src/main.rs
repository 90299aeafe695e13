use clap::{Parser, Subcommand};
use nui::{Call, DEFAULT_SOCKET, Frame, PeerRole, Reply, UserInput};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "nuictl", version, about, long_about = None)]
struct Cli {
    /// Overlay socket to connect to
    #[arg(short, long, default_value = DEFAULT_SOCKET)]
    socket: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Push a host event, e.g. `push openRadialMenu '{"items":[]}'`
    Push {
        action: String,
        /// JSON payload (omitted means null)
        data: Option<String>,
    },
    /// Activate a slot on the radial menu's current page
    Click { slot: usize },
    /// Activate the radial menu's center control
    Center,
    /// Activate a context menu option by key
    Option { key: String },
    /// Press the context menu's back button
    Back,
    /// Press the context menu's close button
    Close,
    /// Act as the host: print every call and answer it
    Host {
        /// Answer `radialTransition` with false
        #[arg(long)]
        deny_transitions: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Push { action, data } => {
            let data = match data {
                Some(raw) => serde_json::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("payload is not valid JSON: {e}"))?,
                None => Value::Null,
            };
            send_frame(&cli.socket, &Frame::push(action, data))
        }
        Commands::Click { slot } => send_input(&cli.socket, UserInput::RadialSlot { slot }),
        Commands::Center => send_input(&cli.socket, UserInput::RadialCenter),
        Commands::Option { key } => send_input(&cli.socket, UserInput::ContextOption { key }),
        Commands::Back => send_input(&cli.socket, UserInput::ContextBack),
        Commands::Close => send_input(&cli.socket, UserInput::ContextClose),
        Commands::Host { deny_transitions } => run_host(&cli.socket, !deny_transitions),
    }
}

fn connect(socket: &Path) -> anyhow::Result<UnixStream> {
    UnixStream::connect(socket).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to overlay at {}: {}. Is overlay running?",
            socket.display(),
            e
        )
    })
}

fn write_frame(stream: &mut UnixStream, frame: &Frame) -> anyhow::Result<()> {
    writeln!(stream, "{}", frame.encode()?)?;
    Ok(())
}

fn send_frame(socket: &Path, frame: &Frame) -> anyhow::Result<()> {
    let mut stream = connect(socket)?;
    write_frame(&mut stream, frame)
}

fn send_input(socket: &Path, input: UserInput) -> anyhow::Result<()> {
    send_frame(socket, &Frame::Input { input })
}

fn run_host(socket: &Path, allow_transitions: bool) -> anyhow::Result<()> {
    let mut stream = connect(socket)?;
    write_frame(
        &mut stream,
        &Frame::Hello {
            role: PeerRole::Host,
        },
    )?;
    log::info!("attached to {} as host", socket.display());

    let reader = BufReader::new(stream.try_clone()?);
    for line in reader.lines() {
        let line = line?;
        match Frame::parse(&line) {
            Ok(Frame::Call { id, name, data }) => {
                println!("{name} {data}");
                let answer = match name.parse::<Call>() {
                    Ok(Call::RadialTransition) => Value::Bool(allow_transitions),
                    _ => Value::Null,
                };
                write_frame(&mut stream, &Frame::Reply(Reply::ok(id, answer)))?;
            }
            Ok(other) => log::warn!("ignoring unexpected frame {other:?}"),
            Err(e) => log::warn!("{e}"),
        }
    }
    Ok(())
}
