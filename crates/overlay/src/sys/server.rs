use crate::events::AppEvent;
use async_channel::Sender;
use nui::{Event, Frame, HostLink, PeerRole};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;

pub async fn run_server(tx: Sender<AppEvent>, link: HostLink, socket: PathBuf) {
    // Cleanup old socket if it exists
    if fs_err::metadata(&socket).is_ok() {
        let _ = fs_err::remove_file(&socket);
    }

    let listener = match UnixListener::bind(&socket) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", socket.display(), e);
            return;
        }
    };
    log::info!("listening on {}", socket.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                tokio::spawn(handle_connection(stream, tx.clone(), link.clone()));
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Serves one peer until it hangs up. A peer that says hello as host becomes
/// the active host link for as long as it stays connected.
pub async fn handle_connection(stream: UnixStream, tx: Sender<AppEvent>, link: HostLink) {
    let (read, write) = stream.into_split();
    let mut write = Some(write);
    let mut lines = BufReader::new(read).lines();
    let mut epoch = None;

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let frame = match Frame::parse(&line) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("{e}");
                continue;
            }
        };

        let event = match frame {
            Frame::Hello {
                role: PeerRole::Host,
            } => {
                let Some(write) = write.take() else {
                    log::debug!("repeated host hello ignored");
                    continue;
                };
                let (attached, outbound) = link.attach();
                epoch = Some(attached);
                tokio::spawn(write_frames(write, outbound));
                AppEvent::HostAttached
            }
            Frame::Hello {
                role: PeerRole::Control,
            } => continue,
            Frame::Push { action, data } => match Event::decode(action, data) {
                Ok(event) => AppEvent::Push(event),
                Err(e) => {
                    log::warn!("{e}");
                    continue;
                }
            },
            Frame::Reply(reply) => {
                link.resolve(reply);
                continue;
            }
            Frame::Input { input } => AppEvent::Input(input),
            Frame::Call { name, .. } => {
                log::warn!("peers cannot call the overlay, '{name}' ignored");
                continue;
            }
        };

        if tx.send(event).await.is_err() {
            break;
        }
    }

    if let Some(epoch) = epoch
        && link.detach(epoch)
    {
        let _ = tx.send(AppEvent::HostDetached).await;
    }
}

async fn write_frames(mut write: OwnedWriteHalf, mut outbound: mpsc::UnboundedReceiver<Frame>) {
    while let Some(frame) = outbound.recv().await {
        let line = match frame.encode() {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to encode frame: {}", e);
                continue;
            }
        };
        if let Err(e) = write.write_all(format!("{line}\n").as_bytes()).await {
            log::warn!("host connection lost: {}", e);
            break;
        }
    }
}
