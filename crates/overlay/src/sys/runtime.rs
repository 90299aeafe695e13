use crate::events::AppEvent;
use crate::{config, sys::server};
use async_channel::Sender;
use nui::HostLink;
use std::path::PathBuf;
use std::thread;

/// Runs the socket server and the config watcher on their own thread and
/// runtime, away from the UI loop.
pub fn start_background_services(
    tx: Sender<AppEvent>,
    link: HostLink,
    socket: PathBuf,
) -> std::io::Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("overlay-io")
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("overlay-services".into())
        .spawn(move || {
            rt.block_on(async move {
                let (served, watched) = tokio::join!(
                    tokio::spawn(server::run_server(tx.clone(), link, socket)),
                    tokio::spawn(config::run_async_watcher(tx)),
                );
                let results = [("socket server", served), ("config watcher", watched)];
                for (service, result) in results {
                    if let Err(e) = result {
                        log::error!("{service} task failed: {e}");
                    }
                }
                log::info!("background services stopped");
            });
        })?;
    Ok(())
}
