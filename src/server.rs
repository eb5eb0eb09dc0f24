use std::io;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use actix_files::Files;
use actix_web::{App, HttpServer};
use log::{error, info};

/// Ports tried in order; the grid page hardcodes none of them, so any free
/// one will do.
pub const PORT_RANGE: Range<u16> = 8000..8010;

/// Index file of the served directory: the 3x3 grid viewer.
pub const VIEWER_PAGE: &str = "display_grid.html";

/// Background static-file server for the grid viewer.
///
/// One instance serves one directory and starts at most once: `start` on a
/// running server returns the port it already bound instead of spawning a
/// second listener.
pub struct ViewerServer {
    root: PathBuf,
    port: Mutex<Option<u16>>,
}

impl ViewerServer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ViewerServer {
            root: root.into(),
            port: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.port.lock().unwrap().is_some()
    }

    /// Binds the first free port in `PORT_RANGE` and serves the root
    /// directory from a dedicated thread for the rest of the process
    /// lifetime. Returns the bound port.
    pub fn start(&self) -> io::Result<u16> {
        let mut guard = self.port.lock().unwrap();
        if let Some(port) = *guard {
            return Ok(port);
        }

        let root = self.root.clone();
        let (tx, rx) = mpsc::channel::<io::Result<u16>>();

        thread::spawn(move || {
            let system = actix_web::rt::System::new();
            system.block_on(async move {
                let mut bound = None;
                for port in PORT_RANGE {
                    let dir = root.clone();
                    let attempt = HttpServer::new(move || {
                        App::new().service(Files::new("/", dir.clone()).index_file(VIEWER_PAGE))
                    })
                    .workers(1)
                    .bind(("127.0.0.1", port));

                    match attempt {
                        Ok(server) => {
                            bound = Some((server.run(), port));
                            break;
                        }
                        Err(_) => continue,
                    }
                }

                match bound {
                    Some((server, port)) => {
                        let _ = tx.send(Ok(port));
                        info!("Viewer server running at http://localhost:{}", port);
                        if let Err(e) = server.await {
                            error!("Viewer server stopped: {}", e);
                        }
                    }
                    None => {
                        let _ = tx.send(Err(io::Error::new(
                            io::ErrorKind::AddrInUse,
                            "no free port between 8000 and 8009",
                        )));
                    }
                }
            });
        });

        let port = rx.recv().map_err(|_| {
            io::Error::new(io::ErrorKind::Other, "server thread exited before binding")
        })??;

        *guard = Some(port);
        Ok(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn starts_once_and_reports_running() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(VIEWER_PAGE), "<html>grid</html>").unwrap();

        let server = ViewerServer::new(dir.path());
        assert!(!server.is_running());

        let port = server.start().unwrap();
        assert!(PORT_RANGE.contains(&port));
        assert!(server.is_running());

        // Second start does not bind again.
        assert_eq!(server.start().unwrap(), port);
    }
}
