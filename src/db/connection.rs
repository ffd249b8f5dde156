use std::{
    path::PathBuf,
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Form store worker already gone at shutdown: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Form store worker panicked: {join_err:?}");
            }
        }
    }
}

/// Where the worker thread gets its connection from.
enum Location {
    File(PathBuf),
    Memory,
}

impl Location {
    fn open(&self) -> rusqlite::Result<Connection> {
        match self {
            Location::File(path) => Connection::open(path),
            Location::Memory => Connection::open_in_memory(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Location::File(path) => path.display().to_string(),
            Location::Memory => ":memory:".into(),
        }
    }
}

/// Handle to the form store.
///
/// A single SQLite connection lives on a dedicated worker thread. Every call to
/// [`Database::execute`] ships a closure to that thread and awaits its result, so
/// each closure observes and mutates the store without interleaving with any other.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }

        let inner = Self::spawn(Location::File(db_path))?;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let inner = Self::spawn(Location::Memory)?;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    fn spawn(location: Location) -> Result<DatabaseInner> {
        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let description = location.describe();

        let worker = thread::Builder::new()
            .name("uiforms-db".into())
            .spawn(move || {
                let mut conn = match location.open() {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if matches!(location, Location::File(_)) {
                    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                        error!("Failed to enable WAL mode: {err}");
                    }
                }
                // Cascading deletes of fields and share tokens depend on this.
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    let _ = ready_tx.send(Err(anyhow::Error::new(err)
                        .context("failed to enable foreign keys")));
                    return;
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("Form store opener went away before the store was ready");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Form store worker stopped");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Form store ready at {description}");

        Ok(DatabaseInner {
            sender: command_tx,
            worker: Mutex::new(Some(worker)),
        })
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("Form store caller went away before its reply");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("form store worker is not running: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("form store worker stopped before replying"))?
    }
}
