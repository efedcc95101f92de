//! Background driver for the persistence scheduler
//!
//! The driver sleeps until the session's next save deadline, runs the due
//! write and re-arms. Mutations poke the session's wake handle so a new or
//! earlier deadline is picked up right away. Dropping or shutting down the
//! handle stops the task; pending timers die with it.

use crate::session::EditSession;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Session shared between the caller and the autosave task
pub type SharedSession = Arc<Mutex<EditSession>>;

pub struct AutosaveHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Stop the driver and wait for it to exit
    ///
    /// A write already in flight completes first; nothing new is scheduled.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::error!(error = %e, "autosave task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the autosave driver for `session`
pub async fn spawn_autosave(session: SharedSession) -> AutosaveHandle {
    let wake = session.lock().await.wake_handle();
    let (tx, rx) = oneshot::channel();
    let task = tokio::spawn(run(session, wake, rx));

    AutosaveHandle {
        shutdown: Some(tx),
        task,
    }
}

async fn run(session: SharedSession, wake: Arc<Notify>, mut shutdown: oneshot::Receiver<()>) {
    tracing::debug!("autosave driver started");

    loop {
        let deadline = session.lock().await.next_save_deadline();

        tokio::select! {
            _ = &mut shutdown => break,
            _ = wake.notified() => continue,
            _ = sleep_until(deadline) => {
                session.lock().await.run_due_save(Instant::now()).await;
            }
        }
    }

    tracing::debug!("autosave driver stopped");
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
