use super::DbPool;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use log::error;
use std::any::Any;
use tokio::sync::{mpsc, oneshot};
use tickerfolio_core::errors::Result;

// A write job runs against the actor's connection and reports a core Result.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type ErasedReply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, ErasedReply)>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// The job runs inside an immediate transaction; an error rolls it back.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| StorageError::WriterUnavailable("writer actor has stopped".to_string()))?;

        let boxed = ret_rx.await.map_err(|_| {
            StorageError::WriterUnavailable("writer actor dropped the reply".to_string())
        })??;

        boxed.downcast::<T>().map(|v| *v).map_err(|_| {
            StorageError::WriterUnavailable("unexpected writer result type".to_string()).into()
        })
    }
}

/// Spawns a background Tokio task that acts as the single writer to the database.
///
/// The actor holds one pooled connection for its whole life and runs jobs
/// in the order they were sent.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, ErasedReply)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                // Dropping the receiver fails every pending and future exec.
                error!("Writer actor could not acquire a connection: {}", e);
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(|e: StorageError| e.into());

            // The requester may have gone away (cancelled save).
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
