//! Background command queue
//!
//! A single worker task owns the send loop for one [`Projector`]. Callers
//! enqueue catalog commands and await the result on a oneshot channel.
//! Identical commands still waiting in the queue are coalesced by rejecting
//! the newcomer, so a user hammering a button does not build a backlog.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use escvp_core::{CommandId, Response};

use crate::error::{Error, Result};
use crate::projector::Projector;

/// Requests buffered before `enqueue` starts waiting
const QUEUE_CAPACITY: usize = 32;

/// Receiver for a queued command's outcome
pub type Ticket = oneshot::Receiver<Result<Response>>;

struct Request {
    id: CommandId,
    reply: oneshot::Sender<Result<Response>>,
}

/// Commands waiting in the queue, by id
type Pending = Arc<Mutex<HashMap<CommandId, usize>>>;

pub struct CommandQueue {
    sender: mpsc::Sender<Request>,
    pending: Pending,
    shutdown: Option<oneshot::Sender<()>>,
    worker: JoinHandle<()>,
}

impl CommandQueue {
    /// Start the worker task
    pub fn spawn(projector: Arc<Projector>) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let pending = Pending::default();

        let worker = tokio::spawn(run(projector, receiver, shutdown_rx, Arc::clone(&pending)));

        Self {
            sender,
            pending,
            shutdown: Some(shutdown_tx),
            worker,
        }
    }

    /// Queue a command unless the same command is already waiting
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyQueued`] if `id` is waiting in the queue
    /// - [`Error::QueueClosed`] after shutdown
    pub async fn enqueue(&self, id: CommandId) -> Result<Ticket> {
        // Wait for room before counting the command as waiting
        let permit = self.reserve().await?;

        {
            let mut pending = self.pending.lock();
            if pending.get(&id).is_some_and(|&waiting| waiting > 0) {
                trace!("{} already queued", id);
                return Err(Error::AlreadyQueued(id));
            }
            *pending.entry(id).or_insert(0) += 1;
        }

        Ok(submit(permit, id))
    }

    /// Queue a command even if the same command is already waiting
    pub async fn enqueue_allow_duplicate(&self, id: CommandId) -> Result<Ticket> {
        let permit = self.reserve().await?;
        *self.pending.lock().entry(id).or_insert(0) += 1;
        Ok(submit(permit, id))
    }

    /// Number of commands waiting to be sent
    pub fn len(&self) -> usize {
        self.pending.lock().values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn reserve(&self) -> Result<mpsc::Permit<'_, Request>> {
        self.sender.reserve().await.map_err(|_| Error::QueueClosed)
    }

    /// Stop the worker after the command in flight, if any
    ///
    /// Commands still waiting are dropped; their tickets report a closed channel.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Err(e) = (&mut self.worker).await {
            warn!("Command queue worker failed: {}", e);
        }
    }
}

fn submit(permit: mpsc::Permit<'_, Request>, id: CommandId) -> Ticket {
    let (reply, ticket) = oneshot::channel();
    permit.send(Request { id, reply });

    debug!("Command enqueued: {}", id);
    ticket
}

fn release(pending: &Pending, id: CommandId) {
    let mut pending = pending.lock();
    if let Some(waiting) = pending.get_mut(&id) {
        *waiting = waiting.saturating_sub(1);
        if *waiting == 0 {
            pending.remove(&id);
        }
    }
}

async fn run(
    projector: Arc<Projector>,
    mut receiver: mpsc::Receiver<Request>,
    mut shutdown: oneshot::Receiver<()>,
    pending: Pending,
) {
    loop {
        let request = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            request = receiver.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        release(&pending, request.id);

        let result = projector.send_id(request.id).await;
        if let Err(e) = &result {
            warn!("Queued command {} failed: {}", request.id, e);
        }

        // Caller may have stopped waiting
        let _ = request.reply.send(result);
    }

    receiver.close();
    pending.lock().clear();
    debug!("Command queue stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, Wire};
    use escvp_core::command::CATALOG;
    use escvp_types::PowerStatus;
    use std::time::Duration;
    use tokio::time::timeout;
    use pretty_assertions::assert_eq;

    async fn connected(wire: &Wire) -> Arc<Projector> {
        let projector = Projector::with_transport(wire.transport());
        projector.connect().await.unwrap();
        Arc::new(projector)
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_in_order() {
        let wire = Wire::new();
        wire.reply(Reply::Line(b"PWR=03\r:")).reply(Reply::Line(b":"));

        let queue = CommandQueue::spawn(connected(&wire).await);

        let power = queue.enqueue(CommandId::PowerQuery).await.unwrap();
        let volume = queue.enqueue(CommandId::VolumeUp).await.unwrap();

        let power = power.await.unwrap().unwrap();
        assert_eq!(power.status.and_then(|s| s.power()), Some(PowerStatus::On));
        volume.await.unwrap().unwrap();

        let frames = wire.frames();
        assert_eq!(frames[1], b"PWR?\r".to_vec());
        assert_eq!(frames[2], b"VOL INC\r".to_vec());

        queue.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_rejected_while_waiting() {
        let wire = Wire::new();
        for _ in 0..3 {
            wire.reply(Reply::Line(b":"));
        }

        let projector = connected(&wire).await;
        let queue = CommandQueue::spawn(Arc::clone(&projector));

        // Hold the connection so nothing leaves the queue
        let guard = projector.send_id(CommandId::KeyMenu);
        tokio::pin!(guard);
        tokio::select! {
            biased;
            _ = &mut guard => panic!("reply arrived too early"),
            _ = tokio::task::yield_now() => {}
        }

        let first = queue.enqueue(CommandId::KeyUp).await.unwrap();
        let err = queue.enqueue(CommandId::KeyUp).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyQueued(CommandId::KeyUp)));

        let second = queue.enqueue_allow_duplicate(CommandId::KeyUp).await.unwrap();

        guard.await.unwrap();
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
        assert!(queue.is_empty());

        // No longer waiting, so it can be queued again
        let third = queue.enqueue(CommandId::KeyUp).await.unwrap();
        assert!(matches!(third.await.unwrap(), Err(Error::Timeout { .. })));

        queue.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_delivered() {
        let wire = Wire::new();
        wire.reply(Reply::Line(b"Err\r:"));

        let queue = CommandQueue::spawn(connected(&wire).await);
        let ticket = queue.enqueue(CommandId::SourceHdmi3).await.unwrap();

        assert!(matches!(ticket.await.unwrap(), Err(Error::Device { .. })));
        queue.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_enqueue_on_full_queue_is_not_counted() {
        let wire = Wire::new();
        wire.reply(Reply::Silent);
        for _ in 0..40 {
            wire.reply(Reply::Line(b":"));
        }

        let projector =
            Projector::with_transport(wire.transport()).with_read_timeout(Duration::from_secs(60));
        projector.connect().await.unwrap();
        let queue = CommandQueue::spawn(Arc::new(projector));

        // Worker takes the first command and waits on its silent reply
        let stuck = queue.enqueue(CommandId::KeyMenu).await.unwrap();
        while !queue.is_empty() {
            tokio::task::yield_now().await;
        }

        let mut ids = CATALOG
            .iter()
            .map(|entry| entry.id)
            .filter(|id| ![CommandId::Handshake, CommandId::KeyMenu, CommandId::PowerOn].contains(id));
        let mut tickets = Vec::new();
        while queue.sender.capacity() > 0 {
            let id = ids.next().unwrap();
            tickets.push(queue.enqueue(id).await.unwrap());
        }

        let cancelled = timeout(Duration::from_millis(1), queue.enqueue(CommandId::PowerOn)).await;
        assert!(cancelled.is_err());
        assert_eq!(queue.len(), tickets.len());

        assert!(matches!(stuck.await.unwrap(), Err(Error::Timeout { .. })));
        for ticket in tickets {
            ticket.await.unwrap().unwrap();
        }
        assert!(queue.is_empty());

        let again = queue.enqueue(CommandId::PowerOn).await.unwrap();
        again.await.unwrap().unwrap();

        queue.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_waiting_commands() {
        let wire = Wire::new();
        let projector = connected(&wire).await;
        let queue = CommandQueue::spawn(Arc::clone(&projector));
        let sender = queue.sender.clone();

        queue.shutdown().await;

        let (reply, ticket) = oneshot::channel();
        assert!(sender.send(Request { id: CommandId::PowerOn, reply }).await.is_err());
        assert!(ticket.await.is_err());

        // Only the handshake went out
        assert_eq!(wire.frames().len(), 1);
    }
}
