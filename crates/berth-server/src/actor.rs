use std::time::Duration;

use log::{error, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinSet};

const ACTOR_CHANNEL_SIZE: usize = 8;

pub trait Actor: Sized + Send + 'static {
    type Message: Send + 'static;
    type Options: Send;

    fn name() -> &'static str;
    fn new(options: Self::Options) -> Self;
    fn start(&mut self, _ctx: &mut ActorContext<Self>) {}
    /// Process one message and return the next action.
    /// All messages are processed sequentially in a single task, so this
    /// method must not block. If the actor needs to perform async
    /// operations, it should spawn tasks via [`ActorContext::spawn`] and
    /// send the outcome back to itself as a message.
    fn receive(&mut self, ctx: &mut ActorContext<Self>, message: Self::Message) -> ActorAction;
    fn stop(self) {}
}

pub enum ActorAction {
    Continue,
    Stop,
}

/// A collection of actors whose event loops are tracked together.
/// Dropping the system aborts all actors spawned from it.
pub struct ActorSystem {
    tasks: JoinSet<()>,
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorSystem {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    pub fn spawn<T: Actor>(&mut self, options: T::Options) -> ActorHandle<T> {
        let (tx, rx) = mpsc::channel(ACTOR_CHANNEL_SIZE);
        let (stopped_tx, stopped_rx) = watch::channel::<bool>(false);
        let handle = ActorHandle {
            sender: tx,
            stopped: stopped_rx,
        };
        let runner = ActorRunner {
            actor: T::new(options),
            ctx: ActorContext::new(&handle),
            receiver: rx,
            stopped: stopped_tx,
        };
        self.tasks.spawn(runner.run());
        handle
    }

    /// Wait for all actors in the system to stop.
    pub async fn join(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                error!("failed to join actor event loop task: {e}");
            }
        }
    }
}

pub struct ActorContext<T: Actor> {
    handle: ActorHandle<T>,
    /// A set of tasks spawned by the actor when processing messages.
    /// All these tasks will be aborted when the context is dropped.
    tasks: JoinSet<()>,
}

impl<T: Actor> ActorContext<T> {
    pub fn new(handle: &ActorHandle<T>) -> Self {
        Self {
            handle: handle.clone(),
            tasks: JoinSet::new(),
        }
    }

    pub fn handle(&self) -> &ActorHandle<T> {
        &self.handle
    }

    /// Send a message to the actor itself.
    /// The message is delivered via a spawned task, so the relative order
    /// of messages sent this way is not guaranteed.
    pub fn send(&mut self, message: T::Message) -> AbortHandle {
        let handle = self.handle.clone();
        self.tasks.spawn(async move {
            if handle.send(message).await.is_err() {
                warn!("failed to send message to {}", T::name());
            }
        })
    }

    /// Send a message to the actor itself after a delay.
    /// This is the primitive for scheduling timers such as deadline probes.
    pub fn send_with_delay(&mut self, message: T::Message, delay: Duration) -> AbortHandle {
        let handle = self.handle.clone();
        self.tasks.spawn(async move {
            tokio::time::sleep(delay).await;
            if handle.send(message).await.is_err() {
                warn!("failed to send delayed message to {}", T::name());
            }
        })
    }

    /// Spawn a task and save the handle in the context.
    /// When the actor expects to handle task outcomes, the task should
    /// send a message to the actor via the cloned handle.
    pub fn spawn(
        &mut self,
        task: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> AbortHandle {
        self.tasks.spawn(task)
    }

    /// Join tasks that have completed and log errors.
    fn reap(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    error!("task spawned by {} failed: {e}", T::name());
                }
            }
        }
    }
}

pub struct ActorHandle<T: Actor> {
    sender: mpsc::Sender<T::Message>,
    stopped: watch::Receiver<bool>,
}

impl<T: Actor> Clone for ActorHandle<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            stopped: self.stopped.clone(),
        }
    }
}

impl<T: Actor> ActorHandle<T> {
    pub async fn send(
        &self,
        message: T::Message,
    ) -> Result<(), mpsc::error::SendError<T::Message>> {
        self.sender.send(message).await
    }

    pub async fn wait_for_stop(mut self) {
        // We ignore the receiver error since the sender must have been dropped
        // in this case, which means the actor has stopped.
        let _ = self.stopped.wait_for(|x| *x).await;
    }
}

struct ActorRunner<T: Actor> {
    actor: T,
    ctx: ActorContext<T>,
    receiver: mpsc::Receiver<T::Message>,
    stopped: watch::Sender<bool>,
}

impl<T: Actor> ActorRunner<T> {
    async fn run(mut self) {
        self.actor.start(&mut self.ctx);
        while let Some(message) = self.receiver.recv().await {
            let action = self.actor.receive(&mut self.ctx, message);
            match action {
                ActorAction::Continue => {}
                ActorAction::Stop => {
                    break;
                }
            }
            self.ctx.reap();
        }
        self.actor.stop();
        let _ = self.stopped.send(true);
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::*;

    struct TestActor;

    enum TestMessage {
        Echo {
            value: String,
            reply: oneshot::Sender<String>,
        },
        Stop,
    }

    impl Actor for TestActor {
        type Message = TestMessage;
        type Options = ();

        fn name() -> &'static str {
            "TestActor"
        }

        fn new(_options: Self::Options) -> Self {
            Self
        }

        fn receive(
            &mut self,
            _: &mut ActorContext<Self>,
            message: Self::Message,
        ) -> ActorAction {
            match message {
                TestMessage::Echo { value, reply } => {
                    let _ = reply.send(value.to_uppercase());
                    ActorAction::Continue
                }
                TestMessage::Stop => ActorAction::Stop,
            }
        }
    }

    #[tokio::test]
    async fn test_actor_handle_send() {
        let mut system = ActorSystem::new();
        let handle = system.spawn::<TestActor>(());
        let (tx, rx) = oneshot::channel();
        let result = handle
            .send(TestMessage::Echo {
                value: "hello".to_string(),
                reply: tx,
            })
            .await;
        assert!(matches!(result, Ok(())));
        assert_eq!(rx.await, Ok("HELLO".to_string()));
    }

    #[tokio::test]
    async fn test_actor_handle_wait_for_stop() {
        let mut system = ActorSystem::new();
        let handle = system.spawn::<TestActor>(());
        let result = handle.send(TestMessage::Stop).await;
        assert!(matches!(result, Ok(())));

        handle.clone().wait_for_stop().await;
        // Multiple handles should be able to wait for the actor to stop.
        handle.wait_for_stop().await;
        system.join().await;
    }

    struct DelayActor;

    enum DelayMessage {
        Schedule {
            value: String,
            delay: Duration,
            reply: oneshot::Sender<String>,
        },
        Deliver {
            value: String,
            reply: oneshot::Sender<String>,
        },
    }

    impl Actor for DelayActor {
        type Message = DelayMessage;
        type Options = ();

        fn name() -> &'static str {
            "DelayActor"
        }

        fn new(_options: Self::Options) -> Self {
            Self
        }

        fn receive(
            &mut self,
            ctx: &mut ActorContext<Self>,
            message: Self::Message,
        ) -> ActorAction {
            match message {
                DelayMessage::Schedule {
                    value,
                    delay,
                    reply,
                } => {
                    ctx.send_with_delay(DelayMessage::Deliver { value, reply }, delay);
                    ActorAction::Continue
                }
                DelayMessage::Deliver { value, reply } => {
                    let _ = reply.send(value);
                    ActorAction::Continue
                }
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_actor_send_with_delay() {
        let mut system = ActorSystem::new();
        let handle = system.spawn::<DelayActor>(());
        let (tx, rx) = oneshot::channel();
        let result = handle
            .send(DelayMessage::Schedule {
                value: "later".to_string(),
                delay: Duration::from_secs(60),
                reply: tx,
            })
            .await;
        assert!(matches!(result, Ok(())));
        assert_eq!(rx.await, Ok("later".to_string()));
    }
}
