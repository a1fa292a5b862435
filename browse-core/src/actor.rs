use std::{
    fmt::Display,
    thread::{self, JoinHandle},
    time::Instant,
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, SendError, Sender};

use crate::error::Error;

pub enum Act<T: Actor> {
    Continue,
    WaitUntil {
        deadline: Instant,
        timeout_msg: T::Message,
    },
    Shutdown,
}

pub trait Actor: Sized {
    type Message: Send + 'static;
    type Error: Display;

    fn handle(&mut self, msg: Self::Message) -> Result<Act<Self>, Self::Error>;

    fn process(mut self, recv: Receiver<Self::Message>) {
        let mut act = Act::Continue;
        loop {
            let msg = match act {
                Act::Continue => match recv.recv() {
                    Ok(msg) => msg,
                    Err(_) => {
                        break;
                    }
                },
                Act::WaitUntil {
                    deadline,
                    timeout_msg,
                } => match recv.recv_deadline(deadline) {
                    Ok(msg) => msg,
                    Err(RecvTimeoutError::Timeout) => timeout_msg,
                    Err(RecvTimeoutError::Disconnected) => {
                        break;
                    }
                },
                Act::Shutdown => {
                    break;
                }
            };
            act = match self.handle(msg) {
                Ok(act) => act,
                Err(err) => {
                    log::error!("actor error: {}", err);
                    break;
                }
            };
        }
    }

    /// Runs the actor on a named thread.  The factory receives a sender of
    /// the actor's own mailbox, so it can hand it to the work it spawns.
    fn spawn<F>(name: &str, factory: F) -> Result<ActorHandle<Self::Message>, Error>
    where
        F: FnOnce(Sender<Self::Message>) -> Self + Send + 'static,
    {
        let (send, recv) = unbounded();
        let thread = thread::Builder::new().name(name.to_string()).spawn({
            let send = send.clone();
            move || {
                factory(send).process(recv);
            }
        })?;
        Ok(ActorHandle {
            sender: send,
            thread: Some(thread),
        })
    }
}

pub struct ActorHandle<M> {
    thread: Option<JoinHandle<()>>,
    sender: Sender<M>,
}

impl<M> ActorHandle<M> {
    pub fn send(&self, msg: M) -> Result<(), SendError<M>> {
        self.sender.send(msg)
    }

    /// Waits for the actor thread to exit.  Calling it again is a no-op.
    pub fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("actor thread panicked");
            }
        }
    }
}
