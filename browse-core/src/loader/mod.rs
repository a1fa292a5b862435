mod state;
mod worker;

use std::{sync::Arc, time::Duration};

use crossbeam_channel::Receiver;

use crate::{
    actor::{Actor, ActorHandle},
    error::Error,
    item::BrowseId,
    report::FailureReporter,
    source::BrowseSource,
};

pub use self::{
    state::{LoaderState, Phase},
    worker::LoaderCommand,
};

use self::{
    state::SharedState,
    worker::{LoaderEvent, LoaderWorker},
};

#[derive(Clone, Debug)]
pub struct LoaderConfig {
    /// How long a single fetch may take before it is abandoned and reported.
    pub fetch_timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// Pages through one browse listing for the lifetime of a presentation
/// session.
///
/// All operations return right away, the snapshot is updated in the
/// background once the fetch resolves.  Dropping the loader cancels whatever
/// is in flight.
pub struct BrowseLoader {
    browse_id: Option<BrowseId>,
    shared: Arc<SharedState>,
    actor: ActorHandle<LoaderEvent>,
}

impl BrowseLoader {
    pub fn new(
        browse_id: Option<BrowseId>,
        source: Arc<dyn BrowseSource>,
        reporter: Arc<dyn FailureReporter>,
        config: LoaderConfig,
    ) -> Result<Self, Error> {
        let shared = Arc::new(SharedState::new());
        let actor = LoaderWorker::spawn("browse_loader", {
            let browse_id = browse_id.clone();
            let shared = shared.clone();
            move |sender| {
                LoaderWorker::new(
                    browse_id,
                    source,
                    reporter,
                    shared,
                    sender,
                    config.fetch_timeout,
                )
            }
        })?;
        Ok(Self {
            browse_id,
            shared,
            actor,
        })
    }

    pub fn browse_id(&self) -> Option<&BrowseId> {
        self.browse_id.as_ref()
    }

    /// Latest published snapshot.
    pub fn state(&self) -> Arc<LoaderState> {
        self.shared.get()
    }

    /// Stream of snapshots, starting with the current one.
    pub fn subscribe(&self) -> Receiver<Arc<LoaderState>> {
        self.shared.subscribe()
    }

    /// Loads the first page, replacing everything loaded so far.
    pub fn load_initial(&self) {
        self.command(LoaderCommand::LoadInitial);
    }

    /// Loads the page after the current continuation and appends it.
    pub fn load_more(&self) {
        self.command(LoaderCommand::LoadMore);
    }

    /// Starts over when there is no continuation, otherwise loads more.
    pub fn retry(&self) {
        self.command(LoaderCommand::Retry);
    }

    pub fn command(&self, cmd: LoaderCommand) {
        if self.actor.send(LoaderEvent::Command(cmd)).is_err() {
            log::warn!("loader is shut down, dropping {:?}", cmd);
        }
    }

    /// Ends the session.  Late fetch results are dropped on the floor.
    pub fn close(self) {}

    fn shutdown(&mut self) {
        let _ = self.actor.send(LoaderEvent::Shutdown);
        self.actor.join();
    }
}

impl Drop for BrowseLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests;
