use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::Sender;

use crate::{
    actor::{Act, Actor},
    error::Error,
    item::BrowseId,
    page::Page,
    report::FailureReporter,
    source::{BrowseSource, Endpoint},
    util::Sequence,
};

use super::state::{LoaderState, SharedState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderCommand {
    LoadInitial,
    LoadMore,
    Retry,
}

pub enum LoaderEvent {
    Command(LoaderCommand),
    Fetched {
        ticket: u64,
        result: Result<Page, Error>,
    },
    TimedOut {
        ticket: u64,
    },
    Shutdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FetchKind {
    Initial,
    More,
}

struct InFlight {
    ticket: u64,
    kind: FetchKind,
    /// `None` when the timeout is too long to be represented, the fetch then
    /// waits for as long as it takes.
    deadline: Option<Instant>,
}

pub struct LoaderWorker {
    endpoint: Option<Endpoint>,
    source: Arc<dyn BrowseSource>,
    reporter: Arc<dyn FailureReporter>,
    shared: Arc<SharedState>,
    sender: Sender<LoaderEvent>,
    fetch_timeout: Duration,
    tickets: Sequence<u64>,
    in_flight: Option<InFlight>,
    state: LoaderState,
}

impl LoaderWorker {
    pub fn new(
        browse_id: Option<BrowseId>,
        source: Arc<dyn BrowseSource>,
        reporter: Arc<dyn FailureReporter>,
        shared: Arc<SharedState>,
        sender: Sender<LoaderEvent>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            endpoint: browse_id.as_ref().map(Endpoint::for_id),
            source,
            reporter,
            shared,
            sender,
            fetch_timeout,
            tickets: Sequence::new(1),
            in_flight: None,
            state: LoaderState::default(),
        }
    }

    fn handle_command(&mut self, cmd: LoaderCommand) {
        match cmd {
            LoaderCommand::LoadInitial => self.load_initial(),
            LoaderCommand::LoadMore => self.load_more(),
            LoaderCommand::Retry => {
                if self.state.continuation.is_none() {
                    self.load_initial();
                } else {
                    self.load_more();
                }
            }
        }
    }

    fn load_initial(&mut self) {
        if self.state.is_loading {
            log::debug!("initial load requested while loading, ignoring");
            return;
        }
        let Some(endpoint) = self.endpoint.clone() else {
            log::debug!("no browse id, nothing to load");
            return;
        };
        self.dispatch(FetchKind::Initial, move |source| {
            endpoint.fetch_initial(source)
        });
    }

    fn load_more(&mut self) {
        if self.state.is_loading {
            log::debug!("more requested while loading, ignoring");
            return;
        }
        let (Some(endpoint), Some(token)) = (self.endpoint.clone(), self.state.continuation.clone())
        else {
            log::debug!("more requested without continuation, ignoring");
            return;
        };
        self.dispatch(FetchKind::More, move |source| {
            endpoint.fetch_more(source, &token)
        });
    }

    /// Marks the loader busy, publishes that, and runs `fetch` on a
    /// background thread that reports back with a fresh ticket.
    fn dispatch<F>(&mut self, kind: FetchKind, fetch: F)
    where
        F: FnOnce(&dyn BrowseSource) -> Result<Page, Error> + Send + 'static,
    {
        let ticket = self.tickets.advance();
        self.set_state(self.state.loading());
        self.in_flight = Some(InFlight {
            ticket,
            kind,
            deadline: Instant::now().checked_add(self.fetch_timeout),
        });

        log::info!("fetching {:?} page, ticket {}", kind, ticket);
        let spawned = thread::Builder::new()
            .name(format!("browse_fetch_{ticket}"))
            .spawn({
                let source = self.source.clone();
                let sender = self.sender.clone();
                move || {
                    let result = fetch(source.as_ref());
                    if sender.send(LoaderEvent::Fetched { ticket, result }).is_err() {
                        log::debug!("loader gone, dropping result of ticket {}", ticket);
                    }
                }
            });
        if let Err(err) = spawned {
            self.in_flight = None;
            self.fail(Error::ActorError(format!("failed to spawn fetch thread: {err}")));
        }
    }

    fn handle_fetched(&mut self, ticket: u64, result: Result<Page, Error>) {
        let kind = match &self.in_flight {
            Some(in_flight) if in_flight.ticket == ticket => in_flight.kind,
            _ => {
                log::info!("stale result for ticket {} received, ignoring", ticket);
                return;
            }
        };
        self.in_flight = None;
        match result {
            Ok(page) => {
                log::info!("received page with {} items", page.item_count());
                let (title, items, continuation) = page.into_parts();
                let state = match kind {
                    FetchKind::Initial => LoaderState::replaced(title, items, continuation),
                    FetchKind::More => self.state.appended(items, continuation),
                };
                self.set_state(state);
            }
            Err(err) => self.fail(err),
        }
    }

    fn handle_timed_out(&mut self, ticket: u64) {
        match &self.in_flight {
            Some(in_flight) if in_flight.ticket == ticket => {
                log::warn!("fetch for ticket {} timed out, abandoning", ticket);
                self.in_flight = None;
                self.fail(Error::Timeout(self.fetch_timeout));
            }
            _ => {}
        }
    }

    fn fail(&mut self, err: Error) {
        self.reporter.report(&err);
        self.set_state(self.state.idle());
    }

    fn set_state(&mut self, state: LoaderState) {
        self.state = state;
        self.shared.publish(self.state.clone());
    }

    fn next_act(&self) -> Act<Self> {
        match &self.in_flight {
            Some(InFlight {
                ticket,
                deadline: Some(deadline),
                ..
            }) => Act::WaitUntil {
                deadline: *deadline,
                timeout_msg: LoaderEvent::TimedOut { ticket: *ticket },
            },
            _ => Act::Continue,
        }
    }
}

impl Actor for LoaderWorker {
    type Message = LoaderEvent;
    type Error = Error;

    fn handle(&mut self, msg: Self::Message) -> Result<Act<Self>, Self::Error> {
        match msg {
            LoaderEvent::Command(cmd) => self.handle_command(cmd),
            LoaderEvent::Fetched { ticket, result } => self.handle_fetched(ticket, result),
            LoaderEvent::TimedOut { ticket } => self.handle_timed_out(ticket),
            LoaderEvent::Shutdown => {
                if let Some(in_flight) = self.in_flight.take() {
                    log::debug!("cancelling fetch for ticket {}", in_flight.ticket);
                }
                return Ok(Act::Shutdown);
            }
        }
        Ok(self.next_act())
    }
}
