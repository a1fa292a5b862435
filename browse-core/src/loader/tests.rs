use std::{sync::Arc, time::Duration};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use super::*;
use crate::{
    item::{Continuation, Item},
    page::{fixtures::artist, Group, Page},
};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    BrowseById(String),
    BrowseContinuation(String),
    Charts(Option<String>),
}

/// Records every call and answers it with the next queued reply, blocking
/// until the test provides one.
struct ScriptedSource {
    calls: Sender<Call>,
    replies: Receiver<Result<Page, Error>>,
    taken: Sender<()>,
}

impl ScriptedSource {
    fn answer(&self, call: Call) -> Result<Page, Error> {
        let _ = self.calls.send(call);
        let reply = self.replies.recv().unwrap_or(Err(Error::UnexpectedResponse));
        let _ = self.taken.send(());
        reply
    }
}

impl BrowseSource for ScriptedSource {
    fn browse_by_id(&self, browse_id: &BrowseId) -> Result<Page, Error> {
        self.answer(Call::BrowseById(browse_id.to_string()))
    }

    fn browse_continuation(&self, token: &Continuation) -> Result<Page, Error> {
        self.answer(Call::BrowseContinuation(token.as_str().to_string()))
    }

    fn charts_continuation(&self, token: Option<&Continuation>) -> Result<Page, Error> {
        self.answer(Call::Charts(token.map(|t| t.as_str().to_string())))
    }
}

struct Harness {
    loader: BrowseLoader,
    calls: Receiver<Call>,
    replies: Sender<Result<Page, Error>>,
    taken: Receiver<()>,
    states: Receiver<Arc<LoaderState>>,
    failures: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    fn new(browse_id: Option<&str>) -> Self {
        Self::with_config(browse_id, LoaderConfig::default())
    }

    fn with_config(browse_id: Option<&str>, config: LoaderConfig) -> Self {
        let (calls_tx, calls) = unbounded();
        let (replies, replies_rx) = unbounded();
        let (taken_tx, taken) = unbounded();
        let failures = Arc::new(Mutex::new(Vec::new()));
        let source = ScriptedSource {
            calls: calls_tx,
            replies: replies_rx,
            taken: taken_tx,
        };
        let reporter = {
            let failures = failures.clone();
            move |err: &Error| failures.lock().push(err.to_string())
        };
        let loader = BrowseLoader::new(
            browse_id.map(BrowseId::new),
            Arc::new(source),
            Arc::new(reporter),
            config,
        )
        .unwrap();
        let states = loader.subscribe();
        assert_eq!(*states.recv().unwrap(), LoaderState::default());
        Self {
            loader,
            calls,
            replies,
            taken,
            states,
            failures,
        }
    }

    fn reply(&self, page: Page) {
        self.replies.send(Ok(page)).unwrap();
    }

    fn reply_err(&self, err: Error) {
        self.replies.send(Err(err)).unwrap();
    }

    fn next_call(&self) -> Call {
        self.calls.recv_timeout(WAIT).expect("no fetch dispatched")
    }

    fn next_state(&self) -> Arc<LoaderState> {
        let state = self.states.recv_timeout(WAIT).expect("no snapshot published");
        assert_eq!(state.can_load_more, state.continuation.is_some());
        state
    }

    /// Waits for one fetch to go through: a busy snapshot, then an idle one.
    fn settle(&self) -> Arc<LoaderState> {
        assert!(self.next_state().is_loading);
        let state = self.next_state();
        assert!(!state.is_loading);
        state
    }

    fn failures(&self) -> Vec<String> {
        self.failures.lock().clone()
    }
}

fn page(title: Option<&str>, groups: Vec<(Vec<Item>, Option<&str>)>) -> Page {
    Page {
        title: title.map(String::from),
        groups: groups
            .into_iter()
            .map(|(items, continuation)| Group {
                items,
                continuation: continuation.map(Continuation::new),
            })
            .collect(),
    }
}

fn items(ids: &[&str]) -> Vec<Item> {
    ids.iter().map(|id| artist(id)).collect()
}

#[test]
fn charts_listing_pages_through_charts_endpoint() {
    let h = Harness::new(Some("FEmusic_charts"));

    h.reply(page(Some("Charts"), vec![(items(&["a", "b"]), Some("T1"))]));
    h.loader.load_initial();
    assert_eq!(h.next_call(), Call::Charts(None));
    let state = h.settle();
    assert_eq!(state.title.as_deref(), Some("Charts"));
    assert_eq!(state.items, items(&["a", "b"]));
    assert!(state.can_load_more);
    assert_eq!(state.phase(), Phase::HasMore);

    h.reply(page(None, vec![(items(&["c"]), None)]));
    h.loader.load_more();
    assert_eq!(h.next_call(), Call::Charts(Some("T1".into())));
    let state = h.settle();
    assert_eq!(state.title.as_deref(), Some("Charts"));
    assert_eq!(state.items, items(&["a", "b", "c"]));
    assert!(!state.can_load_more);
    assert_eq!(state.phase(), Phase::Exhausted);

    // Nothing left to page through.  The reload after it is the first thing
    // the source sees.
    h.loader.load_more();
    h.reply(page(Some("Charts"), vec![(items(&["z"]), None)]));
    h.loader.load_initial();
    assert_eq!(h.next_call(), Call::Charts(None));
    assert_eq!(h.settle().items, items(&["z"]));
}

#[test]
fn generic_listing_uses_browse_then_continuations() {
    let h = Harness::new(Some("artist123"));

    h.reply(page(
        Some("Artist"),
        vec![(items(&["a"]), Some("ignored")), (items(&["b", "c"]), Some("T1"))],
    ));
    h.loader.load_initial();
    assert_eq!(h.next_call(), Call::BrowseById("artist123".into()));
    assert_eq!(h.settle().items, items(&["a", "b", "c"]));

    h.reply(page(None, vec![(items(&["d"]), None), (items(&["e"]), Some("T2"))]));
    h.loader.load_more();
    assert_eq!(h.next_call(), Call::BrowseContinuation("T1".into()));
    h.settle();

    h.reply(page(None, vec![(items(&["f"]), None)]));
    h.loader.load_more();
    assert_eq!(h.next_call(), Call::BrowseContinuation("T2".into()));
    let state = h.settle();
    assert_eq!(state.items, items(&["a", "b", "c", "d", "e", "f"]));
    assert_eq!(state.title.as_deref(), Some("Artist"));
    assert!(!state.can_load_more);
    assert!(h.failures().is_empty());
}

#[test]
fn requests_while_loading_are_ignored() {
    let h = Harness::new(Some("artist123"));
    h.reply(page(None, vec![(items(&["a"]), Some("T1"))]));
    h.loader.load_initial();
    h.next_call();
    h.settle();

    // No reply queued, the fetch stays in flight.
    h.loader.load_more();
    assert_eq!(h.next_call(), Call::BrowseContinuation("T1".into()));
    h.loader.load_more();
    h.loader.load_initial();
    h.loader.retry();

    h.reply(page(None, vec![(items(&["b"]), None)]));
    let state = h.settle();
    assert_eq!(state.items, items(&["a", "b"]));
    assert!(h.calls.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn load_more_without_continuation_does_nothing() {
    let h = Harness::new(Some("artist123"));
    h.loader.load_more();

    h.reply(page(None, vec![(items(&["a"]), None)]));
    h.loader.load_initial();
    assert_eq!(h.next_call(), Call::BrowseById("artist123".into()));
    let busy = h.next_state();
    assert!(busy.is_loading);
    assert!(busy.items.is_empty());
    assert!(!h.next_state().is_loading);
}

#[test]
fn failed_load_more_keeps_loaded_data() {
    let h = Harness::new(Some("artist123"));
    h.reply(page(Some("Artist"), vec![(items(&["a", "b"]), Some("T1"))]));
    h.loader.load_initial();
    h.next_call();
    let before = h.settle();

    h.reply_err(Error::WebApiError("boom".into()));
    h.loader.load_more();
    h.next_call();
    let after = h.settle();
    assert_eq!(after.title, before.title);
    assert_eq!(after.items, before.items);
    assert_eq!(after.continuation, before.continuation);
    assert!(after.can_load_more);
    assert_eq!(h.failures(), vec!["boom".to_string()]);

    // With the continuation still there, retry picks up where it failed.
    h.reply(page(None, vec![(items(&["c"]), None)]));
    h.loader.retry();
    assert_eq!(h.next_call(), Call::BrowseContinuation("T1".into()));
    assert_eq!(h.settle().items, items(&["a", "b", "c"]));
}

#[test]
fn failed_initial_load_stays_uninitialized() {
    let h = Harness::new(Some("FEmusic_charts"));
    h.reply_err(Error::UnexpectedResponse);
    h.loader.load_initial();
    h.next_call();
    let state = h.settle();
    assert_eq!(state.phase(), Phase::Uninitialized);
    assert!(state.items.is_empty());
    assert_eq!(state.title, None);
    assert_eq!(h.failures().len(), 1);

    h.reply(page(Some("Charts"), vec![(items(&["a"]), None)]));
    h.loader.retry();
    assert_eq!(h.next_call(), Call::Charts(None));
    assert_eq!(h.settle().title.as_deref(), Some("Charts"));
}

#[test]
fn retry_after_exhaustion_reloads_from_start() {
    let h = Harness::new(Some("artist123"));
    h.reply(page(Some("Old"), vec![(items(&["a"]), Some("T1"))]));
    h.loader.load_initial();
    h.next_call();
    h.settle();
    h.reply(page(None, vec![(items(&["b"]), None)]));
    h.loader.load_more();
    h.next_call();
    assert_eq!(h.settle().phase(), Phase::Exhausted);

    h.reply(page(Some("New"), vec![(items(&["x", "y"]), Some("T9"))]));
    h.loader.retry();
    assert_eq!(h.next_call(), Call::BrowseById("artist123".into()));
    let state = h.settle();
    assert_eq!(state.title.as_deref(), Some("New"));
    assert_eq!(state.items, items(&["x", "y"]));
    assert_eq!(state.continuation, Some(Continuation::new("T9")));
}

#[test]
fn missing_browse_id_is_inert() {
    let h = Harness::new(None);
    h.loader.load_initial();
    h.loader.load_more();
    h.loader.retry();
    assert!(h.calls.recv_timeout(Duration::from_millis(100)).is_err());
    assert!(h.states.try_recv().is_err());
    assert_eq!(h.loader.state().phase(), Phase::Uninitialized);
    assert_eq!(h.loader.browse_id(), None);
}

#[test]
fn timed_out_fetch_is_abandoned() {
    let h = Harness::with_config(
        Some("artist123"),
        LoaderConfig {
            fetch_timeout: Duration::from_millis(50),
        },
    );
    h.loader.load_initial();
    h.next_call();
    let state = h.settle();
    assert!(state.items.is_empty());
    assert_eq!(h.failures().len(), 1);
    assert!(h.failures()[0].contains("timed out"));

    // The late answer lands on the abandoned fetch and is dropped.
    h.reply(page(Some("Late"), vec![(items(&["late"]), Some("T1"))]));
    h.taken.recv_timeout(WAIT).unwrap();
    h.reply(page(Some("Fresh"), vec![(items(&["fresh"]), None)]));
    h.loader.load_initial();
    h.next_call();
    let state = h.settle();
    assert_eq!(state.title.as_deref(), Some("Fresh"));
    assert_eq!(state.items, items(&["fresh"]));
}

#[test]
fn dropping_loader_discards_in_flight_result() {
    let h = Harness::new(Some("artist123"));
    h.loader.load_initial();
    h.next_call();
    assert!(h.next_state().is_loading);

    let Harness {
        loader,
        replies,
        states,
        failures,
        ..
    } = h;
    loader.close();
    replies.send(Ok(page(None, vec![(items(&["a"]), None)]))).unwrap();

    // Publishers are gone with the loader, so this ends.
    let rest: Vec<_> = states.iter().collect();
    assert!(rest.is_empty());
    assert!(failures.lock().is_empty());
}

#[test]
fn unrepresentable_timeout_waits_without_deadline() {
    let h = Harness::with_config(
        Some("artist123"),
        LoaderConfig {
            fetch_timeout: Duration::MAX,
        },
    );
    h.reply(page(Some("Artist"), vec![(items(&["a"]), Some("T1"))]));
    h.loader.load_initial();
    assert_eq!(h.next_call(), Call::BrowseById("artist123".into()));
    assert_eq!(h.settle().items, items(&["a"]));

    h.reply(page(None, vec![(items(&["b"]), None)]));
    h.loader.load_more();
    assert_eq!(h.next_call(), Call::BrowseContinuation("T1".into()));
    let state = h.settle();
    assert_eq!(state.items, items(&["a", "b"]));
    assert_eq!(state.phase(), Phase::Exhausted);
    assert!(h.failures().is_empty());
}
