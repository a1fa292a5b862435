use crate::error::Error;

/// Sink for failed fetches.  Fire-and-forget, the loader does not look at
/// anything a reporter does.
pub trait FailureReporter: Send + Sync {
    fn report(&self, err: &Error);
}

impl<F> FailureReporter for F
where
    F: Fn(&Error) + Send + Sync,
{
    fn report(&self, err: &Error) {
        self(err)
    }
}

/// Writes failures to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl FailureReporter for LogReporter {
    fn report(&self, err: &Error) {
        log::error!("browse request failed: {}", err);
    }
}
