use crate::{
    error::Error,
    item::{BrowseId, Continuation},
    page::Page,
};

/// Remote operations a loader pages through.  Calls block until the page is
/// there, the loader runs them off its own thread.
pub trait BrowseSource: Send + Sync {
    fn browse_by_id(&self, browse_id: &BrowseId) -> Result<Page, Error>;

    fn browse_continuation(&self, token: &Continuation) -> Result<Page, Error>;

    fn charts_continuation(&self, token: Option<&Continuation>) -> Result<Page, Error>;
}

impl<S: BrowseSource + ?Sized> BrowseSource for std::sync::Arc<S> {
    fn browse_by_id(&self, browse_id: &BrowseId) -> Result<Page, Error> {
        (**self).browse_by_id(browse_id)
    }

    fn browse_continuation(&self, token: &Continuation) -> Result<Page, Error> {
        (**self).browse_continuation(token)
    }

    fn charts_continuation(&self, token: Option<&Continuation>) -> Result<Page, Error> {
        (**self).charts_continuation(token)
    }
}

/// Endpoint family a browse id is served from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Charts,
    Browse(BrowseId),
}

impl Endpoint {
    pub fn for_id(browse_id: &BrowseId) -> Self {
        if browse_id.is_charts() {
            Self::Charts
        } else {
            Self::Browse(browse_id.clone())
        }
    }

    /// First page of the listing.
    pub fn fetch_initial(&self, source: &dyn BrowseSource) -> Result<Page, Error> {
        match self {
            Self::Charts => source.charts_continuation(None),
            Self::Browse(browse_id) => source.browse_by_id(browse_id),
        }
    }

    /// Page following `token`.  Generic listings never go back to
    /// `browse_by_id` once they have a token.
    pub fn fetch_more(&self, source: &dyn BrowseSource, token: &Continuation) -> Result<Page, Error> {
        match self {
            Self::Charts => source.charts_continuation(Some(token)),
            Self::Browse(_) => source.browse_continuation(token),
        }
    }
}
