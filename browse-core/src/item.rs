use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Identifier of a remote collection, e.g. an artist page or a chart.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrowseId(Arc<str>);

impl BrowseId {
    /// Reserved id selecting the charts endpoint family.
    pub const CHARTS: &'static str = "FEmusic_charts";

    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn is_charts(&self) -> bool {
        &*self.0 == Self::CHARTS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BrowseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque cursor marking where the next page of a listing begins.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Continuation(Arc<str>);

impl Continuation {
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens are long base64 blobs, keep the logs readable.
        const SHOWN: usize = 12;
        match self.0.char_indices().nth(SHOWN) {
            Some((end, _)) => write!(f, "Continuation({}..)", &self.0[..end]),
            None => write!(f, "Continuation({})", self.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistLink {
    pub id: Option<Arc<str>>,
    pub name: Arc<str>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumItem {
    pub id: Arc<str>,
    pub title: Arc<str>,
    pub artists: Vec<ArtistLink>,
    pub year: Option<u32>,
    pub thumbnail: Option<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: Arc<str>,
    pub title: Arc<str>,
    pub author: Option<Arc<str>>,
    pub thumbnail: Option<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistItem {
    pub id: Arc<str>,
    pub title: Arc<str>,
    pub subtitle: Option<Arc<str>>,
    pub thumbnail: Option<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherItem {
    pub id: Arc<str>,
    pub title: Arc<str>,
    pub subtitle: Option<Arc<str>>,
    pub thumbnail: Option<Arc<str>>,
}

/// A catalog entry.  The loader carries these around without looking inside,
/// dispatching on the variant is up to whoever renders them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Album(AlbumItem),
    Playlist(PlaylistItem),
    Artist(ArtistItem),
    Other(OtherItem),
}

impl Item {
    pub fn id(&self) -> &Arc<str> {
        match self {
            Self::Album(album) => &album.id,
            Self::Playlist(playlist) => &playlist.id,
            Self::Artist(artist) => &artist.id,
            Self::Other(other) => &other.id,
        }
    }

    pub fn title(&self) -> &Arc<str> {
        match self {
            Self::Album(album) => &album.title,
            Self::Playlist(playlist) => &playlist.title,
            Self::Artist(artist) => &artist.title,
            Self::Other(other) => &other.title,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Album(_) => "album",
            Self::Playlist(_) => "playlist",
            Self::Artist(_) => "artist",
            Self::Other(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charts_sentinel_is_recognized() {
        assert!(BrowseId::new("FEmusic_charts").is_charts());
        assert!(!BrowseId::new("FEmusic_charts_extra").is_charts());
        assert!(!BrowseId::new("UCartist123").is_charts());
    }

    #[test]
    fn continuation_debug_is_truncated() {
        let token = Continuation::new("4qmFsgKlARIMRkVtdXNpY19jaGFydHM");
        assert_eq!(format!("{:?}", token), "Continuation(4qmFsgKlARIM..)");
        let short = Continuation::new("T1");
        assert_eq!(format!("{:?}", short), "Continuation(T1)");
    }

    #[test]
    fn item_id_is_variant_independent() {
        let album = Item::Album(AlbumItem {
            id: "MPREb_1".into(),
            title: "Album".into(),
            artists: vec![],
            year: Some(2020),
            thumbnail: None,
        });
        let other = Item::Other(OtherItem {
            id: "dQw4w9WgXcQ".into(),
            title: "Video".into(),
            subtitle: None,
            thumbnail: Some("https://i.ytimg.com/x.jpg".into()),
        });
        assert_eq!(&**album.id(), "MPREb_1");
        assert_eq!(&**other.id(), "dQw4w9WgXcQ");
        assert_eq!(album.kind(), "album");
        assert_eq!(other.kind(), "other");
    }
}
