//! Wire format of browse responses, and its mapping onto `Page`s.
//!
//! Only the renderers that carry listing content are modelled, everything
//! else in the response is skipped by serde.

use std::sync::Arc;

use serde::Deserialize;

use crate::{
    error::Error,
    item::{AlbumItem, ArtistItem, ArtistLink, Continuation, Item, OtherItem, PlaylistItem},
    page::{Group, Page},
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    header: Option<Header>,
    contents: Option<Contents>,
    continuation_contents: Option<ContinuationContents>,
}

impl BrowseResponse {
    pub fn into_page(self) -> Result<Page, Error> {
        let title = self.header.and_then(Header::title);
        let groups = if let Some(continued) = self.continuation_contents {
            continued.into_groups()
        } else if let Some(contents) = self.contents {
            contents.into_groups()
        } else {
            return Err(Error::UnexpectedResponse);
        };
        Ok(Page { title, groups })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    music_header_renderer: Option<TitledRenderer>,
    music_immersive_header_renderer: Option<TitledRenderer>,
    music_detail_header_renderer: Option<TitledRenderer>,
    music_visual_header_renderer: Option<TitledRenderer>,
}

impl Header {
    fn title(self) -> Option<String> {
        [
            self.music_header_renderer,
            self.music_immersive_header_renderer,
            self.music_detail_header_renderer,
            self.music_visual_header_renderer,
        ]
        .into_iter()
        .flatten()
        .find_map(|renderer| renderer.title)
        .map(|title| title.text())
        .filter(|title| !title.is_empty())
    }
}

#[derive(Deserialize)]
struct TitledRenderer {
    title: Option<Runs>,
}

#[derive(Deserialize)]
struct Runs {
    #[serde(default)]
    runs: Vec<Run>,
}

impl Runs {
    fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Run {
    text: String,
    navigation_endpoint: Option<NavigationEndpoint>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Contents {
    single_column_browse_results_renderer: Option<SingleColumnResults>,
}

impl Contents {
    fn into_groups(self) -> Vec<Group> {
        self.single_column_browse_results_renderer
            .and_then(|results| results.tabs.into_iter().next())
            .and_then(|tab| tab.tab_renderer)
            .and_then(|tab| tab.content)
            .and_then(|content| content.section_list_renderer)
            .map(SectionList::into_groups)
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct SingleColumnResults {
    #[serde(default)]
    tabs: Vec<Tab>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tab {
    tab_renderer: Option<TabRenderer>,
}

#[derive(Deserialize)]
struct TabRenderer {
    content: Option<TabContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TabContent {
    section_list_renderer: Option<SectionList>,
}

#[derive(Deserialize)]
struct SectionList {
    #[serde(default)]
    contents: Vec<Section>,
    #[serde(default)]
    continuations: Vec<ContinuationData>,
}

impl SectionList {
    fn into_groups(self) -> Vec<Group> {
        let list_continuation = next_continuation(&self.continuations);
        let mut groups: Vec<Group> = self
            .contents
            .into_iter()
            .filter_map(Section::into_group)
            .collect();
        // More sections follow: page through those once the last shelf is
        // done.
        if let Some(token) = list_continuation {
            match groups.last_mut() {
                Some(last) if last.continuation.is_none() => last.continuation = Some(token),
                Some(_) => {}
                None => groups.push(Group {
                    items: Vec::new(),
                    continuation: Some(token),
                }),
            }
        }
        groups
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Section {
    grid_renderer: Option<Shelf>,
    music_carousel_shelf_renderer: Option<Shelf>,
    music_shelf_renderer: Option<Shelf>,
    music_playlist_shelf_renderer: Option<Shelf>,
}

impl Section {
    fn into_group(self) -> Option<Group> {
        self.grid_renderer
            .or(self.music_carousel_shelf_renderer)
            .or(self.music_shelf_renderer)
            .or(self.music_playlist_shelf_renderer)
            .map(Shelf::into_group)
    }
}

#[derive(Deserialize)]
struct Shelf {
    #[serde(default, alias = "contents")]
    items: Vec<ItemRenderer>,
    #[serde(default)]
    continuations: Vec<ContinuationData>,
}

impl Shelf {
    fn into_group(self) -> Group {
        Group {
            continuation: next_continuation(&self.continuations),
            items: self
                .items
                .into_iter()
                .filter_map(ItemRenderer::into_item)
                .collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContinuationContents {
    grid_continuation: Option<Shelf>,
    music_shelf_continuation: Option<Shelf>,
    music_playlist_shelf_continuation: Option<Shelf>,
    section_list_continuation: Option<SectionList>,
}

impl ContinuationContents {
    fn into_groups(self) -> Vec<Group> {
        if let Some(shelf) = self
            .grid_continuation
            .or(self.music_shelf_continuation)
            .or(self.music_playlist_shelf_continuation)
        {
            vec![shelf.into_group()]
        } else if let Some(sections) = self.section_list_continuation {
            sections.into_groups()
        } else {
            Vec::new()
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContinuationData {
    next_continuation_data: Option<NextContinuationData>,
}

#[derive(Deserialize)]
struct NextContinuationData {
    continuation: String,
}

fn next_continuation(continuations: &[ContinuationData]) -> Option<Continuation> {
    continuations
        .iter()
        .find_map(|data| data.next_continuation_data.as_ref())
        .map(|data| Continuation::new(data.continuation.as_str()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRenderer {
    music_two_row_item_renderer: Option<TwoRowItem>,
    music_responsive_list_item_renderer: Option<ListItem>,
}

impl ItemRenderer {
    fn into_item(self) -> Option<Item> {
        if let Some(item) = self.music_two_row_item_renderer {
            item.into_item()
        } else if let Some(item) = self.music_responsive_list_item_renderer {
            item.into_item()
        } else {
            None
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TwoRowItem {
    title: Option<Runs>,
    subtitle: Option<Runs>,
    thumbnail_renderer: Option<ThumbnailRenderer>,
    navigation_endpoint: Option<NavigationEndpoint>,
}

impl TwoRowItem {
    fn into_item(self) -> Option<Item> {
        let title = self.title?;
        let nav = self.navigation_endpoint.as_ref().or_else(|| {
            title
                .runs
                .iter()
                .find_map(|run| run.navigation_endpoint.as_ref())
        });
        ItemParts {
            title: title.text(),
            subtitle: self.subtitle.as_ref(),
            thumbnail: self.thumbnail_renderer.and_then(ThumbnailRenderer::best),
            nav,
            video_id: None,
        }
        .into_item()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListItem {
    #[serde(default)]
    flex_columns: Vec<FlexColumn>,
    thumbnail: Option<ThumbnailRenderer>,
    navigation_endpoint: Option<NavigationEndpoint>,
    playlist_item_data: Option<PlaylistItemData>,
}

impl ListItem {
    fn into_item(self) -> Option<Item> {
        let mut columns = self
            .flex_columns
            .into_iter()
            .filter_map(|column| column.music_responsive_list_item_flex_column_renderer)
            .filter_map(|column| column.text);
        let title = columns.next()?;
        let subtitle = columns.next();
        let nav = self.navigation_endpoint.as_ref().or_else(|| {
            title
                .runs
                .iter()
                .find_map(|run| run.navigation_endpoint.as_ref())
        });
        ItemParts {
            title: title.text(),
            subtitle: subtitle.as_ref(),
            thumbnail: self.thumbnail.and_then(ThumbnailRenderer::best),
            nav,
            video_id: self.playlist_item_data.as_ref().map(|data| data.video_id.as_str()),
        }
        .into_item()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlexColumn {
    music_responsive_list_item_flex_column_renderer: Option<FlexColumnRenderer>,
}

#[derive(Deserialize)]
struct FlexColumnRenderer {
    text: Option<Runs>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemData {
    video_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThumbnailRenderer {
    music_thumbnail_renderer: Option<MusicThumbnail>,
}

impl ThumbnailRenderer {
    /// Thumbnails come sorted by size, the last one is the largest.
    fn best(self) -> Option<Arc<str>> {
        self.music_thumbnail_renderer?
            .thumbnail?
            .thumbnails
            .pop()
            .map(|thumbnail| thumbnail.url.into())
    }
}

#[derive(Deserialize)]
struct MusicThumbnail {
    thumbnail: Option<Thumbnails>,
}

#[derive(Deserialize)]
struct Thumbnails {
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavigationEndpoint {
    browse_endpoint: Option<BrowseEndpoint>,
    watch_endpoint: Option<WatchEndpoint>,
}

impl NavigationEndpoint {
    fn page_type(&self) -> Option<&str> {
        self.browse_endpoint.as_ref()?.page_type()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrowseEndpoint {
    browse_id: String,
    browse_endpoint_context_supported_configs: Option<ContextConfigs>,
}

impl BrowseEndpoint {
    fn page_type(&self) -> Option<&str> {
        self.browse_endpoint_context_supported_configs
            .as_ref()?
            .browse_endpoint_context_music_config
            .as_ref()
            .map(|config| config.page_type.as_str())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContextConfigs {
    browse_endpoint_context_music_config: Option<MusicConfig>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MusicConfig {
    page_type: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatchEndpoint {
    video_id: Option<String>,
}

const PAGE_TYPE_ALBUM: &str = "MUSIC_PAGE_TYPE_ALBUM";
const PAGE_TYPE_AUDIOBOOK: &str = "MUSIC_PAGE_TYPE_AUDIOBOOK";
const PAGE_TYPE_PLAYLIST: &str = "MUSIC_PAGE_TYPE_PLAYLIST";
const PAGE_TYPE_ARTIST: &str = "MUSIC_PAGE_TYPE_ARTIST";
const PAGE_TYPE_USER_CHANNEL: &str = "MUSIC_PAGE_TYPE_USER_CHANNEL";
const PAGE_TYPE_LIBRARY_ARTIST: &str = "MUSIC_PAGE_TYPE_LIBRARY_ARTIST";

struct ItemParts<'a> {
    title: String,
    subtitle: Option<&'a Runs>,
    thumbnail: Option<Arc<str>>,
    nav: Option<&'a NavigationEndpoint>,
    video_id: Option<&'a str>,
}

impl ItemParts<'_> {
    fn into_item(self) -> Option<Item> {
        let title: Arc<str> = self.title.into();
        let subtitle = self
            .subtitle
            .map(Runs::text)
            .filter(|text| !text.is_empty())
            .map(Arc::<str>::from);
        let browse = self.nav.and_then(|nav| nav.browse_endpoint.as_ref());

        let Some(browse) = browse else {
            // Songs and videos only have a watch endpoint.
            let video_id = self.video_id.or_else(|| {
                self.nav?
                    .watch_endpoint
                    .as_ref()?
                    .video_id
                    .as_deref()
            })?;
            return Some(Item::Other(OtherItem {
                id: video_id.into(),
                title,
                subtitle,
                thumbnail: self.thumbnail,
            }));
        };

        let id: Arc<str> = browse.browse_id.as_str().into();
        let item = match browse.page_type() {
            Some(PAGE_TYPE_ALBUM | PAGE_TYPE_AUDIOBOOK) => Item::Album(AlbumItem {
                id,
                title,
                artists: self.subtitle.map(artist_links).unwrap_or_default(),
                year: self.subtitle.and_then(release_year),
                thumbnail: self.thumbnail,
            }),
            Some(PAGE_TYPE_PLAYLIST) => Item::Playlist(PlaylistItem {
                // Browse ids of playlists carry a "VL" prefix the playlist id
                // itself doesn't have.
                id: browse
                    .browse_id
                    .strip_prefix("VL")
                    .map(Arc::from)
                    .unwrap_or(id),
                title,
                author: subtitle,
                thumbnail: self.thumbnail,
            }),
            Some(PAGE_TYPE_ARTIST | PAGE_TYPE_USER_CHANNEL | PAGE_TYPE_LIBRARY_ARTIST) => {
                Item::Artist(ArtistItem {
                    id,
                    title,
                    subtitle,
                    thumbnail: self.thumbnail,
                })
            }
            _ => Item::Other(OtherItem {
                id,
                title,
                subtitle,
                thumbnail: self.thumbnail,
            }),
        };
        Some(item)
    }
}

fn artist_links(subtitle: &Runs) -> Vec<ArtistLink> {
    subtitle
        .runs
        .iter()
        .filter_map(|run| {
            let nav = run.navigation_endpoint.as_ref()?;
            match nav.page_type() {
                Some(PAGE_TYPE_ARTIST | PAGE_TYPE_USER_CHANNEL) => Some(ArtistLink {
                    id: nav
                        .browse_endpoint
                        .as_ref()
                        .map(|browse| browse.browse_id.as_str().into()),
                    name: run.text.as_str().into(),
                }),
                _ => None,
            }
        })
        .collect()
}

fn release_year(subtitle: &Runs) -> Option<u32> {
    subtitle
        .runs
        .iter()
        .rev()
        .map(|run| run.text.trim())
        .find(|text| text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|text| text.parse().ok())
}
