use async_graphql::Enum;
use serde::{Deserialize, Serialize};

/// Discriminator tag for the polymorphic `MetadataItem` record.
///
/// Modeled as a flat tagged enum rather than a type hierarchy: every
/// variant shares the base `MetadataItem` fields, and per-variant shape
/// differences (e.g. an `Episode`'s season/episode numbers) live in
/// `MetadataItem::extra_fields` until they earn a first-class column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetadataType {
    Movie,
    Show,
    Season,
    Episode,
    AlbumReleaseGroup,
    AlbumRelease,
    AlbumMedium,
    Track,
    AudioWork,
    BookSeries,
    EditionGroup,
    Edition,
    EditionItem,
    LiteraryWork,
    LiteraryWorkPart,
    Game,
    GameRelease,
    Person,
    Group,
    Playlist,
    Photo,
    Picture,
    PhotoAlbum,
    PictureSet,
    Collection,
    Trailer,
    Featurette,
    DeletedScene,
    BehindTheScenes,
    Interview,
    Short,
    Scene,
    ExtraOther,
}

impl MetadataType {
    /// Extra ("bonus content") variants nested under a parent item rather
    /// than standing alone in a library's browse view.
    pub fn is_extra(self) -> bool {
        matches!(
            self,
            MetadataType::Trailer
                | MetadataType::Featurette
                | MetadataType::DeletedScene
                | MetadataType::BehindTheScenes
                | MetadataType::Interview
                | MetadataType::Short
                | MetadataType::Scene
                | MetadataType::ExtraOther
        )
    }
}

/// The kind of content a `LibrarySection` contains, gating which
/// `MetadataType`s the scan pipeline's Classify stage may assign within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LibraryType {
    Movies,
    TvShows,
    Music,
    MusicVideos,
    HomeVideos,
    Audiobooks,
    Podcasts,
    Photos,
    Pictures,
    Books,
    Comics,
    Manga,
    Magazines,
    Games,
}

impl LibraryType {
    /// `MetadataType`s that may appear as a library root item for this
    /// library kind — used by `librarySection.availableRootItemTypes`.
    pub fn root_item_types(self) -> &'static [MetadataType] {
        use MetadataType::*;
        match self {
            LibraryType::Movies => &[Movie],
            LibraryType::TvShows => &[Show],
            LibraryType::Music => &[AlbumReleaseGroup],
            LibraryType::MusicVideos => &[Track],
            LibraryType::HomeVideos => &[Movie],
            LibraryType::Audiobooks => &[AudioWork],
            LibraryType::Podcasts => &[AudioWork],
            LibraryType::Photos => &[PhotoAlbum],
            LibraryType::Pictures => &[PictureSet],
            LibraryType::Books => &[BookSeries, Edition],
            LibraryType::Comics => &[BookSeries, Edition],
            LibraryType::Manga => &[BookSeries, Edition],
            LibraryType::Magazines => &[Edition],
            LibraryType::Games => &[GameRelease],
        }
    }
}
