use super::{map_tx_error, not_found};
use crate::catalog::natural_sort;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexa_contracts::catalog::{LibrarySectionFilter, LibrarySectionRepository, LibrarySectionSortField, Page, SortOrder};
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_model::error::ErrorKind;
use nexa_model::prelude::*;
use sqlx::PgPool;
use std::path::PathBuf;
use uuid::Uuid;

pub struct PgLibrarySectionRepository {
    pool: PgPool,
}

impl PgLibrarySectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_locations(&self, id: Uuid) -> CoreResult<Vec<SectionLocation>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "select id, path from section_locations where library_section_id = $1 order by id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_tx_error)?;
        Ok(rows
            .into_iter()
            .map(|(id, path)| SectionLocation {
                id,
                path: PathBuf::from(path),
            })
            .collect())
    }

    async fn hydrate(&self, row: SectionRow) -> CoreResult<LibrarySection> {
        let locations = self.load_locations(row.id).await?;
        Ok(LibrarySection {
            id: row.id.into(),
            name: row.name,
            library_type: parse_library_type(&row.library_type),
            locations,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_scanned_at: row.last_scanned_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SectionRow {
    id: Uuid,
    name: String,
    library_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_scanned_at: Option<DateTime<Utc>>,
}

fn library_type_key(t: LibraryType) -> &'static str {
    match t {
        LibraryType::Movies => "MOVIES",
        LibraryType::TvShows => "TV_SHOWS",
        LibraryType::Music => "MUSIC",
        LibraryType::MusicVideos => "MUSIC_VIDEOS",
        LibraryType::HomeVideos => "HOME_VIDEOS",
        LibraryType::Audiobooks => "AUDIOBOOKS",
        LibraryType::Podcasts => "PODCASTS",
        LibraryType::Photos => "PHOTOS",
        LibraryType::Pictures => "PICTURES",
        LibraryType::Books => "BOOKS",
        LibraryType::Comics => "COMICS",
        LibraryType::Manga => "MANGA",
        LibraryType::Magazines => "MAGAZINES",
        LibraryType::Games => "GAMES",
    }
}

fn parse_library_type(s: &str) -> LibraryType {
    match s {
        "MOVIES" => LibraryType::Movies,
        "TV_SHOWS" => LibraryType::TvShows,
        "MUSIC" => LibraryType::Music,
        "MUSIC_VIDEOS" => LibraryType::MusicVideos,
        "HOME_VIDEOS" => LibraryType::HomeVideos,
        "AUDIOBOOKS" => LibraryType::Audiobooks,
        "PODCASTS" => LibraryType::Podcasts,
        "PHOTOS" => LibraryType::Photos,
        "PICTURES" => LibraryType::Pictures,
        "BOOKS" => LibraryType::Books,
        "COMICS" => LibraryType::Comics,
        "MANGA" => LibraryType::Manga,
        "MAGAZINES" => LibraryType::Magazines,
        _ => LibraryType::Games,
    }
}

#[async_trait]
impl LibrarySectionRepository for PgLibrarySectionRepository {
    async fn list(&self) -> CoreResult<Vec<LibrarySection>> {
        let rows: Vec<SectionRow> = sqlx::query_as("select * from library_sections order by name")
            .fetch_all(&self.pool)
            .await
            .map_err(map_tx_error)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(self.hydrate(row).await?);
        }
        Ok(out)
    }

    async fn query(
        &self,
        filter: &LibrarySectionFilter,
        sort: LibrarySectionSortField,
        order: SortOrder,
        pagination: &Pagination,
    ) -> CoreResult<Page<LibrarySection>> {
        let mut sections = self.list().await?;
        if let Some(library_type) = filter.library_type {
            sections.retain(|s| s.library_type == library_type);
        }
        sections.sort_by(|a, b| {
            let ord = match sort {
                LibrarySectionSortField::Name => natural_sort::compare(&a.name, &b.name),
                LibrarySectionSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            }
            .then_with(|| row_id_from_uuid(a.id.as_uuid()).cmp(&row_id_from_uuid(b.id.as_uuid())));
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        fn section_sort_key(s: &LibrarySection, sort: LibrarySectionSortField) -> String {
            match sort {
                LibrarySectionSortField::Name => s.name.clone(),
                LibrarySectionSortField::CreatedAt => s.created_at.to_rfc3339(),
            }
        }

        let (page, start, total) = paginate(sections, pagination, |s| (section_sort_key(s, sort), row_id_from_uuid(s.id.as_uuid())));

        let has_next = (start + page.len() as u64) < total;
        let start_cursor = page
            .first()
            .map(|s| Cursor { sort_key: section_sort_key(s, sort), row_id: row_id_from_uuid(s.id.as_uuid()) }.encode());
        let end_cursor = page
            .last()
            .map(|s| Cursor { sort_key: section_sort_key(s, sort), row_id: row_id_from_uuid(s.id.as_uuid()) }.encode());

        Ok(Page {
            items: page,
            total: Some(total),
            page_info: PageInfo { has_next_page: has_next, has_previous_page: start > 0, start_cursor, end_cursor },
        })
    }

    async fn get(&self, id: LibrarySectionId) -> CoreResult<LibrarySection> {
        let row: Option<SectionRow> = sqlx::query_as("select * from library_sections where id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_tx_error)?;
        match row {
            Some(row) => self.hydrate(row).await,
            None => Err(not_found("library section not found")),
        }
    }

    async fn create(
        &self,
        name: String,
        library_type: LibraryType,
        roots: Vec<PathBuf>,
    ) -> CoreResult<LibrarySection> {
        // Overlap check against every existing section's roots, per
        // spec.md §3: "no two sections may claim overlapping root paths".
        for existing in self.list().await? {
            if existing.overlaps(&roots) {
                return Err(CoreError::new(
                    ErrorKind::InvalidArgument,
                    format!(
                        "root path overlaps an existing location in section '{}'",
                        existing.name
                    ),
                ));
            }
        }

        let id = LibrarySectionId::new();
        let mut tx = self.pool.begin().await.map_err(map_tx_error)?;

        sqlx::query("insert into library_sections (id, name, library_type) values ($1, $2, $3)")
            .bind(id.as_uuid())
            .bind(&name)
            .bind(library_type_key(library_type))
            .execute(&mut *tx)
            .await
            .map_err(map_tx_error)?;

        for root in &roots {
            sqlx::query(
                "insert into section_locations (library_section_id, path) values ($1, $2)",
            )
            .bind(id.as_uuid())
            .bind(root.display().to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_tx_error)?;
        }

        tx.commit().await.map_err(map_tx_error)?;
        self.get(id).await
    }

    async fn update_roots(&self, id: LibrarySectionId, roots: Vec<PathBuf>) -> CoreResult<LibrarySection> {
        let mut tx = self.pool.begin().await.map_err(map_tx_error)?;
        sqlx::query("delete from section_locations where library_section_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(map_tx_error)?;
        for root in &roots {
            sqlx::query(
                "insert into section_locations (library_section_id, path) values ($1, $2)",
            )
            .bind(id.as_uuid())
            .bind(root.display().to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_tx_error)?;
        }
        sqlx::query("update library_sections set updated_at = now() where id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(map_tx_error)?;
        tx.commit().await.map_err(map_tx_error)?;
        self.get(id).await
    }

    async fn delete(&self, id: LibrarySectionId) -> CoreResult<()> {
        // `on delete cascade` removes every attributed metadata_items row,
        // satisfying spec.md §8's "deleting L removes all such items".
        let result = sqlx::query("delete from library_sections where id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_tx_error)?;
        if result.rows_affected() == 0 {
            return Err(not_found("library section not found"));
        }
        Ok(())
    }

    async fn mark_scanned(&self, id: LibrarySectionId) -> CoreResult<()> {
        sqlx::query("update library_sections set last_scanned_at = now(), updated_at = now() where id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_tx_error)?;
        Ok(())
    }
}
