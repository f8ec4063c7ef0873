use async_graphql::SimpleObject;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Offset-based page request, for simple `skip`/`take` list views.
#[derive(Debug, Clone, Copy)]
pub struct OffsetPage {
    pub skip: u32,
    pub take: u32,
}

/// How a query result should be windowed: by position, or relative to an
/// opaque `Cursor` from a previous page. `librarySections` exposes the
/// cursor form; offset-shaped resolvers like `library.children` pass
/// `Offset` and never see a `Cursor`.
#[derive(Debug, Clone)]
pub enum Pagination {
    Offset(OffsetPage),
    Cursor { after: Option<Cursor>, take: u32 },
}

impl Pagination {
    pub fn offset(skip: u32, take: u32) -> Self {
        Pagination::Offset(OffsetPage { skip, take })
    }

    pub fn take(&self) -> u32 {
        match self {
            Pagination::Offset(p) => p.take,
            Pagination::Cursor { take, .. } => *take,
        }
    }
}

/// Derives `Cursor::row_id` from an entity's UUID. Not globally ordered,
/// but stable and collision-free enough to break ties between items that
/// share a sort key.
pub fn row_id_from_uuid(id: Uuid) -> i64 {
    (id.as_u128() & 0xffff_ffff_ffff_ffff) as i64
}

/// Slices an already-sorted sequence for `pagination`, locating a
/// `Cursor::after` by the `(sort_key, row_id)` pair `key_of` reports for
/// each item. Returns the page, the index the page starts at, and the
/// total count before slicing.
pub fn paginate<T>(items: Vec<T>, pagination: &Pagination, key_of: impl Fn(&T) -> (String, i64)) -> (Vec<T>, u64, u64) {
    let total = items.len() as u64;
    let start = match pagination {
        Pagination::Offset(p) => p.skip as usize,
        Pagination::Cursor { after: Some(cursor), .. } => items
            .iter()
            .position(|item| key_of(item) == (cursor.sort_key.clone(), cursor.row_id))
            .map(|idx| idx + 1)
            .unwrap_or(0),
        Pagination::Cursor { after: None, .. } => 0,
    };
    let take = pagination.take() as usize;
    let page: Vec<T> = items.into_iter().skip(start).take(take).collect();
    (page, start as u64, total)
}

/// Opaque cursor wrapping a strictly-monotonic `(sort_key, row_id)` pair,
/// so pages remain stable under concurrent inserts between pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub sort_key: String,
    pub row_id: i64,
}

impl Cursor {
    pub fn encode(&self) -> String {
        let raw = format!("{}\u{0}{}", self.sort_key, self.row_id);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw)
    }

    pub fn decode(s: &str) -> Option<Self> {
        let raw = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(s)
            .ok()?;
        let raw = String::from_utf8(raw).ok()?;
        let (sort_key, row_id) = raw.rsplit_once('\u{0}')?;
        Some(Cursor {
            sort_key: sort_key.to_string(),
            row_id: row_id.parse().ok()?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_round_trips() {
        let c = Cursor {
            sort_key: "expanse".into(),
            row_id: 42,
        };
        let encoded = c.encode();
        let decoded = Cursor::decode(&encoded).unwrap();
        assert_eq!(c, decoded);
    }

    #[test]
    fn cursor_rejects_garbage() {
        assert!(Cursor::decode("not-a-cursor!!").is_none());
    }
}
