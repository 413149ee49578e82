//! The static catalog.

use serde::Serialize;

/// One title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Entry id; equal to its position in the catalog
    pub id: i64,
    /// Title
    pub name: &'static str,
    /// Poster image path
    pub poster_path: &'static str,
    /// Where the title can be watched
    pub external_url: &'static str,
    /// Link reserved for paying users
    pub is_paid_only: bool,
}

static ENTRIES: [CatalogEntry; 3] = [
    CatalogEntry {
        id: 0,
        name: "Fight Club",
        poster_path: "/static/posters/fightclub.jpg",
        external_url: "https://youtu.be/qtRKdVHc-cE",
        is_paid_only: true,
    },
    CatalogEntry {
        id: 1,
        name: "The Godfather",
        poster_path: "/static/posters/father.jpg",
        external_url: "https://youtu.be/ar1SHxgeZUc",
        is_paid_only: false,
    },
    CatalogEntry {
        id: 2,
        name: "Pulp Fiction",
        poster_path: "/static/posters/pulpfiction.jpg",
        external_url: "https://youtu.be/s7EdQ4FqbhY",
        is_paid_only: true,
    },
];

/// All entries, in id order.
#[must_use]
pub fn entries() -> &'static [CatalogEntry] {
    &ENTRIES
}

/// Entry by id, bounds-checked.
#[must_use]
pub fn find(id: i64) -> Option<&'static CatalogEntry> {
    usize::try_from(id).ok().and_then(|index| ENTRIES.get(index))
}
