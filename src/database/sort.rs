use mongodb::bson::{doc, Document};

/// Sortable game attributes accepted by `GET /games/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Name,
    Ratings,
}

impl SortField {
    /// Unrecognised names yield `None`, which lists in default order.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "price" => Some(SortField::Price),
            "name" => Some(SortField::Name),
            "ratings" => Some(SortField::Ratings),
            _ => None,
        }
    }

    /// Document path the field sorts on.
    pub fn path(&self) -> &'static str {
        match self {
            SortField::Price => "price.base",
            SortField::Name => "name",
            SortField::Ratings => "ratings.percentage",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than `asc` sorts descending.
    pub fn parse(value: &str) -> Self {
        if value == "asc" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn to_mongo(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Listing options passed straight through to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameQuery {
    pub sort: Option<GameSort>,
    /// `None` or `Some(0)` means unlimited.
    pub limit: Option<u32>,
}

impl GameQuery {
    pub fn sort_document(&self) -> Document {
        match self.sort {
            Some(sort) => {
                let mut document = Document::new();
                document.insert(sort.field.path(), sort.direction.to_mongo());
                document
            }
            None => doc! { "_id": 1 },
        }
    }

    pub fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|n| *n > 0).map(|n| n as usize)
    }
}
