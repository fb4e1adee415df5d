//! Product categories and the catalog filter.

use serde::{Deserialize, Serialize};

/// Grocery category shown as a tag on each product card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Produce,
    Bakery,
    Dairy,
}

impl Category {
    /// Categories in the order used by [`Category::for_product_id`].
    pub const ALL: [Self; 3] = [Self::Produce, Self::Bakery, Self::Dairy];

    /// Derive a display category for a server-supplied product.
    ///
    /// `id mod 3` indexes into [`Category::ALL`]. Negative IDs have no
    /// category, matching how the storefront has always tagged them.
    #[must_use]
    pub fn for_product_id(id: i64) -> Option<Self> {
        usize::try_from(id % 3)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Lowercase name used in filters and tags.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Produce => "produce",
            Self::Bakery => "bakery",
            Self::Dairy => "dairy",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "produce" => Ok(Self::Produce),
            "bakery" => Ok(Self::Bakery),
            "dairy" => Ok(Self::Dairy),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// Which products the grid shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Whether a product with the given category passes this filter.
    #[must_use]
    pub fn matches(&self, category: Option<Category>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => category == Some(*wanted),
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(category) => category.fmt(f),
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::All);
        }
        s.parse::<Category>()
            .map(Self::Only)
            .map_err(|_| format!("invalid filter: {s}"))
    }
}
