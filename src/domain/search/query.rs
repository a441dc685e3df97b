//! Engine-independent compiled search query

use serde::{Deserialize, Serialize};

pub const SECTOR_FIELD: &str = "sector";
pub const FEES_FIELD: &str = "fees";
pub const PERFORMANCE_FIELD: &str = "performance_1y";

/// A single filter predicate; a document must satisfy all of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterClause {
    /// Exact match on any of the values
    Terms { field: String, values: Vec<String> },
    /// Inclusive numeric bounds
    Range {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gte: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lte: Option<f64>,
    },
}

impl FilterClause {
    pub fn terms<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn at_most(field: impl Into<String>, max: f64) -> Self {
        Self::Range {
            field: field.into(),
            gte: None,
            lte: Some(max),
        }
    }

    pub fn at_least(field: impl Into<String>, min: f64) -> Self {
        Self::Range {
            field: field.into(),
            gte: Some(min),
            lte: None,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Terms { field, .. } | Self::Range { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortClause {
    pub field: String,
    pub order: SortOrder,
}

impl SortClause {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Conjunctive filters plus a sort order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub filters: Vec<FilterClause>,
    pub sort: Vec<SortClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl StructuredQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: FilterClause) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortClause) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }
}
