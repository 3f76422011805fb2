//! Ordering and paging for list endpoints

pub mod error;
pub mod filter_order;
pub mod types;

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

pub use error::FilterError;
pub use filter_order::FilterOrder;
pub use types::*;

use crate::config::{self, FilterConfig};

/// `?order=&limit=&offset=` accepted by every list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Validated ORDER BY / LIMIT / OFFSET for one query
#[derive(Debug, Clone)]
pub struct ListClause {
    pub order: Vec<FilterOrderInfo>,
    pub limit: i64,
    pub offset: i64,
}

impl ListQuery {
    pub fn resolve(&self, allowed: &[&str], default_order: &str) -> Result<ListClause, FilterError> {
        self.resolve_with(&config::config().filter, allowed, default_order)
    }

    fn resolve_with(&self, limits: &FilterConfig, allowed: &[&str], default_order: &str) -> Result<ListClause, FilterError> {
        let order_spec = self
            .order
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(default_order);
        let order = FilterOrder::parse(order_spec, allowed)?;

        let limit = match self.limit {
            Some(l) if l < 0 => return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())),
            Some(l) if l > limits.max_limit => {
                tracing::debug!("Limit {} exceeds max {}, capping to max", l, limits.max_limit);
                limits.max_limit
            }
            Some(l) => l,
            None => limits.default_limit,
        };

        let offset = match self.offset {
            Some(o) if o < 0 => return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())),
            Some(o) => o,
            None => 0,
        };

        Ok(ListClause { order, limit, offset })
    }
}

impl ListClause {
    /// Append ORDER BY, LIMIT and OFFSET to a query under construction
    pub fn push_to(&self, qb: &mut QueryBuilder<'_, Postgres>, alias: &str) {
        qb.push(FilterOrder::generate(&self.order, alias));
        qb.push(" LIMIT ");
        qb.push_bind(self.limit);
        qb.push(" OFFSET ");
        qb.push_bind(self.offset);
    }

    /// Sort requests for `column` use `sort_column` instead
    pub fn sort_by(mut self, column: &str, sort_column: &str) -> Self {
        for info in self.order.iter_mut().filter(|info| info.column == column) {
            info.column = sort_column.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> FilterConfig {
        FilterConfig {
            default_limit: 25,
            max_limit: 100,
        }
    }

    #[test]
    fn defaults_apply_when_absent() {
        let clause = ListQuery::default()
            .resolve_with(&limits(), &["name", "created_at"], "created_at desc")
            .unwrap();
        assert_eq!(clause.limit, 25);
        assert_eq!(clause.offset, 0);
        assert_eq!(clause.order[0].column, "created_at");
        assert_eq!(clause.order[0].sort, SortDirection::Desc);
    }

    #[test]
    fn limit_is_capped() {
        let query = ListQuery {
            limit: Some(10_000),
            ..Default::default()
        };
        let clause = query.resolve_with(&limits(), &["name"], "name").unwrap();
        assert_eq!(clause.limit, 100);
    }

    #[test]
    fn negative_paging_is_rejected() {
        let query = ListQuery {
            offset: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            query.resolve_with(&limits(), &["name"], "name"),
            Err(FilterError::InvalidOffset(_))
        ));
    }

    #[test]
    fn renders_sql_tail() {
        let query = ListQuery {
            order: Some("name desc".to_string()),
            limit: Some(5),
            offset: Some(10),
        };
        let clause = query.resolve_with(&limits(), &["name"], "name").unwrap();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM teams t");
        clause.push_to(&mut qb, "t");
        assert_eq!(
            qb.sql(),
            "SELECT * FROM teams t ORDER BY t.\"name\" DESC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn sort_by_swaps_only_the_named_column() {
        let query = ListQuery {
            order: Some("priority desc, title".to_string()),
            ..Default::default()
        };
        let clause = query
            .resolve_with(&limits(), &["priority", "title"], "title")
            .unwrap()
            .sort_by("priority", "priority_rank");
        assert_eq!(clause.order[0].column, "priority_rank");
        assert_eq!(clause.order[0].sort, SortDirection::Desc);
        assert_eq!(clause.order[1].column, "title");
    }
}
