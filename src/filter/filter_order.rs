use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `"created_at desc, name"` against a column whitelist
    pub fn parse(order: &str, allowed: &[&str]) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in order.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            let Some(column) = it.next() else { continue };
            if !allowed.contains(&column) {
                return Err(FilterError::InvalidColumn(column.to_string()));
            }
            let sort = match it.next() {
                None => SortDirection::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                Some(dir) => return Err(FilterError::InvalidDirection(dir.to_string())),
            };
            if let Some(extra) = it.next() {
                return Err(FilterError::InvalidDirection(extra.to_string()));
            }
            out.push(FilterOrderInfo {
                column: column.to_string(),
                sort,
            });
        }
        Ok(out)
    }

    /// Render an ORDER BY clause; `alias` qualifies each column when non-empty
    pub fn generate(infos: &[FilterOrderInfo], alias: &str) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| {
                if alias.is_empty() {
                    format!("\"{}\" {}", i.column, i.sort.to_sql())
                } else {
                    format!("{}.\"{}\" {}", alias, i.column, i.sort.to_sql())
                }
            })
            .collect();
        format!(" ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[&str] = &["name", "created_at"];

    #[test]
    fn parses_columns_and_directions() {
        let infos = FilterOrder::parse("created_at desc, name", ALLOWED).unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].sort, SortDirection::Desc);
        assert_eq!(infos[1].sort, SortDirection::Asc);
        assert_eq!(
            FilterOrder::generate(&infos, "t"),
            " ORDER BY t.\"created_at\" DESC, t.\"name\" ASC"
        );
    }

    #[test]
    fn rejects_columns_outside_whitelist() {
        assert!(matches!(
            FilterOrder::parse("password_hash", ALLOWED),
            Err(FilterError::InvalidColumn(_))
        ));
        assert!(matches!(
            FilterOrder::parse("name; DROP TABLE users", ALLOWED),
            Err(FilterError::InvalidColumn(_))
        ));
    }

    #[test]
    fn rejects_unknown_direction() {
        assert!(matches!(
            FilterOrder::parse("name sideways", ALLOWED),
            Err(FilterError::InvalidDirection(_))
        ));
    }

    #[test]
    fn empty_order_renders_nothing() {
        let infos = FilterOrder::parse(" , ", ALLOWED).unwrap();
        assert!(infos.is_empty());
        assert_eq!(FilterOrder::generate(&infos, ""), "");
    }
}
