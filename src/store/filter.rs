//! Scan filters: a conjunction of simple predicates over document fields.

/// Document fields a filter can look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Kind,
    TarotResult,
    Phone,
}

impl Field {
    /// JSON path of the field inside a stored body.
    pub fn json_path(self) -> &'static str {
        match self {
            Field::Id => "$.id",
            Field::Kind => "$.kind",
            Field::TarotResult => "$.tarot_result",
            Field::Phone => "$.phone",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Eq(Field, String),
    NotEq(Field, String),
    Defined(Field),
}

/// All predicates must hold. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: Field, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Eq(field, value.into()));
        self
    }

    pub fn not_eq(mut self, field: Field, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::NotEq(field, value.into()));
        self
    }

    pub fn defined(mut self, field: Field) -> Self {
        self.predicates.push(Predicate::Defined(field));
        self
    }

    /// The partition this filter is confined to, if any. Partition key == id.
    pub fn partition(&self) -> Option<&str> {
        self.predicates.iter().find_map(|p| match p {
            Predicate::Eq(Field::Id, value) => Some(value.as_str()),
            _ => None,
        })
    }

    /// Render as a SQL `WHERE` body plus positional parameters.
    ///
    /// `id` maps to the key column, everything else is read out of the JSON
    /// body. `NotEq` on a missing field does not match, same as `Eq`.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        if self.predicates.is_empty() {
            return ("1".to_string(), Vec::new());
        }

        let mut clauses = Vec::with_capacity(self.predicates.len());
        let mut params = Vec::new();
        for predicate in &self.predicates {
            match predicate {
                Predicate::Eq(field, value) => {
                    params.push(value.clone());
                    clauses.push(format!("{} = ?{}", column(*field), params.len()));
                }
                Predicate::NotEq(field, value) => {
                    params.push(value.clone());
                    clauses.push(format!("{} != ?{}", column(*field), params.len()));
                }
                Predicate::Defined(field) => {
                    clauses.push(format!("{} IS NOT NULL", column(*field)));
                }
            }
        }
        (clauses.join(" AND "), params)
    }
}

fn column(field: Field) -> String {
    match field {
        Field::Id => "id".to_string(),
        other => format!("json_extract(body, '{}')", other.json_path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_all() {
        let (sql, params) = Filter::new().to_sql();
        assert_eq!(sql, "1");
        assert!(params.is_empty());
    }

    #[test]
    fn match_query_sql() {
        let filter = Filter::new()
            .eq(Field::TarotResult, "You drew: The Fool")
            .not_eq(Field::Id, "tarot_analysis:1")
            .defined(Field::Phone);
        let (sql, params) = filter.to_sql();
        assert_eq!(
            sql,
            "json_extract(body, '$.tarot_result') = ?1 AND id != ?2 \
             AND json_extract(body, '$.phone') IS NOT NULL"
        );
        assert_eq!(params, vec!["You drew: The Fool", "tarot_analysis:1"]);
    }

    #[test]
    fn partition_from_id_eq() {
        let filter = Filter::new().eq(Field::Kind, "keyword").eq(Field::Id, "rust");
        assert_eq!(filter.partition(), Some("rust"));
    }

    #[test]
    fn not_eq_id_does_not_pin_partition() {
        let filter = Filter::new().not_eq(Field::Id, "rust");
        assert_eq!(filter.partition(), None);
    }
}
