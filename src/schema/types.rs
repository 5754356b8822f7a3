use serde::Serialize;

/// Column data type used when creating a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub col_type: ColumnType,
    pub nullable: bool,
}

impl Column {
    /// Create an optional (nullable) column
    pub fn new(name: impl Into<String>, col_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            col_type,
            nullable: true,
        }
    }

    /// Create a required (non-nullable) column
    pub fn required(name: impl Into<String>, col_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            col_type,
            nullable: false,
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Vec<&'static str>,
}

impl TableSchema {
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// An indicator that passed the allow-list check
///
/// Only values of this type reach the SQL builders, so every identifier
/// interpolated into a query is a column the store actually has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Indicator {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    label: String,
}

impl Indicator {
    pub(crate) fn new(name: String, description: Option<String>) -> Self {
        let label = match &description {
            Some(text) => text.clone(),
            None => humanize(&name),
        };
        Self {
            name,
            description,
            label,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Display label: the dictionary description, else a prettified name
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Dictionary entry mapping an indicator name to its description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryEntry {
    pub name: String,
    pub description: String,
}

impl DictionaryEntry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// `total_desastres` -> `Total desastres`
pub fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("total_desastres"), "Total desastres");
        assert_eq!(humanize("PIB_per_capita"), "Pib per capita");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_label_prefers_description() {
        let with = Indicator::new("pib".into(), Some("Produto interno bruto".into()));
        assert_eq!(with.label(), "Produto interno bruto");

        let without = Indicator::new("total_desastres".into(), None);
        assert_eq!(without.label(), "Total desastres");
        assert_eq!(without.description(), None);
    }
}
