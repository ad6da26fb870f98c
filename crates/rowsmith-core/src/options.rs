use std::collections::HashMap;

use crate::value::Value;

/// Options controlling how a row is generated or retrieved.
///
/// Column lookups are case-insensitive: keys are stored lowercased.
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    /// The schema/database name; detected from the connection when absent.
    pub database: Option<String>,
    /// Explicit values for columns that would otherwise be synthesized.
    pub column_values: HashMap<String, Value>,
    /// Known keys for foreign-key columns that would otherwise be resolved
    /// by creating a row in the referenced table.
    pub foreign_keys: HashMap<String, Value>,
    /// Seed for the pseudo-random source; a fresh one is drawn when unset.
    pub random_seed: Option<u64>,
    /// Create a row even if one already exists.
    pub force_create: bool,
    /// Also populate nullable and defaulted columns.
    pub force_populate_optional_columns: bool,
    /// Value used for Url or Link named columns.
    pub default_url: String,
    /// Domain appended to Email named columns.
    pub default_email_domain: String,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            database: None,
            column_values: HashMap::new(),
            foreign_keys: HashMap::new(),
            random_seed: None,
            force_create: false,
            force_populate_optional_columns: false,
            default_url: "https://www.wikipedia.org/".to_string(),
            default_email_domain: "@mailinator.com".to_string(),
        }
    }
}

impl SynthesisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_column_value(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.column_values
            .insert(column.to_lowercase(), value.into());
        self
    }

    pub fn with_foreign_key(mut self, column: &str, key: impl Into<Value>) -> Self {
        self.foreign_keys.insert(column.to_lowercase(), key.into());
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn force_create(mut self) -> Self {
        self.force_create = true;
        self
    }

    pub fn force_populate_optional_columns(mut self) -> Self {
        self.force_populate_optional_columns = true;
        self
    }

    pub fn column_value(&self, column: &str) -> Option<&Value> {
        self.column_values.get(&column.to_lowercase())
    }

    pub fn foreign_key(&self, column: &str) -> Option<&Value> {
        self.foreign_keys.get(&column.to_lowercase())
    }

    /// Options passed to a recursive resolution of a referenced table:
    /// per-column overrides apply only to the table they were written for
    /// and are not inherited.
    pub fn nested(&self, force_populate_optional_columns: bool) -> Self {
        Self {
            database: self.database.clone(),
            column_values: HashMap::new(),
            foreign_keys: HashMap::new(),
            random_seed: self.random_seed,
            force_create: self.force_create,
            force_populate_optional_columns,
            default_url: self.default_url.clone(),
            default_email_domain: self.default_email_domain.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_case_insensitive() {
        let options = SynthesisOptions::new()
            .with_column_value("UserName", "smith")
            .with_foreign_key("OrgId", 12_i64);

        assert_eq!(
            options.column_value("username"),
            Some(&Value::Text("smith".to_string()))
        );
        assert_eq!(options.foreign_key("orgid"), Some(&Value::Int(12)));
        assert!(options.column_value("other").is_none());
    }

    #[test]
    fn nested_options_drop_overrides_but_keep_mode() {
        let options = SynthesisOptions::new()
            .with_column_value("Name", "x")
            .with_foreign_key("UserId", 1_i64)
            .with_random_seed(9)
            .force_create();

        let nested = options.nested(true);
        assert!(nested.column_values.is_empty());
        assert!(nested.foreign_keys.is_empty());
        assert_eq!(nested.random_seed, Some(9));
        assert!(nested.force_create);
        assert!(nested.force_populate_optional_columns);

        let suppressed = options.nested(false);
        assert!(!suppressed.force_populate_optional_columns);
    }
}
