use std::collections::HashMap;

/// Static bijection between configured field names, their wire-protocol
/// aliases, and dense counter-vector indices.
///
/// The schema is loaded once at startup and is immutable for the process
/// lifetime; it fixes the cardinality and ordering of every counter vector
/// in the table.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    names: Vec<String>,
    index_by_name: HashMap<String, usize>,
    index_by_alias: HashMap<String, usize>,
}

impl FieldSchema {
    /// Builds a schema from parallel name/alias lists.
    ///
    /// Fails if either list is empty, the lengths differ, or any name or
    /// alias repeats.
    pub fn new(names: &[String], aliases: &[String]) -> std::result::Result<Self, String> {
        if names.is_empty() {
            return Err("at least one counter field must be configured".to_string());
        }
        if names.len() != aliases.len() {
            return Err(format!(
                "{} field names but {} aliases configured",
                names.len(),
                aliases.len()
            ));
        }

        let mut index_by_name = HashMap::with_capacity(names.len());
        let mut index_by_alias = HashMap::with_capacity(aliases.len());
        for (index, (name, alias)) in names.iter().zip(aliases).enumerate() {
            if name.is_empty() || alias.is_empty() {
                return Err("field names and aliases must be non-empty".to_string());
            }
            if index_by_name.insert(name.clone(), index).is_some() {
                return Err(format!("duplicate field name: {name}"));
            }
            if index_by_alias.insert(alias.clone(), index).is_some() {
                return Err(format!("duplicate field alias: {alias}"));
            }
        }

        Ok(Self {
            names: names.to_vec(),
            index_by_name,
            index_by_alias,
        })
    }

    /// Number of configured fields; the cardinality of every counter vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Field names in vector order.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Resolves a full field name to its vector index.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    /// Resolves a wire-protocol alias to its vector index.
    #[inline]
    pub fn index_of_alias(&self, alias: &str) -> Option<usize> {
        self.index_by_alias.get(alias).copied()
    }
}
