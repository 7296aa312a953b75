//! Key-value data source port.

use crate::domain::frame::Column;
use std::collections::{BTreeMap, HashMap};

/// Anything that can look up a named column.
pub trait DataSource {
    fn get(&self, name: &str) -> Option<&Column>;

    /// Column names, in source order where the source has one.
    fn names(&self) -> Vec<String>;
}

impl DataSource for HashMap<String, Column> {
    fn get(&self, name: &str) -> Option<&Column> {
        HashMap::get(self, name)
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.keys().cloned().collect();
        names.sort();
        names
    }
}

impl DataSource for BTreeMap<String, Column> {
    fn get(&self, name: &str) -> Option<&Column> {
        BTreeMap::get(self, name)
    }

    fn names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}
