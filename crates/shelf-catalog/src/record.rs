//! Flat string records and the immutable catalog that holds them.

use serde::Serialize;
use std::collections::BTreeMap;

/// Conventional field names of a library catalog row.
pub mod fields {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const AUTHOR: &str = "author";
    pub const YEAR: &str = "year";
    pub const CATEGORY: &str = "category";
    pub const TYPE: &str = "type";
    pub const TAGS: &str = "tags";
    pub const DESCRIPTION: &str = "description";
    pub const THUMBNAIL_URL: &str = "thumbnail_url";
    pub const DOWNLOAD_URL: &str = "download_url";
}

/// A single catalog row keyed by header name.
///
/// Every value is an opaque string. Missing fields read as `""` so consumers
/// never have to special-case sparse sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Value of `field`, or `""` when the row has no such column.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn id(&self) -> &str {
        self.get(fields::ID)
    }

    pub fn title(&self) -> &str {
        self.get(fields::TITLE)
    }

    pub fn author(&self) -> &str {
        self.get(fields::AUTHOR)
    }

    pub fn year(&self) -> &str {
        self.get(fields::YEAR)
    }

    pub fn tags(&self) -> &str {
        self.get(fields::TAGS)
    }

    pub fn description(&self) -> &str {
        self.get(fields::DESCRIPTION)
    }

    pub fn thumbnail_url(&self) -> &str {
        self.get(fields::THUMBNAIL_URL)
    }

    pub fn download_url(&self) -> &str {
        self.get(fields::DOWNLOAD_URL)
    }

    /// Tags split on commas and trimmed. An empty tags field yields no chips.
    pub fn tag_list(&self) -> Vec<&str> {
        let tags = self.tags();
        if tags.trim().is_empty() {
            return Vec::new();
        }
        tags.split(',').map(str::trim).collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Ordered, load-once sequence of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    records: Vec<Record>,
}

impl Catalog {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// First record whose `id` equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }
}

impl FromIterator<Record> for Catalog {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_missing_fields_read_as_empty() {
        let r = record(&[("title", "Alpha")]);
        assert_eq!(r.title(), "Alpha");
        assert_eq!(r.author(), "");
        assert_eq!(r.get("nonexistent"), "");
        assert!(!r.contains("author"));
    }

    #[test]
    fn test_tag_list() {
        let r = record(&[("tags", "fantasy, adventure ,  epic")]);
        assert_eq!(r.tag_list(), vec!["fantasy", "adventure", "epic"]);

        let r = record(&[("tags", "solo")]);
        assert_eq!(r.tag_list(), vec!["solo"]);

        let r = record(&[("tags", "   ")]);
        assert!(r.tag_list().is_empty());

        let r = record(&[("title", "No tags")]);
        assert!(r.tag_list().is_empty());
    }

    #[test]
    fn test_find_by_id() {
        let catalog: Catalog = vec![
            record(&[("id", "a"), ("title", "First")]),
            record(&[("id", "b"), ("title", "Second")]),
            record(&[("id", "b"), ("title", "Duplicate")]),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.find_by_id("b").map(Record::title), Some("Second"));
        assert!(catalog.find_by_id("zzz").is_none());
    }
}
