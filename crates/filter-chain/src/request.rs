//! The inbound side of one search: parameters and the caller.

use chrono::{Local, NaiveDateTime};

/// Ordered, multi-valued string parameters with query-string semantics.
///
/// Keys keep the order of their first appearance; repeated keys collect
/// their values in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    entries: Vec<(String, Vec<String>)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, value)` pairs, e.g. a decoded query string.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.append(key, value);
        }
        params
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// Every value for `key`, empty if absent.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One search request as seen by filters.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub params: SearchParams,
    /// Resolved caller identity, `None` for anonymous callers.
    pub caller: Option<String>,
    /// Local wall-clock time the request is evaluated at.
    pub now: NaiveDateTime,
}

impl SearchRequest {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            caller: None,
            now: Local::now().naive_local(),
        }
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    /// Pin the evaluation time.
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }
}

/// Query-string truthiness: `true`, `1`, `yes`, `on` (any case).
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_keys_collect_values() {
        let params = SearchParams::from_pairs([
            ("type", "study_room"),
            ("capacity", "4"),
            ("type", "lab"),
        ]);

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("type"), Some("study_room"));
        assert_eq!(params.get_all("type"), ["study_room", "lab"]);
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["type", "capacity"]);
        assert!(params.get_all("missing").is_empty());
        assert!(!params.contains("missing"));
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy("True"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn test_request_builder() {
        let now = chrono::NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let request = SearchRequest::new(SearchParams::new())
            .with_caller("javerage")
            .at(now);
        assert_eq!(request.caller.as_deref(), Some("javerage"));
        assert_eq!(request.now, now);
    }
}
