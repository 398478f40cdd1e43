//! Field-level validation accumulator.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Field key → message for every rule that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (key, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", key, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Something that can record a keyed failure and report whether any were recorded.
///
/// Domain rules (`validate_herb`, `Filters::validate`) are written against this
/// trait so a different strategy can be swapped in without touching them.
pub trait Checker {
    /// Records `message` under `key`. Only the first message per key is kept.
    fn add_error(&mut self, key: &str, message: &str);

    fn valid(&self) -> bool;

    fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_error(key, message);
        }
    }
}

/// Map-backed [`Checker`].
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    /// `Ok(())` when nothing was recorded, the full error map otherwise.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.valid() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl Checker for Validator {
    fn add_error(&mut self, key: &str, message: &str) {
        self.errors
            .0
            .entry(key.to_string())
            .or_insert_with(|| message.to_string());
    }

    fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// True when `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq + ?Sized>(value: &T, permitted: &[&T]) -> bool {
    permitted.iter().any(|p| *p == value)
}

/// True when every element of `values` is distinct.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_message_per_key() {
        let mut v = Validator::new();
        v.check(false, "name", "must be provided");
        v.check(false, "name", "must not be more than 500 bytes long");
        assert!(!v.valid());
        assert_eq!(v.errors().get("name"), Some("must be provided"));
        assert_eq!(v.errors().len(), 1);
    }

    #[test]
    fn passing_checks_record_nothing() {
        let mut v = Validator::new();
        v.check(true, "name", "must be provided");
        assert!(v.valid());
        assert!(v.finish().is_ok());
    }

    #[test]
    fn errors_serialize_as_flat_map() {
        let mut v = Validator::new();
        v.add_error("page", "must be greater than zero");
        v.add_error("sort", "invalid sort value");
        let json = serde_json::to_value(v.into_errors()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "page": "must be greater than zero",
                "sort": "invalid sort value"
            })
        );
    }

    #[test]
    fn unique_and_permitted() {
        assert!(unique(&["a", "b", "c"]));
        assert!(!unique(&["a", "b", "a"]));
        assert!(unique::<String>(&[]));
        assert!(permitted_value("id", &["id", "-id"]));
        assert!(!permitted_value("secret", &["id", "-id"]));
    }
}
