//! The herb entity and its validation rules.

use crate::domain::price::Price;
use crate::domain::validator::{unique, Checker};
use chrono::{DateTime, Utc};

pub const MAX_TEXT_BYTES: usize = 500;
pub const MAX_CULINARY_USES: usize = 5;

/// A persisted herb row.
#[derive(Debug, Clone, PartialEq)]
pub struct Herb {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub culinary_uses: Vec<String>,
    /// Starts at 1 and is bumped by every successful update.
    pub version: i32,
}

/// Client-supplied fields of a herb that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewHerb {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub culinary_uses: Vec<String>,
}

/// A partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HerbPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub culinary_uses: Option<Vec<String>>,
}

impl HerbPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.culinary_uses.is_none()
    }

    /// Merges the supplied fields into `herb`. Identity and version are never touched.
    pub fn apply_to(self, herb: &mut Herb) {
        if let Some(name) = self.name {
            herb.name = name;
        }
        if let Some(description) = self.description {
            herb.description = description;
        }
        if let Some(price) = self.price {
            herb.price = price;
        }
        if let Some(uses) = self.culinary_uses {
            herb.culinary_uses = uses;
        }
    }
}

/// Borrowed view over the mutable fields, shared by [`Herb`] and [`NewHerb`].
pub struct HerbFields<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: Price,
    pub culinary_uses: &'a [String],
}

impl<'a> From<&'a Herb> for HerbFields<'a> {
    fn from(h: &'a Herb) -> Self {
        HerbFields {
            name: &h.name,
            description: &h.description,
            price: h.price,
            culinary_uses: &h.culinary_uses,
        }
    }
}

impl<'a> From<&'a NewHerb> for HerbFields<'a> {
    fn from(h: &'a NewHerb) -> Self {
        HerbFields {
            name: &h.name,
            description: &h.description,
            price: h.price,
            culinary_uses: &h.culinary_uses,
        }
    }
}

pub fn validate_herb<'a, C: Checker>(v: &mut C, herb: impl Into<HerbFields<'a>>) {
    let herb = herb.into();

    v.check(!herb.name.is_empty(), "name", "must be provided");
    v.check(
        herb.name.len() <= MAX_TEXT_BYTES,
        "name",
        "must not be more than 500 bytes long",
    );

    v.check(!herb.description.is_empty(), "description", "must be provided");
    v.check(
        herb.description.len() <= MAX_TEXT_BYTES,
        "description",
        "must not be more than 500 bytes long",
    );

    v.check(!herb.price.is_zero(), "price", "must be provided");
    v.check(herb.price.is_positive(), "price", "must be greater than zero");

    v.check(
        !herb.culinary_uses.is_empty(),
        "culinary_uses",
        "must contain at least 1 use",
    );
    v.check(
        herb.culinary_uses.len() <= MAX_CULINARY_USES,
        "culinary_uses",
        "must not contain more than 5 uses",
    );
    v.check(
        unique(herb.culinary_uses),
        "culinary_uses",
        "must not contain duplicate values",
    );
}
