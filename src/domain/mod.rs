//! Catalog domain: the herb entity, its price type, validation and paging rules.

pub mod filters;
pub mod herb;
pub mod price;
pub mod validator;
