//! In-memory list filters.
//!
//! Lists are fetched whole; screens narrow them locally by case-insensitive substring
//! match. An empty needle matches everything.

use crate::models::{Client, User};

/// Anything that exposes a last name and DNI for filtering.
pub trait Filterable {
    fn last_name(&self) -> &str;
    fn dni(&self) -> Option<&str>;
}

impl Filterable for User {
    fn last_name(&self) -> &str {
        &self.last_name
    }

    fn dni(&self) -> Option<&str> {
        self.dni.as_deref()
    }
}

impl Filterable for Client {
    fn last_name(&self) -> &str {
        &self.last_name
    }

    fn dni(&self) -> Option<&str> {
        self.dni.as_deref()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_last_name<T: Filterable>(item: &T, needle: &str) -> bool {
    contains_ci(item.last_name(), needle.trim())
}

fn matches_dni<T: Filterable>(item: &T, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || item.dni().is_some_and(|d| d.contains(needle))
}

pub fn filter_by_last_name<'a, T: Filterable>(items: &'a [T], needle: &str) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| matches_last_name(*item, needle))
        .collect()
}

pub fn filter_by_dni<'a, T: Filterable>(items: &'a [T], needle: &str) -> Vec<&'a T> {
    items.iter().filter(|item| matches_dni(*item, needle)).collect()
}

/// Both filters at once; either needle may be empty.
pub fn filter_items<'a, T: Filterable>(
    items: &'a [T],
    last_name: &str,
    dni: &str,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| matches_last_name(*item, last_name) && matches_dni(*item, dni))
        .collect()
}
