//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct, the page envelope returned to
//! callers and helpers to normalize inputs.

use serde::Serialize;

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults and convert to `u64`
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }

    /// Build from query parameters. A present, non-empty `not_paginator`
    /// turns paging off and yields `None`.
    pub fn from_query(page: Option<u32>, per_page: Option<u32>, not_paginator: Option<&str>) -> Option<Self> {
        if not_paginator.is_some_and(|v| !v.trim().is_empty()) {
            return None;
        }
        let d = Self::default();
        Some(Self { page: page.unwrap_or(d.page), per_page: per_page.unwrap_or(d.per_page) })
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub page: u64,
    pub per_page: u64,
    pub results: Vec<T>,
}

/// Listing result: a bare array when paging is off, otherwise a page.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Listed<T> {
    All(Vec<T>),
    Paged(Page<T>),
}

impl<T> Listed<T> {
    pub fn len(&self) -> usize {
        match self {
            Listed::All(items) => items.len(),
            Listed::Paged(page) => page.results.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listed::All(items) => items,
            Listed::Paged(page) => page.results,
        }
    }
}
