//! Free-text search helpers shared by the listing filters.

use sea_orm::sea_query::LikeExpr;

const ESCAPE: char = '|';

/// Split a free-text query on whitespace and commas, lower-cased.
pub fn terms(search: &str) -> Vec<String> {
    search
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// `%term%` with the LIKE wildcards in `term` matched literally.
pub fn contains(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape(term))).escape(ESCAPE)
}

fn escape(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | ESCAPE) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}
