//! Response shaping: the stable external envelope wrapped around raw
//! entity rows.
//!
//! Collection reads produce `{ data, pagination?, seo }`; singleton and
//! single-record reads produce `{ data, seo }`. The `seo` block is total —
//! every field is defaulted from the entity's display name and the owner's
//! name when the underlying record carries no metadata, so downstream
//! consumers never need null-checks.

use serde::Serialize;
use std::collections::BTreeMap;

/// Descriptive-metadata triple attached to every response.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Seo {
    pub title: String,
    pub description: String,
    pub keywords: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// Envelope for collection reads. `pagination` is omitted when the caller
/// asked for the full collection (no limit, or the `limit >= 100` escape
/// hatch).
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T: Serialize> {
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(rename = "categoryCounts", skip_serializing_if = "Option::is_none")]
    pub category_counts: Option<BTreeMap<String, i64>>,
    pub seo: Seo,
}

/// Envelope for singleton and single-record reads. A missing singleton is
/// `data: null`, never a malformed body.
#[derive(Debug, Clone, Serialize)]
pub struct Single<T: Serialize> {
    pub data: Option<T>,
    pub seo: Seo,
}

/// Build the descriptive-metadata block, defaulting every missing field
/// from the entity display name and owner name.
pub fn build_seo(
    meta_title: Option<&str>,
    meta_description: Option<&str>,
    meta_keywords: Option<&str>,
    section: &str,
    owner: &str,
) -> Seo {
    Seo {
        title: meta_title
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} | {}", section, owner)),
        description: meta_description.map(str::to_string).unwrap_or_else(|| {
            format!(
                "Learn more about my {} and professional journey.",
                section.to_lowercase()
            )
        }),
        keywords: meta_keywords.unwrap_or("").to_string(),
    }
}

/// Compute the pagination block. Invariants: `total_pages =
/// ceil(total/limit)`, `has_next_page = page < total_pages`,
/// `has_prev_page = page > 1`.
pub fn paginate(page: i64, limit: i64, total: i64) -> Pagination {
    let total_pages = if limit > 0 {
        (total + limit - 1) / limit
    } else {
        1
    };
    Pagination {
        page,
        limit,
        total,
        total_pages,
        has_next_page: page < total_pages,
        has_prev_page: page > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_invariants_hold() {
        for total in 0..40 {
            for limit in 1..12 {
                let expected_pages = (total + limit - 1) / limit;
                for page in 1..=expected_pages.max(1) {
                    let p = paginate(page, limit, total);
                    assert!(p.total >= 0);
                    assert_eq!(p.total_pages, expected_pages);
                    assert_eq!(p.has_next_page, page < expected_pages);
                    assert_eq!(p.has_prev_page, page > 1);
                }
            }
        }
    }

    #[test]
    fn pagination_exact_division() {
        let p = paginate(2, 5, 10);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn pagination_empty_collection() {
        let p = paginate(1, 9, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
        assert!(!p.has_prev_page);
    }

    #[test]
    fn seo_defaults_are_total() {
        let seo = build_seo(None, None, None, "Projects", "Jordan Reyes");
        assert_eq!(seo.title, "Projects | Jordan Reyes");
        assert_eq!(
            seo.description,
            "Learn more about my projects and professional journey."
        );
        assert_eq!(seo.keywords, "");
    }

    #[test]
    fn seo_prefers_stored_metadata() {
        let seo = build_seo(
            Some("Custom Title"),
            Some("Custom description."),
            Some("a, b"),
            "Projects",
            "Jordan Reyes",
        );
        assert_eq!(seo.title, "Custom Title");
        assert_eq!(seo.description, "Custom description.");
        assert_eq!(seo.keywords, "a, b");
    }
}
