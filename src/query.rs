//! Query/filter/pagination engine.
//!
//! Turns ambiguous request parameters (free-text search, classification
//! filters, pagination, boolean flags) into deterministic, bounded result
//! sets for each entity kind. Filters combine conjunctively; a missing
//! filter set paginates the full ordered collection; `limit >= 100` is the
//! full-dump escape hatch and returns everything without a pagination
//! block. Parameter faults are rejected here, before any store access.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::envelope::{build_seo, paginate, Listing, Single};
use crate::error::Error;
use crate::models::{
    About, Certification, Contact, Contribution, Education, Experience, Media, Profile, Project,
    SearchHit, Skill,
};
use crate::store::{ContributionFilter, PageWindow, ProjectFilter, Store};

/// Limits at or above this threshold mean "return the entire collection".
pub const FULL_DUMP_LIMIT: i64 = 100;

pub const DEFAULT_PROJECT_LIMIT: i64 = 10;
pub const DEFAULT_PAGE_LIMIT: i64 = 9;

/// Optional request parameters shared across the collection read paths.
/// Each operation honors only its documented subset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub featured: Option<bool>,
    pub related_type: Option<String>,
    pub related_id: Option<String>,
}

/// How a listing should be bounded once parameters are validated.
enum Bound {
    /// Return everything; no pagination block in the envelope.
    All,
    /// Return one page of the given size.
    Paged(i64),
}

fn validated_page(params: &ListParams) -> Result<i64, Error> {
    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(Error::Validation(format!("page must be >= 1, got {}", page)));
    }
    Ok(page)
}

/// Resolve the effective bound from the request limit and the entity's
/// default. `None` default means lookup-style entities that return all
/// rows when unpaginated.
fn resolve_bound(limit: Option<i64>, default_limit: Option<i64>) -> Result<Bound, Error> {
    let effective = match limit {
        Some(l) if l < 1 => {
            return Err(Error::Validation(format!("limit must be >= 1, got {}", l)))
        }
        Some(l) => Some(l),
        None => default_limit,
    };
    Ok(match effective {
        Some(l) if l >= FULL_DUMP_LIMIT => Bound::All,
        Some(l) => Bound::Paged(l),
        None => Bound::All,
    })
}

fn window_for(bound: &Bound, page: i64) -> Option<PageWindow> {
    match bound {
        Bound::All => None,
        Bound::Paged(limit) => Some(PageWindow {
            limit: *limit,
            offset: (page - 1) * limit,
        }),
    }
}

/// Trimmed non-empty search term, or nothing.
fn search_term(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Classification filter value. `"All"` means no filter.
fn classifier(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
        .map(str::to_string)
}

// ═══════════════════════════════════════════════════════════════════════
// Singletons
// ═══════════════════════════════════════════════════════════════════════

pub async fn profile(store: &Store, owner: &str) -> Result<Single<Profile>, Error> {
    let data = store.profile().await?;
    let seo = seo_from(
        data.as_ref()
            .map(|p| (&p.meta_title, &p.meta_description, &p.meta_keywords)),
        "Home",
        owner,
    );
    Ok(Single { data, seo })
}

pub async fn about(store: &Store, owner: &str) -> Result<Single<About>, Error> {
    let data = store.about().await?;
    let seo = seo_from(
        data.as_ref()
            .map(|a| (&a.meta_title, &a.meta_description, &a.meta_keywords)),
        "About",
        owner,
    );
    Ok(Single { data, seo })
}

pub async fn contact(store: &Store, owner: &str) -> Result<Single<Contact>, Error> {
    let data = store.contact().await?;
    let seo = seo_from(
        data.as_ref()
            .map(|c| (&c.meta_title, &c.meta_description, &c.meta_keywords)),
        "Contact",
        owner,
    );
    Ok(Single { data, seo })
}

// ═══════════════════════════════════════════════════════════════════════
// Collections
// ═══════════════════════════════════════════════════════════════════════

pub async fn skills(
    store: &Store,
    owner: &str,
    params: &ListParams,
) -> Result<Listing<Skill>, Error> {
    let page = validated_page(params)?;
    let search = search_term(&params.search);
    // Skills are a lookup-style entity: without an explicit limit the full
    // collection comes back.
    let bound = resolve_bound(params.limit, None)?;

    let total = store.count_skills(search.as_deref()).await?;
    let data = store
        .list_skills(search.as_deref(), window_for(&bound, page))
        .await?;

    // Category breakdown accompanies the unfiltered paginated listing.
    let category_counts = match (&bound, &search) {
        (Bound::Paged(_), None) => Some(bucket_categories(store.skill_category_counts().await?)),
        _ => None,
    };

    Ok(Listing {
        data,
        pagination: match bound {
            Bound::All => None,
            Bound::Paged(limit) => Some(paginate(page, limit, total)),
        },
        category_counts,
        seo: build_seo(None, None, None, "Skills", owner),
    })
}

pub async fn projects(
    store: &Store,
    owner: &str,
    params: &ListParams,
) -> Result<Listing<Project>, Error> {
    let page = validated_page(params)?;
    let filter = ProjectFilter {
        search: search_term(&params.search),
        category: classifier(&params.category),
        featured: params.featured,
    };
    let bound = resolve_bound(params.limit, Some(DEFAULT_PROJECT_LIMIT))?;

    let total = store.count_projects(&filter).await?;
    let data = store.list_projects(&filter, window_for(&bound, page)).await?;

    Ok(Listing {
        data,
        pagination: match bound {
            Bound::All => None,
            Bound::Paged(limit) => Some(paginate(page, limit, total)),
        },
        category_counts: None,
        seo: build_seo(None, None, None, "Projects", owner),
    })
}

/// Featured projects, most recent first. The website hero strip.
pub async fn featured_projects(store: &Store) -> Result<Vec<Project>, Error> {
    store
        .list_projects(
            &ProjectFilter {
                featured: Some(true),
                ..Default::default()
            },
            None,
        )
        .await
}

pub async fn experience(
    store: &Store,
    owner: &str,
    params: &ListParams,
) -> Result<Listing<Experience>, Error> {
    let page = validated_page(params)?;
    let bound = resolve_bound(params.limit, Some(DEFAULT_PAGE_LIMIT))?;
    let total = store.count_experience().await?;
    let data = store.list_experience(window_for(&bound, page)).await?;
    Ok(Listing {
        data,
        pagination: match bound {
            Bound::All => None,
            Bound::Paged(limit) => Some(paginate(page, limit, total)),
        },
        category_counts: None,
        seo: build_seo(None, None, None, "Experience", owner),
    })
}

pub async fn education(
    store: &Store,
    owner: &str,
    params: &ListParams,
) -> Result<Listing<Education>, Error> {
    let page = validated_page(params)?;
    let bound = resolve_bound(params.limit, Some(DEFAULT_PAGE_LIMIT))?;
    let total = store.count_education().await?;
    let data = store.list_education(window_for(&bound, page)).await?;
    Ok(Listing {
        data,
        pagination: match bound {
            Bound::All => None,
            Bound::Paged(limit) => Some(paginate(page, limit, total)),
        },
        category_counts: None,
        seo: build_seo(None, None, None, "Education", owner),
    })
}

pub async fn certifications(store: &Store, owner: &str) -> Result<Listing<Certification>, Error> {
    let data = store.list_certifications().await?;
    Ok(Listing {
        data,
        pagination: None,
        category_counts: None,
        seo: build_seo(None, None, None, "Certifications", owner),
    })
}

pub async fn contributions(
    store: &Store,
    owner: &str,
    params: &ListParams,
) -> Result<Listing<Contribution>, Error> {
    let page = validated_page(params)?;
    let filter = ContributionFilter {
        search: search_term(&params.search),
        kind: classifier(&params.kind),
    };
    let bound = resolve_bound(params.limit, Some(DEFAULT_PAGE_LIMIT))?;
    let total = store.count_contributions(&filter).await?;
    let data = store
        .list_contributions(&filter, window_for(&bound, page))
        .await?;
    Ok(Listing {
        data,
        pagination: match bound {
            Bound::All => None,
            Bound::Paged(limit) => Some(paginate(page, limit, total)),
        },
        category_counts: None,
        seo: build_seo(None, None, None, "Contributions", owner),
    })
}

pub async fn media(store: &Store, params: &ListParams) -> Result<Vec<Media>, Error> {
    store
        .list_media(params.related_type.as_deref(), params.related_id.as_deref())
        .await
}

// ═══════════════════════════════════════════════════════════════════════
// Single-record lookups
// ═══════════════════════════════════════════════════════════════════════

pub async fn skill_by_id(store: &Store, owner: &str, id: i64) -> Result<Single<Skill>, Error> {
    let record = store.skill_by_id(id).await?.ok_or(Error::NotFound("skill"))?;
    let seo = build_seo(
        record.meta_title.as_deref(),
        record.meta_description.as_deref(),
        record.meta_keywords.as_deref(),
        "Skills",
        owner,
    );
    Ok(Single {
        data: Some(record),
        seo,
    })
}

pub async fn project_by_id(store: &Store, owner: &str, id: i64) -> Result<Single<Project>, Error> {
    let record = store
        .project_by_id(id)
        .await?
        .ok_or(Error::NotFound("project"))?;
    let seo = build_seo(
        record.meta_title.as_deref(),
        record.meta_description.as_deref(),
        record.meta_keywords.as_deref(),
        "Projects",
        owner,
    );
    Ok(Single {
        data: Some(record),
        seo,
    })
}

/// Single-project lookup by exact id or fuzzy title match (most recent
/// wins). Supplying neither is a parameter fault.
pub async fn project_lookup(
    store: &Store,
    id: Option<i64>,
    title: Option<&str>,
) -> Result<Option<Project>, Error> {
    match (id, title) {
        (Some(id), _) => store.project_by_id(id).await,
        (None, Some(title)) if !title.trim().is_empty() => store.project_by_title(title).await,
        _ => Err(Error::Validation(
            "either project_id or project_title is required".to_string(),
        )),
    }
}

pub async fn experience_by_id(
    store: &Store,
    owner: &str,
    id: i64,
) -> Result<Single<Experience>, Error> {
    let record = store
        .experience_by_id(id)
        .await?
        .ok_or(Error::NotFound("experience"))?;
    let seo = build_seo(
        record.meta_title.as_deref(),
        record.meta_description.as_deref(),
        record.meta_keywords.as_deref(),
        "Experience",
        owner,
    );
    Ok(Single {
        data: Some(record),
        seo,
    })
}

pub async fn education_by_id(
    store: &Store,
    owner: &str,
    id: i64,
) -> Result<Single<Education>, Error> {
    let record = store
        .education_by_id(id)
        .await?
        .ok_or(Error::NotFound("education"))?;
    let seo = build_seo(
        record.meta_title.as_deref(),
        record.meta_description.as_deref(),
        record.meta_keywords.as_deref(),
        "Education",
        owner,
    );
    Ok(Single {
        data: Some(record),
        seo,
    })
}

pub async fn contribution_by_id(
    store: &Store,
    owner: &str,
    id: i64,
) -> Result<Single<Contribution>, Error> {
    let record = store
        .contribution_by_id(id)
        .await?
        .ok_or(Error::NotFound("contribution"))?;
    let seo = build_seo(
        record.meta_title.as_deref(),
        record.meta_description.as_deref(),
        record.meta_keywords.as_deref(),
        "Contributions",
        owner,
    );
    Ok(Single {
        data: Some(record),
        seo,
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Cross-entity search
// ═══════════════════════════════════════════════════════════════════════

pub async fn portfolio_search(store: &Store, query: &str) -> Result<Vec<SearchHit>, Error> {
    if query.trim().is_empty() {
        return Err(Error::Validation("query must not be empty".to_string()));
    }
    store.union_search(query.trim()).await
}

// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════

fn seo_from(
    meta: Option<(&Option<String>, &Option<String>, &Option<String>)>,
    section: &str,
    owner: &str,
) -> crate::envelope::Seo {
    match meta {
        Some((title, description, keywords)) => build_seo(
            title.as_deref(),
            description.as_deref(),
            keywords.as_deref(),
            section,
            owner,
        ),
        None => build_seo(None, None, None, section, owner),
    }
}

/// Collapse raw per-category counts into the fixed stat buckets the
/// website renders.
fn bucket_categories(raw: Vec<(String, i64)>) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::from([
        ("frontend".to_string(), 0),
        ("backend".to_string(), 0),
        ("tools".to_string(), 0),
        ("ai-ml".to_string(), 0),
        ("devops".to_string(), 0),
    ]);
    for (category, n) in raw {
        let cat = category.to_lowercase();
        let bucket = if cat.contains("frontend") {
            "frontend"
        } else if cat.contains("backend") {
            "backend"
        } else if cat.contains("ai") || cat.contains("ml") {
            "ai-ml"
        } else if cat.contains("devops") {
            "devops"
        } else if cat.contains("tools") {
            "tools"
        } else {
            continue;
        };
        *counts.get_mut(bucket).unwrap() += n;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_defaults_to_all_for_lookup_entities() {
        assert!(matches!(resolve_bound(None, None).unwrap(), Bound::All));
    }

    #[test]
    fn bound_uses_entity_default() {
        match resolve_bound(None, Some(9)).unwrap() {
            Bound::Paged(l) => assert_eq!(l, 9),
            Bound::All => panic!("expected paged bound"),
        }
    }

    #[test]
    fn bound_escape_hatch_at_one_hundred() {
        assert!(matches!(
            resolve_bound(Some(100), Some(10)).unwrap(),
            Bound::All
        ));
        assert!(matches!(
            resolve_bound(Some(250), Some(10)).unwrap(),
            Bound::All
        ));
        assert!(matches!(
            resolve_bound(Some(99), Some(10)).unwrap(),
            Bound::Paged(99)
        ));
    }

    #[test]
    fn bound_rejects_nonpositive_limit() {
        assert!(resolve_bound(Some(0), Some(10)).is_err());
        assert!(resolve_bound(Some(-3), None).is_err());
    }

    #[test]
    fn page_rejects_nonpositive() {
        let params = ListParams {
            page: Some(0),
            ..Default::default()
        };
        assert!(validated_page(&params).is_err());
    }

    #[test]
    fn classifier_treats_all_as_unset() {
        assert_eq!(classifier(&Some("All".to_string())), None);
        assert_eq!(classifier(&Some("all".to_string())), None);
        assert_eq!(
            classifier(&Some("AI Platform".to_string())),
            Some("AI Platform".to_string())
        );
        assert_eq!(classifier(&Some("  ".to_string())), None);
    }

    #[test]
    fn window_offsets_are_one_based() {
        let bound = Bound::Paged(10);
        let w = window_for(&bound, 3).unwrap();
        assert_eq!(w.limit, 10);
        assert_eq!(w.offset, 20);
    }

    #[test]
    fn category_buckets_use_substring_matching() {
        let counts = bucket_categories(vec![
            ("Frontend Engineering".to_string(), 5),
            ("Backend Engineering".to_string(), 4),
            ("Agentic AI & AI Systems".to_string(), 3),
            ("Tools & DevOps".to_string(), 2),
            ("Design".to_string(), 7),
        ]);
        assert_eq!(counts["frontend"], 5);
        assert_eq!(counts["backend"], 4);
        assert_eq!(counts["ai-ml"], 3);
        // "Tools & DevOps" hits the devops bucket before tools
        assert_eq!(counts["devops"], 2);
        assert_eq!(counts["tools"], 0);
    }
}
