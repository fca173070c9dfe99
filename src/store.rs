//! Entity store adapter.
//!
//! Uniform read access to the ten entity kinds behind parametrized query
//! functions, hiding the SQLite layout from the query engine and the tool
//! registry. Search filters are case-insensitive substring matches over a
//! fixed, entity-specific column set; classification filters are exact
//! matches; collections order most-recent-id-first unless stated otherwise.
//!
//! The write surface (`insert_*`, singleton `upsert_*`) exists for seeding,
//! admin-side collaborators, and tests — the public query API never writes.

use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::error::Error;
use crate::models::{
    decode_json, decode_list, encode_list, format_ts_iso, About, Certification, Contact,
    Contribution, Education, Experience, Media, Profile, Project, SearchHit, Skill,
};

/// Maximum number of hits returned by [`Store::union_search`].
pub const UNION_SEARCH_CAP: usize = 10;

/// Fixed entity-kind priority for union search ordering.
const UNION_KIND_PRIORITY: [&str; 4] = ["project", "skill", "experience", "contribution"];

/// A LIMIT/OFFSET window for paginated reads. `None` means "all rows".
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ContributionFilter {
    pub search: Option<String>,
    pub kind: Option<String>,
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open the pooled SQLite connection described by the config.
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let pool = db::connect(config).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ═══════════════════════════════════════════════════════════════════
    // Singletons (most recent row is the current record)
    // ═══════════════════════════════════════════════════════════════════

    pub async fn profile(&self) -> Result<Option<Profile>, Error> {
        let row = sqlx::query("SELECT * FROM profile ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| profile_from_row(&r)))
    }

    pub async fn about(&self) -> Result<Option<About>, Error> {
        let row = sqlx::query("SELECT * FROM about ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| about_from_row(&r)))
    }

    pub async fn contact(&self) -> Result<Option<Contact>, Error> {
        let row = sqlx::query("SELECT * FROM contact ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| contact_from_row(&r)))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Skills
    // ═══════════════════════════════════════════════════════════════════

    pub async fn list_skills(
        &self,
        search: Option<&str>,
        window: Option<PageWindow>,
    ) -> Result<Vec<Skill>, Error> {
        let mut sql = String::from("SELECT * FROM skills");
        let mut binds = Vec::new();
        if let Some(term) = search {
            push_search_clause(
                &mut sql,
                &mut binds,
                &["name", "category", "description"],
                term,
            );
        }
        sql.push_str(" ORDER BY id DESC");
        push_window(&mut sql, window);

        let rows = bind_all(sqlx::query(&sql), &binds)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(skill_from_row).collect())
    }

    pub async fn count_skills(&self, search: Option<&str>) -> Result<i64, Error> {
        let mut sql = String::from("SELECT COUNT(*) FROM skills");
        let mut binds = Vec::new();
        if let Some(term) = search {
            push_search_clause(
                &mut sql,
                &mut binds,
                &["name", "category", "description"],
                term,
            );
        }
        let count = bind_all_scalar(sqlx::query_scalar(&sql), &binds)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn skill_by_id(&self, id: i64) -> Result<Option<Skill>, Error> {
        let row = sqlx::query("SELECT * FROM skills WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| skill_from_row(&r)))
    }

    /// Skills ordered by proficiency level (descending), optionally
    /// narrowed to categories containing `category`. Feeds the skills
    /// lookup tool and the recommended-stack synthesis.
    pub async fn skills_by_proficiency(
        &self,
        category: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<Skill>, Error> {
        let mut sql = String::from("SELECT * FROM skills");
        let mut binds = Vec::new();
        if let Some(cat) = category {
            sql.push_str(" WHERE LOWER(category) LIKE ?");
            binds.push(format!("%{}%", cat.to_lowercase()));
        }
        sql.push_str(" ORDER BY level DESC, id DESC");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        let rows = bind_all(sqlx::query(&sql), &binds)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(skill_from_row).collect())
    }

    pub async fn skill_category_counts(&self) -> Result<Vec<(String, i64)>, Error> {
        let rows = sqlx::query("SELECT category, COUNT(*) AS n FROM skills GROUP BY category")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|r| (r.get("category"), r.get("n")))
            .collect())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Projects
    // ═══════════════════════════════════════════════════════════════════

    pub async fn list_projects(
        &self,
        filter: &ProjectFilter,
        window: Option<PageWindow>,
    ) -> Result<Vec<Project>, Error> {
        let (mut sql, binds) = project_query("SELECT * FROM projects", filter);
        sql.push_str(" ORDER BY id DESC");
        push_window(&mut sql, window);

        let rows = bind_all(sqlx::query(&sql), &binds)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(project_from_row).collect())
    }

    pub async fn count_projects(&self, filter: &ProjectFilter) -> Result<i64, Error> {
        let (sql, binds) = project_query("SELECT COUNT(*) FROM projects", filter);
        let count = bind_all_scalar(sqlx::query_scalar(&sql), &binds)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn project_by_id(&self, id: i64) -> Result<Option<Project>, Error> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| project_from_row(&r)))
    }

    /// Fuzzy single-project lookup: the most recent title substring match.
    pub async fn project_by_title(&self, title: &str) -> Result<Option<Project>, Error> {
        let row =
            sqlx::query("SELECT * FROM projects WHERE LOWER(title) LIKE ? ORDER BY id DESC LIMIT 1")
                .bind(format!("%{}%", title.to_lowercase()))
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| project_from_row(&r)))
    }

    /// Project search used by the project-specific search tool: featured
    /// projects rank first, then most recent.
    pub async fn search_projects_ranked(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<Project>, Error> {
        let mut sql = String::from("SELECT * FROM projects");
        let mut binds = Vec::new();
        push_search_clause(
            &mut sql,
            &mut binds,
            &["title", "description", "technologies", "category"],
            query,
        );
        sql.push_str(&format!(
            " ORDER BY featured DESC, id DESC LIMIT {}",
            limit
        ));
        let rows = bind_all(sqlx::query(&sql), &binds)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(project_from_row).collect())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Experience / Education / Certifications
    // ═══════════════════════════════════════════════════════════════════

    pub async fn list_experience(
        &self,
        window: Option<PageWindow>,
    ) -> Result<Vec<Experience>, Error> {
        let mut sql = String::from("SELECT * FROM experience ORDER BY id DESC");
        push_window(&mut sql, window);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(experience_from_row).collect())
    }

    pub async fn count_experience(&self) -> Result<i64, Error> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM experience")
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn experience_by_id(&self, id: i64) -> Result<Option<Experience>, Error> {
        let row = sqlx::query("SELECT * FROM experience WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| experience_from_row(&r)))
    }

    pub async fn list_education(
        &self,
        window: Option<PageWindow>,
    ) -> Result<Vec<Education>, Error> {
        let mut sql = String::from("SELECT * FROM education ORDER BY id DESC");
        push_window(&mut sql, window);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(education_from_row).collect())
    }

    pub async fn count_education(&self) -> Result<i64, Error> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM education")
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn education_by_id(&self, id: i64) -> Result<Option<Education>, Error> {
        let row = sqlx::query("SELECT * FROM education WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| education_from_row(&r)))
    }

    /// Certifications list oldest-first — the one collection where the
    /// original display order is preserved.
    pub async fn list_certifications(&self) -> Result<Vec<Certification>, Error> {
        let rows = sqlx::query("SELECT * FROM certifications ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(certification_from_row).collect())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Contributions
    // ═══════════════════════════════════════════════════════════════════

    pub async fn list_contributions(
        &self,
        filter: &ContributionFilter,
        window: Option<PageWindow>,
    ) -> Result<Vec<Contribution>, Error> {
        let (mut sql, binds) = contribution_query("SELECT * FROM contributions", filter);
        sql.push_str(" ORDER BY id DESC");
        push_window(&mut sql, window);
        let rows = bind_all(sqlx::query(&sql), &binds)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(contribution_from_row).collect())
    }

    pub async fn count_contributions(&self, filter: &ContributionFilter) -> Result<i64, Error> {
        let (sql, binds) = contribution_query("SELECT COUNT(*) FROM contributions", filter);
        let count = bind_all_scalar(sqlx::query_scalar(&sql), &binds)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn contribution_by_id(&self, id: i64) -> Result<Option<Contribution>, Error> {
        let row = sqlx::query("SELECT * FROM contributions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| contribution_from_row(&r)))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Media
    // ═══════════════════════════════════════════════════════════════════

    pub async fn list_media(
        &self,
        related_type: Option<&str>,
        related_id: Option<&str>,
    ) -> Result<Vec<Media>, Error> {
        let mut sql = String::from("SELECT * FROM media");
        let mut binds = Vec::new();
        let mut clauses = Vec::new();
        if let Some(rt) = related_type {
            clauses.push("related_type = ?");
            binds.push(rt.to_string());
        }
        if let Some(rid) = related_id {
            clauses.push("related_id = ?");
            binds.push(rid.to_string());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        let rows = bind_all(sqlx::query(&sql), &binds)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(media_from_row).collect())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Union search
    // ═══════════════════════════════════════════════════════════════════

    /// Cross-entity search over projects, skills, experience, and
    /// contributions. Returns type-tagged hits capped at
    /// [`UNION_SEARCH_CAP`], ordered by fixed kind priority (project,
    /// skill, experience, contribution) with id-descending tie-break
    /// within a kind.
    pub async fn union_search(&self, query: &str) -> Result<Vec<SearchHit>, Error> {
        let like = format!("%{}%", query.to_lowercase());
        let mut hits = Vec::new();

        let rows = sqlx::query(
            "SELECT id, title, description FROM projects \
             WHERE LOWER(title) LIKE ? OR LOWER(description) LIKE ?",
        )
        .bind(&like)
        .bind(&like)
        .fetch_all(&self.pool)
        .await?;
        for r in &rows {
            hits.push(SearchHit {
                kind: "project".to_string(),
                id: r.get("id"),
                name: r.get("title"),
                description: r.get("description"),
            });
        }

        let rows = sqlx::query(
            "SELECT id, name, category FROM skills \
             WHERE LOWER(name) LIKE ? OR LOWER(category) LIKE ?",
        )
        .bind(&like)
        .bind(&like)
        .fetch_all(&self.pool)
        .await?;
        for r in &rows {
            hits.push(SearchHit {
                kind: "skill".to_string(),
                id: r.get("id"),
                name: r.get("name"),
                description: r.get("category"),
            });
        }

        let rows = sqlx::query(
            "SELECT id, company, role FROM experience \
             WHERE LOWER(company) LIKE ? OR LOWER(role) LIKE ?",
        )
        .bind(&like)
        .bind(&like)
        .fetch_all(&self.pool)
        .await?;
        for r in &rows {
            hits.push(SearchHit {
                kind: "experience".to_string(),
                id: r.get("id"),
                name: r.get("company"),
                description: r.get("role"),
            });
        }

        let rows = sqlx::query(
            "SELECT id, title, description FROM contributions \
             WHERE LOWER(title) LIKE ? OR LOWER(project_name) LIKE ?",
        )
        .bind(&like)
        .bind(&like)
        .fetch_all(&self.pool)
        .await?;
        for r in &rows {
            hits.push(SearchHit {
                kind: "contribution".to_string(),
                id: r.get("id"),
                name: r.get("title"),
                description: r.get("description"),
            });
        }

        Ok(rank_hits(hits))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Writes (seeding, admin collaborators, tests)
    // ═══════════════════════════════════════════════════════════════════

    /// Create-or-update the profile singleton. Existence is re-checked
    /// immediately before choosing update-vs-insert so the read contract
    /// holds under external writers.
    pub async fn upsert_profile(&self, input: &ProfileInput) -> Result<i64, Error> {
        let now = now_ts();
        let typed_roles = encode_list(&input.typed_roles)?;
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM profile ORDER BY id DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        if let Some(id) = existing {
            sqlx::query(
                "UPDATE profile SET greeting = ?, name = ?, tagline = ?, typed_roles = ?, \
                 bio = ?, profile_image = ?, cv_link = ?, github_link = ?, linkedin_link = ?, \
                 email = ?, phone = ?, meta_title = ?, meta_description = ?, meta_keywords = ?, \
                 updated_at = ? WHERE id = ?",
            )
            .bind(&input.greeting)
            .bind(&input.name)
            .bind(&input.tagline)
            .bind(&typed_roles)
            .bind(&input.bio)
            .bind(&input.profile_image)
            .bind(&input.cv_link)
            .bind(&input.github_link)
            .bind(&input.linkedin_link)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.meta.title)
            .bind(&input.meta.description)
            .bind(&input.meta.keywords)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
            Ok(id)
        } else {
            let result = sqlx::query(
                "INSERT INTO profile (greeting, name, tagline, typed_roles, bio, profile_image, \
                 cv_link, github_link, linkedin_link, email, phone, meta_title, meta_description, \
                 meta_keywords, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&input.greeting)
            .bind(&input.name)
            .bind(&input.tagline)
            .bind(&typed_roles)
            .bind(&input.bio)
            .bind(&input.profile_image)
            .bind(&input.cv_link)
            .bind(&input.github_link)
            .bind(&input.linkedin_link)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.meta.title)
            .bind(&input.meta.description)
            .bind(&input.meta.keywords)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
            Ok(result.last_insert_rowid())
        }
    }

    pub async fn upsert_about(&self, input: &AboutInput) -> Result<i64, Error> {
        let now = now_ts();
        let values = serde_json::to_string(&input.values)?;
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM about ORDER BY id DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        if let Some(id) = existing {
            sqlx::query(
                "UPDATE about SET title = ?, subtitle = ?, bio_text = ?, bio_text_2 = ?, \
                 \"values\" = ?, background_image = ?, meta_title = ?, meta_description = ?, \
                 meta_keywords = ?, updated_at = ? WHERE id = ?",
            )
            .bind(&input.title)
            .bind(&input.subtitle)
            .bind(&input.bio_text)
            .bind(&input.bio_text_2)
            .bind(&values)
            .bind(&input.background_image)
            .bind(&input.meta.title)
            .bind(&input.meta.description)
            .bind(&input.meta.keywords)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
            Ok(id)
        } else {
            let result = sqlx::query(
                "INSERT INTO about (title, subtitle, bio_text, bio_text_2, \"values\", \
                 background_image, meta_title, meta_description, meta_keywords, created_at, \
                 updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&input.title)
            .bind(&input.subtitle)
            .bind(&input.bio_text)
            .bind(&input.bio_text_2)
            .bind(&values)
            .bind(&input.background_image)
            .bind(&input.meta.title)
            .bind(&input.meta.description)
            .bind(&input.meta.keywords)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
            Ok(result.last_insert_rowid())
        }
    }

    pub async fn upsert_contact(&self, input: &ContactInput) -> Result<i64, Error> {
        let now = now_ts();
        let contact_items = serde_json::to_string(&input.contact_items)?;
        let social_links = serde_json::to_string(&input.social_links)?;
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM contact ORDER BY id DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        if let Some(id) = existing {
            sqlx::query(
                "UPDATE contact SET contact_items = ?, social_links = ?, meta_title = ?, \
                 meta_description = ?, meta_keywords = ?, updated_at = ? WHERE id = ?",
            )
            .bind(&contact_items)
            .bind(&social_links)
            .bind(&input.meta.title)
            .bind(&input.meta.description)
            .bind(&input.meta.keywords)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
            Ok(id)
        } else {
            let result = sqlx::query(
                "INSERT INTO contact (contact_items, social_links, meta_title, \
                 meta_description, meta_keywords, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&contact_items)
            .bind(&social_links)
            .bind(&input.meta.title)
            .bind(&input.meta.description)
            .bind(&input.meta.keywords)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
            Ok(result.last_insert_rowid())
        }
    }

    pub async fn insert_skill(&self, input: &SkillInput) -> Result<i64, Error> {
        let now = now_ts();
        let result = sqlx::query(
            "INSERT INTO skills (name, category, level, description, icon, icon_url, color, \
             meta_title, meta_description, meta_keywords, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.category)
        .bind(&input.level)
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.icon_url)
        .bind(&input.color)
        .bind(&input.meta.title)
        .bind(&input.meta.description)
        .bind(&input.meta.keywords)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_project(&self, input: &ProjectInput) -> Result<i64, Error> {
        let now = now_ts();
        let technologies = encode_list(&input.technologies)?;
        let images = encode_list(&input.images)?;
        let result = sqlx::query(
            "INSERT INTO projects (title, description, technologies, category, live_demo, \
             github_link, featured, color, image, images, meta_title, meta_description, \
             meta_keywords, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&technologies)
        .bind(&input.category)
        .bind(&input.live_demo)
        .bind(&input.github_link)
        .bind(input.featured)
        .bind(&input.color)
        .bind(&input.image)
        .bind(&images)
        .bind(&input.meta.title)
        .bind(&input.meta.description)
        .bind(&input.meta.keywords)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_experience(&self, input: &ExperienceInput) -> Result<i64, Error> {
        let now = now_ts();
        let tech_stack = encode_list(&input.tech_stack)?;
        let result = sqlx::query(
            "INSERT INTO experience (company, role, duration, description, tech_stack, icon, \
             color, company_logo, meta_title, meta_description, meta_keywords, created_at, \
             updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.company)
        .bind(&input.role)
        .bind(&input.duration)
        .bind(&input.description)
        .bind(&tech_stack)
        .bind(&input.icon)
        .bind(&input.color)
        .bind(&input.company_logo)
        .bind(&input.meta.title)
        .bind(&input.meta.description)
        .bind(&input.meta.keywords)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_education(&self, input: &EducationInput) -> Result<i64, Error> {
        let now = now_ts();
        let highlights = encode_list(&input.highlights)?;
        let result = sqlx::query(
            "INSERT INTO education (institution, degree, period, description, highlights_title, \
             highlights, icon, color, institution_logo, meta_title, meta_description, \
             meta_keywords, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.institution)
        .bind(&input.degree)
        .bind(&input.period)
        .bind(&input.description)
        .bind(&input.highlights_title)
        .bind(&highlights)
        .bind(&input.icon)
        .bind(&input.color)
        .bind(&input.institution_logo)
        .bind(&input.meta.title)
        .bind(&input.meta.description)
        .bind(&input.meta.keywords)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_certification(&self, input: &CertificationInput) -> Result<i64, Error> {
        let now = now_ts();
        let result = sqlx::query(
            "INSERT INTO certifications (title, issuer, color, certificate_image, issued_date, \
             meta_title, meta_description, meta_keywords, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.title)
        .bind(&input.issuer)
        .bind(&input.color)
        .bind(&input.certificate_image)
        .bind(&input.issued_date)
        .bind(&input.meta.title)
        .bind(&input.meta.description)
        .bind(&input.meta.keywords)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_contribution(&self, input: &ContributionInput) -> Result<i64, Error> {
        let now = now_ts();
        let images = encode_list(&input.images)?;
        let result = sqlx::query(
            "INSERT INTO contributions (title, description, project_name, issuer, type, link, \
             image, images, meta_title, meta_description, meta_keywords, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.project_name)
        .bind(&input.issuer)
        .bind(&input.kind)
        .bind(&input.link)
        .bind(&input.image)
        .bind(&images)
        .bind(&input.meta.title)
        .bind(&input.meta.description)
        .bind(&input.meta.keywords)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_media(&self, input: &MediaInput) -> Result<i64, Error> {
        let now = now_ts();
        let result = sqlx::query(
            "INSERT INTO media (type, url, mime_type, size, related_type, related_id, alt_text, \
             created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.kind)
        .bind(&input.url)
        .bind(&input.mime_type)
        .bind(&input.size)
        .bind(&input.related_type)
        .bind(&input.related_id)
        .bind(&input.alt_text)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub(crate) async fn table_is_empty(&self, table: &str) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count == 0)
    }
}

// ============ Write inputs ============

#[derive(Debug, Clone, Default)]
pub struct MetaInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub greeting: String,
    pub name: String,
    pub tagline: String,
    pub typed_roles: Vec<String>,
    pub bio: String,
    pub profile_image: Option<String>,
    pub cv_link: Option<String>,
    pub github_link: Option<String>,
    pub linkedin_link: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub meta: MetaInput,
}

#[derive(Debug, Clone, Default)]
pub struct AboutInput {
    pub title: String,
    pub subtitle: String,
    pub bio_text: String,
    pub bio_text_2: Option<String>,
    pub values: Value,
    pub background_image: Option<String>,
    pub meta: MetaInput,
}

#[derive(Debug, Clone, Default)]
pub struct ContactInput {
    pub contact_items: Value,
    pub social_links: Value,
    pub meta: MetaInput,
}

#[derive(Debug, Clone, Default)]
pub struct SkillInput {
    pub name: String,
    pub category: String,
    pub level: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub icon_url: Option<String>,
    pub color: Option<String>,
    pub meta: MetaInput,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectInput {
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub category: Option<String>,
    pub live_demo: Option<String>,
    pub github_link: Option<String>,
    pub featured: bool,
    pub color: Option<String>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub meta: MetaInput,
}

#[derive(Debug, Clone, Default)]
pub struct ExperienceInput {
    pub company: String,
    pub role: String,
    pub duration: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub company_logo: Option<String>,
    pub meta: MetaInput,
}

#[derive(Debug, Clone, Default)]
pub struct EducationInput {
    pub institution: String,
    pub degree: String,
    pub period: String,
    pub description: String,
    pub highlights_title: Option<String>,
    pub highlights: Vec<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub institution_logo: Option<String>,
    pub meta: MetaInput,
}

#[derive(Debug, Clone, Default)]
pub struct CertificationInput {
    pub title: String,
    pub issuer: String,
    pub color: Option<String>,
    pub certificate_image: Option<String>,
    pub issued_date: Option<String>,
    pub meta: MetaInput,
}

#[derive(Debug, Clone, Default)]
pub struct ContributionInput {
    pub title: String,
    pub description: String,
    pub project_name: Option<String>,
    pub issuer: Option<String>,
    pub kind: String,
    pub link: Option<String>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub meta: MetaInput,
}

#[derive(Debug, Clone, Default)]
pub struct MediaInput {
    pub kind: String,
    pub url: String,
    pub mime_type: Option<String>,
    pub size: Option<String>,
    pub related_type: String,
    pub related_id: Option<String>,
    pub alt_text: Option<String>,
}

// ============ Query building ============

fn push_search_clause(sql: &mut String, binds: &mut Vec<String>, columns: &[&str], term: &str) {
    let like = format!("%{}%", term.to_lowercase());
    let parts: Vec<String> = columns
        .iter()
        .map(|c| format!("LOWER({}) LIKE ?", c))
        .collect();
    let connector = if sql.contains(" WHERE ") { " AND " } else { " WHERE " };
    sql.push_str(connector);
    sql.push_str(&format!("({})", parts.join(" OR ")));
    for _ in columns {
        binds.push(like.clone());
    }
}

fn push_window(sql: &mut String, window: Option<PageWindow>) {
    if let Some(w) = window {
        sql.push_str(&format!(" LIMIT {} OFFSET {}", w.limit, w.offset));
    }
}

fn project_query(head: &str, filter: &ProjectFilter) -> (String, Vec<String>) {
    let mut sql = head.to_string();
    let mut binds = Vec::new();
    if let Some(featured) = filter.featured {
        sql.push_str(if featured {
            " WHERE featured = 1"
        } else {
            " WHERE featured = 0"
        });
    }
    if let Some(category) = &filter.category {
        let connector = if sql.contains(" WHERE ") { " AND " } else { " WHERE " };
        sql.push_str(connector);
        sql.push_str("category = ?");
        binds.push(category.clone());
    }
    if let Some(term) = &filter.search {
        push_search_clause(
            &mut sql,
            &mut binds,
            &["title", "description", "technologies", "category"],
            term,
        );
    }
    (sql, binds)
}

fn contribution_query(head: &str, filter: &ContributionFilter) -> (String, Vec<String>) {
    let mut sql = head.to_string();
    let mut binds = Vec::new();
    if let Some(kind) = &filter.kind {
        sql.push_str(" WHERE type = ?");
        binds.push(kind.clone());
    }
    if let Some(term) = &filter.search {
        push_search_clause(
            &mut sql,
            &mut binds,
            &["title", "description", "project_name", "issuer"],
            term,
        );
    }
    (sql, binds)
}

fn bind_all<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    binds: &'q [String],
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    let mut q = query;
    for b in binds {
        q = q.bind(b);
    }
    q
}

fn bind_all_scalar<'q, O>(
    query: sqlx::query::QueryScalar<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    binds: &'q [String],
) -> sqlx::query::QueryScalar<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
    let mut q = query;
    for b in binds {
        q = q.bind(b);
    }
    q
}

/// Order union-search hits by kind priority then id descending, then apply
/// the result cap.
fn rank_hits(mut hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let priority = |kind: &str| {
        UNION_KIND_PRIORITY
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(UNION_KIND_PRIORITY.len())
    };
    hits.sort_by(|a, b| {
        priority(&a.kind)
            .cmp(&priority(&b.kind))
            .then(b.id.cmp(&a.id))
    });
    hits.truncate(UNION_SEARCH_CAP);
    hits
}

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

// ============ Row mapping ============

fn meta_from_row(row: &SqliteRow) -> (Option<String>, Option<String>, Option<String>) {
    (
        row.get("meta_title"),
        row.get("meta_description"),
        row.get("meta_keywords"),
    )
}

fn profile_from_row(row: &SqliteRow) -> Profile {
    let mut decode_error = None;
    let typed_roles = decode_list(row.get("typed_roles"), "typed_roles", &mut decode_error);
    let (meta_title, meta_description, meta_keywords) = meta_from_row(row);
    Profile {
        id: row.get("id"),
        greeting: row.get("greeting"),
        name: row.get("name"),
        tagline: row.get("tagline"),
        typed_roles,
        bio: row.get("bio"),
        profile_image: row.get("profile_image"),
        cv_link: row.get("cv_link"),
        github_link: row.get("github_link"),
        linkedin_link: row.get("linkedin_link"),
        email: row.get("email"),
        phone: row.get("phone"),
        meta_title,
        meta_description,
        meta_keywords,
        created_at: format_ts_iso(row.get("created_at")),
        updated_at: format_ts_iso(row.get("updated_at")),
        decode_error,
    }
}

fn about_from_row(row: &SqliteRow) -> About {
    let mut decode_error = None;
    let values = decode_json(row.get("values"), "values", &mut decode_error);
    let (meta_title, meta_description, meta_keywords) = meta_from_row(row);
    About {
        id: row.get("id"),
        title: row.get("title"),
        subtitle: row.get("subtitle"),
        bio_text: row.get("bio_text"),
        bio_text_2: row.get("bio_text_2"),
        values,
        background_image: row.get("background_image"),
        meta_title,
        meta_description,
        meta_keywords,
        created_at: format_ts_iso(row.get("created_at")),
        updated_at: format_ts_iso(row.get("updated_at")),
        decode_error,
    }
}

fn contact_from_row(row: &SqliteRow) -> Contact {
    let mut decode_error = None;
    let contact_items = decode_json(row.get("contact_items"), "contact_items", &mut decode_error);
    let social_links = decode_json(row.get("social_links"), "social_links", &mut decode_error);
    let (meta_title, meta_description, meta_keywords) = meta_from_row(row);
    Contact {
        id: row.get("id"),
        contact_items,
        social_links,
        meta_title,
        meta_description,
        meta_keywords,
        created_at: format_ts_iso(row.get("created_at")),
        updated_at: format_ts_iso(row.get("updated_at")),
        decode_error,
    }
}

fn skill_from_row(row: &SqliteRow) -> Skill {
    let (meta_title, meta_description, meta_keywords) = meta_from_row(row);
    Skill {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        level: row.get("level"),
        description: row.get("description"),
        icon: row.get("icon"),
        icon_url: row.get("icon_url"),
        color: row.get("color"),
        meta_title,
        meta_description,
        meta_keywords,
        created_at: format_ts_iso(row.get("created_at")),
        updated_at: format_ts_iso(row.get("updated_at")),
    }
}

fn project_from_row(row: &SqliteRow) -> Project {
    let mut decode_error = None;
    let technologies = decode_list(row.get("technologies"), "technologies", &mut decode_error);
    let images = decode_list(row.get("images"), "images", &mut decode_error);
    let (meta_title, meta_description, meta_keywords) = meta_from_row(row);
    Project {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        technologies,
        category: row.get("category"),
        live_demo: row.get("live_demo"),
        github_link: row.get("github_link"),
        featured: row.get("featured"),
        color: row.get("color"),
        image: row.get("image"),
        images,
        meta_title,
        meta_description,
        meta_keywords,
        created_at: format_ts_iso(row.get("created_at")),
        updated_at: format_ts_iso(row.get("updated_at")),
        decode_error,
    }
}

fn experience_from_row(row: &SqliteRow) -> Experience {
    let mut decode_error = None;
    let tech_stack = decode_list(row.get("tech_stack"), "tech_stack", &mut decode_error);
    let (meta_title, meta_description, meta_keywords) = meta_from_row(row);
    Experience {
        id: row.get("id"),
        company: row.get("company"),
        role: row.get("role"),
        duration: row.get("duration"),
        description: row.get("description"),
        tech_stack,
        icon: row.get("icon"),
        color: row.get("color"),
        company_logo: row.get("company_logo"),
        meta_title,
        meta_description,
        meta_keywords,
        created_at: format_ts_iso(row.get("created_at")),
        updated_at: format_ts_iso(row.get("updated_at")),
        decode_error,
    }
}

fn education_from_row(row: &SqliteRow) -> Education {
    let mut decode_error = None;
    let highlights = decode_list(row.get("highlights"), "highlights", &mut decode_error);
    let (meta_title, meta_description, meta_keywords) = meta_from_row(row);
    Education {
        id: row.get("id"),
        institution: row.get("institution"),
        degree: row.get("degree"),
        period: row.get("period"),
        description: row.get("description"),
        highlights_title: row.get("highlights_title"),
        highlights,
        icon: row.get("icon"),
        color: row.get("color"),
        institution_logo: row.get("institution_logo"),
        meta_title,
        meta_description,
        meta_keywords,
        created_at: format_ts_iso(row.get("created_at")),
        updated_at: format_ts_iso(row.get("updated_at")),
        decode_error,
    }
}

fn certification_from_row(row: &SqliteRow) -> Certification {
    let (meta_title, meta_description, meta_keywords) = meta_from_row(row);
    Certification {
        id: row.get("id"),
        title: row.get("title"),
        issuer: row.get("issuer"),
        color: row.get("color"),
        certificate_image: row.get("certificate_image"),
        issued_date: row.get("issued_date"),
        meta_title,
        meta_description,
        meta_keywords,
        created_at: format_ts_iso(row.get("created_at")),
        updated_at: format_ts_iso(row.get("updated_at")),
    }
}

fn contribution_from_row(row: &SqliteRow) -> Contribution {
    let mut decode_error = None;
    let images = decode_list(row.get("images"), "images", &mut decode_error);
    let (meta_title, meta_description, meta_keywords) = meta_from_row(row);
    Contribution {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        project_name: row.get("project_name"),
        issuer: row.get("issuer"),
        kind: row.get("type"),
        link: row.get("link"),
        image: row.get("image"),
        images,
        meta_title,
        meta_description,
        meta_keywords,
        created_at: format_ts_iso(row.get("created_at")),
        updated_at: format_ts_iso(row.get("updated_at")),
        decode_error,
    }
}

fn media_from_row(row: &SqliteRow) -> Media {
    Media {
        id: row.get("id"),
        kind: row.get("type"),
        url: row.get("url"),
        mime_type: row.get("mime_type"),
        size: row.get("size"),
        related_type: row.get("related_type"),
        related_id: row.get("related_id"),
        alt_text: row.get("alt_text"),
        created_at: format_ts_iso(row.get("created_at")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(kind: &str, id: i64) -> SearchHit {
        SearchHit {
            kind: kind.to_string(),
            id,
            name: format!("{}-{}", kind, id),
            description: None,
        }
    }

    #[test]
    fn rank_hits_orders_by_kind_priority() {
        let hits = vec![
            hit("contribution", 9),
            hit("skill", 4),
            hit("project", 1),
            hit("experience", 2),
        ];
        let ranked = rank_hits(hits);
        let kinds: Vec<&str> = ranked.iter().map(|h| h.kind.as_str()).collect();
        assert_eq!(kinds, vec!["project", "skill", "experience", "contribution"]);
    }

    #[test]
    fn rank_hits_breaks_ties_by_id_descending() {
        let hits = vec![hit("skill", 3), hit("skill", 11), hit("skill", 7)];
        let ranked = rank_hits(hits);
        let ids: Vec<i64> = ranked.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![11, 7, 3]);
    }

    #[test]
    fn rank_hits_caps_results() {
        let hits: Vec<SearchHit> = (1..=15).map(|i| hit("project", i)).collect();
        let ranked = rank_hits(hits);
        assert_eq!(ranked.len(), UNION_SEARCH_CAP);
        assert_eq!(ranked[0].id, 15);
    }

    #[test]
    fn project_query_is_conjunctive() {
        let filter = ProjectFilter {
            search: Some("Agent".to_string()),
            category: Some("AI Platform".to_string()),
            featured: Some(true),
        };
        let (sql, binds) = project_query("SELECT * FROM projects", &filter);
        assert!(sql.contains("featured = 1"));
        assert!(sql.contains("category = ?"));
        assert!(sql.contains("AND"));
        // one bind for category, four for the search column set
        assert_eq!(binds.len(), 5);
        assert_eq!(binds[0], "AI Platform");
        assert!(binds[1..].iter().all(|b| b == "%agent%"));
    }

    #[test]
    fn contribution_query_without_filters_has_no_where() {
        let (sql, binds) = contribution_query("SELECT * FROM contributions", &Default::default());
        assert!(!sql.contains("WHERE"));
        assert!(binds.is_empty());
    }
}
