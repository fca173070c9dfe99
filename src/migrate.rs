use sqlx::SqlitePool;

use crate::error::Error;

/// Create all entity tables. Idempotent — safe to run on every `init`.
///
/// Collection tables use `INTEGER PRIMARY KEY AUTOINCREMENT` so numeric
/// identifiers are never reused within an entity kind, even after deletes.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profile (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            greeting TEXT NOT NULL DEFAULT 'Hello, I''m',
            name TEXT NOT NULL,
            tagline TEXT NOT NULL,
            typed_roles TEXT NOT NULL DEFAULT '[]',
            bio TEXT NOT NULL,
            profile_image TEXT,
            cv_link TEXT,
            github_link TEXT,
            linkedin_link TEXT,
            email TEXT,
            phone TEXT,
            meta_title TEXT,
            meta_description TEXT,
            meta_keywords TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS about (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL DEFAULT 'About Me',
            subtitle TEXT NOT NULL,
            bio_text TEXT NOT NULL,
            bio_text_2 TEXT,
            "values" TEXT NOT NULL DEFAULT '[]',
            background_image TEXT,
            meta_title TEXT,
            meta_description TEXT,
            meta_keywords TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            level TEXT,
            description TEXT,
            icon TEXT,
            icon_url TEXT,
            color TEXT DEFAULT 'primary',
            meta_title TEXT,
            meta_description TEXT,
            meta_keywords TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            technologies TEXT NOT NULL DEFAULT '[]',
            category TEXT,
            live_demo TEXT,
            github_link TEXT,
            featured INTEGER NOT NULL DEFAULT 0,
            color TEXT DEFAULT 'primary',
            image TEXT,
            images TEXT,
            meta_title TEXT,
            meta_description TEXT,
            meta_keywords TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS experience (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company TEXT NOT NULL,
            role TEXT NOT NULL,
            duration TEXT NOT NULL,
            description TEXT NOT NULL,
            tech_stack TEXT NOT NULL DEFAULT '[]',
            icon TEXT DEFAULT 'fas fa-briefcase',
            color TEXT DEFAULT 'primary',
            company_logo TEXT,
            meta_title TEXT,
            meta_description TEXT,
            meta_keywords TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS education (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            institution TEXT NOT NULL,
            degree TEXT NOT NULL,
            period TEXT NOT NULL,
            description TEXT NOT NULL,
            highlights_title TEXT,
            highlights TEXT NOT NULL DEFAULT '[]',
            icon TEXT DEFAULT 'fas fa-university',
            color TEXT DEFAULT 'primary',
            institution_logo TEXT,
            meta_title TEXT,
            meta_description TEXT,
            meta_keywords TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS certifications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            issuer TEXT NOT NULL,
            color TEXT DEFAULT 'primary',
            certificate_image TEXT,
            issued_date TEXT,
            meta_title TEXT,
            meta_description TEXT,
            meta_keywords TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contributions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            project_name TEXT,
            issuer TEXT,
            type TEXT NOT NULL,
            link TEXT,
            image TEXT,
            images TEXT,
            meta_title TEXT,
            meta_description TEXT,
            meta_keywords TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contact (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contact_items TEXT NOT NULL DEFAULT '[]',
            social_links TEXT NOT NULL DEFAULT '[]',
            meta_title TEXT,
            meta_description TEXT,
            meta_keywords TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS media (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL,
            url TEXT NOT NULL,
            mime_type TEXT,
            size TEXT,
            related_type TEXT NOT NULL,
            related_id TEXT,
            alt_text TEXT,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_skills_category ON skills(category)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_projects_category ON projects(category)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_projects_featured ON projects(featured)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contributions_type ON contributions(type)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_media_related ON media(related_type, related_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
