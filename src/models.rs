//! Core entity records served by the query engine.
//!
//! Every collection record carries a numeric identifier assigned at creation
//! and never reused, optional descriptive-metadata fields (`meta_title`,
//! `meta_description`, `meta_keywords`), and ISO8601 timestamps. List-valued
//! fields are stored as JSON text and deserialized on read; a malformed
//! stored list does not fail the whole record — it yields an empty list and
//! populates `decode_error` so callers can see the data-integrity fault.

use serde::Serialize;
use serde_json::Value;

/// Singleton record: the owner's landing profile.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i64,
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
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

/// Singleton record: background story and values.
#[derive(Debug, Clone, Serialize)]
pub struct About {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub bio_text: String,
    pub bio_text_2: Option<String>,
    pub values: Value,
    pub background_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub level: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub icon_url: Option<String>,
    pub color: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
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
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Experience {
    pub id: i64,
    pub company: String,
    pub role: String,
    pub duration: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub company_logo: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Education {
    pub id: i64,
    pub institution: String,
    pub degree: String,
    pub period: String,
    pub description: String,
    pub highlights_title: Option<String>,
    pub highlights: Vec<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub institution_logo: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Certification {
    pub id: i64,
    pub title: String,
    pub issuer: String,
    pub color: Option<String>,
    pub certificate_image: Option<String>,
    pub issued_date: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Contribution {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub project_name: Option<String>,
    pub issuer: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub link: Option<String>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

/// Singleton record: contact channels and social links.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: i64,
    pub contact_items: Value,
    pub social_links: Value,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

/// Auxiliary image/file attached to any other entity kind via
/// `related_type` + `related_id`.
#[derive(Debug, Clone, Serialize)]
pub struct Media {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub mime_type: Option<String>,
    pub size: Option<String>,
    pub related_type: String,
    pub related_id: Option<String>,
    pub alt_text: Option<String>,
    pub created_at: String,
}

/// One type-tagged result from the cross-entity union search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

// ============ List field decoding ============

/// Deserialize a JSON string-list column. A malformed value records a
/// field-level fault in `error` and returns an empty list — the record is
/// still served.
pub(crate) fn decode_list(raw: Option<String>, field: &str, error: &mut Option<String>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(field, %e, "malformed stored list");
            note_decode_error(field, error);
            Vec::new()
        }
    }
}

/// Deserialize a free-form JSON column (objects-in-list fields like
/// `about.values` or `contact.social_links`).
pub(crate) fn decode_json(raw: Option<String>, field: &str, error: &mut Option<String>) -> Value {
    let Some(raw) = raw else {
        return Value::Null;
    };
    if raw.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(field, %e, "malformed stored json");
            note_decode_error(field, error);
            Value::Null
        }
    }
}

fn note_decode_error(field: &str, error: &mut Option<String>) {
    let msg = format!("malformed list field: {}", field);
    match error {
        Some(existing) => {
            existing.push_str(", ");
            existing.push_str(&msg);
        }
        None => *error = Some(msg),
    }
}

/// Serialize a string list for storage. Round trip with [`decode_list`]
/// preserves order and contents exactly.
pub(crate) fn encode_list(list: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(list)
}

pub(crate) fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_round_trip() {
        let list = vec![
            "React.js".to_string(),
            "Node.js".to_string(),
            "PostgreSQL".to_string(),
        ];
        let encoded = encode_list(&list).unwrap();
        let mut error = None;
        let decoded = decode_list(Some(encoded), "technologies", &mut error);
        assert_eq!(decoded, list);
        assert!(error.is_none());
    }

    #[test]
    fn malformed_list_reports_field_error() {
        let mut error = None;
        let decoded = decode_list(Some("[broken".to_string()), "technologies", &mut error);
        assert!(decoded.is_empty());
        assert_eq!(
            error.as_deref(),
            Some("malformed list field: technologies")
        );
    }

    #[test]
    fn multiple_faults_accumulate() {
        let mut error = None;
        decode_list(Some("{".to_string()), "technologies", &mut error);
        decode_json(Some("]".to_string()), "images", &mut error);
        let msg = error.unwrap();
        assert!(msg.contains("technologies"));
        assert!(msg.contains("images"));
    }

    #[test]
    fn empty_and_missing_are_not_faults() {
        let mut error = None;
        assert!(decode_list(None, "technologies", &mut error).is_empty());
        assert!(decode_list(Some(String::new()), "technologies", &mut error).is_empty());
        assert!(error.is_none());
    }

    #[test]
    fn timestamps_render_iso() {
        assert_eq!(format_ts_iso(0), "1970-01-01T00:00:00Z");
    }
}
