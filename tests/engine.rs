//! End-to-end tests over a throwaway SQLite database: seeding, the
//! query/filter/pagination engine, the tool registry, and the dispatch
//! loop with scripted decision providers.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use folio::agent::{
    respond, ChatMessage, Decision, DecisionProvider, FunctionCall, ToolCallRequest,
    FALLBACK_ANSWER,
};
use folio::config::{AgentConfig, Config, DbConfig, OwnerConfig, ServerConfig};
use folio::error::Error;
use folio::migrate::run_migrations;
use folio::query::{self, ListParams};
use folio::seed::run_seed;
use folio::store::{ProfileInput, Store};
use folio::tools::{dispatch, ToolContext, ToolRegistry};

const SEEDED_PROJECTS: usize = 5;
const SEEDED_SKILLS: usize = 14;

fn test_config(dir: &Path) -> Config {
    Config {
        db: DbConfig {
            path: dir.join("folio.sqlite"),
        },
        server: ServerConfig {
            bind: "127.0.0.1:0".to_string(),
        },
        owner: OwnerConfig {
            name: "Jordan Reyes".to_string(),
            email: "jordan@example.com".to_string(),
            headline: "an AI-first full-stack engineer".to_string(),
        },
        agent: AgentConfig::default(),
    }
}

async fn empty_store() -> (TempDir, Store, Config) {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let store = Store::connect(&config).await.unwrap();
    run_migrations(store.pool()).await.unwrap();
    (tmp, store, config)
}

async fn seeded_store() -> (TempDir, Store, Config) {
    let (tmp, store, config) = empty_store().await;
    run_seed(&store, &config).await.unwrap();
    (tmp, store, config)
}

fn params(patch: impl FnOnce(&mut ListParams)) -> ListParams {
    let mut p = ListParams::default();
    patch(&mut p);
    p
}

// ═══════════════════════════════════════════════════════════════════════
// Query engine
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn seeding_is_idempotent() {
    let (_tmp, store, config) = seeded_store().await;
    run_seed(&store, &config).await.unwrap();
    let listing = query::projects(&store, "Jordan Reyes", &ListParams::default())
        .await
        .unwrap();
    assert_eq!(
        listing.pagination.as_ref().unwrap().total,
        SEEDED_PROJECTS as i64
    );
}

#[tokio::test]
async fn pagination_envelope_math() {
    let (_tmp, store, _config) = seeded_store().await;
    let listing = query::projects(
        &store,
        "Jordan Reyes",
        &params(|p| {
            p.page = Some(2);
            p.limit = Some(2);
        }),
    )
    .await
    .unwrap();

    let pagination = listing.pagination.unwrap();
    assert_eq!(pagination.page, 2);
    assert_eq!(pagination.limit, 2);
    assert_eq!(pagination.total, SEEDED_PROJECTS as i64);
    assert_eq!(pagination.total_pages, 3);
    assert!(pagination.has_next_page);
    assert!(pagination.has_prev_page);
    assert_eq!(listing.data.len(), 2);
}

#[tokio::test]
async fn projects_order_most_recent_first() {
    let (_tmp, store, _config) = seeded_store().await;
    let listing = query::projects(&store, "Jordan Reyes", &ListParams::default())
        .await
        .unwrap();
    let ids: Vec<i64> = listing.data.iter().map(|p| p.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn project_filters_combine_conjunctively() {
    let (_tmp, store, _config) = seeded_store().await;

    let by_category = query::projects(
        &store,
        "Jordan Reyes",
        &params(|p| p.category = Some("AI Platform".to_string())),
    )
    .await
    .unwrap();
    assert_eq!(by_category.data.len(), 2);

    let by_search = query::projects(
        &store,
        "Jordan Reyes",
        &params(|p| p.search = Some("swarm".to_string())),
    )
    .await
    .unwrap();
    assert_eq!(by_search.data.len(), 1);

    let both = query::projects(
        &store,
        "Jordan Reyes",
        &params(|p| {
            p.category = Some("AI Platform".to_string());
            p.search = Some("swarm".to_string());
        }),
    )
    .await
    .unwrap();
    assert_eq!(both.data.len(), 1);
    assert_eq!(both.data[0].title, "Support Agent Swarm");

    let disjoint = query::projects(
        &store,
        "Jordan Reyes",
        &params(|p| {
            p.category = Some("Web Application".to_string());
            p.search = Some("swarm".to_string());
        }),
    )
    .await
    .unwrap();
    assert!(disjoint.data.is_empty());
    assert_eq!(disjoint.pagination.unwrap().total, 0);
}

#[tokio::test]
async fn category_all_means_no_filter() {
    let (_tmp, store, _config) = seeded_store().await;
    let listing = query::projects(
        &store,
        "Jordan Reyes",
        &params(|p| p.category = Some("All".to_string())),
    )
    .await
    .unwrap();
    assert_eq!(listing.data.len(), SEEDED_PROJECTS);
}

#[tokio::test]
async fn limit_one_hundred_is_a_full_dump() {
    let (_tmp, store, _config) = seeded_store().await;
    let listing = query::projects(
        &store,
        "Jordan Reyes",
        &params(|p| p.limit = Some(100)),
    )
    .await
    .unwrap();
    assert!(listing.pagination.is_none());
    assert_eq!(listing.data.len(), SEEDED_PROJECTS);
}

#[tokio::test]
async fn featured_filter_with_defaulted_seo() {
    let (_tmp, store, _config) = seeded_store().await;
    let listing = query::projects(
        &store,
        "Jordan Reyes",
        &params(|p| p.featured = Some(true)),
    )
    .await
    .unwrap();

    assert_eq!(listing.data.len(), 2);
    assert!(listing.data.iter().all(|p| p.featured));
    let ids: Vec<i64> = listing.data.iter().map(|p| p.id).collect();
    assert!(ids[0] > ids[1], "featured projects must be newest first");
    assert_eq!(listing.seo.title, "Projects | Jordan Reyes");

    let featured = query::featured_projects(&store).await.unwrap();
    assert_eq!(featured.len(), 2);
}

#[tokio::test]
async fn skills_return_everything_without_a_limit() {
    let (_tmp, store, _config) = seeded_store().await;
    let listing = query::skills(&store, "Jordan Reyes", &ListParams::default())
        .await
        .unwrap();
    assert!(listing.pagination.is_none());
    assert_eq!(listing.data.len(), SEEDED_SKILLS);
}

#[tokio::test]
async fn paginated_skills_carry_category_counts() {
    let (_tmp, store, _config) = seeded_store().await;
    let listing = query::skills(
        &store,
        "Jordan Reyes",
        &params(|p| p.limit = Some(5)),
    )
    .await
    .unwrap();

    assert_eq!(listing.data.len(), 5);
    assert_eq!(
        listing.pagination.as_ref().unwrap().total,
        SEEDED_SKILLS as i64
    );
    let counts = listing.category_counts.unwrap();
    assert_eq!(counts["frontend"], 3);
    assert_eq!(counts["backend"], 4);
    assert_eq!(counts["ai-ml"], 3);
    assert_eq!(counts["devops"], 3);
}

#[tokio::test]
async fn skills_search_filters_and_paginates() {
    let (_tmp, store, _config) = seeded_store().await;
    let listing = query::skills(
        &store,
        "Jordan Reyes",
        &params(|p| {
            p.search = Some("database".to_string());
            p.limit = Some(9);
        }),
    )
    .await
    .unwrap();
    // PostgreSQL and MongoDB match on description/category
    assert_eq!(listing.data.len(), 2);
    assert!(listing.category_counts.is_none());
}

#[tokio::test]
async fn contributions_type_filter() {
    let (_tmp, store, _config) = seeded_store().await;

    let docs = query::contributions(
        &store,
        "Jordan Reyes",
        &params(|p| p.kind = Some("Documentation".to_string())),
    )
    .await
    .unwrap();
    assert_eq!(docs.data.len(), 1);
    assert_eq!(docs.data[0].kind, "Documentation");

    let all = query::contributions(
        &store,
        "Jordan Reyes",
        &params(|p| p.kind = Some("All".to_string())),
    )
    .await
    .unwrap();
    assert_eq!(all.data.len(), 3);
}

#[tokio::test]
async fn certifications_keep_insertion_order() {
    let (_tmp, store, _config) = seeded_store().await;
    let listing = query::certifications(&store, "Jordan Reyes").await.unwrap();
    let ids: Vec<i64> = listing.data.iter().map(|c| c.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn media_filters_by_polymorphic_association() {
    let (_tmp, store, _config) = seeded_store().await;

    let attached = query::media(
        &store,
        &params(|p| p.related_type = Some("projects".to_string())),
    )
    .await
    .unwrap();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].related_type, "projects");

    let none = query::media(
        &store,
        &params(|p| p.related_type = Some("skills".to_string())),
    )
    .await
    .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn invalid_page_rejected_before_store_access() {
    let (_tmp, store, _config) = seeded_store().await;
    let err = query::projects(
        &store,
        "Jordan Reyes",
        &params(|p| p.page = Some(0)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

// ═══════════════════════════════════════════════════════════════════════
// Singletons & single-record lookups
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn seeded_profile_uses_stored_metadata() {
    let (_tmp, store, config) = seeded_store().await;
    let single = query::profile(&store, &config.owner.name).await.unwrap();
    let profile = single.data.unwrap();
    assert_eq!(profile.name, "Jordan Reyes");
    assert_eq!(profile.typed_roles.len(), 4);
    assert!(single.seo.title.starts_with("Jordan Reyes - "));
}

#[tokio::test]
async fn missing_singleton_is_null_with_defaulted_seo() {
    let (_tmp, store, _config) = empty_store().await;
    let single = query::profile(&store, "Jordan Reyes").await.unwrap();
    assert!(single.data.is_none());
    assert_eq!(single.seo.title, "Home | Jordan Reyes");

    let contact = query::contact(&store, "Jordan Reyes").await.unwrap();
    assert!(contact.data.is_none());
    assert_eq!(contact.seo.title, "Contact | Jordan Reyes");
}

#[tokio::test]
async fn fuzzy_project_lookup_returns_most_recent_match() {
    let (_tmp, store, _config) = seeded_store().await;

    let hit = query::project_lookup(&store, None, Some("agent platform"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.title, "AI Agent Platform");

    let miss = query::project_lookup(&store, None, Some("nonexistent"))
        .await
        .unwrap();
    assert!(miss.is_none());

    let err = query::project_lookup(&store, None, None).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn by_id_lookup_misses_are_not_found() {
    let (_tmp, store, _config) = seeded_store().await;
    let err = query::project_by_id(&store, "Jordan Reyes", 9999)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound("project")));
}

// ═══════════════════════════════════════════════════════════════════════
// Union search
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn union_search_spans_kinds_under_the_cap() {
    let (_tmp, store, _config) = seeded_store().await;
    let hits = query::portfolio_search(&store, "React").await.unwrap();

    assert!(hits.len() <= 10);
    let kinds: BTreeSet<&str> = hits.iter().map(|h| h.kind.as_str()).collect();
    assert!(kinds.len() >= 2, "expected hits in at least two kinds");
    assert_eq!(hits[0].kind, "project", "projects rank first");

    // within a kind, ids descend
    let project_ids: Vec<i64> = hits
        .iter()
        .filter(|h| h.kind == "project")
        .map(|h| h.id)
        .collect();
    let mut sorted = project_ids.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(project_ids, sorted);
}

#[tokio::test]
async fn union_search_rejects_empty_query() {
    let (_tmp, store, _config) = seeded_store().await;
    let err = query::portfolio_search(&store, "   ").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

// ═══════════════════════════════════════════════════════════════════════
// Store invariants
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn malformed_list_field_still_returns_the_record() {
    let (_tmp, store, _config) = seeded_store().await;

    sqlx::query("UPDATE projects SET technologies = '[broken' WHERE id = 1")
        .execute(store.pool())
        .await
        .unwrap();

    let project = store.project_by_id(1).await.unwrap().unwrap();
    assert!(project.technologies.is_empty());
    let fault = project.decode_error.unwrap();
    assert!(fault.contains("technologies"));
}

#[tokio::test]
async fn singleton_upsert_never_duplicates() {
    let (_tmp, store, _config) = empty_store().await;

    let mut input = ProfileInput {
        greeting: "Hello, I'm".to_string(),
        name: "Jordan Reyes".to_string(),
        tagline: "first tagline".to_string(),
        bio: "bio".to_string(),
        ..Default::default()
    };
    store.upsert_profile(&input).await.unwrap();
    input.tagline = "second tagline".to_string();
    store.upsert_profile(&input).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profile")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);

    let profile = store.profile().await.unwrap().unwrap();
    assert_eq!(profile.tagline, "second tagline");
}

#[tokio::test]
async fn identifiers_are_never_reused() {
    let (_tmp, store, _config) = seeded_store().await;

    let last_id: i64 = sqlx::query_scalar("SELECT MAX(id) FROM skills")
        .fetch_one(store.pool())
        .await
        .unwrap();
    sqlx::query("DELETE FROM skills WHERE id = ?")
        .bind(last_id)
        .execute(store.pool())
        .await
        .unwrap();

    let new_id = store
        .insert_skill(&folio::store::SkillInput {
            name: "Svelte".to_string(),
            category: "Frontend Engineering".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(new_id > last_id);
}

// ═══════════════════════════════════════════════════════════════════════
// Tool registry boundary
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn missing_required_parameter_fails_before_store_access() {
    // The database has no tables at all: if validation did not run first,
    // dispatch would surface a store error instead of a schema violation.
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let store = Store::connect(&config).await.unwrap();
    let registry = ToolRegistry::with_builtins();
    let ctx = ToolContext::new(store, Arc::new(config));

    let err = dispatch(&registry, &ctx, "search_portfolio", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ToolInvocation(_)));
    assert!(err.to_string().contains("query"));
}

#[tokio::test]
async fn undeclared_tools_are_rejected() {
    let (_tmp, store, config) = seeded_store().await;
    let registry = ToolRegistry::with_builtins();
    let ctx = ToolContext::new(store, Arc::new(config));

    let err = dispatch(&registry, &ctx, "run_raw_sql", &json!({ "sql": "DROP TABLE skills" }))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ToolInvocation(_)));
    assert!(err.to_string().contains("no tool registered"));
}

#[tokio::test]
async fn skills_tool_filters_by_category() {
    let (_tmp, store, config) = seeded_store().await;
    let registry = ToolRegistry::with_builtins();
    let ctx = ToolContext::new(store, Arc::new(config));

    let result = dispatch(
        &registry,
        &ctx,
        "get_skills",
        &json!({ "category": "Frontend" }),
    )
    .await
    .unwrap();
    let skills = result["skills"].as_array().unwrap();
    assert_eq!(skills.len(), 3);
    assert!(skills
        .iter()
        .all(|s| s["category"].as_str().unwrap().contains("Frontend")));
}

#[tokio::test]
async fn meeting_tool_formats_without_writing() {
    let (_tmp, store, config) = seeded_store().await;
    let registry = ToolRegistry::with_builtins();
    let ctx = ToolContext::new(store.clone(), Arc::new(config));

    let result = dispatch(
        &registry,
        &ctx,
        "schedule_meeting",
        &json!({ "topic": "Contract role", "name": "Sam" }),
    )
    .await
    .unwrap();
    assert_eq!(result["email"], "jordan@example.com");
    assert_eq!(result["subject"], "Meeting Request: Contract role");

    // no table holds meeting requests and no entity table grew
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, SEEDED_PROJECTS as i64);
}

// ═══════════════════════════════════════════════════════════════════════
// Dispatch loop
// ═══════════════════════════════════════════════════════════════════════

/// Pops a scripted decision per round and records every context it saw.
struct ScriptedProvider {
    decisions: Mutex<Vec<Decision>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    fn new(decisions: Vec<Decision>) -> Self {
        Self {
            decisions: Mutex::new(decisions),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DecisionProvider for ScriptedProvider {
    async fn decide(&self, messages: &[ChatMessage], _tools: &[Value]) -> Result<Decision, Error> {
        self.seen.lock().unwrap().push(messages.to_vec());
        let mut decisions = self.decisions.lock().unwrap();
        if decisions.is_empty() {
            Ok(Decision::Final("out of script".to_string()))
        } else {
            Ok(decisions.remove(0))
        }
    }
}

/// Requests the same tool forever. Used to prove the loop bound.
struct RelentlessProvider;

#[async_trait]
impl DecisionProvider for RelentlessProvider {
    async fn decide(&self, _messages: &[ChatMessage], _tools: &[Value]) -> Result<Decision, Error> {
        Ok(Decision::ToolCalls(vec![call("c1", "get_profile", "{}")]))
    }
}

/// Answers with the first skill name it can read out of a tool result.
struct SkillEchoProvider;

#[async_trait]
impl DecisionProvider for SkillEchoProvider {
    async fn decide(&self, messages: &[ChatMessage], _tools: &[Value]) -> Result<Decision, Error> {
        if let Some(tool_msg) = messages.iter().rev().find(|m| m.role == "tool") {
            let payload: Value =
                serde_json::from_str(tool_msg.content.as_deref().unwrap_or("{}")).unwrap();
            let name = payload["skills"][0]["name"].as_str().unwrap_or("nothing");
            return Ok(Decision::Final(format!(
                "My strongest relevant skill is {}.",
                name
            )));
        }
        Ok(Decision::ToolCalls(vec![call(
            "c1",
            "get_skills",
            "{\"category\":\"Frontend\"}",
        )]))
    }
}

fn call(id: &str, name: &str, arguments: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_string(),
        kind: "function".to_string(),
        function: FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

#[tokio::test]
async fn conversational_turn_grounds_answers_in_tool_results() {
    let (_tmp, store, config) = seeded_store().await;
    let registry = ToolRegistry::with_builtins();
    let config = Arc::new(config);
    let ctx = ToolContext::new(store, config.clone());
    let provider = SkillEchoProvider;

    let answer = respond(
        &provider,
        &registry,
        &ctx,
        &config.agent,
        &config.owner,
        "What's your React experience?",
        &[],
    )
    .await
    .unwrap();

    // Frontend skills ordered by proficiency; the top one must be named.
    assert!(answer.contains("Tailwind CSS"), "answer was: {}", answer);
}

#[tokio::test]
async fn runaway_tool_requests_hit_the_round_bound() {
    let (_tmp, store, config) = seeded_store().await;
    let registry = ToolRegistry::with_builtins();
    let config = Arc::new(config);
    let ctx = ToolContext::new(store, config.clone());

    let answer = respond(
        &RelentlessProvider,
        &registry,
        &ctx,
        &config.agent,
        &config.owner,
        "loop forever",
        &[],
    )
    .await
    .unwrap();
    assert_eq!(answer, FALLBACK_ANSWER);
}

#[tokio::test]
async fn tool_failures_feed_back_as_recoverable_context() {
    let (_tmp, store, config) = seeded_store().await;
    let registry = ToolRegistry::with_builtins();
    let config = Arc::new(config);
    let ctx = ToolContext::new(store, config.clone());

    let provider = ScriptedProvider::new(vec![
        Decision::ToolCalls(vec![call("c1", "fetch_everything", "{}")]),
        Decision::Final("recovered without that data".to_string()),
    ]);

    let answer = respond(
        &provider,
        &registry,
        &ctx,
        &config.agent,
        &config.owner,
        "tell me something",
        &[],
    )
    .await
    .unwrap();
    assert_eq!(answer, "recovered without that data");

    // the second reasoning step observed a typed tool failure
    let seen = provider.seen.lock().unwrap();
    let last_context = seen.last().unwrap();
    let tool_msg = last_context
        .iter()
        .find(|m| m.role == "tool")
        .expect("tool failure message in context");
    assert_eq!(tool_msg.tool_call_id.as_deref(), Some("c1"));
    assert!(tool_msg.content.as_deref().unwrap().contains("no tool registered"));
}

#[tokio::test]
async fn history_is_threaded_into_the_context() {
    let (_tmp, store, config) = seeded_store().await;
    let registry = ToolRegistry::with_builtins();
    let config = Arc::new(config);
    let ctx = ToolContext::new(store, config.clone());

    let provider = ScriptedProvider::new(vec![Decision::Final("ok".to_string())]);
    let history = vec![
        folio::agent::HistoryTurn {
            role: "user".to_string(),
            content: "earlier question".to_string(),
        },
        folio::agent::HistoryTurn {
            role: "assistant".to_string(),
            content: "earlier answer".to_string(),
        },
    ];

    respond(
        &provider,
        &registry,
        &ctx,
        &config.agent,
        &config.owner,
        "follow-up",
        &history,
    )
    .await
    .unwrap();

    let seen = provider.seen.lock().unwrap();
    let context = &seen[0];
    assert_eq!(context[0].role, "system");
    assert_eq!(context[1].content.as_deref(), Some("earlier question"));
    assert_eq!(context[2].content.as_deref(), Some("earlier answer"));
    assert_eq!(context.last().unwrap().content.as_deref(), Some("follow-up"));
}

#[tokio::test]
async fn empty_message_is_a_validation_error() {
    let (_tmp, store, config) = seeded_store().await;
    let registry = ToolRegistry::with_builtins();
    let config = Arc::new(config);
    let ctx = ToolContext::new(store, config.clone());

    let provider = ScriptedProvider::new(vec![]);
    let err = respond(
        &provider,
        &registry,
        &ctx,
        &config.agent,
        &config.owner,
        "   ",
        &[],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(provider.seen.lock().unwrap().is_empty());
}
