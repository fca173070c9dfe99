//! Tool registry for the conversational dispatch loop.
//!
//! The registry is the only way the dispatch loop can reach the store —
//! there is no generic "run arbitrary query" tool, which keeps the
//! conversational surface from becoming an unconstrained database
//! interface. Every tool declares a name, a description used by the
//! reasoning step to choose among tools, and an OpenAI function-calling
//! JSON Schema. Arguments are validated against that schema before any
//! store access; failures are reported back into the reasoning context,
//! never silently coerced.
//!
//! All tools are read-only. The one quasi-effectful tool
//! (`schedule_meeting`) only formats an acknowledgment and triggers no
//! store mutation.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Error;
use crate::query;
use crate::store::{ProjectFilter, Store};

/// Result cap for the project-specific search tool.
const PROJECT_SEARCH_LIMIT: i64 = 5;
/// Number of top skills feeding the recommended-stack synthesis.
const TECH_STACK_SKILL_LIMIT: i64 = 20;

// ═══════════════════════════════════════════════════════════════════════
// Tool trait & context
// ═══════════════════════════════════════════════════════════════════════

/// Bridge handed to every tool execution. Tools hold no state of their
/// own; all reads go through the store, all constants come from config.
pub struct ToolContext {
    pub store: Store,
    pub config: Arc<Config>,
}

impl ToolContext {
    pub fn new(store: Store, config: Arc<Config>) -> Self {
        Self { store, config }
    }
}

/// A named, schema-validated operation the reasoning step may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Lowercase identifier with underscores (e.g. `"get_projects"`).
    fn name(&self) -> &str;

    /// One-line description the reasoning step uses to choose among tools.
    fn description(&self) -> &str;

    /// OpenAI function-calling JSON Schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute with already-validated parameters.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value, Error>;
}

/// Serializable tool info for the `/tools/list` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// The full fixed catalogue served to the dispatch loop.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(GetProfileTool));
        registry.register(Box::new(GetAboutTool));
        registry.register(Box::new(GetSkillsTool));
        registry.register(Box::new(GetProjectsTool));
        registry.register(Box::new(GetProjectDetailsTool));
        registry.register(Box::new(GetExperienceTool));
        registry.register(Box::new(GetEducationTool));
        registry.register(Box::new(GetCertificationsTool));
        registry.register(Box::new(GetContributionsTool));
        registry.register(Box::new(GetContactTool));
        registry.register(Box::new(SearchPortfolioTool));
        registry.register(Box::new(SearchProjectsTool));
        registry.register(Box::new(GetTechStackTool));
        registry.register(Box::new(GetAvailabilityTool));
        registry.register(Box::new(ScheduleMeetingTool));
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn infos(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }

    /// Tool specs in the chat-completions wire format.
    pub fn specs(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.parameters_schema(),
                    }
                })
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up, validate, and execute one tool invocation. Validation happens
/// before the tool (and therefore the store) is touched.
pub async fn dispatch(
    registry: &ToolRegistry,
    ctx: &ToolContext,
    name: &str,
    params: &Value,
) -> Result<Value, Error> {
    let tool = registry
        .find(name)
        .ok_or_else(|| Error::ToolInvocation(format!("no tool registered with name: {}", name)))?;
    let validated = validate_params(&tool.parameters_schema(), params)?;
    tool.execute(validated, ctx).await
}

// ═══════════════════════════════════════════════════════════════════════
// Parameter validation
// ═══════════════════════════════════════════════════════════════════════

/// Validate params against a tool's JSON Schema: required fields, types,
/// enum membership, and default injection.
pub fn validate_params(schema: &Value, params: &Value) -> Result<Value, Error> {
    let params_obj = params
        .as_object()
        .cloned()
        .unwrap_or_else(serde_json::Map::new);

    let properties = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .cloned()
        .unwrap_or_default();

    let required: Vec<String> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let mut result = params_obj.clone();

    for req_field in &required {
        if !params_obj.contains_key(req_field) {
            return Err(Error::ToolInvocation(format!(
                "missing required parameter: {}",
                req_field
            )));
        }
    }

    for (prop_name, prop_schema) in &properties {
        if let Some(value) = params_obj.get(prop_name) {
            if let Some(expected_type) = prop_schema.get("type").and_then(|t| t.as_str()) {
                let type_ok = match expected_type {
                    "string" => value.is_string(),
                    "integer" => value.is_i64() || value.is_u64(),
                    "number" => value.is_number(),
                    "boolean" => value.is_boolean(),
                    "array" => value.is_array(),
                    "object" => value.is_object(),
                    _ => true,
                };
                if !type_ok {
                    return Err(Error::ToolInvocation(format!(
                        "parameter '{}' must be of type '{}', got {}",
                        prop_name,
                        expected_type,
                        json_type_name(value)
                    )));
                }
            }

            if let Some(enum_values) = prop_schema.get("enum").and_then(|e| e.as_array()) {
                if !enum_values.contains(value) {
                    let allowed: Vec<String> =
                        enum_values.iter().map(|v| v.to_string()).collect();
                    return Err(Error::ToolInvocation(format!(
                        "parameter '{}' must be one of [{}], got {}",
                        prop_name,
                        allowed.join(", "),
                        value
                    )));
                }
            }
        } else if let Some(default) = prop_schema.get("default") {
            result.insert(prop_name.clone(), default.clone());
        }
    }

    Ok(Value::Object(result))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn opt_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ═══════════════════════════════════════════════════════════════════════
// Content lookup tools
// ═══════════════════════════════════════════════════════════════════════

struct GetProfileTool;

#[async_trait]
impl Tool for GetProfileTool {
    fn name(&self) -> &str {
        "get_profile"
    }

    fn description(&self) -> &str {
        "Get the owner's profile — name, bio, roles, social links, CV"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let profile = ctx
            .store
            .profile()
            .await?
            .ok_or(Error::NotFound("profile"))?;
        Ok(serde_json::to_value(&profile)?)
    }
}

struct GetAboutTool;

#[async_trait]
impl Tool for GetAboutTool {
    fn name(&self) -> &str {
        "get_about"
    }

    fn description(&self) -> &str {
        "Get the detailed background story, values, and mission"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let about = ctx.store.about().await?.ok_or(Error::NotFound("about"))?;
        Ok(serde_json::to_value(&about)?)
    }
}

struct GetSkillsTool;

#[async_trait]
impl Tool for GetSkillsTool {
    fn name(&self) -> &str {
        "get_skills"
    }

    fn description(&self) -> &str {
        "Get skills ordered by proficiency, optionally filtered by category \
         (Frontend, Backend, AI/ML, DevOps, Tools, Database)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "Filter skills by category substring, e.g. Frontend, Backend, AI/ML"
                }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let category = opt_str(&params, "category");
        let skills = ctx
            .store
            .skills_by_proficiency(category.as_deref(), None)
            .await?;
        Ok(json!({ "skills": skills }))
    }
}

struct GetProjectsTool;

#[async_trait]
impl Tool for GetProjectsTool {
    fn name(&self) -> &str {
        "get_projects"
    }

    fn description(&self) -> &str {
        "Get projects, optionally filtered by featured flag, free-text search, or category"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "featured": { "type": "boolean", "description": "Only featured/flagship projects" },
                "search": { "type": "string", "description": "Search by title, description, or technology" },
                "category": { "type": "string", "description": "Exact project category" }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let filter = ProjectFilter {
            search: opt_str(&params, "search"),
            category: opt_str(&params, "category"),
            featured: params.get("featured").and_then(|v| v.as_bool()),
        };
        let unfiltered =
            filter.search.is_none() && filter.category.is_none() && filter.featured.is_none();
        let window = if unfiltered {
            Some(crate::store::PageWindow {
                limit: query::DEFAULT_PROJECT_LIMIT,
                offset: 0,
            })
        } else {
            None
        };
        let projects = ctx.store.list_projects(&filter, window).await?;
        Ok(json!({ "projects": projects }))
    }
}

struct GetProjectDetailsTool;

#[async_trait]
impl Tool for GetProjectDetailsTool {
    fn name(&self) -> &str {
        "get_project_details"
    }

    fn description(&self) -> &str {
        "Get one project by numeric id or by (partial) title"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_id": { "type": "integer", "description": "Project id" },
                "project_title": { "type": "string", "description": "Project title to search" }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let id = params.get("project_id").and_then(|v| v.as_i64());
        let title = opt_str(&params, "project_title");
        let project = query::project_lookup(&ctx.store, id, title.as_deref())
            .await?
            .ok_or(Error::NotFound("project"))?;
        Ok(serde_json::to_value(&project)?)
    }
}

struct GetExperienceTool;

#[async_trait]
impl Tool for GetExperienceTool {
    fn name(&self) -> &str {
        "get_experience"
    }

    fn description(&self) -> &str {
        "Get work history — companies, roles, durations, tech stacks"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let experience = ctx.store.list_experience(None).await?;
        Ok(json!({ "experience": experience }))
    }
}

struct GetEducationTool;

#[async_trait]
impl Tool for GetEducationTool {
    fn name(&self) -> &str {
        "get_education"
    }

    fn description(&self) -> &str {
        "Get education background — degrees, institutions, highlights"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let education = ctx.store.list_education(None).await?;
        Ok(json!({ "education": education }))
    }
}

struct GetCertificationsTool;

#[async_trait]
impl Tool for GetCertificationsTool {
    fn name(&self) -> &str {
        "get_certifications"
    }

    fn description(&self) -> &str {
        "Get professional certifications and completed courses"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let certifications = ctx.store.list_certifications().await?;
        Ok(json!({ "certifications": certifications }))
    }
}

struct GetContributionsTool;

#[async_trait]
impl Tool for GetContributionsTool {
    fn name(&self) -> &str {
        "get_contributions"
    }

    fn description(&self) -> &str {
        "Get open source contributions, optionally filtered by type \
         (Documentation, Code, Pull Request)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": { "type": "string", "description": "Filter by contribution type" }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let filter = crate::store::ContributionFilter {
            kind: opt_str(&params, "type"),
            search: None,
        };
        let contributions = ctx.store.list_contributions(&filter, None).await?;
        Ok(json!({ "contributions": contributions }))
    }
}

struct GetContactTool;

#[async_trait]
impl Tool for GetContactTool {
    fn name(&self) -> &str {
        "get_contact"
    }

    fn description(&self) -> &str {
        "Get contact information — email, phone, social links, location"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let contact = ctx
            .store
            .contact()
            .await?
            .ok_or(Error::NotFound("contact"))?;
        Ok(serde_json::to_value(&contact)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Search & discovery tools
// ═══════════════════════════════════════════════════════════════════════

struct SearchPortfolioTool;

#[async_trait]
impl Tool for SearchPortfolioTool {
    fn name(&self) -> &str {
        "search_portfolio"
    }

    fn description(&self) -> &str {
        "Search the entire portfolio — projects, skills, experience, \
         contributions. Use for broad questions"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let query_text = opt_str(&params, "query")
            .ok_or_else(|| Error::Validation("query must not be empty".to_string()))?;
        let results = ctx.store.union_search(&query_text).await?;
        Ok(json!({ "results": results }))
    }
}

struct SearchProjectsTool;

#[async_trait]
impl Tool for SearchProjectsTool {
    fn name(&self) -> &str {
        "search_projects"
    }

    fn description(&self) -> &str {
        "Search specifically for projects by title, technology, or description"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search term for finding projects" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let query_text = opt_str(&params, "query")
            .ok_or_else(|| Error::Validation("query must not be empty".to_string()))?;
        let projects = ctx
            .store
            .search_projects_ranked(&query_text, PROJECT_SEARCH_LIMIT)
            .await?;
        Ok(json!({ "projects": projects }))
    }
}

struct GetTechStackTool;

#[async_trait]
impl Tool for GetTechStackTool {
    fn name(&self) -> &str {
        "get_tech_stack"
    }

    fn description(&self) -> &str {
        "Get the primary tech stack grouped by area, with stack recommendations"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_type": {
                    "type": "string",
                    "description": "Kind of project to recommend a stack for"
                }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let skills = ctx
            .store
            .skills_by_proficiency(None, Some(TECH_STACK_SKILL_LIMIT))
            .await?;

        let names_in = |needle: &str| -> Vec<String> {
            skills
                .iter()
                .filter(|s| s.category.to_lowercase().contains(needle))
                .map(|s| s.name.clone())
                .collect()
        };

        let mut stack = json!({
            "frontend": names_in("frontend"),
            "backend": names_in("backend"),
            "database": names_in("database"),
            "ai_ml": names_in("ai"),
            "tools": names_in("tools"),
            "recommendations": {
                "mern": "MongoDB, Express, React, Node.js - great for full-stack web apps",
                "nextjs": "Next.js + PostgreSQL - excellent for SEO and performance",
                "ai_agents": "Agent SDK + tool calling + vector DB - for AI-powered applications"
            }
        });
        if let Some(project_type) = opt_str(&params, "project_type") {
            stack["project_type"] = json!(project_type);
        }
        Ok(stack)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Interaction tools
// ═══════════════════════════════════════════════════════════════════════

struct GetAvailabilityTool;

#[async_trait]
impl Tool for GetAvailabilityTool {
    fn name(&self) -> &str {
        "get_availability"
    }

    fn description(&self) -> &str {
        "Get the owner's current availability for new opportunities"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        // Engine-internal fact, not store-backed.
        Ok(json!({
            "status": "Available for new opportunities",
            "type": "Full-time / Contract / Freelance",
            "response_time": "Within 24-48 hours",
            "preferred_roles": ["Full Stack Developer", "AI Engineer", "Technical Lead"],
            "contact": ctx.config.owner.email,
        }))
    }
}

struct ScheduleMeetingTool;

#[async_trait]
impl Tool for ScheduleMeetingTool {
    fn name(&self) -> &str {
        "schedule_meeting"
    }

    fn description(&self) -> &str {
        "Collect meeting details and return instructions for scheduling a call"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "date": { "type": "string", "description": "Preferred meeting date" },
                "time": { "type": "string", "description": "Preferred meeting time" },
                "topic": { "type": "string", "description": "Meeting topic or agenda" },
                "name": { "type": "string", "description": "Requester name" },
                "email": { "type": "string", "description": "Requester email" }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value, Error> {
        let email = &ctx.config.owner.email;
        let topic =
            opt_str(&params, "topic").unwrap_or_else(|| "Portfolio Discussion".to_string());
        Ok(json!({
            "message": "Meeting request received! To finalize, please:",
            "instructions": [
                format!("1. Send an email to {}", email),
                "2. Include your name, preferred date/time, and meeting topic".to_string(),
                "3. You will get a confirmation within 24 hours".to_string(),
            ],
            "email": email,
            "subject": format!("Meeting Request: {}", topic),
            "requested": {
                "date": params.get("date").cloned().unwrap_or(Value::Null),
                "time": params.get("time").cloned().unwrap_or(Value::Null),
                "name": params.get("name").cloned().unwrap_or(Value::Null),
                "email": params.get("email").cloned().unwrap_or(Value::Null),
            }
        }))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════
