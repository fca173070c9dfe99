//! Demo dataset seeding.
//!
//! Populates every entity kind with realistic portfolio content so
//! `init && seed && serve` yields a working instance. Idempotent per
//! entity: tables that already hold rows are left untouched.

use serde_json::json;

use crate::config::Config;
use crate::error::Error;
use crate::store::{
    AboutInput, CertificationInput, ContactInput, ContributionInput, EducationInput,
    ExperienceInput, MediaInput, MetaInput, ProfileInput, ProjectInput, SkillInput, Store,
};

pub async fn run_seed(store: &Store, config: &Config) -> Result<(), Error> {
    let owner = &config.owner;

    if store.table_is_empty("profile").await? {
        store
            .upsert_profile(&ProfileInput {
                greeting: "Hello, I'm".to_string(),
                name: owner.name.clone(),
                tagline: "I build AI-powered systems where agents reason, act, and automate."
                    .to_string(),
                typed_roles: vec![
                    "Agentic AI Engineer".to_string(),
                    "Full-Stack Developer".to_string(),
                    "AI Systems Architect".to_string(),
                    "Backend Engineer".to_string(),
                ],
                bio: "I design AI-driven platforms where agents can reason, coordinate, call \
                      tools, manage memory, and automate workflows against real-world systems."
                    .to_string(),
                github_link: Some("https://github.com/example".to_string()),
                linkedin_link: Some("https://linkedin.com/in/example".to_string()),
                email: Some(owner.email.clone()),
                meta: MetaInput {
                    title: Some(format!("{} - {}", owner.name, owner.headline)),
                    description: Some(format!(
                        "Portfolio of {} - {} specializing in AI-powered systems and \
                         intelligent automation.",
                        owner.name, owner.headline
                    )),
                    keywords: Some(
                        "AI Engineer, Agentic AI, Full-Stack, AI Automation, Portfolio".to_string(),
                    ),
                },
                ..Default::default()
            })
            .await?;
        println!("Seeded profile");
    }

    if store.table_is_empty("about").await? {
        store
            .upsert_about(&AboutInput {
                title: "About Me".to_string(),
                subtitle: "Get to know more about me, my background, and what drives me."
                    .to_string(),
                bio_text: "I am an Agentic AI and Full-Stack Engineer focused on building \
                           intelligent, autonomous, and production-grade systems."
                    .to_string(),
                bio_text_2: Some(
                    "My work sits at the intersection of AI agents, backend systems, scalable \
                     APIs, and modern frontend experiences."
                        .to_string(),
                ),
                values: json!([
                    {
                        "icon": "fas fa-robot",
                        "title": "Agentic AI",
                        "description": "Autonomous agents that reason, decide, and execute complex tasks.",
                        "color": "primary"
                    },
                    {
                        "icon": "fas fa-code",
                        "title": "Full-Stack",
                        "description": "Scalable applications with modern frontend experiences.",
                        "color": "accent"
                    }
                ]),
                meta: MetaInput {
                    title: Some(format!("About Me | {}", owner.name)),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await?;
        println!("Seeded about");
    }

    if store.table_is_empty("contact").await? {
        store
            .upsert_contact(&ContactInput {
                contact_items: json!([
                    { "icon": "fas fa-envelope", "label": "Email", "value": owner.email },
                    { "icon": "fas fa-map-marker-alt", "label": "Location", "value": "Remote" }
                ]),
                social_links: json!([
                    { "icon": "fab fa-github", "url": "https://github.com/example" },
                    { "icon": "fab fa-linkedin", "url": "https://linkedin.com/in/example" }
                ]),
                meta: MetaInput::default(),
            })
            .await?;
        println!("Seeded contact");
    }

    if store.table_is_empty("skills").await? {
        let skills = [
            ("Agent SDKs", "Agentic AI & AI Systems", "92%", "AI agents with tool calling, memory, and orchestration", "fas fa-robot"),
            ("Model Context Protocol", "Agentic AI & AI Systems", "88%", "MCP architecture and multi-agent communication", "fas fa-network-wired"),
            ("Prompt Engineering", "Agentic AI & AI Systems", "90%", "Few-shot prompting, structured outputs, role prompting", "fas fa-comments"),
            ("Node.js", "Backend Engineering", "90%", "Server-side JavaScript runtime", "fab fa-node-js"),
            ("Express.js", "Backend Engineering", "88%", "Web framework for Node.js", "fas fa-server"),
            ("PostgreSQL", "Backend Engineering", "85%", "Relational database", "fas fa-database"),
            ("RESTful APIs", "Backend Engineering", "95%", "API design and implementation", "fas fa-plug"),
            ("React.js", "Frontend Engineering", "95%", "Frontend library", "fab fa-react"),
            ("Next.js", "Frontend Engineering", "90%", "React framework with SSR", "fas fa-fast-forward"),
            ("Tailwind CSS", "Frontend Engineering", "95%", "Utility-first CSS framework", "fab fa-css3"),
            ("Git", "Tools & DevOps", "92%", "Version control and collaboration", "fab fa-git-alt"),
            ("AWS", "Tools & DevOps", "82%", "Cloud services", "fab fa-aws"),
            ("n8n", "Tools & DevOps", "85%", "Workflow automation", "fas fa-project-diagram"),
            ("MongoDB", "Database", "88%", "NoSQL database", "fas fa-leaf"),
        ];
        for (name, category, level, description, icon) in skills {
            store
                .insert_skill(&SkillInput {
                    name: name.to_string(),
                    category: category.to_string(),
                    level: Some(level.to_string()),
                    description: Some(description.to_string()),
                    icon: Some(icon.to_string()),
                    color: Some("primary".to_string()),
                    meta: MetaInput {
                        title: Some(format!("Skills | {}", owner.name)),
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .await?;
        }
        println!("Seeded {} skills", skills.len());
    }

    if store.table_is_empty("projects").await? {
        let projects = [
            ProjectInput {
                title: "AI Agent Platform".to_string(),
                description: "A production-grade platform where autonomous agents reason, call \
                              tools, manage memory, and execute business workflows with human \
                              oversight."
                    .to_string(),
                technologies: vec![
                    "React.js".to_string(),
                    "Node.js".to_string(),
                    "PostgreSQL".to_string(),
                    "Agent SDKs".to_string(),
                ],
                category: Some("AI Platform".to_string()),
                live_demo: Some("https://demo.example.com/agents".to_string()),
                featured: true,
                color: Some("primary".to_string()),
                ..Default::default()
            },
            ProjectInput {
                title: "Streaming Dashboard".to_string(),
                description: "An admin panel built with React to manage users, billing, live \
                              stream status, and analytics."
                    .to_string(),
                technologies: vec![
                    "React.js".to_string(),
                    "Vite".to_string(),
                    "MongoDB".to_string(),
                    "Tailwind CSS".to_string(),
                ],
                category: Some("Admin Panel".to_string()),
                featured: true,
                color: Some("secondary".to_string()),
                ..Default::default()
            },
            ProjectInput {
                title: "Real Estate Platform".to_string(),
                description: "A responsive platform to browse, search, and filter properties \
                              with lead generation features."
                    .to_string(),
                technologies: vec![
                    "React.js".to_string(),
                    "Firebase".to_string(),
                    "Tailwind CSS".to_string(),
                ],
                category: Some("Web Application".to_string()),
                ..Default::default()
            },
            ProjectInput {
                title: "Support Agent Swarm".to_string(),
                description: "Multi-agent customer support automation where specialist agents \
                              triage, research, and draft replies."
                    .to_string(),
                technologies: vec![
                    "Node.js".to_string(),
                    "Agent SDKs".to_string(),
                    "Redis".to_string(),
                ],
                category: Some("AI Platform".to_string()),
                ..Default::default()
            },
            ProjectInput {
                title: "Portfolio API".to_string(),
                description: "The knowledge-base service behind this portfolio, with a typed \
                              query layer and a conversational assistant."
                    .to_string(),
                technologies: vec!["Rust".to_string(), "SQLite".to_string()],
                category: Some("Web Application".to_string()),
                ..Default::default()
            },
        ];
        let count = projects.len();
        for project in &projects {
            store.insert_project(project).await?;
        }
        println!("Seeded {} projects", count);
    }

    if store.table_is_empty("experience").await? {
        let roles = [
            ExperienceInput {
                company: "Nimbus Labs".to_string(),
                role: "Senior Full-Stack Engineer".to_string(),
                duration: "2023 - Present".to_string(),
                description: "Leading the agent automation team, shipping tool-calling \
                              pipelines and production AI services."
                    .to_string(),
                tech_stack: vec![
                    "Node.js".to_string(),
                    "React.js".to_string(),
                    "PostgreSQL".to_string(),
                ],
                ..Default::default()
            },
            ExperienceInput {
                company: "Brightwave Studio".to_string(),
                role: "Full-Stack Developer".to_string(),
                duration: "2021 - 2023".to_string(),
                description: "Built customer dashboards and internal APIs for media clients."
                    .to_string(),
                tech_stack: vec!["React.js".to_string(), "Express.js".to_string()],
                ..Default::default()
            },
            ExperienceInput {
                company: "Freelance".to_string(),
                role: "Web Developer".to_string(),
                duration: "2019 - 2021".to_string(),
                description: "Delivered responsive sites and storefronts for small businesses."
                    .to_string(),
                tech_stack: vec!["JavaScript".to_string(), "Firebase".to_string()],
                ..Default::default()
            },
        ];
        let count = roles.len();
        for role in &roles {
            store.insert_experience(role).await?;
        }
        println!("Seeded {} experience entries", count);
    }

    if store.table_is_empty("education").await? {
        let entries = [
            EducationInput {
                institution: "State University".to_string(),
                degree: "BSc Computer Science".to_string(),
                period: "2015 - 2019".to_string(),
                description: "Focus on distributed systems and databases.".to_string(),
                highlights_title: Some("Highlights".to_string()),
                highlights: vec![
                    "Graduated with honors".to_string(),
                    "Led the programming society".to_string(),
                ],
                ..Default::default()
            },
            EducationInput {
                institution: "Open Learning".to_string(),
                degree: "Machine Learning Specialization".to_string(),
                period: "2022".to_string(),
                description: "Applied ML coursework with a capstone on agent systems."
                    .to_string(),
                highlights: vec!["Capstone on tool-using agents".to_string()],
                ..Default::default()
            },
        ];
        let count = entries.len();
        for entry in &entries {
            store.insert_education(entry).await?;
        }
        println!("Seeded {} education entries", count);
    }

    if store.table_is_empty("certifications").await? {
        let certs = [
            ("Cloud Practitioner", "AWS", "2022-06"),
            ("Professional Scrum Master I", "Scrum.org", "2023-01"),
            ("Deep Learning Specialization", "Coursera", "2023-09"),
        ];
        for (title, issuer, issued) in certs {
            store
                .insert_certification(&CertificationInput {
                    title: title.to_string(),
                    issuer: issuer.to_string(),
                    issued_date: Some(issued.to_string()),
                    color: Some("primary".to_string()),
                    ..Default::default()
                })
                .await?;
        }
        println!("Seeded {} certifications", certs.len());
    }

    if store.table_is_empty("contributions").await? {
        let contributions = [
            ContributionInput {
                title: "Agent SDK docs overhaul".to_string(),
                description: "Rewrote the tool-calling guide and added worked examples."
                    .to_string(),
                project_name: Some("openai-agents".to_string()),
                kind: "Documentation".to_string(),
                ..Default::default()
            },
            ContributionInput {
                title: "Workflow node for webhook retries".to_string(),
                description: "Contributed a retry-aware webhook node.".to_string(),
                project_name: Some("n8n".to_string()),
                kind: "Code".to_string(),
                ..Default::default()
            },
            ContributionInput {
                title: "Fix pagination off-by-one".to_string(),
                description: "Corrected page math in the list endpoint.".to_string(),
                project_name: Some("community-api".to_string()),
                kind: "Pull Request".to_string(),
                ..Default::default()
            },
        ];
        let count = contributions.len();
        for contribution in &contributions {
            store.insert_contribution(contribution).await?;
        }
        println!("Seeded {} contributions", count);
    }

    if store.table_is_empty("media").await? {
        store
            .insert_media(&MediaInput {
                kind: "image".to_string(),
                url: "https://images.example.com/agent-platform-cover.png".to_string(),
                mime_type: Some("image/png".to_string()),
                related_type: "projects".to_string(),
                related_id: Some("1".to_string()),
                alt_text: Some("AI Agent Platform cover".to_string()),
                ..Default::default()
            })
            .await?;
        println!("Seeded media");
    }

    Ok(())
}
