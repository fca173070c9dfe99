//! # Folio
//!
//! A personal knowledge-base server: structured portfolio content behind a
//! parametrized query API, and a conversational assistant that answers
//! questions about that content by invoking declared, schema-validated
//! tools against the same store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │  Query API   │──▶│ Query Engine │──▶│  SQLite   │
//! │  (axum)      │   │ filter/page  │   │  store    │
//! └──────────────┘   └──────┬───────┘   └──────────┘
//!                           ▲
//! ┌──────────────┐   ┌──────┴───────┐
//! │  POST /chat  │──▶│ Dispatch loop │──▶ decision provider (LLM)
//! │              │   │ tool registry │
//! └──────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! folio init                    # create database
//! folio seed                    # load the demo dataset
//! folio serve                   # start the HTTP API + assistant
//! folio search "React"          # cross-entity union search
//! folio chat "What projects have you built?"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Entity records and list-field decoding |
//! | [`store`] | Entity store adapter over SQLite |
//! | [`query`] | Filter/pagination/search engine |
//! | [`envelope`] | Response shaping (data + pagination + seo) |
//! | [`tools`] | Fixed tool catalogue with schema validation |
//! | [`agent`] | Bounded conversational dispatch loop |
//! | [`server`] | HTTP surface |
//! | [`seed`] | Demo dataset |

pub mod agent;
pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod migrate;
pub mod models;
pub mod query;
pub mod seed;
pub mod server;
pub mod store;
pub mod tools;
