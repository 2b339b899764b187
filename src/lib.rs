//! Stackweave - fragment tree composition
//!
//! Stackweave turns a directory tree of infrastructure fragments into one
//! CloudFormation-style template document. Each fragment file describes a
//! small piece (a route, a function, a table) at a position in the tree; the
//! composition engine runs every fragment, collects the entities they
//! produce, resolves the placeholder tokens wiring them together, and
//! assembles a single deterministic document.
//!
//! # Architecture Overview
//!
//! Composition is a fixed four-phase pipeline, run by
//! [`Composer`](builder::Composer):
//!
//! 1. **Discover** - A [`FragmentSource`](discovery::FragmentSource) yields
//!    fragment units in sorted path order.
//! 2. **Aggregate** - Each fragment runs at its
//!    [`DirInfo`](position::DirInfo) position and registers the
//!    [`Entity`](fragment::Entity) values it produces; duplicate keys abort.
//! 3. **Resolve** - The registry is sealed into a symbol table and every
//!    `<% ... %>` placeholder token in every property tree is substituted.
//! 4. **Assemble** - Entities land in a
//!    [`CompositeDocument`](builder::CompositeDocument) in registration
//!    order, ready to render as JSON or YAML.
//!
//! Determinism is the load-bearing property: the same tree always composes
//! to byte-identical output, so templates diff cleanly and a content digest
//! identifies a composition.
//!
//! # Core Modules
//!
//! - [`position`] - Tree positions and the entity keys they derive
//! - [`token`] - Placeholder token grammar, `<% Key %>` and `<% Key.Attr %>`
//! - [`fragment`] - The fragment contract, entities, and the registry
//! - [`discovery`] - Fragment sources, including the filesystem tree walker
//! - [`builder`] - The composition pipeline and the composite document
//! - [`resources`] - Builders for the built-in fragment kinds
//! - [`manifest`] - `stackweave.toml` parsing and discovery
//! - [`cli`] - The `stackweave` command-line interface
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use stackweave::builder::Composer;
//! use stackweave::discovery::StaticSource;
//! use stackweave::fragment::ComposeContext;
//! use stackweave::resources::{MethodFragment, RouteFragment};
//!
//! let source = StaticSource::new()
//!     .with_unit("users/route.toml", RouteFragment::new())
//!     .with_unit("users/get.toml", MethodFragment::new("get"));
//!
//! let document = Composer::new(ComposeContext::new("Api"))
//!     .with_root_construct("AWS::ApiGateway::RestApi", json!({ "Name": "demo" }))
//!     .compose(source)
//!     .unwrap();
//!
//! assert_eq!(document.entries()[0].key(), "Api");
//! assert!(document.get("RESUsers").is_some());
//! assert!(document.get("METUsersGet").is_some());
//! ```
//!
//! # Fragment Trees on Disk
//!
//! The CLI drives the same pipeline from a manifest:
//!
//! ```toml
//! [scope]
//! id = "Api"
//! kind = "AWS::ApiGateway::RestApi"
//!
//! [tree]
//! root = "stack"
//! ```
//!
//! with a tree like:
//!
//! ```text
//! stack/
//! └── users/
//!     ├── route.toml        kind = "route"    -> RESUsers
//!     ├── get.toml          kind = "method"   -> METUsersGet
//!     └── {id}/
//!         ├── route.toml    kind = "route"    -> RESUsersId
//!         └── get.toml      kind = "method"   -> METUsersIdGet
//! ```
//!
//! ```bash
//! stackweave build
//! stackweave check
//! stackweave list --format json
//! ```

pub mod builder;
pub mod cli;
pub mod constants;
pub mod core;
pub mod discovery;
pub mod fragment;
pub mod manifest;
pub mod position;
pub mod resources;
pub mod token;

// test_utils is available to both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
