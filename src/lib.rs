//! Filter evaluation and capability-driven query translation for
//! SCIM-style directory resources.
//!
//! Three components, leaves first:
//!
//! - [`Filter`] — an immutable, structurally comparable tree of filter
//!   nodes, built with factory constructors;
//! - [`Evaluator`] — decides whether one in-memory document matches a
//!   filter, with directory-search semantics;
//! - [`translate`] — compiles a filter into the most efficient set of
//!   native queries a partially-capable backend can execute, broadening
//!   to "fetch everything" where it must.
//!
//! Everything is a pure, synchronous tree algorithm over immutable data;
//! values of every public type can be shared across threads freely.

pub mod evaluator;
pub mod filter;
pub mod path;
pub mod schema;
pub mod translator;
pub mod value;

pub use evaluator::Evaluator;
pub use filter::{Filter, FilterError, Kind, MAX_DEPTH};
pub use path::Path;
pub use schema::{AttributeDefinition, AttributeRegistry};
pub use translator::{Strategy, translate};
pub use value::{Value, ZULU_FORMAT};
