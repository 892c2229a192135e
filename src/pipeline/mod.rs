//! Pipeline stages for turning raw recipe input into a recipe row.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable on its own and the network-facing ones sit behind a trait that
//! tests can stub.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ fetch ──▶ llm ──▶ parse ──▶ (store)
//! (classify) (URL only) (model) (fences, JSON, row)
//! ```
//!
//! 1. [`input`] : classify the request as PDF, URL or text; truncate text
//! 2. [`fetch`] : GET the page and strip markup (URL input only)
//! 3. [`encode`]: base64-wrap PDF bytes for the document content part
//! 4. [`llm`]   : one completion call with the extraction prompt
//! 5. [`parse`] : strip code fences, parse JSON, map to a [`crate::recipe::NewRecipe`]

pub mod encode;
pub mod fetch;
pub mod input;
pub mod llm;
pub mod parse;
