//! Carton - The artist's toolbox for Gesso.
//!
//! This crate provides the foundational utilities shared by every Gesso crate,
//! much like a carton (artist's portfolio case) holds the essential tools an
//! artist carries from one canvas to the next.
//!
//! # Modules
//!
//! - **Strings and collections**: compact strings, fast hash maps, inline vectors
//! - **DOM configuration**: the HTML element tables the parser and renderer share
//!
//! # Example
//!
//! ```
//! use gesso_carton::{is_void_tag, FxHashMap, String};
//!
//! let mut seen: FxHashMap<String, usize> = FxHashMap::default();
//! seen.insert(String::from("br"), 1);
//!
//! assert!(is_void_tag("br"));
//! assert!(!is_void_tag("div"));
//! ```

pub mod dom_tag_config;
pub mod general;

// Re-export compact_str::CompactString for convenience
pub use compact_str::format_compact;
pub use compact_str::CompactString;
pub use compact_str::CompactString as String;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_set, Set as PhfSet};

// Re-export shared utilities
pub use dom_tag_config::*;
pub use general::*;
