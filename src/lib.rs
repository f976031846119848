//! syntaxhl - rule-driven syntax highlighting
//!
//! Given a syntax definition (color groups, patterns and nested
//! multi-line regions) and some text, work out which group is active at
//! every character column of every line.
//!
//! ```
//! use syntaxhl::{Definition, GroupRegistry, Highlighter};
//!
//! let registry = GroupRegistry::new();
//! let definition = Definition::from_toml(
//!     r#"
//! filetype = "demo"
//!
//! [[rules]]
//! group = "identifier.function"
//! pattern = "\\w+(?=\\()"
//! "#,
//!     &registry,
//! )?;
//!
//! let matches = Highlighter::new(definition).highlight_string("foo(bar)");
//! assert_eq!(matches[0].group_at(2).map(|g| g.name()), Some("identifier.function"));
//! assert_eq!(matches[0].group_at(3), None);
//! # Ok::<(), syntaxhl::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod syntax;

pub use config::HighlightConfig;
pub use error::{Error, Result};
pub use syntax::*;
