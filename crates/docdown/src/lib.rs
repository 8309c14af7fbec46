//! # docdown
//!
//! Turn an API documentation page into Markdown.
//!
//! The converter takes the raw HTML of a page plus the URL it was fetched
//! from, finds the region that holds the actual documentation, and converts
//! it with a rule engine in the spirit of
//! [turndown](https://github.com/mixmark-io/turndown).
//!
//! ## Pipeline
//!
//! ```text
//! HTML ─▶ parse ─▶ sanitize ─▶ locate ─▶ cleanup ─▶ tables/code ─▶ rules ─▶ postprocess ─▶ Markdown
//! ```
//!
//! - [`sanitize`](sanitize::sanitize) drops scripts, navigation, ads and banners
//! - [`locate_content`] picks the main content subtree
//! - [`clean_elements`](cleanup::clean_elements) removes empty wrappers and stray attributes
//! - [`normalize_tables`](tables::normalize_tables) and
//!   [`normalize_code_blocks`](code::normalize_code_blocks) give tables and
//!   code blocks a predictable shape
//! - [`Rules`] map elements to Markdown, documentation rules first
//! - [`postprocess`] tidies the text and the result is checked for length
//!
//! ## Example
//!
//! ```rust
//! let html = r#"
//!     <nav><a href="/">Home</a></nav>
//!     <main>
//!       <h1>Users API</h1>
//!       <p>Returns the list of users visible to the caller, newest first.
//!          See <a href="../auth">authentication</a> for the required scopes.</p>
//!     </main>"#;
//!
//! let markdown = docdown::convert(html, "https://example.com/docs/users").unwrap();
//! assert!(markdown.starts_with("# Users API"));
//! assert!(markdown.contains("[authentication](https://example.com/auth)"));
//! assert!(!markdown.contains("Home"));
//! ```

pub mod cleanup;
pub mod code;
pub mod html;
pub mod locate;
pub mod node;
pub mod postprocess;
mod rules;
pub mod sanitize;
mod service;
pub mod tables;
mod utilities;

pub use html::parse_html;
pub use locate::{locate_content, CandidateSource, ContentCandidate, ContentSelector};
pub use node::{Node, NodePath, NodeRef, NodeType};
pub use rules::{resolve_href, Filter, Rule, RuleContext, Rules};
pub use service::{parse_base_url, ConvertOptions, DocumentConverter, HeadingStyle};
pub use utilities::{collapse_whitespace, escape_markdown};

/// Error type for docdown operations
#[derive(Debug, thiserror::Error)]
pub enum DocdownError {
    #[error("No content could be extracted. The page might be protected or require authentication.")]
    EmptyExtraction,

    #[error("The extracted content seems too short ({length} characters). Please check if the URL points to the correct documentation page.")]
    InsufficientExtraction { length: usize },

    #[error("Invalid page URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Please enter a valid HTTP or HTTPS URL (got scheme '{0}')")]
    UnsupportedScheme(String),
}

pub type Result<T> = std::result::Result<T, DocdownError>;

/// Convert the HTML of a documentation page fetched from `base_url` to
/// Markdown, using the default options.
pub fn convert(html: &str, base_url: &str) -> Result<String> {
    DocumentConverter::new().convert(html, base_url)
}
