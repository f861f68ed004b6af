//! The library code for `pagefeed`, which builds archived Atom feeds for a
//! static site. A site's posts are split into a "current" feed at a stable
//! path plus a chain of RFC5005 archive pages whose file names only change
//! when their content does, so caches and feed readers can hold on to
//! archive pages across rebuilds.
//!
//! A generation pass ([`crate::generate`]) breaks down into four steps:
//!
//! 1. Paginating the posts into archive windows and a current window
//!    ([`crate::paginate`])
//! 2. Fingerprinting each archive window ([`crate::digest`])
//! 3. Naming and linking the pages ([`crate::chain`])
//! 4. Rendering each page with the feed template ([`crate::render`]) and
//!    handing it to a sink
//!
//! Pages are produced oldest archive page first and current page last,
//! because every archive page's name depends on the name of the page before
//! it.
//!
//! The generator talks to its host through the traits in
//! [`crate::source`]. File-system implementations live in
//! [`crate::parser`] (posts), [`crate::source`] (templates and existence
//! checks), and [`crate::write`] (output).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod chain;
pub mod config;
pub mod digest;
pub mod generate;
pub mod markdown;
pub mod meta;
pub mod page;
pub mod paginate;
pub mod parser;
pub mod post;
pub mod render;
pub mod site;
pub mod source;
pub mod value;
pub mod write;
