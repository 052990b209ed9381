//! HTML module
//!
//! Server-side rendering of the interactive session page.

mod page;

pub use page::{render_page, PageView, PAGE_TITLE};
