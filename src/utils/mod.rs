//! Utilities for presenting results.
//!
//! - [`render_table`]: results as a terminal table
//! - [`render_plain`]: results as `id<TAB>title` lines
//! - [`truncate_with_ellipsis`]: shorten long cell contents

mod display;

pub use display::{
    render_plain, render_table, truncate_with_ellipsis, MAX_AUTHORS_WIDTH, MAX_TITLE_WIDTH,
};
