//! Waymark Widgets
//!
//! Thin consumers of the checkpoint tracker:
//!
//! - [`Filterable`] - Filter groups plus a stable sorter over a data set
//! - [`InfiniteScroll`] - Reveals a data set page by page as its container's
//!   bottom edge scrolls into view

pub mod error;
pub mod filterable;
pub mod pager;

pub use error::{Result, WidgetError};
pub use filterable::{
    FieldValue, FilterGroup, FilterState, Filterable, GroupOptions, Matcher, Record, SortOrder,
    Sorter,
};
pub use pager::{paginate, DataComparator, InfiniteScroll, PagerOptions};
