//! Payments list: query model and controller.

pub mod controller;
pub mod query;

pub use controller::{
    ControllerPolicy, ListView, PaymentListController, PaymentRow, Presentation, ReviewOutcome,
    DEFAULT_REVIEW_ROLE, DEFAULT_SEARCH_DEBOUNCE,
};
pub use query::{page_count, PaymentQuery, SortColumn, DEFAULT_PAGE_SIZE, DEFAULT_SORT};
