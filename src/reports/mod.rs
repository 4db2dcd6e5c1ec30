//! Reports for spendlens
//!
//! The aggregation engine, the top subcategories ranker, and the dashboard
//! view-model built from both.

pub mod aggregation;
pub mod dashboard;
pub mod top_categories;

pub use aggregation::{
    month_over_month_totals, totals_by_category, totals_by_subcategory, SparseTable,
};
pub use dashboard::{
    find_most_recent_date, group_subcategories_by_category, month_column,
    month_over_month_series, sort_by_date, Dashboard, LabeledAmount,
};
pub use top_categories::{
    top_subcategories, top_subcategories_limit, CategoryAggregate, TOP_SUBCATEGORIES,
};
