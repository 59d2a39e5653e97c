pub mod ensure_date;
pub mod ensure_range;

// Re-export handler functions for use in routing
pub use ensure_date::{ensure_date, ensure_date_for_tenant};
pub use ensure_range::{ensure_range, ensure_range_for_tenant};
