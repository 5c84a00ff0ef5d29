pub mod mutations;
pub mod price;
pub mod stats;
pub mod store;

pub use price::{normalize_price, normalize_price_value};
pub use stats::{compute_stats, simple_total};
pub use store::{SessionPhase, Store, StoreState};
