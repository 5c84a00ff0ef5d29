pub mod category;
pub mod item;
pub mod list;
pub mod message;
pub mod record_id;
pub mod stats;
pub mod user;

pub use category::{ARCHIVED_CATEGORY, Category};
pub use item::{Item, ItemPatch};
pub use list::{DEFAULT_LIST_NAME, ShoppingList};
pub use message::Message;
pub use record_id::RecordId;
pub use stats::{CategoryStats, StatsSnapshot};
pub use user::User;
