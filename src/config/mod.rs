// Configuration: built-in defaults overlaid by an optional project file.

mod loader;
mod types;

pub use loader::{CONFIG_FILE, load};
pub use types::Config;
