mod defaults;
mod env;
mod file;
mod load;
mod paths;
mod types;
mod util;

pub use types::{Enforcement, ViewerConfig};
