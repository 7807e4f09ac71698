pub mod scenario;
pub mod util;

pub use util::{entropy_seed, split_csv};
