pub mod seed_loader;

pub use seed_loader::{load_seed_file, seed_gateway, SeedData};
