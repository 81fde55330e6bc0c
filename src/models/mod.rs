pub mod loaders;
pub mod question;

pub use loaders::{load_seed_file, seed_gateway, SeedData};
pub use question::{categories_by_id, Category, NewQuestion, Question};
