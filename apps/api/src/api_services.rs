mod database;
mod selection_backend;

pub use database::connect_and_migrate;
pub use selection_backend::build_selection_backend;
