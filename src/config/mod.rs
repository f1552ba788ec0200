mod defaults;
mod io;
mod schema;
mod validate;

pub use io::load_config;
pub use schema::{ArchiveConfig, Config};

#[cfg(test)]
mod tests;
