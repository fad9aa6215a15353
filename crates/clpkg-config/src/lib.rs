pub mod config;
pub mod error;
pub mod sites;

#[cfg(test)]
pub mod test_utils;
