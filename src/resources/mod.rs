pub mod bucket;
pub mod object;
pub mod s3;
pub mod store;

#[cfg(test)]
pub(crate) mod memory;
