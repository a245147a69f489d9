pub mod cluster;
pub mod kvc;
