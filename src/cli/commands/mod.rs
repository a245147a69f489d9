pub(super) mod apply;
pub(super) mod dsn;
pub(super) mod get;
pub(super) mod keys;
pub(super) mod write_config;
