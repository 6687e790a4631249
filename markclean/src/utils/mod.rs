// markclean/src/utils/mod.rs
pub mod settings_store;
