pub mod app_paths;
pub mod export;
pub mod import;
pub mod import_showdown;
pub mod inspect;
pub mod session;
