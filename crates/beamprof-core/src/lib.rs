pub mod config;
pub mod consts;
pub mod error;
pub mod fit;
pub mod frame;
pub mod profile;
pub mod projection;
