pub mod columns;
pub mod config;
pub mod demo_host;
pub mod diagnostics;
pub mod format;
pub mod model;
pub mod protocol;
pub mod sorter;
pub mod surface;
pub mod widget;
