pub(crate) mod bootstrap;
pub(crate) mod config;
pub(crate) mod headless;
pub(crate) mod loop_runner;
pub(crate) mod scenes;
