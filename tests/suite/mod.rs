mod completion;
mod config;
mod session;
