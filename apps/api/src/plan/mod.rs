pub mod engine;
pub mod fetcher;
pub mod handlers;
pub mod prompts;
