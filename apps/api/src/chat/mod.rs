pub mod handlers;
pub mod persona;
pub mod prompts;
