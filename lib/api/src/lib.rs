pub mod openai;
pub mod rest;

pub use openai::{OpenAiClient, OpenAiConfig};
pub use rest::{routes, AppState, RestApi};
