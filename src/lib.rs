pub mod chart;
pub mod config;
pub mod constants;
pub mod feed;
pub mod llm_interaction;
pub mod message;
pub mod nasa;
pub mod pipeline;
pub mod presentation;
pub mod session;
pub mod web_server;

pub use config::{Config, ConfigError};
pub use feed::{shape, Asteroid, FeedPayload};
pub use message::{Content, Message, Role};
pub use pipeline::{Accumulate, Pipeline, Step, SubmitError};
pub use session::{SessionStore, Transcript};
