//! AI oracle adapters.

mod mock_gateway;
mod openai_gateway;

pub use mock_gateway::MockConversationGateway;
pub use openai_gateway::{OpenAiConfig, OpenAiGateway};
