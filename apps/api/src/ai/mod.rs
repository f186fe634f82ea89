pub mod blockchain;
pub mod chat;
pub mod collaboration;
pub mod documents;
pub mod facts;
pub mod gateway;
pub mod handlers;
pub mod market;
pub mod negotiation;
pub mod prediction;
pub mod prompts;
pub mod reports;
pub mod risk;
pub mod visualization;
