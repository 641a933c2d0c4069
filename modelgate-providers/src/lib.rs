//! Provider client abstraction: one adapter per upstream LLM, a shared `reqwest::Client`,
//! AES-256-GCM-at-rest credential encryption, and cost accounting over `modelgate_core::pricing`.

mod adapters;
mod client;
mod crypto;
mod registry;
mod tokenizer;

pub use adapters::{AnthropicAdapter, GoogleAdapter, OpenAiAdapter, OpenAiCompatibleAdapter};
pub use client::{ProviderClient, ProviderResponse};
pub use crypto::ProviderKeyCipher;
pub use registry::{ProviderRegistry, ProviderRegistryConfig};
pub use tokenizer::estimate_tokens;
