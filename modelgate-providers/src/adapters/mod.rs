mod anthropic;
mod google;
mod openai;
mod openai_compatible;

pub use anthropic::AnthropicAdapter;
pub use google::GoogleAdapter;
pub use openai::OpenAiAdapter;
pub use openai_compatible::OpenAiCompatibleAdapter;
