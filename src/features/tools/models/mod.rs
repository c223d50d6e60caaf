mod tool;

pub use tool::{PromptSource, ProviderOp, SourcePolicy, ToolKind};
