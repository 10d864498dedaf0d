mod chunk;
mod compile;
mod error;
mod grammar;

#[cfg(test)]
pub(crate) mod str_test_strategies;

pub use compile::compile;
pub use error::CompileError;
pub(crate) use chunk::CompiledChunk;
