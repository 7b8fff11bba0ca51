pub mod compiler;
pub mod config;
pub mod emitter;
pub mod error;
pub mod resolver;

pub use compiler::{CompileReport, Compiler, compile};
pub use config::{CompilerConfig, TestTitle};
pub use error::{CompileError, ConfigError, Unresolved};
pub use resolver::{Resolution, resolve_statement};
