//! 核心定义
//!
//! - error: 统一错误类型

pub mod error;

pub use error::{ErrorKind, Result, ZleError};
