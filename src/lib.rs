//! zline - 行编辑器的 widget 绑定子系统
//!
//! 模块结构：
//! - core: 错误类型
//! - models: 数据模型（Thingy 名字表、Widget 表、fd 监听表）
//! - kernel: 绑定引擎、分发入口、`zle` 命令，以及宿主契约与适配器

pub mod core;
pub mod kernel;
pub mod models;
