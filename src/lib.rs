//! sccontrol - 编辑器源代码控制命令库
//!
//! 模块结构：
//! - kernel::sc: 节点模型（NodeId, NodeData, StatusMap）
//! - kernel::services::ports: 后端契约、事件、设置
//! - kernel::services::adapters::sc: 超时执行器、节点锁、后端注册表、命令调度、差异比较
//! - kernel::commit_history: 最近提交信息
//! - logging: tracing 初始化

pub mod kernel;
pub mod logging;

pub use kernel::services::adapters::{ScConfig, SharedScConfig, SourceController};
pub use kernel::services::ports::{ScBackend, ScCommandKind, ScErrorCode, ScEvent};
pub use kernel::services::{sc_event_bus, ScEventReceiver, ScEventSender};
pub use kernel::{NodeData, NodeId};
