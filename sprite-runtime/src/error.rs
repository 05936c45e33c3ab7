//! # Error 模块
//!
//! 定义 sprite-runtime 中使用的错误类型。
//!
//! 调度器、相机和输入分发器都不会失败（输入越界时钳制处理），
//! 唯一可能失败的是 [`Animation`](crate::Animation) 的构造。

use thiserror::Error;

/// 动画构造错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimationError {
    /// 帧序列不合法（为空，或帧数与延迟数不一致）
    #[error("无效的动画：{frames} 帧，{delays} 个延迟")]
    InvalidAnimation { frames: usize, delays: usize },

    /// 帧像素缓冲区大小与宽高不匹配
    #[error("帧像素数据长度 {len} 与尺寸 {width}x{height} 不匹配")]
    InvalidFrame { width: u32, height: u32, len: usize },
}
