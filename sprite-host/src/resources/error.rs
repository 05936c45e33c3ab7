//! # Resource Error 模块
//!
//! 定义资源读取相关的错误类型。

use thiserror::Error;

use crate::decode::DecodeError;

/// 资源错误
#[derive(Error, Debug)]
pub enum ResourceError {
    /// 资源读取失败
    #[error("读取 {kind} 资源失败: {path} - {message}")]
    LoadFailed {
        /// 资源路径
        path: String,
        /// 来源类型（file, zip 等）
        kind: String,
        /// 错误消息
        message: String,
    },

    /// 资源未找到
    #[error("资源未找到: {path}")]
    NotFound {
        /// 资源路径
        path: String,
    },

    /// 动画解码失败
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
