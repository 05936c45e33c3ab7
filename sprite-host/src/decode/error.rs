//! # Decode Error 模块
//!
//! 定义动画解码相关的错误类型。

use thiserror::Error;

/// 动画解码错误
///
/// 解码器从不返回部分填充的动画：要么完整成功，要么是这里的某个错误。
#[derive(Error, Debug)]
pub enum DecodeError {
    /// 文件不存在
    #[error("动画文件未找到: {path}")]
    NotFound {
        /// 文件路径
        path: String,
    },

    /// 没有任何加载器识别该文件
    #[error("不支持的动画格式: {path}")]
    UnsupportedFormat {
        /// 文件路径
        path: String,
    },

    /// 加载器识别了文件但解码失败
    #[error("{format} 解码失败: {path} - {message}")]
    DecodeFailure {
        /// 文件路径
        path: String,
        /// 加载器名称（gif, still, archive, video）
        format: &'static str,
        /// 错误消息
        message: String,
    },
}

impl DecodeError {
    pub(crate) fn failure(path: &str, format: &'static str, message: impl ToString) -> Self {
        Self::DecodeFailure {
            path: path.to_string(),
            format,
            message: message.to_string(),
        }
    }

    /// 是否为“文件不存在”
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
