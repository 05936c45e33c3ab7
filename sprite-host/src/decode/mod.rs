//! # Decode 模块
//!
//! 把磁盘或内存中的动画文件解码为 [`Animation`]。
//!
//! ## 设计说明
//!
//! - 加载器按固定顺序尝试：GIF → 静态图 → 归档 → 视频
//! - 每个加载器只接手自己认识签名的输入，识别不依赖扩展名
//! - 识别了签名但解码失败时记录警告并尝试下一个加载器
//! - 全部失败时返回最后一个解码错误；没有加载器认识时返回 `UnsupportedFormat`
//! - 视频需要文件系统路径交给 ffmpeg，纯字节输入不支持视频

pub mod animated_gif;
pub mod archive;
mod error;
pub mod sniff;
pub mod still;
pub mod video;

pub use error::DecodeError;
pub use sniff::Format;

use std::path::{Path, PathBuf};

use sprite_runtime::{Animation, DEFAULT_FRAME_DELAY_MS};
use tracing::{debug, warn};

/// 动画解码器
///
/// 持有解码选项，本身不缓存结果（缓存见 [`crate::resources::AnimationCache`]）。
#[derive(Debug, Clone)]
pub struct Decoder {
    default_delay_ms: u32,
    ffmpeg_path: Option<PathBuf>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            default_delay_ms: DEFAULT_FRAME_DELAY_MS,
            ffmpeg_path: None,
        }
    }

    /// 缺省帧延迟（GIF 延迟为 0、归档缺少 timing 时使用）
    pub fn with_default_delay(mut self, ms: u32) -> Self {
        self.default_delay_ms = ms;
        self
    }

    /// 指定 ffmpeg 可执行文件
    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = Some(path.into());
        self
    }

    pub fn default_delay_ms(&self) -> u32 {
        self.default_delay_ms
    }

    /// 解码文件
    pub fn decode(&self, path: impl AsRef<Path>) -> Result<Animation, DecodeError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        if !path.is_file() {
            return Err(DecodeError::NotFound { path: display });
        }
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DecodeError::NotFound {
                    path: display.clone(),
                }
            } else {
                DecodeError::failure(&display, "io", e)
            }
        })?;
        self.decode_with(&display, &bytes, Some(path))
    }

    /// 解码内存中的文件内容
    ///
    /// `name` 仅用于日志和错误消息。
    pub fn decode_bytes(&self, name: &str, bytes: &[u8]) -> Result<Animation, DecodeError> {
        self.decode_with(name, bytes, None)
    }

    fn decode_with(
        &self,
        name: &str,
        bytes: &[u8],
        fs_path: Option<&Path>,
    ) -> Result<Animation, DecodeError> {
        let mut last_error = None;
        for format in sniff::candidates(bytes) {
            match self.load_format(format, name, bytes, fs_path) {
                Ok(animation) => {
                    debug!(
                        path = %name,
                        loader = format.name(),
                        frames = animation.frame_count(),
                        "动画加载成功"
                    );
                    return Ok(animation);
                }
                Err(e) => {
                    warn!(path = %name, loader = format.name(), error = %e, "加载器失败，尝试下一个");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| DecodeError::UnsupportedFormat {
            path: name.to_string(),
        }))
    }

    fn load_format(
        &self,
        format: Format,
        name: &str,
        bytes: &[u8],
        fs_path: Option<&Path>,
    ) -> Result<Animation, DecodeError> {
        match format {
            Format::Gif => animated_gif::load(bytes, name, self.default_delay_ms),
            Format::Still => still::load(bytes, name),
            Format::Archive => archive::load(bytes, name, self.default_delay_ms),
            Format::Video => match fs_path {
                Some(path) => video::load(path, self.ffmpeg_path.as_deref(), self.default_delay_ms),
                None => Err(DecodeError::failure(
                    name,
                    format.name(),
                    "视频只能从文件系统路径解码",
                )),
            },
        }
    }
}

/// 使用默认选项解码文件
pub fn decode(path: impl AsRef<Path>) -> Result<Animation, DecodeError> {
    Decoder::new().decode(path)
}
