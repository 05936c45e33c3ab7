//! 静态图加载器
//!
//! 统一转换为 RGBA8：调色板、灰度、低位深、16 位以及 tRNS 透明块都由 `to_rgba8` 处理。

use sprite_runtime::{Animation, FrameImage};

use super::DecodeError;

const FORMAT: &str = "still";

/// 解码单张图片
pub fn decode_image(bytes: &[u8], path: &str) -> Result<FrameImage, DecodeError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| DecodeError::failure(path, FORMAT, e))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    FrameImage::new(width, height, image.into_raw())
        .map_err(|e| DecodeError::failure(path, FORMAT, e))
}

/// 解码为单帧动画（延迟 0）
pub fn load(bytes: &[u8], path: &str) -> Result<Animation, DecodeError> {
    Ok(Animation::still(decode_image(bytes, path)?))
}
