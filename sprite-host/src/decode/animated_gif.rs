//! # GIF 加载器
//!
//! 按 disposal 语义把 GIF 帧合成为完整画布。
//!
//! ## 合成规则
//!
//! - 画布初始为全透明，尺寸为逻辑屏幕尺寸
//! - 当前帧 disposal 为 restore-previous 时，绘制前保存整张画布快照
//! - 透明索引不改写目标像素，其余像素写入 RGB 并置 alpha 为 255
//! - 画布拷贝一份作为输出帧
//! - 输出后执行当前帧自己的 disposal：
//!   restore-background 只清空该帧矩形；restore-previous 恢复整张画布快照
//!
//! 没有 Graphics Control Extension 的帧：无透明、不处理、延迟取默认值。

use std::io::Cursor;

use gif::{ColorOutput, DecodeOptions, DisposalMethod};
use sprite_runtime::{Animation, Frame, FrameImage};
use tracing::debug;

use super::DecodeError;

const FORMAT: &str = "gif";

/// 帧处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposal {
    /// 保留画布（后续帧在其上叠加）
    DoNotDispose,
    /// 把该帧矩形清为透明
    RestoreBackground,
    /// 恢复到绘制该帧之前的画布
    RestorePrevious,
}

impl From<DisposalMethod> for Disposal {
    fn from(method: DisposalMethod) -> Self {
        match method {
            DisposalMethod::Any | DisposalMethod::Keep => Disposal::DoNotDispose,
            DisposalMethod::Background => Disposal::RestoreBackground,
            DisposalMethod::Previous => Disposal::RestorePrevious,
        }
    }
}

/// 裁剪到画布内的帧矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameRect {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

impl FrameRect {
    fn clipped(left: u16, top: u16, width: u16, height: u16, cw: u32, ch: u32) -> Self {
        let left = u32::from(left).min(cw);
        let top = u32::from(top).min(ch);
        Self {
            left,
            top,
            width: u32::from(width).min(cw - left),
            height: u32::from(height).min(ch - top),
        }
    }
}

/// RGBA 合成画布
#[derive(Debug, Clone)]
struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }

    /// 把索引色帧画到画布上
    ///
    /// `indices` 按帧原始宽度排列，超出画布的部分被裁掉。
    fn draw(
        &mut self,
        indices: &[u8],
        frame_width: u16,
        rect: FrameRect,
        palette: &[u8],
        transparent: Option<u8>,
    ) {
        let stride = usize::from(frame_width);
        for row in 0..rect.height {
            for col in 0..rect.width {
                let Some(&index) = indices.get(row as usize * stride + col as usize) else {
                    continue;
                };
                if transparent == Some(index) {
                    continue;
                }
                let p = usize::from(index) * 3;
                // 调色板越界的索引按透明处理
                let Some(rgb) = palette.get(p..p + 3) else {
                    continue;
                };
                let o = self.offset(rect.left + col, rect.top + row);
                self.pixels[o..o + 3].copy_from_slice(rgb);
                self.pixels[o + 3] = 0xff;
            }
        }
    }

    fn clear_rect(&mut self, rect: FrameRect) {
        for row in 0..rect.height {
            let start = self.offset(rect.left, rect.top + row);
            let end = start + (rect.width as usize) * 4;
            self.pixels[start..end].fill(0);
        }
    }

    fn snapshot(&self) -> Result<FrameImage, sprite_runtime::AnimationError> {
        FrameImage::new(self.width, self.height, self.pixels.clone())
    }
}

/// GIF 延迟（1/100 秒）转毫秒，0 取默认值
pub fn delay_ms(hundredths: u16, default_delay_ms: u32) -> u32 {
    match u32::from(hundredths) * 10 {
        0 => default_delay_ms,
        ms => ms,
    }
}

/// 解码 GIF
pub fn load(bytes: &[u8], path: &str, default_delay_ms: u32) -> Result<Animation, DecodeError> {
    let mut options = DecodeOptions::new();
    options.set_color_output(ColorOutput::Indexed);
    let mut decoder = options
        .read_info(Cursor::new(bytes))
        .map_err(|e| DecodeError::failure(path, FORMAT, e))?;

    let width = u32::from(decoder.width());
    let height = u32::from(decoder.height());
    let global_palette = decoder.global_palette().map(<[u8]>::to_vec);

    let mut canvas = Canvas::new(width, height);
    let mut frames = Vec::new();
    let mut delays = Vec::new();

    while let Some(frame) = decoder
        .read_next_frame()
        .map_err(|e| DecodeError::failure(path, FORMAT, e))?
    {
        let disposal = Disposal::from(frame.dispose);
        let rect = FrameRect::clipped(
            frame.left,
            frame.top,
            frame.width,
            frame.height,
            width,
            height,
        );
        let palette = frame
            .palette
            .as_deref()
            .or(global_palette.as_deref())
            .ok_or_else(|| {
                DecodeError::failure(path, FORMAT, format!("第 {} 帧缺少调色板", frames.len()))
            })?;

        let saved = (disposal == Disposal::RestorePrevious).then(|| canvas.clone());

        canvas.draw(&frame.buffer, frame.width, rect, palette, frame.transparent);

        let image = canvas
            .snapshot()
            .map_err(|e| DecodeError::failure(path, FORMAT, e))?;
        frames.push(Frame::new(image));
        delays.push(delay_ms(frame.delay, default_delay_ms));

        match disposal {
            Disposal::DoNotDispose => {}
            Disposal::RestoreBackground => canvas.clear_rect(rect),
            Disposal::RestorePrevious => {
                if let Some(saved) = saved {
                    canvas = saved;
                }
            }
        }
    }

    debug!(path = %path, frames = frames.len(), width, height, "GIF 解码完成");
    Animation::new(frames, delays).map_err(|e| DecodeError::failure(path, FORMAT, e))
}
