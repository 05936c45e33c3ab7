//! # 视频加载器
//!
//! 通过 ffmpeg 把第一条视频流解码为 RGBA 原始帧，全部读入内存。
//!
//! ## 设计说明
//!
//! - 使用 `ffmpeg-sidecar` 启动 ffmpeg 子进程，不链接 libav
//! - 每帧延迟 = 容器时长 / 帧数；没有时长时用 1000 / fps；都没有时用默认延迟
//! - 任何失败（找不到 ffmpeg、进程错误、零帧）都丢弃已解出的帧

use std::path::Path;

use ffmpeg_sidecar::command::{FfmpegCommand, ffmpeg_is_installed};
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use sprite_runtime::{Animation, Frame, FrameImage};
use tracing::{debug, trace};

use super::DecodeError;

const FORMAT: &str = "video";

/// 由时长、帧率推算每帧延迟（毫秒）
pub fn frame_delay_ms(
    duration_secs: Option<f64>,
    fps: Option<f64>,
    frame_count: usize,
    default_delay_ms: u32,
) -> u32 {
    let by_duration = duration_secs
        .filter(|d| d.is_finite() && *d > 0.0 && frame_count > 0)
        .map(|d| d * 1000.0 / frame_count as f64);
    let by_fps = fps
        .filter(|f| f.is_finite() && *f > 0.0)
        .map(|f| 1000.0 / f);
    match by_duration.or(by_fps) {
        Some(ms) if ms >= 1.0 => ms.round() as u32,
        Some(_) => 1,
        None => default_delay_ms,
    }
}

/// 解码视频文件
///
/// `ffmpeg_path` 为 `None` 时从 PATH 查找 ffmpeg。
pub fn load(
    path: &Path,
    ffmpeg_path: Option<&Path>,
    default_delay_ms: u32,
) -> Result<Animation, DecodeError> {
    let path_str = path.display().to_string();
    let fail = |e: &dyn std::fmt::Display| DecodeError::failure(&path_str, FORMAT, e);

    let mut command = match ffmpeg_path {
        Some(bin) => FfmpegCommand::new_with_path(bin),
        None => {
            if !ffmpeg_is_installed() {
                return Err(fail(&"未找到 ffmpeg"));
            }
            FfmpegCommand::new()
        }
    };
    command
        .hide_banner()
        .input(path.to_string_lossy().as_ref())
        .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgba", "-"]);

    let mut child = command.spawn().map_err(|e| fail(&e))?;

    let mut frames = Vec::new();
    let mut duration = None;
    let mut fps = None;
    let mut error = None;

    for event in child.iter().map_err(|e| fail(&e))? {
        match event {
            FfmpegEvent::OutputFrame(frame) => {
                match FrameImage::new(frame.width, frame.height, frame.data) {
                    Ok(image) => frames.push(Frame::new(image)),
                    Err(e) => {
                        error.get_or_insert_with(|| e.to_string());
                    }
                }
            }
            FfmpegEvent::ParsedDuration(d) => duration = Some(d.duration),
            FfmpegEvent::ParsedInputStream(stream) => {
                if let Some(video) = stream.video_data() {
                    fps.get_or_insert(f64::from(video.fps));
                }
            }
            FfmpegEvent::Error(message) | FfmpegEvent::Log(LogLevel::Error, message) => {
                error.get_or_insert(message);
            }
            FfmpegEvent::Log(_, message) => trace!(path = %path_str, "ffmpeg: {message}"),
            _ => {}
        }
    }

    let status = child.wait().map_err(|e| fail(&e))?;
    if let Some(message) = error {
        return Err(fail(&message));
    }
    if !status.success() {
        return Err(fail(&format!("ffmpeg 退出状态异常: {status}")));
    }
    if frames.is_empty() {
        return Err(fail(&"没有解出任何视频帧"));
    }

    let delay = frame_delay_ms(duration, fps, frames.len(), default_delay_ms);
    debug!(
        path = %path_str,
        frames = frames.len(),
        delay_ms = delay,
        "视频解码完成"
    );
    let delays = vec![delay; frames.len()];
    Animation::new(frames, delays).map_err(|e| fail(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_from_duration() {
        assert_eq!(frame_delay_ms(Some(2.0), Some(30.0), 50, 40), 40);
        assert_eq!(frame_delay_ms(Some(1.0), None, 4, 40), 250);
    }

    #[test]
    fn test_delay_falls_back_to_fps() {
        assert_eq!(frame_delay_ms(None, Some(25.0), 10, 40), 40);
        assert_eq!(frame_delay_ms(Some(0.0), Some(50.0), 10, 40), 20);
    }

    #[test]
    fn test_delay_falls_back_to_default() {
        assert_eq!(frame_delay_ms(None, None, 10, 33), 33);
        assert_eq!(frame_delay_ms(Some(f64::NAN), Some(0.0), 10, 33), 33);
    }

    #[test]
    fn test_delay_never_zero() {
        assert_eq!(frame_delay_ms(Some(0.001), None, 100, 40), 1);
    }

    #[test]
    fn test_missing_binary_is_failure() {
        let err = load(
            Path::new("clip.mp4"),
            Some(Path::new("/nonexistent/ffmpeg-binary")),
            40,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::DecodeFailure { format: "video", .. }));
    }
}
