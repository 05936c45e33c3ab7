//! # 归档加载器
//!
//! ZIP 容器中的多张静态图组成一个动画。
//!
//! ## 约定
//!
//! - 成员按名称字典序排列，目录成员跳过
//! - 名为 `timing` 的成员是空白分隔的十进制毫秒列表，依次对应其余成员
//! - 没有 `timing` 时每帧使用默认延迟；值不够时剩余帧补默认延迟
//! - 任何一个成员解码失败，整个归档失败

use std::io::{Cursor, Read};

use sprite_runtime::{Animation, Frame};
use tracing::debug;
use zip::ZipArchive;

use super::{DecodeError, still};

const FORMAT: &str = "archive";

/// 延迟列表成员名
pub const TIMING_MEMBER: &str = "timing";

/// 解析 `timing` 内容
pub fn parse_timing(text: &str) -> Result<Vec<u32>, String> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<u32>()
                .map_err(|e| format!("无效的延迟值 `{token}`: {e}"))
        })
        .collect()
}

/// 解码 ZIP 动画归档
pub fn load(bytes: &[u8], path: &str, default_delay_ms: u32) -> Result<Animation, DecodeError> {
    let fail = |e: &dyn std::fmt::Display| DecodeError::failure(path, FORMAT, e);

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| fail(&e))?;

    let mut timing = None;
    let mut members: Vec<(String, Vec<u8>)> = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| fail(&e))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data).map_err(|e| fail(&e))?;

        if name == TIMING_MEMBER {
            let text = String::from_utf8(data).map_err(|e| fail(&e))?;
            timing = Some(parse_timing(&text).map_err(|e| fail(&e))?);
        } else {
            members.push((name, data));
        }
    }
    members.sort_by(|a, b| a.0.cmp(&b.0));

    if members.is_empty() {
        return Err(DecodeError::failure(path, FORMAT, "归档中没有图像成员"));
    }

    let timing = timing.unwrap_or_default();
    let mut frames = Vec::with_capacity(members.len());
    let mut delays = Vec::with_capacity(members.len());
    for (i, (name, data)) in members.iter().enumerate() {
        let image = still::decode_image(data, &format!("{path}:{name}"))
            .map_err(|e| fail(&e))?;
        frames.push(Frame::new(image));
        delays.push(timing.get(i).copied().unwrap_or(default_delay_ms));
    }

    debug!(
        path = %path,
        frames = frames.len(),
        timed = timing.len(),
        "归档解码完成"
    );
    Animation::new(frames, delays).map_err(|e| fail(&e))
}
