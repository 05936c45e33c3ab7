//! # 解码链路集成测试
//!
//! 文件 → Decoder / AnimationCache → Animation → current_frame。
//! 测试素材在测试中即时生成，写入临时目录。

use std::borrow::Cow;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;
use std::rc::Rc;

use gif::DisposalMethod;
use image::{ColorType, ImageEncoder, codecs::png::PngEncoder};
use sprite_host::{AnimationCache, DecodeError, Decoder, FsSource, ResourceError, ZipSource, decode};
use sprite_runtime::current_frame;
use zip::{ZipWriter, write::SimpleFileOptions};

/// 调色板：0 红，1 绿，2 蓝，3 白
const PALETTE: [u8; 12] = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn gif_frame(
    rect: (u16, u16, u16, u16),
    indices: Vec<u8>,
    dispose: DisposalMethod,
    transparent: Option<u8>,
    delay: u16,
) -> gif::Frame<'static> {
    let (left, top, width, height) = rect;
    gif::Frame {
        left,
        top,
        width,
        height,
        buffer: Cow::Owned(indices),
        dispose,
        transparent,
        delay,
        ..Default::default()
    }
}

fn encode_gif(width: u16, height: u16, frames: &[gif::Frame<'static>]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut buf, width, height, &PALETTE).unwrap();
        for frame in frames {
            encoder.write_frame(frame).unwrap();
        }
    }
    buf
}

fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let data: Vec<u8> = rgba.repeat((width * height) as usize);
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(&data, width, height, ColorType::Rgba8)
        .unwrap();
    out
}

fn zip_bytes(members: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in members {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, bytes).unwrap();
    path
}

/// 2x2 画布：
/// 1. 全红，保留
/// 2. (1,1) 蓝，其余透明，恢复背景
/// 3. (0,0) 绿，其余透明，恢复到前一状态
/// 4. 全透明探针
fn disposal_gif() -> Vec<u8> {
    encode_gif(
        2,
        2,
        &[
            gif_frame((0, 0, 2, 2), vec![0; 4], DisposalMethod::Keep, None, 10),
            gif_frame(
                (0, 0, 2, 2),
                vec![3, 3, 3, 2],
                DisposalMethod::Background,
                Some(3),
                0,
            ),
            gif_frame(
                (0, 0, 1, 1),
                vec![1],
                DisposalMethod::Previous,
                None,
                5,
            ),
            gif_frame((0, 0, 2, 2), vec![3; 4], DisposalMethod::Keep, Some(3), 20),
        ],
    )
}

#[test]
fn test_gif_disposal_sequence_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "walk.gif", &disposal_gif());

    let anim = decode(&path).unwrap();
    assert_eq!(anim.frame_count(), 4);
    assert_eq!(anim.delays(), &[100, 40, 50, 200]);
    assert_eq!(anim.total_duration(), 390);

    let px = |frame: usize, x: u32, y: u32| anim.frame(frame).image().pixel(x, y).unwrap();
    // 帧 2：蓝色叠在红色上
    assert_eq!(px(1, 0, 0), RED);
    assert_eq!(px(1, 1, 1), BLUE);
    // 帧 2 的背景恢复清空了整个 2x2 矩形，帧 3 只画了 (0,0)
    assert_eq!(px(2, 0, 0), GREEN);
    assert_eq!(px(2, 1, 1), CLEAR);
    // 帧 3 恢复到绘制前（全透明）
    assert_eq!(px(3, 0, 0), CLEAR);
    assert_eq!(px(3, 1, 0), CLEAR);

    // 选帧
    assert_eq!(current_frame(&anim, true, 0, 0), 0);
    assert_eq!(current_frame(&anim, true, 0, 120), 1);
    assert_eq!(current_frame(&anim, true, 0, 389), 3);
    assert_eq!(current_frame(&anim, true, 0, 390), 0);
    assert_eq!(current_frame(&anim, false, 0, 10_000), 3);
}

#[test]
fn test_custom_default_delay() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "walk.gif", &disposal_gif());
    let anim = Decoder::new().with_default_delay(16).decode(&path).unwrap();
    assert_eq!(anim.delays()[1], 16);
}

#[test]
fn test_still_png_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "bg.png", &png(3, 2, GREEN));
    let anim = decode(&path).unwrap();
    assert_eq!((anim.width(), anim.height()), (3, 2));
    assert_eq!(anim.delays(), &[0]);
    assert_eq!(current_frame(&anim, true, 0, 12345), 0);
}

#[test]
fn test_archive_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = zip_bytes(&[
        ("frame_02.png", png(2, 2, GREEN)),
        ("frame_01.png", png(4, 1, RED)),
        ("timing", b"30\n70".to_vec()),
    ]);
    let path = write(dir.path(), "button.zip", &bytes);

    let anim = decode(&path).unwrap();
    assert_eq!(anim.delays(), &[30, 70]);
    assert_eq!((anim.width(), anim.height()), (4, 2));
    assert_eq!(anim.frame(0).image().pixel(0, 0), Some(RED));
    assert_eq!(current_frame(&anim, false, 100, 150), 1);
}

#[test]
fn test_extension_does_not_matter() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "really_a_gif.png", &disposal_gif());
    assert_eq!(decode(&path).unwrap().frame_count(), 4);
}

#[test]
fn test_unrecognized_and_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "notes.gif", b"just some text");
    assert!(matches!(
        decode(&path),
        Err(DecodeError::UnsupportedFormat { .. })
    ));
    let err = decode(dir.path().join("gone.gif")).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_cache_over_filesystem_source() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sprites/hero.gif", &disposal_gif());
    write(dir.path(), "ui/ok.png", &png(1, 1, BLUE));

    let mut cache = AnimationCache::new(Box::new(FsSource::new(dir.path())), Decoder::new());
    let hero = cache.load("sprites/hero.gif").unwrap();
    let again = cache.load("assets/sprites/../sprites/hero.gif").unwrap();
    assert!(Rc::ptr_eq(&hero, &again));
    assert_eq!(cache.load("ui/ok.png").unwrap().frame_count(), 1);
}

#[test]
fn test_cache_over_zip_source() {
    let dir = tempfile::tempdir().unwrap();
    let archive = zip_bytes(&[("a.png", png(1, 1, RED)), ("b.png", png(1, 1, GREEN))]);
    let pack = dir.path().join("assets.zip");
    {
        let mut writer = ZipWriter::new(File::create(&pack).unwrap());
        for (name, data) in [
            ("sprites/hero.gif", disposal_gif()),
            ("ui/button.zip", archive),
            ("ui/broken.png", b"\x89PNG\r\n\x1a\nxx".to_vec()),
        ] {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(&data).unwrap();
        }
        writer.finish().unwrap();
    }

    let source = ZipSource::open(&pack).unwrap();
    let mut cache = AnimationCache::new(Box::new(source), Decoder::new());

    let hero = cache.load("sprites/hero.gif").unwrap();
    assert_eq!(hero.frame_count(), 4);
    let button = cache.load("ui/button.zip").unwrap();
    assert_eq!(button.delays(), &[40, 40]);

    assert!(matches!(
        cache.load("ui/broken.png"),
        Err(ResourceError::Decode(DecodeError::DecodeFailure { format: "still", .. }))
    ));
    assert!(matches!(
        cache.load("ui/missing.png"),
        Err(ResourceError::NotFound { .. })
    ));
    let placeholder = cache.load_or_placeholder("ui/missing.png");
    assert_eq!(placeholder.frame_count(), 1);
}
