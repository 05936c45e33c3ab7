//! # Anim Packer
//!
//! 动画归档工具：把一个目录下的帧图片打包成 ZIP 动画。
//!
//! 归档约定与宿主的归档加载器一致：成员按名称排序成为各帧，
//! 名为 `timing` 的成员给出每帧延迟（空白分隔的毫秒数）。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p anim-packer -- pack frames/button -o button.zip --delay 80
//! cargo run -p anim-packer -- pack frames/walk -o walk.zip --timing frames/walk.timing
//! cargo run -p anim-packer -- list button.zip
//! cargo run -p anim-packer -- verify button.zip --input frames/button
//! ```

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use sprite_host::Decoder;
use sprite_host::decode::archive::{TIMING_MEMBER, parse_timing};
use sprite_host::decode::still;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Parser)]
#[command(name = "anim-packer")]
#[command(about = "动画归档工具 - 将帧图片打包为 ZIP 动画")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 打包帧目录
    Pack {
        /// 帧图片目录（只取第一层文件，按文件名排序）
        frames_dir: PathBuf,

        /// 输出 ZIP 文件
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        timing: TimingArgs,

        /// 压缩级别 (0-9)
        #[arg(short, long, default_value = "6")]
        level: u32,
    },

    /// 列出归档内容与帧延迟
    List {
        /// ZIP 文件路径
        zip_file: PathBuf,
    },

    /// 解码归档并检查完整性
    Verify {
        /// ZIP 文件路径
        zip_file: PathBuf,

        /// 原始帧目录（用于对比）
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(Args)]
#[group(multiple = false)]
struct TimingArgs {
    /// 每帧统一延迟（毫秒）
    #[arg(long)]
    delay: Option<u32>,

    /// 延迟列表文件（空白分隔的毫秒数）
    #[arg(long)]
    timing: Option<PathBuf>,
}

/// 归档的帧延迟来源
#[derive(Debug, Clone, PartialEq, Eq)]
enum Timing {
    /// 不写 `timing` 成员，加载时使用默认延迟
    Default,
    Uniform(u32),
    List(Vec<u32>),
}

impl TimingArgs {
    fn resolve(&self) -> anyhow::Result<Timing> {
        if let Some(ms) = self.delay {
            return Ok(Timing::Uniform(ms));
        }
        let Some(path) = &self.timing else {
            return Ok(Timing::Default);
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取延迟列表: {}", path.display()))?;
        let delays = parse_timing(&text).map_err(anyhow::Error::msg)?;
        Ok(Timing::List(delays))
    }
}

impl Timing {
    /// 生成 `timing` 成员内容，帧数与延迟数不匹配时报错
    fn render(&self, frame_count: usize) -> anyhow::Result<Option<String>> {
        let delays = match self {
            Timing::Default => return Ok(None),
            Timing::Uniform(ms) => vec![*ms; frame_count],
            Timing::List(delays) => {
                if delays.len() > frame_count {
                    bail!("延迟列表有 {} 项，但只有 {} 帧", delays.len(), frame_count);
                }
                delays.clone()
            }
        };
        let lines: Vec<String> = delays.iter().map(u32::to_string).collect();
        Ok(Some(lines.join("\n")))
    }
}

/// 一次打包的结果
#[derive(Debug)]
struct PackSummary {
    frames: usize,
    raw_size: u64,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pack {
            frames_dir,
            output,
            timing,
            level,
        } => timing
            .resolve()
            .and_then(|timing| pack_frames(&frames_dir, &output, &timing, level))
            .map(|summary| print_pack_summary(&output, &summary)),
        Commands::List { zip_file } => list_archive(&zip_file),
        Commands::Verify { zip_file, input } => verify_archive(&zip_file, input.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}

/// 收集帧文件：第一层普通文件，按文件名排序，跳过隐藏文件与 `timing`
fn collect_frames(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("帧目录不存在: {}", dir.display());
    }

    let mut frames = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || name == TIMING_MEMBER {
            continue;
        }
        frames.push(entry.into_path());
    }
    Ok(frames)
}

fn member_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("无效的文件名: {}", path.display()))
}

/// 把帧目录打包为 ZIP 动画
fn pack_frames(
    frames_dir: &Path,
    output: &Path,
    timing: &Timing,
    level: u32,
) -> anyhow::Result<PackSummary> {
    println!("📦 打包帧目录: {:?} -> {:?}", frames_dir, output);

    let frames = collect_frames(frames_dir)?;
    if frames.is_empty() {
        bail!("目录中没有帧图片: {}", frames_dir.display());
    }
    let timing_member = timing.render(frames.len())?;

    let file = File::create(output)
        .with_context(|| format!("无法创建输出文件: {}", output.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level as i64));

    let mut raw_size = 0u64;
    for path in &frames {
        let name = member_name(path)?;
        let bytes = std::fs::read(path)?;
        // 只收可解码的图片
        let image = still::decode_image(&bytes, &name)?;

        zip.start_file(name.as_str(), options)?;
        zip.write_all(&bytes)?;
        raw_size += bytes.len() as u64;
        println!(
            "  + {} ({}x{}, {})",
            name,
            image.width(),
            image.height(),
            format_size(bytes.len() as u64)
        );
    }

    if let Some(text) = timing_member {
        zip.start_file(TIMING_MEMBER, options)?;
        zip.write_all(text.as_bytes())?;
        raw_size += text.len() as u64;
    }
    zip.finish()?;

    Ok(PackSummary {
        frames: frames.len(),
        raw_size,
    })
}

fn print_pack_summary(output: &Path, summary: &PackSummary) {
    println!();
    println!("✅ 打包完成！");
    println!("   帧数: {}", summary.frames);
    println!("   原始大小: {}", format_size(summary.raw_size));
    if let Ok(metadata) = std::fs::metadata(output) {
        println!("   输出文件: {:?} ({})", output, format_size(metadata.len()));
    }
}

/// 列出归档成员，并展示 `timing` 对应到各帧的延迟
fn list_archive(zip_path: &Path) -> anyhow::Result<()> {
    println!("📋 归档内容: {:?}", zip_path);
    println!();

    let file = File::open(zip_path)
        .with_context(|| format!("无法打开归档: {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)?;

    let mut timing = Vec::new();
    let mut members = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if name == TIMING_MEMBER {
            let mut text = String::new();
            entry.read_to_string(&mut text)?;
            timing = parse_timing(&text).map_err(anyhow::Error::msg)?;
            continue;
        }
        members.push((name, entry.size(), entry.compressed_size()));
    }
    members.sort_by(|a, b| a.0.cmp(&b.0));

    println!("{:<48} {:>10} {:>12} {:>12}", "帧", "延迟", "原始大小", "压缩大小");
    println!("{}", "-".repeat(86));
    for (i, (name, size, comp_size)) in members.iter().enumerate() {
        let delay = timing
            .get(i)
            .map(|ms| format!("{ms} ms"))
            .unwrap_or_else(|| "默认".to_string());
        println!(
            "{:<48} {:>10} {:>12} {:>12}",
            name,
            delay,
            format_size(*size),
            format_size(*comp_size)
        );
    }
    println!("{}", "-".repeat(86));
    println!("共 {} 帧，timing 给出 {} 项", members.len(), timing.len());

    Ok(())
}

/// 逐个成员解压，再按宿主的方式整体解码
fn verify_archive(zip_path: &Path, input: Option<&Path>) -> anyhow::Result<()> {
    println!("🔍 验证归档: {:?}", zip_path);

    let bytes = std::fs::read(zip_path)
        .with_context(|| format!("无法读取归档: {}", zip_path.display()))?;
    let problems = check_members(&bytes, input)?;
    if !problems.is_empty() {
        println!("❌ 发现 {} 个问题:", problems.len());
        for problem in &problems {
            println!("   - {problem}");
        }
        bail!("{} 个成员有问题", problems.len());
    }

    let name = zip_path.display().to_string();
    let anim = Decoder::new().decode_bytes(&name, &bytes)?;
    println!(
        "✅ 验证通过！{} 帧，{}x{}，总时长 {} ms",
        anim.frame_count(),
        anim.width(),
        anim.height(),
        anim.total_duration()
    );
    println!("   延迟: {:?}", anim.delays());
    Ok(())
}

/// 检查每个成员能否解压；给出原始目录时对比内容
fn check_members(bytes: &[u8], input: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut problems = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        let mut buffer = Vec::new();
        if let Err(e) = entry.read_to_end(&mut buffer) {
            problems.push(format!("{name}: 读取失败 - {e}"));
            continue;
        }

        // timing 可能由 --timing 文件生成，不与目录对比
        if name == TIMING_MEMBER {
            continue;
        }
        if let Some(dir) = input {
            let source = dir.join(&name);
            match std::fs::read(&source) {
                Ok(original) if original != buffer => {
                    problems.push(format!("{name}: 内容不一致"));
                }
                Ok(_) => {}
                Err(_) => problems.push(format!("{name}: 原始目录中不存在")),
            }
        }
    }
    Ok(problems)
}

fn format_size(size: u64) -> String {
    if size < 1024 {
        format!("{} B", size)
    } else if size < 1024 * 1024 {
        format!("{:.1} KB", size as f64 / 1024.0)
    } else {
        format!("{:.2} MB", size as f64 / 1024.0 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, ImageEncoder, codecs::png::PngEncoder};

    fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let data = rgba.repeat((width * height) as usize);
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&data, width, height, ColorType::Rgba8)
            .unwrap();
        out
    }

    fn frames_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("02.png"), png(2, 2, [0, 255, 0, 255])).unwrap();
        std::fs::write(dir.path().join("01.png"), png(3, 1, [255, 0, 0, 255])).unwrap();
        std::fs::write(dir.path().join(".DS_Store"), b"junk").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        dir
    }

    #[test]
    fn test_collect_frames_sorted_and_filtered() {
        let dir = frames_dir();
        std::fs::write(dir.path().join("timing"), "10 20").unwrap();
        let names: Vec<String> = collect_frames(dir.path())
            .unwrap()
            .iter()
            .map(|p| member_name(p).unwrap())
            .collect();
        assert_eq!(names, vec!["01.png", "02.png"]);
    }

    #[test]
    fn test_timing_render() {
        assert_eq!(Timing::Default.render(3).unwrap(), None);
        assert_eq!(
            Timing::Uniform(80).render(3).unwrap().as_deref(),
            Some("80\n80\n80")
        );
        // 少于帧数的列表合法，剩余帧加载时补默认延迟
        assert_eq!(
            Timing::List(vec![10]).render(2).unwrap().as_deref(),
            Some("10")
        );
        assert!(Timing::List(vec![1, 2, 3]).render(2).is_err());
    }

    #[test]
    fn test_pack_then_decode() {
        let dir = frames_dir();
        let out = tempfile::tempdir().unwrap();
        let output = out.path().join("anim.zip");

        let summary = pack_frames(dir.path(), &output, &Timing::List(vec![30, 70]), 6).unwrap();
        assert_eq!(summary.frames, 2);

        let bytes = std::fs::read(&output).unwrap();
        let missing = check_members(&bytes, Some(dir.path())).unwrap();
        assert!(missing.is_empty());

        let anim = Decoder::new().decode_bytes("anim.zip", &bytes).unwrap();
        assert_eq!(anim.delays(), &[30, 70]);
        assert_eq!((anim.width(), anim.height()), (3, 2));
        assert_eq!(anim.frame(0).image().pixel(0, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_pack_without_timing_uses_default_delay() {
        let dir = frames_dir();
        let out = tempfile::tempdir().unwrap();
        let output = out.path().join("anim.zip");
        pack_frames(dir.path(), &output, &Timing::Default, 0).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        let anim = Decoder::new()
            .with_default_delay(25)
            .decode_bytes("anim.zip", &bytes)
            .unwrap();
        assert_eq!(anim.delays(), &[25, 25]);
    }

    #[test]
    fn test_pack_rejects_non_image() {
        let dir = frames_dir();
        std::fs::write(dir.path().join("03.txt"), b"not an image").unwrap();
        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("a.zip");
        let result = pack_frames(dir.path(), &target, &Timing::Default, 6);
        assert!(result.is_err());
    }

    #[test]
    fn test_pack_rejects_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("a.zip");
        let result = pack_frames(dir.path(), &target, &Timing::Default, 6);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_members_reports_mismatch() {
        let dir = frames_dir();
        let out = tempfile::tempdir().unwrap();
        let output = out.path().join("anim.zip");
        pack_frames(dir.path(), &output, &Timing::Uniform(40), 6).unwrap();

        std::fs::write(dir.path().join("01.png"), png(1, 1, [0, 0, 0, 255])).unwrap();
        std::fs::remove_file(dir.path().join("02.png")).unwrap();
        let bytes = std::fs::read(&output).unwrap();
        let problems = check_members(&bytes, Some(dir.path())).unwrap();
        assert_eq!(problems.len(), 2);
    }
}
