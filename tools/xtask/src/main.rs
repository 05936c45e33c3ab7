//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 sprite-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `anim-check`: 解码资源目录下的全部动画文件

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use sprite_host::decode::sniff;
use sprite_host::{Decoder, HostConfig};
use walkdir::WalkDir;

/// 签名识别需要的文件头长度
const SNIFF_LEN: u64 = 16;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    match cmd.status() {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "sprite-runtime", "--html"]);
            run("cargo llvm-cov -p sprite-runtime --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 工具 crate 不计入覆盖率
            let mut cov = Command::new("cargo");
            cov.args([
                "llvm-cov",
                "--workspace",
                "--exclude",
                "xtask",
                "--exclude",
                "anim-packer",
                "--html",
            ]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --exclude anim-packer --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "anim-check" => {
            let path = args.next();
            anim_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 sprite-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  anim-check      解码资源目录下的动画文件

ANIM-CHECK:
  cargo xtask anim-check [path]

  不带参数：检查配置中 assets_root 下的所有文件（默认 assets/）
  带路径参数：检查指定文件或目录

  文件头不属于任何支持格式的文件会被跳过；
  其余文件逐个解码，任何一个失败则命令失败。
"#
    );
}

//=============================================================================
// anim-check 命令实现
//=============================================================================

/// 检查结果
#[derive(Debug, Default)]
struct AnimCheckResult {
    checked: usize,
    skipped: usize,
    failures: Vec<(PathBuf, String)>,
}

fn anim_check(path: Option<&str>) -> anyhow::Result<()> {
    let config_path = Path::new("config.json");
    let config = if config_path.exists() {
        HostConfig::load(config_path)
    } else {
        HostConfig::default()
    };

    let root = match path {
        Some(p) => PathBuf::from(p),
        None => config.assets_root.clone(),
    };
    if !root.exists() {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定资源路径",
            root.display()
        );
    }

    eprintln!("==> 检查 {} 下的动画文件...\n", root.display());
    let result = check_tree(&root, &config.decoder())?;
    print_check_result(&result);

    if !result.failures.is_empty() {
        anyhow::bail!("动画检查发现 {} 个错误", result.failures.len());
    }
    Ok(())
}

/// 遍历目录（或单个文件），解码每个可识别的文件
fn check_tree(root: &Path, decoder: &Decoder) -> anyhow::Result<AnimCheckResult> {
    let mut result = AnimCheckResult::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        if sniff::candidates(&read_header(path)?).is_empty() {
            result.skipped += 1;
            continue;
        }

        result.checked += 1;
        match decoder.decode(path) {
            Ok(anim) => eprintln!(
                "[OK] {}: {} 帧, {}x{}, {} ms",
                path.display(),
                anim.frame_count(),
                anim.width(),
                anim.height(),
                anim.total_duration()
            ),
            Err(e) => result.failures.push((path.to_path_buf(), e.to_string())),
        }
    }
    Ok(result)
}

fn read_header(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut header)?;
    Ok(header)
}

fn print_check_result(result: &AnimCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!(
        "检查完成: {} 个动画文件，跳过 {} 个其他文件",
        result.checked, result.skipped
    );
    eprintln!();

    for (path, error) in &result.failures {
        eprintln!("[ERROR] {}: {}", path.display(), error);
    }

    eprintln!();
    if result.failures.is_empty() {
        eprintln!("✅ 检查通过，无错误");
    } else {
        eprintln!("❌ {} 个错误", result.failures.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tree_skips_unknown_and_reports_broken() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hello").unwrap();
        std::fs::write(dir.path().join("broken.gif"), b"GIF89a\x01").unwrap();

        let result = check_tree(dir.path(), &Decoder::new()).unwrap();
        assert_eq!(result.skipped, 1);
        assert_eq!(result.checked, 1);
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].0.ends_with("broken.gif"));
    }

    #[test]
    fn test_read_header_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny");
        std::fs::write(&path, b"GIF").unwrap();
        assert_eq!(read_header(&path).unwrap(), b"GIF");
    }
}
