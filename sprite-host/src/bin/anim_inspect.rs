//! anim-inspect：解码动画文件并打印帧信息
//!
//! 用法：
//!   anim-inspect sprites/hero.gif ui/button.zip
//!   anim-inspect --json --sample 0,100,250 sprites/hero.gif
//!   anim-inspect --config config.json --assets sprites/hero.gif

use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use serde::Serialize;
use sprite_host::HostConfig;
use sprite_runtime::{Animation, current_frame};
use tracing::{Level, error};

#[derive(Parser)]
#[command(name = "anim-inspect", about = "解码动画文件并打印帧信息")]
struct Cli {
    /// 要检查的文件
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// 配置文件
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// 按配置的资源来源解析路径（否则视为普通文件路径）
    #[arg(long)]
    assets: bool,

    /// 输出 JSON
    #[arg(long)]
    json: bool,

    /// 在这些 tick（毫秒）采样当前帧，逗号分隔
    #[arg(long, value_delimiter = ',')]
    sample: Vec<u64>,

    /// 不循环播放（影响采样结果）
    #[arg(long)]
    no_loop: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report {
    path: String,
    frames: usize,
    width: u32,
    height: u32,
    delays: Vec<u32>,
    total_duration: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    samples: Vec<(u64, usize)>,
}

impl Report {
    fn new(path: String, anim: &Animation, sample: &[u64], looping: bool) -> Self {
        Self {
            path,
            frames: anim.frame_count(),
            width: anim.width(),
            height: anim.height(),
            delays: anim.delays().to_vec(),
            total_duration: anim.total_duration(),
            samples: sample
                .iter()
                .map(|&tick| (tick, current_frame(anim, looping, 0, tick)))
                .collect(),
        }
    }

    fn print_text(&self) {
        println!(
            "{}: {} 帧, {}x{}, 总时长 {} ms",
            self.path, self.frames, self.width, self.height, self.total_duration
        );
        println!("  延迟: {:?}", self.delays);
        for (tick, frame) in &self.samples {
            println!("  t={tick}ms → 帧 {frame}");
        }
    }
}

fn init_logging(config: &HostConfig, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        config.debug.log_level.parse().unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = if cli.config.exists() {
        HostConfig::load(&cli.config)
    } else {
        HostConfig::default()
    };
    init_logging(&config, cli.verbose);

    let mut cache = if cli.assets {
        match config.animation_cache() {
            Ok(cache) => Some(cache),
            Err(e) => {
                error!(error = %e, "无法打开资源来源");
                return ExitCode::from(2);
            }
        }
    } else {
        None
    };
    let decoder = config.decoder();

    let mut reports = Vec::new();
    let mut failed = 0usize;
    for path in &cli.paths {
        let path_str = path.display().to_string();
        let result = match cache.as_mut() {
            Some(cache) => cache.load(&path_str).map_err(|e| e.to_string()),
            None => decoder.decode(path).map(Rc::new).map_err(|e| e.to_string()),
        };
        match result {
            Ok(anim) => reports.push(Report::new(path_str, &anim, &cli.sample, !cli.no_loop)),
            Err(e) => {
                error!(path = %path_str, error = %e, "解码失败");
                failed += 1;
            }
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!(error = %e, "JSON 序列化失败");
                return ExitCode::from(2);
            }
        }
    } else {
        reports.iter().for_each(Report::print_text);
    }

    if failed > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
