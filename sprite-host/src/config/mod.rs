//! # Config 模块
//!
//! 宿主配置，从 `config.json` 读取。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sprite_runtime::{
    Camera, DEFAULT_EDIT_CAPACITY, DEFAULT_FRAME_DELAY_MS, DEFAULT_TRANSITION_MS, SceneItem,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::decode::Decoder;
use crate::render::{DEFAULT_TEXTURE_BUDGET_MB, TextureCache};
use crate::resources::{AnimationCache, AssetSource, FsSource, ResourceError, ZipSource};

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("配置验证失败: {0}")]
    Validation(String),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// 资源来源类型
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssetSourceType {
    /// 文件系统（开发模式）
    #[default]
    Fs,
    /// ZIP 文件（发布模式）
    Zip,
}

/// 宿主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// 资源根目录（仅 Fs 模式使用）
    #[serde(default = "default_assets_root")]
    pub assets_root: PathBuf,

    /// 资源来源类型（fs/zip）
    #[serde(default)]
    pub asset_source: AssetSourceType,

    /// ZIP 文件路径（仅 Zip 模式使用）
    #[serde(default)]
    pub zip_path: Option<PathBuf>,

    #[serde(default)]
    pub viewport: ViewportConfig,

    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub animation: AnimationConfig,

    #[serde(default)]
    pub text: TextConfig,

    #[serde(default)]
    pub resources: ResourceConfig,

    #[serde(default)]
    pub video: VideoConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

/// 视口（渲染输出）尺寸
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: u32,
    #[serde(default = "default_viewport_height")]
    pub height: u32,
}

/// 相机配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// 平移/缩放过渡时长（毫秒）
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,
}

/// 动画配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// 缺省帧延迟（毫秒）
    #[serde(default = "default_delay_ms")]
    pub default_delay_ms: u32,
}

/// 文本编辑配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// 可编辑元素的缓冲区大小（可容纳 `edit_capacity - 1` 个字符）
    #[serde(default = "default_edit_capacity")]
    pub edit_capacity: usize,
}

/// 资源缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// 纹理缓存大小（MB）
    #[serde(default = "default_texture_cache_size_mb")]
    pub texture_cache_size_mb: usize,
}

/// 视频解码配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoConfig {
    /// ffmpeg 可执行文件，未设置时从 PATH 查找
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

/// 调试配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_assets_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

fn default_transition_ms() -> u64 {
    DEFAULT_TRANSITION_MS
}

fn default_delay_ms() -> u32 {
    DEFAULT_FRAME_DELAY_MS
}

fn default_edit_capacity() -> usize {
    DEFAULT_EDIT_CAPACITY
}

fn default_texture_cache_size_mb() -> usize {
    DEFAULT_TEXTURE_BUDGET_MB
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            assets_root: default_assets_root(),
            asset_source: AssetSourceType::default(),
            zip_path: None,
            viewport: ViewportConfig::default(),
            camera: CameraConfig::default(),
            animation: AnimationConfig::default(),
            text: TextConfig::default(),
            resources: ResourceConfig::default(),
            video: VideoConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            transition_ms: default_transition_ms(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: default_delay_ms(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            edit_capacity: default_edit_capacity(),
        }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            texture_cache_size_mb: default_texture_cache_size_mb(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl HostConfig {
    /// 加载配置文件
    ///
    /// 文件不存在或解析失败时返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.asset_source {
            AssetSourceType::Fs => {
                if !self.assets_root.is_dir() {
                    return Err(ConfigError::Validation(format!(
                        "资源目录不存在: {}",
                        self.assets_root.display()
                    )));
                }
            }
            AssetSourceType::Zip => {
                let zip_path = self.zip_path.as_ref().ok_or_else(|| {
                    ConfigError::Validation("Zip 模式必须配置 zip_path".to_string())
                })?;
                if !zip_path.is_file() {
                    return Err(ConfigError::Validation(format!(
                        "ZIP 文件不存在: {}",
                        zip_path.display()
                    )));
                }
            }
        }

        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Validation("视口尺寸不能为 0".to_string()));
        }
        if self.text.edit_capacity == 0 {
            return Err(ConfigError::Validation(
                "text.edit_capacity 必须大于 0".to_string(),
            ));
        }
        if self.resources.texture_cache_size_mb == 0 {
            return Err(ConfigError::Validation(
                "resources.texture_cache_size_mb 必须大于 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 按配置打开资源来源
    pub fn open_source(&self) -> Result<Box<dyn AssetSource>, ConfigError> {
        let source: Box<dyn AssetSource> = match self.asset_source {
            AssetSourceType::Fs => Box::new(FsSource::new(&self.assets_root)),
            AssetSourceType::Zip => {
                let zip_path = self.zip_path.as_ref().ok_or_else(|| {
                    ConfigError::Validation("Zip 模式必须配置 zip_path".to_string())
                })?;
                Box::new(ZipSource::open(zip_path)?)
            }
        };
        Ok(source)
    }

    pub fn decoder(&self) -> Decoder {
        let decoder = Decoder::new().with_default_delay(self.animation.default_delay_ms);
        match &self.video.ffmpeg_path {
            Some(path) => decoder.with_ffmpeg_path(path),
            None => decoder,
        }
    }

    pub fn animation_cache(&self) -> Result<AnimationCache, ConfigError> {
        Ok(AnimationCache::new(self.open_source()?, self.decoder()))
    }

    pub fn texture_cache<T: Clone>(&self) -> TextureCache<T> {
        TextureCache::new(self.resources.texture_cache_size_mb)
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.viewport.width, self.viewport.height)
            .with_transition_ms(self.camera.transition_ms)
    }

    /// 把元素设为可编辑，缓冲区大小取 `text.edit_capacity`
    pub fn make_editable(&self, item: &mut SceneItem) {
        item.editable = true;
        item.edit_capacity = self.text.edit_capacity;
    }
}
