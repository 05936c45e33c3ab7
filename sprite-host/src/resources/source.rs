//! # Asset Source 模块
//!
//! 资源来源抽象层，支持从文件系统目录或 ZIP 包读取动画文件。
//!
//! ## 设计说明
//!
//! - 所有路径参数都是逻辑路径，由 [`normalize_logical_path`] 规范化
//! - 文件系统来源能给出真实路径，视频解码依赖这一点
//! - ZIP 来源在打开时建立索引，之后复用同一个归档句柄

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use super::ResourceError;
use super::path::normalize_logical_path;

/// 资源来源 trait
pub trait AssetSource {
    /// 读取资源字节
    fn read(&self, path: &str) -> Result<Vec<u8>, ResourceError>;

    /// 检查资源是否存在
    fn exists(&self, path: &str) -> bool;

    /// 资源的完整路径（用于日志和错误消息）
    fn full_path(&self, path: &str) -> String;

    /// 资源在文件系统上的真实路径
    ///
    /// 打包来源返回 `None`。
    fn fs_path(&self, _path: &str) -> Option<PathBuf> {
        None
    }

    /// 列出目录下的直接文件（逻辑路径，已排序）
    fn list_files(&self, dir_path: &str) -> Vec<String>;
}

/// 文件系统资源来源
#[derive(Debug, Clone)]
pub struct FsSource {
    base_path: PathBuf,
}

impl FsSource {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, logical_path: &str) -> PathBuf {
        self.base_path.join(normalize_logical_path(logical_path))
    }
}

impl AssetSource for FsSource {
    fn read(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        let full_path = self.resolve(path);
        std::fs::read(&full_path).map_err(|e| {
            let path = full_path.to_string_lossy().to_string();
            if e.kind() == std::io::ErrorKind::NotFound {
                ResourceError::NotFound { path }
            } else {
                ResourceError::LoadFailed {
                    path,
                    kind: "file".to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn full_path(&self, path: &str) -> String {
        self.resolve(path).to_string_lossy().to_string()
    }

    fn fs_path(&self, path: &str) -> Option<PathBuf> {
        Some(self.resolve(path))
    }

    fn list_files(&self, dir_path: &str) -> Vec<String> {
        let full_dir = self.resolve(dir_path);
        let mut files: Vec<String> = std::fs::read_dir(&full_dir)
            .into_iter()
            .flatten()
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter_map(|path| {
                path.strip_prefix(&self.base_path)
                    .ok()
                    .map(|rel| rel.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        files.sort();
        files
    }
}

/// ZIP 资源来源
pub struct ZipSource {
    zip_path: PathBuf,
    archive: RefCell<ZipArchive<File>>,
    /// 逻辑路径 -> ZIP 内索引
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ZipSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipSource")
            .field("zip_path", &self.zip_path)
            .field("entries", &self.index.len())
            .finish()
    }
}

impl ZipSource {
    /// 打开 ZIP 包并建立索引
    pub fn open(zip_path: impl Into<PathBuf>) -> Result<Self, ResourceError> {
        let zip_path = zip_path.into();
        let load_failed = |message: String| ResourceError::LoadFailed {
            path: zip_path.to_string_lossy().to_string(),
            kind: "zip".to_string(),
            message,
        };

        let file = File::open(&zip_path)
            .map_err(|e| load_failed(format!("无法打开 ZIP 文件: {e}")))?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| load_failed(format!("无法读取 ZIP 文件: {e}")))?;

        let mut index = HashMap::new();
        for i in 0..archive.len() {
            if let Ok(entry) = archive.by_index(i)
                && !entry.is_dir()
            {
                index.insert(normalize_logical_path(entry.name()), i);
            }
        }
        debug!(path = %zip_path.display(), entries = index.len(), "ZIP 资源包已打开");

        Ok(Self {
            zip_path,
            archive: RefCell::new(archive),
            index,
        })
    }
}

impl AssetSource for ZipSource {
    fn read(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        let logical = normalize_logical_path(path);
        let &file_index = self
            .index
            .get(&logical)
            .ok_or_else(|| ResourceError::NotFound {
                path: self.full_path(&logical),
            })?;

        let load_failed = |message: String| ResourceError::LoadFailed {
            path: logical.clone(),
            kind: "zip".to_string(),
            message,
        };

        let mut archive = self.archive.borrow_mut();
        let mut entry = archive
            .by_index(file_index)
            .map_err(|e| load_failed(format!("无法读取 ZIP 条目: {e}")))?;
        let mut buffer = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buffer)
            .map_err(|e| load_failed(format!("解压 ZIP 条目失败: {e}")))?;
        Ok(buffer)
    }

    fn exists(&self, path: &str) -> bool {
        self.index.contains_key(&normalize_logical_path(path))
    }

    fn full_path(&self, path: &str) -> String {
        format!(
            "zip://{}#{}",
            self.zip_path.display(),
            normalize_logical_path(path)
        )
    }

    fn list_files(&self, dir_path: &str) -> Vec<String> {
        let dir = normalize_logical_path(dir_path);
        let prefix = if dir.is_empty() {
            dir
        } else {
            format!("{dir}/")
        };
        let mut files: Vec<String> = self
            .index
            .keys()
            .filter(|path| {
                path.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains('/'))
            })
            .cloned()
            .collect();
        files.sort();
        files
    }
}
