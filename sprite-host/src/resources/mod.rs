//! # Resources 模块
//!
//! 资源来源与动画缓存。
//!
//! ## 设计说明
//!
//! - 动画按逻辑路径缓存，同一路径总是得到同一个 `Rc<Animation>`
//! - 场景元素只持有 `Rc`，缓存淘汰不会让正在使用的动画失效
//! - 能拿到真实文件路径时走 [`Decoder::decode`]（支持视频），否则读字节后走 `decode_bytes`

mod error;
pub mod path;
mod source;

pub use error::ResourceError;
pub use path::normalize_logical_path;
pub use source::{AssetSource, FsSource, ZipSource};

use std::collections::HashMap;
use std::rc::Rc;

use sprite_runtime::Animation;
use tracing::{debug, warn};

use crate::decode::Decoder;

/// 共享动画缓存
pub struct AnimationCache {
    source: Box<dyn AssetSource>,
    decoder: Decoder,
    entries: HashMap<String, Rc<Animation>>,
    placeholder: Rc<Animation>,
}

impl std::fmt::Debug for AnimationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationCache")
            .field("entries", &self.entries.len())
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}

impl AnimationCache {
    pub fn new(source: Box<dyn AssetSource>, decoder: Decoder) -> Self {
        Self {
            source,
            decoder,
            entries: HashMap::new(),
            placeholder: Rc::new(Animation::placeholder()),
        }
    }

    pub fn source(&self) -> &dyn AssetSource {
        self.source.as_ref()
    }

    /// 加载动画（命中缓存时直接返回）
    pub fn load(&mut self, path: &str) -> Result<Rc<Animation>, ResourceError> {
        let key = normalize_logical_path(path);
        if let Some(anim) = self.entries.get(&key) {
            return Ok(Rc::clone(anim));
        }

        let animation = match self.source.fs_path(&key) {
            Some(fs_path) => self.decoder.decode(fs_path)?,
            None => {
                let bytes = self.source.read(&key)?;
                self.decoder
                    .decode_bytes(&self.source.full_path(&key), &bytes)?
            }
        };
        debug!(
            path = %key,
            frames = animation.frame_count(),
            width = animation.width(),
            height = animation.height(),
            "动画已缓存"
        );

        let animation = Rc::new(animation);
        self.entries.insert(key, Rc::clone(&animation));
        Ok(animation)
    }

    /// 加载动画，失败时返回 1×1 透明占位动画
    ///
    /// 失败不会写入缓存，下次仍会重试。
    pub fn load_or_placeholder(&mut self, path: &str) -> Rc<Animation> {
        match self.load(path) {
            Ok(anim) => anim,
            Err(e) => {
                warn!(path = %path, error = %e, "动画加载失败，使用占位动画");
                Rc::clone(&self.placeholder)
            }
        }
    }

    /// 预加载目录下所有文件，返回成功数量
    pub fn preload_dir(&mut self, dir: &str) -> usize {
        let files = self.source.list_files(dir);
        files
            .iter()
            .filter(|path| match self.load(path) {
                Ok(_) => true,
                Err(e) => {
                    warn!(path = %path, error = %e, "预加载失败");
                    false
                }
            })
            .count()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize_logical_path(path))
    }

    /// 从缓存移除（已分发出去的 `Rc` 不受影响）
    pub fn remove(&mut self, path: &str) -> Option<Rc<Animation>> {
        self.entries.remove(&normalize_logical_path(path))
    }

    /// 移除只被缓存自己持有的动画，返回移除数量
    pub fn purge_unused(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, anim| Rc::strong_count(anim) > 1);
        let purged = before - self.entries.len();
        if purged > 0 {
            debug!(purged, remaining = self.entries.len(), "清理未使用动画");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
