//! # Texture Cache 模块
//!
//! 按帧缓存后端纹理，带 LRU 驱逐和显存预算。

use std::collections::{HashMap, VecDeque};

use sprite_runtime::FrameId;
use tracing::{trace, warn};

/// 默认显存预算：256 MB
pub const DEFAULT_TEXTURE_BUDGET_MB: usize = 256;

#[derive(Debug)]
struct CacheEntry<T> {
    texture: T,
    /// 估算的显存占用（字节）
    size_bytes: usize,
    pinned: bool,
}

/// 纹理缓存
///
/// - LRU 驱逐
/// - 显存预算限制
/// - 当前帧用到的纹理被 pin 住，帧开始时 [`unpin_all`](Self::unpin_all)
#[derive(Debug)]
pub struct TextureCache<T> {
    entries: HashMap<FrameId, CacheEntry<T>>,
    /// 最近使用的在后面
    lru_order: VecDeque<FrameId>,
    budget_bytes: usize,
    used_bytes: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<T: Clone> TextureCache<T> {
    pub fn new(budget_mb: usize) -> Self {
        Self::with_budget_bytes(budget_mb * 1024 * 1024)
    }

    pub fn with_budget_bytes(budget_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru_order: VecDeque::new(),
            budget_bytes,
            used_bytes: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn with_default_budget() -> Self {
        Self::new(DEFAULT_TEXTURE_BUDGET_MB)
    }

    /// 获取纹理并更新 LRU
    pub fn get(&mut self, id: FrameId) -> Option<T> {
        match self.entries.get(&id).map(|e| e.texture.clone()) {
            Some(texture) => {
                self.hits += 1;
                self.touch(id);
                Some(texture)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn contains(&self, id: FrameId) -> bool {
        self.entries.contains_key(&id)
    }

    /// 插入纹理，超出预算时先驱逐未 pin 的旧纹理
    pub fn insert(&mut self, id: FrameId, texture: T, size_bytes: usize) {
        self.remove(id);

        while self.used_bytes + size_bytes > self.budget_bytes {
            if !self.evict_one() {
                warn!(
                    used_mb = (self.used_bytes + size_bytes) as f64 / 1024.0 / 1024.0,
                    budget_mb = self.budget_bytes as f64 / 1024.0 / 1024.0,
                    "纹理缓存超出预算且无法驱逐（全部被 pin），强制插入"
                );
                break;
            }
        }

        self.used_bytes += size_bytes;
        self.entries.insert(
            id,
            CacheEntry {
                texture,
                size_bytes,
                pinned: false,
            },
        );
        self.lru_order.push_back(id);
    }

    pub fn pin(&mut self, id: FrameId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.pinned = true;
        }
    }

    pub fn unpin_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.pinned = false;
        }
    }

    pub fn remove(&mut self, id: FrameId) -> Option<T> {
        let entry = self.entries.remove(&id)?;
        self.used_bytes = self.used_bytes.saturating_sub(entry.size_bytes);
        self.lru_order.retain(|k| *k != id);
        Some(entry.texture)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru_order.clear();
        self.used_bytes = 0;
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            entries: self.entries.len(),
            used_bytes: self.used_bytes,
            budget_bytes: self.budget_bytes,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            hit_rate: if lookups > 0 {
                self.hits as f64 / lookups as f64
            } else {
                0.0
            },
        }
    }

    fn touch(&mut self, id: FrameId) {
        self.lru_order.retain(|k| *k != id);
        self.lru_order.push_back(id);
    }

    /// 驱逐最久未使用且未 pin 的纹理
    fn evict_one(&mut self) -> bool {
        let Some(pos) = self
            .lru_order
            .iter()
            .position(|id| self.entries.get(id).is_some_and(|e| !e.pinned))
        else {
            return false;
        };
        let Some(id) = self.lru_order.remove(pos) else {
            return false;
        };
        if let Some(entry) = self.entries.remove(&id) {
            self.used_bytes = self.used_bytes.saturating_sub(entry.size_bytes);
            self.evictions += 1;
            trace!(frame = id.get(), bytes = entry.size_bytes, "驱逐纹理");
        }
        true
    }
}

/// 缓存统计信息
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    pub used_bytes: usize,
    pub budget_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}

impl CacheStats {
    /// 格式化为可读字符串
    pub fn format(&self) -> String {
        format!(
            "Cache: {} entries, {:.1}MB / {:.1}MB ({:.1}%), hit rate: {:.1}%, evictions: {}",
            self.entries,
            self.used_bytes as f64 / 1024.0 / 1024.0,
            self.budget_bytes as f64 / 1024.0 / 1024.0,
            if self.budget_bytes > 0 {
                self.used_bytes as f64 / self.budget_bytes as f64 * 100.0
            } else {
                0.0
            },
            self.hit_rate * 100.0,
            self.evictions,
        )
    }
}
