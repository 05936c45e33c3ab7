//! # Scene 模块
//!
//! 场景元素的所有权容器。
//!
//! ## 设计说明
//!
//! - 元素存放在连续的槽位数组中，以 [`ItemId`]（索引 + 代数）引用
//! - 槽位被移除后可复用，代数递增使旧 ID 失效
//! - 绘制与命中测试顺序为插入顺序，与槽位复用无关

use std::fmt;

use crate::item::SceneItem;

/// 场景元素 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
    index: u32,
    generation: u32,
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({}v{})", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    item: Option<SceneItem>,
}

/// 场景
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<ItemId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入元素，追加到绘制顺序末尾
    pub fn insert(&mut self, item: SceneItem) -> ItemId {
        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.item = Some(item);
            ItemId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 0,
                item: Some(item),
            });
            ItemId {
                index,
                generation: 0,
            }
        };
        self.order.push(id);
        id
    }

    /// 移除元素；ID 已失效时返回 `None`
    pub fn remove(&mut self, id: ItemId) -> Option<SceneItem> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let item = slot.item.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.order.retain(|&other| other != id);
        Some(item)
    }

    pub fn get(&self, id: ItemId) -> Option<&SceneItem> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.item.as_ref()
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut SceneItem> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.item.as_mut()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// 按绘制顺序排列的 ID
    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    /// 按绘制顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &SceneItem)> {
        self.order
            .iter()
            .filter_map(|&id| self.get(id).map(|item| (id, item)))
    }

    /// 可变遍历全部元素（不保证顺序）
    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut SceneItem> {
        self.slots.iter_mut().filter_map(|slot| slot.item.as_mut())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 移除全部元素
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.order) {
            self.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(tag: i64) -> SceneItem {
        let mut item = SceneItem::new();
        item.user_int1 = tag;
        item
    }

    #[test]
    fn test_insert_get_remove() {
        let mut scene = Scene::new();
        let a = scene.insert(item(1));
        let b = scene.insert(item(2));
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(a).map(|i| i.user_int1), Some(1));

        let removed = scene.remove(a).unwrap();
        assert_eq!(removed.user_int1, 1);
        assert!(scene.get(a).is_none());
        assert!(scene.remove(a).is_none());
        assert_eq!(scene.ids(), &[b]);
    }

    #[test]
    fn test_stale_id_after_slot_reuse() {
        let mut scene = Scene::new();
        let a = scene.insert(item(1));
        scene.remove(a);
        let c = scene.insert(item(3));
        assert_ne!(a, c);
        assert!(scene.get(a).is_none());
        assert_eq!(scene.get(c).map(|i| i.user_int1), Some(3));
    }

    #[test]
    fn test_iteration_is_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.insert(item(1));
        scene.insert(item(2));
        scene.remove(a);
        scene.insert(item(3));
        let tags: Vec<i64> = scene.iter().map(|(_, i)| i.user_int1).collect();
        assert_eq!(tags, vec![2, 3]);
    }

    #[test]
    fn test_items_mut_skips_removed() {
        let mut scene = Scene::new();
        let a = scene.insert(item(1));
        scene.insert(item(2));
        scene.remove(a);
        for item in scene.items_mut() {
            item.user_int2 = 9;
        }
        assert_eq!(scene.items_mut().count(), 1);
        assert!(scene.iter().all(|(_, i)| i.user_int2 == 9));
    }

    #[test]
    fn test_clear() {
        let mut scene = Scene::new();
        let a = scene.insert(item(1));
        scene.insert(item(2));
        scene.clear();
        assert!(scene.is_empty());
        assert!(!scene.contains(a));
    }
}
