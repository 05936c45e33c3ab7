//! # Compositor 模块
//!
//! 每帧的绘制通道：按场景顺序把元素的动画帧和文字标签画到输出面上。
//!
//! ## 绘制规则
//!
//! - 生效槽位为 pressed > hover > normal，槽位内的所有动画叠加绘制
//! - `Layout::Center` 以槽位内最大宽高为基准居中每个动画
//! - 帧由 [`current_frame`] 按元素自己的起始 tick 选出
//! - 每帧开始时把输出尺寸同步给相机
//! - 被相机剔除的矩形直接跳过
//! - 文字标签先画背景（元素矩形与文字尺寸取大），再画文字纹理
//! - 标签背景是按颜色缓存的纯色动画，和普通帧走同一条纹理路径

use std::collections::HashMap;
use std::rc::Rc;

use sprite_runtime::{
    Animation, Camera, FontId, Frame, ItemId, Layout, Rect, Rgba, Scene, SceneItem, Tick,
    current_frame,
};
use tracing::{debug, warn};

use super::{RenderSurface, TextService, TextureCache};

/// 单次绘制统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// 画出的动画帧数量
    pub sprites: usize,
    /// 被剔除的动画数量
    pub culled: usize,
    /// 画出的文字标签数量
    pub labels: usize,
}

/// 元素文字标签的缓存
#[derive(Debug)]
struct Label<T> {
    text: String,
    font: FontId,
    size: (u32, u32),
    texture: Option<T>,
}

/// 合成器
#[derive(Debug)]
pub struct Compositor<T> {
    textures: TextureCache<T>,
    labels: HashMap<ItemId, Label<T>>,
    backgrounds: HashMap<Rgba, Rc<Animation>>,
    clear_color: Rgba,
}

impl<T: Clone> Compositor<T> {
    pub fn new(textures: TextureCache<T>) -> Self {
        Self {
            textures,
            labels: HashMap::new(),
            backgrounds: HashMap::new(),
            clear_color: Rgba([0, 0, 0, 0xff]),
        }
    }

    pub fn with_clear_color(mut self, color: Rgba) -> Self {
        self.clear_color = color;
        self
    }

    pub fn textures(&self) -> &TextureCache<T> {
        &self.textures
    }

    /// 绘制整个场景
    ///
    /// 调用前应已完成本帧的输入分发、`Camera::tick` 与 `refresh_hover`。
    /// 相机视口在这里按输出尺寸更新，窗口缩放后下一帧的命中测试随之生效。
    pub fn draw<S>(
        &mut self,
        surface: &mut S,
        text: &mut dyn TextService,
        scene: &Scene,
        camera: &mut Camera,
        now: Tick,
    ) -> DrawStats
    where
        S: RenderSurface<Texture = T>,
    {
        let (width, height) = surface.output_size();
        if camera.viewport() != (width, height) {
            debug!(width, height, "视口尺寸变化");
            camera.set_viewport(width, height);
        }
        let camera = &*camera;

        self.textures.unpin_all();
        surface.clear(self.clear_color);

        let mut stats = DrawStats::default();
        for (id, item) in scene.iter() {
            self.draw_anims(surface, item, camera, now, &mut stats);
            self.draw_label(surface, text, id, item, camera, &mut stats);
        }

        // 已移除元素的标签
        self.labels.retain(|id, _| scene.contains(*id));
        stats
    }

    fn draw_anims<S>(
        &mut self,
        surface: &mut S,
        item: &SceneItem,
        camera: &Camera,
        now: Tick,
        stats: &mut DrawStats,
    ) where
        S: RenderSurface<Texture = T>,
    {
        let (max_w, max_h) = item.anims.max_size(item.active_slot());
        for anim in item.active_anims() {
            let rect = layout_rect(item, anim, max_w, max_h);
            let Some(dest) =
                camera.world_to_screen_scaled(rect, item.overlay, item.zoom_x, item.zoom_y)
            else {
                stats.culled += 1;
                continue;
            };
            let index = current_frame(anim, item.anim_loop, item.anim_start_tick, now);
            let texture = self.frame_texture(surface, anim.frame(index));
            surface.draw_texture(&texture, dest, item.angle, item.flip);
            stats.sprites += 1;
        }
    }

    fn frame_texture<S>(&mut self, surface: &mut S, frame: &Frame) -> T
    where
        S: RenderSurface<Texture = T>,
    {
        let id = frame.id();
        let texture = match self.textures.get(id) {
            Some(texture) => texture,
            None => match surface.create_texture(frame.image()) {
                Ok(texture) => {
                    let size = frame.image().pixels().len();
                    self.textures.insert(id, texture.clone(), size);
                    texture
                }
                Err(e) => {
                    warn!(frame = id.get(), error = %e, "纹理创建失败，使用占位纹理");
                    return surface.placeholder_texture();
                }
            },
        };
        self.textures.pin(id);
        texture
    }

    fn draw_label<S>(
        &mut self,
        surface: &mut S,
        text: &mut dyn TextService,
        id: ItemId,
        item: &SceneItem,
        camera: &Camera,
        stats: &mut DrawStats,
    ) where
        S: RenderSurface<Texture = T>,
    {
        let Some(font) = item.font else {
            return;
        };
        if item.text.is_empty() {
            self.labels.remove(&id);
            return;
        }

        let stale = self
            .labels
            .get(&id)
            .is_none_or(|label| label.text != item.text || label.font != font);
        if stale {
            let size = text.measure(font, &item.text);
            let texture = text
                .rasterize(font, &item.text)
                .and_then(|image| match surface.create_texture(&image) {
                    Ok(texture) => Some(texture),
                    Err(e) => {
                        warn!(item = %id, error = %e, "文字纹理创建失败");
                        None
                    }
                });
            debug!(item = %id, width = size.0, height = size.1, "文字标签已更新");
            self.labels.insert(
                id,
                Label {
                    text: item.text.clone(),
                    font,
                    size,
                    texture,
                },
            );
        }
        let Some(label) = self.labels.get(&id) else {
            return;
        };

        let (tw, th) = (to_i32(label.size.0), to_i32(label.size.1));
        if !item.background.is_transparent() {
            let bg = Rect::new(
                item.rect.x,
                item.rect.y,
                item.rect.w.max(tw),
                item.rect.h.max(th),
            );
            if let Some(dest) =
                camera.world_to_screen_scaled(bg, item.overlay, item.zoom_x, item.zoom_y)
            {
                let anim = self.background(item.background);
                let texture = self.frame_texture(surface, anim.frame(0));
                surface.draw_texture(&texture, dest, item.angle, item.flip);
            }
        }

        let Some(texture) = self.labels.get(&id).and_then(|l| l.texture.as_ref()) else {
            return;
        };
        let rect = Rect::new(item.rect.x, item.rect.y, tw, th);
        if let Some(dest) =
            camera.world_to_screen_scaled(rect, item.overlay, item.zoom_x, item.zoom_y)
        {
            surface.draw_texture(texture, dest, item.angle, item.flip);
            stats.labels += 1;
        }
    }
}

impl<T> Compositor<T> {
    /// 指定颜色的 1x1 纯色动画，绘制时拉伸到目标矩形
    fn background(&mut self, color: Rgba) -> Rc<Animation> {
        self.backgrounds
            .entry(color)
            .or_insert_with(|| Rc::new(Animation::solid_color(1, 1, color)))
            .clone()
    }
}

/// 动画在元素内的摆放矩形
fn layout_rect(item: &SceneItem, anim: &Animation, max_w: u32, max_h: u32) -> Rect {
    let (w, h) = (to_i32(anim.width()), to_i32(anim.height()));
    match item.layout {
        Layout::TopLeft => Rect::new(item.rect.x, item.rect.y, w, h),
        Layout::Center => Rect::new(
            item.rect.x + (to_i32(max_w) - w) / 2,
            item.rect.y + (to_i32(max_h) - h) / 2,
            w,
            h,
        ),
    }
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderError;
    use sprite_runtime::{AnimSlot, Dispatcher, Flip, FrameImage, InputEvent, ScreenRect};

    /// 纹理用图像左上角像素颜色标识
    #[derive(Default)]
    struct FakeSurface {
        created: usize,
        draws: Vec<([u8; 4], ScreenRect)>,
        fail_create: bool,
        size: Option<(u32, u32)>,
    }

    impl RenderSurface for FakeSurface {
        type Texture = [u8; 4];

        fn output_size(&self) -> (u32, u32) {
            self.size.unwrap_or((800, 600))
        }

        fn create_texture(&mut self, image: &FrameImage) -> Result<[u8; 4], RenderError> {
            if self.fail_create {
                return Err(RenderError::TextureCreation {
                    width: image.width(),
                    height: image.height(),
                    message: "out of memory".into(),
                });
            }
            self.created += 1;
            Ok(image.pixel(0, 0).unwrap_or([0; 4]))
        }

        fn placeholder_texture(&mut self) -> [u8; 4] {
            [1, 2, 3, 4]
        }

        fn draw_texture(&mut self, texture: &[u8; 4], dest: ScreenRect, _angle: f64, _flip: Flip) {
            self.draws.push((*texture, dest));
        }

        fn clear(&mut self, _color: Rgba) {
            self.draws.clear();
        }
    }

    const TEXT_COLOR: [u8; 4] = [0xfe, 0xfe, 0xfe, 0xff];

    struct FakeText;

    impl TextService for FakeText {
        fn measure(&mut self, _font: FontId, text: &str) -> (u32, u32) {
            (text.chars().count() as u32 * 8, 16)
        }

        fn rasterize(&mut self, font: FontId, text: &str) -> Option<FrameImage> {
            let (w, h) = self.measure(font, text);
            Some(FrameImage::filled(w, h, Rgba(TEXT_COLOR)))
        }
    }

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Rc<Animation> {
        Rc::new(Animation::solid_color(w, h, Rgba(rgba)))
    }

    fn overlay_item(x: i32, y: i32, anim: Rc<Animation>) -> SceneItem {
        let mut item = SceneItem::new();
        item.overlay = true;
        item.set_pos(x, y);
        item.push_anim(anim);
        item
    }

    fn compositor() -> Compositor<[u8; 4]> {
        Compositor::new(TextureCache::with_default_budget())
    }

    #[test]
    fn test_draws_in_scene_order_and_caches_textures() {
        let mut scene = Scene::new();
        scene.insert(overlay_item(0, 0, solid(10, 10, [255, 0, 0, 255])));
        scene.insert(overlay_item(20, 0, solid(10, 10, [0, 255, 0, 255])));
        let mut camera = Camera::new(800, 600);
        let mut surface = FakeSurface::default();
        let mut comp = compositor();

        let stats = comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 0);
        assert_eq!(stats.sprites, 2);
        assert_eq!(surface.draws[0].0, [255, 0, 0, 255]);
        assert_eq!(surface.draws[1].1, ScreenRect::new(20, 0, 10, 10));

        comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 16);
        assert_eq!(surface.created, 2);
        assert_eq!(comp.textures().len(), 2);
    }

    #[test]
    fn test_world_item_goes_through_camera() {
        let mut scene = Scene::new();
        let mut item = SceneItem::new();
        item.set_pos(0, 0);
        item.push_anim(solid(10, 10, [9, 9, 9, 255]));
        scene.insert(item);
        let mut camera = Camera::new(800, 600);
        let mut surface = FakeSurface::default();

        compositor().draw(&mut surface, &mut FakeText, &scene, &mut camera, 0);
        assert_eq!(surface.draws[0].1, ScreenRect::new(400, 300, 10, 10));
    }

    #[test]
    fn test_culled_item_skipped() {
        let mut scene = Scene::new();
        scene.insert(overlay_item(900, 0, solid(10, 10, [0; 4])));
        let mut camera = Camera::new(800, 600);
        let mut surface = FakeSurface::default();

        let stats = compositor().draw(&mut surface, &mut FakeText, &scene, &mut camera, 0);
        let expected = DrawStats {
            sprites: 0,
            culled: 1,
            labels: 0,
        };
        assert_eq!(stats, expected);
        assert!(surface.draws.is_empty());
        assert_eq!(surface.created, 0);
    }

    #[test]
    fn test_center_layout() {
        let mut item = overlay_item(0, 0, solid(10, 10, [1, 0, 0, 255]));
        item.layout = Layout::Center;
        item.push_anim(solid(4, 4, [2, 0, 0, 255]));
        let mut scene = Scene::new();
        scene.insert(item);
        let mut surface = FakeSurface::default();
        let mut camera = Camera::new(800, 600);

        compositor().draw(&mut surface, &mut FakeText, &scene, &mut camera, 0);
        assert_eq!(surface.draws[0].1, ScreenRect::new(0, 0, 10, 10));
        assert_eq!(surface.draws[1].1, ScreenRect::new(3, 3, 4, 4));
    }

    #[test]
    fn test_frame_selected_by_tick() {
        let frames = vec![
            Frame::new(FrameImage::filled(2, 2, Rgba([10, 0, 0, 255]))),
            Frame::new(FrameImage::filled(2, 2, Rgba([20, 0, 0, 255]))),
        ];
        let anim = Rc::new(Animation::new(frames, vec![100, 100]).unwrap());
        let mut item = overlay_item(0, 0, anim);
        item.anim_start_tick = 1000;
        let mut scene = Scene::new();
        scene.insert(item);
        let mut camera = Camera::new(800, 600);
        let mut surface = FakeSurface::default();
        let mut comp = compositor();

        comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 1050);
        assert_eq!(surface.draws[0].0, [10, 0, 0, 255]);
        comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 1150);
        assert_eq!(surface.draws[0].0, [20, 0, 0, 255]);
        comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 1250);
        assert_eq!(surface.draws[0].0, [10, 0, 0, 255]);
    }

    #[test]
    fn test_hover_set_used_after_dispatch() {
        let mut item = overlay_item(0, 0, solid(10, 10, [1, 1, 1, 255]));
        item.anims.push(AnimSlot::Hover, solid(10, 10, [2, 2, 2, 255]));
        let mut scene = Scene::new();
        scene.insert(item);
        let mut camera = Camera::new(800, 600);
        let mut dispatcher = Dispatcher::new();
        let mut surface = FakeSurface::default();
        let mut comp = compositor();

        let over = InputEvent::MouseMotion { x: 5, y: 5 };
        dispatcher.dispatch(&over, &mut scene, &camera);
        dispatcher.refresh_hover(&mut scene, &camera);
        comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 0);
        assert_eq!(surface.draws[0].0, [2, 2, 2, 255]);

        let away = InputEvent::MouseMotion { x: 50, y: 50 };
        dispatcher.dispatch(&away, &mut scene, &camera);
        dispatcher.refresh_hover(&mut scene, &camera);
        comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 0);
        assert_eq!(surface.draws[0].0, [1, 1, 1, 255]);
    }

    #[test]
    fn test_label_background_and_cache() {
        let mut item = SceneItem::new();
        item.overlay = true;
        item.set_pos(0, 0);
        item.set_shape(10, 30);
        item.font = Some(FontId(1));
        item.background = Rgba([0, 0, 255, 255]);
        item.set_text("abc");
        let mut scene = Scene::new();
        let id = scene.insert(item);
        let mut camera = Camera::new(800, 600);
        let mut surface = FakeSurface::default();
        let mut comp = compositor();

        let stats = comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 0);
        assert_eq!(stats.labels, 1);
        // 背景与普通帧一样经过纹理路径
        let bg = [0, 0, 255, 255];
        assert_eq!(surface.draws[0], (bg, ScreenRect::new(0, 0, 24, 30)));
        assert_eq!(surface.draws[1].0, TEXT_COLOR);
        assert_eq!(surface.draws[1].1, ScreenRect::new(0, 0, 24, 16));

        comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 16);
        assert_eq!(surface.created, 2);
        assert_eq!(comp.textures().len(), 1);

        if let Some(item) = scene.get_mut(id) {
            item.set_text("abcd");
        }
        comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 32);
        assert_eq!(surface.created, 3);
        assert_eq!(surface.draws[0].1.w, 32);
        assert_eq!(surface.draws[1].1.w, 32);

        scene.remove(id);
        comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 48);
        assert!(comp.labels.is_empty());
    }

    #[test]
    fn test_viewport_follows_output_size() {
        let mut scene = Scene::new();
        let mut item = SceneItem::new();
        item.set_pos(0, 0);
        item.push_anim(solid(10, 10, [9, 9, 9, 255]));
        scene.insert(item);
        scene.insert(overlay_item(300, 0, solid(10, 10, [8, 8, 8, 255])));
        let mut camera = Camera::new(800, 600);
        let mut surface = FakeSurface::default();
        let mut comp = compositor();

        let stats = comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 0);
        assert_eq!(stats.sprites, 2);
        assert_eq!(surface.draws[0].1, ScreenRect::new(400, 300, 10, 10));

        surface.size = Some((200, 100));
        let stats = comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 16);
        assert_eq!(camera.viewport(), (200, 100));
        let expected = DrawStats {
            sprites: 1,
            culled: 1,
            labels: 0,
        };
        assert_eq!(stats, expected);
        assert_eq!(surface.draws[0].1, ScreenRect::new(100, 50, 10, 10));
    }

    #[test]
    fn test_texture_failure_uses_placeholder() {
        let mut scene = Scene::new();
        scene.insert(overlay_item(0, 0, solid(4, 4, [7; 4])));
        let mut surface = FakeSurface {
            fail_create: true,
            ..Default::default()
        };
        let mut camera = Camera::new(800, 600);
        let mut comp = compositor();

        comp.draw(&mut surface, &mut FakeText, &scene, &mut camera, 0);
        assert_eq!(surface.draws[0].0, [1, 2, 3, 4]);
        assert!(comp.textures().is_empty());
    }
}
