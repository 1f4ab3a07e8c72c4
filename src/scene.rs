use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::buffer::Image;
use crate::canvas::{self, Region};
use crate::error::GfxError;

/// Number of scene slots
pub const MAX_OBJECTS: usize = 30;

pub type ObjectRef = Rc<RefCell<SceneObject>>;

#[derive(Debug, Clone)]
pub enum ObjectKind {
    Image(Rc<Image>),
}

/// Something the scene can draw, with the region it covers
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub region: Region,
    pub enabled: bool,
}

impl SceneObject {
    pub fn new(kind: ObjectKind, region: Region) -> Self {
        Self {
            kind,
            region,
            enabled: true,
        }
    }

    /// Enabled object covering the whole image at (0, 0)
    pub fn from_image(img: Rc<Image>) -> Self {
        let region = Region::of_image(&img);
        Self::new(ObjectKind::Image(img), region)
    }

    pub fn into_ref(self) -> ObjectRef {
        Rc::new(RefCell::new(self))
    }

    /// Replace the image with its [`canvas::flip90`] mirror and swap the
    /// region's size to match
    pub fn flip90(&mut self) {
        match &mut self.kind {
            ObjectKind::Image(img) => {
                let flipped = canvas::flip90(img);
                self.region.source_w = flipped.width();
                self.region.source_h = flipped.height();
                *img = Rc::new(flipped);
            }
        }
    }

    pub fn draw(&self, dst: &mut Image) {
        match &self.kind {
            ObjectKind::Image(img) => canvas::blit(img, dst, &self.region),
        }
    }
}

/// Fixed set of object slots drawn in slot order.
///
/// Objects are shared with the caller, who can keep changing them between
/// draws. Removal compares identity, never contents.
pub struct Scene {
    slots: [Option<ObjectRef>; MAX_OBJECTS],
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Put `obj` in the first free slot and return the slot index
    pub fn add(&mut self, obj: &ObjectRef) -> Result<usize, GfxError> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
            .ok_or(GfxError::SceneFull)?;
        *slot = Some(Rc::clone(obj));
        debug!("scene object added to slot {index}");
        Ok(index)
    }

    /// Remove `obj`; false when it is not in the scene
    pub fn delete(&mut self, obj: &ObjectRef) -> bool {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|o| Rc::ptr_eq(o, obj)) {
                *slot = None;
                debug!("scene object removed from slot {index}");
                return true;
            }
        }
        false
    }

    pub fn delete_all(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Draw every enabled object onto `dst`
    pub fn draw_all(&self, dst: &mut Image) {
        for obj in self.iter() {
            let obj = obj.borrow();
            if obj.enabled {
                obj.draw(dst);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectRef> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{PixelFormat, RGB565_BLUE, RGB565_RED};

    fn object(color: u32) -> ObjectRef {
        SceneObject::from_image(Rc::new(Image::new(2, 2, PixelFormat::Rgb565, color))).into_ref()
    }

    #[test]
    fn test_add_fills_first_free_slot() {
        let mut scene = Scene::new();
        let (a, b, c) = (object(0), object(0), object(0));
        assert_eq!(scene.add(&a), Ok(0));
        assert_eq!(scene.add(&b), Ok(1));
        assert!(scene.delete(&a));
        assert_eq!(scene.add(&c), Ok(0));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_scene_full() {
        let mut scene = Scene::new();
        let objects: Vec<_> = (0..MAX_OBJECTS).map(|_| object(0)).collect();
        for (i, obj) in objects.iter().enumerate() {
            assert_eq!(scene.add(obj), Ok(i));
        }
        let extra = object(0);
        assert_eq!(scene.add(&extra), Err(GfxError::SceneFull));
        assert_eq!(scene.len(), MAX_OBJECTS);
        assert!(scene.iter().zip(&objects).all(|(a, b)| Rc::ptr_eq(a, b)));
    }

    #[test]
    fn test_delete_by_identity() {
        let mut scene = Scene::new();
        let a = object(RGB565_RED);
        let twin = object(RGB565_RED);
        scene.add(&a).unwrap();
        assert!(!scene.delete(&twin));
        assert!(scene.delete(&a));
        assert!(!scene.delete(&a));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_delete_all() {
        let mut scene = Scene::new();
        for _ in 0..5 {
            scene.add(&object(0)).unwrap();
        }
        scene.delete_all();
        assert!(scene.is_empty());
    }

    #[test]
    fn test_draw_all_order_and_enabled() {
        let mut scene = Scene::new();
        let red = object(RGB565_RED);
        let blue = object(RGB565_BLUE);
        blue.borrow_mut().region.dest_x = 1;
        scene.add(&red).unwrap();
        scene.add(&blue).unwrap();

        let mut dst = Image::new(3, 2, PixelFormat::Rgb565, 0);
        scene.draw_all(&mut dst);
        assert_eq!(dst.get_pixel(0, 0).unwrap(), RGB565_RED);
        assert_eq!(dst.get_pixel(1, 0).unwrap(), RGB565_BLUE);
        assert_eq!(dst.get_pixel(2, 1).unwrap(), RGB565_BLUE);

        blue.borrow_mut().enabled = false;
        let mut dst = Image::new(3, 2, PixelFormat::Rgb565, 0);
        scene.draw_all(&mut dst);
        assert_eq!(dst.get_pixel(1, 0).unwrap(), RGB565_RED);
        assert_eq!(dst.get_pixel(2, 0).unwrap(), 0);
    }

    #[test]
    fn test_empty_region_draws_nothing() {
        let mut scene = Scene::new();
        let obj = object(RGB565_RED);
        obj.borrow_mut().region.source_w = 0;
        scene.add(&obj).unwrap();
        let mut dst = Image::new(2, 2, PixelFormat::Rgb565, 0);
        scene.draw_all(&mut dst);
        assert_eq!(dst, Image::new(2, 2, PixelFormat::Rgb565, 0));
    }

    #[test]
    fn test_object_flip90() {
        let mut img = Image::new(3, 1, PixelFormat::Rgb565, 0);
        img.set_pixel(0, 0, RGB565_RED).unwrap();
        let mut obj = SceneObject::from_image(Rc::new(img));
        obj.flip90();
        assert_eq!((obj.region.source_w, obj.region.source_h), (1, 3));
        let ObjectKind::Image(img) = &obj.kind;
        assert_eq!((img.width(), img.height()), (1, 3));
        assert_eq!(img.get_pixel(0, 2).unwrap(), RGB565_RED);
    }
}
