use glam::Mat4;

use crate::types::FillMode;

use super::effect::ImageEffectLayer;

/// An orthographic scene camera.
///
/// `width`/`height` describe the visible scene area; the fill mode decides
/// how that area maps onto the output surface when aspect ratios differ.
#[derive(Debug, Default)]
pub struct Camera {
    pub width: f32,
    pub height: f32,
    /// Image-effect chain applied to this camera's output, if any.
    pub image_effect: Option<ImageEffectLayer>,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            image_effect: None,
        }
    }

    /// Orthographic projection for the current visible area.
    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh(
            -self.width / 2.0,
            self.width / 2.0,
            -self.height / 2.0,
            self.height / 2.0,
            -100.0,
            100.0,
        )
    }

    /// Refit the visible area to an output surface.
    ///
    /// Starting from the scene's authored size, the camera widens or
    /// narrows its view depending on the fill mode: `Aspect` letterboxes
    /// (shows more along the narrow axis), `AspectCrop` crops (shows less
    /// along the wide axis), `Stretch` keeps the authored area and lets the
    /// surface distort it.
    pub fn fit(&mut self, scene_w: f32, scene_h: f32, surface_w: u32, surface_h: u32, mode: FillMode) {
        self.width = scene_w;
        self.height = scene_h;
        if surface_w == 0 || surface_h == 0 || scene_w <= 0.0 || scene_h <= 0.0 {
            return;
        }
        let surface_aspect = surface_w as f32 / surface_h as f32;
        let scene_aspect = scene_w / scene_h;
        match mode {
            FillMode::Stretch => {}
            FillMode::Aspect => {
                if surface_aspect > scene_aspect {
                    self.width = scene_h * surface_aspect;
                } else {
                    self.height = scene_w / surface_aspect;
                }
            }
            FillMode::AspectCrop => {
                if surface_aspect > scene_aspect {
                    self.height = scene_w / surface_aspect;
                } else {
                    self.width = scene_h * surface_aspect;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_stretch_keeps_authored_area() {
        let mut cam = Camera::new(1920.0, 1080.0);
        cam.fit(1920.0, 1080.0, 1000, 1000, FillMode::Stretch);
        assert_eq!((cam.width, cam.height), (1920.0, 1080.0));
    }

    #[test]
    fn test_fit_aspect_letterboxes() {
        let mut cam = Camera::new(1000.0, 1000.0);
        // Wide surface: aspect fit shows extra width.
        cam.fit(1000.0, 1000.0, 2000, 1000, FillMode::Aspect);
        assert_eq!((cam.width, cam.height), (2000.0, 1000.0));
    }

    #[test]
    fn test_fit_aspect_crop_crops() {
        let mut cam = Camera::new(1000.0, 1000.0);
        // Wide surface: crop shows less height instead.
        cam.fit(1000.0, 1000.0, 2000, 1000, FillMode::AspectCrop);
        assert_eq!((cam.width, cam.height), (1000.0, 500.0));
    }

    #[test]
    fn test_projection_is_orthographic() {
        let cam = Camera::new(2.0, 2.0);
        let proj = cam.projection();
        let corner = proj.project_point3(glam::Vec3::new(1.0, 1.0, 0.0));
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
    }
}
