//! Viewer façade
//!
//! Bundles a loaded [`GltfAsset`] with the [`SceneRenderer`], the interactive
//! [`UserCamera`] and the [`AnimationTimer`]. Hosts drive it with
//! [`Viewer::advance`] and [`Viewer::render`] once per frame.
//!
//! ```rust,ignore
//! use lumen::{GltfLoader, RenderingOptions, Viewer, WgpuDevice};
//!
//! let asset = GltfLoader::new().load_file("Box.gltf".as_ref())?;
//! let mut device = WgpuDevice::new_headless(800, 600)?;
//! let mut viewer = Viewer::new(asset)?;
//! let options = RenderingOptions::default();
//!
//! viewer.timer_mut().start();
//! viewer.advance(viewer.timer().elapsed_sec());
//! viewer.render(&mut device, &options);
//! ```

use crate::assets::GltfAsset;
use crate::errors::Result;
use crate::renderer::SceneRenderer;
use crate::renderer::device::RenderDevice;
use crate::renderer::settings::{AnimationSelector, RenderingOptions};
use crate::scene::{Extents, UserCamera, update_hierarchy};
use crate::utils::AnimationTimer;

pub struct Viewer {
    asset: GltfAsset,
    renderer: SceneRenderer,
    user_camera: UserCamera,
    timer: AnimationTimer,
    /// Animation selection of the most recent frame; `advance` applies it.
    animation: AnimationSelector,
}

impl Viewer {
    /// Wraps `asset` and frames its default scene with the user camera.
    pub fn new(asset: GltfAsset) -> Result<Self> {
        Ok(Self::with_renderer(asset, SceneRenderer::new()?))
    }

    #[must_use]
    pub fn with_renderer(asset: GltfAsset, renderer: SceneRenderer) -> Self {
        let mut viewer = Self {
            asset,
            renderer,
            user_camera: UserCamera::default(),
            timer: AnimationTimer::new(),
            animation: AnimationSelector::All,
        };
        let scene = viewer.asset.default_scene;
        viewer.frame_scene(scene);
        viewer
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn asset(&self) -> &GltfAsset {
        &self.asset
    }

    pub fn asset_mut(&mut self) -> &mut GltfAsset {
        &mut self.asset
    }

    #[must_use]
    pub fn renderer(&self) -> &SceneRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut SceneRenderer {
        &mut self.renderer
    }

    #[must_use]
    pub fn user_camera(&self) -> &UserCamera {
        &self.user_camera
    }

    pub fn user_camera_mut(&mut self) -> &mut UserCamera {
        &mut self.user_camera
    }

    #[must_use]
    pub fn timer(&self) -> &AnimationTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut AnimationTimer {
        &mut self.timer
    }

    // ========================================================================
    // Per frame
    // ========================================================================

    /// Applies the active animations at `time` seconds.
    pub fn advance(&mut self, time: f32) {
        self.asset.advance_animations(self.animation, time);
    }

    /// Renders one frame into `device`.
    pub fn render(&mut self, device: &mut dyn RenderDevice, options: &RenderingOptions) {
        self.animation = options.animation;
        self.user_camera.aspect_ratio = device.aspect_ratio();
        self.renderer
            .render(&mut self.asset, device, options, &self.user_camera);
    }

    /// World-space bounds of scene `scene_index` at the current pose.
    #[must_use]
    pub fn scene_extents(&mut self, scene_index: usize) -> Extents {
        let Some(scene) = self.asset.scenes.get(scene_index) else {
            return Extents::EMPTY;
        };
        update_hierarchy(&mut self.asset.nodes, &scene.nodes, false);
        scene.extents(&self.asset.nodes, &self.asset.meshes, &self.asset.accessors)
    }

    /// Resets the user camera onto the bounds of `scene_index`.
    pub fn frame_scene(&mut self, scene_index: usize) {
        let extents = self.scene_extents(scene_index);
        if extents.is_empty() {
            log::debug!("Scene {scene_index} has no bounds, keeping the default camera");
            return;
        }
        self.user_camera.reset(&extents);
    }

    /// Releases every GPU object owned by the viewer.
    pub fn destroy(&mut self, device: &mut dyn RenderDevice) {
        self.renderer.destroy(device);
        self.asset.destroy();
    }
}
