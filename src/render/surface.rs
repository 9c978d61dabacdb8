use std::path::PathBuf;

use crate::foundation::core::{Flip, IRect, ISize, Rgba8};
use crate::foundation::error::StageResult;

/// Opaque handle to a texture owned by a [`Surface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// A texture loaded by a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Texture {
    /// Surface-specific handle.
    pub id: TextureId,
    /// Natural size in pixels.
    pub size: ISize,
}

/// Where a sprite's pixels come from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextureSource {
    /// Encoded image file, decoded by the surface.
    File {
        /// Path, relative paths resolve against the surface's asset root.
        path: PathBuf,
    },
    /// Solid color block generated in memory.
    Solid {
        /// Texture size.
        size: ISize,
        /// Fill color.
        color: Rgba8,
    },
}

/// Drawing surface the compositor renders into.
///
/// The core never rasterizes anything itself; it resolves geometry and order, then issues
/// these calls. Implementations own all backing resources.
pub trait Surface {
    /// Current pixel size.
    fn size(&self) -> ISize;

    /// Display refresh interval in seconds, when the platform reports one.
    fn refresh_interval(&self) -> Option<f64> {
        None
    }

    /// The platform changed the output size.
    fn resize(&mut self, _size: ISize) {}

    /// Acquire a texture. Failures abort preparation of the requesting node.
    fn load_texture(&mut self, source: &TextureSource) -> StageResult<Texture>;

    /// Release a texture previously returned by [`Surface::load_texture`].
    fn release_texture(&mut self, texture: TextureId);

    /// Fill the whole surface, ignoring the clip.
    fn clear(&mut self, color: Rgba8);

    /// Fill `rect` with `color` (straight alpha, blended over existing pixels).
    fn fill_rect(&mut self, rect: IRect, color: Rgba8);

    /// Copy `src` of `texture` (whole texture when `None`) into `dst`, rotated by
    /// `rotation_deg` clockwise about the center of `dst`, mirrored per `flip` and
    /// modulated by `alpha`.
    fn draw_texture(
        &mut self,
        texture: TextureId,
        src: Option<IRect>,
        dst: IRect,
        rotation_deg: f64,
        flip: Flip,
        alpha: u8,
    );

    /// Restrict subsequent drawing to `clip`; `None` removes the restriction.
    fn set_clip(&mut self, clip: Option<IRect>);

    /// Publish the composited frame.
    fn present(&mut self) -> StageResult<()>;
}
