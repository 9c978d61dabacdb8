use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::foundation::core::{Affine, Flip, IRect, ISize, Point, Rgba8};
use crate::foundation::error::{StageError, StageResult};
use crate::render::blend::{PremulRgba8, over, premultiply_in_place, unpremultiply_in_place};
use crate::render::surface::{Surface, Texture, TextureId, TextureSource};

/// RGBA8 pixels of one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major pixel bytes, four per pixel.
    pub data: Vec<u8>,
    /// Whether color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Copy with straight (non-premultiplied) alpha.
    pub fn to_straight(&self) -> FrameRGBA {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_in_place(&mut data);
        }
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }

    /// Encode as PNG (straight alpha).
    pub fn save_png(&self, path: &Path) -> StageResult<()> {
        let straight = self.to_straight();
        let img = image::RgbaImage::from_raw(straight.width, straight.height, straight.data)
            .ok_or_else(|| StageError::validation("frame buffer does not match its size"))?;
        img.save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| StageError::resource(format!("write png '{}': {e}", path.display())))
    }
}

struct CpuTexture {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CpuTexture {
    fn texel(&self, x: u32, y: u32) -> PremulRgba8 {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// Headless reference [`Surface`]: a premultiplied RGBA8 raster.
///
/// Textures are decoded with `image`, fills and quads blend source-over, sprites are sampled
/// nearest-neighbour. `present` snapshots the buffer.
pub struct CpuSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
    clip: Option<IRect>,
    textures: HashMap<TextureId, CpuTexture>,
    next_texture: u32,
    asset_root: PathBuf,
    refresh_interval: Option<f64>,
    presented: Option<FrameRGBA>,
    present_count: u64,
}

impl CpuSurface {
    /// Surface of `size` pixels, cleared to transparent.
    pub fn new(size: ISize) -> StageResult<Self> {
        let size = ISize::non_empty(size.w, size.h)?;
        Ok(Self {
            width: size.w as u32,
            height: size.h as u32,
            data: vec![0; (size.w as usize) * (size.h as usize) * 4],
            clip: None,
            textures: HashMap::new(),
            next_texture: 1,
            asset_root: PathBuf::from("."),
            refresh_interval: None,
            presented: None,
            present_count: 0,
        })
    }

    /// Directory relative texture paths resolve against.
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Refresh interval to report, emulating a display.
    pub fn with_refresh_interval(mut self, secs: f64) -> Self {
        self.refresh_interval = Some(secs);
        self
    }

    /// Current (not yet presented) buffer.
    pub fn frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
            premultiplied: true,
        }
    }

    /// Most recently presented frame.
    pub fn last_presented(&self) -> Option<&FrameRGBA> {
        self.presented.as_ref()
    }

    /// Number of `present` calls so far.
    pub fn present_count(&self) -> u64 {
        self.present_count
    }

    /// Number of textures currently loaded.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Premultiplied pixel of the current buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x as i32, y as i32);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Write the last presented frame (or the current buffer) as PNG.
    pub fn save_png(&self, path: &Path) -> StageResult<()> {
        match &self.presented {
            Some(frame) => frame.save_png(path),
            None => self.frame().save_png(path),
        }
    }

    fn index(&self, x: i32, y: i32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    fn bounds(&self) -> IRect {
        let full = IRect::new(0, 0, self.width as i32, self.height as i32);
        match self.clip {
            Some(c) => full.intersect(c),
            None => full,
        }
    }

    fn blend(&mut self, x: i32, y: i32, src: PremulRgba8, alpha: u8) {
        let i = self.index(x, y);
        let dst = [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ];
        self.data[i..i + 4].copy_from_slice(&over(dst, src, alpha));
    }

    fn decode_file(&self, path: &Path) -> StageResult<CpuTexture> {
        let full = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_root.join(path)
        };
        let bytes = std::fs::read(&full)
            .map_err(|e| StageError::resource(format!("read texture '{}': {e}", full.display())))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| {
                StageError::resource(format!("decode texture '{}': {e}", full.display()))
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let mut data = img.into_raw();
        premultiply_in_place(&mut data);
        Ok(CpuTexture {
            width,
            height,
            data,
        })
    }
}

impl Surface for CpuSurface {
    fn size(&self) -> ISize {
        ISize::new(self.width as i32, self.height as i32)
    }

    fn refresh_interval(&self) -> Option<f64> {
        self.refresh_interval
    }

    fn resize(&mut self, size: ISize) {
        if size.is_empty() {
            return;
        }
        self.width = size.w as u32;
        self.height = size.h as u32;
        self.data = vec![0; (size.w as usize) * (size.h as usize) * 4];
        self.clip = None;
    }

    fn load_texture(&mut self, source: &TextureSource) -> StageResult<Texture> {
        let texture = match source {
            TextureSource::File { path } => self.decode_file(path)?,
            TextureSource::Solid { size, color } => {
                let size = ISize::non_empty(size.w, size.h)
                    .map_err(|e| StageError::resource(format!("solid texture: {e}")))?;
                let px = color.to_premul();
                let count = (size.w as usize) * (size.h as usize);
                CpuTexture {
                    width: size.w as u32,
                    height: size.h as u32,
                    data: px.repeat(count),
                }
            }
        };
        if texture.width == 0 || texture.height == 0 {
            return Err(StageError::resource("texture has no pixels"));
        }

        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        let size = ISize::new(texture.width as i32, texture.height as i32);
        self.textures.insert(id, texture);
        tracing::debug!(id = id.0, w = size.w, h = size.h, "texture loaded");
        Ok(Texture { id, size })
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn clear(&mut self, color: Rgba8) {
        let px = color.to_premul();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    fn fill_rect(&mut self, rect: IRect, color: Rgba8) {
        let r = rect.intersect(self.bounds());
        if r.is_empty() || color.a == 0 {
            return;
        }
        let src = color.to_premul();
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                self.blend(x, y, src, 255);
            }
        }
    }

    fn draw_texture(
        &mut self,
        texture: TextureId,
        src: Option<IRect>,
        dst: IRect,
        rotation_deg: f64,
        flip: Flip,
        alpha: u8,
    ) {
        if dst.is_empty() || alpha == 0 {
            return;
        }
        let Some(tex) = self.textures.remove(&texture) else {
            tracing::warn!(id = texture.0, "draw with unknown texture");
            return;
        };
        let full = IRect::new(0, 0, tex.width as i32, tex.height as i32);
        let src = src.map_or(full, |s| s.intersect(full));
        if !src.is_empty() {
            let dst_k = dst.to_kurbo();
            let to_screen = Affine::rotate_about(rotation_deg.to_radians(), dst_k.center());
            let to_quad = to_screen.inverse();
            let bbox = to_screen.transform_rect_bbox(dst_k);
            let covered = IRect::new(
                bbox.x0.floor() as i32,
                bbox.y0.floor() as i32,
                (bbox.x1.ceil() - bbox.x0.floor()) as i32,
                (bbox.y1.ceil() - bbox.y0.floor()) as i32,
            )
            .intersect(self.bounds());

            for y in covered.y..covered.bottom() {
                for x in covered.x..covered.right() {
                    let q = to_quad * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                    let u = (q.x - dst_k.x0) / dst_k.width();
                    let v = (q.y - dst_k.y0) / dst_k.height();
                    if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                        continue;
                    }
                    let u = if flip.flips_x() { 1.0 - u } else { u };
                    let v = if flip.flips_y() { 1.0 - v } else { v };
                    let sx = ((u * f64::from(src.w)) as i32).clamp(0, src.w - 1) + src.x;
                    let sy = ((v * f64::from(src.h)) as i32).clamp(0, src.h - 1) + src.y;
                    let texel = tex.texel(sx as u32, sy as u32);
                    self.blend(x, y, texel, alpha);
                }
            }
        }
        self.textures.insert(texture, tex);
    }

    fn set_clip(&mut self, clip: Option<IRect>) {
        self.clip = clip;
    }

    fn present(&mut self) -> StageResult<()> {
        self.presented = Some(self.frame());
        self.present_count += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
