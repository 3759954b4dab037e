//! 字体 - 基础设施层
//!
//! 每种文字角色（姓名、活动名、日期）对应一条按优先级排列的字体链，
//! 启动时解析一次。所有字体文件都不可用时回退到内置 8x8 点阵字体，
//! 因此缺字体永远不会导致渲染失败。

use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::{debug, warn};

/// 内置点阵字形边长（像素）
const GLYPH_SIZE: u32 = 8;

/// 一个候选字体
#[derive(Debug, Clone, PartialEq)]
pub struct FontSource {
    pub path: PathBuf,
    pub size: f32,
}

/// 按优先级排列的字体候选链
#[derive(Debug, Clone, PartialEq)]
pub struct FontChain {
    sources: Vec<FontSource>,
    /// 回退到内置字体时的目标像素高度
    fallback_px: u32,
}

impl FontChain {
    pub fn new(fallback_px: u32) -> Self {
        Self {
            sources: Vec::new(),
            fallback_px,
        }
    }

    /// 追加一个候选；路径为空时忽略
    pub fn then(mut self, path: Option<&Path>, size: f32) -> Self {
        if let Some(path) = path {
            self.sources.push(FontSource {
                path: path.to_path_buf(),
                size,
            });
        }
        self
    }

    pub fn sources(&self) -> &[FontSource] {
        &self.sources
    }

    /// 依次尝试候选字体，返回第一个可用的
    pub fn resolve(&self, role: &str) -> FontFace {
        for source in &self.sources {
            match load_font(&source.path) {
                Ok(font) => {
                    debug!("[{}] 使用字体 {} ({}px)", role, source.path.display(), source.size);
                    return FontFace::Scalable {
                        font,
                        scale: PxScale::from(source.size),
                    };
                }
                Err(e) => debug!("[{}] 字体不可用 {}: {}", role, source.path.display(), e),
            }
        }
        if !self.sources.is_empty() {
            warn!("[{}] ⚠️ 所有候选字体均不可用，使用内置字体", role);
        }
        FontFace::builtin(self.fallback_px)
    }
}

fn load_font(path: &Path) -> anyhow::Result<FontArc> {
    let bytes = std::fs::read(path)?;
    Ok(FontArc::try_from_vec(bytes)?)
}

/// 已解析的字体
#[derive(Clone)]
pub enum FontFace {
    /// TrueType / OpenType 字体
    Scalable { font: FontArc, scale: PxScale },
    /// 内置点阵字体，每个点放大 `scale` 倍
    Builtin { scale: u32 },
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontFace::Scalable { scale, .. } => f.debug_struct("Scalable").field("scale", &scale.y).finish(),
            FontFace::Builtin { scale } => f.debug_struct("Builtin").field("scale", scale).finish(),
        }
    }
}

impl FontFace {
    /// 内置字体，按目标像素高度取整数放大倍数
    pub fn builtin(px: u32) -> Self {
        FontFace::Builtin {
            scale: (px / GLYPH_SIZE).max(1),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FontFace::Builtin { .. })
    }

    /// 文字渲染宽度（像素）
    pub fn text_width(&self, text: &str) -> u32 {
        match self {
            FontFace::Scalable { font, scale } => text_size(*scale, font, text).0,
            FontFace::Builtin { scale } => {
                let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                chars.saturating_mul(GLYPH_SIZE * scale)
            }
        }
    }

    /// 在 (x, y) 处绘制文字，超出画布的部分被裁掉
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        match self {
            FontFace::Scalable { font, scale } => draw_text_mut(canvas, color, x, y, *scale, font, text),
            FontFace::Builtin { scale } => draw_bitmap_text(canvas, x, y, text, *scale, color),
        }
    }
}

fn draw_bitmap_text(canvas: &mut RgbImage, x: i32, y: i32, text: &str, scale: u32, color: Rgb<u8>) {
    let step = (GLYPH_SIZE * scale) as i32;
    let dot = scale as i32;
    for (i, ch) in text.chars().enumerate() {
        // 非 ASCII 字符用 '?' 代替
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let origin_x = x.saturating_add(step.saturating_mul(i as i32));
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = origin_x + col as i32 * dot;
                let py = y + row as i32 * dot;
                draw_filled_rect_mut(canvas, Rect::at(px, py).of_size(scale, scale), color);
            }
        }
    }
}

/// 证书三种文字角色的字体
#[derive(Debug, Clone)]
pub struct FontBook {
    pub name: FontFace,
    pub event: FontFace,
    pub date: FontFace,
}

impl FontBook {
    /// 默认字体链：
    /// - 姓名：首选@80 → 备选@72 → 内置
    /// - 活动名：备选@60 → 内置
    /// - 日期：备选@45 → 内置
    pub fn default_chains(preferred: Option<&Path>, secondary: Option<&Path>) -> [FontChain; 3] {
        [
            FontChain::new(80).then(preferred, 80.0).then(secondary, 72.0),
            FontChain::new(60).then(secondary, 60.0),
            FontChain::new(45).then(secondary, 45.0),
        ]
    }

    pub fn resolve(preferred: Option<&Path>, secondary: Option<&Path>) -> Self {
        let [name, event, date] = Self::default_chains(preferred, secondary);
        Self {
            name: name.resolve("姓名"),
            event: event.resolve("活动名"),
            date: date.resolve("日期"),
        }
    }

    /// 只使用内置字体
    pub fn builtin() -> Self {
        Self::resolve(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fonts_fall_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.ttf");
        let book = FontBook::resolve(Some(absent.as_path()), Some(absent.as_path()));

        assert!(book.name.is_builtin());
        assert!(book.event.is_builtin());
        assert!(book.date.is_builtin());
    }

    #[test]
    fn test_invalid_font_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();

        let face = FontChain::new(45).then(Some(bogus.as_path()), 45.0).resolve("日期");
        assert!(face.is_builtin());
    }

    #[test]
    fn test_default_chain_order() {
        let preferred = Path::new("bold.ttf");
        let secondary = Path::new("regular.ttf");
        let [name, event, date] = FontBook::default_chains(Some(preferred), Some(secondary));

        let name_paths: Vec<_> = name.sources().iter().map(|s| (s.path.clone(), s.size)).collect();
        assert_eq!(
            name_paths,
            vec![(PathBuf::from("bold.ttf"), 80.0), (PathBuf::from("regular.ttf"), 72.0)]
        );
        assert_eq!(event.sources().len(), 1);
        assert_eq!(date.sources()[0].size, 45.0);
    }

    #[test]
    fn test_builtin_width_scales_with_length() {
        let face = FontFace::builtin(80);
        assert!(matches!(face, FontFace::Builtin { scale: 10 }));
        assert_eq!(face.text_width("Ada"), 3 * 8 * 10);
        assert_eq!(face.text_width(""), 0);
    }

    #[test]
    fn test_builtin_draw_marks_pixels() {
        let mut canvas = RgbImage::from_pixel(64, 16, Rgb([255, 255, 255]));
        FontFace::builtin(8).draw(&mut canvas, 0, 0, "A", Rgb([0, 0, 0]));

        assert!(canvas.pixels().any(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_builtin_draw_clips_outside_canvas() {
        let mut canvas = RgbImage::from_pixel(16, 16, Rgb([255, 255, 255]));
        FontFace::builtin(16).draw(&mut canvas, -40, 100, "Hello", Rgb([0, 0, 0]));
        assert!(canvas.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }
}
