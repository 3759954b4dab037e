//! 证书渲染服务 - 业务能力层
//!
//! 只负责"把一个人的证书画出来并落盘"，不关心邮件和批次。

use std::path::PathBuf;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Luma, Rgb, RgbImage};
use qrcode::QrCode;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::RenderError;
use crate::infrastructure::{write_canvas, FontBook};
use crate::models::{CertificateArtifact, OutputFormat};
use crate::services::token::make_token;

const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// 证书渲染能力
///
/// 渲染是同步的 CPU 与磁盘操作，调用方在阻塞线程池中执行。
pub trait CertificateRender: Send + Sync + 'static {
    /// 渲染一张证书并返回已落盘的文件
    fn render(
        &self,
        name: &str,
        event_name: &str,
        date: &str,
        base_url: &str,
    ) -> Result<CertificateArtifact, RenderError>;
}

/// 版面坐标（像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    /// 活动名纵坐标（水平居中）
    event_y: i32,
    /// 姓名纵坐标（水平居中）
    name_y: i32,
    /// 日期固定坐标
    date_at: (i32, i32),
    /// 二维码边长
    qr_size: u32,
    /// 二维码距右边缘
    qr_margin_right: u32,
    /// 二维码距下边缘
    qr_margin_bottom: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            event_y: 140,
            name_y: 620,
            date_at: (1285, 825),
            qr_size: 140,
            qr_margin_right: 60,
            qr_margin_bottom: 40,
        }
    }
}

/// 证书渲染服务
///
/// 每次渲染都重新读取模板：模板在批次中途消失时，后续记录会得到
/// `TemplateMissing`，而不是继续使用旧画布。
pub struct CertificateRenderer {
    template_path: PathBuf,
    output_dir: PathBuf,
    format: OutputFormat,
    fonts: FontBook,
    layout: Layout,
}

impl CertificateRenderer {
    pub fn new(template_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, fonts: FontBook) -> Self {
        Self {
            template_path: template_path.into(),
            output_dir: output_dir.into(),
            format: OutputFormat::default(),
            fonts,
            layout: Layout::default(),
        }
    }

    pub fn from_config(config: &Config, fonts: FontBook) -> Self {
        Self::new(&config.template_path, &config.output_dir, fonts).with_format(config.output_format)
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    fn load_template(&self) -> Result<RgbImage, RenderError> {
        if !self.template_path.exists() {
            return Err(RenderError::TemplateMissing(self.template_path.clone()));
        }
        let template = image::open(&self.template_path).map_err(|source| RenderError::TemplateDecode {
            path: self.template_path.clone(),
            source,
        })?;
        Ok(template.to_rgb8())
    }
}

impl CertificateRender for CertificateRenderer {
    fn render(
        &self,
        name: &str,
        event_name: &str,
        date: &str,
        base_url: &str,
    ) -> Result<CertificateArtifact, RenderError> {
        let mut canvas = self.load_template()?;
        let (width, height) = canvas.dimensions();
        let layout = &self.layout;

        let event_x = centered_x(width, self.fonts.event.text_width(event_name));
        self.fonts.event.draw(&mut canvas, event_x, layout.event_y, event_name, INK);

        let name_x = centered_x(width, self.fonts.name.text_width(name));
        self.fonts.name.draw(&mut canvas, name_x, layout.name_y, name, INK);

        let (date_x, date_y) = layout.date_at;
        self.fonts.date.draw(&mut canvas, date_x, date_y, date, INK);

        let token = make_token(name);
        let url = verification_url(base_url, token.as_str());
        debug!("二维码内容: {}", url);

        let qr = qr_image(&url, layout.qr_size)?;
        let qr_x = i64::from(width) - i64::from(layout.qr_size) - i64::from(layout.qr_margin_right);
        let qr_y = i64::from(height) - i64::from(layout.qr_size) - i64::from(layout.qr_margin_bottom);
        imageops::overlay(&mut canvas, &qr, qr_x, qr_y);

        std::fs::create_dir_all(&self.output_dir).map_err(|e| RenderError::RenderIo {
            path: self.output_dir.clone(),
            detail: e.to_string(),
        })?;
        let artifact = CertificateArtifact::at(&self.output_dir, token, self.format);
        write_canvas(&canvas, &artifact)?;

        info!("✓ 已生成证书: {} -> {}", name, artifact.path.display());
        Ok(artifact)
    }
}

/// 验证链接：`{base}/verify/{token}`，base 末尾的 `/` 会被去掉
pub fn verification_url(base_url: &str, token: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    format!("{}/verify/{}", base, token)
}

/// 水平居中起点，文字比画布宽时为负
fn centered_x(canvas_width: u32, text_width: u32) -> i32 {
    let x = (i64::from(canvas_width) - i64::from(text_width)) / 2;
    i32::try_from(x).unwrap_or(i32::MIN)
}

fn qr_image(data: &str, size: u32) -> Result<RgbImage, RenderError> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| RenderError::Barcode(e.to_string()))?;
    let luma = code.render::<Luma<u8>>().build();
    let rgb = DynamicImage::ImageLuma8(luma).to_rgb8();
    Ok(imageops::resize(&rgb, size, size, FilterType::Nearest))
}
