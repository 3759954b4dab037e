//! 证书落盘 - 基础设施层
//!
//! PDF 输出把整张画布作为单页图像嵌入，页面尺寸与画布一致（1 像素 = 1 点）。

use std::path::Path;

use image::{ImageFormat, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

use crate::error::RenderError;
use crate::models::{CertificateArtifact, OutputFormat};

/// 页面资源中图像的名字
const IMAGE_NAME: &str = "Im0";

/// 按证书格式写出画布
pub fn write_canvas(canvas: &RgbImage, artifact: &CertificateArtifact) -> Result<(), RenderError> {
    let result = match artifact.format {
        OutputFormat::Pdf => write_pdf(canvas, &artifact.path),
        OutputFormat::Png => canvas
            .save_with_format(&artifact.path, ImageFormat::Png)
            .map_err(|e| e.to_string()),
    };

    result.map_err(|detail| RenderError::RenderIo {
        path: artifact.path.clone(),
        detail,
    })?;

    debug!("证书已写入: {}", artifact.path.display());
    Ok(())
}

fn write_pdf(canvas: &RgbImage, path: &Path) -> Result<(), String> {
    let (width, height) = canvas.dimensions();
    let (width, height) = (i64::from(width), i64::from(height));

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        canvas.as_raw().clone(),
    ));

    // 把单位图像拉伸到整页
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![width.into(), 0.into(), 0.into(), height.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().map_err(|e| e.to_string())?,
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { IMAGE_NAME => image_id },
        },
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path).map_err(|e| e.to_string())?;
    Ok(())
}
