//! 基础设施层
//!
//! 持有外部资源（字体文件、文件系统、SMTP 连接），只暴露能力，不认识批次和记录。

pub mod artifact_writer;
pub mod fonts;
pub mod mailer;

pub use artifact_writer::write_canvas;
pub use fonts::{FontBook, FontChain, FontFace, FontSource};
pub use mailer::{MailTransport, SmtpMailer, TransportError};
