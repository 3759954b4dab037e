pub mod certificate_flow;
pub mod record_ctx;

pub use certificate_flow::CertificateFlow;
pub use record_ctx::RecordCtx;
