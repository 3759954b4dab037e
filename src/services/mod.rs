pub mod artifact_store;
pub mod dispatcher;
pub mod renderer;
pub mod report_writer;
pub mod token;
pub mod verifier;

pub use artifact_store::ArtifactStore;
pub use dispatcher::NotificationDispatcher;
pub use renderer::{CertificateRender, CertificateRenderer};
pub use report_writer::ReportWriter;
pub use token::make_token;
pub use verifier::resolve;
