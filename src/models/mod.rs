pub mod artifact;
pub mod loaders;
pub mod outcome;
pub mod participant;

pub use artifact::{CertificateArtifact, OutputFormat, Token};
pub use loaders::{load_participants, load_participants_from_reader};
pub use outcome::{BatchResultRow, BatchSummary, DeliveryFailure, DeliveryOutcome};
pub use participant::{BatchJob, ParticipantRecord, RawRecord, SenderCredentials};
