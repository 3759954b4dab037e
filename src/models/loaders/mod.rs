pub mod csv_loader;

pub use csv_loader::{load_participants, load_participants_from_reader};
