pub mod config;
pub mod discovery;
pub mod error;
pub mod observation;
pub mod outputs;
pub mod pipeline;
pub mod timestamps;

pub use config::{ConverterConfig, IdentifierSource, MetadataMode};
pub use ecg_fhir_parser::RowPolicy;
pub use error::{ConvertError, Result};
pub use observation::Observation;
pub use pipeline::{build_observations, run, Conversion, ConversionReport, ConversionSummary, TimingSource};
