pub mod errors;
pub mod header;
pub mod model;
pub mod samples;

pub use errors::{ParserError, RejectedRow};
pub use header::parse_header;
pub use model::{
    ExtractOptions, ParsedRecording, RecordingHeader, RecordingMetadata, RowPolicy, Sample,
    SampleExtraction,
};
pub use samples::extract_samples;

/// Parses the header block and the sample body of one recording.
pub fn parse_recording(
    content: &str,
    options: &ExtractOptions,
) -> Result<ParsedRecording, ParserError> {
    let header = parse_header(content);
    let SampleExtraction {
        samples,
        short_rows,
        rejected,
    } = extract_samples(content, options)?;

    Ok(ParsedRecording {
        header,
        samples,
        short_rows,
        rejected,
    })
}

#[cfg(test)]
mod tests;
