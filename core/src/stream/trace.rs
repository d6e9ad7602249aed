use crate::prelude::Sample;
use crate::stream::window::Window;

/// Error raised while serializing or replaying a two-column trace.
#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("expected 2 columns, found {0}")]
    ColumnCount(usize),
    #[error("trace buffer error: {0}")]
    Buffer(String),
}

/// Serializes the window's contents to the two-column trace format:
/// a header row with the axis labels, then one `t,v` row per stored
/// sample, oldest first. Float formatting is round-trip exact.
pub fn to_csv(window: &Window) -> Result<String, TraceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let (x_label, y_label) = window.labels();
    writer.write_record([x_label.as_str(), y_label.as_str()])?;

    for sample in window.snapshot() {
        writer.serialize((sample.t, sample.v))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TraceError::Buffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TraceError::Buffer(e.to_string()))
}

/// Replays a two-column trace into the window: the header row sets the
/// axis labels, every data row goes through [`Window::add`], so an
/// attached pipeline re-processes the replayed data.
pub fn from_csv(window: &Window, text: &str) -> Result<(), TraceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.len() != 2 {
        return Err(TraceError::ColumnCount(headers.len()));
    }
    window.set_labels(&headers[0], &headers[1]);

    for row in reader.deserialize::<(f64, f64)>() {
        let (t, v) = row?;
        window.add(Sample::new(t, v));
    }

    Ok(())
}
