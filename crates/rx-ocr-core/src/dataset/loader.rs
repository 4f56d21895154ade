//! Reading the reference dataset from CSV.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use super::{DatasetIndex, DatasetResult, IndexBuilder};

impl DatasetIndex {
    /// Load the dataset CSV at `path`. The first row is a header.
    ///
    /// Fails on the first I/O or CSV error.
    pub fn load<P: AsRef<Path>>(path: P) -> DatasetResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Load the dataset from any CSV source. The first row is a header.
    pub fn from_reader<R: Read>(source: R) -> DatasetResult<Self> {
        let mut builder = IndexBuilder::new();
        read_rows(source, &mut builder)?;
        Ok(builder.finish())
    }

    /// Startup entry point: never fails.
    ///
    /// A missing or unreadable file yields an empty index. A parse error part
    /// way through keeps the rows indexed before it.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Medicine dataset not found, continuing with empty index");
                return Self::empty();
            }
        };

        info!(path = %path.display(), "Loading medicine dataset");
        let mut builder = IndexBuilder::new();
        if let Err(e) = read_rows(file, &mut builder) {
            warn!(path = %path.display(), error = %e, "Failed to read medicine dataset, keeping rows loaded so far");
        }

        let skipped = builder.skipped();
        let index = builder.finish();
        info!(
            medicines = index.len(),
            buckets = index.bucket_count(),
            skipped,
            "Medicine dataset loaded"
        );
        index
    }
}

fn read_rows<R: Read>(source: R, builder: &mut IndexBuilder) -> DatasetResult<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    for result in reader.records() {
        let record = result?;
        let fields: Vec<&str> = record.iter().collect();
        builder.push_row(fields.as_slice());
    }
    Ok(())
}
