use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use noodles::vcf::{self as vcf, variant::io::Write as _, variant::RecordBuf};
use tracing::{debug, warn};

use crate::output::{OutputSink, SinkError};

/// Writes VCF records to any [`Write`] implementation
pub struct VcfSink<W: Write> {
    writer: vcf::io::Writer<W>,
    header: vcf::Header,
    records_written: u64,
}

impl<W: Write> VcfSink<W> {
    /// Write `header` to `inner` and return a sink ready for records
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Io` if the header cannot be written.
    pub fn new(inner: W, header: &vcf::Header) -> Result<Self, SinkError> {
        let mut writer = vcf::io::Writer::new(inner);
        writer.write_header(header)?;
        Ok(Self {
            writer,
            header: header.clone(),
            records_written: 0,
        })
    }

    #[must_use]
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> OutputSink<RecordBuf> for VcfSink<W> {
    fn write(&mut self, record: RecordBuf) -> Result<(), SinkError> {
        self.writer.write_variant_record(&self.header, &record)?;
        self.records_written += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SinkError> {
        self.writer.get_mut().flush()?;
        Ok(())
    }
}

/// Plain or gzip-compressed file output
enum FileWriter {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl FileWriter {
    /// Flush, writing the gzip trailer if compressed
    fn finish(self) -> io::Result<()> {
        match self {
            Self::Plain(mut w) => w.flush(),
            Self::Gzip(w) => w.finish()?.flush(),
        }
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
        }
    }
}

/// A VCF file on disk, gzip-compressed when the path ends in `.gz`.
///
/// If the sink is dropped without a successful [`finalize`](OutputSink::finalize),
/// the partially written file is removed.
pub struct VcfFileSink {
    path: PathBuf,
    sink: Option<VcfSink<FileWriter>>,
    finalized: bool,
}

impl VcfFileSink {
    /// Create the file at `path` and write `header`
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Io` if the file cannot be created or the header written.
    pub fn create(path: &Path, header: &vcf::Header) -> Result<Self, SinkError> {
        let file = File::create(path).map(BufWriter::new)?;

        let writer = if path.to_string_lossy().ends_with(".gz") {
            FileWriter::Gzip(GzEncoder::new(file, flate2::Compression::default()))
        } else {
            FileWriter::Plain(file)
        };

        // Construct before writing the header so a failure still removes the file
        let mut this = Self {
            path: path.to_path_buf(),
            sink: None,
            finalized: false,
        };
        this.sink = Some(VcfSink::new(writer, header)?);
        Ok(this)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputSink<RecordBuf> for VcfFileSink {
    fn write(&mut self, record: RecordBuf) -> Result<(), SinkError> {
        self.sink.as_mut().ok_or(SinkError::Closed)?.write(record)
    }

    fn finalize(&mut self) -> Result<(), SinkError> {
        let sink = self.sink.take().ok_or(SinkError::Closed)?;
        let records = sink.records_written();
        sink.into_inner().finish()?;
        self.finalized = true;
        debug!(path = %self.path.display(), records, "finalized VCF output");
        Ok(())
    }
}

impl Drop for VcfFileSink {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        // Close the file before removing it
        drop(self.sink.take());
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove incomplete output");
        } else {
            debug!(path = %self.path.display(), "removed incomplete output");
        }
    }
}
