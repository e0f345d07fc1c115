// Compressed JSON lines reading and writing.
//
// One quotation per line, compact JSON, optionally wrapped in bzip2 or
// gzip. The compression is picked from the file extension. Writers must
// be finished explicitly so the compressed stream gets its trailer.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use super::record::Quotation;

/// Compression wrapper around a JSON lines stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Bzip2,
    Gzip,
    Plain,
}

impl Compression {
    /// Pick the compression from the file extension (`.bz2`, `.gz`, anything else is plain).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("bz2") => Compression::Bzip2,
            Some("gz") => Compression::Gzip,
            _ => Compression::Plain,
        }
    }
}

/// Wrap a raw byte source in the matching decompressor.
///
/// Multi-stream decoders are used because parallel compressors (pbzip2,
/// pigz) concatenate independent streams into one file.
pub fn decoder<R: Read + 'static>(inner: R, compression: Compression) -> Box<dyn BufRead> {
    match compression {
        Compression::Bzip2 => Box::new(BufReader::new(bzip2::read::MultiBzDecoder::new(inner))),
        Compression::Gzip => Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(inner))),
        Compression::Plain => Box::new(BufReader::new(inner)),
    }
}

/// Iterator over the quotations of a JSON lines stream.
///
/// Blank lines are skipped. A line that fails to parse yields an error
/// naming the source and the 1-based line number; callers are expected to
/// abort on it.
pub struct JsonLinesReader<R> {
    lines: io::Lines<R>,
    line_no: usize,
    source: String,
}

impl<R: BufRead> JsonLinesReader<R> {
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            source: source.into(),
        }
    }

    /// Number of lines consumed so far, blank lines included.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl JsonLinesReader<Box<dyn BufRead>> {
    /// Open a (possibly compressed) JSON lines file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Ok(Self::new(
            decoder(file, Compression::from_path(path)),
            path.display().to_string(),
        ))
    }
}

impl<R: BufRead> Iterator for JsonLinesReader<R> {
    type Item = Result<Quotation>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;

            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(anyhow::Error::new(e).context(format!(
                        "Failed to read line {} of {}",
                        self.line_no, self.source
                    ))))
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            return Some(serde_json::from_str(&line).with_context(|| {
                format!("Malformed JSON on line {} of {}", self.line_no, self.source)
            }));
        }
    }
}

enum Sink<W: Write> {
    Bzip2(bzip2::write::BzEncoder<W>),
    Gzip(flate2::write::GzEncoder<W>),
    Plain(W),
}

impl<W: Write> Write for Sink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Bzip2(w) => w.write(buf),
            Sink::Gzip(w) => w.write(buf),
            Sink::Plain(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Bzip2(w) => w.flush(),
            Sink::Gzip(w) => w.flush(),
            Sink::Plain(w) => w.flush(),
        }
    }
}

/// Writes quotations as compact JSON, one per line.
pub struct JsonLinesWriter<W: Write> {
    sink: Sink<W>,
    written: u64,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(inner: W, compression: Compression) -> Self {
        let sink = match compression {
            Compression::Bzip2 => {
                Sink::Bzip2(bzip2::write::BzEncoder::new(inner, bzip2::Compression::best()))
            }
            Compression::Gzip => Sink::Gzip(flate2::write::GzEncoder::new(
                inner,
                flate2::Compression::default(),
            )),
            Compression::Plain => Sink::Plain(inner),
        };
        Self { sink, written: 0 }
    }

    pub fn write(&mut self, quote: &Quotation) -> Result<()> {
        serde_json::to_writer(&mut self.sink, quote).context("Failed to serialize quotation")?;
        self.sink
            .write_all(b"\n")
            .context("Failed to write quotation")?;
        self.written += 1;
        Ok(())
    }

    /// Number of quotations written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Finish the compressed stream and flush, returning the inner writer.
    pub fn finish(self) -> Result<W> {
        let mut inner = match self.sink {
            Sink::Bzip2(w) => w.finish().context("Failed to finish bzip2 stream")?,
            Sink::Gzip(w) => w.finish().context("Failed to finish gzip stream")?,
            Sink::Plain(w) => w,
        };
        inner.flush().context("Failed to flush output")?;
        Ok(inner)
    }
}

impl JsonLinesWriter<BufWriter<File>> {
    /// Create (or truncate) a JSON lines file, compressed according to
    /// `compression_hint`'s extension.
    pub fn create(path: &Path, compression_hint: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Self::new(
            BufWriter::new(file),
            Compression::from_path(compression_hint),
        ))
    }
}
