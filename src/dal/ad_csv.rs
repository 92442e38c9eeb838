use std::{collections::HashSet, fs::File, io::Write, path::Path};

use anyhow::Context;

use crate::domain::{Advertisement, CSV_HEADER};

pub struct AdCsvWriter<W: Write> {
    writer: csv::Writer<W>,
    seen_phones: HashSet<String>,
    dedupe_empty_phones: bool,
    written: usize,
    duplicates: usize,
}

impl AdCsvWriter<File> {
    pub fn create(path: &Path, dedupe_empty_phones: bool) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        Ok(AdCsvWriter::new(file, dedupe_empty_phones)?)
    }
}

impl<W: Write> AdCsvWriter<W> {
    pub fn new(inner: W, dedupe_empty_phones: bool) -> Result<Self, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(CSV_HEADER)?;

        Ok(AdCsvWriter {
            writer,
            seen_phones: HashSet::new(),
            dedupe_empty_phones,
            written: 0,
            duplicates: 0,
        })
    }

    /// Returns `false` when the phone was already written in this run.
    pub fn write_unique(&mut self, ad: &Advertisement) -> Result<bool, csv::Error> {
        let tracked = self.dedupe_empty_phones || !ad.phone.is_empty();

        if tracked && self.seen_phones.contains(&ad.phone) {
            self.duplicates += 1;
            return Ok(false);
        }

        self.writer.serialize(ad)?;
        if tracked {
            self.seen_phones.insert(ad.phone.clone());
        }
        self.written += 1;

        Ok(true)
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn finish(self) -> anyhow::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush output: {}", e.error()))
    }
}
