use bind_stats_gatherer::{
    Accumulator,
    Fields,
    MetricKind,
    Tags,
};
use serde::Serialize;
use std::io::{
    self,
    Write,
};

#[derive(Serialize)]
struct Line<'a> {
    measurement: &'a str,
    kind: MetricKind,
    fields: &'a Fields,
    tags: &'a Tags,
}

/// Writes one JSON object per observation.
///
/// [`Accumulator`] methods cannot fail, so the first write error is kept and
/// every later observation is dropped. [`JsonLines::finish`] reports it.
pub struct JsonLines<W: Write> {
    writer: W,
    written: usize,
    error: Option<io::Error>,
}

impl<W: Write> JsonLines<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            error: None,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write(&mut self, line: Line<'_>) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.writer, &line)
            .map_err(io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        match result {
            Ok(()) => self.written += 1,
            Err(err) => self.error = Some(err),
        }
    }
}

impl<W: Write> Accumulator for JsonLines<W> {
    fn add_counter(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        self.write(Line {
            measurement,
            kind: MetricKind::Counter,
            fields: &fields,
            tags: &tags,
        });
    }

    fn add_gauge(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        self.write(Line {
            measurement,
            kind: MetricKind::Gauge,
            fields: &fields,
            tags: &tags,
        });
    }
}
