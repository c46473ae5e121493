use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

const READ_BUFFER: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("failed to read dump: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },
    #[error("dump truncated at byte {position} inside an open element")]
    Truncated { position: u64 },
}

/// One `<page>` element with both title and body captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub text: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Text,
}

#[derive(Default)]
struct PartialPage {
    title: Option<String>,
    text: Option<String>,
}

/// Pull-based page iterator over a MediaWiki XML export.
///
/// Holds only the page currently being assembled; yielded pages are not
/// retained. After an error the iterator is fused.
pub struct DumpReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    field_buf: String,
    field: Option<Field>,
    page: Option<PartialPage>,
    depth: usize,
    dropped: usize,
    done: bool,
}

/// A page stream that also reports how many `<page>` elements it discarded.
pub trait PageSource: Iterator<Item = Result<Page, DumpError>> {
    fn dropped(&self) -> usize;
}

/// Open a dump file, decompressing `.bz2` on the fly.
pub fn open(path: &Path) -> Result<DumpReader<Box<dyn BufRead>>, DumpError> {
    let file = File::open(path)?;
    let is_bz2 = path.extension().is_some_and(|e| e == "bz2");

    let source: Box<dyn BufRead> = if is_bz2 {
        let decoder = bzip2::bufread::MultiBzDecoder::new(BufReader::new(file));
        Box::new(BufReader::with_capacity(READ_BUFFER, decoder))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER, file))
    };

    debug!("Opened dump {} (bz2: {})", path.display(), is_bz2);
    Ok(DumpReader::new(source))
}

impl<R: BufRead> DumpReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::with_capacity(8192),
            field_buf: String::new(),
            field: None,
            page: None,
            depth: 0,
            dropped: 0,
            done: false,
        }
    }

    fn read_error(&self, err: quick_xml::Error) -> DumpError {
        match err {
            // Decoder failures (bad bz2 data) surface here.
            quick_xml::Error::Io(io) => DumpError::Io(
                Arc::try_unwrap(io)
                    .unwrap_or_else(|shared| io::Error::new(shared.kind(), shared.to_string())),
            ),
            other => self.malformed(other),
        }
    }

    fn malformed(&self, err: impl Display) -> DumpError {
        DumpError::Malformed {
            position: self.reader.buffer_position() as u64,
            message: err.to_string(),
        }
    }

    fn next_page(&mut self) -> Result<Option<Page>, DumpError> {
        // Events borrow the buffer, so it is lent out while they are handled.
        let mut buf = std::mem::take(&mut self.buf);
        let result = self.read_until_page(&mut buf);
        self.buf = buf;
        result
    }

    fn read_until_page(&mut self, buf: &mut Vec<u8>) -> Result<Option<Page>, DumpError> {
        loop {
            buf.clear();
            let event = self
                .reader
                .read_event_into(buf)
                .map_err(|e| self.read_error(e))?;

            match event {
                Event::Start(e) => {
                    self.depth += 1;
                    match e.local_name().as_ref() {
                        b"page" => self.page = Some(PartialPage::default()),
                        b"title" if self.page.is_some() => self.begin(Field::Title),
                        b"text" if self.page.is_some() => self.begin(Field::Text),
                        _ => {}
                    }
                }
                // `<text/>` is a captured, empty body.
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"text" {
                        if let Some(page) = self.page.as_mut() {
                            page.text = Some(String::new());
                        }
                    }
                }
                Event::Text(e) => {
                    if self.field.is_some() {
                        let text = e.unescape().map_err(|err| self.malformed(err))?;
                        self.field_buf.push_str(&text);
                    }
                }
                Event::CData(e) => {
                    if self.field.is_some() {
                        self.field_buf.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::End(e) => {
                    self.depth = self.depth.saturating_sub(1);
                    match e.local_name().as_ref() {
                        b"title" => self.finish(Field::Title),
                        b"text" => self.finish(Field::Text),
                        b"page" => {
                            if let Some(page) = self.page.take() {
                                match (page.title, page.text) {
                                    (Some(title), Some(text)) => {
                                        return Ok(Some(Page { title, text }))
                                    }
                                    (title, _) => {
                                        self.dropped += 1;
                                        debug!("Dropping incomplete page {:?}", title);
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => {
                    if self.depth > 0 || self.page.is_some() {
                        return Err(DumpError::Truncated {
                            position: self.reader.buffer_position() as u64,
                        });
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    fn begin(&mut self, field: Field) {
        self.field = Some(field);
        self.field_buf.clear();
    }

    fn finish(&mut self, field: Field) {
        if self.field != Some(field) {
            return;
        }
        self.field = None;
        let value = std::mem::take(&mut self.field_buf);
        if let Some(page) = self.page.as_mut() {
            match field {
                Field::Title => page.title = Some(value),
                Field::Text => page.text = Some(value),
            }
        }
    }
}

impl<R: BufRead> PageSource for DumpReader<R> {
    /// Pages closed without both a title and a body.
    fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<R: BufRead> Iterator for DumpReader<R> {
    type Item = Result<Page, DumpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_page() {
            Ok(Some(page)) => Some(Ok(page)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn read_all(xml: &str) -> Vec<Result<Page, DumpError>> {
        DumpReader::new(xml.as_bytes()).collect()
    }

    #[test]
    fn fixture_pages() {
        let xml = std::fs::read_to_string("tests/fixtures/dump.xml").unwrap();
        let pages: Vec<Page> = read_all(&xml).into_iter().map(|p| p.unwrap()).collect();
        let titles: Vec<&str> = pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Hund", "Kopfnuss", "Baum", "Waffenschein", "laufen", "Banane"]);
        assert!(pages[1].text.contains("{{Deutsch Substantiv Übersicht"));
    }

    #[test]
    fn entities_unescaped() {
        let xml = "<mediawiki><page><title>A &amp; B</title>\
                   <revision><text>x &lt;ref&gt;</text></revision></page></mediawiki>";
        let pages = read_all(xml);
        let page = pages[0].as_ref().unwrap();
        assert_eq!(page.title, "A & B");
        assert_eq!(page.text, "x <ref>");
    }

    #[test]
    fn page_without_text_is_dropped() {
        let xml = "<mediawiki><page><title>Leer</title></page>\
                   <page><title>Voll</title><revision><text>t</text></revision></page></mediawiki>";
        let pages: Vec<_> = read_all(xml).into_iter().map(|p| p.unwrap()).collect();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Voll");

        let mut reader = DumpReader::new(xml.as_bytes());
        assert_eq!(reader.by_ref().count(), 1);
        assert_eq!(reader.dropped(), 1);
    }

    #[test]
    fn empty_text_element_counts_as_body() {
        let xml = "<mediawiki><page><title>Leer</title><revision><text bytes=\"0\" /></revision></page></mediawiki>";
        let pages = read_all(xml);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].as_ref().unwrap().text, "");
    }

    #[test]
    fn truncated_stream_errors_after_complete_pages() {
        let xml = "<mediawiki><page><title>Hund</title><revision><text>{{m}}</text></revision></page>\
                   <page><title>Katze</title><revision><text>{{f}}";
        let items = read_all(xml);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().title, "Hund");
        assert!(matches!(items[1], Err(DumpError::Truncated { .. })));
    }

    #[test]
    fn mismatched_tags_are_malformed() {
        let xml = "<mediawiki><page><title>Hund</tit></page></mediawiki>";
        let items = read_all(xml);
        assert!(matches!(items.last(), Some(Err(DumpError::Malformed { .. }))));
    }

    #[test]
    fn iterator_is_fused_after_error() {
        let mut reader = DumpReader::new("<mediawiki><page>".as_bytes());
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn opens_bz2_dump() {
        let xml = std::fs::read_to_string("tests/fixtures/dump.xml").unwrap();
        let mut file = tempfile::Builder::new().suffix(".xml.bz2").tempfile().unwrap();
        {
            let mut enc = bzip2::write::BzEncoder::new(&mut file, bzip2::Compression::fast());
            enc.write_all(xml.as_bytes()).unwrap();
            enc.finish().unwrap();
        }
        file.flush().unwrap();

        let pages: Vec<_> = open(file.path()).unwrap().map(|p| p.unwrap()).collect();
        assert_eq!(pages.len(), 6);
        assert_eq!(pages[5].title, "Banane");
    }

    #[test]
    fn corrupt_bz2_is_io_error() {
        let xml = std::fs::read_to_string("tests/fixtures/dump.xml").unwrap();
        let mut compressed = Vec::new();
        {
            let mut enc = bzip2::write::BzEncoder::new(&mut compressed, bzip2::Compression::fast());
            enc.write_all(xml.as_bytes()).unwrap();
            enc.finish().unwrap();
        }
        let mid = compressed.len() / 2;
        for b in &mut compressed[mid..mid + 20] {
            *b ^= 0xFF;
        }

        let mut file = tempfile::Builder::new().suffix(".xml.bz2").tempfile().unwrap();
        file.write_all(&compressed).unwrap();
        file.flush().unwrap();

        let items: Vec<_> = open(file.path()).unwrap().collect();
        assert!(matches!(items.last(), Some(Err(DumpError::Io(_)))), "{items:?}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = open(Path::new("tests/fixtures/does-not-exist.xml")).err().unwrap();
        assert!(matches!(err, DumpError::Io(_)));
    }
}
