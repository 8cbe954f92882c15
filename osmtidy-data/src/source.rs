//! Streaming reader for OSM XML documents.
//!
//! [`ElementStream`] walks a document one top-level feature at a time. Only
//! the attributes, `tag` pairs and `nd` references of the feature being read
//! are held in memory, and the event buffer is reused between reads, so peak
//! memory does not grow with the size of the document.

use std::{
    collections::BTreeMap,
    io::{self, BufRead, BufReader},
    str::Utf8Error,
};

use bzip2::read::MultiBzDecoder;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use osmtidy_core::{ElementKind, RawElement, RawTag};
use quick_xml::{
    Reader,
    events::{BytesStart, Event, attributes::AttrError},
};
use thiserror::Error;

use crate::fs::open_utf8_file;

/// Buffered reader over a plain or bzip2-compressed document.
pub type DocumentReader = Box<dyn BufRead + Send>;

/// Errors raised while opening or reading a document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The document could not be opened.
    #[error("failed to open OSM document at {path}")]
    Open {
        /// Document path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The markup is malformed.
    #[error("malformed XML in {path} near byte {position}")]
    Xml {
        /// Document path.
        path: Utf8PathBuf,
        /// Byte offset of the failure.
        position: u64,
        /// Source error from `quick-xml`.
        #[source]
        source: quick_xml::Error,
    },
    /// An attribute could not be parsed.
    #[error("malformed attribute in {path} near byte {position}")]
    Attribute {
        /// Document path.
        path: Utf8PathBuf,
        /// Byte offset of the failure.
        position: u64,
        /// Source error from `quick-xml`.
        #[source]
        source: AttrError,
    },
    /// An attribute name is not valid UTF-8.
    #[error("attribute name in {path} near byte {position} is not UTF-8")]
    Encoding {
        /// Document path.
        path: Utf8PathBuf,
        /// Byte offset of the failure.
        position: u64,
        /// Source decoding error.
        #[source]
        source: Utf8Error,
    },
    /// A `tag` or `nd` element lacks a required attribute.
    #[error("<{element}> in {path} near byte {position} has no {attribute} attribute")]
    MissingAttribute {
        /// Document path.
        path: Utf8PathBuf,
        /// Byte offset of the offending element.
        position: u64,
        /// Element name.
        element: &'static str,
        /// Missing attribute name.
        attribute: &'static str,
    },
    /// The document ended inside an open element.
    #[error("{path} ends inside an open element at byte {position}")]
    Truncated {
        /// Document path.
        path: Utf8PathBuf,
        /// Byte offset of the end of input.
        position: u64,
    },
}

fn is_bz2(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("bz2"))
}

/// Open a document and stream the requested element kinds.
///
/// Paths ending in `.bz2` are decompressed on the fly, including
/// multi-stream archives.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use osmtidy_core::ElementKind;
/// use osmtidy_data::open_elements;
///
/// # fn main() -> Result<(), osmtidy_data::SourceError> {
/// for element in open_elements(Utf8Path::new("curitiba.osm"), &ElementKind::SHAPED)? {
///     let element = element?;
///     println!("{} with {} tags", element.kind, element.tags.len());
/// }
/// # Ok(())
/// # }
/// ```
pub fn open_elements(
    path: &Utf8Path,
    kinds: &[ElementKind],
) -> Result<ElementStream<DocumentReader>, SourceError> {
    let file = open_utf8_file(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: DocumentReader = if is_bz2(path) {
        debug!("reading {path} through a bzip2 decoder");
        Box::new(BufReader::new(MultiBzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(ElementStream::new(reader, path, kinds))
}

#[derive(Debug)]
struct Capture {
    element: RawElement,
    depth: usize,
}

/// Lazy, forward-only sequence of raw elements in document order.
///
/// A parse failure is yielded once as an `Err` item, after which the stream
/// is exhausted.
///
/// # Examples
/// ```
/// use osmtidy_core::ElementKind;
/// use osmtidy_data::ElementStream;
///
/// let xml = r#"<osm>
///   <node id="1" lat="-25.4" lon="-49.2"><tag k="name" v="Batel"/></node>
///   <way id="2"><nd ref="1"/></way>
/// </osm>"#;
/// let elements: Vec<_> = ElementStream::new(xml.as_bytes(), "inline.osm", &[ElementKind::Way])
///     .collect::<Result<_, _>>()?;
/// assert_eq!(elements.len(), 1);
/// assert_eq!(elements[0].node_refs, vec!["1".to_owned()]);
/// # Ok::<(), osmtidy_data::SourceError>(())
/// ```
#[derive(Debug)]
pub struct ElementStream<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    path: Utf8PathBuf,
    kinds: Vec<ElementKind>,
    depth: usize,
    current: Option<Capture>,
    finished: bool,
}

impl<R: BufRead> ElementStream<R> {
    /// Stream elements of the given kinds from an open reader.
    ///
    /// `path` is used only to label errors.
    pub fn new(reader: R, path: impl AsRef<Utf8Path>, kinds: &[ElementKind]) -> Self {
        Self {
            reader: Reader::from_reader(reader),
            buf: Vec::new(),
            path: path.as_ref().to_path_buf(),
            kinds: kinds.to_vec(),
            depth: 0,
            current: None,
            finished: false,
        }
    }

    /// Byte offset reached in the underlying document.
    #[must_use]
    pub fn byte_position(&self) -> u64 {
        self.reader.buffer_position()
    }

    fn advance(&mut self) -> Result<Option<RawElement>, SourceError> {
        let mut buf = std::mem::take(&mut self.buf);
        let outcome = self.advance_with(&mut buf);
        self.buf = buf;
        outcome
    }

    fn advance_with(&mut self, buf: &mut Vec<u8>) -> Result<Option<RawElement>, SourceError> {
        loop {
            buf.clear();
            let event = self
                .reader
                .read_event_into(buf)
                .map_err(|source| SourceError::Xml {
                    path: self.path.clone(),
                    position: self.reader.error_position(),
                    source,
                })?;
            let finished = match event {
                Event::Start(start) => {
                    self.depth += 1;
                    self.open(&start, false)?
                }
                Event::Empty(start) => self.open(&start, true)?,
                Event::End(_) => self.close(),
                Event::Eof => {
                    if self.depth > 0 || self.current.is_some() {
                        return Err(SourceError::Truncated {
                            path: self.path.clone(),
                            position: self.byte_position(),
                        });
                    }
                    return Ok(None);
                }
                _ => None,
            };
            if finished.is_some() {
                return Ok(finished);
            }
        }
    }

    fn open(
        &mut self,
        start: &BytesStart<'_>,
        empty: bool,
    ) -> Result<Option<RawElement>, SourceError> {
        let name = start.name();
        if self.current.is_some() {
            let child = match name.as_ref() {
                b"tag" => Child::Tag,
                b"nd" => Child::NodeRef,
                _ => return Ok(None),
            };
            let mut attributes = self.attributes(start)?;
            match child {
                Child::Tag => {
                    let key = attributes
                        .remove("k")
                        .ok_or_else(|| self.missing("tag", "k"))?;
                    let value = attributes
                        .remove("v")
                        .ok_or_else(|| self.missing("tag", "v"))?;
                    if let Some(capture) = self.current.as_mut() {
                        capture.element.tags.push(RawTag::new(key, value));
                    }
                }
                Child::NodeRef => {
                    let node_ref = attributes
                        .remove("ref")
                        .ok_or_else(|| self.missing("nd", "ref"))?;
                    if let Some(capture) = self.current.as_mut() {
                        capture.element.node_refs.push(node_ref);
                    }
                }
            }
            return Ok(None);
        }

        let Some(kind) = ElementKind::from_name(name.as_ref()) else {
            return Ok(None);
        };
        if !self.kinds.contains(&kind) {
            return Ok(None);
        }
        let mut element = RawElement::new(kind);
        element.attributes = self.attributes(start)?;
        if empty {
            return Ok(Some(element));
        }
        self.current = Some(Capture {
            element,
            depth: self.depth,
        });
        Ok(None)
    }

    fn close(&mut self) -> Option<RawElement> {
        let depth = self.depth;
        self.depth = self.depth.saturating_sub(1);
        if self
            .current
            .as_ref()
            .is_some_and(|capture| capture.depth == depth)
        {
            return self.current.take().map(|capture| capture.element);
        }
        None
    }

    fn attributes(&self, start: &BytesStart<'_>) -> Result<BTreeMap<String, String>, SourceError> {
        let mut attributes = BTreeMap::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|source| SourceError::Attribute {
                path: self.path.clone(),
                position: self.byte_position(),
                source,
            })?;
            let key = std::str::from_utf8(attribute.key.as_ref()).map_err(|source| {
                SourceError::Encoding {
                    path: self.path.clone(),
                    position: self.byte_position(),
                    source,
                }
            })?;
            let value = attribute
                .unescape_value()
                .map_err(|source| SourceError::Xml {
                    path: self.path.clone(),
                    position: self.byte_position(),
                    source,
                })?;
            attributes.insert(key.to_owned(), value.into_owned());
        }
        Ok(attributes)
    }

    fn missing(&self, element: &'static str, attribute: &'static str) -> SourceError {
        SourceError::MissingAttribute {
            path: self.path.clone(),
            position: self.byte_position(),
            element,
            attribute,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Child {
    Tag,
    NodeRef,
}

impl<R: BufRead> Iterator for ElementStream<R> {
    type Item = Result<RawElement, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.advance() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for ElementStream<R> {}
