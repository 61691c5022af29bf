//! Reading metric values out of the XML feed a gmond daemon serves on its TCP port.

use std::io::{BufRead, BufReader};
use std::net::TcpStream;
use std::num::ParseFloatError;

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace};

pub const DEFAULT_SERVER: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8649;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error while reading feed: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("{element} element without {attribute} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("malformed feed: {0}")]
    Malformed(&'static str),
    #[error("feed ended before the document was complete")]
    Incomplete,
    #[error("host/value not found")]
    NotFound,
    #[error("value {value:?} is not a number")]
    InvalidValue {
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

/// Connects to the gmond daemon at `server:port` and returns the value of `metric` reported for
/// `host`. The connection is closed before this returns, whatever the outcome.
pub fn fetch_metric(
    server: &str,
    port: u16,
    host: &str,
    metric: &str,
) -> Result<f64, ExtractError> {
    let addr = format!("{server}:{port}");
    debug!(%addr, "connecting to gmond");

    let stream = TcpStream::connect((server, port)).map_err(|source| ExtractError::Connect {
        addr: addr.clone(),
        source,
    })?;

    let result = scan(BufReader::new(&stream), host, metric);
    drop(stream);
    trace!(%addr, "connection closed");

    result
}

/// Scans a gmond XML document and returns the value of the `METRIC` named `metric` inside the
/// `HOST` named `host`. The whole document is consumed; if the metric shows up more than once
/// the last occurrence wins.
pub fn scan<R: BufRead>(source: R, host: &str, metric: &str) -> Result<f64, ExtractError> {
    let mut reader = Reader::from_reader(source);
    let mut state = ParseState::new(host, metric);
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        // set from the XML declaration once it has been read
        let decoder = reader.decoder();

        match event {
            Event::Start(_) | Event::Empty(_) if seen_root && depth == 0 => {
                return Err(ExtractError::Malformed("junk after document element"));
            }
            Event::Text(e) if depth == 0 && !e.iter().all(u8::is_ascii_whitespace) => {
                return Err(ExtractError::Malformed("text outside of the document element"));
            }
            Event::CData(_) if depth == 0 => {
                return Err(ExtractError::Malformed("text outside of the document element"));
            }
            Event::Start(e) => {
                depth += 1;
                seen_root = true;
                state.start_element(&e, decoder)?;
            }
            Event::Empty(e) => {
                seen_root = true;
                state.start_element(&e, decoder)?;
                state.end_element(e.name().as_ref());
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                state.end_element(e.name().as_ref());
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root || depth > 0 {
        return Err(ExtractError::Incomplete);
    }

    state.into_value()
}

/// Where the scanner currently is with respect to the requested host, and what it has captured
/// so far. There is a single level of host tracking: a nested `HOST` does not push anything.
#[derive(Debug)]
pub struct ParseState<'a> {
    host: &'a str,
    metric: &'a str,
    in_host: bool,
    value: Option<String>,
}

impl<'a> ParseState<'a> {
    pub fn new(host: &'a str, metric: &'a str) -> Self {
        ParseState {
            host,
            metric,
            in_host: false,
            value: None,
        }
    }

    pub fn in_host(&self) -> bool {
        self.in_host
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn start_element(
        &mut self,
        e: &BytesStart<'_>,
        decoder: Decoder,
    ) -> Result<(), ExtractError> {
        // attributes of every element have to be well-formed, not only the ones looked at
        for attr in e.attributes() {
            attr.map_err(quick_xml::Error::from)?;
        }

        match e.name().as_ref() {
            b"HOST" => {
                if attribute(e, decoder, "HOST", "NAME")? == self.host {
                    trace!(host = self.host, "entering host");
                    self.in_host = true;
                }
            }
            b"METRIC" if self.in_host => {
                if attribute(e, decoder, "METRIC", "NAME")? == self.metric {
                    let value = attribute(e, decoder, "METRIC", "VAL")?;
                    debug!(host = self.host, metric = self.metric, %value, "metric found");
                    self.value = Some(value);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn end_element(&mut self, name: &[u8]) {
        if name == b"HOST" && self.in_host {
            trace!(host = self.host, "leaving host");
            self.in_host = false;
        }
    }

    /// Converts the captured value into a number.
    pub fn into_value(self) -> Result<f64, ExtractError> {
        let value = self.value.ok_or(ExtractError::NotFound)?;

        match value.trim().parse::<f64>() {
            Ok(v) => Ok(v),
            Err(source) => Err(ExtractError::InvalidValue { value, source }),
        }
    }
}

fn attribute(
    e: &BytesStart<'_>,
    decoder: Decoder,
    element: &'static str,
    attribute: &'static str,
) -> Result<String, ExtractError> {
    let attr = e
        .try_get_attribute(attribute)
        .map_err(quick_xml::Error::from)?
        .ok_or(ExtractError::MissingAttribute { element, attribute })?;

    Ok(attr.decode_and_unescape_value(decoder)?.into_owned())
}
