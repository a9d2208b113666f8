use std::path::Path;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ImportError;
use crate::gpx_types::*;

type Result<T> = std::result::Result<T, ImportError>;

/// Read a GPX file fully into memory and parse its track segments.
pub fn read_gpx_file(path: impl AsRef<Path>, use_elevation: bool) -> Result<ParsedGpx> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)?;
    debug!("read {} bytes from {}", xml.len(), path.display());
    parse_gpx(&xml, use_elevation)
}

/// Parse the `trk/trkseg/trkpt` structure of a GPX XML string.
///
/// Elements are matched by local name, so any namespace prefix is ignored.
/// Everything outside the three track levels is skipped with its subtree.
/// A malformed `trkpt` fails the whole parse.
pub fn parse_gpx(xml: &str, use_elevation: bool) -> Result<ParsedGpx> {
    let mut reader = Reader::from_str(xml);
    let mut data = ParsedGpx::default();

    loop {
        match reader.read_event()? {
            Event::Start(_) => {
                parse_root(&mut reader, &mut data, use_elevation)?;
                break;
            }
            Event::Empty(_) => break,
            Event::Eof => return Err(ImportError::NoRootElement),
            _ => {}
        }
    }

    debug!(
        "parsed {} segments with {} points",
        data.segments.len(),
        data.point_count()
    );
    Ok(data)
}

/// Children of the document root. Only `<trk>` is descended into.
fn parse_root<'a>(
    reader: &mut Reader<&'a [u8]>,
    data: &mut ParsedGpx,
    use_elevation: bool,
) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"trk" => parse_track(reader, data, use_elevation)?,
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(ImportError::UnexpectedEof { element: "gpx" }),
            _ => {}
        }
    }
}

/// Parse a <trk> element.
fn parse_track<'a>(
    reader: &mut Reader<&'a [u8]>,
    data: &mut ParsedGpx,
    use_elevation: bool,
) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"trkseg" => {
                    data.segments.push(TrackSegment::default());
                    parse_segment(reader, data, use_elevation)?;
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"trkseg" {
                    data.segments.push(TrackSegment::default());
                }
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(ImportError::UnexpectedEof { element: "trk" }),
            _ => {}
        }
    }
}

/// Parse a <trkseg> element into the last segment of `data`.
fn parse_segment<'a>(
    reader: &mut Reader<&'a [u8]>,
    data: &mut ParsedGpx,
    use_elevation: bool,
) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"trkpt" => {
                    let point = parse_point(&e, reader, use_elevation)?;
                    data.push_point(point);
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"trkpt" {
                    let (lat, lon) = parse_lat_lon(&e)?;
                    data.push_point(TrackPoint::new(lat, lon));
                }
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(ImportError::UnexpectedEof { element: "trkseg" }),
            _ => {}
        }
    }
}

/// Parse a <trkpt> element and its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
    use_elevation: bool,
) -> Result<TrackPoint> {
    let (lat, lon) = parse_lat_lon(start)?;
    let mut point = TrackPoint::new(lat, lon);

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if use_elevation && point.ele.is_none() && e.local_name().as_ref() == b"ele" {
                    let text = read_element_text(reader, &e)?;
                    point.ele = Some(parse_elevation(&text)?);
                } else {
                    reader.read_to_end(e.name())?;
                }
            }
            Event::Empty(e) => {
                if use_elevation && point.ele.is_none() && e.local_name().as_ref() == b"ele" {
                    return Err(ImportError::InvalidElevation(String::new()));
                }
            }
            Event::End(_) => break,
            Event::Eof => return Err(ImportError::UnexpectedEof { element: "trkpt" }),
            _ => {}
        }
    }

    Ok(point)
}

/// Parse the required lat/lon attributes of a `<trkpt>` start tag.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<(f64, f64)> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let val = attr.unescape_value()?;
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(parse_coordinate("lat", &val)?),
            b"lon" => lon = Some(parse_coordinate("lon", &val)?),
            _ => {}
        }
    }

    let lat = lat.ok_or(ImportError::MissingAttribute {
        element: "trkpt",
        attribute: "lat",
    })?;
    let lon = lon.ok_or(ImportError::MissingAttribute {
        element: "trkpt",
        attribute: "lon",
    })?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(ImportError::OutOfRange { lat, lon });
    }

    Ok((lat, lon))
}

fn parse_coordinate(attribute: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ImportError::InvalidAttribute {
            element: "trkpt",
            attribute,
            value: value.to_string(),
        })
}

fn parse_elevation(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ImportError::InvalidElevation(text.to_string()))
}

/// Read text content of an element as an owned String.
/// Character references and the predefined entities are decoded; any other
/// entity is kept verbatim so that number parsing rejects it.
fn read_element_text<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Event::CData(e) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = e.resolve_char_ref()? {
                    text.push(ch);
                    continue;
                }
                let name = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                match name {
                    "amp" => text.push('&'),
                    "lt" => text.push('<'),
                    "gt" => text.push('>'),
                    "quot" => text.push('"'),
                    "apos" => text.push('\''),
                    _ => {
                        text.push('&');
                        text.push_str(name);
                        text.push(';');
                    }
                }
            }
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::Eof => return Err(ImportError::UnexpectedEof { element: "ele" }),
            _ => {}
        }
    }

    Ok(text)
}
