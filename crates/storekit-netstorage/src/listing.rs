//! XML listing decoder
//!
//! `dir` and `stat` answer with
//! `<stat directory="..."><file type=".." name=".." .../></stat>`,
//! `du` answers with `<du directory=".."><du-info files=".." bytes=".."/></du>`.
//! Both decode into [`StorageListing`]. Bodies are usually declared
//! `ISO-8859-1`; attribute text is decoded with the declared encoding.

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

use storekit_core::{Result, StoreError};

/// Kind of a directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Other(String),
}

impl EntryKind {
    fn parse(value: &str) -> Self {
        match value {
            "file" => EntryKind::File,
            "dir" => EntryKind::Dir,
            "symlink" => EntryKind::Symlink,
            other => EntryKind::Other(other.to_string()),
        }
    }
}

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub kind: EntryKind,
    pub name: String,
    pub size: Option<u64>,
    pub md5: Option<String>,
    /// Modification time, unix seconds
    pub mtime: Option<i64>,
    /// Symlink target
    pub target: Option<String>,
}

/// Aggregate usage reported by `du`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub files: u64,
    pub bytes: u64,
}

/// Decoded listing of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageListing {
    pub directory: String,
    pub entries: Vec<StorageEntry>,
    pub usage: Option<DiskUsage>,
}

impl StorageListing {
    /// Entries of kind file
    pub fn files(&self) -> impl Iterator<Item = &StorageEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::File)
    }

    /// Entries of kind dir
    pub fn dirs(&self) -> impl Iterator<Item = &StorageEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Dir)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Root {
    Stat,
    Du,
}

/// Decode a `stat`, `dir` or `du` response body
pub fn parse_listing(xml: &[u8]) -> Result<StorageListing> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut root: Option<Root> = None;
    let mut listing = StorageListing {
        directory: String::new(),
        entries: Vec::new(),
        usage: None,
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let attrs = attributes(&e, reader.decoder())?;
                match (root, e.local_name().as_ref()) {
                    (None, b"stat") => {
                        root = Some(Root::Stat);
                        listing.directory = attrs.get("directory").cloned().unwrap_or_default();
                    }
                    (None, b"du") => {
                        root = Some(Root::Du);
                        listing.directory = attrs.get("directory").cloned().unwrap_or_default();
                    }
                    (None, other) => {
                        return Err(StoreError::decode(format!(
                            "unexpected root element <{}>",
                            String::from_utf8_lossy(other)
                        )));
                    }
                    (Some(Root::Stat), b"file") => listing.entries.push(parse_entry(&attrs)?),
                    (Some(Root::Du), b"du-info") => {
                        listing.usage = Some(DiskUsage {
                            files: required_number(&attrs, "files")?,
                            bytes: required_number(&attrs, "bytes")?,
                        });
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(StoreError::decode(format!(
                    "XML parse error at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    match root {
        None => Err(StoreError::decode("response contains no listing element")),
        Some(Root::Du) if listing.usage.is_none() => {
            Err(StoreError::decode("du response without <du-info>"))
        }
        Some(_) => Ok(listing),
    }
}

fn attributes(e: &BytesStart<'_>, decoder: Decoder) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| StoreError::decode(format!("malformed attribute: {}", e)))?;
        let key = decoder
            .decode(attr.key.as_ref())
            .map_err(|e| StoreError::decode(format!("bad attribute name: {}", e)))?
            .into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| StoreError::decode(format!("bad value for {}: {}", key, e)))?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn parse_entry(attrs: &HashMap<String, String>) -> Result<StorageEntry> {
    let kind = attrs
        .get("type")
        .ok_or_else(|| StoreError::decode("<file> without type attribute"))?;
    let name = attrs
        .get("name")
        .ok_or_else(|| StoreError::decode("<file> without name attribute"))?;

    Ok(StorageEntry {
        kind: EntryKind::parse(kind),
        name: name.clone(),
        size: optional_number(attrs, "size")?,
        md5: attrs.get("md5").cloned(),
        mtime: optional_number(attrs, "mtime")?,
        target: attrs.get("target").cloned(),
    })
}

fn optional_number<T: std::str::FromStr>(
    attrs: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>> {
    attrs
        .get(key)
        .map(|v| {
            v.parse().map_err(|_| {
                StoreError::decode(format!("attribute {}=\"{}\" is not a number", key, v))
            })
        })
        .transpose()
}

fn required_number<T: std::str::FromStr>(attrs: &HashMap<String, String>, key: &str) -> Result<T> {
    optional_number(attrs, key)?
        .ok_or_else(|| StoreError::decode(format!("missing attribute {}", key)))
}
