//! Lock-discovery and error response bodies.

use crate::error::{DavLockError, Result};
use crate::locks::{LockDepth, LockInfo, LockScope, LockTimeout, LockToken};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// One `activelock` entry of a lock-discovery response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLock {
    pub scope: LockScope,
    pub depth: LockDepth,
    pub owner: Option<String>,
    /// Granted lifetime, counted from creation or the last refresh.
    pub timeout: LockTimeout,
    pub token: LockToken,
    pub root: String,
}

impl ActiveLock {
    pub fn from_lock(lock: &LockInfo) -> Self {
        Self {
            scope: lock.scope,
            depth: lock.depth,
            owner: lock.owner.clone(),
            timeout: lock.timeout,
            token: lock.token.clone(),
            root: lock.path.clone(),
        }
    }

    /// Render `<D:prop><D:lockdiscovery>` holding this lock.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = XmlOut::new()?;
        xml.start_root("D:prop")?;
        xml.start("D:lockdiscovery")?;
        self.write(&mut xml)?;
        xml.end("D:lockdiscovery")?;
        xml.end("D:prop")?;
        xml.finish()
    }

    fn write(&self, xml: &mut XmlOut) -> Result<()> {
        xml.start("D:activelock")?;

        xml.start("D:locktype")?;
        xml.empty("D:write")?;
        xml.end("D:locktype")?;

        xml.start("D:lockscope")?;
        xml.empty(match self.scope {
            LockScope::Exclusive => "D:exclusive",
            LockScope::Shared => "D:shared",
        })?;
        xml.end("D:lockscope")?;

        xml.text_element("D:depth", self.depth.as_str())?;
        if let Some(owner) = &self.owner {
            xml.start("D:owner")?;
            xml.raw(owner)?;
            xml.end("D:owner")?;
        }
        xml.text_element("D:timeout", &self.timeout.to_string())?;

        xml.start("D:locktoken")?;
        xml.text_element("D:href", self.token.as_str())?;
        xml.end("D:locktoken")?;

        xml.start("D:lockroot")?;
        xml.text_element("D:href", &self.root)?;
        xml.end("D:lockroot")?;

        xml.end("D:activelock")
    }
}

/// Render an RFC 4918 `error` body for a failed request.
///
/// Errors without a precondition element get a `D:error` holding only the message.
pub fn error_body(error: &DavLockError, precondition: Option<&str>) -> Result<String> {
    let mut xml = XmlOut::new()?;
    xml.start_root("D:error")?;
    if let Some(element) = precondition {
        let name = format!("D:{}", element);
        match error {
            DavLockError::Locked { lock_root } => {
                xml.start(&name)?;
                xml.text_element("D:href", lock_root)?;
                xml.end(&name)?;
            }
            _ => xml.empty(&name)?,
        }
    }
    xml.text_element("D:message", &error.to_string())?;
    xml.end("D:error")?;
    xml.finish()
}

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

fn xml_error(e: impl std::fmt::Display) -> DavLockError {
    DavLockError::Storage(format!("failed to render XML: {}", e))
}

impl XmlOut {
    fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_error)?;
        Ok(Self { writer })
    }

    fn start_root(&mut self, name: &str) -> Result<()> {
        let element = BytesStart::new(name).with_attributes([("xmlns:D", "DAV:")]);
        self.writer
            .write_event(Event::Start(element))
            .map_err(xml_error)
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_error)
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    fn empty(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(xml_error)
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error)?;
        self.end(name)
    }

    /// Write already-escaped markup as is.
    fn raw(&mut self, markup: &str) -> Result<()> {
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(markup)))
            .map_err(xml_error)
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(xml_error)
    }
}
