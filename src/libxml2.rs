//! LibXML2 Streaming Reader FFI Wrapper
//!
//! This module provides a safe wrapper around the libxml2 `xmlTextReader` API, used to pull
//! attribute maps out of flat XML documents such as camera configuration exports.
//!
//! ## Why the reader API
//!
//! The input documents are a root element holding a flat list of attribute-only children.
//! The streaming reader lets us visit exactly those children without walking libxml2's tree
//! structures, so every handle we touch stays opaque:
//!
//! - No `#[repr(C)]` mirrors of `xmlNode` or `xmlAttr` are needed
//! - Attribute values are borrowed from the reader (`xmlTextReaderConstValue`), nothing to free
//! - Well-formedness is checked as a side effect of reading to the end of the document
//!
//! ## Thread Safety Strategy
//!
//! libxml2 parsing is safe across threads once `xmlInitParser()` has run, as long as each
//! thread owns its own parser context. We guarantee both:
//!
//! - **Initialization**: guarded by `std::sync::Once`
//! - **Reader ownership**: every call creates, uses and frees its own `xmlTextReader`
//!
//! Parsing is blocking CPU work; async callers run it through `tokio::task::spawn_blocking`.

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::sync::Once;

use libc::{c_char, c_int, c_uchar};
use thiserror::Error;

/// Global initialization flag for libxml2
///
/// libxml2's initialization functions are NOT thread-safe, so they run exactly once.
static LIBXML2_INIT: Once = Once::new();

/// `xmlChar` is an unsigned byte holding UTF-8
type XmlChar = c_uchar;

/// `XML_READER_TYPE_ELEMENT` from `xmlreader.h`
const XML_READER_TYPE_ELEMENT: c_int = 1;

/// `XML_PARSE_NONET`: never fetch external resources while parsing
const XML_PARSE_NONET: c_int = 1 << 11;

/// LibXML2-specific error types
#[derive(Error, Debug)]
pub enum LibXml2Error {
    #[error("Reader creation failed")]
    ReaderCreationFailed,

    #[error("Document is not well-formed: {details}")]
    MalformedDocument { details: String },

    #[error("Invalid reader input: {details}")]
    InvalidInput { details: String },
}

/// LibXML2 result type alias
pub type LibXml2Result<T> = std::result::Result<T, LibXml2Error>;

/// Attribute name to value, for one element
pub type ElementAttributes = HashMap<String, String>;

/// ## Opaque libxml2 structures
#[repr(C)]
pub struct XmlTextReader {
    _private: [u8; 0],
}

#[repr(C)]
pub struct xmlError {
    pub domain: c_int,
    pub code: c_int,
    pub message: *const c_char,
    pub level: c_int,
    pub file: *const c_char,
    pub line: c_int,
    pub str1: *const c_char,
    pub str2: *const c_char,
    pub str3: *const c_char,
    pub int1: c_int,
    pub int2: c_int,
    pub ctxt: *mut libc::c_void,
    pub node: *mut libc::c_void,
}

pub type XmlStructuredErrorFunc =
    Option<unsafe extern "C" fn(user_data: *mut libc::c_void, error: *mut xmlError)>;

// External libxml2 FFI declarations
#[cfg_attr(target_os = "windows", link(name = "libxml2"))]
#[cfg_attr(not(target_os = "windows"), link(name = "xml2"))]
unsafe extern "C" {
    pub fn xmlInitParser();

    pub fn xmlReaderForMemory(
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlTextReader;
    pub fn xmlFreeTextReader(reader: *mut XmlTextReader);

    pub fn xmlTextReaderRead(reader: *mut XmlTextReader) -> c_int;
    pub fn xmlTextReaderNodeType(reader: *mut XmlTextReader) -> c_int;
    pub fn xmlTextReaderDepth(reader: *mut XmlTextReader) -> c_int;
    pub fn xmlTextReaderConstName(reader: *mut XmlTextReader) -> *const XmlChar;

    pub fn xmlTextReaderMoveToAttribute(
        reader: *mut XmlTextReader,
        name: *const XmlChar,
    ) -> c_int;
    pub fn xmlTextReaderMoveToElement(reader: *mut XmlTextReader) -> c_int;
    pub fn xmlTextReaderConstValue(reader: *mut XmlTextReader) -> *const XmlChar;

    pub fn xmlTextReaderSetStructuredErrorHandler(
        reader: *mut XmlTextReader,
        f: XmlStructuredErrorFunc,
        arg: *mut libc::c_void,
    );
}

/// Callback for libxml2 to report parse errors (structured)
unsafe extern "C" fn structured_error_callback(user_data: *mut libc::c_void, error: *mut xmlError) {
    let errors = unsafe { &mut *(user_data as *mut Vec<String>) };

    if !error.is_null() {
        let msg_ptr = unsafe { (*error).message };
        if !msg_ptr.is_null() {
            let c_str = unsafe { CStr::from_ptr(msg_ptr) };
            if let Ok(s) = c_str.to_str() {
                errors.push(s.trim().to_string());
            }
        }
    }
}

/// Owned `xmlTextReader`, freed on drop
struct TextReader {
    ptr: *mut XmlTextReader,
    _phantom: PhantomData<XmlTextReader>,
}

impl TextReader {
    /// # Safety
    ///
    /// `data` must outlive the returned reader: libxml2 reads from the buffer lazily.
    unsafe fn from_memory(data: &[u8], size: c_int) -> LibXml2Result<Self> {
        let ptr = unsafe {
            xmlReaderForMemory(
                data.as_ptr() as *const c_char,
                size,
                std::ptr::null(),
                std::ptr::null(),
                XML_PARSE_NONET,
            )
        };

        if ptr.is_null() {
            return Err(LibXml2Error::ReaderCreationFailed);
        }

        Ok(Self {
            ptr,
            _phantom: PhantomData,
        })
    }

    /// Qualified name of the current node
    fn name(&self) -> Option<&CStr> {
        let name = unsafe { xmlTextReaderConstName(self.ptr) };
        if name.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(name as *const c_char) })
        }
    }

    /// Value of the named attribute on the current element, if present
    fn attribute(&self, name: &CStr) -> Option<String> {
        let found = unsafe { xmlTextReaderMoveToAttribute(self.ptr, name.as_ptr() as *const XmlChar) };
        if found != 1 {
            return None;
        }

        let value = unsafe { xmlTextReaderConstValue(self.ptr) };
        let result = if value.is_null() {
            Some(String::new())
        } else {
            Some(
                unsafe { CStr::from_ptr(value as *const c_char) }
                    .to_string_lossy()
                    .into_owned(),
            )
        };

        unsafe {
            xmlTextReaderMoveToElement(self.ptr);
        }
        result
    }
}

impl Drop for TextReader {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                xmlFreeTextReader(self.ptr);
            }
            self.ptr = std::ptr::null_mut();
        }
    }
}

/// Safe access to libxml2 parsing
pub struct LibXml2Wrapper {
    _phantom: PhantomData<()>,
}

impl Default for LibXml2Wrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl LibXml2Wrapper {
    /// Create a new wrapper, initializing libxml2 on first use
    pub fn new() -> Self {
        LIBXML2_INIT.call_once(|| unsafe {
            xmlInitParser();
        });

        LibXml2Wrapper {
            _phantom: PhantomData,
        }
    }

    /// Read the requested attributes of every direct child of the root named `element_name`
    ///
    /// Elements are returned in document order. Attributes not present on an element are
    /// simply absent from its map. The whole document is read, so a well-formedness error
    /// anywhere (including after the last matching element) fails the call.
    ///
    /// # Errors
    ///
    /// Returns `LibXml2Error::MalformedDocument` if the document is empty or not well-formed.
    /// Returns `LibXml2Error::InvalidInput` if a name contains NUL or the buffer is too large.
    pub fn read_child_elements(
        &self,
        data: &[u8],
        element_name: &str,
        attributes: &[&str],
    ) -> LibXml2Result<Vec<ElementAttributes>> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(LibXml2Error::MalformedDocument {
                details: "document is empty".to_string(),
            });
        }

        let size = c_int::try_from(data.len()).map_err(|_| LibXml2Error::InvalidInput {
            details: format!("document too large: {} bytes", data.len()),
        })?;

        let c_attributes = attributes
            .iter()
            .map(|name| CString::new(*name).map(|c| (*name, c)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LibXml2Error::InvalidInput {
                details: e.to_string(),
            })?;

        // Declared before the reader so it outlives every callback invocation
        let mut errors: Vec<String> = Vec::new();
        let reader = unsafe { TextReader::from_memory(data, size)? };

        unsafe {
            xmlTextReaderSetStructuredErrorHandler(
                reader.ptr,
                Some(structured_error_callback),
                &mut errors as *mut Vec<String> as *mut libc::c_void,
            );
        }

        let mut elements = Vec::new();
        loop {
            let status = unsafe { xmlTextReaderRead(reader.ptr) };
            if status == 0 {
                break;
            }
            if status < 0 {
                drop(reader);
                let details = if errors.is_empty() {
                    "parser reported an error".to_string()
                } else {
                    errors.join("; ")
                };
                return Err(LibXml2Error::MalformedDocument { details });
            }

            let is_child_element = unsafe {
                xmlTextReaderNodeType(reader.ptr) == XML_READER_TYPE_ELEMENT
                    && xmlTextReaderDepth(reader.ptr) == 1
            };
            if !is_child_element || reader.name().map(CStr::to_bytes) != Some(element_name.as_bytes())
            {
                continue;
            }

            let mut element = ElementAttributes::new();
            for (name, c_name) in &c_attributes {
                if let Some(value) = reader.attribute(c_name) {
                    element.insert((*name).to_string(), value);
                }
            }
            elements.push(element);
        }

        Ok(elements)
    }
}
