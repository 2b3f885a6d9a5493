// Requests: `*<N>\r\n` followed by N bulk strings `$<len>\r\n<bytes>\r\n`.
// Replies: the subset of RESP described on `Frame`.

use std::fmt;

use bytes::Buf;
use bytes::Bytes;
use std::io::Cursor;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    /// The buffered bytes can never become a valid request frame.
    #[error("malformed request; {0}")]
    Malformed(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// Literal status line, `+OK\r\n`.
    Simple(String),
    /// `-<message>\r\n`. The message carries its own `ERR ` prefix.
    Error(String),
    /// `:<sign><value>\r\n`, zero is rendered without a sign.
    Integer(i64),
    /// `$<len>\r\n<bytes>\r\n`. Also used for replies that strict RESP would send as simple
    /// strings, such as `TYPE` or `ZSCORE`.
    Bulk(Bytes),
    /// `$-1\r\n`
    Null,
    /// `*<count>\r\n` followed by each element.
    Array(Vec<Frame>),
}

impl Frame {
    /// Parses one request frame: a non-empty array made exclusively of bulk strings.
    ///
    /// Yields `Frame::Array` of `Frame::Bulk` elements. Nothing is returned on failure, the
    /// cursor position is only meaningful after a successful parse.
    pub fn parse_request(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        if get_byte(src)? != b'*' {
            return Err(Error::Malformed("expected array"));
        }

        let count = get_size(src)?;
        if count == 0 {
            return Err(Error::Malformed("empty array"));
        }

        // The declared count is untrusted, bound the up-front allocation.
        let mut args = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            args.push(Frame::Bulk(get_bulk(src)?));
        }

        Ok(Frame::Array(args))
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Frame::Simple(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(b'+');
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Error(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(b'-');
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Integer(0) => b":0\r\n".to_vec(),
            Frame::Integer(i) => format!(":{:+}\r\n", i).into_bytes(),
            Frame::Bulk(bytes) => {
                let length_str = bytes.len().to_string();
                let mut result = Vec::with_capacity(
                    1 + length_str.len() + CRLF.len() + bytes.len() + CRLF.len(),
                );
                result.push(b'$');
                result.extend_from_slice(length_str.as_bytes());
                result.extend_from_slice(CRLF);
                result.extend_from_slice(bytes);
                result.extend_from_slice(CRLF);
                result
            }
            Frame::Null => b"$-1\r\n".to_vec(),
            Frame::Array(arr) => {
                let length_str = arr.len().to_string();
                let mut bytes = Vec::with_capacity(1 + length_str.len() + CRLF.len());
                bytes.push(b'*');
                bytes.extend_from_slice(length_str.as_bytes());
                bytes.extend_from_slice(CRLF);
                for frame in arr {
                    bytes.extend(frame.serialize());
                }
                bytes
            }
        }
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl From<Frame> for Bytes {
    fn from(frame: Frame) -> Self {
        Bytes::from(frame.serialize())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "$-1"),
            Frame::Array(arr) => {
                write!(f, "*{}", arr.len())?;
                for frame in arr {
                    write!(f, " {}", frame)?;
                }
                Ok(())
            }
        }
    }
}

/// `$<len>\r\n<len bytes>\r\n`
fn get_bulk(src: &mut Cursor<&[u8]>) -> Result<Bytes, Error> {
    if get_byte(src)? != b'$' {
        return Err(Error::Malformed("expected bulk string"));
    }

    let length = get_size(src)?;
    let start = src.position() as usize;
    let end = start
        .checked_add(length)
        .ok_or(Error::Malformed("bulk string length out of range"))?;

    if src.get_ref().len().saturating_sub(CRLF.len()) < end {
        return Err(Error::Incomplete);
    }
    if &src.get_ref()[end..end + CRLF.len()] != CRLF {
        return Err(Error::Malformed("bulk string is not terminated by CRLF"));
    }

    let data = Bytes::copy_from_slice(&src.get_ref()[start..end]);
    src.set_position((end + CRLF.len()) as u64);

    Ok(data)
}

/// Reads a non-negative decimal terminated by CRLF.
fn get_size(src: &mut Cursor<&[u8]>) -> Result<usize, Error> {
    let start = src.position() as usize;

    let line = match get_line(src) {
        Ok(line) => line,
        // A partial line that already holds a non-digit can never become a valid size.
        Err(Error::Incomplete) => {
            let partial = &src.get_ref()[start..];
            return match partial.iter().all(|b| b.is_ascii_digit() || *b == b'\r') {
                true => Err(Error::Incomplete),
                false => Err(Error::Malformed("invalid size")),
            };
        }
        Err(err) => return Err(err),
    };

    if line.is_empty() || !line.iter().all(u8::is_ascii_digit) {
        return Err(Error::Malformed("invalid size"));
    }

    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or(Error::Malformed("invalid size"))
}

fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf: &'a [u8] = *src.get_ref();

    let line_end = buf[start..]
        .windows(2)
        .position(|window| window == CRLF)
        .map(|index| start + index)
        .ok_or(Error::Incomplete)?;

    src.set_position((line_end + CRLF.len()) as u64);

    Ok(&buf[start..line_end])
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}
