//! Structural validator for untrusted buffers
//!
//! The walk is iterative: one stack frame per open container, each holding
//! the container's end offset and the number of entries still expected.
//! Every length is re-derived from the bytes and checked against the
//! enclosing container's end before anything is read.

use crate::item::Item;
use crate::reader::read_key;
use binn_format::{BinnError, ContainerHeader, ContainerKind, Limits, Result, TypeTag};
use tracing::debug;

/// Summary of the top-level item of a valid buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedHeader {
    /// Type of the top-level item
    pub type_tag: TypeTag,
    /// Encoded length of the top-level item
    pub size: usize,
    /// Entry count for containers, 0 for scalars
    pub count: usize,
}

struct Frame {
    kind: ContainerKind,
    end: usize,
    remaining: usize,
    position: usize,
}

/// Validate with default [`Limits`].
pub fn validate(bytes: &[u8]) -> Result<ValidatedHeader> {
    validate_with_limits(bytes, &Limits::default())
}

/// Whether `bytes` starts with a well-formed item.
pub fn is_valid(bytes: &[u8]) -> bool {
    validate(bytes).is_ok()
}

/// Validate the item at the start of `bytes`.
///
/// Bytes after the item's declared size are ignored. Nothing at or beyond
/// `bytes.len()` is ever read.
pub fn validate_with_limits(bytes: &[u8], limits: &Limits) -> Result<ValidatedHeader> {
    let limits = limits.clamped();
    let result = walk(bytes, &limits);
    if let Err(e) = &result {
        debug!(error = %e, len = bytes.len(), "rejected buffer");
    }
    result
}

fn walk(bytes: &[u8], limits: &Limits) -> Result<ValidatedHeader> {
    let type_byte = *bytes.first().ok_or(BinnError::UnexpectedEof)?;
    let type_tag = TypeTag::from_u8(type_byte)?;

    if !type_tag.is_container() {
        let (_, size) = Item::read(bytes)?;
        check_size(size, limits)?;
        return Ok(ValidatedHeader {
            type_tag,
            size,
            count: 0,
        });
    }

    if limits.max_depth == 0 {
        return Err(depth_exceeded(limits));
    }
    let (top, header_len) = ContainerHeader::decode(bytes)?;
    check_size(top.size, limits)?;

    let mut stack = vec![Frame {
        kind: top.kind,
        end: top.size,
        remaining: top.count,
        position: 0,
    }];
    let mut pos = header_len;

    while let Some(frame) = stack.last_mut() {
        if frame.remaining == 0 {
            if pos != frame.end {
                return Err(BinnError::Malformed(format!(
                    "{} entries end at {}, container ends at {}",
                    frame.kind, pos, frame.end
                )));
            }
            stack.pop();
            continue;
        }
        frame.remaining -= 1;
        frame.position += 1;

        // Everything below reads from the enclosing container only.
        let window = &bytes[..frame.end];
        let rest = window.get(pos..).ok_or(BinnError::UnexpectedEof)?;
        let (_, key_len) = read_key(frame.kind, rest, frame.position)?;
        pos += key_len;

        let item = window.get(pos..).ok_or(BinnError::UnexpectedEof)?;
        let tag = TypeTag::from_u8(*item.first().ok_or(BinnError::UnexpectedEof)?)?;
        if tag.is_container() {
            if stack.len() >= limits.max_depth {
                return Err(depth_exceeded(limits));
            }
            let (nested, nested_header_len) = ContainerHeader::decode(item)?;
            stack.push(Frame {
                kind: nested.kind,
                end: pos + nested.size,
                remaining: nested.count,
                position: 0,
            });
            pos += nested_header_len;
        } else {
            let (_, item_len) = Item::read(item)?;
            pos += item_len;
        }
    }

    Ok(ValidatedHeader {
        type_tag,
        size: top.size,
        count: top.count,
    })
}

fn check_size(size: usize, limits: &Limits) -> Result<()> {
    if size > limits.max_value_size {
        return Err(BinnError::LimitExceeded(format!(
            "value size {} exceeds limit {}",
            size, limits.max_value_size
        )));
    }
    Ok(())
}

fn depth_exceeded(limits: &Limits) -> BinnError {
    BinnError::LimitExceeded(format!("nesting deeper than {}", limits.max_depth))
}
