// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cells and bags of cells.
//!
//! A cell holds up to 1023 data bits and four child references. Its
//! representation hash (SHA-256 over the two descriptor bytes, the padded
//! data, child depths and child hashes) identifies it on chain. A bag of
//! cells (BoC) is the wire encoding accepted by `message`.
//!
//! Only ordinary cells are supported.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::address::Address;
use crate::error::TonError;

pub const MAX_BITS: usize = 1023;
pub const MAX_REFS: usize = 4;

const BOC_MAGIC: [u8; 4] = [0xb5, 0xee, 0x9c, 0x72];
const BOC_HAS_INDEX: u8 = 0x80;
const BOC_HAS_CRC32C: u8 = 0x40;

/// Text bytes that fit after the 32-bit comment opcode.
const FIRST_TEXT_CHUNK: usize = (MAX_BITS - 32) / 8;
/// Text bytes that fit in a continuation cell.
const TEXT_CHUNK: usize = MAX_BITS / 8;

fn encoding(message: impl Into<String>) -> TonError {
    TonError::CellEncoding(message.into())
}

/// An immutable ordinary cell with its hash and depth precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Arc<Cell>>,
    hash: [u8; 32],
    depth: u16,
}

impl Cell {
    fn new(data: Vec<u8>, bit_len: usize, refs: Vec<Arc<Cell>>) -> Self {
        let depth = refs.iter().map(|r| r.depth + 1).max().unwrap_or(0);
        let mut cell = Self {
            data,
            bit_len,
            refs,
            hash: [0; 32],
            depth,
        };

        let mut hasher = Sha256::new();
        hasher.update(cell.descriptors());
        hasher.update(cell.padded_data());
        for child in &cell.refs {
            hasher.update(child.depth.to_be_bytes());
        }
        for child in &cell.refs {
            hasher.update(child.hash);
        }
        cell.hash = hasher.finalize().into();
        cell
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    pub fn depth(&self) -> u16 {
        self.depth
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn refs(&self) -> &[Arc<Cell>] {
        &self.refs
    }

    pub fn bit(&self, index: usize) -> bool {
        index < self.bit_len && self.data[index / 8] & (0x80 >> (index % 8)) != 0
    }

    fn descriptors(&self) -> [u8; 2] {
        let refs = self.refs.len() as u8;
        let data = (self.bit_len / 8 + self.bit_len.div_ceil(8)) as u8;
        [refs, data]
    }

    /// Data bytes with the completion tag set after a partial last byte.
    fn padded_data(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        if self.bit_len % 8 != 0 {
            if let Some(last) = data.last_mut() {
                *last |= 0x80 >> (self.bit_len % 8);
            }
        }
        data
    }
}

/// Appends bits and references, then freezes them into a [`Cell`].
#[derive(Debug, Clone, Default)]
pub struct CellBuilder {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Arc<Cell>>,
}

impl CellBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self, TonError> {
        if self.bit_len >= MAX_BITS {
            return Err(encoding(format!("cell overflow: more than {MAX_BITS} bits")));
        }
        if self.bit_len % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            if let Some(last) = self.data.last_mut() {
                *last |= 0x80 >> (self.bit_len % 8);
            }
        }
        self.bit_len += 1;
        Ok(self)
    }

    /// Store `value` as a big-endian unsigned integer of `bits` width.
    pub fn store_uint(&mut self, bits: usize, value: u128) -> Result<&mut Self, TonError> {
        if bits > 128 || (bits < 128 && value >> bits != 0) {
            return Err(encoding(format!("{value} does not fit in {bits} bits")));
        }
        for i in (0..bits).rev() {
            self.store_bit((value >> i) & 1 == 1)?;
        }
        Ok(self)
    }

    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, TonError> {
        for byte in bytes {
            self.store_uint(8, u128::from(*byte))?;
        }
        Ok(self)
    }

    /// `VarUInteger 16`: a 4-bit byte length followed by the value.
    pub fn store_coins(&mut self, amount: u128) -> Result<&mut Self, TonError> {
        let len = (128 - amount.leading_zeros() as usize).div_ceil(8);
        if len > 15 {
            return Err(encoding(format!("coin amount {amount} exceeds 120 bits")));
        }
        self.store_uint(4, len as u128)?;
        self.store_uint(len * 8, amount)
    }

    /// `addr_std` without anycast.
    pub fn store_address(&mut self, address: &Address) -> Result<&mut Self, TonError> {
        let workchain = i8::try_from(address.workchain()).map_err(|_| {
            encoding(format!("workchain {} does not fit addr_std", address.workchain()))
        })?;
        self.store_uint(2, 0b10)?;
        self.store_bit(false)?;
        self.store_uint(8, u128::from(workchain as u8))?;
        self.store_bytes(address.hash())
    }

    /// `addr_none`.
    pub fn store_address_none(&mut self) -> Result<&mut Self, TonError> {
        self.store_uint(2, 0)
    }

    pub fn store_ref(&mut self, cell: Arc<Cell>) -> Result<&mut Self, TonError> {
        if self.refs.len() >= MAX_REFS {
            return Err(encoding(format!("cell overflow: more than {MAX_REFS} refs")));
        }
        self.refs.push(cell);
        Ok(self)
    }

    /// `Maybe ^Cell`.
    pub fn store_maybe_ref(&mut self, cell: Option<Arc<Cell>>) -> Result<&mut Self, TonError> {
        match cell {
            Some(cell) => self.store_bit(true)?.store_ref(cell),
            None => self.store_bit(false),
        }
    }

    /// Append every bit and reference of `cell`.
    pub fn store_cell(&mut self, cell: &Cell) -> Result<&mut Self, TonError> {
        for i in 0..cell.bit_len() {
            self.store_bit(cell.bit(i))?;
        }
        for child in cell.refs() {
            self.store_ref(child.clone())?;
        }
        Ok(self)
    }

    pub fn build(self) -> Arc<Cell> {
        Arc::new(Cell::new(self.data, self.bit_len, self.refs))
    }
}

/// Text comment body: opcode 0, then UTF-8 text snaked across child cells.
pub fn comment_cell(text: &str) -> Result<Arc<Cell>, TonError> {
    let bytes = text.as_bytes();
    let split = bytes.len().min(FIRST_TEXT_CHUNK);
    let (head, rest) = bytes.split_at(split);

    let mut tail: Option<Arc<Cell>> = None;
    for chunk in rest.chunks(TEXT_CHUNK).rev() {
        let mut builder = CellBuilder::new();
        builder.store_bytes(chunk)?;
        if let Some(next) = tail.take() {
            builder.store_ref(next)?;
        }
        tail = Some(builder.build());
    }

    let mut builder = CellBuilder::new();
    builder.store_uint(32, 0)?.store_bytes(head)?;
    if let Some(next) = tail {
        builder.store_ref(next)?;
    }
    Ok(builder.build())
}

// =============================================================================
// Bag of cells
// =============================================================================

/// Serialize a single-root bag of cells with a CRC32C trailer and no index.
pub fn to_boc(root: &Arc<Cell>) -> Vec<u8> {
    let order = topological_order(root);
    let index: HashMap<[u8; 32], usize> = order
        .iter()
        .enumerate()
        .map(|(i, cell)| (cell.hash, i))
        .collect();
    let size = byte_width(order.len() as u64);

    let mut cells = Vec::new();
    for cell in &order {
        cells.extend_from_slice(&cell.descriptors());
        cells.extend_from_slice(&cell.padded_data());
        for child in &cell.refs {
            let position = index.get(&child.hash).copied().unwrap_or_default();
            push_uint(&mut cells, position as u64, size);
        }
    }
    let offset = byte_width(cells.len() as u64);

    let mut out = Vec::with_capacity(cells.len() + 32);
    out.extend_from_slice(&BOC_MAGIC);
    out.push(BOC_HAS_CRC32C | size as u8);
    out.push(offset as u8);
    push_uint(&mut out, order.len() as u64, size);
    push_uint(&mut out, 1, size);
    push_uint(&mut out, 0, size);
    push_uint(&mut out, cells.len() as u64, offset);
    push_uint(&mut out, 0, size);
    out.extend_from_slice(&cells);

    let crc = crc32c::crc32c(&out);
    out.extend_from_slice(&crc.to_le_bytes());
    out
}

/// Parse a bag of cells and return its first root.
pub fn from_boc(bytes: &[u8]) -> Result<Arc<Cell>, TonError> {
    let mut reader = Reader::new(bytes);
    if reader.take(4)? != BOC_MAGIC {
        return Err(encoding("not a bag of cells"));
    }

    let flags = reader.take(1)?[0];
    let size = usize::from(flags & 0x07);
    if size == 0 || size > 4 {
        return Err(encoding(format!("bad reference width {size}")));
    }
    let offset = usize::from(reader.take(1)?[0]);
    if offset == 0 || offset > 8 {
        return Err(encoding(format!("bad offset width {offset}")));
    }

    let cell_count = reader.uint(size)? as usize;
    let root_count = reader.uint(size)? as usize;
    let _absent = reader.uint(size)?;
    let _total_size = reader.uint(offset)?;
    if root_count == 0 {
        return Err(encoding("bag of cells has no root"));
    }
    // every cell takes at least its two descriptor bytes
    if cell_count > bytes.len() / 2 {
        return Err(encoding(format!("{cell_count} cells cannot fit in {} bytes", bytes.len())));
    }
    let root = reader.uint(size)? as usize;
    for _ in 1..root_count {
        reader.uint(size)?;
    }
    if flags & BOC_HAS_INDEX != 0 {
        reader.take(cell_count * offset)?;
    }

    if flags & BOC_HAS_CRC32C != 0 {
        let body_len = bytes
            .len()
            .checked_sub(4)
            .ok_or_else(|| encoding("truncated checksum"))?;
        let expected = u32::from_le_bytes([
            bytes[body_len],
            bytes[body_len + 1],
            bytes[body_len + 2],
            bytes[body_len + 3],
        ]);
        if crc32c::crc32c(&bytes[..body_len]) != expected {
            return Err(encoding("checksum mismatch"));
        }
    }

    let mut raw = Vec::with_capacity(cell_count);
    for i in 0..cell_count {
        let descriptor = reader.take(2)?;
        let (d1, d2) = (descriptor[0], descriptor[1]);
        if d1 & 0x08 != 0 {
            return Err(encoding(format!("cell {i} is exotic")));
        }
        let ref_count = usize::from(d1 & 0x07);
        if ref_count > MAX_REFS {
            return Err(encoding(format!("cell {i} has {ref_count} refs")));
        }

        let mut data = reader.take(usize::from(d2).div_ceil(2))?.to_vec();
        let mut bit_len = data.len() * 8;
        if d2 % 2 == 1 {
            let last = data.last_mut().ok_or_else(|| encoding("empty padded cell"))?;
            if *last == 0 {
                return Err(encoding(format!("cell {i} lacks a completion tag")));
            }
            let tag = last.trailing_zeros() as usize;
            *last &= !(1u8 << tag);
            bit_len -= tag + 1;
        }

        let mut children = Vec::with_capacity(ref_count);
        for _ in 0..ref_count {
            let child = reader.uint(size)? as usize;
            if child <= i || child >= cell_count {
                return Err(encoding(format!("cell {i} has a bad reference {child}")));
            }
            children.push(child);
        }
        raw.push((data, bit_len, children));
    }

    let mut built: Vec<Option<Arc<Cell>>> = vec![None; cell_count];
    for (i, (data, bit_len, children)) in raw.into_iter().enumerate().rev() {
        let refs = children
            .iter()
            .map(|&c| built[c].clone().ok_or_else(|| encoding("dangling reference")))
            .collect::<Result<Vec<_>, _>>()?;
        built[i] = Some(Arc::new(Cell::new(data, bit_len, refs)));
    }

    built
        .get(root)
        .cloned()
        .flatten()
        .ok_or_else(|| encoding(format!("root index {root} out of range")))
}

/// Parents before children; shared subtrees appear once.
fn topological_order(root: &Arc<Cell>) -> Vec<Arc<Cell>> {
    fn visit(cell: &Arc<Cell>, seen: &mut HashSet<[u8; 32]>, order: &mut Vec<Arc<Cell>>) {
        if !seen.insert(cell.hash) {
            return;
        }
        for child in cell.refs.iter().rev() {
            visit(child, seen, order);
        }
        order.push(cell.clone());
    }

    let mut seen = HashSet::new();
    let mut order = Vec::new();
    visit(root, &mut seen, &mut order);
    order.reverse();
    order
}

fn byte_width(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

fn push_uint(out: &mut Vec<u8>, value: u64, width: usize) {
    out.extend_from_slice(&value.to_be_bytes()[8 - width..]);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], TonError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| encoding("truncated bag of cells"))?;
        let bytes = self.bytes;
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn uint(&mut self, width: usize) -> Result<u64, TonError> {
        Ok(self
            .take(width)?
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::wallet::WALLET_V4R2_CODE;
    use base64ct::{Base64, Encoding};

    #[test]
    fn wallet_code_hash_matches_the_published_value() {
        let code = from_boc(&Base64::decode_vec(WALLET_V4R2_CODE).unwrap()).unwrap();
        assert_eq!(
            hex::encode(code.hash()),
            "feb5ff6820e2ff0d9483e7e0d62c817d846789fb4ae580c878866d959dabd5c0"
        );
    }

    #[test]
    fn serialized_bags_parse_back_to_the_same_tree() {
        let code = from_boc(&Base64::decode_vec(WALLET_V4R2_CODE).unwrap()).unwrap();
        let boc = to_boc(&code);
        assert_eq!(&boc[..4], &BOC_MAGIC);

        let parsed = from_boc(&boc).unwrap();
        assert_eq!(parsed.hash(), code.hash());
        assert_eq!(parsed.depth(), code.depth());
    }

    #[test]
    fn corrupted_bags_are_rejected() {
        let mut builder = CellBuilder::new();
        builder.store_uint(32, 0xdead_beef).unwrap();
        let mut boc = to_boc(&builder.build());

        let last = boc.len() - 5;
        boc[last] ^= 0xff;
        assert!(matches!(from_boc(&boc), Err(TonError::CellEncoding(_))));
        assert!(matches!(from_boc(&boc[..6]), Err(TonError::CellEncoding(_))));
        assert!(matches!(from_boc(b"not a boc"), Err(TonError::CellEncoding(_))));
    }

    #[test]
    fn empty_cell_hash() {
        // sha256 of the two zero descriptor bytes
        assert_eq!(
            hex::encode(CellBuilder::new().build().hash()),
            "96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7"
        );
    }

    #[test]
    fn partial_bytes_get_a_completion_tag() {
        let mut builder = CellBuilder::new();
        builder.store_bit(true).unwrap().store_bit(false).unwrap();
        let cell = builder.build();

        assert_eq!(cell.bit_len(), 2);
        assert_eq!(cell.descriptors(), [0, 1]);
        assert_eq!(cell.padded_data(), vec![0b1010_0000]);
        assert!(cell.bit(0));
        assert!(!cell.bit(1));
    }

    #[test]
    fn builders_enforce_cell_limits() {
        let mut builder = CellBuilder::new();
        for _ in 0..MAX_BITS {
            builder.store_bit(true).unwrap();
        }
        assert!(builder.store_bit(true).is_err());

        let mut builder = CellBuilder::new();
        for _ in 0..MAX_REFS {
            builder.store_ref(CellBuilder::new().build()).unwrap();
        }
        assert!(builder.store_ref(CellBuilder::new().build()).is_err());

        assert!(CellBuilder::new().store_uint(8, 256).is_err());
        assert!(CellBuilder::new().store_coins(1u128 << 120).is_err());
        assert!(CellBuilder::new()
            .store_address(&Address::new(300, [0; 32]))
            .is_err());
    }

    #[test]
    fn coins_use_a_length_prefix() {
        let mut zero = CellBuilder::new();
        zero.store_coins(0).unwrap();
        assert_eq!(zero.bit_len(), 4);

        let mut ton = CellBuilder::new();
        ton.store_coins(1_000_000_000).unwrap();
        assert_eq!(ton.bit_len(), 4 + 32);
    }

    #[test]
    fn comments_snake_across_cells() {
        let short = comment_cell("hello").unwrap();
        assert_eq!(short.bit_len(), 32 + 5 * 8);
        assert!(short.refs().is_empty());
        assert_eq!(
            hex::encode(short.hash()),
            "551f6c3e8d7ae7d9b3ac53bca9b6f82cff322fb16113820776d14a3f93b93951"
        );

        let long = comment_cell(&"ton".repeat(100)).unwrap();
        assert_eq!(long.bit_len(), 32 + FIRST_TEXT_CHUNK * 8);
        assert_eq!(long.depth(), 2);
        assert_eq!(long.refs()[0].bit_len(), TEXT_CHUNK * 8);
        assert_eq!(
            hex::encode(long.hash()),
            "6f0d6dcd10cd2dcea8317025564834488a13508e2268e1a830c456699eea502e"
        );
    }
}
