use std::fs;
use std::io::Write;
use std::path::Path;

use skillmentor_core::{DocumentId, Error, Result};

/// File signature of a saved index.
pub const FORMAT_MAGIC: &[u8; 8] = b"SMVINDEX";
/// Bumped whenever the on-disk layout changes; older readers refuse newer files.
pub const FORMAT_VERSION: u16 = 1;
const DIGEST_LEN: usize = 32;

/// One search result: the position of the stored vector and its squared L2
/// distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Flat, exact L2 index. Vectors are stored row-major in insertion order, so
/// position `i` is the `i`-th vector added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    dim: usize,
    ids: Vec<DocumentId>,
    data: Vec<f32>,
}

impl VectorIndex {
    pub fn empty() -> Self { Self::default() }

    /// Build from `(id, vector)` pairs. The first vector fixes the dimension.
    pub fn build(entries: Vec<(DocumentId, Vec<f32>)>) -> Result<Self> {
        let dim = entries.first().map_or(0, |(_, v)| v.len());
        if !entries.is_empty() && dim == 0 {
            return Err(Error::InvalidArgument("cannot index zero-length vectors".into()));
        }
        let mut ids = Vec::with_capacity(entries.len());
        let mut data = Vec::with_capacity(entries.len() * dim);
        for (position, (id, vector)) in entries.into_iter().enumerate() {
            if vector.len() != dim {
                return Err(Error::DimensionMismatch { expected: dim, found: vector.len(), context: format!("vector {}", position) });
            }
            ids.push(id);
            data.extend_from_slice(&vector);
        }
        Ok(Self { dim, ids, data })
    }

    pub fn dim(&self) -> usize { self.dim }
    pub fn len(&self) -> usize { self.ids.len() }
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }
    pub fn ids(&self) -> &[DocumentId] { &self.ids }

    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() { return None; }
        Some(&self.data[position * self.dim..(position + 1) * self.dim])
    }

    /// The `min(k, len)` nearest vectors, ascending by distance; equal
    /// distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if self.is_empty() || k == 0 { return Ok(Vec::new()); }
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, found: query.len(), context: "query".into() });
        }
        let mut hits: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(position, row)| Neighbor { position, distance: squared_l2(row, query) })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.position.cmp(&b.position)));
        hits.truncate(k);
        Ok(hits)
    }

    /// Write the index atomically: a temp file in the target directory is
    /// fully written and synced, then renamed over `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.encode()?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| storage(path, e))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| storage(path, e))?;
        tmp.write_all(&bytes).map_err(|e| storage(path, e))?;
        tmp.as_file().sync_all().map_err(|e| storage(path, e))?;
        tmp.persist(path).map_err(|e| storage(path, e.error))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| storage(path, e))?;
        Self::decode(&bytes).map_err(|e| match e {
            Error::Storage(msg) => Error::Storage(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let dim = u32::try_from(self.dim).map_err(|_| Error::Storage("dimension does not fit the index format".into()))?;
        let mut buf = Vec::with_capacity(22 + self.data.len() * 4 + self.ids.len() * 24 + DIGEST_LEN);
        buf.extend_from_slice(FORMAT_MAGIC);
        buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        buf.extend_from_slice(&dim.to_le_bytes());
        buf.extend_from_slice(&(self.ids.len() as u64).to_le_bytes());
        for id in &self.ids {
            let raw = id.as_str().as_bytes();
            let len = u32::try_from(raw.len()).map_err(|_| Error::Storage("document id too long".into()))?;
            buf.extend_from_slice(&len.to_le_bytes());
            buf.extend_from_slice(raw);
        }
        for value in &self.data {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        let digest = blake3::hash(&buf);
        buf.extend_from_slice(digest.as_bytes());
        Ok(buf)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FORMAT_MAGIC.len() || &bytes[..FORMAT_MAGIC.len()] != FORMAT_MAGIC {
            return Err(Error::Storage("not a skillmentor index file".into()));
        }
        let mut header = Reader::new(&bytes[FORMAT_MAGIC.len()..]);
        let version = header.u16()?;
        if version != FORMAT_VERSION {
            return Err(Error::Storage(format!("unsupported index format version {} (expected {})", version, FORMAT_VERSION)));
        }
        if bytes.len() < FORMAT_MAGIC.len() + 14 + DIGEST_LEN {
            return Err(Error::Storage("index file is truncated".into()));
        }
        let (body, digest) = bytes.split_at(bytes.len() - DIGEST_LEN);
        if blake3::hash(body).as_bytes().as_slice() != digest {
            return Err(Error::Storage("index checksum mismatch".into()));
        }

        let mut r = Reader::new(&body[FORMAT_MAGIC.len() + 2..]);
        let dim = r.u32()? as usize;
        let count = usize::try_from(r.u64()?).map_err(|_| Error::Storage("vector count overflows".into()))?;
        if dim == 0 && count > 0 {
            return Err(Error::Storage(format!("{} vectors declared with zero dimension", count)));
        }
        let mut ids = Vec::with_capacity(count.min(r.remaining()));
        for _ in 0..count {
            let len = r.u32()? as usize;
            let raw = r.take(len)?;
            let id = std::str::from_utf8(raw).map_err(|_| Error::Storage("document id is not valid utf-8".into()))?;
            ids.push(DocumentId::from_raw(id));
        }
        let values = count
            .checked_mul(dim)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| Error::Storage("vector data size overflows".into()))?;
        let data = r
            .take(values)?
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        if r.remaining() != 0 {
            return Err(Error::Storage(format!("{} trailing bytes after vector data", r.remaining())));
        }
        Ok(Self { dim, ids, data })
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn storage(path: &Path, err: std::io::Error) -> Error {
    Error::Storage(format!("{}: {}", path.display(), err))
}

struct Reader<'a> { buf: &'a [u8], pos: usize }

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self { Self { buf, pos: 0 } }

    fn remaining(&self) -> usize { self.buf.len() - self.pos }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() { return Err(Error::Storage("index file is truncated".into())); }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn u16(&mut self) -> Result<u16> { let b = self.take(2)?; Ok(u16::from_le_bytes([b[0], b[1]])) }
    fn u32(&mut self) -> Result<u32> { let b = self.take(4)?; Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]])) }
    fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_le_bytes(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: usize) -> DocumentId { DocumentId::derive(i, &format!("doc {}", i)) }

    #[test]
    fn ties_keep_insertion_order() {
        let index = VectorIndex::build(vec![(id(0), vec![1.0, 0.0]), (id(1), vec![0.0, 1.0]), (id(2), vec![1.0, 0.0])]).unwrap();
        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits.iter().map(|h| h.position).collect::<Vec<_>>(), vec![0, 2, 1]);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[2].distance, 2.0);
    }

    #[test]
    fn corrupted_bytes_fail_checksum() {
        let index = VectorIndex::build(vec![(id(0), vec![0.5, 0.25])]).unwrap();
        let mut bytes = index.encode().unwrap();
        let last_value = bytes.len() - DIGEST_LEN - 1;
        bytes[last_value] ^= 0xff;
        let err = VectorIndex::decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("checksum"), "{}", err);
    }

    #[test]
    fn newer_version_is_rejected() {
        let mut bytes = VectorIndex::empty().encode().unwrap();
        bytes[8..10].copy_from_slice(&2u16.to_le_bytes());
        let err = VectorIndex::decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("version 2"), "{}", err);
    }

    #[test]
    fn zero_dimension_with_vectors_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(FORMAT_MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&2u64.to_le_bytes());
        for i in 0..2 {
            let raw = id(i).as_str().as_bytes().to_vec();
            bytes.extend_from_slice(&(raw.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&raw);
        }
        let digest = blake3::hash(&bytes);
        bytes.extend_from_slice(digest.as_bytes());

        let err = VectorIndex::decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::Storage(_)), "{:?}", err);
        assert!(err.to_string().contains("zero dimension"), "{}", err);
    }
}
