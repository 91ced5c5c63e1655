//! In-memory ZIP writer for tests.

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::{write::DeflateEncoder, Compression, Crc};
use std::io::Write;

use super::structures::{
    EndOfCentralDirectory, Zip64EndOfCentralDirectory, Zip64Locator, CDFH_SIGNATURE,
    FLAG_ENCRYPTED, LFH_SIGNATURE,
};

pub(crate) struct TestZip {
    body: Vec<u8>,
    central: Vec<u8>,
    count: u16,
}

impl TestZip {
    pub(crate) fn new() -> Self {
        Self {
            body: Vec::new(),
            central: Vec::new(),
            count: 0,
        }
    }

    pub(crate) fn stored(mut self, name: &str, data: &[u8]) -> Self {
        self.add(name, 0, 0, crc(data), data, data.len() as u32);
        self
    }

    pub(crate) fn deflated(mut self, name: &str, data: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();
        self.add(name, 8, 0, crc(data), &compressed, data.len() as u32);
        self
    }

    pub(crate) fn directory(mut self, name: &str) -> Self {
        self.add(name, 0, 0, 0, &[], 0);
        self
    }

    pub(crate) fn encrypted(mut self, name: &str, data: &[u8]) -> Self {
        self.add(name, 0, FLAG_ENCRYPTED, crc(data), data, data.len() as u32);
        self
    }

    pub(crate) fn with_method(mut self, name: &str, method: u16, data: &[u8]) -> Self {
        self.add(name, method, 0, crc(data), data, data.len() as u32);
        self
    }

    /// Stores `data` but records a wrong checksum in both headers.
    pub(crate) fn corrupt_crc(mut self, name: &str, data: &[u8]) -> Self {
        self.add(name, 0, 0, crc(data) ^ 0xFFFF_FFFF, data, data.len() as u32);
        self
    }

    fn add(
        &mut self,
        name: &str,
        method: u16,
        flags: u16,
        crc32: u32,
        payload: &[u8],
        uncompressed: u32,
    ) {
        let offset = self.body.len() as u32;
        let name_bytes = name.as_bytes();

        let lfh = &mut self.body;
        lfh.write_all(LFH_SIGNATURE).unwrap();
        lfh.write_u16::<LittleEndian>(20).unwrap();
        lfh.write_u16::<LittleEndian>(flags).unwrap();
        lfh.write_u16::<LittleEndian>(method).unwrap();
        lfh.write_u16::<LittleEndian>(0).unwrap();
        lfh.write_u16::<LittleEndian>(0).unwrap();
        lfh.write_u32::<LittleEndian>(crc32).unwrap();
        lfh.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
        lfh.write_u32::<LittleEndian>(uncompressed).unwrap();
        lfh.write_u16::<LittleEndian>(name_bytes.len() as u16).unwrap();
        lfh.write_u16::<LittleEndian>(0).unwrap();
        lfh.write_all(name_bytes).unwrap();
        lfh.write_all(payload).unwrap();

        let cd = &mut self.central;
        cd.write_all(CDFH_SIGNATURE).unwrap();
        cd.write_u16::<LittleEndian>(20).unwrap();
        cd.write_u16::<LittleEndian>(20).unwrap();
        cd.write_u16::<LittleEndian>(flags).unwrap();
        cd.write_u16::<LittleEndian>(method).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap();
        cd.write_u32::<LittleEndian>(crc32).unwrap();
        cd.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
        cd.write_u32::<LittleEndian>(uncompressed).unwrap();
        cd.write_u16::<LittleEndian>(name_bytes.len() as u16).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap();
        cd.write_u32::<LittleEndian>(0).unwrap();
        cd.write_u32::<LittleEndian>(offset).unwrap();
        cd.write_all(name_bytes).unwrap();

        self.count += 1;
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.finish_with_comment("")
    }

    pub(crate) fn finish_with_comment(self, comment: &str) -> Vec<u8> {
        let cd_offset = self.body.len() as u32;
        let cd_size = self.central.len() as u32;
        let mut out = self.body;
        out.extend_from_slice(&self.central);
        write_eocd(
            &mut out,
            self.count,
            cd_size,
            cd_offset,
            comment.as_bytes(),
        );
        out
    }

    /// Writes ZIP64 end records and saturates the classic EOCD fields.
    pub(crate) fn finish_zip64(self) -> Vec<u8> {
        let cd_offset = self.body.len() as u64;
        let cd_size = self.central.len() as u64;
        let mut out = self.body;
        out.extend_from_slice(&self.central);

        let eocd64_offset = out.len() as u64;
        out.write_all(Zip64EndOfCentralDirectory::SIGNATURE).unwrap();
        out.write_u64::<LittleEndian>(44).unwrap();
        out.write_u16::<LittleEndian>(45).unwrap();
        out.write_u16::<LittleEndian>(45).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u64::<LittleEndian>(self.count as u64).unwrap();
        out.write_u64::<LittleEndian>(self.count as u64).unwrap();
        out.write_u64::<LittleEndian>(cd_size).unwrap();
        out.write_u64::<LittleEndian>(cd_offset).unwrap();

        out.write_all(Zip64Locator::SIGNATURE).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u64::<LittleEndian>(eocd64_offset).unwrap();
        out.write_u32::<LittleEndian>(1).unwrap();

        write_eocd(&mut out, u16::MAX, u32::MAX, u32::MAX, &[]);
        out
    }
}

fn write_eocd(out: &mut Vec<u8>, count: u16, cd_size: u32, cd_offset: u32, comment: &[u8]) {
    out.write_all(EndOfCentralDirectory::SIGNATURE).unwrap();
    out.write_u16::<LittleEndian>(0).unwrap();
    out.write_u16::<LittleEndian>(0).unwrap();
    out.write_u16::<LittleEndian>(count).unwrap();
    out.write_u16::<LittleEndian>(count).unwrap();
    out.write_u32::<LittleEndian>(cd_size).unwrap();
    out.write_u32::<LittleEndian>(cd_offset).unwrap();
    out.write_u16::<LittleEndian>(comment.len() as u16).unwrap();
    out.write_all(comment).unwrap();
}

fn crc(data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(data);
    crc.sum()
}
