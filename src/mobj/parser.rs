//! MovieObject container parser
//!
//! Layout (byte offsets from file start):
//! - 0: signature "MOBJ"
//! - 4: version tag "0100" or "0200"
//! - 8: extension data start offset
//! - 40: data length, 4 reserved bytes, 2-byte object count
//! - 50..: object records
//!
//! Each object record is 1+1+1 flag bits, 13 reserved bits, a 2-byte command
//! count, then that many 12-byte command records (instruction word, dst, src).
//!
//! Parsing is all-or-nothing: any signature mismatch, short read or
//! allocation failure surfaces one error and nothing of the partially built
//! tree survives.

use std::fs;
use std::path::Path;

use log::debug;

use super::{Instruction, MobjCommand, MobjVersion, MovieObject, MovieObjectFile, ObjectFlags};
use crate::bits::BitReader;
use crate::{BdNavError, Result};

const MOBJ_SIG: u32 = u32::from_be_bytes(*b"MOBJ");
const MOBJ_VERSION_0100: u32 = u32::from_be_bytes(*b"0100");
const MOBJ_VERSION_0200: u32 = u32::from_be_bytes(*b"0200");

/// Byte offset of the data-length / object-count block. Fixed by the
/// format, not derived from the header fields before it.
const MOBJ_DATA_OFFSET: usize = 40;

/// Parse a `MovieObject.bdmv` file from disk.
///
/// The file is read in one scoped operation; the OS handle is closed before
/// any decoding starts, on success and failure alike.
pub fn parse(path: impl AsRef<Path>) -> Result<MovieObjectFile> {
    let path = path.as_ref();
    let data = fs::read(path).inspect_err(|e| {
        debug!("error opening {}: {}", path.display(), e);
    })?;
    parse_bytes(&data).inspect_err(|e| {
        debug!("{}: {}", path.display(), e);
    })
}

/// Parse a MovieObject container from in-memory file data.
pub fn parse_bytes(data: &[u8]) -> Result<MovieObjectFile> {
    let mut bits = BitReader::new(data);

    let (version, extension_data_start) = parse_header(&mut bits)?;

    bits.seek_byte(MOBJ_DATA_OFFSET)?;
    let data_len = bits.read(32)?;
    bits.skip(32)?; // reserved
    let num_objects = bits.read(16)? as usize;

    debug!(
        "MovieObject: {} objects, {} data bytes, extension data at {}",
        num_objects, data_len, extension_data_start
    );

    let mut objects = Vec::new();
    objects.try_reserve_exact(num_objects).map_err(|_| {
        BdNavError::Resource(format!("cannot allocate {} movie objects", num_objects))
    })?;

    for i in 0..num_objects {
        let obj = parse_object(&mut bits)
            .map_err(|e| rewrap(e, &format!("error parsing object {}", i)))?;
        objects.push(obj);
    }

    Ok(MovieObjectFile {
        version,
        extension_data_start,
        objects,
    })
}

fn parse_header(bits: &mut BitReader) -> Result<(MobjVersion, u32)> {
    bits.seek_byte(0)?;

    let sig1 = bits.read(32)?;
    let sig2 = bits.read(32)?;

    if sig1 != MOBJ_SIG {
        debug!("MovieObject signature mismatch: {:#010x}", sig1);
        return Err(BdNavError::Format(format!(
            "invalid signature {:#010x}, expected \"MOBJ\"",
            sig1
        )));
    }
    let version = match sig2 {
        MOBJ_VERSION_0100 => MobjVersion::V0100,
        MOBJ_VERSION_0200 => MobjVersion::V0200,
        _ => {
            debug!("MovieObject version mismatch: {:#010x}", sig2);
            return Err(BdNavError::Format(format!(
                "unsupported version tag {:#010x}, expected \"0100\" or \"0200\"",
                sig2
            )));
        }
    };

    let extension_data_start = bits.read(32)?;

    Ok((version, extension_data_start))
}

fn parse_object(bits: &mut BitReader) -> Result<MovieObject> {
    let mut flags = ObjectFlags::empty();
    flags.set(ObjectFlags::RESUME_INTENTION, bits.read_bit()?);
    flags.set(ObjectFlags::MENU_CALL_MASK, bits.read_bit()?);
    flags.set(ObjectFlags::TITLE_SEARCH_MASK, bits.read_bit()?);

    bits.skip(13)?; // padding to the 16-bit boundary

    let num_cmds = bits.read(16)? as usize;

    let mut cmds = Vec::new();
    cmds.try_reserve_exact(num_cmds)
        .map_err(|_| BdNavError::Resource(format!("cannot allocate {} commands", num_cmds)))?;

    for _ in 0..num_cmds {
        let insn = Instruction::decode(bits.read(32)?);
        let dst = bits.read(32)?;
        let src = bits.read(32)?;
        cmds.push(MobjCommand { insn, dst, src });
    }

    Ok(MovieObject { flags, cmds })
}

/// Prefix a format error with parse context, leaving other kinds untouched.
fn rewrap(e: BdNavError, ctx: &str) -> BdNavError {
    match e {
        BdNavError::Format(msg) => BdNavError::Format(format!("{}: {}", ctx, msg)),
        other => other,
    }
}
