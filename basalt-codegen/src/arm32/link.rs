use tracing::debug;

use crate::Error;

/// A pool word awaiting a program-constant address.
#[derive(Debug, Clone, Copy)]
struct ConstantRef {
    /// Byte offset of the PC-relative `LDR` that reads the word.
    code_index: usize,
    /// Byte offset of the pool word to rewrite.
    constant_offset: usize,
    /// Index into the program's global constant pool.
    pool_index: usize,
}

/// Resolves cross-section references once every section has been
/// encoded into the program buffer.
///
/// All offsets are byte offsets into the buffer; conversion to the
/// word-granular branch field happens at resolution.
#[derive(Debug)]
pub struct Linker {
    section_starts: Vec<Option<usize>>,
    externals: Vec<usize>,
    constants: Vec<ConstantRef>,
}

impl Linker {
    /// A linker for a program of `sections` sections.
    pub fn new(sections: usize) -> Linker {
        Linker {
            section_starts: vec![None; sections],
            externals: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Record where section `index` starts.
    pub fn set_section_start(&mut self, index: usize, offset: usize) {
        self.section_starts[index] = Some(offset);
    }

    /// Record an inter-section call site. The branch word's low 24
    /// bits hold the callee's section index until resolution.
    pub fn add_external(&mut self, offset: usize) {
        self.externals.push(offset);
    }

    /// Record a pool word that receives the PC-relative address of a
    /// program constant.
    pub fn add_constant_ref(
        &mut self,
        code_index: usize,
        constant_offset: usize,
        pool_index: usize,
    ) {
        self.constants.push(ConstantRef {
            code_index,
            constant_offset,
            pool_index,
        });
    }

    /// Rewrite every recorded site in `code`. `constant_locations`
    /// holds the byte offset at which each global-pool blob was
    /// placed.
    pub fn resolve(
        &self,
        code: &mut [u8],
        constant_locations: &[usize],
    ) -> Result<(), Error> {
        debug!(
            externals = self.externals.len(),
            constants = self.constants.len(),
            "resolving cross-section references"
        );

        for &site in &self.externals {
            let word = read_word(code, site)?;
            let callee = (word & 0xff_ffff) as usize;
            let start = self
                .section_starts
                .get(callee)
                .copied()
                .flatten()
                .ok_or(Error::Assertion("call to an unencoded section"))?;
            // Both offsets are word aligned; the field counts words
            // with the usual two-instruction PC bias.
            let dist = (start as i64 - site as i64) / 4 - 2;
            let patched = (word & 0xff00_0000) | ((dist as u32) & 0xff_ffff);
            write_word(code, site, patched)?;
        }

        for cref in &self.constants {
            let addr = *constant_locations
                .get(cref.pool_index)
                .ok_or(Error::Assertion("constant reference outside the pool"))?;
            // The loaded word is added to the PC of the following
            // ADD, which sits 12 bytes past the LDR's address.
            let value = addr as i64 - cref.code_index as i64 - 12;
            write_word(code, cref.constant_offset, value as u32)?;
        }

        Ok(())
    }
}

fn read_word(code: &[u8], offset: usize) -> Result<u32, Error> {
    if offset & 3 != 0 {
        return Err(Error::BadAlignment(offset));
    }
    let bytes = code
        .get(offset..offset + 4)
        .ok_or(Error::Assertion("link site outside the code buffer"))?;
    Ok(u32::from_le_bytes(bytes.try_into().expect("4 bytes")))
}

fn write_word(code: &mut [u8], offset: usize, word: u32) -> Result<(), Error> {
    if offset & 3 != 0 {
        return Err(Error::BadAlignment(offset));
    }
    let bytes = code
        .get_mut(offset..offset + 4)
        .ok_or(Error::Assertion("link site outside the code buffer"))?;
    bytes.copy_from_slice(&word.to_le_bytes());
    Ok(())
}
