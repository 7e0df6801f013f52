use basalt_asm::FloatModel;

use crate::arm32::ArmSection;

/// Which floating point hardware the program targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatArch {
    /// FPA. `reverse_consts` selects the reversed word order the FPA
    /// uses for doubles in memory; it governs both the inline pool
    /// flushes and the program constant pool.
    Fpa {
        /// Store doubles high word first.
        reverse_consts: bool,
    },
    /// VFPv2; doubles are stored in natural little-endian order.
    Vfp,
}

impl FloatArch {
    pub(crate) fn model(self) -> FloatModel {
        match self {
            FloatArch::Fpa { .. } => FloatModel::Fpa,
            FloatArch::Vfp => FloatModel::Vfp,
        }
    }

    pub(crate) fn reverse_doubles(self) -> bool {
        matches!(
            self,
            FloatArch::Fpa {
                reverse_consts: true
            }
        )
    }
}

/// An opaque blob in the program's global constant pool: string data,
/// array initialisers, packed doubles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantData {
    /// The raw bytes.
    pub bytes: Vec<u8>,
    /// The blob is a run of doubles and needs the FPA word swap when
    /// the target stores doubles reversed.
    pub is_double: bool,
}

/// A complete target program: sections in link order plus the global
/// constant pool they reference.
#[derive(Debug)]
pub struct ArmProg {
    /// Sections, encoded and laid out in this order.
    pub sections: Vec<ArmSection>,
    /// Blobs appended after the last section and resolved by the
    /// linker.
    pub constant_pool: Vec<ConstantData>,
    /// Floating point configuration.
    pub float: FloatArch,
}

impl ArmProg {
    /// An empty program for the given float hardware.
    pub fn new(float: FloatArch) -> ArmProg {
        ArmProg {
            sections: Vec::new(),
            constant_pool: Vec::new(),
            float,
        }
    }

    /// Append a section, returning its index.
    pub fn add_section(&mut self, section: ArmSection) -> usize {
        self.sections.push(section);
        self.sections.len() - 1
    }

    /// Append a constant blob, returning its pool index.
    pub fn add_constant(&mut self, data: ConstantData) -> usize {
        self.constant_pool.push(data);
        self.constant_pool.len() - 1
    }
}
