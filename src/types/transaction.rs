//! Unsigned ledger transaction template.
//!
//! ## SSZ Serialization
//!
//! The transaction is an SSZ container. Its encoded length is what the
//! byte fee is charged on, and SHA-256 over the encoding is its hash.
//! Every field that changes during fee settlement (output capacities) is
//! fixed-width, so charging the fee never changes the size.

use ssz_rs::prelude::*;
use sha2::{Digest, Sha256};

use crate::error::AssemblyError;
use crate::types::{OutPoint, Script};

/// Maximum inputs, outputs, data entries or witnesses in one transaction
pub const MAX_TX_CELLS: usize = 1024;

/// Maximum number of cell deps
pub const MAX_CELL_DEPS: usize = 16;

/// Maximum script args length in bytes
pub const MAX_SCRIPT_ARGS: usize = 256;

/// Maximum cell data length in bytes
pub const MAX_CELL_DATA: usize = 256;

/// Maximum witness length in bytes
pub const MAX_WITNESS_LEN: usize = 1024;

/// Transaction format version
pub const TX_VERSION: u32 = 0;

/// Dependency kinds for cell deps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepType {
    #[default]
    Code,
    DepGroup,
}

impl DepType {
    pub fn to_u8(self) -> u8 {
        match self {
            DepType::Code => 0,
            DepType::DepGroup => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DepType::Code),
            1 => Some(DepType::DepGroup),
            _ => None,
        }
    }
}

/// A script code dependency.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct CellDep {
    pub out_point: OutPoint,
    /// Dep type as u8 (0=Code, 1=DepGroup)
    pub dep_type_raw: u8,
}

impl CellDep {
    pub fn new(out_point: OutPoint, dep_type: DepType) -> Self {
        Self {
            out_point,
            dep_type_raw: dep_type.to_u8(),
        }
    }
}

/// A consumed cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct CellInput {
    pub since: u64,
    pub previous_output: OutPoint,
}

impl CellInput {
    pub fn new(previous_output: OutPoint) -> Self {
        Self {
            since: 0,
            previous_output,
        }
    }
}

/// Wire form of a [`Script`].
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct PackedScript {
    pub code_hash: [u8; 32],
    pub hash_type: u8,
    pub args: List<u8, MAX_SCRIPT_ARGS>,
}

impl TryFrom<&Script> for PackedScript {
    type Error = AssemblyError;

    fn try_from(script: &Script) -> Result<Self, Self::Error> {
        Ok(Self {
            code_hash: script.code_hash,
            hash_type: script.hash_type,
            args: to_list(script.args.clone(), "script args")?,
        })
    }
}

/// A created cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct CellOutput {
    pub capacity: u128,
    pub lock: PackedScript,
    pub type_script: PackedScript,
}

impl CellOutput {
    pub fn new(capacity: u128, lock: &Script, type_script: &Script) -> Result<Self, AssemblyError> {
        Ok(Self {
            capacity,
            lock: PackedScript::try_from(lock)?,
            type_script: PackedScript::try_from(type_script)?,
        })
    }
}

/// Unsigned transaction template handed to the external signer.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct RawTransaction {
    pub version: u32,
    pub cell_deps: List<CellDep, MAX_CELL_DEPS>,
    pub inputs: List<CellInput, MAX_TX_CELLS>,
    pub outputs: List<CellOutput, MAX_TX_CELLS>,
    pub outputs_data: List<List<u8, MAX_CELL_DATA>, MAX_TX_CELLS>,
    pub witnesses: List<List<u8, MAX_WITNESS_LEN>, MAX_TX_CELLS>,
}

impl RawTransaction {
    /// Pack plain parts into the bounded wire form
    ///
    /// # Errors
    ///
    /// `TooManyCells` if any list exceeds its bound.
    pub fn pack(
        cell_deps: Vec<CellDep>,
        inputs: Vec<CellInput>,
        outputs: Vec<CellOutput>,
        outputs_data: Vec<Vec<u8>>,
        witnesses: Vec<Vec<u8>>,
    ) -> Result<Self, AssemblyError> {
        let outputs_data = outputs_data
            .into_iter()
            .map(|data| to_list(data, "cell data bytes"))
            .collect::<Result<Vec<_>, _>>()?;
        let witnesses = witnesses
            .into_iter()
            .map(|witness| to_list(witness, "witness bytes"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: TX_VERSION,
            cell_deps: to_list(cell_deps, "cell deps")?,
            inputs: to_list(inputs, "inputs")?,
            outputs: to_list(outputs, "outputs")?,
            outputs_data: to_list(outputs_data, "outputs data")?,
            witnesses: to_list(witnesses, "witnesses")?,
        })
    }

    /// SSZ encoding of the whole transaction
    pub fn to_bytes(&self) -> Result<Vec<u8>, AssemblyError> {
        ssz_rs::serialize(self).map_err(|e| AssemblyError::Serialization(format!("{:?}", e)))
    }

    /// Encoded size in bytes, the basis of the byte fee
    pub fn serialized_size(&self) -> Result<usize, AssemblyError> {
        Ok(self.to_bytes()?.len())
    }

    /// SHA-256 of the encoding
    pub fn hash(&self) -> Result<[u8; 32], AssemblyError> {
        let bytes = self.to_bytes()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        Ok(hash)
    }

    /// Transaction hash as "0x"-prefixed hex
    pub fn hash_hex(&self) -> Result<String, AssemblyError> {
        Ok(format!("0x{}", hex::encode(self.hash()?)))
    }

    /// Outpoints spent by this transaction, in input order
    pub fn input_out_points(&self) -> Vec<OutPoint> {
        self.inputs
            .iter()
            .map(|input| input.previous_output.clone())
            .collect()
    }
}

fn to_list<T: SimpleSerialize, const N: usize>(
    items: Vec<T>,
    what: &'static str,
) -> Result<List<T, N>, AssemblyError> {
    let count = items.len();
    List::<T, N>::try_from(items).map_err(|_| AssemblyError::TooManyCells {
        what,
        count,
        limit: N,
    })
}

// ============================================================================
// Unit Tests
// ============================================================================
