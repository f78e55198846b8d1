use serde::{Deserialize, Serialize};

use super::bus::GameBoyBus;
use super::cartridge::CartridgeHeader;
use super::GameBoy;
use crate::cpu::Cpu;
use crate::error::SnapshotError;

const MAGIC: &[u8; 4] = b"DMGS";
pub(crate) const SNAPSHOT_VERSION: u32 = 1;
const PREAMBLE_LEN: usize = 8;

/// Serialized session state: the `DMGS` magic, a little-endian format
/// version, then the bincode-encoded machine.
///
/// ROM bytes and host configuration are not included; a snapshot can only
/// be restored into a session running the same cartridge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    bytes: Vec<u8>,
}

impl Snapshot {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    fn payload(&self) -> Result<&[u8], SnapshotError> {
        if self.bytes.len() < PREAMBLE_LEN || &self.bytes[..4] != MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&self.bytes[4..PREAMBLE_LEN]);
        let version = u32::from_le_bytes(version);
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(&self.bytes[PREAMBLE_LEN..])
    }
}

#[derive(Serialize)]
struct SessionStateRef<'a> {
    header: &'a CartridgeHeader,
    cpu: &'a Cpu,
    bus: &'a GameBoyBus,
    cycles: u64,
}

#[derive(Deserialize)]
struct SessionState {
    header: CartridgeHeader,
    cpu: Cpu,
    bus: GameBoyBus,
    cycles: u64,
}

impl GameBoy {
    /// Capture the whole machine.
    pub fn snapshot(&self) -> Result<Snapshot, SnapshotError> {
        let state = SessionStateRef {
            header: self.bus.cartridge.header(),
            cpu: &self.cpu,
            bus: &self.bus,
            cycles: self.cycles,
        };
        let mut bytes = Vec::with_capacity(64 * 1024);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        bincode::serialize_into(&mut bytes, &state)?;
        Ok(Snapshot { bytes })
    }

    /// Replace the machine state with `snapshot`. On error the session is
    /// left untouched.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let decoded = snapshot.payload().and_then(|payload| {
            bincode::deserialize::<SessionState>(payload).map_err(SnapshotError::from)
        });
        let state = match decoded {
            Ok(state) => state,
            Err(err) => {
                log::warn!("GB snapshot rejected: {err}");
                return Err(err);
            }
        };

        let loaded = self.bus.cartridge.header();
        if state.header != *loaded {
            let err = SnapshotError::CartridgeMismatch {
                snapshot: state.header.title,
                loaded: loaded.title.clone(),
            };
            log::warn!("GB snapshot rejected: {err}");
            return Err(err);
        }

        let mut bus = state.bus;
        bus.cartridge.attach_rom(&mut self.bus.cartridge);
        self.bus = bus;
        self.cpu = state.cpu;
        self.cycles = state.cycles;
        self.fault = None;
        Ok(())
    }
}
