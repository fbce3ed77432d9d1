use naia_serde::{BitReader, BitWrite, FileBitWriter, Serde, SerdeErr};

use crate::{SeqNum, SetDelta, SetError, SetIdentity, UpdateState};

use super::set_delta::{AddRange, RemoveRange};

fn write_index(value: usize, writer: &mut dyn BitWrite) {
    (value as u64).ser(writer);
}

fn read_index(reader: &mut BitReader) -> Result<usize, SerdeErr> {
    let value = u64::de(reader)?;
    usize::try_from(value).map_err(|_| SerdeErr)
}

impl Serde for RemoveRange {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.start_seq_num.ser(writer);
        self.last_seq_num.ser(writer);
        write_index(self.start_index, writer);
        write_index(self.count, writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            start_seq_num: SeqNum::de(reader)?,
            last_seq_num: SeqNum::de(reader)?,
            start_index: read_index(reader)?,
            count: read_index(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.start_seq_num.bit_length()
            + self.last_seq_num.bit_length()
            + (self.start_index as u64).bit_length()
            + (self.count as u64).bit_length()
    }
}

// WireAddRange
/// An add range as it travels: serialized items only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireAddRange {
    pub start_seq_num: SeqNum,
    pub start_index: usize,
    pub serialized_items: Vec<String>,
}

impl Serde for WireAddRange {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.start_seq_num.ser(writer);
        write_index(self.start_index, writer);
        self.serialized_items.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            start_seq_num: SeqNum::de(reader)?,
            start_index: read_index(reader)?,
            serialized_items: Vec::<String>::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.start_seq_num.bit_length()
            + (self.start_index as u64).bit_length()
            + self.serialized_items.bit_length()
    }
}

// WireDelta
/// Transport form of a [`SetDelta`], independent of the item type.
///
/// Encoded with the same bit level serde used for packets. A consumer turns it back
/// into a `SetDelta<T>` with [`WireDelta::into_delta`]; the items are then
/// deserialized by the receiving set's codec when the delta is applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireDelta {
    pub name: String,
    pub uuid: String,
    pub source_update_state: UpdateState,
    pub clear_at_start: bool,
    pub remove_ranges: Vec<RemoveRange>,
    pub add_ranges: Vec<WireAddRange>,
}

impl Serde for WireDelta {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.name.ser(writer);
        self.uuid.ser(writer);
        self.source_update_state.to_u8().ser(writer);
        self.clear_at_start.ser(writer);
        self.remove_ranges.ser(writer);
        self.add_ranges.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let name = String::de(reader)?;
        let uuid = String::de(reader)?;
        let source_update_state = UpdateState::from_u8(u8::de(reader)?).ok_or(SerdeErr)?;
        let clear_at_start = bool::de(reader)?;
        let remove_ranges = Vec::<RemoveRange>::de(reader)?;
        let add_ranges = Vec::<WireAddRange>::de(reader)?;
        Ok(Self {
            name,
            uuid,
            source_update_state,
            clear_at_start,
            remove_ranges,
            add_ranges,
        })
    }

    fn bit_length(&self) -> u32 {
        self.name.bit_length()
            + self.uuid.bit_length()
            + self.source_update_state.to_u8().bit_length()
            + self.clear_at_start.bit_length()
            + self.remove_ranges.bit_length()
            + self.add_ranges.bit_length()
    }
}

impl WireDelta {
    pub fn identity(&self) -> SetIdentity {
        SetIdentity::new(self.name.clone(), self.uuid.clone())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = FileBitWriter::new();
        self.ser(&mut writer);
        writer.to_bytes().to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SetError> {
        let mut reader = BitReader::new(bytes);
        Self::de(&mut reader).map_err(|_| SetError::WireDecode {
            context: "malformed or truncated delta",
        })
    }

    /// Rebuilds a delta carrying serialized items only.
    pub fn into_delta<T>(self) -> SetDelta<T> {
        let identity = SetIdentity::new(self.name, self.uuid);
        let mut delta = SetDelta::new(identity, self.source_update_state);
        delta.clear_at_start = self.clear_at_start;
        delta.remove_ranges = self.remove_ranges;
        delta.add_ranges = self
            .add_ranges
            .into_iter()
            .map(|range| {
                AddRange::with_serialized_items(
                    range.start_seq_num,
                    range.start_index,
                    range.serialized_items,
                )
            })
            .collect();
        delta
    }
}
