//! Device/Object tree data structures
//!
//! The in-memory snapshot of the gateway's BACnet device tree. The tree is
//! exclusively owned by the synchronization coordinator: a full poll replaces
//! it wholesale and a push update swaps whole objects. Listeners only ever
//! see shared read-only views.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// BACnet object type, as named on the wire (camelCase)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectType {
    AnalogInput,
    AnalogOutput,
    AnalogValue,
    BinaryInput,
    BinaryOutput,
    BinaryValue,
    MultiStateInput,
    MultiStateOutput,
    MultiStateValue,
    Device,
    /// Object types the mirror does not interpret (accumulator, schedule, ...)
    Other(String),
}

impl ObjectType {
    /// Wire name of this object type
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::AnalogInput => "analogInput",
            ObjectType::AnalogOutput => "analogOutput",
            ObjectType::AnalogValue => "analogValue",
            ObjectType::BinaryInput => "binaryInput",
            ObjectType::BinaryOutput => "binaryOutput",
            ObjectType::BinaryValue => "binaryValue",
            ObjectType::MultiStateInput => "multiStateInput",
            ObjectType::MultiStateOutput => "multiStateOutput",
            ObjectType::MultiStateValue => "multiStateValue",
            ObjectType::Device => "device",
            ObjectType::Other(s) => s.as_str(),
        }
    }

    /// True for binaryInput/binaryOutput/binaryValue
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            ObjectType::BinaryInput | ObjectType::BinaryOutput | ObjectType::BinaryValue
        )
    }

    /// True for analogInput/analogOutput/analogValue
    pub fn is_analog(&self) -> bool {
        matches!(
            self,
            ObjectType::AnalogInput | ObjectType::AnalogOutput | ObjectType::AnalogValue
        )
    }

    /// True for multiStateInput/multiStateOutput/multiStateValue
    pub fn is_multi_state(&self) -> bool {
        matches!(
            self,
            ObjectType::MultiStateInput
                | ObjectType::MultiStateOutput
                | ObjectType::MultiStateValue
        )
    }
}

impl From<String> for ObjectType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "analogInput" => ObjectType::AnalogInput,
            "analogOutput" => ObjectType::AnalogOutput,
            "analogValue" => ObjectType::AnalogValue,
            "binaryInput" => ObjectType::BinaryInput,
            "binaryOutput" => ObjectType::BinaryOutput,
            "binaryValue" => ObjectType::BinaryValue,
            "multiStateInput" => ObjectType::MultiStateInput,
            "multiStateOutput" => ObjectType::MultiStateOutput,
            "multiStateValue" => ObjectType::MultiStateValue,
            "device" => ObjectType::Device,
            _ => ObjectType::Other(s),
        }
    }
}

impl From<ObjectType> for String {
    fn from(t: ObjectType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BACnet objectIdentifier: object type plus instance number.
///
/// Serialized as the wire tuple `["analogInput", 3]`, displayed as
/// `analogInput:3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, u32)", into = "(String, u32)")]
pub struct ObjectId {
    pub object_type: ObjectType,
    pub instance: u32,
}

impl ObjectId {
    pub fn new(object_type: ObjectType, instance: u32) -> Self {
        Self {
            object_type,
            instance,
        }
    }
}

impl From<(String, u32)> for ObjectId {
    fn from((object_type, instance): (String, u32)) -> Self {
        Self {
            object_type: ObjectType::from(object_type),
            instance,
        }
    }
}

impl From<ObjectId> for (String, u32) {
    fn from(id: ObjectId) -> Self {
        (id.object_type.as_str().to_string(), id.instance)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_type, self.instance)
    }
}

/// Decoded status flags (always a 4-bit vector on the wire)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusFlags {
    pub in_alarm: bool,
    pub fault: bool,
    pub overridden: bool,
    pub out_of_service: bool,
}

impl StatusFlags {
    /// Positional decode, fixed order: inAlarm, fault, overridden, outOfService
    pub fn from_bits(bits: &[u8]) -> Self {
        Self {
            in_alarm: bits.first().copied().unwrap_or(0) != 0,
            fault: bits.get(1).copied().unwrap_or(0) != 0,
            overridden: bits.get(2).copied().unwrap_or(0) != 0,
            out_of_service: bits.get(3).copied().unwrap_or(0) != 0,
        }
    }
}

/// Present value of an object, resolved from the object's declared type at
/// tree-mutation time rather than re-sniffed on every read. A raw wire
/// value alone is ambiguous (a multi-state `3` looks numeric), so this type
/// has no standalone `Deserialize`; resolution happens in [`ObjectEntry`]'s
/// deserializer via [`PresentValue::from_wire`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PresentValue {
    /// Enumerated binary state (binaryInput/binaryOutput/binaryValue)
    Binary(bool),
    /// Numeric reading (analogInput/analogOutput/analogValue)
    Numeric(f64),
    /// 1-indexed multi-state value (multiStateInput/Output/Value)
    MultiState(i64),
    /// Raw value the declared type could not explain. Data-quality
    /// condition, not an error; presented as-is.
    Unknown(serde_json::Value),
}

impl PresentValue {
    /// Resolve a raw wire value against the object's declared type.
    pub fn from_wire(object_type: &ObjectType, raw: &serde_json::Value) -> Self {
        if object_type.is_binary() {
            if let Some(active) = crate::normalize::decode_binary_present_value(raw) {
                return PresentValue::Binary(active);
            }
        } else if object_type.is_analog() {
            if let Some(n) = raw.as_f64() {
                return PresentValue::Numeric(n);
            }
        } else if object_type.is_multi_state() {
            if let Some(n) = raw.as_i64() {
                return PresentValue::MultiState(n);
            }
        } else if let Some(n) = raw.as_f64() {
            // Uninterpreted object types still get a usable numeric reading
            return PresentValue::Numeric(n);
        }
        PresentValue::Unknown(raw.clone())
    }

    /// Numeric view, if this value is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PresentValue::Numeric(n) => Some(*n),
            PresentValue::MultiState(n) => Some(*n as f64),
            _ => None,
        }
    }
}

/// A single BACnet object (point) within a device
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEntry {
    pub object_identifier: ObjectId,
    pub object_name: String,
    pub description: String,
    pub present_value: PresentValue,
    pub status_flags: StatusFlags,
    pub event_state: String,
    pub reliability: Option<String>,
    pub out_of_service: bool,
    /// Protocol engineering-unit identifier, e.g. "degreesCelsius"
    pub units: Option<String>,
    /// Smallest meaningful value step, used for rounding precision
    pub resolution: Option<f64>,
    pub cov_increment: Option<f64>,
    /// Display strings for multi-state objects, 1-indexed on the wire
    pub state_text: Option<Vec<String>>,
    /// Device metadata, present only on the device object itself
    pub vendor_name: Option<String>,
    pub model_name: Option<String>,
}

/// Wire form of [`ObjectEntry`]: `presentValue` arrives as raw JSON and is
/// only meaningful next to `objectIdentifier`, so deserialization goes
/// through this intermediate and resolves the value against the declared
/// object type exactly once.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectEntryWire {
    object_identifier: ObjectId,
    #[serde(default)]
    object_name: String,
    #[serde(default)]
    description: String,
    present_value: serde_json::Value,
    /// Positional bit vector on the wire: inAlarm, fault, overridden,
    /// outOfService
    #[serde(default)]
    status_flags: Vec<u8>,
    #[serde(default)]
    event_state: String,
    #[serde(default)]
    reliability: Option<String>,
    #[serde(default)]
    out_of_service: bool,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    resolution: Option<f64>,
    #[serde(default)]
    cov_increment: Option<f64>,
    #[serde(default)]
    state_text: Option<Vec<String>>,
    #[serde(default)]
    vendor_name: Option<String>,
    #[serde(default)]
    model_name: Option<String>,
}

impl<'de> Deserialize<'de> for ObjectEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = ObjectEntryWire::deserialize(deserializer)?;
        let present_value =
            PresentValue::from_wire(&wire.object_identifier.object_type, &wire.present_value);
        Ok(ObjectEntry {
            object_identifier: wire.object_identifier,
            object_name: wire.object_name,
            description: wire.description,
            present_value,
            status_flags: StatusFlags::from_bits(&wire.status_flags),
            event_state: wire.event_state,
            reliability: wire.reliability,
            out_of_service: wire.out_of_service,
            units: wire.units,
            resolution: wire.resolution,
            cov_increment: wire.cov_increment,
            state_text: wire.state_text,
            vendor_name: wire.vendor_name,
            model_name: wire.model_name,
        })
    }
}

/// A remote controller/node exposing one or more objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub object_name: String,
    #[serde(default)]
    pub objects: HashMap<String, ObjectEntry>,
}

impl Device {
    pub fn object(&self, object_id: &str) -> Option<&ObjectEntry> {
        self.objects.get(object_id)
    }
}

/// A whole-object push update from the gateway. Applied by swapping the
/// addressed object; ignored when the device or object key is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectUpdate {
    pub device_id: String,
    pub object_id: String,
    pub object: ObjectEntry,
}

/// The mirrored device tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceTree {
    #[serde(default)]
    pub devices: HashMap<String, Device>,
}

impl DeviceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(&self, device_id: &str) -> Option<&Device> {
        self.devices.get(device_id)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Merge a poll snapshot into this tree. Device metadata and polled
    /// objects are replaced wholesale; devices or objects absent from the
    /// snapshot are retained, so the tree never shrinks implicitly.
    pub fn apply_snapshot(&mut self, snapshot: DeviceTree) {
        for (device_id, incoming) in snapshot.devices {
            match self.devices.entry(device_id) {
                std::collections::hash_map::Entry::Occupied(mut entry) => {
                    let device = entry.get_mut();
                    device.vendor_name = incoming.vendor_name;
                    device.model_name = incoming.model_name;
                    device.object_name = incoming.object_name;
                    device.objects.extend(incoming.objects);
                }
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(incoming);
                }
            }
        }
    }

    /// Apply a push update by swapping the addressed object. Returns false
    /// when the containing device/object key is absent and the update was
    /// dropped.
    pub fn apply_update(&mut self, update: ObjectUpdate) -> bool {
        match self.devices.get_mut(&update.device_id) {
            Some(device) if device.objects.contains_key(&update.object_id) => {
                device.objects.insert(update.object_id, update.object);
                true
            }
            _ => {
                tracing::debug!(
                    device_id = %update.device_id,
                    object_id = %update.object_id,
                    "Dropping push update for unknown device/object"
                );
                false
            }
        }
    }

    /// Explicit host-driven device removal. The only way a device leaves
    /// the tree within a session's lifetime.
    pub fn remove_device(&mut self, device_id: &str) -> Option<Device> {
        self.devices.remove(device_id)
    }
}

/// Cardinality record for the topology watchdog: device count plus the
/// per-device object count, captured once per session and refreshed after
/// every reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub device_count: usize,
    pub objects_per_device: HashMap<String, usize>,
}

impl TreeSnapshot {
    /// Capture the current cardinality of a tree
    pub fn capture(tree: &DeviceTree) -> Self {
        Self {
            device_count: tree.devices.len(),
            objects_per_device: tree
                .devices
                .iter()
                .map(|(id, device)| (id.clone(), device.objects.len()))
                .collect(),
        }
    }

    /// True when the tree has grown since this snapshot was taken, either
    /// in device count or in any known device's object count. The push
    /// channel never announces new devices/objects, so growth is the signal
    /// for a full session reload.
    pub fn grew_since(&self, tree: &DeviceTree) -> bool {
        if tree.devices.len() > self.device_count {
            return true;
        }
        tree.devices.iter().any(|(id, device)| {
            device.objects.len() > self.objects_per_device.get(id).copied().unwrap_or(0)
        })
    }
}
