//! MIB tree tables for the three SNMP device kinds (§4.F.3), grounded on
//! `snmp_data_client.py`'s `mib_tree_holder`/`TelemetryItemName`/
//! `TelemetryItemType` lookups (the original's MIB YAML data itself was not
//! retrieved with the rest of the pack, so the OID values below are this
//! crate's own small representative tree for each device type rather than a
//! transcription of the original's).

use ess_types::config::SensorType;

/// How to interpret a field's SNMP leaves (§4.F.3 step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Str,
}

/// One telemetry field's place in the MIB tree.
#[derive(Debug, Clone, Copy)]
pub struct MibField {
    /// Field name as it appears on the `TelSnmpDevice.fields` map.
    pub name: &'static str,
    /// Base OID for this field, relative to the device-type root.
    pub oid: &'static str,
    pub kind: FieldKind,
    /// True if this field's parent is an indexed table — collect every
    /// leaf whose OID is prefixed by `oid` into an array, instead of
    /// reading a single `.0`/`.1` suffix.
    pub indexed: bool,
}

pub struct MibTree {
    pub root_oid: &'static str,
    pub fields: &'static [MibField],
    /// OIDs (relative, matching `MibField::oid`) whose parsed value is in
    /// tens of Hertz and must be divided by 10 (§11 item 4).
    pub frequency_tenths_oids: &'static [&'static str],
}

pub const SYSTEM_ROOT_OID: &str = "1.3.6.1.2.1.1";
pub const SYS_DESCR_OID: &str = "1.3.6.1.2.1.1.1";

const PDU_FIELDS: &[MibField] = &[
    MibField { name: "outputVoltage", oid: "1.3.6.1.4.1.318.1.1.12.3.3.1.1.3", kind: FieldKind::Float, indexed: false },
    MibField { name: "outputCurrent", oid: "1.3.6.1.4.1.318.1.1.12.3.3.1.1.4", kind: FieldKind::Float, indexed: false },
    MibField { name: "outputPower", oid: "1.3.6.1.4.1.318.1.1.12.3.3.1.1.5", kind: FieldKind::Float, indexed: false },
    MibField { name: "outletStatus", oid: "1.3.6.1.4.1.318.1.1.12.3.5.1.1.4", kind: FieldKind::Int, indexed: true },
];

const XUPS_FIELDS: &[MibField] = &[
    MibField { name: "inputVoltage", oid: "1.3.6.1.4.1.534.1.3.4.1.2", kind: FieldKind::Float, indexed: false },
    MibField { name: "outputVoltage", oid: "1.3.6.1.4.1.534.1.4.4.1.2", kind: FieldKind::Float, indexed: false },
    MibField { name: "outputFrequency", oid: "1.3.6.1.4.1.534.1.4.2", kind: FieldKind::Float, indexed: false },
    MibField { name: "batteryCapacity", oid: "1.3.6.1.4.1.534.1.2.4", kind: FieldKind::Int, indexed: false },
    MibField { name: "outputLoad", oid: "1.3.6.1.4.1.534.1.4.5.1.2", kind: FieldKind::Int, indexed: true },
];

const SCHNEIDER_PM5XXX_FIELDS: &[MibField] = &[
    MibField { name: "voltage", oid: "1.3.6.1.4.1.3833.1.1.3.1.4", kind: FieldKind::Float, indexed: false },
    MibField { name: "current", oid: "1.3.6.1.4.1.3833.1.1.3.1.5", kind: FieldKind::Float, indexed: false },
    MibField { name: "frequency", oid: "1.3.6.1.4.1.3833.1.1.3.1.6", kind: FieldKind::Float, indexed: false },
    MibField { name: "activePower", oid: "1.3.6.1.4.1.3833.1.1.3.1.7", kind: FieldKind::Float, indexed: false },
    MibField { name: "phaseVoltage", oid: "1.3.6.1.4.1.3833.1.1.3.1.8", kind: FieldKind::Float, indexed: true },
];

pub fn mib_tree_for(sensor_type: SensorType) -> Option<MibTree> {
    match sensor_type {
        SensorType::SnmpPdu => Some(MibTree {
            root_oid: "1.3.6.1.4.1.318.1.1.12",
            fields: PDU_FIELDS,
            frequency_tenths_oids: &[],
        }),
        SensorType::SnmpXups => Some(MibTree {
            root_oid: "1.3.6.1.4.1.534.1",
            fields: XUPS_FIELDS,
            frequency_tenths_oids: &["1.3.6.1.4.1.534.1.4.2"],
        }),
        SensorType::SnmpSchneiderPm5xxx => Some(MibTree {
            root_oid: "1.3.6.1.4.1.3833.1.1.3",
            fields: SCHNEIDER_PM5XXX_FIELDS,
            frequency_tenths_oids: &["1.3.6.1.4.1.3833.1.1.3.1.6"],
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_snmp_sensor_type_has_a_mib_tree() {
        assert!(mib_tree_for(SensorType::SnmpPdu).is_some());
        assert!(mib_tree_for(SensorType::SnmpXups).is_some());
        assert!(mib_tree_for(SensorType::SnmpSchneiderPm5xxx).is_some());
        assert!(mib_tree_for(SensorType::Temperature).is_none());
    }
}
