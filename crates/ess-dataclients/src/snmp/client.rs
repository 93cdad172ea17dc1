//! SNMP data client (§4.F.3): polls a remote SNMP agent and republishes its
//! MIB subtree as a `TelSnmpDevice` telemetry frame.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;

use ess_types::config::SensorType;
use ess_types::{Scalar, SnmpFieldValue, TelSnmpDevice, Topics};

use crate::error::DataClientError;
use crate::read_loop::DataSource;
use crate::snmp::mib::{mib_tree_for, FieldKind, MibField, MibTree, SYSTEM_ROOT_OID, SYS_DESCR_OID};
use crate::snmp::transport::{parse_hex_ascii_float, SnmpWalker};

fn now_tai_unix_seconds() -> f64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_secs_f64()
}

pub struct SnmpDataClient<T: Topics> {
    sensor_name: String,
    sensor_type: SensorType,
    addr: SocketAddr,
    community: String,
    read_timeout: Duration,
    topics: T,
    walker: Option<Box<dyn SnmpWalker>>,
    walker_factory: Box<dyn Fn(SocketAddr, String, Duration) -> Box<dyn SnmpWalker> + Send>,
    mib_tree: MibTree,
    system_description: String,
}

impl<T: Topics> SnmpDataClient<T> {
    pub fn new(
        sensor_name: impl Into<String>,
        sensor_type: SensorType,
        addr: SocketAddr,
        community: impl Into<String>,
        read_timeout: Duration,
        topics: T,
        walker_factory: Box<dyn Fn(SocketAddr, String, Duration) -> Box<dyn SnmpWalker> + Send>,
    ) -> Self {
        let mib_tree = mib_tree_for(sensor_type).expect("SnmpDataClient built for a non-SNMP sensor_type");
        Self {
            sensor_name: sensor_name.into(),
            sensor_type,
            addr,
            community: community.into(),
            read_timeout,
            topics,
            walker: None,
            walker_factory,
            mib_tree,
            system_description: "No system description set.".to_string(),
        }
    }

    fn publish(&self, fields: BTreeMap<String, SnmpFieldValue>) {
        let frame = TelSnmpDevice {
            sensor_name: self.sensor_name.clone(),
            timestamp: now_tai_unix_seconds(),
            system_description: self.system_description.clone(),
            fields,
        };
        match self.sensor_type {
            SensorType::SnmpPdu => self.topics.tel_pdu(frame),
            SensorType::SnmpXups => self.topics.tel_xups(frame),
            SensorType::SnmpSchneiderPm5xxx => self.topics.tel_schneider_pm5xxx(frame),
            _ => unreachable!("constructor only accepts SNMP sensor types"),
        }
    }
}

/// §4.F.3 step 3: converts one field's collected raw string(s) into the
/// value to publish, applying the hex-ASCII-float fallback and the
/// tens-of-Hertz divide.
fn convert_field(field: &MibField, raw: &str, divide_by_ten: bool) -> Scalar {
    match field.kind {
        FieldKind::Int => Scalar::Int(raw.parse::<i64>().unwrap_or(0)),
        FieldKind::Float => {
            let mut value = raw.parse::<f64>().ok().or_else(|| parse_hex_ascii_float(raw)).unwrap_or(f64::NAN);
            if divide_by_ten && value.is_finite() {
                value /= 10.0;
            }
            Scalar::Float(value)
        }
        FieldKind::Str => Scalar::Str(raw.to_string()),
    }
}

fn missing_value(kind: FieldKind) -> Scalar {
    match kind {
        FieldKind::Int => Scalar::Int(0),
        FieldKind::Float => Scalar::Float(f64::NAN),
        FieldKind::Str => Scalar::Str(String::new()),
    }
}

/// Resolves one field against a freshly walked OID->string map (§4.F.3
/// step 3).
fn resolve_field(field: &MibField, results: &BTreeMap<String, String>, divide_by_ten: bool) -> SnmpFieldValue {
    if field.indexed {
        let mut matches: Vec<(&String, &String)> = results.iter().filter(|(oid, _)| oid.starts_with(field.oid)).collect();
        matches.sort_by_key(|(oid, _)| (*oid).clone());
        let values = matches.into_iter().map(|(_, value)| convert_field(field, value, divide_by_ten)).collect();
        SnmpFieldValue::Array(values)
    } else {
        let dot_zero = format!("{}.0", field.oid);
        let dot_one = format!("{}.1", field.oid);
        let raw = results.get(&dot_zero).or_else(|| results.get(&dot_one));
        match raw {
            Some(raw) => SnmpFieldValue::Scalar(convert_field(field, raw, divide_by_ten)),
            None => SnmpFieldValue::Scalar(missing_value(field.kind)),
        }
    }
}

#[async_trait]
impl<T: Topics> DataSource for SnmpDataClient<T> {
    async fn connect(&mut self) -> Result<(), DataClientError> {
        self.walker = Some((self.walker_factory)(self.addr, self.community.clone(), self.read_timeout));
        Ok(())
    }

    async fn setup_reading(&mut self) -> Result<(), DataClientError> {
        let Some(walker) = self.walker.as_ref() else {
            return Err(DataClientError::Protocol("setup_reading called before connect".into()));
        };
        let system_result = walker.walk(SYSTEM_ROOT_OID).await?;
        match system_result.get(&format!("{SYS_DESCR_OID}.0")) {
            Some(descr) => self.system_description = descr.clone(),
            None => tracing::error!(sensor_name = %self.sensor_name, "could not retrieve sysDescr; continuing"),
        }
        Ok(())
    }

    async fn read_data(&mut self) -> Result<(), DataClientError> {
        let Some(walker) = self.walker.as_ref() else {
            return Err(DataClientError::Protocol("read_data called before connect".into()));
        };
        let results = walker.walk(self.mib_tree.root_oid).await?;

        let mut fields = BTreeMap::new();
        for field in self.mib_tree.fields {
            let divide_by_ten = self.mib_tree.frequency_tenths_oids.contains(&field.oid);
            fields.insert(field.name.to_string(), resolve_field(field, &results, divide_by_ten));
        }
        self.publish(fields);
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.walker = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ess_types::*;
    use std::sync::{Arc, Mutex};

    struct MockWalker {
        results: BTreeMap<String, String>,
    }

    #[async_trait]
    impl SnmpWalker for MockWalker {
        async fn walk(&self, _root_oid: &str) -> Result<BTreeMap<String, String>, DataClientError> {
            Ok(self.results.clone())
        }
    }

    #[derive(Default, Clone)]
    struct RecordingTopics {
        xups: Arc<Mutex<Vec<TelSnmpDevice>>>,
    }

    impl Topics for RecordingTopics {
        fn tel_temperature(&self, _item: TelTemperature) {}
        fn tel_relative_humidity(&self, _item: TelRelativeHumidity) {}
        fn tel_dew_point(&self, _item: TelDewPoint) {}
        fn tel_pressure(&self, _item: TelPressure) {}
        fn tel_air_flow(&self, _item: TelAirFlow) {}
        fn tel_air_turbulence(&self, _item: TelAirTurbulence) {}
        fn tel_electric_field_strength(&self, _item: TelElectricFieldStrength) {}
        fn tel_lightning_strike_status(&self, _item: TelLightningStrikeStatus) {}
        fn tel_spectrum_analyzer(&self, _item: TelSpectrumAnalyzer) {}
        fn tel_particulate_matter(&self, _item: TelParticulateMatter) {}
        fn evt_sensor_status(&self, _item: EvtSensorStatus) {}
        fn evt_lightning_strike(&self, _item: EvtLightningStrike) {}
        fn evt_high_electric_field(&self, _item: EvtHighElectricField) {}
        fn evt_precipitation(&self, _item: EvtPrecipitation) {}
        fn tel_pdu(&self, _item: TelSnmpDevice) {}
        fn tel_xups(&self, item: TelSnmpDevice) {
            self.xups.lock().unwrap().push(item);
        }
        fn tel_schneider_pm5xxx(&self, _item: TelSnmpDevice) {}
    }

    #[tokio::test]
    async fn polls_and_publishes_xups_fields_with_frequency_divide_and_hex_fallback() {
        let mut results = BTreeMap::new();
        results.insert("1.3.6.1.4.1.534.1.3.4.1.2.0".to_string(), "0x3232302e30".to_string()); // "220.0"
        results.insert("1.3.6.1.4.1.534.1.4.2.0".to_string(), "600".to_string()); // -> 60.0 Hz
        results.insert("1.3.6.1.4.1.534.1.2.4.0".to_string(), "87".to_string());
        results.insert("1.3.6.1.4.1.534.1.4.5.1.2.1".to_string(), "30".to_string());
        results.insert("1.3.6.1.4.1.534.1.4.5.1.2.2".to_string(), "45".to_string());

        let topics = RecordingTopics::default();
        let mut client = SnmpDataClient::new(
            "ups1",
            SensorType::SnmpXups,
            "127.0.0.1:161".parse().unwrap(),
            "public",
            Duration::from_secs(1),
            topics.clone(),
            Box::new(move |_, _, _| Box::new(MockWalker { results: BTreeMap::new() })),
        );
        // Swap in our fixed-result walker directly to avoid depending on the factory closure capturing `results`.
        client.walker = Some(Box::new(MockWalker { results }));
        client.system_description = "Eaton 9395".to_string();

        client.read_data().await.unwrap();

        let published = topics.xups.lock().unwrap();
        assert_eq!(published.len(), 1);
        let frame = &published[0];
        assert_eq!(frame.system_description, "Eaton 9395");
        match frame.fields.get("inputVoltage").unwrap() {
            SnmpFieldValue::Scalar(Scalar::Float(v)) => assert!((v - 220.0).abs() < 0.01),
            other => panic!("unexpected {other:?}"),
        }
        match frame.fields.get("outputFrequency").unwrap() {
            SnmpFieldValue::Scalar(Scalar::Float(v)) => assert!((v - 60.0).abs() < 0.01),
            other => panic!("unexpected {other:?}"),
        }
        match frame.fields.get("batteryCapacity").unwrap() {
            SnmpFieldValue::Scalar(Scalar::Int(v)) => assert_eq!(*v, 87),
            other => panic!("unexpected {other:?}"),
        }
        match frame.fields.get("outputLoad").unwrap() {
            SnmpFieldValue::Array(values) => assert_eq!(values.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_oid_defaults_per_field_kind() {
        let topics = RecordingTopics::default();
        let mut client = SnmpDataClient::new(
            "ups1",
            SensorType::SnmpXups,
            "127.0.0.1:161".parse().unwrap(),
            "public",
            Duration::from_secs(1),
            topics.clone(),
            Box::new(move |_, _, _| Box::new(MockWalker { results: BTreeMap::new() })),
        );
        client.walker = Some(Box::new(MockWalker { results: BTreeMap::new() }));

        client.read_data().await.unwrap();
        let published = topics.xups.lock().unwrap();
        match published[0].fields.get("inputVoltage").unwrap() {
            SnmpFieldValue::Scalar(Scalar::Float(v)) => assert!(v.is_nan()),
            other => panic!("unexpected {other:?}"),
        }
        match published[0].fields.get("batteryCapacity").unwrap() {
            SnmpFieldValue::Scalar(Scalar::Int(v)) => assert_eq!(*v, 0),
            other => panic!("unexpected {other:?}"),
        }
    }
}
