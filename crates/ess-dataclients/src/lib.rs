//! Data clients (spec §4.F): the long-running agents that own one logical
//! connection (direct or via the controller protocol) and one or more
//! processors, and drive it through the reconnect-and-timeout lifecycle in
//! `read_loop`.

pub mod controller_client;
pub mod direct;
pub mod error;
pub mod processor_factory;
pub mod read_loop;
pub mod snmp;
pub mod spectrum;
pub mod thermal;

pub use controller_client::ControllerDataClient;
pub use direct::{DecoderFactory, DirectDeviceClient};
pub use error::DataClientError;
pub use processor_factory::{build_processor, ProcessorFactoryError};
pub use read_loop::{DataClientHandle, DataSource, ReadLoopConfig, ReadLoopDriver};
pub use spectrum::SpectrumAnalyzerClient;
pub use thermal::ThermalScannerClient;
