//! A device controller that lives entirely in memory.
//!
//! The host side is a script of [HostEvent]s consumed by [UDCAdapter::run]. It is what the
//! hosted build of the gadget drivers runs against, and what their tests drive.

use std::collections::{BTreeMap, VecDeque};

use common::Timeout;

use crate::usb::{EndpDirection, EndpointDescriptor, ReqDirection, Setup, SetupReq, UsbSpeed};
use crate::{
    DeviceObject, EndpointQueue, IoInfo, IoRequest, Result, UDCAdapter, UDCHandler, UdcError,
    XferInfo,
};

/// Controller operations, for fault injection and tracing.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Stage {
    InitController,
    Bind,
    Connect,
    Run,
    QueueTx,
    QueueRx,
}

#[derive(Clone, Debug)]
pub enum HostEvent {
    /// A control transfer on endpoint zero, as the setup stage bytes seen on the wire.
    Control(Vec<u8>),
    /// Bulk data the host wants to send. It is held back until the device queues a receive.
    Out(Vec<u8>),
    /// The cable is pulled.
    Detach,
}

impl HostEvent {
    pub fn control(setup: Setup) -> Self {
        Self::Control(setup.to_bytes().to_vec())
    }
}

pub struct SimulatedUdc {
    speed: UsbSpeed,
    initialized: bool,
    device: Option<DeviceObject>,
    connected: bool,
    address: u16,
    configuration: Option<u8>,
    script: VecDeque<HostEvent>,
    /// One outstanding request per direction, as on the real controllers.
    rx: Option<IoRequest>,
    tx: Option<IoRequest>,
    faults: BTreeMap<Stage, UdcError>,
    trace: Vec<Stage>,
    bulk_in: Vec<Vec<u8>>,
    control_in: Vec<Vec<u8>>,
    stalled: Vec<Setup>,
}

impl Default for SimulatedUdc {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedUdc {
    pub fn new() -> Self {
        Self {
            speed: UsbSpeed::High,
            initialized: false,
            device: None,
            connected: false,
            address: 0,
            configuration: None,
            script: VecDeque::new(),
            rx: None,
            tx: None,
            faults: BTreeMap::new(),
            trace: Vec::new(),
            bulk_in: Vec::new(),
            control_in: Vec::new(),
            stalled: Vec::new(),
        }
    }

    pub fn with_speed(mut self, speed: UsbSpeed) -> Self {
        self.speed = speed;
        self
    }

    /// Makes `stage` fail with `err` every time it is entered.
    pub fn fail_at(mut self, stage: Stage, err: UdcError) -> Self {
        self.faults.insert(stage, err);
        self
    }

    pub fn push_host(&mut self, event: HostEvent) {
        self.script.push_back(event);
    }

    /// Queues the control transfers a host issues when it enumerates a device and selects
    /// `configuration`.
    pub fn push_enumeration(&mut self, configuration: u8) {
        use crate::usb::DescriptorKind;

        for setup in [
            Setup::get_descriptor(DescriptorKind::Device, 0, 0, 64),
            Setup::set_address(1),
            Setup::get_descriptor(DescriptorKind::Device, 0, 0, 18),
            Setup::get_descriptor(DescriptorKind::Configuration, 0, 0, 9),
            Setup::get_descriptor(DescriptorKind::Configuration, 0, 0, 0xFF),
            Setup::get_descriptor(DescriptorKind::String, 0, 0, 0xFF),
            Setup::set_configuration(configuration),
        ] {
            self.push_host(HostEvent::control(setup));
        }
    }

    pub fn trace(&self) -> &[Stage] {
        &self.trace
    }

    pub fn bound_device(&self) -> Option<&DeviceObject> {
        self.device.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn configuration(&self) -> Option<u8> {
        self.configuration
    }

    /// Payloads of completed bulk IN transfers, in completion order.
    pub fn bulk_in(&self) -> &[Vec<u8>] {
        &self.bulk_in
    }

    /// Data stages returned for device-to-host control requests.
    pub fn control_in(&self) -> &[Vec<u8>] {
        &self.control_in
    }

    /// Control requests that were answered with a STALL.
    pub fn stalled(&self) -> &[Setup] {
        &self.stalled
    }

    pub fn pending_rx(&self) -> impl Iterator<Item = usize> + '_ {
        self.rx.iter().map(|req| req.length)
    }

    fn enter(&mut self, stage: Stage) -> Result<()> {
        self.trace.push(stage);
        match self.faults.get(&stage) {
            Some(err) => Err(*err),
            None => Ok(()),
        }
    }

    fn configured_endpoint(
        &self,
        endpoint: &EndpointDescriptor,
        direction: EndpDirection,
    ) -> Result<EndpointDescriptor> {
        if self.configuration.is_none() {
            return Err(UdcError::NotReady);
        }
        let device = self.device.as_ref().ok_or(UdcError::NotReady)?;
        let ep = *device
            .endpoint(endpoint.address)
            .ok_or(UdcError::NotFound)?;
        if ep.direction() != direction {
            return Err(UdcError::InvalidParameter);
        }
        Ok(ep)
    }

    /// Drops whatever is queued on the bulk endpoints, as a configuration change does.
    fn cancel_transfers(&mut self) {
        if let Some(req) = self.rx.take() {
            log::debug!("udc-sim: cancel Rx of {} bytes", req.length);
        }
        if let Some(req) = self.tx.take() {
            log::debug!("udc-sim: cancel Tx of {} bytes", req.length);
        }
    }

    fn stall(&mut self, setup: Setup) {
        log::debug!("udc-sim: stall request {:#04x}", setup.request);
        self.stalled.push(setup);
    }

    fn control(&mut self, setup: Setup, handler: &mut dyn UDCHandler) {
        let length = usize::from({ setup.length });

        match setup.standard_request() {
            Some(SetupReq::GetDescriptor) => {
                let (kind, index) = setup.descriptor_kind_and_index();
                match self
                    .device
                    .as_ref()
                    .and_then(|device| device.get_descriptor(kind, index))
                {
                    Some(mut data) => {
                        data.truncate(length);
                        self.control_in.push(data);
                    }
                    None => self.stall(setup),
                }
            }
            Some(SetupReq::SetAddress) => self.address = setup.value,
            Some(SetupReq::GetConfiguration) => {
                self.control_in.push(vec![self.configuration.unwrap_or(0)]);
            }
            Some(SetupReq::SetConfiguration) => {
                let value = setup.value as u8;
                self.cancel_transfers();
                if value == 0 {
                    self.configuration = None;
                    return;
                }
                // Endpoints are live by the time the gadget hears about it, so that it can
                // queue its first transfer from the callback.
                let previous = self.configuration.replace(value);
                if let Err(err) = handler.on_config(self, value) {
                    log::warn!("udc-sim: configuration {} rejected: {}", value, err);
                    self.configuration = previous;
                    self.stall(setup);
                }
            }
            _ => {
                let mut io = IoInfo {
                    buffer: vec![0; length],
                    length,
                };
                match handler.on_setup(self, &setup, &mut io) {
                    Ok(()) => {
                        if setup.direction() == ReqDirection::DeviceToHost {
                            io.buffer.truncate(io.length.min(length));
                            self.control_in.push(io.buffer);
                        }
                    }
                    Err(_) => self.stall(setup),
                }
            }
        }
    }

    fn complete_tx(&mut self, req: IoRequest, handler: &mut dyn UDCHandler) {
        self.bulk_in.push(req.buffer[..req.length].to_vec());
        let xfer = XferInfo {
            endpoint_address: req.endpoint.address,
            direction: EndpDirection::In,
            buffer: req.buffer,
            length: req.length,
        };
        if let Err(err) = handler.on_data(self, xfer) {
            log::warn!("udc-sim: tx completion handler failed: {}", err);
        }
    }

    fn complete_rx(&mut self, mut req: IoRequest, data: Vec<u8>, handler: &mut dyn UDCHandler) {
        let n = data.len().min(req.length);
        req.buffer[..n].copy_from_slice(&data[..n]);
        if n < data.len() {
            self.script.push_front(HostEvent::Out(data[n..].to_vec()));
        }
        let xfer = XferInfo {
            endpoint_address: req.endpoint.address,
            direction: EndpDirection::Out,
            buffer: req.buffer,
            length: n,
        };
        if let Err(err) = handler.on_data(self, xfer) {
            log::warn!("udc-sim: rx completion handler failed: {}", err);
        }
    }
}

impl EndpointQueue for SimulatedUdc {
    fn queue_tx(&mut self, req: IoRequest) -> Result<()> {
        self.enter(Stage::QueueTx)?;
        self.configured_endpoint(&req.endpoint, EndpDirection::In)?;
        if req.length > req.buffer.len() {
            return Err(UdcError::InvalidParameter);
        }
        if self.tx.is_some() {
            return Err(UdcError::NotReady);
        }
        self.tx = Some(req);
        Ok(())
    }

    fn queue_rx(&mut self, req: IoRequest) -> Result<()> {
        self.enter(Stage::QueueRx)?;
        let ep = self.configured_endpoint(&req.endpoint, EndpDirection::Out)?;
        let max_packet_size = usize::from(ep.max_packet_size());
        if req.length > req.buffer.len()
            || max_packet_size == 0
            || req.length % max_packet_size != 0
        {
            return Err(UdcError::InvalidParameter);
        }
        if self.rx.is_some() {
            return Err(UdcError::NotReady);
        }
        self.rx = Some(req);
        Ok(())
    }
}

impl UDCAdapter for SimulatedUdc {
    fn speed(&self) -> UsbSpeed {
        self.speed
    }

    fn init_controller(&mut self) -> Result<()> {
        self.enter(Stage::InitController)?;
        self.initialized = true;
        Ok(())
    }

    fn bind(&mut self, device: &DeviceObject) -> Result<()> {
        self.enter(Stage::Bind)?;
        if !self.initialized {
            return Err(UdcError::NotReady);
        }
        self.device = Some(device.clone());
        Ok(())
    }

    fn connect(&mut self) -> Result<()> {
        self.enter(Stage::Connect)?;
        if self.device.is_none() {
            return Err(UdcError::NotReady);
        }
        self.connected = true;
        Ok(())
    }

    fn run(&mut self, timeout_us: u64, handler: &mut dyn UDCHandler) -> Result<()> {
        self.enter(Stage::Run)?;
        if !self.connected {
            return Err(UdcError::NotReady);
        }

        let timeout = Timeout::from_micros(timeout_us);
        while timeout.run().is_ok() {
            if let Some(req) = self.tx.take() {
                self.complete_tx(req, handler);
                continue;
            }

            match self.script.pop_front() {
                Some(HostEvent::Control(raw)) => match Setup::parse(&raw) {
                    Some(setup) => self.control(setup, handler),
                    // Short setup packets never reach the gadget.
                    None => log::warn!("udc-sim: dropping {} byte setup packet", raw.len()),
                },
                Some(HostEvent::Out(data)) => match self.rx.take() {
                    Some(req) => self.complete_rx(req, data, handler),
                    None => {
                        // The host keeps NAKing and nothing else can make progress.
                        log::debug!("udc-sim: {} bytes pending with no receive queued", data.len());
                        self.script.push_front(HostEvent::Out(data));
                        break;
                    }
                },
                Some(HostEvent::Detach) => {
                    self.cancel_transfers();
                    self.configuration = None;
                    self.connected = false;
                    break;
                }
                None => break,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usb::{
        ConfigAttributes, ConfigDescriptor, DeviceDescriptor, EndpointTy, InterfaceDescriptor,
        StringDescriptor, LANG_EN_US,
    };
    use crate::{ConfigObject, EndpointObject, InterfaceObject};

    const EP_IN: u8 = 0x81;
    const EP_OUT: u8 = 0x02;

    fn device() -> DeviceObject {
        let ep_in = EndpointDescriptor::new(1, EndpDirection::In, EndpointTy::Bulk, 64);
        let ep_out = EndpointDescriptor::new(2, EndpDirection::Out, EndpointTy::Bulk, 64);
        let mut interface = InterfaceDescriptor::new(0, 0xFF, 0, 0);
        interface.endpoints = 2;
        let mut config = ConfigObject {
            desc: ConfigDescriptor::new(1, ConfigAttributes::empty(), 0),
            interfaces: vec![InterfaceObject {
                desc: interface,
                endpoints: [ep_in, ep_out]
                    .into_iter()
                    .map(|desc| EndpointObject {
                        desc,
                        companion: None,
                    })
                    .collect(),
            }],
        };
        config.desc.interfaces = 1;
        config.desc.total_length = config.total_length();
        let mut device = DeviceDescriptor::new(0x0200, 64, 0x1234, 0x5678, 0x0100);
        device.configurations = 1;
        DeviceObject {
            device,
            strings: vec![StringDescriptor::languages(&[LANG_EN_US])],
            configs: vec![config],
        }
    }

    #[derive(Default)]
    struct Echo {
        configs: Vec<u8>,
        setups: usize,
        received: Vec<Vec<u8>>,
        sent: usize,
    }

    impl Echo {
        fn rx(&self, udc: &mut dyn EndpointQueue) -> Result<()> {
            udc.queue_rx(IoRequest {
                endpoint: EndpointDescriptor::new(2, EndpDirection::Out, EndpointTy::Bulk, 64),
                buffer: vec![0; 64],
                length: 64,
            })
        }
    }

    impl UDCHandler for Echo {
        fn on_setup(&mut self, _: &mut dyn EndpointQueue, _: &Setup, _: &mut IoInfo) -> Result<()> {
            self.setups += 1;
            Err(UdcError::Unsupported)
        }

        fn on_config(&mut self, udc: &mut dyn EndpointQueue, value: u8) -> Result<()> {
            self.configs.push(value);
            if value != 1 {
                return Err(UdcError::InvalidParameter);
            }
            self.rx(udc)
        }

        fn on_data(&mut self, udc: &mut dyn EndpointQueue, xfer: XferInfo) -> Result<()> {
            match xfer.direction {
                EndpDirection::Out => {
                    let data = xfer.buffer[..xfer.length].to_vec();
                    self.received.push(data.clone());
                    udc.queue_tx(IoRequest {
                        endpoint: EndpointDescriptor::new(1, EndpDirection::In, EndpointTy::Bulk, 64),
                        length: data.len(),
                        buffer: data,
                    })
                }
                EndpDirection::In => {
                    self.sent += 1;
                    self.rx(udc)
                }
            }
        }
    }

    fn started(udc: &mut SimulatedUdc) {
        udc.init_controller().unwrap();
        udc.bind(&device()).unwrap();
        udc.connect().unwrap();
    }

    #[test]
    fn enumerates_and_echoes() {
        let mut udc = SimulatedUdc::new();
        started(&mut udc);
        udc.push_enumeration(1);
        udc.push_host(HostEvent::Out(b"ping".to_vec()));

        let mut echo = Echo::default();
        udc.run(1_000_000, &mut echo).unwrap();

        assert_eq!(udc.address(), 1);
        assert_eq!(udc.configuration(), Some(1));
        assert_eq!(echo.configs, vec![1]);
        assert_eq!(echo.received, vec![b"ping".to_vec()]);
        assert_eq!(udc.bulk_in(), &[b"ping".to_vec()]);
        assert_eq!(echo.sent, 1);
        // Device descriptor truncated to the 64 bytes asked for is still 18 long.
        assert_eq!(udc.control_in()[0].len(), 18);
        assert_eq!(udc.control_in()[2].len(), 9);
        assert_eq!(udc.control_in()[3].len(), 32);
    }

    #[test]
    fn rejected_configuration_stalls() {
        let mut udc = SimulatedUdc::new();
        started(&mut udc);
        udc.push_host(HostEvent::control(Setup::set_configuration(2)));

        let mut echo = Echo::default();
        udc.run(1_000_000, &mut echo).unwrap();

        assert_eq!(udc.configuration(), None);
        assert_eq!(udc.stalled().len(), 1);
    }

    #[test]
    fn queue_checks() {
        let mut udc = SimulatedUdc::new();
        started(&mut udc);
        let out = EndpointDescriptor::new(2, EndpDirection::Out, EndpointTy::Bulk, 64);

        let req = |length| IoRequest {
            endpoint: out,
            buffer: vec![0; 128],
            length,
        };
        assert_eq!(udc.queue_rx(req(64)), Err(UdcError::NotReady));

        udc.configuration = Some(1);
        assert_eq!(udc.queue_rx(req(100)), Err(UdcError::InvalidParameter));
        assert_eq!(udc.queue_rx(req(128)), Ok(()));
        assert_eq!(udc.queue_tx(req(64)), Err(UdcError::InvalidParameter));
        assert_eq!(udc.pending_rx().collect::<Vec<_>>(), vec![128]);
    }

    #[test]
    fn one_request_per_direction() {
        let mut udc = SimulatedUdc::new();
        started(&mut udc);
        udc.configuration = Some(1);
        let ep_in = EndpointDescriptor::new(1, EndpDirection::In, EndpointTy::Bulk, 64);
        let ep_out = EndpointDescriptor::new(2, EndpDirection::Out, EndpointTy::Bulk, 64);

        let req = |endpoint| IoRequest {
            endpoint,
            buffer: vec![0; 64],
            length: 64,
        };
        assert_eq!(udc.queue_rx(req(ep_out)), Ok(()));
        assert_eq!(udc.queue_rx(req(ep_out)), Err(UdcError::NotReady));
        assert_eq!(udc.queue_tx(req(ep_in)), Ok(()));
        assert_eq!(udc.queue_tx(req(ep_in)), Err(UdcError::NotReady));
        assert_eq!(udc.pending_rx().collect::<Vec<_>>(), vec![64]);
    }

    #[test]
    fn reconfiguration_cancels_pending_transfers() {
        let mut udc = SimulatedUdc::new();
        started(&mut udc);
        udc.configuration = Some(1);
        udc.queue_rx(IoRequest {
            endpoint: EndpointDescriptor::new(2, EndpDirection::Out, EndpointTy::Bulk, 64),
            buffer: vec![0; 128],
            length: 128,
        })
        .unwrap();
        udc.push_host(HostEvent::control(Setup::set_configuration(1)));

        let mut echo = Echo::default();
        udc.run(1_000_000, &mut echo).unwrap();

        // The old receive is gone and the one queued from on_config took its place.
        assert!(udc.stalled().is_empty());
        assert_eq!(udc.pending_rx().collect::<Vec<_>>(), vec![64]);
    }

    #[test]
    fn short_setup_packets_are_dropped() {
        let mut udc = SimulatedUdc::new();
        started(&mut udc);
        udc.push_host(HostEvent::Control(vec![0x00, 0x09, 0x01]));
        udc.push_host(HostEvent::Control(vec![0x00, 0x05, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00]));

        let mut echo = Echo::default();
        udc.run(1_000_000, &mut echo).unwrap();

        assert!(echo.configs.is_empty());
        assert_eq!(udc.configuration(), None);
        assert_eq!(udc.address(), 7);
    }

    #[test]
    fn faults_and_trace() {
        let mut udc = SimulatedUdc::new().fail_at(Stage::Connect, UdcError::DeviceError);
        udc.init_controller().unwrap();
        udc.bind(&device()).unwrap();
        assert_eq!(udc.connect(), Err(UdcError::DeviceError));
        assert!(!udc.is_connected());
        assert_eq!(udc.trace(), &[Stage::InitController, Stage::Bind, Stage::Connect]);
    }

    #[test]
    fn host_data_larger_than_request_is_split() {
        let mut udc = SimulatedUdc::new();
        started(&mut udc);
        udc.push_enumeration(1);
        udc.push_host(HostEvent::Out(vec![7; 100]));

        let mut echo = Echo::default();
        udc.run(1_000_000, &mut echo).unwrap();

        assert_eq!(echo.received.len(), 2);
        assert_eq!(echo.received[0].len(), 64);
        assert_eq!(echo.received[1].len(), 36);
    }
}
