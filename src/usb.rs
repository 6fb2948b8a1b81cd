//! Implements the USB device: a HID mouse carrying each key's motion vector to the host, and a
//! CDC serial interface the firmware logs to. Mostly lifted from [embassy_usb] examples.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::REPORTS_CHANNEL;

use embassy_futures::join::join;
use embassy_rp::{
    peripherals::USB,
    usb::{Driver, InterruptHandler},
    bind_interrupts,
};
use embassy_usb::{
    class::hid::{HidWriter, State as HidState},
    class::cdc_acm::{CdcAcmClass, State as CdcState},
    Builder, Handler, UsbDevice,
};
use log::{info, warn};
use usbd_hid::descriptor::{MouseReport, SerializedDescriptor};

use static_cell::StaticCell;

type MyDriver = Driver<'static, USB>;
type MyUsbDevice = UsbDevice<'static, MyDriver>;
type MyHidWriter = HidWriter<'static, MyDriver, 8>;
type MyCdcAcmClass = CdcAcmClass<'static, MyDriver>;

bind_interrupts!(pub(crate) struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

/// Whether the host has configured us, i.e. whether anyone is listening for gestures.
static CONFIGURED: AtomicBool = AtomicBool::new(false);

pub fn is_configured() -> bool {
    CONFIGURED.load(Ordering::Relaxed)
}

pub fn get_device(driver: MyDriver) -> (MyUsbDevice, MyHidWriter, MyCdcAcmClass) {
    let mut config = embassy_usb::Config::new(0xfeed, 0x3069);
    config.manufacturer = Some("T9 Glove");
    config.product = Some("T9 Glove Keypad");
    config.serial_number = Some("001");
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    static DEVICE_HANDLER: StaticCell<MyDeviceHandler> = StaticCell::new();

    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
    let mut builder = Builder::new(
        driver,
        config,
        &mut CONFIG_DESC.init([0; 256])[..],
        &mut BOS_DESC.init([0; 256])[..],
        &mut [], // no msos descriptors
        &mut CONTROL_BUF.init([0; 128])[..],
    );

    builder.handler(DEVICE_HANDLER.init(MyDeviceHandler));

    let hid = {
        static STATE: StaticCell<HidState> = StaticCell::new();
        let config = embassy_usb::class::hid::Config {
            report_descriptor: MouseReport::desc(),
            request_handler: None,
            poll_ms: 10,
            max_packet_size: 8,
        };
        HidWriter::<_, 8>::new(&mut builder, STATE.init(HidState::new()), config)
    };

    let cdc = {
        static STATE: StaticCell<CdcState> = StaticCell::new();
        let state = STATE.init(CdcState::new());
        CdcAcmClass::new(&mut builder, state, 64)
    };

    (builder.build(), hid, cdc)
}

#[embassy_executor::task]
pub async fn run(mut usb: MyUsbDevice, mut hid: MyHidWriter, cdc: MyCdcAcmClass) {
    let usb_fut = usb.run();

    let report_fut = async {
        loop {
            let report = REPORTS_CHANNEL.receive().await;
            // A report that doesn't make it is a dropped gesture; the user presses again.
            if let Err(e) = hid.write_serialize(&report).await {
                warn!("Failed to send report: {:?}", e);
            }
        }
    };

    let log_fut = embassy_usb_logger::with_class!(1024, log::LevelFilter::Info, cdc);

    join(usb_fut, join(report_fut, log_fut)).await;
}

struct MyDeviceHandler;

impl Handler for MyDeviceHandler {
    fn enabled(&mut self, enabled: bool) {
        CONFIGURED.store(false, Ordering::Relaxed);
        if !enabled {
            info!("Device disabled");
        }
    }

    fn reset(&mut self) {
        CONFIGURED.store(false, Ordering::Relaxed);
    }

    fn addressed(&mut self, _addr: u8) {
        CONFIGURED.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        CONFIGURED.store(configured, Ordering::Relaxed);
        if configured {
            info!("Device configured");
        } else {
            info!("Device no longer configured");
        }
    }
}
